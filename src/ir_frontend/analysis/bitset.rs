//! Fixed-size bit vector used as the lattice value for every analysis.
//!
//! Bit `i` corresponds to scope index `i`. Bits past `size` in the last word are kept at
//! zero by every operation, so derived equality only ever compares meaningful bits.

use std::fmt::{Display, Formatter, Result as FmtResult};

const WORD_BITS: usize = u64::BITS as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitSetError {
    SizeMismatch { left: usize, right: usize },
    IndexOutOfRange { index: usize, size: usize },
}

impl Display for BitSetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BitSetError::SizeMismatch { left, right } => {
                write!(f, "Bit sets have different sizes ({left} and {right})")
            }
            BitSetError::IndexOutOfRange { index, size } => {
                write!(f, "Bit index {index} is out of range for a set of size {size}")
            }
        }
    }
}

impl std::error::Error for BitSetError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
    size: usize,
}

impl BitSet {
    pub fn new_empty(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(WORD_BITS)],
            size,
        }
    }

    pub fn new_full(size: usize) -> Self {
        let mut set = Self {
            words: vec![u64::MAX; size.div_ceil(WORD_BITS)],
            size,
        };
        set.clear_padding();
        set
    }

    pub fn len(&self) -> usize {
        self.size
    }

    /// True when no bit is set. A zero-sized set is always empty.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    pub fn get(&self, index: usize) -> Result<bool, BitSetError> {
        self.check_index(index)?;
        Ok(self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0)
    }

    pub fn set(&mut self, index: usize, value: bool) -> Result<(), BitSetError> {
        self.check_index(index)?;

        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }

        Ok(())
    }

    pub fn complement(&self) -> BitSet {
        let mut result = BitSet {
            words: self.words.iter().map(|word| !word).collect(),
            size: self.size,
        };
        result.clear_padding();
        result
    }

    pub fn union(&self, other: &BitSet) -> Result<BitSet, BitSetError> {
        self.zip_words(other, |left, right| left | right)
    }

    pub fn intersect(&self, other: &BitSet) -> Result<BitSet, BitSetError> {
        self.zip_words(other, |left, right| left & right)
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Indices of set bits, ascending
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                (0..WORD_BITS)
                    .filter(move |bit| word & (1u64 << bit) != 0)
                    .map(move |bit| word_index * WORD_BITS + bit)
            })
    }

    fn zip_words(
        &self,
        other: &BitSet,
        combine: impl Fn(u64, u64) -> u64,
    ) -> Result<BitSet, BitSetError> {
        if self.size != other.size {
            return Err(BitSetError::SizeMismatch {
                left: self.size,
                right: other.size,
            });
        }

        Ok(BitSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(&left, &right)| combine(left, right))
                .collect(),
            size: self.size,
        })
    }

    fn check_index(&self, index: usize) -> Result<(), BitSetError> {
        if index >= self.size {
            return Err(BitSetError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        Ok(())
    }

    fn clear_padding(&mut self) {
        let used = self.size % WORD_BITS;
        if used == 0 {
            return;
        }
        if let Some(last) = self.words.last_mut() {
            *last &= (1u64 << used) - 1;
        }
    }
}

impl Display for BitSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for index in 0..self.size {
            let bit = self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0;
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/bitset_tests.rs"]
mod bitset_tests;
