use super::{BitSet, BitSetError};
use proptest::prelude::*;

fn from_bits(bits: &[bool]) -> BitSet {
    let mut set = BitSet::new_empty(bits.len());
    for (index, bit) in bits.iter().enumerate() {
        set.set(index, *bit).expect("index is in range");
    }
    set
}

/// Two bit patterns of the same length
fn same_size_pair() -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
    (0usize..200).prop_flat_map(|len| {
        (
            prop::collection::vec(any::<bool>(), len),
            prop::collection::vec(any::<bool>(), len),
        )
    })
}

fn same_size_triple() -> impl Strategy<Value = (Vec<bool>, Vec<bool>, Vec<bool>)> {
    (0usize..200).prop_flat_map(|len| {
        (
            prop::collection::vec(any::<bool>(), len),
            prop::collection::vec(any::<bool>(), len),
            prop::collection::vec(any::<bool>(), len),
        )
    })
}

#[test]
fn new_sets_have_the_requested_size() {
    let empty = BitSet::new_empty(70);
    let full = BitSet::new_full(70);

    assert_eq!(empty.len(), 70);
    assert_eq!(full.len(), 70);
    assert_eq!(empty.count_ones(), 0);
    assert_eq!(full.count_ones(), 70);
    assert!(empty.is_empty());
    assert!(!full.is_empty());
}

#[test]
fn zero_sized_sets_work() {
    let empty = BitSet::new_empty(0);
    let full = BitSet::new_full(0);

    assert_eq!(empty, full);
    assert!(full.is_empty());
    assert_eq!(full.complement(), empty);
    assert_eq!(empty.intersect(&full), Ok(BitSet::new_empty(0)));
    assert_eq!(full.to_string(), "");
}

#[test]
fn get_and_set_across_word_boundaries() {
    let mut set = BitSet::new_empty(130);
    for index in [0, 63, 64, 127, 128, 129] {
        set.set(index, true).expect("in range");
    }

    assert_eq!(set.iter_ones().collect::<Vec<_>>(), vec![0, 63, 64, 127, 128, 129]);
    assert_eq!(set.get(64), Ok(true));
    assert_eq!(set.get(65), Ok(false));

    set.set(64, false).expect("in range");
    assert_eq!(set.get(64), Ok(false));
}

#[test]
fn out_of_range_indices_are_errors() {
    let mut set = BitSet::new_empty(3);
    assert_eq!(
        set.get(3),
        Err(BitSetError::IndexOutOfRange { index: 3, size: 3 })
    );
    assert_eq!(
        set.set(10, true),
        Err(BitSetError::IndexOutOfRange { index: 10, size: 3 })
    );
}

#[test]
fn mismatched_sizes_are_errors() {
    let left = BitSet::new_full(4);
    let right = BitSet::new_full(5);

    assert_eq!(
        left.union(&right),
        Err(BitSetError::SizeMismatch { left: 4, right: 5 })
    );
    assert_eq!(
        right.intersect(&left),
        Err(BitSetError::SizeMismatch { left: 5, right: 4 })
    );
}

#[test]
fn displays_bit_zero_first() {
    let set = from_bits(&[true, false, false, true]);
    assert_eq!(set.to_string(), "1001");
}

#[test]
fn complement_of_full_is_empty() {
    for size in [1, 63, 64, 65, 128] {
        assert_eq!(BitSet::new_full(size).complement(), BitSet::new_empty(size));
        assert_eq!(BitSet::new_empty(size).complement(), BitSet::new_full(size));
    }
}

proptest! {
    #[test]
    fn union_and_intersect_commute((a, b) in same_size_pair()) {
        let (a, b) = (from_bits(&a), from_bits(&b));
        prop_assert_eq!(a.union(&b)?, b.union(&a)?);
        prop_assert_eq!(a.intersect(&b)?, b.intersect(&a)?);
    }

    #[test]
    fn union_and_intersect_associate((a, b, c) in same_size_triple()) {
        let (a, b, c) = (from_bits(&a), from_bits(&b), from_bits(&c));
        prop_assert_eq!(a.union(&b)?.union(&c)?, a.union(&b.union(&c)?)?);
        prop_assert_eq!(a.intersect(&b)?.intersect(&c)?, a.intersect(&b.intersect(&c)?)?);
    }

    #[test]
    fn complement_is_an_involution(bits in prop::collection::vec(any::<bool>(), 0..200)) {
        let set = from_bits(&bits);
        prop_assert_eq!(set.complement().complement(), set);
    }

    #[test]
    fn set_and_complement_are_disjoint(bits in prop::collection::vec(any::<bool>(), 0..200)) {
        let set = from_bits(&bits);
        let size = set.len();

        prop_assert_eq!(set.intersect(&set.complement())?, BitSet::new_empty(size));
        prop_assert_eq!(set.union(&set.complement())?, BitSet::new_full(size));
    }

    #[test]
    fn full_is_the_intersect_identity(bits in prop::collection::vec(any::<bool>(), 0..200)) {
        let set = from_bits(&bits);
        prop_assert_eq!(set.intersect(&BitSet::new_full(set.len()))?, set);
    }

    #[test]
    fn ones_match_the_input(bits in prop::collection::vec(any::<bool>(), 0..200)) {
        let set = from_bits(&bits);
        let expected: Vec<usize> = bits
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit)
            .map(|(index, _)| index)
            .collect();

        prop_assert_eq!(set.count_ones(), expected.len());
        prop_assert_eq!(set.iter_ones().collect::<Vec<_>>(), expected);
    }
}
