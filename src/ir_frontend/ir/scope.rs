//! Function scope.
//!
//! Every symbol a function mentions gets a dense index in the order it was first seen.
//! That index is its bit position in every analysis set, so the scope must be fully
//! populated before any set is sized from it.
//!
//! Construction is two-phase: a `ScopeBuilder` grows while the IR builder walks the
//! function, then `freeze` hands out a read-only `Scope`. Nothing can be added afterwards.

use crate::ir_frontend::ir::ir_nodes::Symbol;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct ScopeBuilder {
    symbols: Vec<Symbol>,
    index_by_name: FxHashMap<String, usize>,
}

impl ScopeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symbol and returns its index.
    /// Re-inserting a name is a no-op that returns the first index.
    pub fn insert(&mut self, symbol: Symbol) -> usize {
        if let Some(&index) = self.index_by_name.get(&symbol.name) {
            return index;
        }

        let index = self.symbols.len();
        self.index_by_name.insert(symbol.name.clone(), index);
        self.symbols.push(symbol);
        index
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index_by_name
            .get(name)
            .and_then(|&index| self.symbols.get(index))
    }

    pub fn freeze(self) -> Scope {
        Scope {
            symbols: self.symbols,
            index_by_name: self.index_by_name,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: Vec<Symbol>,
    index_by_name: FxHashMap<String, usize>,
}

impl Scope {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn index_of(&self, symbol: &Symbol) -> Option<usize> {
        self.index_of_name(&symbol.name)
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index_of_name(name)
            .and_then(|index| self.symbols.get(index))
    }

    /// Symbols in index order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}
