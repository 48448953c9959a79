//! Incremental construction of a single `Function`.
//!
//! All graph invariants are enforced here, so nothing downstream has to re-check them:
//!  - block names are unique inside the function
//!  - edges are recorded on both ends and never duplicated
//!  - every symbol an instruction defines or reads is in the scope before the scope is frozen

use crate::ir_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::ir_frontend::ir::ir_datatypes::Type;
use crate::ir_frontend::ir::ir_display::IrSideTable;
use crate::ir_frontend::ir::ir_nodes::{BasicBlock, BlockId, Function, Instruction, Symbol};
use crate::ir_frontend::ir::scope::ScopeBuilder;
use crate::ir_frontend::tokenizer::tokens::TextLocation;
use crate::{return_compiler_error, return_ir_error};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

pub struct FunctionBuilder {
    name: String,
    return_type: Type,
    params: Vec<Symbol>,
    blocks: Vec<BasicBlock>,
    block_ids: FxHashMap<String, BlockId>,
    scope: ScopeBuilder,
    side_table: IrSideTable,
    src_path: PathBuf,
}

impl FunctionBuilder {
    /// Parameters are registered first so they always own the lowest scope indices
    pub fn new(name: impl Into<String>, return_type: Type, params: Vec<Symbol>) -> Self {
        let mut scope = ScopeBuilder::new();
        for param in &params {
            scope.insert(param.clone());
        }

        Self {
            name: name.into(),
            return_type,
            params,
            blocks: Vec::new(),
            block_ids: FxHashMap::default(),
            scope,
            side_table: IrSideTable::default(),
            src_path: PathBuf::new(),
        }
    }

    pub fn with_source(mut self, src_path: &Path, location: TextLocation) -> Self {
        self.src_path = src_path.to_path_buf();
        self.side_table.function_location = location;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the interned symbol for `name`.
    /// The first registration fixes the type, later mentions reuse it.
    pub fn symbol(&mut self, name: &str, data_type: Type) -> Symbol {
        if let Some(existing) = self.scope.get(name) {
            return existing.clone();
        }

        let symbol = Symbol::new(name, data_type);
        self.scope.insert(symbol.clone());
        symbol
    }

    pub fn add_block(
        &mut self,
        name: &str,
        location: TextLocation,
    ) -> Result<BlockId, CompilerError> {
        if self.block_ids.contains_key(name) {
            return_ir_error!(
                format!("Block '%{name}' is defined more than once in '@{}'", self.name),
                location.to_error_location(&self.src_path),
                {
                    CompilationStage => "IR Construction",
                    PrimarySuggestion => "Rename one of the blocks so every label is unique",
                }
            )
        }

        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock::new(id, name));
        self.block_ids.insert(name.to_owned(), id);
        self.side_table.map_block(id, location);
        Ok(id)
    }

    pub fn block_id(&self, name: &str) -> Option<BlockId> {
        self.block_ids.get(name).copied()
    }

    /// Adds the edge `from -> to` on both blocks. Adding it again changes nothing.
    pub fn connect(&mut self, from: BlockId, to: BlockId) -> Result<(), CompilerError> {
        if from.index() >= self.blocks.len() || to.index() >= self.blocks.len() {
            return_compiler_error!(
                "Edge {} -> {} points outside '@{}'",
                from,
                to,
                self.name
            );
        }

        let source = &mut self.blocks[from.index()];
        if !source.succs.contains(&to) {
            source.succs.push(to);
        }

        let target = &mut self.blocks[to.index()];
        if !target.preds.contains(&from) {
            target.preds.push(from);
        }

        Ok(())
    }

    /// Appends an instruction and wires up any branch edges it implies
    pub fn push_instruction(
        &mut self,
        block: BlockId,
        instruction: Instruction,
        location: Option<TextLocation>,
    ) -> Result<(), CompilerError> {
        if block.index() >= self.blocks.len() {
            return_compiler_error!("Block {} does not exist in '@{}'", block, self.name);
        }

        if let Some(def) = instruction.def() {
            self.scope.insert(def.clone());
        }
        for used in instruction.used_symbols() {
            self.scope.insert(used.clone());
        }

        for successor in instruction.successors() {
            self.connect(block, successor)?;
        }

        let instructions = &mut self.blocks[block.index()].instructions;
        if let Some(location) = location {
            self.side_table
                .map_instruction(block, instructions.len(), location);
        }
        instructions.push(instruction);

        Ok(())
    }

    /// Freezes the scope and hands out the finished function
    pub fn finish(self) -> Result<Function, CompilerError> {
        if self.blocks.is_empty() {
            return Err(CompilerError::new_ir_error(
                format!("Function '@{}' has no blocks", self.name),
                ErrorLocation::from_path(self.src_path),
            ));
        }

        let exits = self
            .blocks
            .iter()
            .filter(|block| matches!(block.instructions.last(), Some(Instruction::Ret { .. })))
            .map(|block| block.id)
            .collect();

        Ok(Function {
            name: self.name,
            return_type: self.return_type,
            params: self.params,
            blocks: self.blocks,
            exits,
            scope: self.scope.freeze(),
            side_table: self.side_table,
        })
    }
}
