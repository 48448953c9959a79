use crate::ir_frontend::analysis::bitset::BitSet;
use crate::ir_frontend::compiler_errors::CompilerError;
use crate::ir_frontend::ir::ir_nodes::{Instruction, Symbol};
use crate::ir_frontend::ir::scope::Scope;
use crate::return_analysis_error;

/// Defined: the symbol an instruction writes becomes defined after it
pub(super) fn defined_step(
    scope: &Scope,
    before: &BitSet,
    instruction: &Instruction,
) -> Result<BitSet, CompilerError> {
    let mut after = before.clone();
    if let Some(def) = instruction.def() {
        after.set(scope_index(scope, def)?, true)?;
    }
    Ok(after)
}

/// Stored: only a store marks its destination pointer
pub(super) fn stored_step(
    scope: &Scope,
    before: &BitSet,
    instruction: &Instruction,
) -> Result<BitSet, CompilerError> {
    let mut after = before.clone();
    if let Instruction::Store { dst, .. } = instruction {
        after.set(scope_index(scope, dst)?, true)?;
    }
    Ok(after)
}

/// Parameters are the only symbols defined on entry
pub(super) fn parameter_seed(scope: &Scope, params: &[Symbol]) -> Result<BitSet, CompilerError> {
    let mut seed = BitSet::new_empty(scope.len());
    for param in params {
        seed.set(scope_index(scope, param)?, true)?;
    }
    Ok(seed)
}

pub(super) fn scope_index(scope: &Scope, symbol: &Symbol) -> Result<usize, CompilerError> {
    let Some(index) = scope.index_of(symbol) else {
        return_analysis_error!(
            format!("Symbol {symbol} was never registered in the function scope"),
            {
                CompilationStage => "Variable Checking",
            }
        )
    };
    Ok(index)
}
