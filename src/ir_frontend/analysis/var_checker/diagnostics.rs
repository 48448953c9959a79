use crate::ir_frontend::analysis::dataflow::FlowSolution;
use crate::ir_frontend::analysis::var_checker::transfer::scope_index;
use crate::ir_frontend::analysis::var_checker::types::{Violation, ViolationKind};
use crate::ir_frontend::compiler_errors::CompilerError;
use crate::ir_frontend::ir::ir_builder::instruction_line;
use crate::ir_frontend::ir::ir_nodes::{BasicBlock, Function, Instruction, Symbol};
use crate::return_analysis_error;

/// Walks the converged results once, blocks in declaration order, instructions in order.
/// Pure: scanning the same solutions again gives the same list.
pub(super) fn scan_violations(
    function: &Function,
    defined: &FlowSolution,
    stored: &FlowSolution,
) -> Result<Vec<Violation>, CompilerError> {
    let mut violations = Vec::new();

    for block in &function.blocks {
        let (Some(defined_flow), Some(stored_flow)) = (defined.block(block.id), stored.block(block.id))
        else {
            return_analysis_error!(
                format!("No dataflow result for block '%{}' in '@{}'", block.name, function.name),
                {
                    CompilationStage => "Variable Checking",
                }
            )
        };
        let unreachable = !defined.is_visited(block.id);

        for (index, instruction) in block.instructions.iter().enumerate() {
            let (Some(defined_before), Some(stored_before)) =
                (defined_flow.before(index), stored_flow.before(index))
            else {
                return_analysis_error!(
                    format!(
                        "Missing checkpoint {index} for block '%{}' in '@{}'",
                        block.name, function.name
                    ),
                    {
                        CompilationStage => "Variable Checking",
                    }
                )
            };

            let site = ViolationSite {
                function,
                block,
                index,
                instruction,
                unreachable,
            };

            for used in instruction.used_symbols() {
                if !defined_before.get(scope_index(&function.scope, used)?)? {
                    violations.push(site.violation(used, ViolationKind::UsedWithoutDefined));
                }
            }

            if let Instruction::Load { src, .. } = instruction {
                if !stored_before.get(scope_index(&function.scope, src)?)? {
                    violations.push(site.violation(src, ViolationKind::LoadedWithoutStored));
                }
            }
        }
    }

    Ok(violations)
}

struct ViolationSite<'a> {
    function: &'a Function,
    block: &'a BasicBlock,
    index: usize,
    instruction: &'a Instruction,
    unreachable: bool,
}

impl ViolationSite<'_> {
    fn violation(&self, symbol: &Symbol, kind: ViolationKind) -> Violation {
        Violation {
            function: self.function.name.clone(),
            block: self.block.name.clone(),
            block_id: self.block.id,
            instruction_index: self.index,
            instruction: self.instruction.to_string(),
            symbol: symbol.to_string(),
            kind,
            line: instruction_line(self.function, self.block.id, self.index),
            in_unreachable_block: self.unreachable,
        }
    }
}
