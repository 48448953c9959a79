mod diagnostics;
mod transfer;
mod types;

pub use types::{
    FunctionCheckFailure, FunctionCheckSummary, VarCheckReport, VarCheckStats, Violation,
    ViolationKind,
};

use crate::dataflow_log;
use crate::ir_frontend::analysis::bitset::BitSet;
use crate::ir_frontend::analysis::dataflow::{
    FlowLattice, FlowSolution, ForwardProblem, solve_forward,
};
use crate::ir_frontend::analysis::var_checker::diagnostics::scan_violations;
use crate::ir_frontend::analysis::var_checker::transfer::{
    defined_step, parameter_seed, stored_step,
};
use crate::ir_frontend::compiler_errors::CompilerError;
use crate::ir_frontend::ir::ir_nodes::{Function, Instruction, Module};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    // Analyse functions on the rayon pool. Output order is unchanged.
    pub parallel: bool,
}

/// Both converged analyses for one function
#[derive(Debug, Clone)]
pub struct FunctionFlows {
    pub defined: FlowSolution,
    pub stored: FlowSolution,
}

/// Checks every function in the module.
///
/// A structural failure only aborts the function it happened in.
/// It is recorded in `report.errors` and the remaining functions are still checked.
pub fn check_module(module: &Module, options: &CheckOptions) -> VarCheckReport {
    let outcomes: Vec<Result<FunctionOutcome, CompilerError>> = if options.parallel {
        module.functions.par_iter().map(check_function).collect()
    } else {
        module.functions.iter().map(check_function).collect()
    };

    let mut report = VarCheckReport {
        module: module.name.clone(),
        ..VarCheckReport::default()
    };

    for (function, outcome) in module.functions.iter().zip(outcomes) {
        match outcome {
            Ok(outcome) => {
                report.stats.functions_analyzed += 1;
                report.stats.blocks_analyzed += function.blocks.len();
                report.stats.instructions_scanned += function
                    .blocks
                    .iter()
                    .map(|block| block.instructions.len())
                    .sum::<usize>();
                report.stats.worklist_iterations +=
                    outcome.summary.defined_iterations + outcome.summary.stored_iterations;
                report.stats.violations += outcome.violations.len();

                report.functions.push(outcome.summary);
                report.violations.extend(outcome.violations);
            }
            Err(error) => {
                report.stats.functions_failed += 1;
                report
                    .errors
                    .push(FunctionCheckFailure::new(function.name.as_str(), error));
            }
        }
    }

    dataflow_log!(
        "[VarCheck] Completed: functions=",
        { report.stats.functions_analyzed },
        " violations=",
        { report.stats.violations }
    );

    report
}

struct FunctionOutcome {
    summary: FunctionCheckSummary,
    violations: Vec<Violation>,
}

fn check_function(function: &Function) -> Result<FunctionOutcome, CompilerError> {
    let flows = analyze_function(function)?;
    let violations = scan_violations(function, &flows.defined, &flows.stored)?;

    let unreachable_blocks = flows
        .defined
        .unreachable_blocks()
        .into_iter()
        .filter_map(|id| function.block(id))
        .map(|block| block.name.clone())
        .collect();

    Ok(FunctionOutcome {
        summary: FunctionCheckSummary {
            name: function.name.clone(),
            blocks: function.blocks.len(),
            scope_size: function.scope.len(),
            defined_iterations: flows.defined.iterations,
            stored_iterations: flows.stored.iterations,
            defined_out_changes: flows.defined.out_changes,
            stored_out_changes: flows.stored.out_changes,
            unreachable_blocks,
            violations: violations.len(),
        },
        violations,
    })
}

/// Runs the Defined and Stored analyses to their fixed points
pub fn analyze_function(function: &Function) -> Result<FunctionFlows, CompilerError> {
    let scope = &function.scope;
    let size = scope.len();

    let defined = solve_forward(
        function,
        &ForwardProblem {
            name: "Defined",
            lattice: FlowLattice::must(size),
            entry_seed: parameter_seed(scope, &function.params)?,
            transfer: |before: &BitSet, instruction: &Instruction| {
                defined_step(scope, before, instruction)
            },
        },
    )?;

    let stored = solve_forward(
        function,
        &ForwardProblem {
            name: "Stored",
            lattice: FlowLattice::must(size),
            entry_seed: BitSet::new_empty(size),
            transfer: |before: &BitSet, instruction: &Instruction| {
                stored_step(scope, before, instruction)
            },
        },
    )?;

    Ok(FunctionFlows { defined, stored })
}

/// Re-runs the violation scan over already converged flows
pub fn scan_function(
    function: &Function,
    flows: &FunctionFlows,
) -> Result<Vec<Violation>, CompilerError> {
    scan_violations(function, &flows.defined, &flows.stored)
}

#[cfg(test)]
mod tests;
