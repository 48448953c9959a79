//! Generic forward dataflow over bit-vector lattices.
//!
//! One driver serves every analysis. An analysis is described by a `ForwardProblem`:
//! a lattice (`initial` + `meet`), the IN value of the entry block, and a per-instruction
//! transfer step. The driver keeps `L + 1` checkpoints for a block of `L` instructions
//! and iterates a FIFO worklist until no block's OUT changes.

use crate::dataflow_log;
use crate::ir_frontend::analysis::bitset::{BitSet, BitSetError};
use crate::ir_frontend::compiler_errors::CompilerError;
use crate::ir_frontend::ir::ir_nodes::{BasicBlock, BlockId, Function, Instruction};
use crate::return_analysis_error;
use std::collections::VecDeque;

pub type MeetFn = fn(&BitSet, &BitSet) -> Result<BitSet, BitSetError>;

/// `initial` is the identity of `meet` and starts every predecessor fold
#[derive(Debug, Clone)]
pub struct FlowLattice {
    pub initial: BitSet,
    pub meet: MeetFn,
}

impl FlowLattice {
    /// Intersection lattice for "holds on every path" questions
    pub fn must(size: usize) -> Self {
        Self {
            initial: BitSet::new_full(size),
            meet: BitSet::intersect,
        }
    }
}

pub struct ForwardProblem<T>
where
    T: Fn(&BitSet, &Instruction) -> Result<BitSet, CompilerError>,
{
    pub name: &'static str,
    pub lattice: FlowLattice,

    // IN of the entry block. Every other block without predecessors starts all-zero.
    pub entry_seed: BitSet,

    // Must return a new value and leave its input untouched
    pub transfer: T,
}

/// Checkpoints for one block. `values[0]` is IN, `values[len]` is OUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFlow {
    pub values: Vec<BitSet>,
}

impl BlockFlow {
    fn new(block_len: usize, in_value: BitSet) -> Self {
        let size = in_value.len();
        let mut values = Vec::with_capacity(block_len + 1);
        values.push(in_value);

        if block_len > 0 {
            for _ in 1..block_len {
                values.push(BitSet::new_empty(size));
            }
            values.push(BitSet::new_full(size));
        }

        Self { values }
    }

    pub fn in_value(&self) -> &BitSet {
        &self.values[0]
    }

    pub fn out_value(&self) -> &BitSet {
        &self.values[self.values.len() - 1]
    }

    /// Value right before instruction `index` runs
    pub fn before(&self, index: usize) -> Option<&BitSet> {
        self.values.get(index)
    }

    /// Recomputes every checkpoint after IN from scratch
    pub fn transfer<T>(&mut self, block: &BasicBlock, step: &T) -> Result<(), CompilerError>
    where
        T: Fn(&BitSet, &Instruction) -> Result<BitSet, CompilerError>,
    {
        for (index, instruction) in block.instructions.iter().enumerate() {
            let next = step(&self.values[index], instruction)?;
            self.values[index + 1] = next;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FlowSolution {
    pub blocks: Vec<BlockFlow>,

    // Blocks the worklist never reached keep their initial checkpoints
    pub visited: Vec<bool>,

    pub iterations: usize,
    pub out_changes: usize,
}

impl FlowSolution {
    pub fn block(&self, id: BlockId) -> Option<&BlockFlow> {
        self.blocks.get(id.index())
    }

    pub fn is_visited(&self, id: BlockId) -> bool {
        self.visited.get(id.index()).copied().unwrap_or(false)
    }

    pub fn unreachable_blocks(&self) -> Vec<BlockId> {
        self.visited
            .iter()
            .enumerate()
            .filter(|(_, visited)| !**visited)
            .map(|(index, _)| BlockId(index as u32))
            .collect()
    }
}

pub fn solve_forward<T>(
    function: &Function,
    problem: &ForwardProblem<T>,
) -> Result<FlowSolution, CompilerError>
where
    T: Fn(&BitSet, &Instruction) -> Result<BitSet, CompilerError>,
{
    solve_forward_observed(function, problem, |_, _| {})
}

/// Same as `solve_forward`, but calls `observer` with every recomputed OUT
pub fn solve_forward_observed<T>(
    function: &Function,
    problem: &ForwardProblem<T>,
    mut observer: impl FnMut(BlockId, &BitSet),
) -> Result<FlowSolution, CompilerError>
where
    T: Fn(&BitSet, &Instruction) -> Result<BitSet, CompilerError>,
{
    let size = function.scope.len();

    if problem.entry_seed.len() != size || problem.lattice.initial.len() != size {
        return_analysis_error!(
            format!(
                "'{}' on '@{}' was set up for {} symbols but the scope has {size}",
                problem.name,
                function.name,
                problem.entry_seed.len()
            ),
            {
                CompilationStage => "Dataflow",
            }
        )
    }

    let mut flows: Vec<BlockFlow> = function
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            // An empty block's only checkpoint is both IN and OUT. Off the entry it starts
            // as the all-ones placeholder so it stays neutral in the meet until visited.
            let in_value = if index == 0 {
                problem.entry_seed.clone()
            } else if block.is_empty() {
                BitSet::new_full(size)
            } else {
                BitSet::new_empty(size)
            };
            BlockFlow::new(block.len(), in_value)
        })
        .collect();

    let mut visited = vec![false; function.blocks.len()];
    let mut iterations = 0;
    let mut out_changes = 0;

    let Some(entry) = function.entry() else {
        return Ok(FlowSolution {
            blocks: flows,
            visited,
            iterations,
            out_changes,
        });
    };

    let mut worklist = VecDeque::from([entry.id]);

    while let Some(block_id) = worklist.pop_front() {
        iterations += 1;

        let Some(block) = function.block(block_id) else {
            return_analysis_error!(
                format!("Block {block_id} is not part of '@{}'", function.name),
                {
                    CompilationStage => "Dataflow",
                }
            )
        };
        let index = block_id.index();
        let first_visit = !visited[index];
        visited[index] = true;

        let previous_out = flows[index].out_value().clone();

        let start = if block_id == entry.id {
            &problem.entry_seed
        } else {
            &problem.lattice.initial
        };
        if let Some(new_in) = converge(&flows, block, start, problem.lattice.meet)? {
            flows[index].values[0] = new_in;
        }

        flows[index].transfer(block, &problem.transfer)?;

        let new_out = flows[index].out_value();
        observer(block_id, new_out);

        let changed = *new_out != previous_out;
        if changed {
            out_changes += 1;
        }

        dataflow_log!(
            Bright Black "[", { problem.name }, "] ",
            { block.name.as_str() },
            " OUT = ",
            Green { new_out.to_string() }
        );

        // First visits always propagate, even when OUT still equals the all-ones placeholder
        if changed || first_visit {
            worklist.extend(block.succs.iter().copied());
        }
    }

    Ok(FlowSolution {
        blocks: flows,
        visited,
        iterations,
        out_changes,
    })
}

/// Folds predecessor OUTs through `meet`, starting from `start`.
/// `None` means the block has no predecessors and keeps its IN.
fn converge(
    flows: &[BlockFlow],
    block: &BasicBlock,
    start: &BitSet,
    meet: MeetFn,
) -> Result<Option<BitSet>, CompilerError> {
    if block.preds.is_empty() {
        return Ok(None);
    }

    let mut value = start.clone();
    for pred in &block.preds {
        let Some(pred_flow) = flows.get(pred.index()) else {
            return_analysis_error!(
                format!("Block '%{}' has a predecessor {pred} that does not exist", block.name),
                {
                    CompilationStage => "Dataflow",
                }
            )
        };
        value = meet(&value, pred_flow.out_value())?;
    }

    Ok(Some(value))
}

#[cfg(test)]
#[path = "tests/dataflow_tests.rs"]
mod dataflow_tests;
