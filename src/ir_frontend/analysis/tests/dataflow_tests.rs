use super::{FlowLattice, ForwardProblem, solve_forward, solve_forward_observed};
use crate::ir_frontend::analysis::bitset::BitSet;
use crate::ir_frontend::ast::parse_module::parse_module;
use crate::ir_frontend::compiler_errors::{CompilerError, ErrorType};
use crate::ir_frontend::ir::ir_builder::build_module;
use crate::ir_frontend::ir::ir_nodes::{BlockId, Function, Instruction};
use crate::ir_frontend::tokenizer::tokenizer::tokenize;
use rustc_hash::FxHashMap;
use std::path::Path;

fn build_function(source: &str) -> Function {
    let path = Path::new("dataflow.ll");
    let tokens = tokenize(source, path).expect("source should tokenize");
    let ast = parse_module(tokens, path).expect("source should parse");
    let mut module = build_module(&ast, path).expect("module should build");
    module.functions.remove(0)
}

/// Marks whatever an instruction writes, seeded with nothing
fn writes_problem(
    function: &Function,
) -> ForwardProblem<impl Fn(&BitSet, &Instruction) -> Result<BitSet, CompilerError> + '_> {
    let size = function.scope.len();
    ForwardProblem {
        name: "Writes",
        lattice: FlowLattice::must(size),
        entry_seed: BitSet::new_empty(size),
        transfer: move |before: &BitSet, instruction: &Instruction| {
            let mut after = before.clone();
            if let Some(def) = instruction.def() {
                if let Some(index) = function.scope.index_of(def) {
                    after.set(index, true)?;
                }
            }
            Ok::<_, CompilerError>(after)
        },
    }
}

fn bit(function: &Function, set: &BitSet, name: &str) -> bool {
    let index = function.scope.index_of_name(name).expect("symbol in scope");
    set.get(index).expect("index in range")
}

const NESTED_LOOPS: &str = "
define i32 @nested(i32 %n) {
entry:
  %i = add i32 0, 0
  br label %outer
outer:
  %c = icmp slt i32 %i, %n
  br i1 %c, label %inner, label %exit
inner:
  %j = add i32 %i, 1
  %d = icmp slt i32 %j, %n
  br i1 %d, label %inner, label %latch
latch:
  %k = add i32 %j, 1
  br label %outer
exit:
  ret i32 %i
}
";

#[test]
fn meet_is_the_intersection_of_predecessors() {
    let function = build_function(NESTED_LOOPS);
    let solution = solve_forward(&function, &writes_problem(&function)).expect("converges");

    for block in function.blocks.iter().skip(1) {
        let flow = solution.block(block.id).expect("flow exists");

        let mut expected = BitSet::new_full(function.scope.len());
        for pred in &block.preds {
            let pred_out = solution.block(*pred).expect("pred flow").out_value();
            expected = expected.intersect(pred_out).expect("same size");
        }

        assert_eq!(flow.in_value(), &expected, "IN of %{}", block.name);
    }
}

#[test]
fn loop_headers_lose_what_only_the_body_writes() {
    let function = build_function(NESTED_LOOPS);
    let solution = solve_forward(&function, &writes_problem(&function)).expect("converges");

    let outer = function.block_by_name("outer").expect("outer block");
    let outer_in = solution.block(outer.id).expect("flow").in_value();
    assert!(bit(&function, outer_in, "i"));
    assert!(!bit(&function, outer_in, "j"));
    assert!(!bit(&function, outer_in, "k"));

    let exit = function.block_by_name("exit").expect("exit block");
    let exit_in = solution.block(exit.id).expect("flow").in_value();
    assert!(bit(&function, exit_in, "c"));
    assert!(!bit(&function, exit_in, "j"));
}

#[test]
fn terminates_within_the_iteration_bound() {
    let function = build_function(NESTED_LOOPS);
    let solution = solve_forward(&function, &writes_problem(&function)).expect("converges");

    let bound = 1 + function.edge_count() * (function.scope.len() + 2);
    assert!(
        solution.iterations <= bound,
        "{} iterations, bound {bound}",
        solution.iterations
    );
    assert!(solution.iterations >= function.blocks.len());
}

#[test]
fn outs_never_regain_a_bit() {
    let function = build_function(NESTED_LOOPS);
    let mut history: FxHashMap<BlockId, Vec<BitSet>> = FxHashMap::default();

    solve_forward_observed(&function, &writes_problem(&function), |block, out| {
        history.entry(block).or_default().push(out.clone());
    })
    .expect("converges");

    for (block, outs) in &history {
        for pair in outs.windows(2) {
            let narrowed = pair[0].intersect(&pair[1]).expect("same size");
            assert_eq!(narrowed, pair[1], "OUT of {block} grew between visits");
        }
    }
}

#[test]
fn entry_without_preds_keeps_its_seed() {
    let source = "
define i32 @f(i32 %a) {
entry:
  %x = add i32 %a, 1
  ret i32 %x
}
";
    let function = build_function(source);
    let size = function.scope.len();

    let mut seed = BitSet::new_empty(size);
    seed.set(0, true).expect("in range");

    let mut problem = writes_problem(&function);
    problem.entry_seed = seed.clone();

    let solution = solve_forward(&function, &problem).expect("converges");
    let entry = solution.block(BlockId(0)).expect("entry flow");
    assert_eq!(entry.in_value(), &seed);
    assert_eq!(entry.values.len(), 3);
    assert!(bit(&function, entry.out_value(), "x"));
}

#[test]
fn entry_back_edge_meets_with_the_seed() {
    let source = "
define i32 @spin(i1 %c) {
entry:
  %x = add i32 1, 0
  br i1 %c, label %entry, label %done
done:
  ret i32 %x
}
";
    let function = build_function(source);
    let solution = solve_forward(&function, &writes_problem(&function)).expect("converges");

    // The seed is empty, so nothing survives the meet at the entry
    let entry = solution.block(BlockId(0)).expect("entry flow");
    assert!(entry.in_value().is_empty());
    assert!(bit(&function, entry.out_value(), "x"));
}

#[test]
fn unreachable_blocks_are_never_visited() {
    let source = "
define i32 @f() {
entry:
  ret i32 0
dead:
  %x = add i32 1, 2
  ret i32 %x
}
";
    let function = build_function(source);
    let solution = solve_forward(&function, &writes_problem(&function)).expect("converges");

    let dead = function.block_by_name("dead").expect("dead block");
    assert!(!solution.is_visited(dead.id));
    assert_eq!(solution.unreachable_blocks(), vec![dead.id]);
    assert!(solution.block(dead.id).expect("flow").in_value().is_empty());
}

#[test]
fn empty_blocks_pass_their_in_through() {
    let function = build_function(NESTED_LOOPS);
    let solution = solve_forward(&function, &writes_problem(&function)).expect("converges");

    for flow in &solution.blocks {
        assert!(!flow.values.is_empty());
        assert_eq!(flow.before(0), Some(flow.in_value()));
    }
}

#[test]
fn seed_of_the_wrong_size_aborts() {
    let function = build_function(NESTED_LOOPS);
    let mut problem = writes_problem(&function);
    problem.entry_seed = BitSet::new_empty(function.scope.len() + 1);

    let error = solve_forward(&function, &problem).expect_err("sizes differ");
    assert_eq!(error.error_type, ErrorType::Analysis);
    assert!(error.msg.contains("'Writes' on '@nested'"));
}
