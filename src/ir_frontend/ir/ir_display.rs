//! IR Display
//!
//! Renders IR back into LLVM-style text for diagnostics and debug logging,
//! and keeps the side table that maps instructions back to source lines.

use crate::ir_frontend::ir::ir_datatypes::Type;
use crate::ir_frontend::ir::ir_nodes::{
    BasicBlock, BinaryOp, BlockId, BlockTarget, Constant, Function, ICmpPredicate, Instruction,
    Module, Symbol, Value,
};
use crate::ir_frontend::tokenizer::tokens::TextLocation;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter, Result as FmtResult, Write as _};

// ============================================================================
// Source Location Side Table
// ============================================================================

/// Source positions for a function's blocks and instructions.
/// IR nodes stay location free; anything that wants a line number asks here.
#[derive(Debug, Clone, Default)]
pub struct IrSideTable {
    pub function_location: TextLocation,
    block_locations: FxHashMap<BlockId, TextLocation>,
    instruction_locations: FxHashMap<(BlockId, usize), TextLocation>,
}

impl IrSideTable {
    pub fn new(function_location: TextLocation) -> Self {
        Self {
            function_location,
            ..Self::default()
        }
    }

    pub fn map_block(&mut self, block: BlockId, location: TextLocation) {
        self.block_locations.insert(block, location);
    }

    pub fn map_instruction(&mut self, block: BlockId, index: usize, location: TextLocation) {
        self.instruction_locations.insert((block, index), location);
    }

    pub fn block_location(&self, block: BlockId) -> Option<TextLocation> {
        self.block_locations.get(&block).copied()
    }

    pub fn instruction_location(&self, block: BlockId, index: usize) -> Option<TextLocation> {
        self.instruction_locations.get(&(block, index)).copied()
    }
}

// ============================================================================
// Values and types
// ============================================================================

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Type::Integer(width) => write!(f, "i{width}"),
            Type::Pointer(target) => write!(f, "{target}*"),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "%{}", self.name)
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Constant::I32(value) => write!(f, "{value}"),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Symbol(symbol) => write!(f, "{symbol}"),
            Value::Constant(constant) => write!(f, "{constant}"),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.keyword())
    }
}

impl Display for ICmpPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.keyword())
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "bb{}", self.0)
    }
}

impl Display for BlockTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "label %{}", self.label)
    }
}

// ============================================================================
// Instructions
// ============================================================================

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Instruction::Alloca { dst, data_type } => write!(f, "{dst} = alloca {data_type}"),

            Instruction::Load {
                dst,
                data_type,
                src,
            } => write!(f, "{dst} = load {data_type}, {} {src}", src.data_type),

            Instruction::Store { src, dst } => {
                write!(f, "store {} {src}, {} {dst}", src.data_type(), dst.data_type)
            }

            Instruction::Call {
                dst,
                data_type,
                callee,
                args,
            } => {
                let mut rendered_args = String::new();
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        rendered_args.push_str(", ");
                    }
                    let _ = write!(rendered_args, "{} {arg}", arg.data_type());
                }
                write!(f, "{dst} = call {data_type} @{callee}({rendered_args})")
            }

            Instruction::Binary {
                dst,
                op,
                data_type,
                lhs,
                rhs,
            } => write!(f, "{dst} = {op} {data_type} {lhs}, {rhs}"),

            Instruction::ICmp {
                dst,
                predicate,
                data_type,
                lhs,
                rhs,
            } => write!(f, "{dst} = icmp {predicate} {data_type} {lhs}, {rhs}"),

            Instruction::Br {
                cond: Some(cond),
                true_target,
                false_target: Some(false_target),
            } => write!(f, "br i1 {cond}, {true_target}, {false_target}"),

            Instruction::Br { true_target, .. } => write!(f, "br {true_target}"),

            Instruction::Ret { value } => write!(f, "ret {} {value}", value.data_type()),
        }
    }
}

// ============================================================================
// Blocks, functions and modules
// ============================================================================

impl Display for BasicBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}:", self.name)?;
        for instruction in &self.instructions {
            writeln!(f, "  {instruction}")?;
        }
        Ok(())
    }
}

impl Function {
    /// `i32 @name(i32 %a, i32 %b)`
    pub fn signature(&self) -> String {
        let mut rendered = format!("{} @{}(", self.return_type, self.name);
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                rendered.push_str(", ");
            }
            let _ = write!(rendered, "{} {param}", param.data_type);
        }
        rendered.push(')');
        rendered
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "define {} {{", self.signature())?;
        for (index, block) in self.blocks.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{block}")?;
        }
        writeln!(f, "}}")
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "; module {}", self.name)?;
        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(name: &str) -> Symbol {
        Symbol::new(name, Type::i32())
    }

    fn pointer(name: &str) -> Symbol {
        Symbol::new(name, Type::pointer_to(Type::i32()))
    }

    fn target(id: u32, label: &str) -> BlockTarget {
        BlockTarget {
            id: BlockId(id),
            label: label.to_owned(),
        }
    }

    #[test]
    fn memory_instructions_render_with_pointer_types() {
        let load = Instruction::Load {
            dst: local("v"),
            data_type: Type::i32(),
            src: pointer("p"),
        };
        assert_eq!(load.to_string(), "%v = load i32, i32* %p");

        let store = Instruction::Store {
            src: Value::Constant(Constant::I32(5)),
            dst: pointer("p"),
        };
        assert_eq!(store.to_string(), "store i32 5, i32* %p");
    }

    #[test]
    fn branches_render_both_shapes() {
        let jump = Instruction::Br {
            cond: None,
            true_target: target(1, "exit"),
            false_target: None,
        };
        assert_eq!(jump.to_string(), "br label %exit");

        let split = Instruction::Br {
            cond: Some(Value::Symbol(Symbol::new("c", Type::i1()))),
            true_target: target(1, "then"),
            false_target: Some(target(2, "else")),
        };
        assert_eq!(split.to_string(), "br i1 %c, label %then, label %else");
    }

    #[test]
    fn calls_and_compares_render_operands() {
        let call = Instruction::Call {
            dst: local("x"),
            data_type: Type::i32(),
            callee: String::from("f"),
            args: vec![
                Value::Symbol(local("a")),
                Value::Constant(Constant::I32(-1)),
            ],
        };
        assert_eq!(call.to_string(), "%x = call i32 @f(i32 %a, i32 -1)");

        let compare = Instruction::ICmp {
            dst: Symbol::new("c", Type::i1()),
            predicate: ICmpPredicate::Slt,
            data_type: Type::i32(),
            lhs: Value::Symbol(local("a")),
            rhs: Value::Symbol(local("b")),
        };
        assert_eq!(compare.to_string(), "%c = icmp slt i32 %a, %b");
    }
}
