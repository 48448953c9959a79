//! ============================================================
//!                         IR Nodes
//! ============================================================
//! The control-flow graph the checker runs on.
//!  - A Module owns its Functions in source order
//!  - A Function owns its blocks, entry first, plus a frozen Scope
//!  - Blocks are referenced by dense BlockIds, never by pointer
//!  - Every instruction exposes what it defines and what it reads
//!
//! The graph is produced once by the IR builder and is read-only afterwards.

use crate::ir_frontend::ir::ir_datatypes::Type;
use crate::ir_frontend::ir::ir_display::IrSideTable;
use crate::ir_frontend::ir::scope::Scope;
use serde::Serialize;
use std::hash::{Hash, Hasher};

// ============================================================
// Stable IDs
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================
// Values
// ============================================================

/// A named register or stack slot.
/// Two symbols with the same name are the same variable, whatever their type says.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub data_type: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, data_type: Type) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    I32(i32),
}

impl Constant {
    pub fn data_type(&self) -> Type {
        match self {
            Constant::I32(_) => Type::i32(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Symbol(Symbol),
    Constant(Constant),
}

impl Value {
    pub fn data_type(&self) -> Type {
        match self {
            Value::Symbol(symbol) => symbol.data_type.clone(),
            Value::Constant(constant) => constant.data_type(),
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(symbol) => Some(symbol),
            Value::Constant(_) => None,
        }
    }

    pub fn as_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Symbol(symbol) => ValueRef::Symbol(symbol),
            Value::Constant(constant) => ValueRef::Constant(constant),
        }
    }
}

/// Borrowed operand returned by `Instruction::uses`.
/// Lets `Load.src` (always a symbol) and `Value` operands share one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRef<'a> {
    Symbol(&'a Symbol),
    Constant(&'a Constant),
}

impl<'a> ValueRef<'a> {
    pub fn as_symbol(self) -> Option<&'a Symbol> {
        match self {
            ValueRef::Symbol(symbol) => Some(symbol),
            ValueRef::Constant(_) => None,
        }
    }
}

// ============================================================
// Instructions
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
}

impl BinaryOp {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let op = match keyword {
            "add" => BinaryOp::Add,
            "sub" => BinaryOp::Sub,
            "mul" => BinaryOp::Mul,
            "sdiv" => BinaryOp::SDiv,
            "udiv" => BinaryOp::UDiv,
            "srem" => BinaryOp::SRem,
            "urem" => BinaryOp::URem,
            "and" => BinaryOp::And,
            "or" => BinaryOp::Or,
            "xor" => BinaryOp::Xor,
            "shl" => BinaryOp::Shl,
            "lshr" => BinaryOp::LShr,
            "ashr" => BinaryOp::AShr,
            _ => return None,
        };
        Some(op)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::UDiv => "udiv",
            BinaryOp::SRem => "srem",
            BinaryOp::URem => "urem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::LShr => "lshr",
            BinaryOp::AShr => "ashr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ICmpPredicate {
    Eq,
    Ne,
    Ugt,
    Uge,
    Ult,
    Ule,
    Sgt,
    Sge,
    Slt,
    Sle,
}

impl ICmpPredicate {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let predicate = match keyword {
            "eq" => ICmpPredicate::Eq,
            "ne" => ICmpPredicate::Ne,
            "ugt" => ICmpPredicate::Ugt,
            "uge" => ICmpPredicate::Uge,
            "ult" => ICmpPredicate::Ult,
            "ule" => ICmpPredicate::Ule,
            "sgt" => ICmpPredicate::Sgt,
            "sge" => ICmpPredicate::Sge,
            "slt" => ICmpPredicate::Slt,
            "sle" => ICmpPredicate::Sle,
            _ => return None,
        };
        Some(predicate)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ICmpPredicate::Eq => "eq",
            ICmpPredicate::Ne => "ne",
            ICmpPredicate::Ugt => "ugt",
            ICmpPredicate::Uge => "uge",
            ICmpPredicate::Ult => "ult",
            ICmpPredicate::Ule => "ule",
            ICmpPredicate::Sgt => "sgt",
            ICmpPredicate::Sge => "sge",
            ICmpPredicate::Slt => "slt",
            ICmpPredicate::Sle => "sle",
        }
    }
}

/// A branch destination. The label is kept next to the id so instructions render on their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockTarget {
    pub id: BlockId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Alloca {
        dst: Symbol,
        data_type: Type,
    },
    Load {
        dst: Symbol,
        data_type: Type,
        src: Symbol,
    },
    Store {
        src: Value,
        dst: Symbol,
    },
    Call {
        dst: Symbol,
        data_type: Type,
        callee: String,
        args: Vec<Value>,
    },
    Binary {
        dst: Symbol,
        op: BinaryOp,
        data_type: Type,
        lhs: Value,
        rhs: Value,
    },
    ICmp {
        dst: Symbol,
        predicate: ICmpPredicate,
        data_type: Type,
        lhs: Value,
        rhs: Value,
    },

    // `cond == None` is an unconditional jump and has no false target
    Br {
        cond: Option<Value>,
        true_target: BlockTarget,
        false_target: Option<BlockTarget>,
    },
    Ret {
        value: Value,
    },
}

impl Instruction {
    /// The symbol this instruction writes, if any.
    /// A store counts as writing its destination pointer.
    pub fn def(&self) -> Option<&Symbol> {
        match self {
            Instruction::Alloca { dst, .. }
            | Instruction::Load { dst, .. }
            | Instruction::Store { dst, .. }
            | Instruction::Call { dst, .. }
            | Instruction::Binary { dst, .. }
            | Instruction::ICmp { dst, .. } => Some(dst),

            Instruction::Br { .. } | Instruction::Ret { .. } => None,
        }
    }

    /// Operands this instruction reads, constants included.
    /// The destination of a store is not a read.
    pub fn uses(&self) -> Vec<ValueRef<'_>> {
        match self {
            Instruction::Alloca { .. } => Vec::new(),
            Instruction::Load { src, .. } => vec![ValueRef::Symbol(src)],
            Instruction::Store { src, .. } => vec![src.as_ref()],
            Instruction::Call { args, .. } => args.iter().map(Value::as_ref).collect(),
            Instruction::Binary { lhs, rhs, .. } | Instruction::ICmp { lhs, rhs, .. } => {
                vec![lhs.as_ref(), rhs.as_ref()]
            }
            Instruction::Br { cond, .. } => cond.iter().map(Value::as_ref).collect(),
            Instruction::Ret { value } => vec![value.as_ref()],
        }
    }

    pub fn used_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.uses().into_iter().filter_map(ValueRef::as_symbol)
    }

    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Instruction::Br {
                true_target,
                false_target,
                ..
            } => {
                let mut targets = vec![true_target.id];
                if let Some(false_target) = false_target {
                    targets.push(false_target.id);
                }
                targets
            }
            _ => Vec::new(),
        }
    }
}

// ============================================================
// Blocks
// ============================================================
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,
    pub name: String,
    pub instructions: Vec<Instruction>,
    pub preds: Vec<BlockId>,
    pub succs: Vec<BlockId>,
}

impl BasicBlock {
    pub fn new(id: BlockId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            instructions: Vec::new(),
            preds: Vec::new(),
            succs: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

// Blocks are keyed by id, which is unique inside a function the same way names are
impl PartialEq for BasicBlock {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BasicBlock {}

// ============================================================
// Functions
// ============================================================
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Symbol>,

    /// Entry block is always `blocks[0]`
    pub blocks: Vec<BasicBlock>,

    /// Blocks that leave the function. Informational only.
    pub exits: Vec<BlockId>,

    pub scope: Scope,
    pub side_table: IrSideTable,
}

impl Function {
    pub fn entry(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    pub fn block_by_name(&self, name: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|block| block.name == name)
    }

    pub fn edge_count(&self) -> usize {
        self.blocks.iter().map(|block| block.succs.len()).sum()
    }
}

// ============================================================
// Module
// ============================================================
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>, functions: Vec<Function>) -> Self {
        Self {
            name: name.into(),
            functions,
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }
}
