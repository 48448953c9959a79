//! Syntax tree for the textual IR.
//!
//! Names are kept without their sigils (`%x` is stored as `x`). Types and operands are still
//! unresolved here: the IR builder decides what `i32*` means and which symbol `%x` refers to.

use crate::ir_frontend::ir::ir_nodes::{BinaryOp, ICmpPredicate};
use crate::ir_frontend::tokenizer::tokens::TextLocation;

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDef {
    pub name: String,
    pub functions: Vec<FunctionDef>,

    // `declare` lines, kept only so callees can be listed
    pub declarations: Vec<FunctionSignature>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub signature: FunctionSignature,
    pub blocks: Vec<BlockDef>,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub return_type: TypeDecl,
    pub name: String,
    pub params: Vec<ParamDef>,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub data_type: TypeDecl,

    // Declarations may leave parameters unnamed
    pub name: Option<String>,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockDef {
    pub label: Option<String>,
    pub instructions: Vec<InstDef>,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstDef {
    pub kind: InstKind,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    Assign {
        dst: String,
        rhs: RhsExpr,
    },
    Store {
        src: TypedOperand,
        dst: TypedOperand,
    },
    Br {
        cond: Option<TypedOperand>,
        true_label: String,
        false_label: Option<String>,
    },
    Ret(TypedOperand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RhsExpr {
    Alloca(TypeDecl),
    Load {
        data_type: TypeDecl,
        src: TypedOperand,
    },
    Binary {
        op: BinaryOp,
        data_type: TypeDecl,
        lhs: Operand,
        rhs: Operand,
    },
    ICmp {
        predicate: ICmpPredicate,
        data_type: TypeDecl,
        lhs: Operand,
        rhs: Operand,
    },
    Call {
        return_type: TypeDecl,
        callee: String,
        args: Vec<TypedOperand>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    // Primitive name as written, e.g. "i32"
    pub name: String,
    pub pointer_depth: usize,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandKind {
    Local(String),
    Digits(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedOperand {
    pub data_type: TypeDecl,
    pub value: Operand,
}
