//! AST -> IR lowering.
//!
//! The only producer of `Module`s. Each function is built in two passes:
//! first every block is declared so forward branches resolve, then the
//! instructions are lowered and edges are wired up as branches are pushed.

use crate::ir_frontend::ast::ast_nodes::{
    BlockDef, FunctionDef, InstDef, InstKind, ModuleDef, Operand, OperandKind, RhsExpr, TypeDecl,
    TypedOperand,
};
use crate::ir_frontend::compiler_errors::CompilerError;
use crate::ir_frontend::ir::function_builder::FunctionBuilder;
use crate::ir_frontend::ir::ir_datatypes::Type;
use crate::ir_frontend::ir::ir_nodes::{
    BlockId, BlockTarget, Constant, Function, Instruction, Module, Symbol, Value,
};
use crate::{ir_log, return_ir_error};
use std::path::Path;

/// Name given to a first block that has no label
pub const DEFAULT_ENTRY_LABEL: &str = "entry";

pub fn build_module(module: &ModuleDef, src_path: &Path) -> Result<Module, CompilerError> {
    let mut functions = Vec::with_capacity(module.functions.len());

    for function in &module.functions {
        let built = FunctionLowering::new(src_path).build(function)?;
        ir_log!(Blue "Built IR for ", Bold { built.name.as_str() });
        ir_log!({ built.to_string() });
        functions.push(built);
    }

    Ok(Module::new(module.name.clone(), functions))
}

struct FunctionLowering<'a> {
    src_path: &'a Path,
}

impl<'a> FunctionLowering<'a> {
    fn new(src_path: &'a Path) -> Self {
        Self { src_path }
    }

    fn build(&self, def: &FunctionDef) -> Result<Function, CompilerError> {
        let signature = &def.signature;
        let return_type = self.resolve_type(&signature.return_type)?;

        let mut params = Vec::with_capacity(signature.params.len());
        for param in &signature.params {
            let data_type = self.resolve_type(&param.data_type)?;
            let Some(name) = &param.name else {
                return_ir_error!(
                    format!("Parameter of '@{}' needs a name in a definition", signature.name),
                    param.location.to_error_location(self.src_path),
                    {
                        CompilationStage => "IR Construction",
                        PrimarySuggestion => "Give the parameter a name like '%0'",
                    }
                )
            };
            params.push(Symbol::new(name.as_str(), data_type));
        }

        let mut builder = FunctionBuilder::new(signature.name.as_str(), return_type, params)
            .with_source(self.src_path, def.location);

        // Declare every block up front so branches can point forwards
        let mut block_ids = Vec::with_capacity(def.blocks.len());
        for (index, block) in def.blocks.iter().enumerate() {
            let label = block_label(block, index);
            block_ids.push(builder.add_block(label, block.location)?);
        }

        for (block, id) in def.blocks.iter().zip(block_ids) {
            for inst in &block.instructions {
                let instruction = self.lower_instruction(&mut builder, inst)?;
                builder.push_instruction(id, instruction, Some(inst.location))?;
            }
        }

        builder.finish()
    }

    fn lower_instruction(
        &self,
        builder: &mut FunctionBuilder,
        inst: &InstDef,
    ) -> Result<Instruction, CompilerError> {
        let instruction = match &inst.kind {
            InstKind::Assign { dst, rhs } => self.lower_assign(builder, dst, rhs)?,

            InstKind::Store { src, dst } => {
                let src = self.lower_typed_operand(builder, src)?;
                let dst = self.lower_pointer(builder, dst, "store destination")?;
                Instruction::Store { src, dst }
            }

            InstKind::Br {
                cond,
                true_label,
                false_label,
            } => {
                let cond = match cond {
                    Some(cond) => Some(self.lower_typed_operand(builder, cond)?),
                    None => None,
                };
                let true_target = self.resolve_target(builder, true_label, inst)?;
                let false_target = match false_label {
                    Some(label) => Some(self.resolve_target(builder, label, inst)?),
                    None => None,
                };
                Instruction::Br {
                    cond,
                    true_target,
                    false_target,
                }
            }

            InstKind::Ret(value) => Instruction::Ret {
                value: self.lower_typed_operand(builder, value)?,
            },
        };

        Ok(instruction)
    }

    fn lower_assign(
        &self,
        builder: &mut FunctionBuilder,
        dst: &str,
        rhs: &RhsExpr,
    ) -> Result<Instruction, CompilerError> {
        let instruction = match rhs {
            RhsExpr::Alloca(data_type) => {
                let data_type = self.resolve_type(data_type)?;
                Instruction::Alloca {
                    dst: builder.symbol(dst, Type::pointer_to(data_type.clone())),
                    data_type,
                }
            }

            RhsExpr::Load { data_type, src } => {
                let data_type = self.resolve_type(data_type)?;
                let src = self.lower_pointer(builder, src, "load source")?;
                Instruction::Load {
                    dst: builder.symbol(dst, data_type.clone()),
                    data_type,
                    src,
                }
            }

            RhsExpr::Binary {
                op,
                data_type,
                lhs,
                rhs,
            } => {
                let data_type = self.resolve_type(data_type)?;
                let lhs = self.lower_operand(builder, lhs, &data_type)?;
                let rhs = self.lower_operand(builder, rhs, &data_type)?;
                Instruction::Binary {
                    dst: builder.symbol(dst, data_type.clone()),
                    op: *op,
                    data_type,
                    lhs,
                    rhs,
                }
            }

            RhsExpr::ICmp {
                predicate,
                data_type,
                lhs,
                rhs,
            } => {
                let data_type = self.resolve_type(data_type)?;
                let lhs = self.lower_operand(builder, lhs, &data_type)?;
                let rhs = self.lower_operand(builder, rhs, &data_type)?;
                Instruction::ICmp {
                    dst: builder.symbol(dst, Type::i1()),
                    predicate: *predicate,
                    data_type,
                    lhs,
                    rhs,
                }
            }

            RhsExpr::Call {
                return_type,
                callee,
                args,
            } => {
                let data_type = self.resolve_type(return_type)?;
                let mut lowered_args = Vec::with_capacity(args.len());
                for arg in args {
                    lowered_args.push(self.lower_typed_operand(builder, arg)?);
                }
                Instruction::Call {
                    dst: builder.symbol(dst, data_type.clone()),
                    data_type,
                    callee: callee.to_owned(),
                    args: lowered_args,
                }
            }
        };

        Ok(instruction)
    }

    fn resolve_type(&self, decl: &TypeDecl) -> Result<Type, CompilerError> {
        let Some(mut data_type) = Type::from_primitive_name(&decl.name) else {
            return_ir_error!(
                format!("Unknown type '{}'", decl.name),
                decl.location.to_error_location(self.src_path),
                {
                    CompilationStage => "IR Construction",
                    ExpectedType => "i1, i8, i16, i32 or i64",
                }
            )
        };

        for _ in 0..decl.pointer_depth {
            data_type = Type::pointer_to(data_type);
        }

        Ok(data_type)
    }

    fn resolve_target(
        &self,
        builder: &FunctionBuilder,
        label: &str,
        inst: &InstDef,
    ) -> Result<BlockTarget, CompilerError> {
        let Some(id) = builder.block_id(label) else {
            return_ir_error!(
                format!("Branch to unknown block '%{label}' in '@{}'", builder.name()),
                inst.location.to_error_location(self.src_path),
                {
                    CompilationStage => "IR Construction",
                    PrimarySuggestion => "Check the label is spelled the same as its block",
                }
            )
        };

        Ok(BlockTarget {
            id,
            label: label.to_owned(),
        })
    }

    fn lower_typed_operand(
        &self,
        builder: &mut FunctionBuilder,
        operand: &TypedOperand,
    ) -> Result<Value, CompilerError> {
        let data_type = self.resolve_type(&operand.data_type)?;
        self.lower_operand(builder, &operand.value, &data_type)
    }

    fn lower_operand(
        &self,
        builder: &mut FunctionBuilder,
        operand: &Operand,
        data_type: &Type,
    ) -> Result<Value, CompilerError> {
        match &operand.kind {
            OperandKind::Local(name) => Ok(Value::Symbol(builder.symbol(name, data_type.clone()))),

            OperandKind::Digits(digits) => {
                let Ok(value) = digits.parse::<i32>() else {
                    return_ir_error!(
                        format!("Integer constant '{digits}' does not fit in 32 bits"),
                        operand.location.to_error_location(self.src_path),
                        {
                            CompilationStage => "IR Construction",
                        }
                    )
                };
                Ok(Value::Constant(Constant::I32(value)))
            }
        }
    }

    /// Memory operands must name a pointer symbol, never a constant
    fn lower_pointer(
        &self,
        builder: &mut FunctionBuilder,
        operand: &TypedOperand,
        role: &str,
    ) -> Result<Symbol, CompilerError> {
        let data_type = self.resolve_type(&operand.data_type)?;
        if !data_type.is_pointer() {
            return_ir_error!(
                format!("The {role} must have a pointer type, found '{data_type}'"),
                operand.data_type.location.to_error_location(self.src_path),
                {
                    CompilationStage => "IR Construction",
                    ExpectedType => "pointer",
                }
            )
        }

        let OperandKind::Local(name) = &operand.value.kind else {
            return_ir_error!(
                format!("The {role} must be a local pointer, not a constant"),
                operand.value.location.to_error_location(self.src_path),
                {
                    CompilationStage => "IR Construction",
                }
            )
        };

        Ok(builder.symbol(name, data_type))
    }
}

fn block_label(block: &BlockDef, index: usize) -> &str {
    match &block.label {
        Some(label) => label,
        None if index == 0 => DEFAULT_ENTRY_LABEL,
        // The parser only allows the first block to be unlabeled
        None => "",
    }
}

/// Looks up where an instruction came from, for error reporting outside the builder
pub fn instruction_line(function: &Function, block: BlockId, index: usize) -> Option<i32> {
    function
        .side_table
        .instruction_location(block, index)
        .map(|location| location.display_line())
}

#[cfg(test)]
#[path = "tests/ir_builder_tests.rs"]
mod ir_builder_tests;
