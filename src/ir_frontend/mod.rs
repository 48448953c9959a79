pub mod ast;
pub mod ir;
pub mod tokenizer;

pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod display_messages;
}
pub use compiler_messages::compiler_errors;
pub use compiler_messages::display_messages;

pub mod analysis;

use crate::ir_frontend::analysis::var_checker::{CheckOptions, VarCheckReport, check_module};
use crate::ir_frontend::ast::ast_nodes::ModuleDef;
use crate::ir_frontend::ast::parse_module::parse_module;
use crate::ir_frontend::compiler_errors::{CompilerError, CompilerMessages};
use crate::ir_frontend::ir::ir_builder::build_module;
use crate::ir_frontend::ir::ir_nodes::Module;
use crate::ir_frontend::tokenizer::tokenizer::tokenize;
use crate::ir_frontend::tokenizer::tokens::FileTokens;
use crate::projects::settings::Config;
use crate::{ast_log, timer_log};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Runs a single source file through every stage up to the variable check.
/// Each stage can also be called on its own.
pub struct IrFrontend<'a> {
    pub config: &'a Config,
    pub source_path: PathBuf,
}

impl<'a> IrFrontend<'a> {
    pub fn new(config: &'a Config, source_path: &Path) -> Self {
        Self {
            config,
            source_path: source_path.to_path_buf(),
        }
    }

    /// -----------------------------
    /// TOKENIZER
    /// -----------------------------
    pub fn source_to_tokens(&self, source_code: &str) -> Result<FileTokens, CompilerError> {
        match tokenize(source_code, &self.source_path) {
            Ok(tokens) => Ok(tokens),
            Err(e) => Err(e.with_file_path(self.source_path.to_owned())),
        }
    }

    /// -----------------------------
    /// AST CREATION
    /// -----------------------------
    pub fn tokens_to_ast(&self, tokens: FileTokens) -> Result<ModuleDef, CompilerError> {
        let module = parse_module(tokens, &self.source_path)?;
        ast_log!(#module);
        Ok(module)
    }

    /// -----------------------------
    /// IR GENERATION
    /// -----------------------------
    /// Labels, branch targets and types are resolved here.
    /// The returned module is complete and read-only.
    pub fn generate_ir(&self, module: &ModuleDef) -> Result<Module, CompilerError> {
        build_module(module, &self.source_path)
    }

    // ------------------------------
    //  VARIABLE CHECKING
    // ------------------------------
    // Violations are part of the report, never errors.
    pub fn check_variables(&self, module: &Module) -> VarCheckReport {
        check_module(
            module,
            &CheckOptions {
                parallel: self.config.check.parallel,
            },
        )
    }

    /// Source text to finished report
    pub fn run(&self, source_code: &str) -> Result<(Module, VarCheckReport), CompilerMessages> {
        let time = Instant::now();
        let tokens = self.source_to_tokens(source_code)?;
        timer_log!(time, "Tokenized in: ");

        let time = Instant::now();
        let ast = self.tokens_to_ast(tokens)?;
        timer_log!(time, "AST created in: ");

        let time = Instant::now();
        let module = self.generate_ir(&ast)?;
        timer_log!(time, "IR generated in: ");

        let time = Instant::now();
        let report = self.check_variables(&module);
        timer_log!(time, "Variables checked in: ");

        Ok((module, report))
    }
}
