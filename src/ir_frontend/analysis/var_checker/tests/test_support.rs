//! Shared helpers for the variable checker tests.

use crate::ir_frontend::analysis::var_checker::{
    CheckOptions, VarCheckReport, ViolationKind, check_module,
};
use crate::ir_frontend::ast::parse_module::parse_module;
use crate::ir_frontend::ir::ir_builder::build_module;
use crate::ir_frontend::ir::ir_nodes::Module;
use crate::ir_frontend::tokenizer::tokenizer::tokenize;
use std::path::Path;

pub fn build(source: &str) -> Module {
    let path = Path::new("checks.ll");
    let tokens = tokenize(source, path).expect("source should tokenize");
    let ast = parse_module(tokens, path).expect("source should parse");
    build_module(&ast, path).expect("module should build")
}

pub fn check(source: &str) -> VarCheckReport {
    check_module(&build(source), &CheckOptions::default())
}

/// (block, symbol, kind) for every violation, in report order
pub fn summarize(report: &VarCheckReport) -> Vec<(String, String, ViolationKind)> {
    report
        .violations
        .iter()
        .map(|violation| {
            (
                violation.block.clone(),
                violation.symbol.clone(),
                violation.kind,
            )
        })
        .collect()
}

pub fn entry(block: &str, symbol: &str, kind: ViolationKind) -> (String, String, ViolationKind) {
    (block.to_owned(), symbol.to_owned(), kind)
}
