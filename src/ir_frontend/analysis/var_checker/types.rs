use crate::ir_frontend::compiler_errors::CompilerError;
use crate::ir_frontend::ir::ir_nodes::BlockId;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Default, Serialize)]
pub struct VarCheckReport {
    pub module: String,
    pub violations: Vec<Violation>,
    pub functions: Vec<FunctionCheckSummary>,
    pub stats: VarCheckStats,

    // Functions whose analysis was aborted. The rest of the module is still checked.
    pub errors: Vec<FunctionCheckFailure>,
}

impl VarCheckReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.errors.is_empty()
    }

    pub fn violations_in<'a>(&'a self, function: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |violation| violation.function == function)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    UsedWithoutDefined,
    LoadedWithoutStored,
}

impl ViolationKind {
    pub fn message_suffix(self) -> &'static str {
        match self {
            ViolationKind::UsedWithoutDefined => "used without defined before",
            ViolationKind::LoadedWithoutStored => "loaded without stored before",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub function: String,
    pub block: String,
    pub block_id: BlockId,
    pub instruction_index: usize,
    pub instruction: String,

    // Rendered with its sigil, e.g. "%x"
    pub symbol: String,
    pub kind: ViolationKind,

    // One-based, when the instruction came from a source file
    pub line: Option<i32>,
    pub in_unreachable_block: bool,
}

impl Violation {
    /// `<symbol> used without defined before`
    pub fn message(&self) -> String {
        format!("{} {}", self.symbol, self.kind.message_suffix())
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "@{} %{}: {}: {}",
            self.function,
            self.block,
            self.instruction,
            self.message()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionCheckSummary {
    pub name: String,
    pub blocks: usize,
    pub scope_size: usize,
    pub defined_iterations: usize,
    pub stored_iterations: usize,

    // Block visits that actually moved an OUT set
    pub defined_out_changes: usize,
    pub stored_out_changes: usize,

    pub unreachable_blocks: Vec<String>,
    pub violations: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VarCheckStats {
    pub functions_analyzed: usize,
    pub functions_failed: usize,
    pub blocks_analyzed: usize,
    pub instructions_scanned: usize,
    pub worklist_iterations: usize,
    pub violations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionCheckFailure {
    pub function: String,
    pub message: String,

    #[serde(skip)]
    pub error: CompilerError,
}

impl FunctionCheckFailure {
    pub fn new(function: impl Into<String>, error: CompilerError) -> Self {
        Self {
            function: function.into(),
            message: error.to_string(),
            error,
        }
    }
}
