use crate::ir_frontend::analysis::bitset::BitSetError;
use crate::ir_frontend::tokenizer::tokens::CharPosition;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

// The final set of errors emitted from the frontend
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
}

impl CompilerMessages {
    pub fn from_error(error: CompilerError) -> Self {
        CompilerMessages {
            errors: vec![error],
        }
    }
}

impl From<CompilerError> for CompilerMessages {
    fn from(error: CompilerError) -> Self {
        CompilerMessages::from_error(error)
    }
}

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    CompilationStage,

    // Optional suggestions
    PrimarySuggestion,  // One-line fix or top-level idea
    SuggestedInsertion, // Text that could be inserted

    ExpectedToken,
    FoundToken,
    ExpectedType,
}

/// Where an error points to inside a source file.
/// Lines and columns are zero based, the printer adds one for humans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorLocation {
    pub scope: PathBuf,
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl ErrorLocation {
    pub fn new(scope: PathBuf, start_pos: CharPosition, end_pos: CharPosition) -> Self {
        Self {
            scope,
            start_pos,
            end_pos,
        }
    }

    pub fn from_path(scope: PathBuf) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub msg: String,
    pub location: ErrorLocation,
    pub error_type: ErrorType,

    // This is for creating more structured and detailed error messages
    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl CompilerError {
    pub fn new(
        msg: impl Into<String>,
        location: ErrorLocation,
        error_type: ErrorType,
    ) -> CompilerError {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            metadata: HashMap::new(),
        }
    }

    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.location.scope = file_path;
        self
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: &'static str) {
        self.metadata.insert(key, value);
    }

    /// Create a new syntax error with a clear explanation
    pub fn new_syntax_error(msg: impl Into<String>, location: ErrorLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::Syntax)
    }

    /// Structural problems found while turning the AST into IR
    pub fn new_ir_error(msg: impl Into<String>, location: ErrorLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::IrConstruction)
    }

    /// Broken analysis preconditions (lattice size mismatches, missing scope entries).
    /// These abort the current function only.
    pub fn new_analysis_error(msg: impl Into<String>) -> Self {
        CompilerError::new(msg, ErrorLocation::default(), ErrorType::Analysis)
    }

    /// Create a compiler error (internal bug, not user's fault)
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        CompilerError::new(msg, ErrorLocation::default(), ErrorType::Compiler)
    }

    /// Create a file system error
    pub fn file_error(path: &std::path::Path, msg: impl Into<String>) -> Self {
        CompilerError::new(
            msg,
            ErrorLocation::from_path(path.to_path_buf()),
            ErrorType::File,
        )
    }

    pub fn config_error(path: &std::path::Path, msg: impl Into<String>) -> Self {
        CompilerError::new(
            msg,
            ErrorLocation::from_path(path.to_path_buf()),
            ErrorType::Config,
        )
    }
}

impl Display for CompilerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", error_type_to_str(&self.error_type), self.msg)
    }
}

impl From<BitSetError> for CompilerError {
    fn from(error: BitSetError) -> Self {
        let mut compiler_error = CompilerError::new_analysis_error(error.to_string());
        compiler_error.new_metadata_entry(ErrorMetaDataKey::CompilationStage, "Dataflow");
        compiler_error
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorType {
    Syntax,
    IrConstruction,
    Analysis,
    File,
    Config,
    Compiler,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Compiler => "Checker Bug",
        ErrorType::Syntax => "Syntax Error",
        ErrorType::IrConstruction => "IR Construction",
        ErrorType::Analysis => "Analysis Failure",
        ErrorType::File => "File Error",
        ErrorType::Config => "Malformed Config",
    }
}

/// Returns a new CompilerError for syntax violations.
///
/// Usage:
/// `return_syntax_error!("message", location, {
///     CompilationStage => "Parsing",
///     PrimarySuggestion => "Did you forget a comma?",
/// })`;
#[macro_export]
macro_rules! return_syntax_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::ir_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::ir_frontend::compiler_errors::ErrorType::Syntax,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert($crate::ir_frontend::compiler_errors::ErrorMetaDataKey::$key, $value);
                )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::ir_frontend::compiler_errors::CompilerError::new_syntax_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError for a malformed CFG
/// (duplicate labels, branches to unknown blocks, unknown types).
#[macro_export]
macro_rules! return_ir_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::ir_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::ir_frontend::compiler_errors::ErrorType::IrConstruction,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert($crate::ir_frontend::compiler_errors::ErrorMetaDataKey::$key, $value);
                )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::ir_frontend::compiler_errors::CompilerError::new_ir_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError when an analysis precondition does not hold.
#[macro_export]
macro_rules! return_analysis_error {
    ($msg:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::ir_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $crate::ir_frontend::compiler_errors::ErrorLocation::default(),
            error_type: $crate::ir_frontend::compiler_errors::ErrorType::Analysis,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert($crate::ir_frontend::compiler_errors::ErrorMetaDataKey::$key, $value);
                )*
                map
            },
        })
    };
    ($msg:expr) => {
        return Err($crate::ir_frontend::compiler_errors::CompilerError::new_analysis_error($msg))
    };
}

/// Returns a new CompilerError
///
/// Usage: `return_file_error!(path, "message")`;
#[macro_export]
macro_rules! return_file_error {
    ($path:expr, $msg:expr) => {{
        return Err($crate::ir_frontend::compiler_errors::CompilerError::file_error(
            $path, $msg,
        ));
    }};
}

/// Returns a new CompilerError
///
/// Usage: `return_config_error!(path, "message")`;
#[macro_export]
macro_rules! return_config_error {
    ($path:expr, $msg:expr) => {{
        return Err($crate::ir_frontend::compiler_errors::CompilerError::config_error(
            $path, $msg,
        ));
    }};
}

/// Returns a new CompilerError for internal checker bugs.
#[macro_export]
macro_rules! return_compiler_error {
    ($fmt:expr, $($arg:expr),+ $(,)?) => {{
        return Err($crate::ir_frontend::compiler_errors::CompilerError::compiler_error(
            format!($fmt, $($arg),+),
        ));
    }};
    ($msg:expr) => {{
        return Err($crate::ir_frontend::compiler_errors::CompilerError::compiler_error($msg));
    }};
}
