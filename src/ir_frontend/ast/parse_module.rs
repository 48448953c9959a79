//! Recursive descent parser for the textual IR subset.
//!
//! Only the pieces the checker needs are given structure. Linkage words, parameter
//! attributes, attribute group refs and `align` suffixes are consumed and thrown away.

use crate::ast_log;
use crate::ir_frontend::ast::ast_nodes::{
    BlockDef, FunctionDef, FunctionSignature, InstDef, InstKind, ModuleDef, Operand, OperandKind,
    ParamDef, RhsExpr, TypeDecl, TypedOperand,
};
use crate::ir_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::ir_frontend::ir::ir_nodes::{BinaryOp, ICmpPredicate};
use crate::ir_frontend::tokenizer::tokens::{FileTokens, TextLocation, Token, TokenKind};
use crate::return_syntax_error;
use std::path::Path;

// Instruction flags that change nothing about definedness
const IGNORED_FLAGS: [&str; 4] = ["nsw", "nuw", "exact", "volatile"];

/// Parses a whole token stream into a module.
/// The module takes its name from the file stem of `src_path`.
pub fn parse_module(tokens: FileTokens, src_path: &Path) -> Result<ModuleDef, CompilerError> {
    let name = src_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut parser = Parser::new(tokens, src_path);
    let mut functions = Vec::new();
    let mut declarations = Vec::new();

    loop {
        match parser.current().clone() {
            TokenKind::Eof => break,

            TokenKind::Reserved(word) if word == "define" => {
                let function = parser.parse_function()?;
                ast_log!("Parsed function ", Green { function.signature.name.as_str() });
                functions.push(function);
            }

            TokenKind::Reserved(word) if word == "declare" => {
                parser.advance();
                declarations.push(parser.parse_signature()?);
                parser.skip_trailing_attributes();
            }

            other => {
                return_syntax_error!(
                    format!("Expected 'define' or 'declare' at the top level, found {other}"),
                    parser.error_location(),
                    {
                        CompilationStage => "Parsing",
                        ExpectedToken => "define",
                    }
                )
            }
        }
    }

    Ok(ModuleDef {
        name,
        functions,
        declarations,
    })
}

struct Parser<'a> {
    tokens: FileTokens,
    src_path: &'a Path,

    // End of the most recently consumed token, used to close node locations
    previous_location: TextLocation,
}

impl<'a> Parser<'a> {
    fn new(tokens: FileTokens, src_path: &'a Path) -> Self {
        Self {
            tokens,
            src_path,
            previous_location: TextLocation::default(),
        }
    }

    // ------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------

    fn current(&self) -> &TokenKind {
        self.tokens.current_token_kind()
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.advance();
        self.previous_location = token.location;
        token
    }

    fn error_location(&self) -> ErrorLocation {
        self.tokens
            .current_location()
            .to_error_location(self.src_path)
    }

    fn span_from(&self, start: TextLocation) -> TextLocation {
        TextLocation::new(start.start_pos, self.previous_location.end_pos)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, CompilerError> {
        if *self.current() != expected {
            return_syntax_error!(
                format!("Expected {expected}, found {}", self.current()),
                self.error_location(),
                {
                    CompilationStage => "Parsing",
                }
            )
        }
        Ok(self.advance())
    }

    fn expect_reserved(&mut self, word: &'static str) -> Result<Token, CompilerError> {
        if !self.current().is_reserved(word) {
            return_syntax_error!(
                format!("Expected '{word}', found {}", self.current()),
                self.error_location(),
                {
                    CompilationStage => "Parsing",
                    ExpectedToken => word,
                }
            )
        }
        Ok(self.advance())
    }

    fn expect_local(&mut self) -> Result<(String, TextLocation), CompilerError> {
        let TokenKind::LocalId(name) = self.current().clone() else {
            return_syntax_error!(
                format!("Expected a local name like '%x', found {}", self.current()),
                self.error_location(),
                {
                    CompilationStage => "Parsing",
                }
            )
        };
        let token = self.advance();
        Ok((name, token.location))
    }

    fn expect_global(&mut self) -> Result<String, CompilerError> {
        let TokenKind::GlobalId(name) = self.current().clone() else {
            return_syntax_error!(
                format!("Expected a function name like '@f', found {}", self.current()),
                self.error_location(),
                {
                    CompilationStage => "Parsing",
                }
            )
        };
        self.advance();
        Ok(name)
    }

    fn at_type(&self) -> bool {
        matches!(self.current(), TokenKind::Reserved(word) if is_type_word(word))
    }

    /// Drops linkage words, parameter attributes and `#N` group refs
    fn skip_attribute_words(&mut self) {
        loop {
            match self.current() {
                TokenKind::Reserved(word) if !is_type_word(word) => {}
                TokenKind::GroupNum(_) => {}
                _ => return,
            }
            self.advance();
        }
    }

    fn skip_trailing_attributes(&mut self) {
        while matches!(
            self.current(),
            TokenKind::Reserved(word) if word != "define" && word != "declare"
        ) || matches!(self.current(), TokenKind::GroupNum(_))
        {
            self.advance();
        }
    }

    /// `, align N` after memory instructions
    fn skip_alignment(&mut self) -> Result<(), CompilerError> {
        if *self.current() == TokenKind::Comma && self.tokens.peek_kind(1).is_reserved("align") {
            self.advance();
            self.advance();
            self.parse_digits()?;
        }
        Ok(())
    }

    fn skip_flags(&mut self) {
        while matches!(self.current(), TokenKind::Reserved(word) if IGNORED_FLAGS.contains(&word.as_str()))
        {
            self.advance();
        }
    }

    fn parse_digits(&mut self) -> Result<String, CompilerError> {
        let TokenKind::Digits(digits) = self.current().clone() else {
            return_syntax_error!(
                format!("Expected a number, found {}", self.current()),
                self.error_location(),
                {
                    CompilationStage => "Parsing",
                }
            )
        };
        self.advance();
        Ok(digits)
    }

    // ------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------

    fn parse_function(&mut self) -> Result<FunctionDef, CompilerError> {
        let start = self.expect_reserved("define")?.location;
        let signature = self.parse_signature()?;

        // Attributes between ')' and '{'
        self.skip_attribute_words();
        self.expect(TokenKind::LeftCurly)?;

        let mut blocks = Vec::new();
        while *self.current() != TokenKind::RightCurly {
            if *self.current() == TokenKind::Eof {
                return_syntax_error!(
                    format!("Function '@{}' is missing its closing '}}'", signature.name),
                    self.error_location(),
                    {
                        CompilationStage => "Parsing",
                        SuggestedInsertion => "}",
                    }
                )
            }
            blocks.push(self.parse_block(blocks.is_empty())?);
        }
        self.advance();

        if blocks.is_empty() {
            return_syntax_error!(
                format!("Function '@{}' has an empty body", signature.name),
                self.span_from(start).to_error_location(self.src_path),
                {
                    CompilationStage => "Parsing",
                }
            )
        }

        Ok(FunctionDef {
            signature,
            blocks,
            location: self.span_from(start),
        })
    }

    /// `<attrs> type @name(params)`, shared by `define` and `declare`
    fn parse_signature(&mut self) -> Result<FunctionSignature, CompilerError> {
        let start = self.tokens.current_location();
        self.skip_attribute_words();

        let return_type = self.parse_type()?;
        self.skip_attribute_words();
        let name = self.expect_global()?;

        self.expect(TokenKind::LeftRound)?;
        let mut params = Vec::new();
        while *self.current() != TokenKind::RightRound {
            if !params.is_empty() {
                self.expect(TokenKind::Comma)?;
            }

            let param_start = self.tokens.current_location();
            let data_type = self.parse_type()?;
            self.skip_attribute_words();

            let name = match self.current() {
                TokenKind::LocalId(_) => Some(self.expect_local()?.0),
                _ => None,
            };

            params.push(ParamDef {
                data_type,
                name,
                location: self.span_from(param_start),
            });
        }
        self.advance();

        Ok(FunctionSignature {
            return_type,
            name,
            params,
            location: self.span_from(start),
        })
    }

    // ------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------

    fn at_label(&self) -> bool {
        matches!(
            self.current(),
            TokenKind::Reserved(_) | TokenKind::Digits(_)
        ) && *self.tokens.peek_kind(1) == TokenKind::Colon
    }

    fn parse_block(&mut self, is_first: bool) -> Result<BlockDef, CompilerError> {
        let start = self.tokens.current_location();

        let label = if self.at_label() {
            let label = match self.advance().kind {
                TokenKind::Reserved(word) => word,
                TokenKind::Digits(digits) => digits,
                _ => String::new(),
            };
            self.advance();
            Some(label)
        } else if is_first {
            None
        } else {
            return_syntax_error!(
                format!("Expected a block label, found {}", self.current()),
                self.error_location(),
                {
                    CompilationStage => "Parsing",
                    PrimarySuggestion => "Every block after the first needs a 'name:' label",
                }
            )
        };

        let mut instructions = Vec::new();
        while !self.at_label() && *self.current() != TokenKind::RightCurly {
            if *self.current() == TokenKind::Eof {
                break;
            }
            instructions.push(self.parse_instruction()?);
        }

        Ok(BlockDef {
            label,
            instructions,
            location: self.span_from(start),
        })
    }

    // ------------------------------------------------------------
    // Instructions
    // ------------------------------------------------------------

    fn parse_instruction(&mut self) -> Result<InstDef, CompilerError> {
        let start = self.tokens.current_location();

        let kind = match self.current().clone() {
            TokenKind::LocalId(dst) => {
                self.advance();
                self.expect(TokenKind::Equal)?;
                let rhs = self.parse_rhs()?;
                InstKind::Assign { dst, rhs }
            }

            TokenKind::Reserved(word) if word == "store" => {
                self.advance();
                self.skip_flags();
                let src = self.parse_typed_operand()?;
                self.expect(TokenKind::Comma)?;
                let dst = self.parse_typed_operand()?;
                self.skip_alignment()?;
                InstKind::Store { src, dst }
            }

            TokenKind::Reserved(word) if word == "br" => {
                self.advance();
                self.parse_branch()?
            }

            TokenKind::Reserved(word) if word == "ret" => {
                self.advance();
                if self.current().is_reserved("void") {
                    return_syntax_error!(
                        "'ret void' is not supported, functions must return a value",
                        self.error_location(),
                        {
                            CompilationStage => "Parsing",
                            FoundToken => "void",
                        }
                    )
                }
                InstKind::Ret(self.parse_typed_operand()?)
            }

            other => {
                return_syntax_error!(
                    format!("Expected an instruction, found {other}"),
                    self.error_location(),
                    {
                        CompilationStage => "Parsing",
                    }
                )
            }
        };

        Ok(InstDef {
            kind,
            location: self.span_from(start),
        })
    }

    fn parse_branch(&mut self) -> Result<InstKind, CompilerError> {
        if self.current().is_reserved("label") {
            self.advance();
            let (true_label, _) = self.expect_local()?;
            return Ok(InstKind::Br {
                cond: None,
                true_label,
                false_label: None,
            });
        }

        let cond = self.parse_typed_operand()?;
        self.expect(TokenKind::Comma)?;
        self.expect_reserved("label")?;
        let (true_label, _) = self.expect_local()?;
        self.expect(TokenKind::Comma)?;
        self.expect_reserved("label")?;
        let (false_label, _) = self.expect_local()?;

        Ok(InstKind::Br {
            cond: Some(cond),
            true_label,
            false_label: Some(false_label),
        })
    }

    fn parse_rhs(&mut self) -> Result<RhsExpr, CompilerError> {
        let TokenKind::Reserved(word) = self.current().clone() else {
            return_syntax_error!(
                format!("Expected an operation after '=', found {}", self.current()),
                self.error_location(),
                {
                    CompilationStage => "Parsing",
                }
            )
        };
        self.advance();

        if let Some(op) = BinaryOp::from_keyword(&word) {
            self.skip_flags();
            let data_type = self.parse_type()?;
            let lhs = self.parse_operand()?;
            self.expect(TokenKind::Comma)?;
            let rhs = self.parse_operand()?;
            return Ok(RhsExpr::Binary {
                op,
                data_type,
                lhs,
                rhs,
            });
        }

        match word.as_str() {
            "alloca" => {
                let data_type = self.parse_type()?;
                self.skip_alignment()?;
                Ok(RhsExpr::Alloca(data_type))
            }

            "load" => {
                self.skip_flags();
                let data_type = self.parse_type()?;
                self.expect(TokenKind::Comma)?;
                let src = self.parse_typed_operand()?;
                self.skip_alignment()?;
                Ok(RhsExpr::Load { data_type, src })
            }

            "icmp" => {
                let predicate_location = self.error_location();
                let predicate = match self.current() {
                    TokenKind::Reserved(keyword) => ICmpPredicate::from_keyword(keyword),
                    _ => None,
                };
                let Some(predicate) = predicate else {
                    return_syntax_error!(
                        format!("Unknown icmp predicate {}", self.current()),
                        predicate_location,
                        {
                            CompilationStage => "Parsing",
                            ExpectedToken => "eq, ne, ugt, uge, ult, ule, sgt, sge, slt, sle",
                        }
                    )
                };
                self.advance();

                let data_type = self.parse_type()?;
                let lhs = self.parse_operand()?;
                self.expect(TokenKind::Comma)?;
                let rhs = self.parse_operand()?;
                Ok(RhsExpr::ICmp {
                    predicate,
                    data_type,
                    lhs,
                    rhs,
                })
            }

            "call" => {
                self.skip_attribute_words();
                let return_type = self.parse_type()?;
                self.skip_attribute_words();
                let callee = self.expect_global()?;

                self.expect(TokenKind::LeftRound)?;
                let mut args = Vec::new();
                while *self.current() != TokenKind::RightRound {
                    if !args.is_empty() {
                        self.expect(TokenKind::Comma)?;
                    }
                    let data_type = self.parse_type()?;
                    self.skip_attribute_words();
                    let value = self.parse_operand()?;
                    args.push(TypedOperand { data_type, value });
                }
                self.advance();

                // Call site attribute groups
                while matches!(self.current(), TokenKind::GroupNum(_)) {
                    self.advance();
                }

                Ok(RhsExpr::Call {
                    return_type,
                    callee,
                    args,
                })
            }

            _ => {
                return_syntax_error!(
                    format!("Unsupported operation '{word}'"),
                    self.previous_location.to_error_location(self.src_path),
                    {
                        CompilationStage => "Parsing",
                        FoundToken => "unsupported operation",
                    }
                )
            }
        }
    }

    // ------------------------------------------------------------
    // Types and operands
    // ------------------------------------------------------------

    fn parse_type(&mut self) -> Result<TypeDecl, CompilerError> {
        if !self.at_type() {
            return_syntax_error!(
                format!("Expected a type like 'i32', found {}", self.current()),
                self.error_location(),
                {
                    CompilationStage => "Parsing",
                    ExpectedType => "i1, i8, i16, i32 or i64",
                }
            )
        }

        let token = self.advance();
        let name = match token.kind {
            TokenKind::Reserved(word) => word,
            _ => String::new(),
        };

        let mut pointer_depth = 0;
        while *self.current() == TokenKind::Asterisk {
            self.advance();
            pointer_depth += 1;
        }

        Ok(TypeDecl {
            name,
            pointer_depth,
            location: self.span_from(token.location),
        })
    }

    fn parse_operand(&mut self) -> Result<Operand, CompilerError> {
        let kind = match self.current().clone() {
            TokenKind::LocalId(name) => OperandKind::Local(name),
            TokenKind::Digits(digits) => OperandKind::Digits(digits),
            other => {
                return_syntax_error!(
                    format!("Expected a local or an integer constant, found {other}"),
                    self.error_location(),
                    {
                        CompilationStage => "Parsing",
                    }
                )
            }
        };
        let token = self.advance();

        Ok(Operand {
            kind,
            location: token.location,
        })
    }

    fn parse_typed_operand(&mut self) -> Result<TypedOperand, CompilerError> {
        let data_type = self.parse_type()?;
        let value = self.parse_operand()?;
        Ok(TypedOperand { data_type, value })
    }
}

/// `void` or `i` followed only by digits. Width checks happen in the IR builder.
fn is_type_word(word: &str) -> bool {
    if word == "void" {
        return true;
    }

    word.strip_prefix('i')
        .is_some_and(|width| !width.is_empty() && width.chars().all(|ch| ch.is_ascii_digit()))
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod parser_tests;
