use crate::ir_frontend::compiler_errors::CompilerError;
use crate::ir_frontend::tokenizer::tokens::{FileTokens, Token, TokenKind, TokenStream};
use crate::projects::settings;
use crate::{return_syntax_error, token_log};
use std::path::Path;

#[macro_export]
macro_rules! return_token {
    ($kind:expr, $stream:expr $(,)?) => {
        return Ok(Token::new($kind, $stream.new_location()))
    };
}

pub fn tokenize(source_code: &str, src_path: &Path) -> Result<FileTokens, CompilerError> {
    let initial_capacity = source_code.len() / settings::SRC_TO_TOKEN_RATIO;

    let mut tokens: Vec<Token> = Vec::with_capacity(initial_capacity);
    let mut stream = TokenStream::new(source_code);

    loop {
        let token = get_token_kind(&mut stream, src_path)?;
        token_log!(#token);

        if token.kind == TokenKind::Eof {
            tokens.push(token);
            break;
        }

        tokens.push(token);
    }

    Ok(FileTokens::new(tokens))
}

pub fn get_token_kind(stream: &mut TokenStream, src_path: &Path) -> Result<Token, CompilerError> {
    loop {
        // Whitespace, newlines included, carries no meaning in this IR
        while stream.peek().is_some_and(|ch| ch.is_whitespace()) {
            stream.next();
        }

        // To ignore leading whitespace for the next token position
        stream.update_start_position();

        let current_char = match stream.next() {
            Some(ch) => ch,
            None => return_token!(TokenKind::Eof, stream),
        };

        match current_char {
            // Comments and trailing metadata attachments run to the end of the line
            ';' | '!' => {
                stream.skip_line();
                continue;
            }

            '=' => return_token!(TokenKind::Equal, stream),
            ',' => return_token!(TokenKind::Comma, stream),
            ':' => return_token!(TokenKind::Colon, stream),
            '*' => return_token!(TokenKind::Asterisk, stream),
            '(' => return_token!(TokenKind::LeftRound, stream),
            ')' => return_token!(TokenKind::RightRound, stream),
            '{' => return_token!(TokenKind::LeftCurly, stream),
            '}' => return_token!(TokenKind::RightCurly, stream),

            '@' | '%' => {
                let name = read_while(stream, is_id_char);
                if name.is_empty() {
                    return_syntax_error!(
                        format!("Expected an identifier after '{current_char}'"),
                        stream.new_location().to_error_location(src_path),
                        {
                            CompilationStage => "Tokenization",
                            ExpectedToken => "[A-Za-z0-9._]",
                        }
                    )
                }

                if current_char == '@' {
                    return_token!(TokenKind::GlobalId(name), stream);
                }
                return_token!(TokenKind::LocalId(name), stream);
            }

            '#' => {
                let group = read_while(stream, |ch| ch.is_ascii_digit());
                if group.is_empty() {
                    return_syntax_error!(
                        "Expected a digit after '#'",
                        stream.new_location().to_error_location(src_path),
                        {
                            CompilationStage => "Tokenization",
                            ExpectedToken => "[0-9]",
                        }
                    )
                }
                return_token!(TokenKind::GroupNum(group), stream);
            }

            '-' => {
                let digits = read_while(stream, |ch| ch.is_ascii_digit());
                if digits.is_empty() {
                    return_syntax_error!(
                        "Expected a digit after '-'",
                        stream.new_location().to_error_location(src_path),
                        {
                            CompilationStage => "Tokenization",
                            ExpectedToken => "[0-9]",
                        }
                    )
                }
                return_token!(TokenKind::Digits(format!("-{digits}")), stream);
            }

            ch if ch.is_ascii_digit() => {
                let mut digits = String::from(ch);
                digits.push_str(&read_while(stream, |ch| ch.is_ascii_digit()));
                return_token!(TokenKind::Digits(digits), stream);
            }

            ch if is_alpha_mark(ch) => {
                let mut word = String::from(ch);
                word.push_str(&read_while(stream, is_id_char));

                match word.as_str() {
                    // Module level lines that carry nothing for the checker
                    "target" | "source_filename" => {
                        stream.skip_line();
                        continue;
                    }

                    // Attribute groups close out the interesting part of a module
                    "attributes" => {
                        stream.skip_to_end();
                        return_token!(TokenKind::Eof, stream);
                    }

                    _ => return_token!(TokenKind::Reserved(word), stream),
                }
            }

            unknown => {
                return_syntax_error!(
                    format!("Unknown character: '{unknown}'"),
                    stream.new_location().to_error_location(src_path),
                    {
                        CompilationStage => "Tokenization",
                    }
                )
            }
        }
    }
}

fn read_while(stream: &mut TokenStream, accept: impl Fn(char) -> bool) -> String {
    let mut value = String::new();

    while let Some(&ch) = stream.peek() {
        if !accept(ch) {
            break;
        }
        value.push(ch);
        stream.next();
    }

    value
}

fn is_mark(ch: char) -> bool {
    ch == '.' || ch == '_'
}

fn is_alpha_mark(ch: char) -> bool {
    is_mark(ch) || ch.is_ascii_alphabetic()
}

fn is_id_char(ch: char) -> bool {
    is_alpha_mark(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
#[path = "tests/tokenizer_tests.rs"]
mod tokenizer_tests;
