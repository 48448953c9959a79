#[allow(clippy::module_inception)]
pub mod tokenizer;
pub mod tokens;
