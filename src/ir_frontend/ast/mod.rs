pub mod ast_nodes;
pub mod parse_module;
