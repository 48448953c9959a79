pub mod bitset;
pub mod dataflow;
pub mod var_checker;
