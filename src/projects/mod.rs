/// # Everything around the checker itself
/// The command line, settings files and the `.ll` test case runner.

// The basic CLI for interacting with the checker
pub(crate) mod cli;

pub mod integration_test_runner;
pub mod settings;
