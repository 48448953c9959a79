pub mod ir_frontend;
pub mod plot_output;
pub mod projects;

use crate::ir_frontend::IrFrontend;
use crate::ir_frontend::analysis::var_checker::VarCheckReport;
use crate::ir_frontend::compiler_errors::CompilerMessages;
use crate::projects::settings::Config;
use std::path::Path;
use std::process::ExitCode;

/// Checks one module of textual IR with default settings.
/// `source_path` is only used for error locations and the module name.
pub fn check_source(source: &str, source_path: &Path) -> Result<VarCheckReport, CompilerMessages> {
    let config = Config::default();
    let (_, report) = IrFrontend::new(&config, source_path).run(source)?;
    Ok(report)
}

pub fn start_cli() -> ExitCode {
    projects::cli::start_cli()
}
