//! Command-line entrypoints for varcheck.
//!
//! Parses the command and its flags, loads settings, and dispatches into the checker,
//! the plotter, or the integration test runner.

use crate::ir_frontend::IrFrontend;
use crate::ir_frontend::compiler_errors::{CompilerError, CompilerMessages};
use crate::ir_frontend::display_messages::{print_compiler_messages, print_report};
use crate::plot_output::latex_plotter::write_plot;
use crate::projects::integration_test_runner::run_all_test_cases;
use crate::projects::settings::{Config, DEFAULT_PLOT_DIR, OutputFormat};
use crate::return_file_error;
use saying::say;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{env, fs};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Check {
        path: PathBuf,
        options: CheckFlags,
    },

    // Only writes the CFG diagram. Without a dir, the config's plot_dir or `out` is used.
    Plot {
        path: PathBuf,
        dir: Option<PathBuf>,
    },

    Help,
    Tests,
}

/// Flags for `check`. `None` means "use whatever the config says".
#[derive(Debug, Default, PartialEq, Eq)]
struct CheckFlags {
    json: bool,
    parallel: bool,
    plot_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

/// Exits with failure when the checker reports violations or any stage fails
pub fn start_cli() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help(false);
        return ExitCode::SUCCESS;
    }

    let command = match get_command(&args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help(true);
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Help => {
            print_help(false);
            ExitCode::SUCCESS
        }

        Command::Tests => exit_code(run_all_test_cases()),

        Command::Plot { path, dir } => {
            let config = match load_settings(None) {
                Ok(config) => config,
                Err(e) => {
                    print_compiler_messages(&CompilerMessages::from_error(e));
                    return ExitCode::FAILURE;
                }
            };

            let dir = plot_dir(dir, &config);
            match plot_file(&config, &path, &dir) {
                Ok(file) => {
                    say!(Green "Plot written to ", { file.display().to_string() });
                    ExitCode::SUCCESS
                }
                Err(messages) => {
                    print_compiler_messages(&messages);
                    ExitCode::FAILURE
                }
            }
        }

        Command::Check { path, options } => {
            let config = match load_config(&options) {
                Ok(config) => config,
                Err(e) => {
                    print_compiler_messages(&CompilerMessages::from_error(e));
                    return ExitCode::FAILURE;
                }
            };

            match check_file(&config, &path) {
                Ok(clean) => exit_code(clean),
                Err(messages) => {
                    print_compiler_messages(&messages);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `path` when given, otherwise `varcheck.toml` in the working directory if there is one
fn load_settings(path: Option<&Path>) -> Result<Config, CompilerError> {
    match path {
        Some(path) => Config::load(path),
        None => match env::current_dir() {
            Ok(dir) => Config::load_or_default(&dir),
            Err(_) => Ok(Config::default()),
        },
    }
}

/// Applies command line flags over the config file
fn load_config(options: &CheckFlags) -> Result<Config, CompilerError> {
    let mut config = load_settings(options.config_path.as_deref())?;

    if options.json {
        config.output.format = OutputFormat::Json;
    }
    if options.parallel {
        config.check.parallel = true;
    }
    if options.plot_dir.is_some() {
        config.output.plot_dir = options.plot_dir.clone();
    }

    Ok(config)
}

fn plot_dir(explicit: Option<PathBuf>, config: &Config) -> PathBuf {
    match (explicit, &config.output.plot_dir) {
        (Some(dir), _) => dir,
        (None, Some(dir)) => dir.to_owned(),
        (None, None) => PathBuf::from(DEFAULT_PLOT_DIR),
    }
}

pub fn read_source(path: &Path) -> Result<String, CompilerError> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(source),
        Err(e) => return_file_error!(path, format!("Could not read source file: {e}")),
    }
}

/// Prints the report. Returns whether the module checked clean.
fn check_file(config: &Config, path: &Path) -> Result<bool, CompilerMessages> {
    let source = read_source(path)?;
    let frontend = IrFrontend::new(config, path);
    let (module, report) = frontend.run(&source)?;

    if let Some(dir) = &config.output.plot_dir {
        let file = write_plot(&module, dir)?;
        say!(Green "Plot written to ", { file.display().to_string() });
    }

    match config.output.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                return Err(CompilerMessages::from_error(CompilerError::compiler_error(
                    format!("Could not serialize the report: {e}"),
                )));
            }
        },
    }

    Ok(report.is_clean())
}

fn plot_file(config: &Config, path: &Path, dir: &Path) -> Result<PathBuf, CompilerMessages> {
    let source = read_source(path)?;
    let frontend = IrFrontend::new(config, path);

    let tokens = frontend.source_to_tokens(&source)?;
    let ast = frontend.tokens_to_ast(tokens)?;
    let module = frontend.generate_ir(&ast)?;

    Ok(write_plot(&module, dir)?)
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let command = args.first().map(String::as_str);

    match command {
        Some("help") | Some("--help") | Some("-h") => Ok(Command::Help),

        Some("check") => parse_check_command(args),

        Some("plot") => {
            let Some(path) = args.get(1) else {
                return Err(String::from("Plot command needs a path to an .ll file"));
            };
            Ok(Command::Plot {
                path: PathBuf::from(path),
                dir: args.get(2).map(PathBuf::from),
            })
        }

        Some("tests") => Ok(Command::Tests),

        Some(other) => Err(format!("Invalid command: '{other}'")),
        None => Err(String::from("No command given")),
    }
}

fn parse_check_command(args: &[String]) -> Result<Command, String> {
    let mut path = None;
    let mut options = CheckFlags::default();
    let mut index = 1usize;

    while let Some(arg) = args.get(index) {
        match arg.as_str() {
            "--json" => {
                options.json = true;
                index += 1;
            }
            "--parallel" => {
                options.parallel = true;
                index += 1;
            }
            "--plot" => {
                let Some(dir) = args.get(index + 1) else {
                    return Err(String::from("Missing value for --plot"));
                };
                if dir.starts_with("--") {
                    return Err(String::from("Missing value for --plot"));
                }
                options.plot_dir = Some(PathBuf::from(dir));
                index += 2;
            }
            "--config" => {
                let Some(config_path) = args.get(index + 1) else {
                    return Err(String::from("Missing value for --config"));
                };
                if config_path.starts_with("--") {
                    return Err(String::from("Missing value for --config"));
                }
                options.config_path = Some(PathBuf::from(config_path));
                index += 2;
            }
            _ if arg.starts_with("--") => {
                return Err(format!(
                    "Unknown check flag: '{arg}'. Supported flags are --json, --plot, --parallel, --config."
                ));
            }
            _ => {
                if path.is_some() {
                    return Err(String::from("Check command accepts exactly one path argument."));
                }
                path = Some(PathBuf::from(arg));
                index += 1;
            }
        }
    }

    let Some(path) = path else {
        return Err(String::from("Check command needs a path to an .ll file"));
    };

    Ok(Command::Check { path, options })
}

fn print_help(commands_only: bool) {
    if !commands_only {
        say!(Bright Black "------------------------------------");
        say!(Green Bold "varcheck - definedness checker for LLVM-style IR");
        say!("Usage: ", Bold "<command>", Italic " <args>");
    }
    say!(Green Bold "\nCommands:");
    say!("  check <file.ll>      - Reports variables used before they are defined");
    say!("  plot <file.ll> [dir] - Writes a LaTeX/TikZ diagram of every CFG");
    say!("  tests                - Runs the test cases in tests/cases");
    say!("  help                 - Shows this message");

    say!(Green Bold "\nCheck flags:");
    say!("  --json               Print the report as JSON");
    say!("  --plot <dir>         Also write the CFG diagram into <dir>");
    say!("  --parallel           Check functions in parallel");
    say!("  --config <path>      Use this config instead of ./varcheck.toml");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
