//! Tests for CLI command parsing and validation.

use super::{CheckFlags, Command, check_file, get_command, load_config, plot_dir};
use crate::projects::settings::{Config, OutputFormat};
use std::fs;
use std::path::PathBuf;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn check_command_uses_default_flags() {
    let command = get_command(&args(&["check", "main.ll"])).expect("command should parse");
    assert_eq!(
        command,
        Command::Check {
            path: PathBuf::from("main.ll"),
            options: CheckFlags::default(),
        }
    );
}

#[test]
fn check_command_parses_every_flag() {
    let command = get_command(&args(&[
        "check",
        "--json",
        "main.ll",
        "--plot",
        "diagrams",
        "--parallel",
        "--config",
        "other.toml",
    ]))
    .expect("command should parse");

    assert_eq!(
        command,
        Command::Check {
            path: PathBuf::from("main.ll"),
            options: CheckFlags {
                json: true,
                parallel: true,
                plot_dir: Some(PathBuf::from("diagrams")),
                config_path: Some(PathBuf::from("other.toml")),
            },
        }
    );
}

#[test]
fn check_command_rejects_unknown_flags() {
    let error =
        get_command(&args(&["check", "main.ll", "--wat"])).expect_err("unknown flag should fail");
    assert!(error.contains("Unknown check flag"));
}

#[test]
fn check_command_rejects_missing_flag_values() {
    let plot_error =
        get_command(&args(&["check", "main.ll", "--plot"])).expect_err("missing plot value");
    assert!(plot_error.contains("Missing value for --plot"));

    let config_error = get_command(&args(&["check", "main.ll", "--config", "--json"]))
        .expect_err("flag is not a config value");
    assert!(config_error.contains("Missing value for --config"));
}

#[test]
fn check_command_needs_exactly_one_path() {
    let missing = get_command(&args(&["check", "--json"])).expect_err("no path");
    assert!(missing.contains("needs a path"));

    let extra = get_command(&args(&["check", "a.ll", "b.ll"])).expect_err("two paths");
    assert!(extra.contains("exactly one path"));
}

#[test]
fn plot_command_dir_is_optional() {
    let command = get_command(&args(&["plot", "main.ll"])).expect("command should parse");
    assert_eq!(
        command,
        Command::Plot {
            path: PathBuf::from("main.ll"),
            dir: None,
        }
    );

    let command =
        get_command(&args(&["plot", "main.ll", "figures"])).expect("command should parse");
    assert_eq!(
        command,
        Command::Plot {
            path: PathBuf::from("main.ll"),
            dir: Some(PathBuf::from("figures")),
        }
    );
}

#[test]
fn simple_commands_parse() {
    assert_eq!(get_command(&args(&["help"])), Ok(Command::Help));
    assert_eq!(get_command(&args(&["-h"])), Ok(Command::Help));
    assert_eq!(get_command(&args(&["tests"])), Ok(Command::Tests));
}

#[test]
fn invalid_command_is_reported() {
    let error = get_command(&args(&["build", "main.ll"])).expect_err("not a command");
    assert!(error.contains("Invalid command: 'build'"));
}

#[test]
fn plot_dir_prefers_argument_then_config() {
    let mut config = Config::default();
    assert_eq!(plot_dir(None, &config), PathBuf::from("out"));

    config.output.plot_dir = Some(PathBuf::from("figures"));
    assert_eq!(plot_dir(None, &config), PathBuf::from("figures"));
    assert_eq!(
        plot_dir(Some(PathBuf::from("elsewhere")), &config),
        PathBuf::from("elsewhere")
    );
}

#[test]
fn flags_override_the_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = dir.path().join("custom.toml");
    fs::write(&config_path, "[output]\nplot_dir = \"figures\"\n").expect("write config");

    let options = CheckFlags {
        json: true,
        config_path: Some(config_path),
        ..CheckFlags::default()
    };
    let config = load_config(&options).expect("config should load");

    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.output.plot_dir, Some(PathBuf::from("figures")));
    assert!(!config.check.parallel);
}

#[test]
fn check_reports_whether_the_module_is_clean() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config::default();

    let clean = dir.path().join("clean.ll");
    fs::write(
        &clean,
        "define i32 @f(i32 %a) {\nentry:\n  %b = add i32 %a, 1\n  ret i32 %b\n}\n",
    )
    .expect("write clean case");
    assert_eq!(check_file(&config, &clean).ok(), Some(true));

    let flagged = dir.path().join("flagged.ll");
    fs::write(
        &flagged,
        "define i32 @f() {\nentry:\n  %p = alloca i32\n  %v = load i32, i32* %p\n  ret i32 %v\n}\n",
    )
    .expect("write flagged case");
    assert_eq!(check_file(&config, &flagged).ok(), Some(false));

    let broken = dir.path().join("broken.ll");
    fs::write(&broken, "define i32 @f( {\n").expect("write broken case");
    assert!(check_file(&config, &broken).is_err());

    assert!(check_file(&config, &dir.path().join("missing.ll")).is_err());
}
