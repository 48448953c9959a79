use super::{CONFIG_FILE_NAME, Config, OutputFormat};
use crate::ir_frontend::compiler_errors::ErrorType;
use std::fs;
use std::path::{Path, PathBuf};

#[test]
fn empty_file_gives_defaults() {
    let config = Config::from_toml_str("", Path::new("varcheck.toml")).expect("empty config");
    assert_eq!(config, Config::default());
    assert!(!config.check.parallel);
    assert_eq!(config.output.format, OutputFormat::Text);
    assert_eq!(config.output.plot_dir, None);
}

#[test]
fn reads_every_section() {
    let source = r#"
name = "loops"

[check]
parallel = true

[output]
format = "json"
plot_dir = "figures"
"#;

    let config = Config::from_toml_str(source, Path::new("varcheck.toml")).expect("valid config");
    assert_eq!(config.name, "loops");
    assert!(config.check.parallel);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.output.plot_dir, Some(PathBuf::from("figures")));
}

#[test]
fn unknown_keys_are_config_errors() {
    let error = Config::from_toml_str("[check]\nthreads = 4\n", Path::new("varcheck.toml"))
        .expect_err("unknown key should fail");
    assert_eq!(error.error_type, ErrorType::Config);
    assert_eq!(error.location.scope, PathBuf::from("varcheck.toml"));
}

#[test]
fn unknown_output_format_is_rejected() {
    let error = Config::from_toml_str("[output]\nformat = \"xml\"\n", Path::new("varcheck.toml"))
        .expect_err("xml is not a format");
    assert_eq!(error.error_type, ErrorType::Config);
}

#[test]
fn load_or_default_without_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config::load_or_default(dir.path()).expect("missing file is fine");
    assert_eq!(config, Config::default());
}

#[test]
fn load_or_default_reads_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join(CONFIG_FILE_NAME), "[check]\nparallel = true\n")
        .expect("write config");

    let config = Config::load_or_default(dir.path()).expect("config should load");
    assert!(config.check.parallel);
}

#[test]
fn load_missing_file_is_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let error = Config::load(&dir.path().join("nope.toml")).expect_err("file is missing");
    assert_eq!(error.error_type, ErrorType::Config);
}
