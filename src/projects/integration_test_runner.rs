//! Runs the `.ll` cases under `tests/cases`.
//!
//! Files in `success/` must build and check clean. Files in `failure/` must either fail to
//! build or report at least one violation. Any `; EXPECT: <line>` comments in a case must
//! match the reported violation lines exactly and in order.

use crate::ir_frontend::IrFrontend;
use crate::ir_frontend::compiler_errors::{CompilerMessages, error_type_to_str};
use crate::ir_frontend::display_messages::print_formatted_error;
use crate::projects::cli::read_source;
use crate::projects::settings::{Config, INTEGRATION_TESTS_PATH, IR_FILE_EXTENSION};
use saying::say;
use std::fs;
use std::path::{Path, PathBuf};

const SEPARATOR_LINE_LENGTH: usize = 37;
const EXPECT_PREFIX: &str = "; EXPECT:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Success,
    Failure,
}

#[derive(Debug)]
pub enum CaseResult {
    Clean,
    Violations(Vec<String>),
    FrontendError(CompilerMessages),
}

#[derive(Debug)]
pub struct CaseOutcome {
    pub path: PathBuf,
    pub kind: CaseKind,
    pub result: CaseResult,
    pub expected_lines: Vec<String>,
}

impl CaseOutcome {
    pub fn behaved_as_expected(&self) -> bool {
        match (&self.result, self.kind) {
            (CaseResult::Clean, CaseKind::Success) => true,
            (CaseResult::Violations(lines), CaseKind::Failure) => {
                self.expected_lines.is_empty() || *lines == self.expected_lines
            }
            (CaseResult::FrontendError(_), CaseKind::Failure) => self.expected_lines.is_empty(),
            _ => false,
        }
    }
}

/// Lists the `.ll` files of one case directory, sorted by name
pub fn collect_cases(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut cases: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == IR_FILE_EXTENSION))
        .collect();
    cases.sort();
    cases
}

pub fn evaluate_case(path: &Path, kind: CaseKind) -> CaseOutcome {
    let config = Config::default();

    let (result, expected_lines) = match read_source(path) {
        Ok(source) => {
            let expected_lines = expected_lines(&source);
            let result = match IrFrontend::new(&config, path).run(&source) {
                Ok((_, report)) if report.is_clean() => CaseResult::Clean,
                Ok((_, report)) => CaseResult::Violations(
                    report
                        .violations
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                ),
                Err(messages) => CaseResult::FrontendError(messages),
            };
            (result, expected_lines)
        }
        Err(e) => (
            CaseResult::FrontendError(CompilerMessages::from_error(e)),
            Vec::new(),
        ),
    };

    CaseOutcome {
        path: path.to_path_buf(),
        kind,
        result,
        expected_lines,
    }
}

fn expected_lines(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| line.trim().strip_prefix(EXPECT_PREFIX))
        .map(|expected| expected.trim().to_owned())
        .collect()
}

/// Runs every case and prints a summary. Returns true when every case behaved as expected.
pub fn run_all_test_cases() -> bool {
    println!("Running all varcheck test cases...\n");
    let timer = std::time::Instant::now();

    let test_cases_dir = Path::new(INTEGRATION_TESTS_PATH);
    let mut total_tests = 0;
    let mut correct_results = 0;

    for (kind, dir_name, heading) in [
        (CaseKind::Success, "success", "Testing files that should check clean:"),
        (CaseKind::Failure, "failure", "Testing files that should be flagged:"),
    ] {
        let cases = collect_cases(&test_cases_dir.join(dir_name));
        if cases.is_empty() {
            continue;
        }

        say!(Cyan heading);
        println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));

        for path in cases {
            total_tests += 1;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            println!("  {file_name}");

            let outcome = evaluate_case(&path, kind);
            if outcome.behaved_as_expected() {
                correct_results += 1;
            }
            print_outcome(&outcome);
            println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
        }

        println!();
    }

    println!("\n{}", "=".repeat(SEPARATOR_LINE_LENGTH));
    print!("Test Results Summary. Took: ");
    say!(Green #timer.elapsed());
    say!("  Total tests: ", Yellow total_tests);
    say!("  Correct results: ", Blue correct_results);
    say!("  Incorrect results: ", Blue { total_tests - correct_results });

    let all_passed = correct_results == total_tests;
    if all_passed {
        say!("\n🎉 All tests behaved as expected!");
    } else if total_tests > 0 {
        let percentage = (correct_results as f64 / total_tests as f64) * 100.0;
        say!(Yellow "\n⚠ ", Bright Yellow format!("{:.1}", percentage), " %", Reset " of tests behaved as expected");
    }

    println!("{}", "=".repeat(SEPARATOR_LINE_LENGTH));
    all_passed
}

fn print_outcome(outcome: &CaseOutcome) {
    let expected = outcome.behaved_as_expected();

    match (&outcome.result, outcome.kind) {
        (CaseResult::Clean, CaseKind::Success) => say!(Green "✓ PASS"),
        (CaseResult::Clean, CaseKind::Failure) => say!(Yellow "✗ UNEXPECTED SUCCESS"),

        (CaseResult::Violations(lines), _) => {
            if expected {
                say!(Green "✓ EXPECTED VIOLATIONS");
            } else {
                say!(Red "✗ FAIL");
                for expected_line in &outcome.expected_lines {
                    say!(Dark Yellow "  expected: ", { expected_line.as_str() });
                }
            }
            for line in lines {
                say!(Bright Black "  ", { line.as_str() });
            }
        }

        (CaseResult::FrontendError(messages), _) => {
            if expected {
                say!(Green "✓ EXPECTED FAILURE");
                for error in &messages.errors {
                    say!(Yellow { error_type_to_str(&error.error_type) });
                }
            } else {
                say!(Red "✗ FAIL");
                for error in &messages.errors {
                    print_formatted_error(error);
                }
            }
        }
    }
}
