use crate::ir_frontend::analysis::var_checker::{VarCheckReport, Violation};
use crate::ir_frontend::compiler_errors::{CompilerError, CompilerMessages, ErrorType};
use saying::say;
use std::path::{Path, PathBuf};
use std::{env, fs};

fn normalize_display_path(path: &Path) -> PathBuf {
    let path_string = path.to_string_lossy();
    if let Some(stripped) = path_string.strip_prefix(r"\\?\") {
        return PathBuf::from(stripped);
    }

    path.to_path_buf()
}

fn relative_display_path(scope: &Path) -> String {
    let normalized_scope = normalize_display_path(scope);

    match env::current_dir() {
        Ok(dir) => {
            let normalized_dir = normalize_display_path(&dir);
            normalized_scope
                .strip_prefix(&normalized_dir)
                .unwrap_or(&normalized_scope)
                .to_string_lossy()
                .to_string()
        }
        Err(_) => normalized_scope.to_string_lossy().to_string(),
    }
}

pub fn print_compiler_messages(messages: &CompilerMessages) {
    for err in &messages.errors {
        print_formatted_error(err);
    }
}

pub fn print_formatted_error(e: &CompilerError) {
    let relative_dir = relative_display_path(&e.location.scope);
    let line_number = e.location.start_pos.line_number as usize;

    // Files that can't be read back just lose their excerpt
    let line = match fs::read_to_string(normalize_display_path(&e.location.scope)) {
        Ok(file) => file
            .lines()
            .nth(line_number)
            .unwrap_or_default()
            .to_string(),
        Err(_) => String::new(),
    };

    match e.error_type {
        ErrorType::Syntax => {
            if !relative_dir.is_empty() {
                say!("\n(╯°□°)╯  🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥  Σ(°△°;) ");
            }

            say!(Red "Syntax");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::IrConstruction => {
            if !relative_dir.is_empty() {
                say!("\n(ಠ_ಠ) ", Dark Magenta relative_dir);
            }

            say!(Red "Malformed IR");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::Analysis => {
            if !relative_dir.is_empty() {
                say!("\nヽ(˶°o°)ﾉ  🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥  ╰(°□°╰) ");
            }

            say!(Yellow "ANALYSIS ABORTED - ");
            say!(Dark Yellow "this function was skipped, the rest of the module was still checked");
            say!(Red { e.msg.as_str() });
            return;
        }

        ErrorType::File => {
            say!(Yellow "🏚 Can't find/read file or directory: ", relative_dir);
            say!({ e.msg.as_str() });
            return;
        }

        ErrorType::Config => {
            if !relative_dir.is_empty() {
                say!("\n (-_-)  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  <(^~^)/ ");
            }
            say!(Yellow "CONFIG FILE ISSUE- ");
            say!(Dark Yellow "Malformed config file, something doesn't make sense inside varcheck.toml");
            say!(Red { e.msg.as_str() });
            return;
        }

        ErrorType::Compiler => {
            if !relative_dir.is_empty() {
                say!("\nヽ༼☉ ‿ ⚆༽ﾉ  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  ╰(° _ o╰) ");
            }
            say!(Yellow "CHECKER BUG - ");
            say!(Dark Yellow "varcheck developer skill issue (not your fault)");
        }
    }

    say!(Red { e.msg.as_str() });

    for (key, value) in &e.metadata {
        say!(Bright Black { format!("  {key:?}: {value}") });
    }

    if line.is_empty() {
        return;
    }

    println!("\n{line}");

    // spaces before the relevant part of the line
    print!(
        "{}",
        " ".repeat(e.location.start_pos.char_column.max(0) as usize)
    );

    let length_of_underline =
        (e.location.end_pos.char_column - e.location.start_pos.char_column).max(1) as usize;
    say!(Red { "^".repeat(length_of_underline) });
}

pub fn print_violation(violation: &Violation) {
    let location = match violation.line {
        Some(line) => format!("line {line} "),
        None => String::new(),
    };

    say!(
        Dark Magenta { location },
        Bold { format!("@{} %{}", violation.function, violation.block) },
        ": ",
        { violation.instruction.as_str() },
        ": ",
        Red { violation.message() }
    );

    if violation.in_unreachable_block {
        say!(Bright Black "  (block is unreachable from entry)");
    }
}

/// Prints every violation in scan order, then the aborted functions, then a completion line
pub fn print_report(report: &VarCheckReport) {
    for violation in &report.violations {
        print_violation(violation);
    }

    for failure in &report.errors {
        say!(Yellow "Skipped ", Bold { format!("@{}", failure.function) }, ": ");
        print_formatted_error(&failure.error);
    }

    if report.is_clean() {
        say!(Green "✓ ", { report.module.as_str() }, ": no violations in ", Bright { report.stats.functions_analyzed }, " functions");
    } else {
        say!(
            Yellow "Finished ",
            { report.module.as_str() },
            ": ",
            Red { report.stats.violations },
            " violations across ",
            { report.stats.functions_analyzed },
            " functions"
        );
    }
}
