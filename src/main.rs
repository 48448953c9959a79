use std::process::ExitCode;

fn main() -> ExitCode {
    varcheck::start_cli()
}
