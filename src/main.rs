use std::process::ExitCode;

fn main() -> ExitCode {
    vuload::entry::run()
}
