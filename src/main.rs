use std::process::ExitCode;

fn main() -> ExitCode {
    webnotes::ui::io::run()
}
