use colored::Colorize;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;

/// Sets up the logging configuration for the application.
///
/// Configures the logger to use colored output based on the log level.
/// Default level is `Info`, overridable through `RUST_LOG`. Output goes to stderr,
/// stdout carries bridge replies.
pub fn setup_log() {
    let default_log_level = LevelFilter::Info;
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            let l = record.level();
            let colored_level = match l {
                log::Level::Error => l.to_string().red().bold(),
                log::Level::Warn => l.to_string().yellow().bold(),
                log::Level::Info => l.to_string().green().bold(),
                log::Level::Debug => l.to_string().blue().bold(),
                log::Level::Trace => l.to_string().purple().bold(),
            };
            writeln!(buf, "{} {}", colored_level, record.args())
        })
        .target(Target::Stderr)
        .filter(None, default_log_level)
        .parse_default_env()
        .init();
}
