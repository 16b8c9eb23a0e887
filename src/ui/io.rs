use super::{InputError, NoteError, Result};
use crate::bridge::{Bridge, BridgeCall, DisplayLayer, Reply};
use crate::setup::{arguments, logging};
use crate::ui::cli;

use log::{error, info, trace};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

/// Decode one line of input into a bridge call
///
/// # Errors
///
/// Returns `InputError::MalformedCall` if the line is not a known call
pub fn parse_call(line: &str) -> Result<BridgeCall> {
    serde_json::from_str(line).map_err(|source| {
        NoteError::Input(InputError::MalformedCall {
            line: line.to_string(),
            source,
        })
    })
}

/// Answer bridge calls read from `input`, one JSON object per line, writing one reply line
/// per call to `output`. Stops at end of input. Blank lines are skipped and lines that do
/// not decode are answered with `false`.
///
/// # Errors
///
/// Returns an error if reading `input` or writing `output` fails
pub fn serve<D: DisplayLayer>(
    bridge: &mut Bridge<D>,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    for line in input.lines() {
        let line = line.map_err(|e| NoteError::Input(InputError::StdinReadError(e)))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        trace!("Got input: {line}");

        let reply = match parse_call(line) {
            Ok(call) => bridge.dispatch(call),
            Err(e) => {
                error!("{e}");
                Reply::Flag(false)
            }
        };

        writeln!(output, "{reply}")
            .and_then(|()| output.flush())
            .map_err(|e| NoteError::Input(InputError::StdoutWriteError(e)))?;
    }
    Ok(())
}

/// Initialize logging, parse args, show the initial list and answer calls from stdin
/// until it closes
#[must_use]
pub fn run() -> ExitCode {
    logging::setup_log();

    let (service, config) = match arguments::handle_args() {
        Ok(setup) => setup,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut bridge = Bridge::new(service, cli::Cli::default(), config);
    bridge.load();
    info!("Ready. Send one bridge call per line, e.g. {{\"call\":\"getAllData\"}}");

    match serve(&mut bridge, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
