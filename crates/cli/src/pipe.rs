//! Pipe mode: one JSON command per stdin line, one response per stdout line.

use std::io::{self, BufRead};

use crate::format::{format_response, OutputMode};
use crate::state::SessionState;

/// Run in pipe mode: read lines from stdin, execute each.
///
/// Returns 1 if any command did not succeed.
pub fn run_pipe(state: &SessionState, mode: OutputMode) -> i32 {
    let stdin = io::stdin();
    run_lines(state, stdin.lock(), mode, |line| println!("{}", line))
}

/// Execute every command line of `input`, handing each formatted response to
/// `emit`.
pub fn run_lines<R: BufRead>(
    state: &SessionState,
    input: R,
    mode: OutputMode,
    mut emit: impl FnMut(&str),
) -> i32 {
    let mut exit_code = 0;

    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let response = state.execute_json(trimmed);
        if !response.is_success() {
            exit_code = 1;
        }
        emit(&format_response(&response, mode));
    }

    exit_code
}
