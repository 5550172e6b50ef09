//! Galaxy CLI — command-line runner for the bootcamp back office.
//!
//! Two modes:
//! - **Shell mode**: `galaxy [flags] COMMAND` — single command, exit
//! - **Pipe mode**: `cat commands.jsonl | galaxy` — one JSON command per line

mod commands;
mod format;
mod parse;
mod pipe;
mod seed;
mod state;
mod value;

use std::path::PathBuf;
use std::process;

use galaxy_executor::{GalaxyConfig, CONFIG_FILE_NAME};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_response, OutputMode};
use parse::{matches_to_action, CliAction};
use state::SessionState;

fn main() {
    init_logging();

    let matches = build_cli().get_matches();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    // `init` runs before the config is read.
    if matches.subcommand_name() == Some("init") {
        match GalaxyConfig::write_default_if_missing(&config_path) {
            Ok(()) => {
                println!("Config ready at {}", config_path.display());
                return;
            }
            Err(e) => {
                eprintln!("{}", format_error(&e.to_string(), mode));
                process::exit(1);
            }
        }
    }

    let config = match GalaxyConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string(), mode));
            process::exit(1);
        }
    };

    let data = matches.get_one::<String>("data").map(PathBuf::from);
    let state = match SessionState::open(config, data) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    };

    let exit_code = if matches.subcommand().is_some() {
        run_shell_mode(&matches, &state, mode)
    } else {
        pipe::run_pipe(&state, mode)
    };
    process::exit(exit_code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GALAXY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_shell_mode(matches: &clap::ArgMatches, state: &SessionState, mode: OutputMode) -> i32 {
    match matches_to_action(matches) {
        Ok(CliAction::Execute(cmd)) => {
            let response = state.execute(cmd);
            println!("{}", format_response(&response, mode));
            if response.is_success() {
                0
            } else {
                1
            }
        }
        Ok(CliAction::Seed { file, reset }) => {
            let seed = match value::read_json_from_source(&file) {
                Ok(seed) => seed,
                Err(e) => {
                    eprintln!("{}", format_error(&e, mode));
                    return 1;
                }
            };
            match seed::load_seed(state, seed, reset) {
                Ok(counts) => {
                    let mut rejected = 0;
                    for count in &counts {
                        println!(
                            "{}: {} loaded, {} rejected",
                            count.collection, count.loaded, count.rejected
                        );
                        rejected += count.rejected;
                    }
                    if rejected == 0 {
                        0
                    } else {
                        1
                    }
                }
                Err(e) => {
                    eprintln!("{}", format_error(&e, mode));
                    1
                }
            }
        }
        // Handled before the store opens.
        Ok(CliAction::Init) => 0,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}
