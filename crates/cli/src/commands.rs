//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("galaxy")
        .about("Command-line runner for the Galaxy bootcamp back office")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: galaxy.toml)")
                .global(true),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .help("Store snapshot file, loaded if present and saved after writes")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("list")
                .about("List every record of a collection")
                .arg(collection()),
        )
        .subcommand(
            Command::new("get")
                .about("Fetch one record")
                .arg(collection())
                .arg(id()),
        )
        .subcommand(
            Command::new("create")
                .about("Create a record under a new identifier")
                .arg(collection())
                .arg(payload("Record as JSON, or - for stdin")),
        )
        .subcommand(
            Command::new("upsert")
                .about("Replace the record at an identifier, or insert it")
                .arg(collection())
                .arg(id())
                .arg(payload("Record as JSON, or - for stdin")),
        )
        .subcommand(
            Command::new("patch")
                .about("Apply a JSON Patch to a record")
                .arg(collection())
                .arg(id())
                .arg(payload("Patch operations as a JSON array, or - for stdin")),
        )
        .subcommand(
            Command::new("destroy")
                .about("Remove a record")
                .arg(collection())
                .arg(id()),
        )
        .subcommand(
            Command::new("seed")
                .about("Load records from a {collection: [records]} JSON file")
                .arg(Arg::new("file").required(true).help("Seed file, or - for stdin"))
                .arg(
                    Arg::new("reset")
                        .long("reset")
                        .help("Empty the seeded collections first")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("init").about("Write the default config file if missing"))
}

fn collection() -> Arg {
    Arg::new("collection").required(true).help("Collection name")
}

fn id() -> Arg {
    Arg::new("id").required(true).help("Record identifier")
}

fn payload(help: &'static str) -> Arg {
    Arg::new("payload").required(true).help(help)
}
