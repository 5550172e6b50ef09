//! ArgMatches → Command conversion.
//!
//! Translates clap's parsed arguments into the appropriate action:
//! - Record operations → `CliAction::Execute(Command)`
//! - Seed loading → `CliAction::Seed`
//! - Config bootstrap → `CliAction::Init`

use clap::ArgMatches;
use galaxy_core::RecordId;
use galaxy_executor::Command;

use crate::value::parse_json_arg;

/// The result of parsing user input.
#[derive(Debug)]
pub enum CliAction {
    /// A command to run through the executor.
    Execute(Command),
    /// Load a seed file.
    Seed { file: String, reset: bool },
    /// Write the default config file.
    Init,
}

/// Convert matches of a subcommand into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| "No command given".to_string())?;

    let collection = || string_arg(sub, "collection");
    let id = || string_arg(sub, "id").map(RecordId::new);
    let payload = || string_arg(sub, "payload").and_then(|p| parse_json_arg(&p));

    let cmd = match name {
        "list" => Command::List {
            collection: collection()?,
        },
        "get" => Command::Get {
            collection: collection()?,
            id: id()?,
        },
        "create" => Command::Create {
            collection: collection()?,
            payload: payload()?,
        },
        "upsert" => Command::Upsert {
            collection: collection()?,
            id: id()?,
            payload: payload()?,
        },
        "patch" => Command::Patch {
            collection: collection()?,
            id: id()?,
            patch: payload()?,
        },
        "destroy" => Command::Destroy {
            collection: collection()?,
            id: id()?,
        },
        "seed" => {
            return Ok(CliAction::Seed {
                file: string_arg(sub, "file")?,
                reset: sub.get_flag("reset"),
            })
        }
        "init" => return Ok(CliAction::Init),
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(CliAction::Execute(cmd))
}

fn string_arg(matches: &ArgMatches, name: &str) -> Result<String, String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", name))
}
