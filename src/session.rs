//! Operator commands: parsing one line and running it against a tracker.

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

use crate::export::{export_watchlists, ExportFormat};
use crate::tracker::{LookupReport, PurgeOutcome, QuarantineOutcome, Tracker};
use crate::watchlist::{UpsertOutcome, Watchlist};

pub const HELP: &str = r#"COMMANDS:
    lookup <id>                 Query the service for a client and flag it
    quarantine <id>             Move a client to the quarantined list
    purge <id>                  Drop a client from whichever list holds it
    show <id>                   Show a tracked client
    list                        Show both watchlists
    clients                     List every client the service sees
    count                       Client counters
    campus                      Campus, building and floor hierarchy
    version                     Location schema in use
    export <json|csv> <path>    Write both watchlists to a file
    help                        Show this help
    quit                        End the session"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lookup(String),
    Quarantine(String),
    Purge(String),
    Show(String),
    List,
    Clients,
    Count,
    Campus,
    Version,
    Export { format: ExportFormat, path: PathBuf },
    Help,
    Quit,
}

/// Parse one line of input. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    if verb.starts_with('#') {
        return Ok(None);
    }

    let command = match verb.to_ascii_lowercase().as_str() {
        "lookup" | "track" => Command::Lookup(device_arg(&mut words, verb)?),
        "quarantine" => Command::Quarantine(device_arg(&mut words, verb)?),
        "purge" => Command::Purge(device_arg(&mut words, verb)?),
        "show" => Command::Show(device_arg(&mut words, verb)?),
        "list" => Command::List,
        "clients" => Command::Clients,
        "count" => Command::Count,
        "campus" => Command::Campus,
        "version" => Command::Version,
        "export" => {
            let format = words.next().ok_or_else(|| anyhow!("export requires a format"))?;
            let format = ExportFormat::parse(format).ok_or_else(|| anyhow!("Unknown export format: {}", format))?;
            let path = words
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("watchlists.{}", format.extension())));
            Command::Export { format, path }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("Unknown command: {} (try `help`)", other),
    };

    Ok(Some(command))
}

fn device_arg<'a>(words: &mut impl Iterator<Item = &'a str>, verb: &str) -> Result<String> {
    words
        .next()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("{} requires a device id", verb))
}

/// Run a command and return what to print.
pub fn execute(tracker: &mut Tracker, command: Command) -> Result<String> {
    match command {
        Command::Lookup(id) => {
            let report = tracker.lookup_and_track(&id)?;
            Ok(describe_lookup(&report))
        }
        Command::Quarantine(id) => {
            let outcome = tracker.quarantine(&id)?;
            Ok(match outcome {
                QuarantineOutcome::Moved => format!("{} quarantined", id),
                QuarantineOutcome::LookedUpAndMoved => format!("{} looked up and quarantined", id),
                QuarantineOutcome::AlreadyQuarantined => format!("{} is already quarantined", id),
                QuarantineOutcome::NotFound => format!("{} could not be tracked, not quarantined", id),
            })
        }
        Command::Purge(id) => Ok(match tracker.purge(&id) {
            PurgeOutcome::Removed(list) => format!("{} removed from {} list", id, list),
            PurgeOutcome::NotFound => format!("{} is not tracked", id),
        }),
        Command::Show(id) => Ok(match tracker.lookup(&id) {
            Some((list, record)) => format!("[{}] {}", list, record),
            None => format!("{} is not tracked", id),
        }),
        Command::List => Ok(describe_watchlists(tracker)),
        Command::Clients => {
            let clients = tracker.all_clients()?;
            let mut out: Vec<String> = clients.iter().map(ToString::to_string).collect();
            out.push(format!("{} clients", clients.len()));
            Ok(out.join("\n"))
        }
        Command::Count => Ok(tracker.client_count()?.to_string()),
        Command::Campus => Ok(tracker.campus_hierarchy()?.outline().trim_end().to_string()),
        Command::Version => Ok(format!("Location schema {}", tracker.schema())),
        Command::Export { format, path } => {
            let count = export_watchlists(tracker.store(), &path, format)?;
            Ok(format!("Exported {} entries to {}", count, path.display()))
        }
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

fn describe_lookup(report: &LookupReport) -> String {
    let mut out = match report.outcome {
        UpsertOutcome::Inserted => format!("{} added to flagged list", report.device_id),
        UpsertOutcome::Updated(list) => format!("{} updated on {} list", report.device_id, list),
    };
    if report.placeholder {
        out.push_str(" (not seen by the service, placeholder recorded)");
    }
    match &report.map {
        Some(path) if report.used_default_map => {
            out.push_str(&format!("\nMap: {} (default map)", path.display()))
        }
        Some(path) => out.push_str(&format!("\nMap: {}", path.display())),
        None => out.push_str("\nNo map rendered"),
    }
    out
}

fn describe_watchlists(tracker: &Tracker) -> String {
    let mut out = Vec::new();
    for list in [Watchlist::Flagged, Watchlist::Quarantined] {
        let records = tracker.store().list(list);
        out.push(format!("{} ({}):", list, records.len()));
        out.extend(records.iter().map(|r| format!("  {}", r)));
    }
    out.join("\n")
}
