use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use cmxtrack::config::Config;
use cmxtrack::logging;
use cmxtrack::render::FloorPlanRenderer;
use cmxtrack::service::CmxClient;
use cmxtrack::session::{self, Command};
use cmxtrack::tracker::Tracker;

struct Args {
    config_path: Option<PathBuf>,
    command: Vec<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut command = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("cmxtrack {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            arg if arg.starts_with('-') && command.is_empty() => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
            arg => command.push(arg.to_string()),
        }
        i += 1;
    }

    Args { config_path, command }
}

fn print_help() {
    println!(
        r#"cmxtrack - track wireless clients on campus floor plans

USAGE:
    cmxtrack [OPTIONS] [COMMAND [ARGS]]

Without a command, reads commands from stdin, one per line, as a single session.

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

{}

ENVIRONMENT:
    CMXTRACK_CONFIG     Path to config file (overrides default location)
    CMXTRACK_LOG        Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/cmxtrack/config.toml"#,
        session::HELP
    );
}

fn main() -> Result<()> {
    let args = parse_args();

    // Journald on Linux, file fallback otherwise
    let _ = logging::init(None);

    let config = match args.config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    let service = CmxClient::from_config(&config.service);
    let renderer = FloorPlanRenderer::new(&config.maps);
    let mut tracker = Tracker::new(Box::new(service), Box::new(renderer));

    if !args.command.is_empty() {
        let line = args.command.join(" ");
        return match session::parse_line(&line)? {
            Some(command) => {
                let output = session::execute(&mut tracker, command)?;
                if !output.is_empty() {
                    println!("{}", output);
                }
                Ok(())
            }
            None => Ok(()),
        };
    }

    run_interactive(&mut tracker)
}

fn run_interactive(tracker: &mut Tracker) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "cmxtrack> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match session::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        match session::execute(tracker, command) {
            Ok(output) if !output.is_empty() => writeln!(stdout, "{}", output)?,
            Ok(_) => {}
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}
