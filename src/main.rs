//! replline - echo REPL driving the line reader
//!
//! Reads lines with editing and history, echoes each one back, and keeps the
//! history in `~/.replline/history` between runs.
//!
//! # Quick Start
//!
//! ```text
//! replline                   # Interactive echo loop
//! replline -p "user=> "      # Custom prompt
//! printf 'a\nb\n' | replline # Pass-through mode
//! ```

use std::env;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use replline::{LineReader, LineResult};

/// Command line options
struct Options {
    /// Program identity, used for config/history paths
    identity: String,
    /// Prompt override
    prompt: Option<String>,
    /// Load and save history
    persist_history: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    eprintln!("replline {} - interactive line reader demo", VERSION);
    eprintln!();
    eprintln!("Usage: replline [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -p, --prompt <TEXT>   Prompt to display");
    eprintln!("  -n, --no-history      Do not load or save history");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Enter                 Submit line");
    eprintln!("  Up/Down               Recall history");
    eprintln!("  Ctrl+C                Discard line");
    eprintln!("  Ctrl+D                Exit (on empty line)");
    eprintln!();
    eprintln!("Configuration: ~/.replline/config.toml");
    eprintln!("Log level:     REPLLINE_LOG=debug");
}

fn parse_args() -> Result<Option<Options>, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options {
        identity: args.first().cloned().unwrap_or_else(|| "replline".to_string()),
        prompt: None,
        persist_history: true,
    };
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            "-v" | "--version" => {
                eprintln!("replline {}", VERSION);
                return Ok(None);
            }
            "-p" | "--prompt" => {
                i += 1;
                let prompt = args.get(i).ok_or("Missing prompt argument")?;
                options.prompt = Some(prompt.clone());
            }
            "-n" | "--no-history" => {
                options.persist_history = false;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(Some(options))
}

/// Log to `~/.<program>/<program>.log`; the terminal belongs to the editor
fn init_logging(identity: &str) {
    let name = replline::config::program_name(identity);
    let log_path = replline::config::program_dir(identity)
        .map(|dir| dir.join(format!("{}.log", name)))
        .unwrap_or_else(|| std::path::PathBuf::from(format!("{}.log", name)));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("REPLLINE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(Some(options)) => options,
        Ok(None) => return Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging(&options.identity);
    info!("replline {} starting", VERSION);

    let mut reader = LineReader::new(&options.identity);
    if let Some(prompt) = &options.prompt {
        reader.set_prompt(prompt);
    }

    let history_path = options
        .persist_history
        .then(|| reader.default_history_path())
        .flatten();
    if let Some(path) = &history_path {
        if path.exists() {
            if let Err(e) = reader.load_history(path) {
                warn!("{}", e);
            }
        }
    }

    let result = run(&mut reader);

    reader.close().context("failed to restore terminal")?;
    if let Some(path) = &history_path {
        reader
            .save_history(path)
            .with_context(|| format!("failed to save history to {}", path.display()))?;
    }
    info!("replline exiting");

    result
}

fn run(reader: &mut LineReader) -> anyhow::Result<()> {
    loop {
        match reader.read_line(None)? {
            LineResult::Line(line) => {
                if line.is_empty() {
                    continue;
                }
                reader.write_output(&format!("{}\n", line))?;
            }
            LineResult::Interrupted => continue,
            LineResult::EndOfInput => break,
        }
    }
    Ok(())
}
