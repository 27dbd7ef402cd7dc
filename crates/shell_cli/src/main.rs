//! fsh - runs parsed command trees through the shell_exec engine
//!
//! The parser is a separate program: it hands `fsh` one JSON-encoded command
//! tree per line, and `fsh` evaluates each tree in order, exactly as an
//! interactive loop would evaluate each command line.
//!
//! # Usage
//!
//! ```text
//! fsh [--config <file.toml>] [<input.jsonl> | -]
//! ```
//!
//! Reading trees from a file is preferred: programs run by `fsh` inherit its
//! stdin, so with `-` a command like `cat` would consume the remaining input.
//!
//! # Environment Variables
//!
//! - `FSH_LOG` - Log filter (default: "warn"). Logs go to stderr.

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use shell_exec::ShellState;

mod config;
mod input;

const USAGE: &str = "Usage: fsh [--config <file.toml>] [<input.jsonl> | -]";

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    input: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        while let Some(a) = args.next() {
            match a.as_str() {
                "--config" => match args.next() {
                    Some(path) => parsed.config = Some(PathBuf::from(path)),
                    None => bail!("--config requires a path\n{USAGE}"),
                },
                "-h" | "--help" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                "-" => parsed.input = None,
                other if other.starts_with("--") => bail!("unknown option {other}\n{USAGE}"),
                other => parsed.input = Some(PathBuf::from(other)),
            }
        }
        Ok(parsed)
    }
}

fn main() -> Result<()> {
    // Initialize tracing with env-filter support
    // Use FSH_LOG env var for log level configuration, default to "warn"
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("FSH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse(env::args().skip(1))?;
    let config = config::load(args.config.as_deref())?;
    tracing::debug!(?config, "fsh.config");

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening input {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut state = ShellState::new(config);
    let status = input::run(reader, &mut state)?;
    tracing::debug!(status, "fsh.exit");

    std::process::exit(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse(&[]).unwrap(), Args::default());
        assert_eq!(
            parse(&["--config", "fsh.toml", "trees.jsonl"]).unwrap(),
            Args {
                config: Some(PathBuf::from("fsh.toml")),
                input: Some(PathBuf::from("trees.jsonl")),
            }
        );
        assert_eq!(parse(&["-"]).unwrap().input, None);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }
}
