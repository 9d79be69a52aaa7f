//! Command line definitions

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    version,
    about = "Lumen catalog tool",
    long_about = "Replay recorded backend events and command scripts against a Lumen catalog,\n\
                  inspect catalogs and migrate them to the current schema."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: platform config dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Do not write the JSON log file
    #[arg(long = "no-log-file", global = true)]
    pub no_log_file: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply a backend action log, then a command script, and save the result
    Replay(ReplayArgs),

    /// Print a summary of a catalog
    Inspect(InspectArgs),

    /// Upgrade a catalog of any supported version to the current schema
    Migrate(MigrateArgs),
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Catalog to start from; an empty catalog is used if it does not exist
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// One backend action (JSON) per line
    #[arg(long, value_name = "JSONL")]
    pub actions: PathBuf,

    /// One command (JSON) per line, applied after the actions
    #[arg(long, value_name = "JSONL")]
    pub commands: Option<PathBuf>,

    /// Where to write the result (default: the input catalog)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Also print the inferred attributes of one image
    #[arg(long, value_name = "UID")]
    pub image: Option<String>,
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,
}

impl Cli {
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::try_parse_from([
            "lumen",
            "-vv",
            "replay",
            "--catalog",
            "c.json",
            "--actions",
            "a.jsonl",
        ])
        .unwrap();

        assert_eq!(cli.log_directive(), "trace");
        match cli.command {
            Command::Replay(args) => {
                assert_eq!(args.catalog, PathBuf::from("c.json"));
                assert!(args.commands.is_none());
                assert!(args.output.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_migrate_requires_output() {
        assert!(Cli::try_parse_from(["lumen", "migrate", "--catalog", "c.json"]).is_err());
    }
}
