// ingesta-cli/src/main.rs
//
// Entry point for the `ingesta` binary.
//
// Responsibilities:
// - Parsing the command line (`Cli`, `Commands`).
// - Deciding whether output is colored.
// - Dispatching to the `ingest` and `probe` commands.
// - Printing fatal errors and mapping them to exit code 1. Per-file
//   failures are part of a successful run and exit with 0.

use clap::Parser;
use ingesta_cli::error::suggestion_for;
use ingesta_cli::terminal;
use ingesta_cli::{Cli, Commands, run_ingest, run_probe};
use std::process;

fn main() {
    let cli = Cli::parse();

    terminal::set_color(terminal::color_enabled(cli.no_color));

    let result = match cli.command {
        Commands::Ingest(args) => run_ingest(args, cli.verbose).map(|_| ()),
        Commands::Probe(args) => run_probe(args, cli.verbose).map(|_| ()),
    };

    if let Err(e) = result {
        terminal::print_error("Error", &e.to_string(), suggestion_for(&e));
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_ingest_basic_args() {
        let args = vec![
            "ingesta", "ingest", "-s", "card", "-d", "ingest_dir", "-e", "mp4",
        ];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Ingest(ingest_args) => {
                assert_eq!(ingest_args.source, PathBuf::from("card"));
                assert_eq!(ingest_args.destination, PathBuf::from("ingest_dir"));
                assert_eq!(ingest_args.extension, "mp4");
                assert!(!ingest_args.flatten);
                assert!(!ingest_args.proxies);
                assert!(!ingest_args.json);
                assert!(ingest_args.config.is_none());
                assert!(ingest_args.log_dir.is_none());
            }
            _ => panic!("Expected Ingest command"),
        }
        assert!(!cli.verbose);
        assert!(!cli.no_color);
    }

    #[test]
    fn test_parse_ingest_long_flags() {
        let args = vec![
            "ingesta",
            "ingest",
            "--source",
            "card",
            "--destination",
            "out",
            "--extension",
            ".MOV",
            "--flatten",
            "--proxies",
            "--workers",
            "4",
            "--log-dir",
            "custom_logs",
            "--json",
        ];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Ingest(ingest_args) => {
                assert_eq!(ingest_args.extension, ".MOV");
                assert!(ingest_args.flatten);
                assert!(ingest_args.proxies);
                assert_eq!(ingest_args.workers, Some(4));
                assert_eq!(ingest_args.log_dir, Some(PathBuf::from("custom_logs")));
                assert!(ingest_args.json);
            }
            _ => panic!("Expected Ingest command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(vec![
            "ingesta",
            "probe",
            "clip.mp4",
            "--verbose",
            "--no-color",
        ]);
        assert!(cli.verbose);
        assert!(cli.no_color);
        match cli.command {
            Commands::Probe(probe_args) => {
                assert_eq!(probe_args.file, PathBuf::from("clip.mp4"));
            }
            _ => panic!("Expected Probe command"),
        }
    }

    #[test]
    fn test_missing_required_args_is_rejected() {
        let result = Cli::try_parse_from(vec!["ingesta", "ingest", "-s", "card"]);
        assert!(result.is_err());
    }
}
