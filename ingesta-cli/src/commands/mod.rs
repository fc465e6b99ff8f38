//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `ingest` command.
/// This command copies matching files, probes them, optionally encodes
/// proxies and writes the CSV reports.
pub mod ingest;

/// Module containing the implementation of the `probe` command.
/// This command prints the metadata fields of a single file.
pub mod probe;
