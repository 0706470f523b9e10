// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line options.

use std::path::PathBuf;

use clap::Parser;

/// Replay encoded analytics channel calls through the shared dispatcher
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(name = "analytics-replay")]
#[command(version, about)]
pub struct Options {
    /// Bridge configuration (JSON); defaults apply otherwise
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Forward to the logging stub sink instead of recording
    #[arg(long)]
    pub stub: bool,

    /// File with one JSON method call per line; stdin if omitted
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("analytics-replay").chain(args.iter().copied()))
    }

    #[test]
    fn no_arguments_reads_stdin() {
        assert_eq!(parse(&[]).unwrap(), Options::default());
    }

    #[test]
    fn all_options() {
        let options = parse(&["--config", "bridge.json", "--stub", "calls.jsonl"]).unwrap();
        assert_eq!(options.config, Some(PathBuf::from("bridge.json")));
        assert!(options.stub);
        assert_eq!(options.input, Some(PathBuf::from("calls.jsonl")));
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["a.jsonl", "b.jsonl"]).is_err());
    }
}
