// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// analytics-replay: run encoded channel calls through the shared dispatcher
// on a desktop, one JSON method call per line.
//
// Entry point. Initialises logging, reads options and replays the input.

mod options;
mod replay;

use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use clap::Parser;
use marvel_analytics_bridge::Dispatcher;
use marvel_analytics_core::config::BridgeConfig;

use options::Options;
use replay::ReplaySink;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries one JSON record per call.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = Options::parse();

    let config = match &options.config {
        Some(path) => match BridgeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot load config");
                return ExitCode::from(2);
            }
        },
        None => BridgeConfig::default(),
    };

    let sink = if options.stub {
        ReplaySink::stub()
    } else {
        ReplaySink::memory()
    };
    let dispatcher = Dispatcher::new(sink, &config);
    tracing::info!(channel = %config.channel_name, "replaying analytics calls");

    let input: Box<dyn BufRead> = match &options.input {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot open input");
                return ExitCode::from(2);
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    match replay::run(&dispatcher, input, io::stdout().lock()) {
        Ok(stats) => {
            tracing::info!(
                calls = stats.calls,
                rejected = stats.rejected,
                not_implemented = stats.not_implemented,
                bad_lines = stats.bad_lines,
                failures = stats.failures,
                "replay finished"
            );
            if stats.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "replay aborted");
            ExitCode::FAILURE
        }
    }
}
