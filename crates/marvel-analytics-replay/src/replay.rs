// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Replay loop: decode, dispatch, report.
//
// Every input line produces one JSON record on the output:
//
//   {"line":1,"method":"trackEvent","reply":[...],"forwarded":[...]}
//
// `reply` is the channel envelope (null for not-implemented). `forwarded`
// lists what reached the sink; it is always empty with the stub sink. Blank
// lines and lines starting with `#` are skipped.

use std::io::{BufRead, Write};

use serde_json::{Value, json};

use marvel_analytics_bridge::memory::{Forwarded, MemorySink};
use marvel_analytics_bridge::stub::StubSink;
use marvel_analytics_bridge::{AnalyticsSink, Dispatcher};
use marvel_analytics_core::codec::{decode_method_call, response_envelope};
use marvel_analytics_core::error::Result;
use marvel_analytics_core::types::{EventPayload, UserProperty};
use marvel_analytics_core::MethodResponse;

/// The sink the replay forwards to.
pub enum ReplaySink {
    Memory(MemorySink),
    Stub(StubSink),
}

impl ReplaySink {
    pub fn memory() -> Self {
        ReplaySink::Memory(MemorySink::new())
    }

    pub fn stub() -> Self {
        ReplaySink::Stub(StubSink)
    }

    fn drain(&self) -> Vec<Forwarded> {
        match self {
            ReplaySink::Memory(sink) => sink.drain(),
            ReplaySink::Stub(_) => Vec::new(),
        }
    }
}

impl AnalyticsSink for ReplaySink {
    fn log_event(&self, event: &EventPayload) -> Result<()> {
        match self {
            ReplaySink::Memory(sink) => sink.log_event(event),
            ReplaySink::Stub(sink) => sink.log_event(event),
        }
    }

    fn set_user_property(&self, property: &UserProperty) -> Result<()> {
        match self {
            ReplaySink::Memory(sink) => sink.set_user_property(property),
            ReplaySink::Stub(sink) => sink.set_user_property(property),
        }
    }
}

/// Counters reported when the replay ends.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub calls: usize,
    pub rejected: usize,
    pub not_implemented: usize,
    pub bad_lines: usize,
    pub failures: usize,
}

impl ReplayStats {
    /// No undecodable lines and no sink failures. Rejections and unknown
    /// methods are legitimate channel outcomes.
    pub fn is_clean(&self) -> bool {
        self.bad_lines == 0 && self.failures == 0
    }
}

fn forwarded_json(record: &Forwarded) -> Value {
    match record {
        Forwarded::Event(event) => {
            let params: serde_json::Map<String, Value> = event
                .params
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect();
            json!({ "event": event.name, "params": params })
        }
        Forwarded::UserProperty(property) => json!({
            "user_property": property.name,
            "value": property.value,
        }),
    }
}

/// Replay every call in `input`, writing one record per call to `out`.
pub fn run(
    dispatcher: &Dispatcher<ReplaySink>,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let call = match decode_method_call(trimmed) {
            Ok(call) => call,
            Err(e) => {
                tracing::warn!(line = number, error = %e, "skipping undecodable line");
                stats.bad_lines += 1;
                writeln!(out, "{}", json!({ "line": number, "error": e.to_string() }))?;
                continue;
            }
        };
        stats.calls += 1;

        let record = match dispatcher.dispatch(&call) {
            Ok(response) => {
                match &response {
                    MethodResponse::Error { .. } => stats.rejected += 1,
                    MethodResponse::NotImplemented => stats.not_implemented += 1,
                    MethodResponse::Success(_) => {}
                }
                let forwarded: Vec<Value> =
                    dispatcher.sink().drain().iter().map(forwarded_json).collect();
                json!({
                    "line": number,
                    "method": call.method,
                    "reply": response_envelope(&response),
                    "forwarded": forwarded,
                })
            }
            Err(e) => {
                tracing::error!(line = number, method = %call.method, error = %e, "sink failure");
                stats.failures += 1;
                json!({ "line": number, "method": call.method, "failure": e.to_string() })
            }
        };
        writeln!(out, "{record}")?;
    }

    out.flush()?;
    Ok(stats)
}
