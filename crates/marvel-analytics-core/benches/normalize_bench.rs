// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for call decoding and parameter normalization in the
// marvel-analytics-core crate.

use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use marvel_analytics_core::codec::decode_method_call;
use marvel_analytics_core::normalize::normalize_params;
use marvel_analytics_core::types::ChannelValue;

/// A parameter map shaped like the character list screen's load event.
fn sample_params() -> BTreeMap<String, ChannelValue> {
    let mut params = BTreeMap::new();
    params.insert("duration_ms".to_owned(), ChannelValue::Int(412));
    params.insert("offset".to_owned(), ChannelValue::Long(6_000_000_000));
    params.insert("ratio".to_owned(), ChannelValue::Double(0.75));
    params.insert("from_cache".to_owned(), ChannelValue::Bool(false));
    params.insert("query".to_owned(), ChannelValue::Text("spider".into()));
    params.insert("filters".to_owned(), ChannelValue::List(vec!["comics".into(), "series".into()]));
    params.insert("extra".to_owned(), ChannelValue::Null);
    params
}

fn bench_normalize(c: &mut Criterion) {
    let params = sample_params();
    c.bench_function("normalize_params_7_keys", |b| {
        b.iter(|| normalize_params(black_box(&params)))
    });
}

fn bench_decode(c: &mut Criterion) {
    let encoded = r#"{"method":"trackEvent","args":{"eventName":"character_list_load","parameters":{"duration_ms":412,"offset":6000000000,"ratio":0.75,"from_cache":false,"query":"spider"}}}"#;
    c.bench_function("decode_track_event_call", |b| {
        b.iter(|| decode_method_call(black_box(encoded)))
    });
}

criterion_group!(benches, bench_normalize, bench_decode);
criterion_main!(benches);
