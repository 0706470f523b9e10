// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Parameter normalization: channel values onto the vendor's parameter types.
//
// Precedence, first match wins:
//
// 1. text          -> text
// 2. boolean       -> text "true" / "false"
// 3. 32-bit int    -> 64-bit integer
// 4. 64-bit int    -> 64-bit integer
// 5. double        -> double
// 6. anything else -> its textual form
//
// The boolean encoding is part of the historical analytics schema and must
// not become 0/1 or a native boolean.

use std::collections::BTreeMap;

use crate::types::{ChannelValue, EventParams, ParamValue};

/// Text the vendor receives for a boolean.
pub fn bool_text(flag: bool) -> &'static str {
    if flag { "true" } else { "false" }
}

/// Normalize a single value.
pub fn normalize_value(value: &ChannelValue) -> ParamValue {
    match value {
        ChannelValue::Text(text) => ParamValue::Text(text.clone()),
        ChannelValue::Bool(flag) => ParamValue::Text(bool_text(*flag).to_owned()),
        ChannelValue::Int(n) => ParamValue::Long(i64::from(*n)),
        ChannelValue::Long(n) => ParamValue::Long(*n),
        ChannelValue::Double(x) => ParamValue::Double(*x),
        ChannelValue::Null
        | ChannelValue::List(_)
        | ChannelValue::Map(_)
        | ChannelValue::Other(_) => ParamValue::Text(value.to_string()),
    }
}

/// Normalize a whole parameter map. Every key is kept.
pub fn normalize_params(raw: &BTreeMap<String, ChannelValue>) -> EventParams {
    raw.iter()
        .map(|(key, value)| (key.clone(), normalize_value(value)))
        .collect()
}
