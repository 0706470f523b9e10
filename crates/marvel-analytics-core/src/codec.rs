// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON method codec, wire-compatible with Flutter's `JSONMethodCodec`.
//
//   call:            {"method": "trackEvent", "args": {...}}
//   success:         [value]
//   error:           [code, message, details]
//   not implemented: no envelope at all

use serde_json::{Map, Number, Value, json};

use crate::channel::{MethodCall, MethodResponse};
use crate::error::{AnalyticsError, Result};
use crate::types::{Arguments, ChannelValue, ParamValue};

impl From<Value> for ChannelValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ChannelValue::Null,
            Value::Bool(flag) => ChannelValue::Bool(flag),
            Value::Number(n) => number_value(&n),
            Value::String(text) => ChannelValue::Text(text),
            Value::Array(items) => ChannelValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => ChannelValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

/// Smallest integer width that holds the number, else a double.
fn number_value(n: &Number) -> ChannelValue {
    if let Some(i) = n.as_i64() {
        return match i32::try_from(i) {
            Ok(small) => ChannelValue::Int(small),
            Err(_) => ChannelValue::Long(i),
        };
    }
    match n.as_f64() {
        Some(x) => ChannelValue::Double(x),
        None => ChannelValue::Other(n.to_string()),
    }
}

impl ChannelValue {
    /// JSON form of the value. Non-finite doubles have no JSON form and
    /// encode as `null`.
    pub fn to_json(&self) -> Value {
        match self {
            ChannelValue::Null => Value::Null,
            ChannelValue::Bool(flag) => Value::Bool(*flag),
            ChannelValue::Int(n) => Value::from(*n),
            ChannelValue::Long(n) => Value::from(*n),
            ChannelValue::Double(x) => Number::from_f64(*x).map_or(Value::Null, Value::Number),
            ChannelValue::Text(text) | ChannelValue::Other(text) => Value::String(text.clone()),
            ChannelValue::List(items) => Value::Array(items.iter().map(ChannelValue::to_json).collect()),
            ChannelValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

impl ParamValue {
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Text(text) => Value::String(text.clone()),
            ParamValue::Long(n) => Value::from(*n),
            ParamValue::Double(x) => Number::from_f64(*x).map_or(Value::Null, Value::Number),
        }
    }
}

/// Decode one encoded method call.
pub fn decode_method_call(text: &str) -> Result<MethodCall> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut envelope) = value else {
        return Err(AnalyticsError::Codec("method call must be a JSON object".into()));
    };

    let method = match envelope.remove("method") {
        Some(Value::String(method)) => method,
        _ => {
            return Err(AnalyticsError::Codec(
                "method call has no string `method` field".into(),
            ));
        }
    };
    let arguments = envelope
        .remove("args")
        .map(|args| Arguments::from_value(args.into()))
        .unwrap_or_default();

    Ok(MethodCall::new(method, arguments))
}

/// The reply envelope as JSON. Not-implemented has no envelope.
pub fn response_envelope(response: &MethodResponse) -> Option<Value> {
    let envelope = match response {
        MethodResponse::Success(value) => {
            json!([value.as_ref().map_or(Value::Null, ChannelValue::to_json)])
        }
        MethodResponse::Error {
            code,
            message,
            details,
        } => json!([
            code,
            message,
            details.as_ref().map_or(Value::Null, ChannelValue::to_json)
        ]),
        MethodResponse::NotImplemented => return None,
    };
    Some(envelope)
}

/// Encode a reply envelope. Not-implemented yields `None`.
pub fn encode_response(response: &MethodResponse) -> Option<String> {
    response_envelope(response).map(|envelope| envelope.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_track_event_call() {
        let call = decode_method_call(
            r#"{"method":"trackEvent","args":{"eventName":"character_view","parameters":{"id":1011334,"big":5000000000,"ratio":0.5,"fav":true}}}"#,
        )
        .unwrap();

        assert_eq!(call.method, "trackEvent");
        assert_eq!(call.arguments.text("eventName"), Some("character_view"));
        let params = call.arguments.map("parameters").unwrap();
        assert_eq!(params["id"], ChannelValue::Int(1_011_334));
        assert_eq!(params["big"], ChannelValue::Long(5_000_000_000));
        assert_eq!(params["ratio"], ChannelValue::Double(0.5));
        assert_eq!(params["fav"], ChannelValue::Bool(true));
    }

    #[test]
    fn fractional_zero_stays_double() {
        let call = decode_method_call(r#"{"method":"m","args":{"x":2.0}}"#).unwrap();
        assert_eq!(call.arguments.get("x"), Some(&ChannelValue::Double(2.0)));
    }

    #[test]
    fn missing_or_null_args_are_empty() {
        assert!(decode_method_call(r#"{"method":"initialize"}"#).unwrap().arguments.is_empty());
        assert!(
            decode_method_call(r#"{"method":"initialize","args":null}"#)
                .unwrap()
                .arguments
                .is_empty()
        );
    }

    #[test]
    fn rejects_envelopes_without_method() {
        assert!(matches!(
            decode_method_call(r#"{"args":{}}"#),
            Err(AnalyticsError::Codec(_))
        ));
        assert!(matches!(
            decode_method_call(r#"["trackEvent"]"#),
            Err(AnalyticsError::Codec(_))
        ));
        assert!(matches!(
            decode_method_call("not json"),
            Err(AnalyticsError::Serialization(_))
        ));
    }

    #[test]
    fn encodes_envelopes() {
        assert_eq!(
            encode_response(&MethodResponse::success("MethodChannel OK")).as_deref(),
            Some(r#"["MethodChannel OK"]"#)
        );
        assert_eq!(encode_response(&MethodResponse::empty()).as_deref(), Some("[null]"));
        assert_eq!(
            encode_response(&MethodResponse::error("INVALID_ARGUMENT", "Event name is required"))
                .as_deref(),
            Some(r#"["INVALID_ARGUMENT","Event name is required",null]"#)
        );
        assert_eq!(encode_response(&MethodResponse::NotImplemented), None);
    }

    #[test]
    fn non_finite_double_encodes_as_null() {
        assert_eq!(ChannelValue::Double(f64::NAN).to_json(), Value::Null);
    }
}
