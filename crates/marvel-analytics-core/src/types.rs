// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: channel values and the payloads handed to the vendor sink.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{AnalyticsError, Result};

pub const SCREEN_VIEW_EVENT: &str = "screen_view";
pub const SCREEN_NAME_PARAM: &str = "screen_name";
pub const SCREEN_CLASS_PARAM: &str = "screen_class";

pub const APP_EXCEPTION_EVENT: &str = "app_exception";
pub const ERROR_MESSAGE_PARAM: &str = "error_message";
pub const STACK_TRACE_PARAM: &str = "stack_trace";
pub const FATAL_PARAM: &str = "fatal";

pub const EVENT_NAME_REQUIRED: &str = "Event name is required";
pub const NAME_AND_VALUE_REQUIRED: &str = "Name and value are required";
pub const SCREEN_NAME_REQUIRED: &str = "Screen name is required";
pub const ERROR_MESSAGE_REQUIRED: &str = "Error message is required";

// ---------------------------------------------------------------------------
// Channel values
// ---------------------------------------------------------------------------

/// A dynamically-typed value as it crossed the channel.
///
/// Platform shells decide the variant once, at the boundary. `Int` and `Long`
/// are kept apart because both host codecs distinguish 32- and 64-bit
/// integers.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Text(String),
    List(Vec<ChannelValue>),
    Map(BTreeMap<String, ChannelValue>),
    /// A host object with no channel representation, already rendered as text.
    Other(String),
}

impl ChannelValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ChannelValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ChannelValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ChannelValue>> {
        match self {
            ChannelValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// JVM-style double text: plain decimal with a fractional part inside
/// `[1e-3, 1e7)`, `1.0E20` style outside it, and `NaN` / `Infinity`.
fn write_double(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("NaN");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if x == 0.0 || (1e-3..1e7).contains(&x.abs()) {
        return write!(f, "{x:?}");
    }

    let scientific = format!("{x:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        write!(f, "{mantissa}E{exponent}")
    } else {
        write!(f, "{mantissa}.0E{exponent}")
    }
}

/// Textual form used when a value has no vendor parameter type.
///
/// Collections render as `[a, b]` and `{k=v}`, doubles as the JVM prints them
/// (`2.0`, `1.0E20`), and null renders as `null`.
impl fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelValue::Null => f.write_str("null"),
            ChannelValue::Bool(flag) => write!(f, "{flag}"),
            ChannelValue::Int(n) => write!(f, "{n}"),
            ChannelValue::Long(n) => write!(f, "{n}"),
            ChannelValue::Double(x) => write_double(f, *x),
            ChannelValue::Text(text) => f.write_str(text),
            ChannelValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ChannelValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
            ChannelValue::Other(text) => f.write_str(text),
        }
    }
}

impl From<&str> for ChannelValue {
    fn from(value: &str) -> Self {
        ChannelValue::Text(value.to_owned())
    }
}

impl From<String> for ChannelValue {
    fn from(value: String) -> Self {
        ChannelValue::Text(value)
    }
}

impl From<bool> for ChannelValue {
    fn from(value: bool) -> Self {
        ChannelValue::Bool(value)
    }
}

impl From<i32> for ChannelValue {
    fn from(value: i32) -> Self {
        ChannelValue::Int(value)
    }
}

impl From<i64> for ChannelValue {
    fn from(value: i64) -> Self {
        ChannelValue::Long(value)
    }
}

impl From<f64> for ChannelValue {
    fn from(value: f64) -> Self {
        ChannelValue::Double(value)
    }
}

impl From<BTreeMap<String, ChannelValue>> for ChannelValue {
    fn from(value: BTreeMap<String, ChannelValue>) -> Self {
        ChannelValue::Map(value)
    }
}

impl From<Vec<ChannelValue>> for ChannelValue {
    fn from(value: Vec<ChannelValue>) -> Self {
        ChannelValue::List(value)
    }
}

// ---------------------------------------------------------------------------
// Argument bag
// ---------------------------------------------------------------------------

/// The untyped argument bag of one method call.
///
/// Typed accessors return `None` both for absent keys and for values of the
/// wrong kind; the two cases are treated the same by every handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(BTreeMap<String, ChannelValue>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a map value as the argument bag. Anything else is an empty bag.
    pub fn from_value(value: ChannelValue) -> Self {
        match value {
            ChannelValue::Map(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ChannelValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ChannelValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ChannelValue> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ChannelValue::as_text)
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ChannelValue::as_bool)
    }

    pub fn map(&self, key: &str) -> Option<&BTreeMap<String, ChannelValue>> {
        self.get(key).and_then(ChannelValue::as_map)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ChannelValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, ChannelValue)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, ChannelValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Vendor payloads
// ---------------------------------------------------------------------------

/// A parameter value the vendor SDK accepts natively.
///
/// There is no boolean variant: the vendor has no boolean parameter type and
/// booleans travel as the text `"true"` / `"false"`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Long(i64),
    Double(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.write_str(text),
            ParamValue::Long(n) => write!(f, "{n}"),
            ParamValue::Double(x) => write_double(f, *x),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Normalized event parameters, keyed by parameter name.
pub type EventParams = BTreeMap<String, ParamValue>;

/// An event ready for `logEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPayload {
    pub name: String,
    pub params: EventParams,
}

impl EventPayload {
    pub fn new(name: impl Into<String>, params: EventParams) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AnalyticsError::InvalidArgument(EVENT_NAME_REQUIRED.into()));
        }
        Ok(Self { name, params })
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }
}

/// A user property ready for `setUserProperty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProperty {
    pub name: String,
    /// May be empty: only the name is a name-type field.
    pub value: String,
}

impl UserProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AnalyticsError::InvalidArgument(NAME_AND_VALUE_REQUIRED.into()));
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }
}

/// A screen view, reported as a `screen_view` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub screen_name: String,
}

impl ScreenView {
    pub fn new(screen_name: impl Into<String>) -> Result<Self> {
        let screen_name = screen_name.into();
        if screen_name.is_empty() {
            return Err(AnalyticsError::InvalidArgument(SCREEN_NAME_REQUIRED.into()));
        }
        Ok(Self { screen_name })
    }

    pub fn into_event(self, screen_class: &str) -> EventPayload {
        let mut params = EventParams::new();
        params.insert(SCREEN_NAME_PARAM.to_owned(), ParamValue::Text(self.screen_name));
        params.insert(SCREEN_CLASS_PARAM.to_owned(), screen_class.into());
        EventPayload {
            name: SCREEN_VIEW_EVENT.to_owned(),
            params,
        }
    }
}

/// An error raised in the UI layer, reported as an `app_exception` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub stack_trace: Option<String>,
    pub fatal: bool,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>, stack_trace: Option<String>, fatal: bool) -> Result<Self> {
        let message = message.into();
        if message.is_empty() {
            return Err(AnalyticsError::InvalidArgument(ERROR_MESSAGE_REQUIRED.into()));
        }
        Ok(Self {
            message,
            stack_trace,
            fatal,
        })
    }

    /// `stack_trace` is only present when one was supplied; `fatal` always is.
    pub fn into_event(self) -> EventPayload {
        let mut params = EventParams::new();
        params.insert(ERROR_MESSAGE_PARAM.to_owned(), ParamValue::Text(self.message));
        if let Some(trace) = self.stack_trace {
            params.insert(STACK_TRACE_PARAM.to_owned(), ParamValue::Text(trace));
        }
        params.insert(
            FATAL_PARAM.to_owned(),
            crate::normalize::bool_text(self.fatal).into(),
        );
        EventPayload {
            name: APP_EXCEPTION_EVENT.to_owned(),
            params,
        }
    }
}
