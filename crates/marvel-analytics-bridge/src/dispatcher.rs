// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method dispatcher shared by every platform shell.
//
// Each call gets exactly one response. A missing or mistyped required
// argument is answered with `INVALID_ARGUMENT`; an unknown method with
// not-implemented. Sink failures are not answered: they come back as `Err`
// for the platform shell to hand to the host.

use marvel_analytics_core::channel::{INITIALIZE_REPLY, Method, MethodCall, MethodCallHandler, MethodResponse};
use marvel_analytics_core::config::BridgeConfig;
use marvel_analytics_core::error::{AnalyticsError, Result};
use marvel_analytics_core::normalize::normalize_params;
use marvel_analytics_core::policy::EventPolicy;
use marvel_analytics_core::types::*;
use tracing::{debug, info, warn};

use crate::traits::AnalyticsSink;

// Argument keys, as sent by the UI layer.
pub const EVENT_NAME_ARG: &str = "eventName";
pub const PARAMETERS_ARG: &str = "parameters";
pub const NAME_ARG: &str = "name";
pub const VALUE_ARG: &str = "value";
pub const SCREEN_NAME_ARG: &str = "screenName";
pub const ERROR_ARG: &str = "error";
pub const STACK_TRACE_ARG: &str = "stackTrace";
pub const FATAL_ARG: &str = "fatal";

fn invalid(message: &str) -> AnalyticsError {
    AnalyticsError::InvalidArgument(message.to_owned())
}

/// Routes calls to handlers and forwards the results to a vendor sink.
pub struct Dispatcher<S> {
    sink: S,
    policy: EventPolicy,
    screen_class: String,
}

impl<S: AnalyticsSink> Dispatcher<S> {
    pub fn new(sink: S, config: &BridgeConfig) -> Self {
        Self {
            sink,
            policy: EventPolicy::from_config(config),
            screen_class: config.screen_class.clone(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn policy(&self) -> &EventPolicy {
        &self.policy
    }

    /// Handle one call and produce its single response.
    pub fn dispatch(&self, call: &MethodCall) -> Result<MethodResponse> {
        let Some(method) = call.known_method() else {
            debug!(method = %call.method, "analytics method not implemented");
            return Ok(MethodResponse::NotImplemented);
        };

        let args = &call.arguments;
        let outcome = match method {
            Method::Initialize => self.initialize(),
            Method::TrackEvent => self.track_event(args),
            Method::SetUserProperty => self.set_user_property(args),
            Method::TrackScreen => self.track_screen(args),
            Method::TrackError => self.track_error(args),
        };

        match outcome {
            Ok(value) => Ok(MethodResponse::Success(value)),
            Err(err) => match err.channel_code() {
                Some(code) => {
                    warn!(%method, message = %err, "rejected analytics call");
                    Ok(MethodResponse::error(code, err.to_string()))
                }
                None => Err(err),
            },
        }
    }

    /// The vendor SDK is bootstrapped with the process; nothing to forward.
    fn initialize(&self) -> Result<Option<ChannelValue>> {
        debug!("analytics channel initialised");
        Ok(Some(INITIALIZE_REPLY.into()))
    }

    fn track_event(&self, args: &Arguments) -> Result<Option<ChannelValue>> {
        let name = args.text(EVENT_NAME_ARG).ok_or_else(|| invalid(EVENT_NAME_REQUIRED))?;

        let params = match args.get(PARAMETERS_ARG) {
            Some(ChannelValue::Map(raw)) => normalize_params(raw),
            None | Some(ChannelValue::Null) => EventParams::new(),
            Some(other) => {
                warn!(event = %name, parameters = %other, "ignoring non-map event parameters");
                EventParams::new()
            }
        };
        let event = EventPayload::new(name, params)?;

        if self.policy.should_log(&event.name) {
            info!(event = %event.name, params = ?event.params, "analytics event");
        }
        self.sink.log_event(&event)?;

        Ok(Some(format!("Event '{}' processed successfully!", event.name).into()))
    }

    fn set_user_property(&self, args: &Arguments) -> Result<Option<ChannelValue>> {
        let (Some(name), Some(value)) = (args.text(NAME_ARG), args.text(VALUE_ARG)) else {
            return Err(invalid(NAME_AND_VALUE_REQUIRED));
        };
        let property = UserProperty::new(name, value)?;
        self.sink.set_user_property(&property)?;
        Ok(None)
    }

    fn track_screen(&self, args: &Arguments) -> Result<Option<ChannelValue>> {
        let screen_name = args
            .text(SCREEN_NAME_ARG)
            .ok_or_else(|| invalid(SCREEN_NAME_REQUIRED))?;
        let screen = ScreenView::new(screen_name)?;

        debug!(screen = %screen.screen_name, "screen view");
        self.sink.log_event(&screen.into_event(&self.screen_class))?;
        Ok(None)
    }

    fn track_error(&self, args: &Arguments) -> Result<Option<ChannelValue>> {
        let message = args.text(ERROR_ARG).ok_or_else(|| invalid(ERROR_MESSAGE_REQUIRED))?;
        let stack_trace = args.text(STACK_TRACE_ARG).map(str::to_owned);
        let fatal = args.boolean(FATAL_ARG).unwrap_or(false);

        let report = ErrorReport::new(message, stack_trace, fatal)?;
        self.sink.log_event(&report.into_event())?;
        Ok(None)
    }
}

impl<S: AnalyticsSink> MethodCallHandler for Dispatcher<S> {
    fn on_method_call(&self, call: &MethodCall) -> Result<MethodResponse> {
        self.dispatch(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Forwarded, MemorySink};
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Formatted log output collected from a scoped subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logs_of(f: impl FnOnce()) -> String {
        let captured = CapturedLogs::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn dispatcher() -> Dispatcher<MemorySink> {
        Dispatcher::new(MemorySink::new(), &BridgeConfig::default())
    }

    fn call(method: &str, args: Arguments) -> MethodCall {
        MethodCall::new(method, args)
    }

    fn text(value: &str) -> ParamValue {
        ParamValue::Text(value.to_owned())
    }

    #[test]
    fn initialize_replies_without_forwarding() {
        let d = dispatcher();
        let response = d.dispatch(&call("initialize", Arguments::new())).unwrap();
        assert_eq!(response, MethodResponse::success("MethodChannel OK"));
        assert!(d.sink().is_empty());
    }

    #[test]
    fn track_event_without_name_is_invalid() {
        let d = dispatcher();
        let args = Arguments::new().with("parameters", BTreeMap::<String, ChannelValue>::new());
        let response = d.dispatch(&call("trackEvent", args)).unwrap();

        assert_eq!(
            response,
            MethodResponse::error("INVALID_ARGUMENT", "Event name is required")
        );
        assert!(d.sink().is_empty());
    }

    #[test]
    fn track_event_with_mistyped_name_is_invalid() {
        let d = dispatcher();
        let response = d
            .dispatch(&call("trackEvent", Arguments::new().with("eventName", 7_i32)))
            .unwrap();
        assert!(matches!(response, MethodResponse::Error { ref code, .. } if code == "INVALID_ARGUMENT"));
        assert!(d.sink().is_empty());
    }

    #[test]
    fn track_event_normalizes_every_parameter() {
        let d = dispatcher();
        let mut raw = BTreeMap::new();
        raw.insert("count".to_owned(), ChannelValue::Bool(true));
        raw.insert("hits".to_owned(), ChannelValue::Int(3));
        raw.insert("ratio".to_owned(), ChannelValue::Double(1.5));
        raw.insert("tag".to_owned(), ChannelValue::Null);
        raw.insert("query".to_owned(), "hulk".into());
        let args = Arguments::new()
            .with("eventName", "character_search_initiated")
            .with("parameters", raw);

        let response = d.dispatch(&call("trackEvent", args)).unwrap();
        assert_eq!(
            response,
            MethodResponse::success("Event 'character_search_initiated' processed successfully!")
        );

        let events = d.sink().events();
        assert_eq!(events.len(), 1);
        let params = &events[0].params;
        assert_eq!(params.len(), 5);
        assert_eq!(params["count"], text("true"));
        assert_eq!(params["hits"], ParamValue::Long(3));
        assert_eq!(params["ratio"], ParamValue::Double(1.5));
        assert_eq!(params["tag"], text("null"));
        assert_eq!(params["query"], text("hulk"));
    }

    #[test]
    fn track_event_defaults_to_empty_parameters() {
        let d = dispatcher();
        d.dispatch(&call("trackEvent", Arguments::new().with("eventName", "button_tap")))
            .unwrap();
        d.dispatch(&call(
            "trackEvent",
            Arguments::new()
                .with("eventName", "button_tap")
                .with("parameters", "not a map"),
        ))
        .unwrap();

        let events = d.sink().events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|event| event.params.is_empty()));
    }

    #[test]
    fn important_event_writes_diagnostic_record() {
        let d = dispatcher();
        let mut raw = BTreeMap::new();
        raw.insert("id".to_owned(), ChannelValue::Int(1_011_334));
        let args = Arguments::new()
            .with("eventName", "character_view")
            .with("parameters", raw);

        let logs = logs_of(|| {
            d.dispatch(&call("trackEvent", args)).unwrap();
        });

        assert!(logs.contains("analytics event"), "{logs}");
        assert!(logs.contains("character_view"), "{logs}");
        assert_eq!(d.sink().events().len(), 1);
    }

    #[test]
    fn other_events_are_forwarded_without_diagnostic_record() {
        let d = dispatcher();
        let logs = logs_of(|| {
            d.dispatch(&call("trackEvent", Arguments::new().with("eventName", "button_tap")))
                .unwrap();
        });

        assert!(!logs.contains("analytics event"), "{logs}");
        assert_eq!(d.sink().events()[0].name, "button_tap");
    }

    #[test]
    fn disabled_diagnostics_write_no_record() {
        let config = BridgeConfig {
            diagnostics: false,
            ..Default::default()
        };
        let d = Dispatcher::new(MemorySink::new(), &config);
        let logs = logs_of(|| {
            d.dispatch(&call("trackEvent", Arguments::new().with("eventName", "api_error")))
                .unwrap();
        });

        assert!(!logs.contains("analytics event"), "{logs}");
        assert_eq!(d.sink().events()[0].name, "api_error");
    }

    #[test]
    fn empty_required_names_are_invalid() {
        let d = dispatcher();
        let cases = [
            ("trackEvent", "eventName", "Event name is required"),
            ("trackScreen", "screenName", "Screen name is required"),
            ("trackError", "error", "Error message is required"),
        ];
        for (method, key, message) in cases {
            let response = d.dispatch(&call(method, Arguments::new().with(key, ""))).unwrap();
            assert_eq!(response, MethodResponse::error("INVALID_ARGUMENT", message));
        }
        assert!(d.sink().is_empty());
    }

    #[test]
    fn set_user_property_forwards() {
        let d = dispatcher();
        let args = Arguments::new().with("name", "favorite_hero").with("value", "Storm");
        let response = d.dispatch(&call("setUserProperty", args)).unwrap();

        assert_eq!(response, MethodResponse::empty());
        assert_eq!(
            d.sink().records(),
            vec![Forwarded::UserProperty(UserProperty {
                name: "favorite_hero".into(),
                value: "Storm".into(),
            })]
        );
    }

    #[test]
    fn set_user_property_accepts_empty_value() {
        let d = dispatcher();
        let args = Arguments::new().with("name", "favorite_hero").with("value", "");
        let response = d.dispatch(&call("setUserProperty", args)).unwrap();

        assert_eq!(response, MethodResponse::empty());
        assert_eq!(d.sink().user_properties()[0].value, "");
    }

    #[test]
    fn set_user_property_requires_both_fields() {
        let d = dispatcher();
        for args in [
            Arguments::new().with("name", "favorite_hero"),
            Arguments::new().with("value", "Storm"),
            Arguments::new().with("name", "favorite_hero").with("value", 5_i32),
            Arguments::new().with("name", "").with("value", "Storm"),
        ] {
            let response = d.dispatch(&call("setUserProperty", args)).unwrap();
            assert_eq!(
                response,
                MethodResponse::error("INVALID_ARGUMENT", "Name and value are required")
            );
        }
        assert!(d.sink().is_empty());
    }

    #[test]
    fn track_screen_forwards_screen_view() {
        let d = dispatcher();
        let response = d
            .dispatch(&call("trackScreen", Arguments::new().with("screenName", "Home")))
            .unwrap();

        assert_eq!(response, MethodResponse::empty());
        let event = &d.sink().events()[0];
        assert_eq!(event.name, "screen_view");
        assert_eq!(event.params.len(), 2);
        assert_eq!(event.params["screen_name"], text("Home"));
        assert_eq!(event.params["screen_class"], text("Flutter"));
    }

    #[test]
    fn track_screen_uses_configured_class() {
        let config = BridgeConfig {
            screen_class: "FlutterViewController".into(),
            ..Default::default()
        };
        let d = Dispatcher::new(MemorySink::new(), &config);
        d.dispatch(&call("trackScreen", Arguments::new().with("screenName", "Home")))
            .unwrap();
        assert_eq!(d.sink().events()[0].params["screen_class"], text("FlutterViewController"));
    }

    #[test]
    fn track_screen_without_name_is_invalid() {
        let d = dispatcher();
        let response = d.dispatch(&call("trackScreen", Arguments::new())).unwrap();
        assert_eq!(
            response,
            MethodResponse::error("INVALID_ARGUMENT", "Screen name is required")
        );
    }

    #[test]
    fn track_error_defaults() {
        let d = dispatcher();
        let response = d
            .dispatch(&call("trackError", Arguments::new().with("error", "boom")))
            .unwrap();

        assert_eq!(response, MethodResponse::empty());
        let event = &d.sink().events()[0];
        assert_eq!(event.name, "app_exception");
        assert_eq!(event.params.len(), 2);
        assert_eq!(event.params["error_message"], text("boom"));
        assert_eq!(event.params["fatal"], text("false"));
        assert!(!event.params.contains_key("stack_trace"));
    }

    #[test]
    fn track_error_with_trace_and_fatal() {
        let d = dispatcher();
        let args = Arguments::new()
            .with("error", "boom")
            .with("stackTrace", "at x")
            .with("fatal", true);
        d.dispatch(&call("trackError", args)).unwrap();

        let event = &d.sink().events()[0];
        assert_eq!(event.params["error_message"], text("boom"));
        assert_eq!(event.params["stack_trace"], text("at x"));
        assert_eq!(event.params["fatal"], text("true"));
    }

    #[test]
    fn track_error_mistyped_optionals_fall_back() {
        let d = dispatcher();
        let args = Arguments::new()
            .with("error", "boom")
            .with("stackTrace", 12_i32)
            .with("fatal", "yes");
        d.dispatch(&call("trackError", args)).unwrap();

        let event = &d.sink().events()[0];
        assert!(!event.params.contains_key("stack_trace"));
        assert_eq!(event.params["fatal"], text("false"));
    }

    #[test]
    fn track_error_without_message_is_invalid() {
        let d = dispatcher();
        let response = d
            .dispatch(&call("trackError", Arguments::new().with("fatal", true)))
            .unwrap();
        assert_eq!(
            response,
            MethodResponse::error("INVALID_ARGUMENT", "Error message is required")
        );
        assert!(d.sink().is_empty());
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let d = dispatcher();
        let args = Arguments::new().with("eventName", "character_view");
        let response = d.dispatch(&call("frobnicate", args)).unwrap();

        assert_eq!(response, MethodResponse::NotImplemented);
        assert!(d.sink().is_empty());
    }

    #[test]
    fn sink_failure_propagates() {
        let d = Dispatcher::new(MemorySink::failing("sdk crashed"), &BridgeConfig::default());
        let err = d
            .dispatch(&call("trackEvent", Arguments::new().with("eventName", "api_error")))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Sink(_)));

        // Validation still wins over the sink: nothing is forwarded.
        let response = d.dispatch(&call("trackEvent", Arguments::new())).unwrap();
        assert!(!response.is_success());
    }

    #[test]
    fn handler_trait_matches_dispatch() {
        let d = dispatcher();
        let handler: &dyn MethodCallHandler = &d;
        let response = handler.on_method_call(&call("initialize", Arguments::new())).unwrap();
        assert!(response.is_success());
    }
}
