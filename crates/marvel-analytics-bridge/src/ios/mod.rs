// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS platform bridge via objc2.
//
// The Swift shell registers the `com.marvel.analytics` FlutterMethodChannel
// and forwards every call to `marvel_analytics_handle_call(method, args)`.
// `args` is whatever the Flutter codec produced (`NSDictionary`, `NSNumber`,
// `NSString`, `NSArray`, `NSNull`). The reply is the JSON envelope from
// `marvel_analytics_core::codec` as an `NSString`, or nil for
// not-implemented.
//
// Events go to the `FIRAnalytics` class. Firebase is configured by
// `FirebaseApp.configure()` in the app delegate before the bridge is
// installed; the bridge only looks the class up.
//
// ## Number classification
//
// `NSNumber` hides its origin. CFBoolean instances are booleans; otherwise
// the `objCType` encoding decides between 32-bit, 64-bit and floating point.

#![cfg(target_os = "ios")]

use std::collections::BTreeMap;
use std::ffi::{CStr, c_char};

use objc2::rc::Retained;
use objc2::runtime::{AnyClass, AnyObject, NSObject};
use objc2::{ClassType, class, msg_send};
use objc2_foundation::{NSDictionary, NSException, NSNumber, NSString};

use marvel_analytics_core::MethodCall;
use marvel_analytics_core::codec;
use marvel_analytics_core::config::BridgeConfig;
use marvel_analytics_core::error::{AnalyticsError, Result};
use marvel_analytics_core::types::{
    Arguments, ChannelValue, EventParams, EventPayload, ParamValue, UserProperty,
};

use crate::dispatcher::Dispatcher;
use crate::global;
use crate::traits::{AnalyticsSink, SharedSink};

// ---------------------------------------------------------------------------
// CoreFoundation FFI (boolean detection)
// ---------------------------------------------------------------------------

unsafe extern "C" {
    fn CFGetTypeID(cf: *const AnyObject) -> usize;
    fn CFBooleanGetTypeID() -> usize;
}

/// Name of the exception raised for failures the channel does not answer.
const BRIDGE_EXCEPTION: &str = "MarvelAnalyticsBridgeError";

// ---------------------------------------------------------------------------
// Vendor sink: FIRAnalytics
// ---------------------------------------------------------------------------

/// Firebase Analytics through the `FIRAnalytics` class methods.
pub struct FirAnalyticsSink {
    class: &'static AnyClass,
}

impl FirAnalyticsSink {
    /// Look up `FIRAnalytics`. Fails if the Firebase framework is not linked.
    pub fn new() -> Result<Self> {
        let class = AnyClass::get(c"FIRAnalytics")
            .ok_or_else(|| AnalyticsError::Sink("FIRAnalytics class is not linked".into()))?;
        Ok(Self { class })
    }
}

/// `NSString` / `NSNumber` for one normalized parameter.
fn param_object(value: &ParamValue) -> Retained<NSObject> {
    match value {
        ParamValue::Text(text) => Retained::into_super(NSString::from_str(text)),
        ParamValue::Long(n) => Retained::into_super(Retained::into_super(NSNumber::new_i64(*n))),
        ParamValue::Double(x) => Retained::into_super(Retained::into_super(NSNumber::new_f64(*x))),
    }
}

fn parameters_dictionary(params: &EventParams) -> Retained<NSDictionary<NSString, NSObject>> {
    let keys: Vec<Retained<NSString>> = params.keys().map(|key| NSString::from_str(key)).collect();
    let key_refs: Vec<&NSString> = keys.iter().map(|key| &**key).collect();
    let values: Vec<Retained<NSObject>> = params.values().map(param_object).collect();
    NSDictionary::from_retained_objects(&key_refs, &values)
}

impl AnalyticsSink for FirAnalyticsSink {
    fn log_event(&self, event: &EventPayload) -> Result<()> {
        let name = NSString::from_str(&event.name);
        let parameters = parameters_dictionary(&event.params);

        // SAFETY: `+[FIRAnalytics logEventWithName:parameters:]` takes an
        // NSString and an NSDictionary<NSString *, id> and returns void.
        unsafe {
            let _: () = msg_send![self.class, logEventWithName: &*name, parameters: &*parameters];
        }
        Ok(())
    }

    fn set_user_property(&self, property: &UserProperty) -> Result<()> {
        let name = NSString::from_str(&property.name);
        let value = NSString::from_str(&property.value);

        // SAFETY: `+[FIRAnalytics setUserPropertyString:forName:]` takes two
        // NSStrings and returns void.
        unsafe {
            let _: () = msg_send![self.class, setUserPropertyString: &*value, forName: &*name];
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Objective-C objects -> ChannelValue
// ---------------------------------------------------------------------------

fn is_kind(obj: &AnyObject, cls: &AnyClass) -> bool {
    // SAFETY: `isKindOfClass:` is defined on every NSObject.
    unsafe { msg_send![obj, isKindOfClass: cls] }
}

fn description(obj: &AnyObject) -> String {
    // SAFETY: `description` is defined on every NSObject and returns NSString.
    let text: Retained<NSString> = unsafe { msg_send![obj, description] };
    text.to_string()
}

fn number_value(obj: &AnyObject) -> ChannelValue {
    // SAFETY: the caller checked `obj` is an NSNumber; same pointer, same
    // layout.
    let number: &NSNumber = unsafe { &*(obj as *const AnyObject as *const NSNumber) };

    // SAFETY: CFGetTypeID accepts any CF or toll-free bridged object.
    if unsafe { CFGetTypeID(obj) == CFBooleanGetTypeID() } {
        return ChannelValue::Bool(number.as_bool());
    }

    // SAFETY: `objCType` returns a NUL-terminated encoding owned by the number.
    let encoding = unsafe {
        let ptr: *const c_char = msg_send![number, objCType];
        CStr::from_ptr(ptr)
    };
    match encoding.to_bytes() {
        b"f" | b"d" => ChannelValue::Double(number.as_f64()),
        b"c" | b"C" | b"s" | b"S" | b"i" => ChannelValue::Int(number.as_i32()),
        _ => ChannelValue::Long(number.as_i64()),
    }
}

fn dictionary_value(obj: &AnyObject) -> BTreeMap<String, ChannelValue> {
    let mut entries = BTreeMap::new();

    // SAFETY: the caller checked `obj` is an NSDictionary; `allKeys`,
    // `count`, `objectAtIndex:` and `objectForKey:` are its documented API.
    unsafe {
        let keys: Retained<AnyObject> = msg_send![obj, allKeys];
        let count: usize = msg_send![&*keys, count];
        for index in 0..count {
            let key: Retained<AnyObject> = msg_send![&*keys, objectAtIndex: index];
            let value: Option<Retained<AnyObject>> = msg_send![obj, objectForKey: &*key];

            let key = match channel_value(&key) {
                ChannelValue::Text(text) => text,
                other => other.to_string(),
            };
            let value = value.as_deref().map_or(ChannelValue::Null, channel_value);
            entries.insert(key, value);
        }
    }
    entries
}

fn array_value(obj: &AnyObject) -> Vec<ChannelValue> {
    // SAFETY: the caller checked `obj` is an NSArray.
    unsafe {
        let count: usize = msg_send![obj, count];
        (0..count)
            .map(|index| {
                let item: Retained<AnyObject> = msg_send![obj, objectAtIndex: index];
                channel_value(&item)
            })
            .collect()
    }
}

/// Classify one object coming out of the Flutter codec.
pub fn channel_value(obj: &AnyObject) -> ChannelValue {
    if is_kind(obj, NSString::class()) {
        // SAFETY: checked above; NSString is an NSObject subclass.
        let text: &NSString = unsafe { &*(obj as *const AnyObject as *const NSString) };
        return ChannelValue::Text(text.to_string());
    }
    if is_kind(obj, NSNumber::class()) {
        return number_value(obj);
    }
    if is_kind(obj, class!(NSNull)) {
        return ChannelValue::Null;
    }
    if is_kind(obj, class!(NSDictionary)) {
        return ChannelValue::Map(dictionary_value(obj));
    }
    if is_kind(obj, class!(NSArray)) {
        return ChannelValue::List(array_value(obj));
    }
    ChannelValue::Other(description(obj))
}

// ---------------------------------------------------------------------------
// Exported entry points
// ---------------------------------------------------------------------------

/// Raise an `NSException` for a failure the channel does not answer.
fn raise(err: &AnalyticsError) -> *mut NSString {
    tracing::error!(error = %err, "analytics bridge call failed");
    let name = NSString::from_str(BRIDGE_EXCEPTION);
    let reason = NSString::from_str(&err.to_string());
    if let Some(exception) = NSException::new(&name, Some(&reason), None) {
        // SAFETY: entry points use the `C-unwind` ABI, so the exception may
        // unwind into the Swift caller.
        unsafe { objc2::exception::throw(NSException::into_exception(exception)) }
    }
    std::ptr::null_mut()
}

/// Route bridge logs to the unified log and install the process-wide
/// dispatcher. Call once, after `FirebaseApp.configure()`. Returns false if
/// installation failed.
///
/// # Safety
///
/// `config_json` must be null or a valid NUL-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn marvel_analytics_init(config_json: *const c_char) -> bool {
    crate::logging::init_device_logging();

    let result = (|| -> Result<()> {
        let config = if config_json.is_null() {
            BridgeConfig::default()
        } else {
            // SAFETY: guaranteed by the caller.
            let text = unsafe { CStr::from_ptr(config_json) };
            let text = text
                .to_str()
                .map_err(|e| AnalyticsError::Config(format!("config is not UTF-8: {e}")))?;
            BridgeConfig::from_json(text)?
        };

        let sink = FirAnalyticsSink::new()?;
        global::install(Dispatcher::new(Box::new(sink) as SharedSink, &config))?;
        Ok(())
    })();

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "analytics bridge init failed");
            false
        }
    }
}

/// Handle one channel call. Returns the reply envelope (autoreleased), or nil
/// when the method is not implemented.
///
/// # Safety
///
/// `method` must be a valid `NSString`; `arguments` must be nil or a valid
/// object.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn marvel_analytics_handle_call(
    method: *const NSString,
    arguments: *const AnyObject,
) -> *mut NSString {
    // SAFETY: guaranteed by the caller.
    let (method, arguments) = unsafe { (method.as_ref(), arguments.as_ref()) };

    let method = method.map(NSString::to_string).unwrap_or_default();
    let arguments = arguments
        .map(|args| Arguments::from_value(channel_value(args)))
        .unwrap_or_default();

    match global::handle(&MethodCall::new(method, arguments)) {
        Ok(response) => match codec::encode_response(&response) {
            Some(envelope) => Retained::autorelease_return(NSString::from_str(&envelope)),
            None => std::ptr::null_mut(),
        },
        Err(e) => raise(&e),
    }
}
