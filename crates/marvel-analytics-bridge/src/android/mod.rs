// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// The Kotlin shell registers the `com.marvel.analytics` MethodChannel and
// forwards every call to `AnalyticsBridge.nativeHandle(method, arguments)`.
// `arguments` is whatever the Flutter codec produced (a `java.util.Map` in
// practice). The reply is the JSON envelope from
// `marvel_analytics_core::codec`, or `null` for not-implemented.
//
// ## Failure path
//
// Sink failures are not answered over the channel. If the failure was a Java
// exception thrown by Firebase it is left pending so it surfaces unchanged in
// the Kotlin caller; anything else is rethrown as a `RuntimeException`.

#![cfg(target_os = "android")]

use std::collections::BTreeMap;

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::jstring;
use jni::{JNIEnv, JavaVM};

use marvel_analytics_core::codec;
use marvel_analytics_core::config::BridgeConfig;
use marvel_analytics_core::error::{AnalyticsError, Result};
use marvel_analytics_core::types::{
    Arguments, ChannelValue, EventParams, EventPayload, ParamValue, UserProperty,
};
use marvel_analytics_core::MethodCall;

use crate::dispatcher::Dispatcher;
use crate::global;
use crate::traits::{AnalyticsSink, SharedSink};

const FIREBASE_ANALYTICS: &str = "com/google/firebase/analytics/FirebaseAnalytics";

/// Convenience: map any `jni::errors::Error` into `AnalyticsError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> AnalyticsError {
    AnalyticsError::Bridge(format!("{context}: {e}"))
}

/// Failures of the vendor call itself are sink failures, not glue failures.
fn sink_err(context: &str, e: jni::errors::Error) -> AnalyticsError {
    AnalyticsError::Sink(format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// Vendor sink: com.google.firebase.analytics.FirebaseAnalytics
// ---------------------------------------------------------------------------

/// Firebase Analytics reached through JNI.
///
/// Holds the `JavaVM` and a global reference to the `FirebaseAnalytics`
/// instance, so any thread can forward after attaching.
pub struct FirebaseSink {
    vm: JavaVM,
    analytics: GlobalRef,
}

impl FirebaseSink {
    /// Acquire `FirebaseAnalytics.getInstance(context)`. The SDK itself was
    /// already bootstrapped by the application.
    pub fn new(env: &mut JNIEnv, context: &JObject) -> Result<Self> {
        let vm = env.get_java_vm().map_err(|e| jni_err("get_java_vm", e))?;

        let instance = env
            .call_static_method(
                FIREBASE_ANALYTICS,
                "getInstance",
                "(Landroid/content/Context;)Lcom/google/firebase/analytics/FirebaseAnalytics;",
                &[JValue::Object(context)],
            )
            .map_err(|e| sink_err("FirebaseAnalytics.getInstance", e))?
            .l()
            .map_err(|e| jni_err("getInstance->l", e))?;

        let analytics = env
            .new_global_ref(&instance)
            .map_err(|e| jni_err("new_global_ref(FirebaseAnalytics)", e))?;

        Ok(Self { vm, analytics })
    }

    /// Build an `android.os.Bundle` holding the normalized parameters.
    fn bundle<'local>(env: &mut JNIEnv<'local>, params: &EventParams) -> Result<JObject<'local>> {
        let bundle = env
            .new_object("android/os/Bundle", "()V", &[])
            .map_err(|e| jni_err("new Bundle", e))?;

        for (key, value) in params {
            let j_key: JString = env
                .new_string(key)
                .map_err(|e| jni_err("new_string(key)", e))?;

            match value {
                ParamValue::Text(text) => {
                    let j_text: JString = env
                        .new_string(text)
                        .map_err(|e| jni_err("new_string(value)", e))?;
                    env.call_method(
                        &bundle,
                        "putString",
                        "(Ljava/lang/String;Ljava/lang/String;)V",
                        &[JValue::Object(&j_key), JValue::Object(&j_text)],
                    )
                }
                ParamValue::Long(n) => env.call_method(
                    &bundle,
                    "putLong",
                    "(Ljava/lang/String;J)V",
                    &[JValue::Object(&j_key), JValue::Long(*n)],
                ),
                ParamValue::Double(x) => env.call_method(
                    &bundle,
                    "putDouble",
                    "(Ljava/lang/String;D)V",
                    &[JValue::Object(&j_key), JValue::Double(*x)],
                ),
            }
            .map_err(|e| jni_err("Bundle.put", e))?;
        }

        Ok(bundle)
    }
}

impl AnalyticsSink for FirebaseSink {
    fn log_event(&self, event: &EventPayload) -> Result<()> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| jni_err("attach_current_thread", e))?;

        let bundle = Self::bundle(&mut env, &event.params)?;
        let j_name: JString = env
            .new_string(&event.name)
            .map_err(|e| jni_err("new_string(event)", e))?;

        env.call_method(
            self.analytics.as_obj(),
            "logEvent",
            "(Ljava/lang/String;Landroid/os/Bundle;)V",
            &[JValue::Object(&j_name), JValue::Object(&bundle)],
        )
        .map_err(|e| sink_err("FirebaseAnalytics.logEvent", e))?;

        Ok(())
    }

    fn set_user_property(&self, property: &UserProperty) -> Result<()> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| jni_err("attach_current_thread", e))?;

        let j_name: JString = env
            .new_string(&property.name)
            .map_err(|e| jni_err("new_string(name)", e))?;
        let j_value: JString = env
            .new_string(&property.value)
            .map_err(|e| jni_err("new_string(value)", e))?;

        env.call_method(
            self.analytics.as_obj(),
            "setUserProperty",
            "(Ljava/lang/String;Ljava/lang/String;)V",
            &[JValue::Object(&j_name), JValue::Object(&j_value)],
        )
        .map_err(|e| sink_err("FirebaseAnalytics.setUserProperty", e))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Java objects -> ChannelValue
// ---------------------------------------------------------------------------

fn is_instance(env: &mut JNIEnv, obj: &JObject, class: &str) -> Result<bool> {
    env.is_instance_of(obj, class)
        .map_err(|e| jni_err("is_instance_of", e))
}

fn java_string(env: &mut JNIEnv, obj: &JObject) -> Result<String> {
    let j_str: &JString = obj.into();
    Ok(env
        .get_string(j_str)
        .map_err(|e| jni_err("get_string", e))?
        .into())
}

/// `obj.toString()`, the textual form for values the channel cannot carry.
fn java_to_string(env: &mut JNIEnv, obj: &JObject) -> Result<String> {
    let text = env
        .call_method(obj, "toString", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("toString", e))?
        .l()
        .map_err(|e| jni_err("toString->l", e))?;
    java_string(env, &text)
}

/// Classify one object coming out of the Flutter codec.
pub fn channel_value(env: &mut JNIEnv, obj: &JObject) -> Result<ChannelValue> {
    if obj.is_null() {
        return Ok(ChannelValue::Null);
    }

    if is_instance(env, obj, "java/lang/String")? {
        return java_string(env, obj).map(ChannelValue::Text);
    }
    if is_instance(env, obj, "java/lang/Boolean")? {
        let flag = env
            .call_method(obj, "booleanValue", "()Z", &[])
            .and_then(|v| v.z())
            .map_err(|e| jni_err("booleanValue", e))?;
        return Ok(ChannelValue::Bool(flag));
    }
    if is_instance(env, obj, "java/lang/Integer")? {
        let n = env
            .call_method(obj, "intValue", "()I", &[])
            .and_then(|v| v.i())
            .map_err(|e| jni_err("intValue", e))?;
        return Ok(ChannelValue::Int(n));
    }
    if is_instance(env, obj, "java/lang/Long")? {
        let n = env
            .call_method(obj, "longValue", "()J", &[])
            .and_then(|v| v.j())
            .map_err(|e| jni_err("longValue", e))?;
        return Ok(ChannelValue::Long(n));
    }
    if is_instance(env, obj, "java/lang/Double")? {
        let x = env
            .call_method(obj, "doubleValue", "()D", &[])
            .and_then(|v| v.d())
            .map_err(|e| jni_err("doubleValue", e))?;
        return Ok(ChannelValue::Double(x));
    }
    if is_instance(env, obj, "java/util/Map")? {
        return map_value(env, obj).map(ChannelValue::Map);
    }
    if is_instance(env, obj, "java/util/List")? {
        return list_value(env, obj).map(ChannelValue::List);
    }

    java_to_string(env, obj).map(ChannelValue::Other)
}

fn map_value(env: &mut JNIEnv, obj: &JObject) -> Result<BTreeMap<String, ChannelValue>> {
    let map = env.get_map(obj).map_err(|e| jni_err("get_map", e))?;
    let mut iter = map.iter(env).map_err(|e| jni_err("Map.iterator", e))?;

    let mut entries = BTreeMap::new();
    while let Some((key, value)) = iter.next(env).map_err(|e| jni_err("Map.next", e))? {
        let key = match channel_value(env, &key)? {
            ChannelValue::Text(text) => text,
            other => other.to_string(),
        };
        let value = channel_value(env, &value)?;
        entries.insert(key, value);
    }
    Ok(entries)
}

fn list_value(env: &mut JNIEnv, obj: &JObject) -> Result<Vec<ChannelValue>> {
    let list = env.get_list(obj).map_err(|e| jni_err("get_list", e))?;
    let size = list.size(env).map_err(|e| jni_err("List.size", e))?;

    let mut items = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
    for index in 0..size {
        let item = match list.get(env, index).map_err(|e| jni_err("List.get", e))? {
            Some(item) => channel_value(env, &item)?,
            None => ChannelValue::Null,
        };
        items.push(item);
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Exported entry points: com.marvel.analytics.AnalyticsBridge
// ---------------------------------------------------------------------------

/// Report a propagated failure to the JVM.
fn rethrow(env: &mut JNIEnv, err: &AnalyticsError) {
    tracing::error!(error = %err, "analytics bridge call failed");
    if env.exception_check().unwrap_or(false) {
        // Firebase's own exception is already pending; let it surface as-is.
        return;
    }
    if let Err(e) = env.throw_new("java/lang/RuntimeException", err.to_string()) {
        tracing::error!(error = %e, "could not throw into the JVM");
    }
}

/// `AnalyticsBridge.nativeInit(context: Context, configJson: String?)`.
///
/// Called once from `MainActivity.configureFlutterEngine`. Routes bridge logs
/// to logcat, then installs the dispatcher. A null `configJson` uses the
/// default configuration.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_marvel_analytics_AnalyticsBridge_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
    config_json: JString<'local>,
) {
    crate::logging::init_device_logging();

    let result = || -> Result<()> {
        let config = if config_json.is_null() {
            BridgeConfig::default()
        } else {
            let text: String = env
                .get_string(&config_json)
                .map_err(|e| jni_err("get_string(config)", e))?
                .into();
            BridgeConfig::from_json(&text)?
        };

        let sink = FirebaseSink::new(&mut env, &context)?;
        global::install(Dispatcher::new(Box::new(sink) as SharedSink, &config))?;
        Ok(())
    }();

    if let Err(e) = result {
        rethrow(&mut env, &e);
    }
}

/// `AnalyticsBridge.nativeHandle(method: String, arguments: Any?): String?`.
///
/// Returns the JSON reply envelope, or `null` when the method is not
/// implemented.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_marvel_analytics_AnalyticsBridge_nativeHandle<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    method: JString<'local>,
    arguments: JObject<'local>,
) -> jstring {
    let result = || -> Result<Option<String>> {
        let method_name: String = env
            .get_string(&method)
            .map_err(|e| jni_err("get_string(method)", e))?
            .into();
        let arguments = Arguments::from_value(channel_value(&mut env, &arguments)?);

        let response = global::handle(&MethodCall::new(method_name, arguments))?;
        Ok(codec::encode_response(&response))
    }();

    match result {
        Ok(Some(envelope)) => match env.new_string(envelope) {
            Ok(reply) => reply.into_raw(),
            Err(e) => {
                rethrow(&mut env, &jni_err("new_string(reply)", e));
                std::ptr::null_mut()
            }
        },
        Ok(None) => std::ptr::null_mut(),
        Err(e) => {
            rethrow(&mut env, &e);
            std::ptr::null_mut()
        }
    }
}
