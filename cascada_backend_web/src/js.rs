// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small helpers for calling into untyped player libraries.

use cascada_core::host::HostError;
use js_sys::{Array, Function, JSON, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

/// Looks up a property of the global object, treating `undefined` and
/// `null` as absent.
pub(crate) fn global(name: &str) -> Option<JsValue> {
    let value = Reflect::get(&js_sys::global(), &JsValue::from_str(name)).ok()?;
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

/// Looks up `target[name]` as a function.
pub(crate) fn method(target: &JsValue, name: &str) -> Result<Function, HostError> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or_else(|| HostError::Setup(format!("{name} is not a function")))
}

/// Calls `target[name](...args)`, turning a throw into [`HostError::Setup`].
pub(crate) fn call(target: &JsValue, name: &str, args: &[&JsValue]) -> Result<JsValue, HostError> {
    let function = method(target, name)?;
    let args: Array = args.iter().copied().collect();
    Reflect::apply(&function, target, &args).map_err(|err| setup_error(name, &err))
}

/// Renders a thrown value or event payload for logs.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    JSON::stringify(value)
        .ok()
        .and_then(|text| text.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

pub(crate) fn setup_error(context: &str, err: &JsValue) -> HostError {
    HostError::Setup(format!("{context}: {}", describe(err)))
}

pub(crate) fn dom_error(context: &str, err: &JsValue) -> HostError {
    HostError::Dom(format!("{context}: {}", describe(err)))
}

/// Parses a `serde_json` value into a plain JS object.
pub(crate) fn to_js(value: &serde_json::Value) -> Result<JsValue, HostError> {
    JSON::parse(&value.to_string()).map_err(|err| setup_error("JSON.parse", &err))
}

/// Creates an element and casts it to `T`.
pub(crate) fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, HostError> {
    document
        .create_element(tag)
        .map_err(|err| dom_error(tag, &err))?
        .dyn_into::<T>()
        .map_err(|_| HostError::Dom(format!("<{tag}> has an unexpected type")))
}

/// Sets `width: 100%; height: 100%` on an element.
pub(crate) fn fill(element: &HtmlElement) {
    let style = element.style();
    let _ = style.set_property("width", "100%");
    let _ = style.set_property("height", "100%");
}
