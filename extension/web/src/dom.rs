//! Document-backed implementations of the bootstrap's page seams.

use chrono::{DateTime, Utc};
use pageboot::{CookieJar, Error, Result, View};
use pageboot_protocol::{cookie_value, expire_cookie_string, set_cookie_string};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlDocument, HtmlElement, Window, console};

pub fn window() -> std::result::Result<Window, JsValue> {
	web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> std::result::Result<Document, JsValue> {
	window()?.document().ok_or_else(|| JsValue::from_str("no document"))
}

fn html_document() -> std::result::Result<HtmlDocument, JsValue> {
	document()?.dyn_into::<HtmlDocument>().map_err(|_| JsValue::from_str("document is not an HTML document"))
}

pub fn describe(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn jar_error(err: JsValue) -> Error {
	Error::JarUnavailable(describe(&err))
}

/// [`CookieJar`] over `document.cookie`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentJar;

impl CookieJar for DocumentJar {
	fn get(&self, name: &str) -> Result<Option<String>> {
		let header = html_document().and_then(|doc| doc.cookie()).map_err(jar_error)?;
		Ok(cookie_value(&header, name))
	}

	fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> Result<()> {
		html_document()
			.and_then(|doc| doc.set_cookie(&set_cookie_string(name, value, expires)))
			.map_err(jar_error)
	}

	fn expire(&self, name: &str) -> Result<()> {
		html_document()
			.and_then(|doc| doc.set_cookie(&expire_cookie_string(name)))
			.map_err(jar_error)
	}
}

/// [`View`] that reloads the current document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationView;

impl View for LocationView {
	fn reload(&self) {
		if let Err(err) = window().and_then(|win| win.location().reload()) {
			console::error_2(&JsValue::from_str("page reload failed"), &err);
		}
	}
}

/// Replaces the current history entry with `path`.
pub fn navigate(path: &str) -> std::result::Result<(), JsValue> {
	window()?.location().replace(path)
}

/// Drops the filter that hides the page while units load.
pub fn reveal_page() {
	let result = document().and_then(|doc| {
		let Some(root) = doc.document_element() else {
			return Ok(());
		};
		match root.dyn_into::<HtmlElement>() {
			Ok(root) => root.style().set_property("filter", "none"),
			Err(_) => Ok(()),
		}
	});
	if let Err(err) = result {
		console::error_2(&JsValue::from_str("could not reveal page"), &err);
	}
}
