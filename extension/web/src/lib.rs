//! Browser entry point for pageboot.
//!
//! On module start this builds the page's [`Bootstrap`], loads each unit as
//! a `<script>` and, once the units have drained, validates the stored
//! session. The hooks below are exported from the module and installed on
//! the global object before the first unit loads, since unit scripts call
//! them as plain globals:
//!
//! - `loaded()`: called by a unit script once it is set up
//! - `onLoaded(fn)`: defer `fn` until every unit has loaded
//! - `isLoggedIn()`
//! - `getUserInfo(fn)`: `fn` receives the user record; never called when logged out
//! - `createSession(grant)`: store the session from a login response
//! - `logout()`: resolves to whether a session was ended

pub mod dom;
pub mod slots;
pub mod units;

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use std::sync::Arc;

use js_sys::Function;
use pageboot::{BootConfig, Bootstrap, Error, HttpApi, SessionGrant};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::console;

use crate::dom::{DocumentJar, LocationView, navigate, reveal_page, window};
use crate::slots::Slots;
use crate::units::ScriptResolver;

thread_local! {
	static BOOT: RefCell<Option<Rc<Bootstrap>>> = const { RefCell::new(None) };
	static CALLBACKS: RefCell<Slots<Function>> = RefCell::new(Slots::default());
}

fn to_js(err: impl Display) -> JsValue {
	JsValue::from_str(&err.to_string())
}

fn current() -> Result<Rc<Bootstrap>, JsValue> {
	BOOT.with(|slot| slot.borrow().clone())
		.ok_or_else(|| JsValue::from_str("pageboot has not started"))
}

/// Names under which the hooks are installed on the global object.
pub const GLOBAL_HOOKS: [&str; 6] = ["loaded", "onLoaded", "isLoggedIn", "getUserInfo", "createSession", "logout"];

fn hook(name: &str) -> Option<JsValue> {
	let hook = match name {
		"loaded" => Closure::<dyn Fn() -> Result<(), JsValue>>::new(loaded).into_js_value(),
		"onLoaded" => Closure::<dyn Fn(Function) -> Result<(), JsValue>>::new(on_loaded).into_js_value(),
		"isLoggedIn" => Closure::<dyn Fn() -> bool>::new(is_logged_in).into_js_value(),
		"getUserInfo" => Closure::<dyn Fn(Function) -> Result<(), JsValue>>::new(get_user_info).into_js_value(),
		"createSession" => Closure::<dyn Fn(JsValue) -> Result<(), JsValue>>::new(create_session).into_js_value(),
		"logout" => Closure::<dyn Fn() -> js_sys::Promise>::new(|| {
			future_to_promise(async { logout().await.map(JsValue::from) })
		})
		.into_js_value(),
		_ => return None,
	};
	Some(hook)
}

fn install_hooks() -> Result<(), JsValue> {
	let global = js_sys::global();
	for name in GLOBAL_HOOKS {
		let hook = hook(name).ok_or_else(|| JsValue::from_str(&format!("no hook named {name}")))?;
		js_sys::Reflect::set(&global, &JsValue::from_str(name), &hook)?;
	}
	Ok(())
}

#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
	console_error_panic_hook::set_once();

	let config = BootConfig {
		origin: window()?.location().origin()?,
		..BootConfig::default()
	};
	let api = HttpApi::new(&config.origin, &config.api_path).map_err(to_js)?;
	let boot = Rc::new(Bootstrap::new(
		config,
		ScriptResolver,
		Arc::new(DocumentJar),
		Arc::new(api),
		Arc::new(LocationView),
	));
	BOOT.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&boot)));

	boot.on_drained(reveal_page);
	let drained = boot.drained();
	install_hooks()?;
	boot.start().map_err(to_js)?;

	spawn_local(async move {
		if drained.await.is_err() {
			return;
		}
		if let Err(err) = boot.settle().await {
			console::error_1(&to_js(format!("session validation failed: {err}")));
		}
	});
	Ok(())
}

/// Signals that the unit currently loading is set up.
#[wasm_bindgen]
pub fn loaded() -> Result<(), JsValue> {
	units::advance_pending()
}

#[wasm_bindgen(js_name = onLoaded)]
pub fn on_loaded(callback: Function) -> Result<(), JsValue> {
	let boot = current()?;
	let id = CALLBACKS.with(|slots| slots.borrow_mut().insert(callback));
	boot.on_drained(move || call_registered(id));
	Ok(())
}

fn call_registered(id: u32) {
	let Some(callback) = CALLBACKS.with(|slots| slots.borrow_mut().take(id)) else {
		return;
	};
	if let Err(err) = callback.call0(&JsValue::NULL) {
		console::error_2(&JsValue::from_str("onLoaded callback threw"), &err);
	}
}

#[wasm_bindgen(js_name = isLoggedIn)]
pub fn is_logged_in() -> bool {
	current().map(|boot| boot.is_logged_in()).unwrap_or(false)
}

#[wasm_bindgen(js_name = getUserInfo)]
pub fn get_user_info(callback: Function) -> Result<(), JsValue> {
	let boot = current()?;
	spawn_local(async move {
		let result = boot
			.get_user_info(|user| {
				let value = match user.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
					Ok(value) => value,
					Err(err) => {
						console::error_1(&err.into());
						return;
					}
				};
				if let Err(err) = callback.call1(&JsValue::NULL, &value) {
					console::error_2(&JsValue::from_str("getUserInfo callback threw"), &err);
				}
			})
			.await;
		if let Err(err) = result {
			report_failure(err);
		}
	});
	Ok(())
}

/// Sends the visitor to the error page for a failed call, or logs the failure.
fn report_failure(err: Error) {
	if let Error::Api(api) = &err {
		if let Some(page) = api.error_page() {
			console::warn_1(&to_js(format!("{err}; redirecting to {page}")));
			if navigate(&page).is_ok() {
				return;
			}
		}
	}
	console::error_1(&to_js(err));
}

#[wasm_bindgen(js_name = createSession)]
pub fn create_session(grant: JsValue) -> Result<(), JsValue> {
	let grant: SessionGrant = serde_wasm_bindgen::from_value(grant)?;
	current()?.store().write_grant(&grant).map_err(to_js)?;
	Ok(())
}

#[wasm_bindgen]
pub async fn logout() -> Result<bool, JsValue> {
	let boot = current()?;
	boot.logout().await.map_err(to_js)
}
