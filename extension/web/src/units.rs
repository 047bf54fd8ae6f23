//! Units loaded as `<script>` elements.
//!
//! Each unit's script ends by calling the exported `loaded()`, which hands
//! the parked token back to the loader.

use std::cell::RefCell;

use pageboot_runtime::{Unit, UnitContext, UnitResolver, unit_path};
use wasm_bindgen::JsValue;
use web_sys::console;

use crate::dom::{describe, document};

/// Element the unit scripts are inserted after.
pub const ANCHOR_ID: &str = "modules";

thread_local! {
	static PENDING: RefCell<Option<UnitContext>> = const { RefCell::new(None) };
}

/// Resolves every name to a script under the resource root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptResolver;

impl UnitResolver for ScriptResolver {
	fn resolve(&self, _name: &str) -> Option<Box<dyn Unit>> {
		Some(Box::new(ScriptUnit))
	}
}

struct ScriptUnit;

impl Unit for ScriptUnit {
	fn run(self: Box<Self>, cx: UnitContext) {
		let src = unit_path(cx.name());
		let name = cx.name().to_string();
		PENDING.with(|slot| *slot.borrow_mut() = Some(cx));

		if let Err(err) = insert_script(&src) {
			PENDING.with(|slot| slot.borrow_mut().take());
			console::error_1(&JsValue::from_str(&format!(
				"unit '{name}' could not be inserted ({}); boot stalled",
				describe(&err)
			)));
		}
	}
}

fn insert_script(src: &str) -> Result<(), JsValue> {
	let document = document()?;
	let script = document.create_element("script")?;
	script.set_attribute("src", src)?;

	match document.get_element_by_id(ANCHOR_ID) {
		Some(anchor) => anchor.after_with_node_1(&script),
		None => {
			let head = document.head().ok_or_else(|| JsValue::from_str("document has no head"))?;
			head.append_child(&script).map(|_| ())
		}
	}
}

/// Advances past the unit whose script is loading.
pub fn advance_pending() -> Result<(), JsValue> {
	let pending = PENDING.with(|slot| slot.borrow_mut().take());
	let cx = pending.ok_or_else(|| JsValue::from_str("loaded() called with no unit loading"))?;
	cx.advance().map_err(|err| JsValue::from_str(&err.to_string()))
}
