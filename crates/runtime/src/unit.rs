//! Units, completion tokens, and name resolution.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::loader::ModuleLoader;

/// Directory units are served from, relative to the site origin.
pub const UNIT_ROOT: &str = "/resources/js";

/// Boot order used by the site when no explicit list is configured.
pub const DEFAULT_UNITS: [&str; 7] = ["globals", "api", "cookies", "users", "editor", "header", "footer"];

/// Returns the convention path for a unit, e.g. `/resources/js/header.js`.
pub fn unit_path(name: &str) -> String {
	format!("{UNIT_ROOT}/{name}.js")
}

/// Completion token handed to exactly one running unit.
///
/// Not `Clone`: passing it to [`ModuleLoader::advance`] consumes it, so a unit
/// can request advancement at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct UnitToken {
	pub(crate) seq: u64,
}

impl UnitToken {
	/// Sequence number of the load cycle this token belongs to.
	pub fn seq(&self) -> u64 {
		self.seq
	}
}

/// Everything a running unit needs to talk back to its loader.
pub struct UnitContext {
	pub(crate) loader: ModuleLoader,
	pub(crate) token: UnitToken,
	pub(crate) name: String,
	pub(crate) position: usize,
}

impl UnitContext {
	/// Unit identifier being loaded.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Zero-based position of the unit in the boot order.
	pub fn position(&self) -> usize {
		self.position
	}

	/// Loader driving this unit.
	pub fn loader(&self) -> &ModuleLoader {
		&self.loader
	}

	/// Defers `callback` until every unit has loaded.
	pub fn register_on_drained<F>(&self, callback: F)
	where
		F: FnOnce() + Send + 'static,
	{
		self.loader.register_on_drained(callback);
	}

	/// Signals that this unit finished setting up and the next one may start.
	pub fn advance(self) -> Result<()> {
		self.loader.advance(self.token)
	}

	/// Splits the context so the token can be stored until the unit finishes.
	pub fn into_parts(self) -> (ModuleLoader, UnitToken) {
		(self.loader, self.token)
	}
}

impl fmt::Debug for UnitContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UnitContext")
			.field("name", &self.name)
			.field("position", &self.position)
			.field("token", &self.token)
			.finish_non_exhaustive()
	}
}

/// One self-contained piece of page behavior.
///
/// `run` may return before the unit is done; the unit must eventually call
/// [`UnitContext::advance`] or the bootstrap stalls.
pub trait Unit: Send {
	fn run(self: Box<Self>, cx: UnitContext);
}

impl<F> Unit for F
where
	F: FnOnce(UnitContext) + Send,
{
	fn run(self: Box<Self>, cx: UnitContext) {
		(*self)(cx);
	}
}

/// Maps unit identifiers to runnable units.
pub trait UnitResolver: Send + Sync {
	/// Returns `None` when `name` is unknown.
	fn resolve(&self, name: &str) -> Option<Box<dyn Unit>>;
}

type UnitFn = Arc<dyn Fn(UnitContext) + Send + Sync>;
type FallbackFn = Arc<dyn Fn(&str) -> Option<Box<dyn Unit>> + Send + Sync>;

/// Name-keyed resolver with an optional fallback for unlisted names.
#[derive(Default, Clone)]
pub struct UnitRegistry {
	units: HashMap<String, UnitFn>,
	fallback: Option<FallbackFn>,
}

impl UnitRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a unit body under `name`, replacing any previous entry.
	pub fn with_unit<F>(mut self, name: impl Into<String>, body: F) -> Self
	where
		F: Fn(UnitContext) + Send + Sync + 'static,
	{
		self.units.insert(name.into(), Arc::new(body));
		self
	}

	/// Registers a unit that only advances.
	pub fn with_ready_unit(self, name: impl Into<String>) -> Self {
		self.with_unit(name, |cx| {
			let _ = cx.advance();
		})
	}

	/// Resolver consulted for names without an explicit entry.
	pub fn with_fallback<F>(mut self, fallback: F) -> Self
	where
		F: Fn(&str) -> Option<Box<dyn Unit>> + Send + Sync + 'static,
	{
		self.fallback = Some(Arc::new(fallback));
		self
	}

	pub fn contains(&self, name: &str) -> bool {
		self.units.contains_key(name)
	}
}

impl UnitResolver for UnitRegistry {
	fn resolve(&self, name: &str) -> Option<Box<dyn Unit>> {
		if let Some(body) = self.units.get(name) {
			let body = Arc::clone(body);
			return Some(Box::new(move |cx: UnitContext| body(cx)) as Box<dyn Unit>);
		}
		self.fallback.as_ref().and_then(|fallback| fallback(name))
	}
}

impl fmt::Debug for UnitRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&str> = self.units.keys().map(String::as_str).collect();
		names.sort_unstable();
		f.debug_struct("UnitRegistry")
			.field("units", &names)
			.field("fallback", &self.fallback.is_some())
			.finish()
	}
}
