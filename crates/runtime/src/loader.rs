//! Sequential unit loader with a deferred-completion registry.
//!
//! The loader owns two pieces of state: the queue of unit identifiers still
//! to load and the callbacks waiting for the queue to drain.
//!
//! # Load cycle
//!
//! 1. Pop the next identifier and mint a fresh [`UnitToken`]
//! 2. Resolve the identifier and run the unit with a [`UnitContext`]
//! 3. The unit calls [`UnitContext::advance`] once it is set up
//! 4. Repeat until the queue is empty, then fire every drained callback in
//!    registration order
//!
//! A unit that never advances stalls the loader forever. Nothing is
//! cancelled or skipped; [`ModuleLoader::status`] and
//! [`ModuleLoader::stalled_for`] make the stall observable.
//!
//! The state lock is never held while a unit or a callback runs, so both may
//! call back into the loader.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::channel::oneshot;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{LoaderError, Result};
use crate::unit::{UnitContext, UnitResolver, UnitToken};

/// Callback fired once the unit queue has drained.
pub type DrainedCallback = Box<dyn FnOnce() + Send + 'static>;

/// Snapshot of where the loader is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderStatus {
	/// Not started yet.
	Idle,
	/// A unit is running and has not advanced.
	Loading { name: String, position: usize, since: DateTime<Utc> },
	/// The queue is empty and drained callbacks are firing.
	Draining,
	/// Every callback has fired; late registrations run immediately.
	Drained,
}

/// A unit that has been loading longer than a caller-chosen threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StallReport {
	pub name: String,
	pub position: usize,
	pub elapsed: Duration,
}

impl fmt::Display for StallReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"unit '{}' (#{}) has not advanced after {}ms",
			self.name,
			self.position,
			self.elapsed.as_millis()
		)
	}
}

enum Phase {
	Idle,
	Loading { token: u64, name: String, position: usize, since: DateTime<Utc> },
	Draining,
	Drained,
}

struct LoaderState {
	enqueued: bool,
	queue: VecDeque<String>,
	callbacks: Vec<DrainedCallback>,
	phase: Phase,
	next_token: u64,
	loaded: Vec<String>,
}

struct Inner {
	state: Mutex<LoaderState>,
	resolver: Box<dyn UnitResolver>,
}

/// Handle to a unit loader; clones share the same queue and registry.
#[derive(Clone)]
pub struct ModuleLoader {
	inner: Arc<Inner>,
}

impl ModuleLoader {
	/// Creates an idle loader that resolves unit names through `resolver`.
	pub fn new<R>(resolver: R) -> Self
	where
		R: UnitResolver + 'static,
	{
		Self {
			inner: Arc::new(Inner {
				state: Mutex::new(LoaderState {
					enqueued: false,
					queue: VecDeque::new(),
					callbacks: Vec::new(),
					phase: Phase::Idle,
					next_token: 0,
					loaded: Vec::new(),
				}),
				resolver: Box::new(resolver),
			}),
		}
	}

	/// Fills the queue. Only the first call is accepted.
	pub fn enqueue_all<I, S>(&self, names: I) -> Result<()>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut state = self.inner.state.lock();
		if state.enqueued {
			return Err(LoaderError::AlreadyEnqueued);
		}
		state.queue = names.into_iter().map(Into::into).collect();
		state.enqueued = true;
		debug!(target = "pageboot.loader", units = state.queue.len(), "unit queue enqueued");
		Ok(())
	}

	/// Begins draining the queue by loading its first unit.
	pub fn start(&self) -> Result<()> {
		let next = {
			let mut state = self.inner.state.lock();
			if !state.enqueued {
				return Err(LoaderError::NotEnqueued);
			}
			if !matches!(state.phase, Phase::Idle) {
				return Err(LoaderError::AlreadyStarted);
			}
			claim_next(&mut state)
		};
		self.run_next(next)
	}

	/// Defers `callback` until the queue has drained.
	///
	/// Once drained the callback runs synchronously before this returns.
	/// Callbacks registered while the registry is firing run after every
	/// callback registered before them.
	pub fn register_on_drained<F>(&self, callback: F)
	where
		F: FnOnce() + Send + 'static,
	{
		let mut state = self.inner.state.lock();
		if matches!(state.phase, Phase::Drained) {
			drop(state);
			callback();
			return;
		}
		state.callbacks.push(Box::new(callback));
	}

	/// Future that resolves once the queue has drained.
	pub fn drained(&self) -> impl Future<Output = Result<()>> + Send + 'static {
		let (tx, rx) = oneshot::channel();
		self.register_on_drained(move || {
			let _ = tx.send(());
		});
		async move { rx.await.map_err(|_| LoaderError::Abandoned) }
	}

	/// Completes the running unit and loads the next one.
	pub fn advance(&self, token: UnitToken) -> Result<()> {
		let next = {
			let mut state = self.inner.state.lock();
			match &state.phase {
				Phase::Loading { token: current, name, position, .. } if *current == token.seq => {
					debug!(target = "pageboot.loader", unit = %name, position, "unit advanced");
				}
				_ => return Err(LoaderError::StaleToken { token: token.seq }),
			}
			claim_next(&mut state)
		};
		self.run_next(next)
	}

	/// Current lifecycle phase.
	pub fn status(&self) -> LoaderStatus {
		match &self.inner.state.lock().phase {
			Phase::Idle => LoaderStatus::Idle,
			Phase::Loading { name, position, since, .. } => LoaderStatus::Loading {
				name: name.clone(),
				position: *position,
				since: *since,
			},
			Phase::Draining => LoaderStatus::Draining,
			Phase::Drained => LoaderStatus::Drained,
		}
	}

	/// Whether every drained callback has fired.
	pub fn is_drained(&self) -> bool {
		matches!(self.inner.state.lock().phase, Phase::Drained)
	}

	/// Units that have started, in start order.
	pub fn loaded(&self) -> Vec<String> {
		self.inner.state.lock().loaded.clone()
	}

	/// Units still waiting in the queue.
	pub fn remaining(&self) -> Vec<String> {
		self.inner.state.lock().queue.iter().cloned().collect()
	}

	/// Reports the running unit if it has been loading for at least `threshold`.
	pub fn stalled_for(&self, threshold: Duration) -> Option<StallReport> {
		let state = self.inner.state.lock();
		let Phase::Loading { name, position, since, .. } = &state.phase else {
			return None;
		};
		let elapsed = (Utc::now() - *since).to_std().unwrap_or_default();
		(elapsed >= threshold).then(|| StallReport {
			name: name.clone(),
			position: *position,
			elapsed,
		})
	}

	fn run_next(&self, next: Option<(String, u64, usize)>) -> Result<()> {
		let Some((name, seq, position)) = next else {
			self.fire_drained();
			return Ok(());
		};

		let Some(unit) = self.inner.resolver.resolve(&name) else {
			warn!(target = "pageboot.loader", unit = %name, position, "no unit registered; bootstrap stalled");
			return Err(LoaderError::UnresolvedUnit { name });
		};

		debug!(target = "pageboot.loader", unit = %name, position, token = seq, "loading unit");
		unit.run(UnitContext {
			loader: self.clone(),
			token: UnitToken { seq },
			name,
			position,
		});
		Ok(())
	}

	fn fire_drained(&self) {
		let mut fired = 0usize;
		loop {
			let batch = {
				let mut state = self.inner.state.lock();
				if state.callbacks.is_empty() {
					state.phase = Phase::Drained;
					break;
				}
				std::mem::take(&mut state.callbacks)
			};
			fired += batch.len();
			for callback in batch {
				callback();
			}
		}
		info!(
			target = "pageboot.loader",
			units = self.inner.state.lock().loaded.len(),
			callbacks = fired,
			"unit queue drained"
		);
	}
}

/// Moves the next queued unit into `Loading`, or the loader into `Draining`
/// when the queue is empty. Runs under the state lock.
fn claim_next(state: &mut LoaderState) -> Option<(String, u64, usize)> {
	let Some(name) = state.queue.pop_front() else {
		state.phase = Phase::Draining;
		return None;
	};
	let seq = state.next_token;
	state.next_token += 1;
	let position = state.loaded.len();
	state.loaded.push(name.clone());
	state.phase = Phase::Loading {
		token: seq,
		name: name.clone(),
		position,
		since: Utc::now(),
	};
	Some((name, seq, position))
}

impl fmt::Debug for ModuleLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("ModuleLoader")
			.field("loaded", &state.loaded)
			.field("remaining", &state.queue)
			.field("callbacks", &state.callbacks.len())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::unit::UnitRegistry;

	fn ready_loader(names: &[&str]) -> ModuleLoader {
		let registry = names.iter().fold(UnitRegistry::new(), |registry, name| registry.with_ready_unit(*name));
		ModuleLoader::new(registry)
	}

	#[test]
	fn start_requires_enqueue() {
		let loader = ready_loader(&["a"]);
		assert_eq!(loader.start(), Err(LoaderError::NotEnqueued));
	}

	#[test]
	fn enqueue_is_single_use() {
		let loader = ready_loader(&["a"]);
		loader.enqueue_all(["a"]).unwrap();
		assert_eq!(loader.enqueue_all(["a"]), Err(LoaderError::AlreadyEnqueued));
	}

	#[test]
	fn start_is_single_use() {
		let loader = ready_loader(&["a"]);
		loader.enqueue_all(["a"]).unwrap();
		loader.start().unwrap();
		assert_eq!(loader.start(), Err(LoaderError::AlreadyStarted));
	}

	#[test]
	fn empty_queue_drains_on_start() {
		let loader = ready_loader(&[]);
		loader.enqueue_all(Vec::<String>::new()).unwrap();
		assert_eq!(loader.status(), LoaderStatus::Idle);
		loader.start().unwrap();
		assert_eq!(loader.status(), LoaderStatus::Drained);
		assert!(loader.loaded().is_empty());
	}

	#[test]
	fn stale_token_is_rejected() {
		let parked = Arc::new(Mutex::new(None));
		let slot = Arc::clone(&parked);
		let registry = UnitRegistry::new().with_unit("a", move |cx| {
			*slot.lock() = Some(cx.into_parts());
		});
		let loader = ModuleLoader::new(registry);
		loader.enqueue_all(["a"]).unwrap();
		loader.start().unwrap();

		let forged = UnitToken { seq: 41 };
		assert_eq!(loader.advance(forged), Err(LoaderError::StaleToken { token: 41 }));

		let (handle, token) = parked.lock().take().unwrap();
		handle.advance(token).unwrap();
		assert!(loader.is_drained());
	}

	#[test]
	fn unresolved_first_unit_fails_start() {
		let loader = ready_loader(&[]);
		loader.enqueue_all(["ghost"]).unwrap();
		assert_eq!(loader.start(), Err(LoaderError::UnresolvedUnit { name: "ghost".into() }));
	}

	#[test]
	fn unresolved_unit_stalls_the_queue() {
		let loader = ready_loader(&["a", "c"]);
		loader.enqueue_all(["a", "ghost", "c"]).unwrap();
		// the error surfaces to unit "a", which ignores it
		loader.start().unwrap();
		assert!(matches!(loader.status(), LoaderStatus::Loading { ref name, position: 1, .. } if name == "ghost"));
		assert_eq!(loader.remaining(), vec!["c".to_string()]);
	}

	#[test]
	fn stalled_for_reports_running_unit() {
		let registry = UnitRegistry::new().with_unit("slow", |cx| drop(cx.into_parts()));
		let loader = ModuleLoader::new(registry);
		loader.enqueue_all(["slow"]).unwrap();
		assert_eq!(loader.stalled_for(Duration::ZERO), None);

		loader.start().unwrap();
		let report = loader.stalled_for(Duration::ZERO).unwrap();
		assert_eq!(report.name, "slow");
		assert_eq!(report.position, 0);
		assert!(loader.stalled_for(Duration::from_secs(3600)).is_none());
		assert!(report.to_string().contains("'slow'"));
	}
}
