use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pageboot_runtime::{LoaderError, LoaderStatus, ModuleLoader, UnitContext, UnitRegistry};
use parking_lot::Mutex;

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
	Arc::new(Mutex::new(Vec::new()))
}

/// Registry where every unit records "start:<name>", then "end:<name>" just
/// before advancing.
fn recording_registry(names: &[&str], events: &Log) -> UnitRegistry {
	names.iter().fold(UnitRegistry::new(), |registry, name| {
		let events = Arc::clone(events);
		registry.with_unit(*name, move |cx: UnitContext| {
			events.lock().push(format!("start:{}", cx.name()));
			events.lock().push(format!("end:{}", cx.name()));
			cx.advance().ok();
		})
	})
}

#[test]
fn units_run_in_enqueued_order_without_overlap() {
	let orders: [&[&str]; 3] = [&["a", "b", "c"], &["c", "a", "b"], &["b", "c", "a", "d"]];
	for order in orders {
		let events = log();
		let loader = ModuleLoader::new(recording_registry(&["a", "b", "c", "d"], &events));
		loader.enqueue_all(order.iter().copied()).unwrap();
		loader.start().unwrap();

		let expected: Vec<String> = order
			.iter()
			.flat_map(|name| [format!("start:{name}"), format!("end:{name}")])
			.collect();
		assert_eq!(*events.lock(), expected);
		assert_eq!(loader.loaded(), order.iter().map(|n| n.to_string()).collect::<Vec<_>>());
		assert!(loader.is_drained());
	}
}

#[test]
fn drained_callbacks_fire_once_in_registration_order() {
	let events = log();
	let loader = ModuleLoader::new(recording_registry(&["a", "b"], &events));
	loader.enqueue_all(["a", "b"]).unwrap();

	for i in 0..3 {
		let events = Arc::clone(&events);
		loader.register_on_drained(move || events.lock().push(format!("cb{i}")));
	}
	assert!(events.lock().is_empty());

	loader.start().unwrap();
	assert_eq!(
		*events.lock(),
		vec!["start:a", "end:a", "start:b", "end:b", "cb0", "cb1", "cb2"]
	);
}

#[test]
fn unit_may_register_before_advancing() {
	let events = log();
	let registry = {
		let events = Arc::clone(&events);
		UnitRegistry::new().with_ready_unit("globals").with_unit("header", move |cx: UnitContext| {
			let events = Arc::clone(&events);
			cx.register_on_drained(move || events.lock().push("render header".into()));
			cx.advance().ok();
		})
	};
	let loader = ModuleLoader::new(registry);
	let early = Arc::clone(&events);
	loader.register_on_drained(move || early.lock().push("early".into()));

	loader.enqueue_all(["globals", "header"]).unwrap();
	loader.start().unwrap();

	assert_eq!(*events.lock(), vec!["early", "render header"]);
}

#[test]
fn registration_after_drain_fires_synchronously() {
	let events = log();
	let loader = ModuleLoader::new(UnitRegistry::new().with_ready_unit("a"));
	loader.enqueue_all(["a"]).unwrap();
	loader.start().unwrap();
	assert_eq!(loader.status(), LoaderStatus::Drained);

	let late = Arc::clone(&events);
	loader.register_on_drained(move || late.lock().push("late".into()));
	assert_eq!(*events.lock(), vec!["late"]);
}

#[test]
fn registration_during_fan_out_runs_after_earlier_callbacks() {
	let events = log();
	let loader = ModuleLoader::new(UnitRegistry::new().with_ready_unit("a"));
	loader.enqueue_all(["a"]).unwrap();

	{
		let events = Arc::clone(&events);
		let handle = loader.clone();
		loader.register_on_drained(move || {
			events.lock().push("first".into());
			let nested = Arc::clone(&events);
			handle.register_on_drained(move || nested.lock().push("nested".into()));
		});
	}
	{
		let events = Arc::clone(&events);
		loader.register_on_drained(move || events.lock().push("second".into()));
	}

	loader.start().unwrap();
	assert_eq!(*events.lock(), vec!["first", "second", "nested"]);
	assert!(loader.is_drained());
}

#[test]
fn silent_unit_stalls_everything_after_it() {
	let events = log();
	let registry = recording_registry(&["a", "c"], &events).with_unit("b", {
		let events = Arc::clone(&events);
		move |cx: UnitContext| {
			events.lock().push("start:b".into());
			// never advances
			drop(cx);
		}
	});
	let loader = ModuleLoader::new(registry);
	let drained = Arc::clone(&events);
	loader.register_on_drained(move || drained.lock().push("drained".into()));

	loader.enqueue_all(["a", "b", "c"]).unwrap();
	loader.start().unwrap();

	assert_eq!(*events.lock(), vec!["start:a", "end:a", "start:b"]);
	assert!(matches!(loader.status(), LoaderStatus::Loading { ref name, .. } if name == "b"));
	assert_eq!(loader.remaining(), vec!["c".to_string()]);
	assert!(loader.stalled_for(Duration::ZERO).is_some());
}

#[tokio::test]
async fn asynchronous_units_advance_from_spawned_tasks() {
	let events = log();
	let registry = ["api", "users"].iter().fold(UnitRegistry::new(), |registry, name| {
		let events = Arc::clone(&events);
		registry.with_unit(*name, move |cx: UnitContext| {
			let events = Arc::clone(&events);
			tokio::spawn(async move {
				tokio::time::sleep(Duration::from_millis(5)).await;
				events.lock().push(format!("ready:{}", cx.name()));
				cx.advance().ok();
			});
		})
	});
	let loader = ModuleLoader::new(registry);
	let drained = loader.drained();

	loader.enqueue_all(["api", "users"]).unwrap();
	loader.start().unwrap();
	assert!(!loader.is_drained());

	tokio::time::timeout(Duration::from_secs(5), drained)
		.await
		.expect("queue should drain")
		.unwrap();
	assert_eq!(*events.lock(), vec!["ready:api", "ready:users"]);
}

#[test]
fn concurrent_start_runs_the_queue_once() {
	for _ in 0..200 {
		let runs = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&runs);
		let registry = UnitRegistry::new().with_unit("only", move |cx: UnitContext| {
			counter.fetch_add(1, Ordering::SeqCst);
			cx.advance().ok();
		});
		let loader = ModuleLoader::new(registry);
		loader.enqueue_all(["only"]).unwrap();

		let barrier = Arc::new(Barrier::new(2));
		let handles: Vec<_> = (0..2)
			.map(|_| {
				let loader = loader.clone();
				let barrier = Arc::clone(&barrier);
				thread::spawn(move || {
					barrier.wait();
					loader.start()
				})
			})
			.collect();
		let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

		assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1, "{results:?}");
		assert!(results.contains(&Err(LoaderError::AlreadyStarted)));
		assert_eq!(runs.load(Ordering::SeqCst), 1);
	}
}
