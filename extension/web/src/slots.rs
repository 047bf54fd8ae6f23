use std::collections::BTreeMap;

/// Values parked under numeric ids, so `Send` closures can refer to values
/// that are not.
#[derive(Debug)]
pub struct Slots<T> {
	next: u32,
	entries: BTreeMap<u32, T>,
}

impl<T> Default for Slots<T> {
	fn default() -> Self {
		Self { next: 0, entries: BTreeMap::new() }
	}
}

impl<T> Slots<T> {
	pub fn insert(&mut self, value: T) -> u32 {
		let id = self.next;
		self.next = self.next.wrapping_add(1);
		self.entries.insert(id, value);
		id
	}

	/// Removes and returns the value; each id yields at most once.
	pub fn take(&mut self, id: u32) -> Option<T> {
		self.entries.remove(&id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
