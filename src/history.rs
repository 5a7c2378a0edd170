//! Retention of recently seen events.
//!
//! [`History`] keeps the last N [`StateChangedEvent`]s in a preallocated ring. It is written to
//! by the [relay] only, and read by any number of concurrent `/state` requests.
//!
//! [relay]: crate::relay

use {
	crate::notification::Notification,
	sidecar_catalog::StateChangedEvent,
	std::{
		fmt,
		num::NonZero,
		sync::{Arc, PoisonError, RwLock},
	},
	time::OffsetDateTime,
};

/// Fixed-capacity store of the most recent events.
pub struct History
{
	state: RwLock<HistoryState>,
}

#[derive(Debug)]
struct HistoryState
{
	ring: Ring<Arc<StateChangedEvent>>,

	/// Change time of the most recently inserted event.
	last_changed: Option<OffsetDateTime>,
}

impl History
{
	pub fn new(capacity: NonZero<usize>) -> Self
	{
		Self { state: RwLock::new(HistoryState { ring: Ring::new(capacity), last_changed: None }) }
	}

	/// Appends `event` as the newest entry, evicting the oldest one if the history is full.
	#[tracing::instrument(level = "trace", skip_all, fields(service = %event.change_event.service.name))]
	pub fn insert(&self, event: Arc<StateChangedEvent>)
	{
		let changed_at = event.change_event.time;
		let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

		if let Some(evicted) = state.ring.push(event) {
			tracing::trace!(service = %evicted.change_event.service.name, "evicted oldest event");
		}

		state.last_changed = Some(changed_at);
	}

	/// Returns every retained event, oldest first, projected into [`Notification`]s.
	///
	/// The returned list is independent of any later inserts.
	pub fn snapshot(&self) -> Vec<Notification>
	{
		let events = {
			let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
			state.ring.iter().map(Arc::clone).collect::<Vec<_>>()
		};

		events.iter().map(|event| Notification::from_event(event)).collect()
	}

	/// Returns the change time of the most recently inserted event.
	pub fn last_changed(&self) -> Option<OffsetDateTime>
	{
		self.state.read().unwrap_or_else(PoisonError::into_inner).last_changed
	}

	/// Returns the number of retained events.
	pub fn len(&self) -> usize
	{
		self.state.read().unwrap_or_else(PoisonError::into_inner).ring.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.len() == 0
	}

	pub fn capacity(&self) -> NonZero<usize>
	{
		self.state.read().unwrap_or_else(PoisonError::into_inner).ring.capacity()
	}
}

impl fmt::Debug for History
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.debug_struct("History")
			.field("len", &self.len())
			.field("capacity", &self.capacity())
			.finish_non_exhaustive()
	}
}

/// A circular buffer over preallocated slots.
///
/// `head` is the index of the oldest occupied slot; the occupied slots are
/// `head, head + 1, ..., head + len - 1` (modulo capacity).
#[derive(Debug)]
struct Ring<T>
{
	slots: Box<[Option<T>]>,
	capacity: NonZero<usize>,
	head: usize,
	len: usize,
}

impl<T> Ring<T>
{
	fn new(capacity: NonZero<usize>) -> Self
	{
		let slots = (0..capacity.get()).map(|_| None).collect();

		Self { slots, capacity, head: 0, len: 0 }
	}

	fn capacity(&self) -> NonZero<usize>
	{
		self.capacity
	}

	fn len(&self) -> usize
	{
		self.len
	}

	/// Appends `value`, returning the evicted oldest value if the ring was full.
	fn push(&mut self, value: T) -> Option<T>
	{
		let capacity = self.capacity.get();

		if self.len < capacity {
			let idx = (self.head + self.len) % capacity;
			self.slots[idx] = Some(value);
			self.len += 1;
			None
		} else {
			let evicted = self.slots[self.head].replace(value);
			self.head = (self.head + 1) % capacity;
			evicted
		}
	}

	/// Iterates over the occupied slots, oldest first.
	fn iter(&self) -> impl Iterator<Item = &T> + '_
	{
		let capacity = self.capacity.get();

		(0..self.len).filter_map(move |offset| self.slots[(self.head + offset) % capacity].as_ref())
	}
}

#[cfg(test)]
mod tests
{
	use {super::*, crate::notification::tests::event};

	fn capacity(value: usize) -> NonZero<usize>
	{
		NonZero::new(value).unwrap()
	}

	fn names(history: &History) -> Vec<String>
	{
		history
			.snapshot()
			.into_iter()
			.map(|notification| notification.event.service.name)
			.collect()
	}

	#[test]
	fn ring_grows_until_full()
	{
		let mut ring = Ring::new(capacity(3));

		assert_eq!(ring.push(1), None);
		assert_eq!(ring.push(2), None);
		assert_eq!(ring.iter().copied().collect::<Vec<_>>(), [1, 2]);
		assert_eq!(ring.len(), 2);
	}

	#[test]
	fn ring_overwrites_oldest_when_full()
	{
		let mut ring = Ring::new(capacity(3));

		for value in 1..=3 {
			assert_eq!(ring.push(value), None);
		}

		assert_eq!(ring.push(4), Some(1));
		assert_eq!(ring.push(5), Some(2));
		assert_eq!(ring.iter().copied().collect::<Vec<_>>(), [3, 4, 5]);
		assert_eq!(ring.len(), 3);
	}

	#[test]
	fn ring_of_one_keeps_latest()
	{
		let mut ring = Ring::new(capacity(1));

		ring.push('a');
		ring.push('b');

		assert_eq!(ring.iter().copied().collect::<Vec<_>>(), ['b']);
	}

	#[test]
	fn snapshot_of_empty_history_is_empty()
	{
		let history = History::new(capacity(20));

		assert!(history.snapshot().is_empty());
		assert!(history.is_empty());
		assert_eq!(history.last_changed(), None);
	}

	#[test]
	fn snapshot_returns_all_events_in_insertion_order()
	{
		let history = History::new(capacity(5));

		for name in ["a", "b", "c"] {
			history.insert(Arc::new(event("default", name)));
		}

		assert_eq!(names(&history), ["a", "b", "c"]);
	}

	#[test]
	fn snapshot_keeps_only_the_most_recent_events()
	{
		let history = History::new(capacity(2));

		for name in ["e1", "e2", "e3"] {
			history.insert(Arc::new(event("default", name)));
		}

		assert_eq!(names(&history), ["e2", "e3"]);
		assert_eq!(history.len(), 2);
	}

	#[test]
	fn overflowing_many_times_keeps_a_sliding_window()
	{
		let history = History::new(capacity(4));
		let inserted = (0..11).map(|idx| format!("svc-{idx}")).collect::<Vec<_>>();

		for name in &inserted {
			history.insert(Arc::new(event("default", name)));
		}

		assert_eq!(names(&history), &inserted[7..]);
	}

	#[test]
	fn snapshot_is_idempotent()
	{
		let history = History::new(capacity(3));

		for name in ["a", "b", "c", "d"] {
			history.insert(Arc::new(event("default", name)));
		}

		assert_eq!(history.snapshot(), history.snapshot());
	}

	#[test]
	fn snapshot_is_unaffected_by_later_inserts()
	{
		let history = History::new(capacity(2));
		history.insert(Arc::new(event("default", "a")));

		let before = history.snapshot();
		history.insert(Arc::new(event("default", "b")));
		history.insert(Arc::new(event("default", "c")));

		assert_eq!(before.len(), 1);
		assert_eq!(before[0].event.service.name, "a");
	}

	#[test]
	fn tracks_last_changed()
	{
		let history = History::new(capacity(2));
		let mut event = event("default", "a");
		event.change_event.time = time::macros::datetime!(2024-01-02 03:04:05 UTC);

		history.insert(Arc::new(event));

		assert_eq!(history.last_changed(), Some(time::macros::datetime!(2024-01-02 03:04:05 UTC)));
	}

	#[test]
	fn concurrent_snapshots_never_observe_torn_state()
	{
		let history = Arc::new(History::new(capacity(8)));

		std::thread::scope(|scope| {
			scope.spawn(|| {
				for idx in 0..500 {
					history.insert(Arc::new(event("default", &idx.to_string())));
				}
			});

			for _ in 0..4 {
				scope.spawn(|| {
					for _ in 0..200 {
						let seen = history
							.snapshot()
							.into_iter()
							.map(|notification| notification.event.service.name.parse::<u32>().unwrap())
							.collect::<Vec<_>>();

						assert!(seen.len() <= 8);
						assert!(seen.windows(2).all(|pair| pair[1] == pair[0] + 1), "{seen:?}");
					}
				});
			}
		});

		assert_eq!(history.len(), 8);
	}
}
