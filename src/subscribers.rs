//! Live listeners and fan-out.
//!
//! Every listener gets its own bounded mailbox. [`Subscribers::publish()`] never waits for a
//! mailbox to have room: if a listener is too slow to keep up, it simply misses notifications
//! until it has caught up again. Other listeners are unaffected.

use {
	crate::notification::Notification,
	std::{
		collections::HashMap,
		fmt,
		mem,
		num::NonZero,
		sync::{
			Arc,
			PoisonError,
			RwLock,
			Weak,
			atomic::{self, AtomicU64},
		},
	},
	tokio::sync::mpsc::{self, error::TrySendError},
};

/// Identifies a single [`Subscription`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("{_0}")]
pub struct SubscriberId(u64);

/// The set of currently connected listeners.
pub struct Subscribers
{
	mailbox_capacity: NonZero<usize>,
	next_id: AtomicU64,
	live: RwLock<HashMap<SubscriberId, mpsc::Sender<Arc<Notification>>>>,
}

/// A registered listener's end of its mailbox.
///
/// Dropping the subscription unregisters it.
#[derive(Debug)]
pub struct Subscription
{
	id: SubscriberId,
	rx: mpsc::Receiver<Arc<Notification>>,
	registry: Weak<Subscribers>,
}

impl Subscribers
{
	pub fn new(mailbox_capacity: NonZero<usize>) -> Self
	{
		Self { mailbox_capacity, next_id: AtomicU64::new(0), live: RwLock::default() }
	}

	/// Creates a new mailbox and adds it to the live set.
	///
	/// The subscription only receives notifications published after this call returns.
	#[tracing::instrument(level = "debug", skip(self), fields(subscriber.id = tracing::field::Empty))]
	pub fn register(self: &Arc<Self>) -> Subscription
	{
		let id = SubscriberId(self.next_id.fetch_add(1, atomic::Ordering::Relaxed));
		let (tx, rx) = mpsc::channel(self.mailbox_capacity.get());

		tracing::Span::current().record("subscriber.id", tracing::field::display(id));

		let live_count = {
			let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);
			live.insert(id, tx);
			live.len()
		};

		tracing::debug!(live_count, "registered subscriber");

		Subscription { id, rx, registry: Arc::downgrade(self) }
	}

	/// Removes a mailbox from the live set.
	///
	/// Returns whether the subscriber was still registered.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn unregister(&self, id: SubscriberId) -> bool
	{
		let removed = self.live.write().unwrap_or_else(PoisonError::into_inner).remove(&id);

		if removed.is_some() {
			tracing::debug!("unregistered subscriber");
		}

		removed.is_some()
	}

	/// Delivers `notification` to every registered mailbox that has room for it.
	///
	/// Returns the number of subscribers the notification was delivered to.
	#[tracing::instrument(level = "trace", skip_all)]
	pub fn publish(&self, notification: &Arc<Notification>) -> usize
	{
		let mut delivered = 0_usize;
		let mut closed = Vec::new();

		{
			let live = self.live.read().unwrap_or_else(PoisonError::into_inner);

			for (&id, tx) in live.iter() {
				match tx.try_send(Arc::clone(notification)) {
					Ok(()) => delivered += 1,
					Err(TrySendError::Full(_)) => {
						tracing::trace!(subscriber.id = %id, "mailbox full; dropping notification");
					},
					Err(TrySendError::Closed(_)) => closed.push(id),
				}
			}
		}

		if !closed.is_empty() {
			let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);

			for id in closed {
				tracing::debug!(subscriber.id = %id, "pruning subscriber with closed mailbox");
				live.remove(&id);
			}
		}

		delivered
	}

	/// Closes every mailbox.
	///
	/// Readers will drain what is left in their mailbox and then observe the closure.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn close_all(&self)
	{
		let senders = mem::take(&mut *self.live.write().unwrap_or_else(PoisonError::into_inner));

		tracing::debug!(count = senders.len(), "closing all mailboxes");
	}

	/// Returns the number of live subscribers.
	pub fn len(&self) -> usize
	{
		self.live.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.len() == 0
	}
}

impl fmt::Debug for Subscribers
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.debug_struct("Subscribers")
			.field("mailbox_capacity", &self.mailbox_capacity)
			.field("live", &self.len())
			.finish_non_exhaustive()
	}
}

impl Subscription
{
	pub fn id(&self) -> SubscriberId
	{
		self.id
	}

	/// Waits for the next notification.
	///
	/// Returns [`None`] once the mailbox has been closed and drained.
	pub async fn recv(&mut self) -> Option<Arc<Notification>>
	{
		self.rx.recv().await
	}

	/// Takes the next notification without waiting, if there is one.
	pub fn try_recv(&mut self) -> Option<Arc<Notification>>
	{
		self.rx.try_recv().ok()
	}
}

impl Drop for Subscription
{
	fn drop(&mut self)
	{
		if let Some(registry) = self.registry.upgrade() {
			registry.unregister(self.id);
		}
	}
}
