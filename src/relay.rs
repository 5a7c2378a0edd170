//! The single writer sitting between producers and everything else.
//!
//! Producers hand events to a [`RelayHandle`], which enqueues them on a bounded queue. The
//! [`Relay`] itself runs as one task, taking events off that queue one at a time, recording each
//! in the [`History`] and only then fanning it out to the [`Subscribers`].

use {
	crate::{history::History, notification::Notification, subscribers::Subscribers},
	sidecar_catalog::StateChangedEvent,
	std::{fmt, num::NonZero, sync::Arc},
	tokio::sync::mpsc,
	tokio_util::sync::CancellationToken,
};

pub struct Relay
{
	history: Arc<History>,
	subscribers: Arc<Subscribers>,
	events_tx: mpsc::Sender<StateChangedEvent>,
	events_rx: mpsc::Receiver<StateChangedEvent>,
}

/// Cheap handle for submitting events to a running [`Relay`].
#[derive(Debug, Clone)]
pub struct RelayHandle
{
	relay_tx: mpsc::WeakSender<StateChangedEvent>,
}

#[derive(Debug, Display, Error)]
#[display("relay is currently unavailable")]
pub struct RelayUnavailable;

impl Relay
{
	pub fn new(
		history: Arc<History>,
		subscribers: Arc<Subscribers>,
		queue_capacity: NonZero<usize>,
	) -> Self
	{
		let (events_tx, events_rx) = mpsc::channel(queue_capacity.get());

		Self { history, subscribers, events_tx, events_rx }
	}

	pub fn handle(&self) -> RelayHandle
	{
		RelayHandle { relay_tx: self.events_tx.downgrade() }
	}

	/// Processes queued events until `cancellation_token` is cancelled.
	///
	/// Events still sitting in the queue at that point are discarded.
	#[tracing::instrument(skip_all)]
	pub async fn run(mut self, cancellation_token: CancellationToken)
	{
		tracing::info!("relay started");

		loop {
			tokio::select! {
				biased;

				() = cancellation_token.cancelled() => {
					tracing::info!(discarded = self.events_rx.len(), "relay shutting down");
					break;
				},

				Some(event) = self.events_rx.recv() => {
					self.ingest(event);
				},
			};
		}
	}

	#[tracing::instrument(
		level = "debug",
		skip_all,
		fields(
			cluster = %event.state.cluster_name,
			service = %event.change_event.service.name,
			status = %event.change_event.current_status(),
		),
	)]
	fn ingest(&self, event: StateChangedEvent)
	{
		let event = Arc::new(event);
		self.history.insert(Arc::clone(&event));

		let notification = Arc::new(Notification::from_event(&event));
		let delivered = self.subscribers.publish(&notification);

		tracing::debug!(delivered, "relayed event");
	}
}

impl fmt::Debug for Relay
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.debug_struct("Relay")
			.field("history", &self.history)
			.field("subscribers", &self.subscribers)
			.field("queued", &self.events_rx.len())
			.field("handles", &self.events_tx.weak_count())
			.finish()
	}
}

impl RelayHandle
{
	/// Enqueues `event` for processing.
	///
	/// Waits for room if the queue is currently full.
	#[tracing::instrument(
		level = "debug",
		skip_all,
		fields(service = %event.change_event.service.name),
		err(level = "debug"),
	)]
	pub async fn submit(&self, event: StateChangedEvent) -> Result<(), RelayUnavailable>
	{
		let tx = self.relay_tx.upgrade().ok_or(RelayUnavailable)?;

		tx.send(event).await.map_err(|_| RelayUnavailable)
	}
}
