//! Serving `/listen` connections.
//!
//! Each connection owns one [`Subscription`] and forwards everything arriving in its mailbox as a
//! JSON text frame. The client is not expected to send anything; whatever it does send is ignored,
//! except for close frames.

use {
	crate::subscribers::Subscription,
	axum::extract::ws::{self, Utf8Bytes, close_code},
	futures_util::{Sink, SinkExt, Stream, StreamExt},
	std::{error::Error, io},
	tokio_util::sync::CancellationToken,
};

/// Reasons for us to close a listener connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseReason
{
	/// The server is shutting down.
	ShuttingDown,

	/// The listener's mailbox was closed.
	Unregistered,
}

#[derive(Debug, Display, Error)]
pub(crate) enum ListenerError
{
	#[display("failed to receive message: {_0}")]
	Recv(io::Error),

	#[display("failed to send message: {_0}")]
	Send(io::Error),
}

impl CloseReason
{
	pub(crate) fn as_close_frame(self) -> ws::CloseFrame
	{
		// https://developer.mozilla.org/en-US/docs/Web/API/CloseEvent/code#value
		let (code, reason) = match self {
			Self::ShuttingDown => (close_code::RESTART, "server is shutting down"),
			Self::Unregistered => (close_code::AWAY, "listener was unregistered"),
		};

		ws::CloseFrame { code, reason: Utf8Bytes::from_static(reason) }
	}
}

/// Forwards notifications from `subscription` to `socket` until either side goes away or
/// `cancellation_token` is cancelled.
///
/// The subscription is dropped (and therefore unregistered) when this function returns.
pub(crate) async fn serve_listener<S>(
	mut socket: S,
	mut subscription: Subscription,
	cancellation_token: CancellationToken,
) -> Result<(), ListenerError>
where
	S: Stream<Item = io::Result<ws::Message>>,
	S: Sink<ws::Message, Error = io::Error>,
	S: Unpin,
{
	tracing::debug!(subscriber.id = %subscription.id(), "listener connected");

	loop {
		tokio::select! {
			biased;

			() = cancellation_token.cancelled() => {
				return close(&mut socket, CloseReason::ShuttingDown).await;
			},

			notification = subscription.recv() => {
				let Some(notification) = notification else {
					return close(&mut socket, CloseReason::Unregistered).await;
				};

				let payload = match serde_json::to_string(&*notification) {
					Ok(payload) => payload,
					Err(err) => {
						tracing::error!(error = &err as &dyn Error, "failed to encode notification");
						continue;
					},
				};

				socket.send(ws::Message::Text(payload.into())).await.map_err(ListenerError::Send)?;
			},

			message = socket.next() => match message {
				None => {
					tracing::debug!("listener went away");
					return Ok(());
				},
				Some(Ok(ws::Message::Close(frame))) => {
					tracing::debug!(?frame, "listener closed the connection");
					return Ok(());
				},
				Some(Ok(message)) => {
					tracing::trace!(?message, "ignoring message from listener");
				},
				Some(Err(err)) => return Err(ListenerError::Recv(err)),
			},
		}
	}
}

async fn close<S>(socket: &mut S, reason: CloseReason) -> Result<(), ListenerError>
where
	S: Sink<ws::Message, Error = io::Error> + Unpin,
{
	tracing::debug!(?reason, "closing listener connection");

	socket
		.send(ws::Message::Close(Some(reason.as_close_frame())))
		.await
		.map_err(ListenerError::Send)
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::{notification::Notification, notification::tests::event, subscribers::Subscribers},
		std::{
			num::NonZero,
			pin::Pin,
			sync::Arc,
			task::{Context, Poll},
		},
		tokio::sync::mpsc,
	};

	/// In-memory stand-in for a WebSocket.
	struct MockSocket
	{
		incoming: mpsc::UnboundedReceiver<io::Result<ws::Message>>,
		outgoing: mpsc::UnboundedSender<ws::Message>,
	}

	struct Client
	{
		tx: mpsc::UnboundedSender<io::Result<ws::Message>>,
		rx: mpsc::UnboundedReceiver<ws::Message>,
	}

	fn connect() -> (MockSocket, Client)
	{
		let (client_tx, incoming) = mpsc::unbounded_channel();
		let (outgoing, client_rx) = mpsc::unbounded_channel();

		(MockSocket { incoming, outgoing }, Client { tx: client_tx, rx: client_rx })
	}

	impl Stream for MockSocket
	{
		type Item = io::Result<ws::Message>;

		fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>>
		{
			self.incoming.poll_recv(cx)
		}
	}

	impl Sink<ws::Message> for MockSocket
	{
		type Error = io::Error;

		fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>>
		{
			Poll::Ready(Ok(()))
		}

		fn start_send(self: Pin<&mut Self>, item: ws::Message) -> io::Result<()>
		{
			self.outgoing
				.send(item)
				.map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))
		}

		fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>>
		{
			Poll::Ready(Ok(()))
		}

		fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>>
		{
			Poll::Ready(Ok(()))
		}
	}

	fn subscribers() -> Arc<Subscribers>
	{
		Arc::new(Subscribers::new(NonZero::<usize>::MIN.saturating_add(15)))
	}

	fn notification(name: &str) -> Arc<Notification>
	{
		Arc::new(Notification::from_event(&event("default", name)))
	}

	fn close_code_of(message: &ws::Message) -> Option<u16>
	{
		match message {
			ws::Message::Close(Some(frame)) => Some(frame.code),
			_ => None,
		}
	}

	#[tokio::test]
	async fn forwards_notifications_as_json_text_frames()
	{
		let subscribers = subscribers();
		let (socket, mut client) = connect();
		let cancellation_token = CancellationToken::new();
		let task = tokio::spawn(serve_listener(
			socket,
			subscribers.register(),
			cancellation_token.child_token(),
		));

		for name in ["a", "b"] {
			subscribers.publish(&notification(name));
		}

		for name in ["a", "b"] {
			let ws::Message::Text(text) = client.rx.recv().await.unwrap() else {
				panic!("expected a text frame");
			};

			let json = serde_json::from_str::<serde_json::Value>(text.as_str()).unwrap();
			assert_eq!(json["ClusterName"], "default");
			assert_eq!(json["Event"]["Service"]["Name"], name);
		}

		cancellation_token.cancel();
		task.await.unwrap().unwrap();
	}

	#[tokio::test]
	async fn sends_restart_close_frame_on_shutdown()
	{
		let subscribers = subscribers();
		let (socket, mut client) = connect();
		let cancellation_token = CancellationToken::new();
		let task = tokio::spawn(serve_listener(
			socket,
			subscribers.register(),
			cancellation_token.child_token(),
		));

		cancellation_token.cancel();
		task.await.unwrap().unwrap();

		assert_eq!(close_code_of(&client.rx.recv().await.unwrap()), Some(1012));
		assert!(subscribers.is_empty());
	}

	#[tokio::test]
	async fn sends_away_close_frame_when_mailbox_is_closed()
	{
		let subscribers = subscribers();
		let (socket, mut client) = connect();
		let task = tokio::spawn(serve_listener(
			socket,
			subscribers.register(),
			CancellationToken::new(),
		));

		subscribers.close_all();
		task.await.unwrap().unwrap();

		assert_eq!(close_code_of(&client.rx.recv().await.unwrap()), Some(close_code::AWAY));
	}

	#[tokio::test]
	async fn client_closing_unregisters_the_listener()
	{
		let subscribers = subscribers();
		let (socket, client) = connect();
		let subscription = subscribers.register();
		let task = tokio::spawn(serve_listener(socket, subscription, CancellationToken::new()));

		client.tx.send(Ok(ws::Message::Close(None))).unwrap();
		task.await.unwrap().unwrap();

		assert!(subscribers.is_empty());
	}

	#[tokio::test]
	async fn failed_write_ends_the_connection()
	{
		let subscribers = subscribers();
		let (socket, Client { tx: _tx, rx }) = connect();
		let task = tokio::spawn(serve_listener(
			socket,
			subscribers.register(),
			CancellationToken::new(),
		));

		drop(rx);
		subscribers.publish(&notification("unsendable"));

		assert!(matches!(task.await.unwrap(), Err(ListenerError::Send(_))));
		assert!(subscribers.is_empty());
	}

	#[tokio::test]
	async fn receive_errors_end_the_connection()
	{
		let subscribers = subscribers();
		let (socket, client) = connect();
		let task = tokio::spawn(serve_listener(
			socket,
			subscribers.register(),
			CancellationToken::new(),
		));

		client.tx.send(Err(io::Error::from(io::ErrorKind::ConnectionReset))).unwrap();

		assert!(matches!(task.await.unwrap(), Err(ListenerError::Recv(_))));
	}
}
