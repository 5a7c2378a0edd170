//! An in-memory relay for Sidecar service-state changes.
//!
//! Sidecar hosts `POST` a [`StateChangedEvent`] to `/update` whenever one of their services
//! changes state. Every event is recorded in a bounded [`History`], which `/state` exposes, and
//! then pushed to every client currently connected to `/listen`.
//!
//! ```text
//! POST /update -> RelayHandle -> [queue] -> Relay -> History
//!                                               \-> Subscribers -> /listen connections
//! ```
//!
//! Nothing is persisted; restarting the process starts over with an empty history.
//!
//! [`StateChangedEvent`]: sidecar_catalog::StateChangedEvent

#[macro_use(Debug, Display, Error, From)]
extern crate derive_more as _;

use {
	crate::{history::History, relay::Relay, subscribers::Subscribers, task_manager::TaskManager},
	std::{io, net::SocketAddr, sync::Arc},
	tokio::net::TcpListener,
};

mod http;
mod signal;

pub mod config;
pub mod history;
pub mod logging;
pub mod notification;
pub mod relay;
pub mod subscribers;
pub mod task_manager;

pub use self::config::Config;

/// Errors returned by [`run()`].
#[derive(Debug, Display, Error)]
pub enum RunError
{
	#[display("failed to spawn relay: {_0}")]
	SpawnRelay(io::Error),

	#[display("failed to bind to {addr}: {source}")]
	Bind
	{
		addr: SocketAddr, source: io::Error
	},

	#[display("failed to serve http: {_0}")]
	Serve(io::Error),
}

/// Runs the relay and the HTTP server until the process receives a shutdown signal.
#[tracing::instrument(skip_all, err)]
pub async fn run(config: Config) -> Result<(), RunError>
{
	let history = Arc::new(History::new(config.relay.history_capacity));
	let subscribers = Arc::new(Subscribers::new(config.relay.mailbox_capacity));
	let relay =
		Relay::new(Arc::clone(&history), Arc::clone(&subscribers), config.relay.queue_capacity);

	let task_manager = TaskManager::default();
	let state = http::AppState {
		relay: relay.handle(),
		history,
		subscribers: Arc::clone(&subscribers),
		task_manager: task_manager.clone(),
	};

	task_manager
		.spawn(tracing::info_span!("relay"), |cancellation_token| relay.run(cancellation_token))
		.map_err(RunError::SpawnRelay)?;

	let addr = config.http.socket_addr();
	let tcp_listener = TcpListener::bind(addr)
		.await
		.map_err(|source| RunError::Bind { addr, source })?;

	tracing::info!(addr = %tcp_listener.local_addr().unwrap_or(addr), "listening for http requests");

	let service = http::router(state, &config.http.static_dir)
		.into_make_service_with_connect_info::<SocketAddr>();

	axum::serve(tcp_listener, service)
		.with_graceful_shutdown(async {
			let signal = signal::shutdown().await;
			tracing::info!(%signal, "shutting down");
		})
		.await
		.map_err(RunError::Serve)?;

	if !task_manager.shutdown(config.http.shutdown_timeout).await {
		tracing::warn!(
			timeout = ?config.http.shutdown_timeout,
			"background tasks did not shut down in time",
		);
	}

	subscribers.close_all();

	Ok(())
}
