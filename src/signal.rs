use {
	std::{error::Error, future},
	tokio::signal::ctrl_c,
};

/// The OS signal that asked us to stop.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownSignal
{
	#[display("SIGINT")]
	Interrupt,

	#[display("SIGTERM")]
	Terminate,
}

/// Waits for SIGINT or (on unix) SIGTERM.
///
/// If one of the handlers cannot be installed, the other one is still honored.
pub(crate) async fn shutdown() -> ShutdownSignal
{
	tokio::select! {
		() = interrupt() => ShutdownSignal::Interrupt,
		() = terminate() => ShutdownSignal::Terminate,
	}
}

async fn interrupt()
{
	if let Err(err) = ctrl_c().await {
		tracing::error!(error = &err as &dyn Error, "cannot listen for SIGINT");
		future::pending::<()>().await;
	}
}

#[cfg(unix)]
async fn terminate()
{
	use tokio::signal::unix::{SignalKind, signal};

	let mut sigterm = match signal(SignalKind::terminate()) {
		Ok(sigterm) => sigterm,
		Err(err) => {
			tracing::error!(error = &err as &dyn Error, "cannot listen for SIGTERM");
			return future::pending().await;
		},
	};

	if sigterm.recv().await.is_none() {
		tracing::warn!("SIGTERM stream closed");
		future::pending::<()>().await;
	}
}

#[cfg(not(unix))]
async fn terminate()
{
	future::pending().await
}
