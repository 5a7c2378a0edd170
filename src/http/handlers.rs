use {
	super::{
		listen,
		response::{ApiMessage, HandlerResult, HealthStatus},
	},
	crate::{
		history::History,
		notification::Notification,
		relay::RelayHandle,
		subscribers::Subscribers,
		task_manager::TaskManager,
	},
	axum::{
		Json,
		body::Bytes,
		extract::{State, WebSocketUpgrade},
		response::Response,
	},
	futures_util::{SinkExt, TryStreamExt},
	sidecar_catalog::StateChangedEvent,
	std::{error::Error, io, pin::pin, sync::Arc},
};

/// `POST /update`
///
/// Waits for room in the relay's queue if it is currently full.
#[tracing::instrument(level = "debug", skip_all, err(Debug, level = "debug"))]
pub(crate) async fn update(
	State(relay): State<RelayHandle>,
	body: Bytes,
) -> HandlerResult<Json<ApiMessage>>
{
	let event = serde_json::from_slice::<StateChangedEvent>(&body)?;

	tracing::debug!(
		cluster = %event.state.cluster_name,
		service = %event.change_event.service.name,
		status = %event.change_event.current_status(),
		"received event",
	);

	relay.submit(event).await?;

	Ok(Json(ApiMessage { message: "OK" }))
}

/// `GET /health`
#[tracing::instrument(level = "trace", skip_all)]
pub(crate) async fn health(State(history): State<Arc<History>>) -> Json<HealthStatus>
{
	Json(HealthStatus { message: "Healthy!", last_changed: history.last_changed() })
}

/// `GET /state`
#[tracing::instrument(level = "trace", skip_all)]
pub(crate) async fn state(State(history): State<Arc<History>>) -> Json<Vec<Notification>>
{
	Json(history.snapshot())
}

/// `GET /listen`
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) async fn listen(
	State(subscribers): State<Arc<Subscribers>>,
	State(task_manager): State<TaskManager>,
	upgrade: WebSocketUpgrade,
) -> Response
{
	upgrade.on_upgrade(async move |socket| {
		let subscription = subscribers.register();
		let span = tracing::info_span!("listener", subscriber.id = %subscription.id());

		let spawn_result = task_manager.spawn(span, |cancellation_token| async move {
			let mut socket = pin!(socket.sink_map_err(io::Error::other).map_err(io::Error::other));

			if let Err(err) =
				listen::serve_listener(socket.as_mut(), subscription, cancellation_token).await
			{
				tracing::warn!(error = &err as &dyn Error, "listener connection failed");
			}

			tracing::debug!("listener disconnected");
		});

		if let Err(err) = spawn_result {
			tracing::warn!(error = &err as &dyn Error, "failed to spawn listener task");
		}
	})
}
