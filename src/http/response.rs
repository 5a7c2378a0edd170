//! Response bodies and handler errors.
//!
//! Field names are PascalCase, the way Sidecar's own endpoints spell them.

use {
	crate::relay::RelayUnavailable,
	axum::{
		Json,
		http::StatusCode,
		response::{IntoResponse, Response},
	},
	serde::Serialize,
	std::error::Error,
	time::OffsetDateTime,
};

pub(crate) type HandlerResult<T> = Result<T, HandlerError>;

/// `{"Message": "..."}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ApiMessage
{
	pub(crate) message: &'static str,
}

/// `{"Errors": ["..."]}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ApiErrors
{
	pub(crate) errors: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct HealthStatus
{
	pub(crate) message: &'static str,

	/// Change time of the most recently ingested event.
	#[serde(with = "time::serde::rfc3339::option")]
	pub(crate) last_changed: Option<OffsetDateTime>,
}

#[derive(Debug, Display, Error, From)]
pub(crate) enum HandlerError
{
	#[display("failed to decode event: {_0}")]
	Decode(serde_json::Error),

	#[display("{_0}")]
	ShuttingDown(RelayUnavailable),
}

impl HandlerError
{
	fn status(&self) -> StatusCode
	{
		match self {
			Self::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::ShuttingDown(_) => StatusCode::SERVICE_UNAVAILABLE,
		}
	}
}

impl IntoResponse for HandlerError
{
	fn into_response(self) -> Response
	{
		match self {
			Self::Decode(ref error) => {
				tracing::debug!(error = error as &dyn Error, "rejecting malformed event");
			},
			Self::ShuttingDown(_) => {
				tracing::warn!("rejecting event; relay has shut down");
			},
		}

		let body = ApiErrors { errors: vec![self.to_string()] };

		(self.status(), Json(body)).into_response()
	}
}
