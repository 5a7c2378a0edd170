use {
	crate::{Service, ServiceStatus, serde_impls},
	serde::{Deserialize, Serialize},
	serde_json::{Map, Value},
	time::OffsetDateTime,
};

/// The envelope Sidecar POSTs whenever one of its services changes state.
///
/// Like Sidecar's own decoder, missing fields are filled with zero values
/// rather than rejected.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StateChangedEvent
{
	/// The sender's view of the cluster at the time of the change.
	pub state: ServicesState,

	/// The change itself.
	pub change_event: ChangeEvent,
}

/// A Sidecar host's view of its cluster.
///
/// Only the cluster name is interpreted; the remaining fields (the full
/// server/service map, timestamps, ...) are carried along untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServicesState
{
	pub cluster_name: String,

	#[serde(flatten)]
	pub other: Map<String, Value>,
}

/// A single service's state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChangeEvent
{
	/// The service after the transition; its `status` is the new status.
	pub service: Service,

	pub previous_status: ServiceStatus,

	#[serde(with = "time::serde::rfc3339")]
	pub time: OffsetDateTime,
}

impl Default for ChangeEvent
{
	fn default() -> Self
	{
		Self {
			service: Service::default(),
			previous_status: ServiceStatus::default(),
			time: serde_impls::ZERO_TIME,
		}
	}
}

impl ChangeEvent
{
	/// The status the service transitioned into.
	pub const fn current_status(&self) -> ServiceStatus
	{
		self.service.status
	}
}
