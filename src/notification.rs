use {
	serde::Serialize,
	sidecar_catalog::{ChangeEvent, StateChangedEvent},
};

/// What listeners and `/state` consumers get to see of a [`StateChangedEvent`].
///
/// Field names match the ones Sidecar's own UI expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Notification
{
	pub event: ChangeEvent,
	pub cluster_name: String,
}

impl Notification
{
	/// Projects a raw event into the shape we expose.
	pub fn from_event(event: &StateChangedEvent) -> Self
	{
		Self {
			event: event.change_event.clone(),
			cluster_name: event.state.cluster_name.clone(),
		}
	}
}
