use {
	crate::{ServiceStatus, serde_impls},
	serde::{Deserialize, Serialize},
	time::OffsetDateTime,
};

/// A single service (container) running on a Sidecar host.
///
/// Missing fields decode as Go's zero values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Service
{
	#[serde(rename = "ID")]
	pub id: String,

	pub name: String,
	pub image: String,

	#[serde(with = "time::serde::rfc3339")]
	pub created: OffsetDateTime,

	pub hostname: String,

	#[serde(deserialize_with = "serde_impls::null_as_default")]
	pub ports: Vec<Port>,

	#[serde(with = "time::serde::rfc3339")]
	pub updated: OffsetDateTime,

	pub proxy_mode: String,

	/// The service's current status.
	pub status: ServiceStatus,
}

impl Default for Service
{
	fn default() -> Self
	{
		Self {
			id: String::new(),
			name: String::new(),
			image: String::new(),
			created: serde_impls::ZERO_TIME,
			hostname: String::new(),
			ports: Vec::new(),
			updated: serde_impls::ZERO_TIME,
			proxy_mode: String::new(),
			status: ServiceStatus::default(),
		}
	}
}

/// A port mapping exposed by a [`Service`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Port
{
	/// `tcp` or `udp`
	#[serde(rename = "Type")]
	pub kind: String,

	/// The port on the host.
	pub port: i64,

	/// The port the service is reachable on through the proxy.
	pub service_port: i64,

	#[serde(rename = "IP")]
	pub ip: String,
}
