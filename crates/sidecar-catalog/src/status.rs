use std::fmt;

/// The health of a single service, as tracked by Sidecar.
///
/// On the wire this is a plain integer. Codes this crate does not know about
/// are kept as [`ServiceStatus::Other`] and encoded back unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus
{
	#[default]
	Alive,
	Tombstone,
	Unhealthy,
	Unknown,
	Draining,
	Other(i64),
}

impl ServiceStatus
{
	/// Converts a raw status code.
	pub const fn from_code(code: i64) -> Self
	{
		match code {
			0 => Self::Alive,
			1 => Self::Tombstone,
			2 => Self::Unhealthy,
			3 => Self::Unknown,
			4 => Self::Draining,
			code => Self::Other(code),
		}
	}

	/// Returns the raw status code.
	pub const fn code(self) -> i64
	{
		match self {
			Self::Alive => 0,
			Self::Tombstone => 1,
			Self::Unhealthy => 2,
			Self::Unknown => 3,
			Self::Draining => 4,
			Self::Other(code) => code,
		}
	}

	/// Returns a human-readable name, matching the one Sidecar uses in its own UI.
	///
	/// Returns [`None`] for codes Sidecar does not define.
	pub const fn name(self) -> Option<&'static str>
	{
		match self {
			Self::Alive => Some("Alive"),
			Self::Tombstone => Some("Tombstone"),
			Self::Unhealthy => Some("Unhealthy"),
			Self::Unknown => Some("Unknown"),
			Self::Draining => Some("Draining"),
			Self::Other(_) => None,
		}
	}
}

impl From<i64> for ServiceStatus
{
	fn from(code: i64) -> Self
	{
		Self::from_code(code)
	}
}

impl From<ServiceStatus> for i64
{
	fn from(status: ServiceStatus) -> Self
	{
		status.code()
	}
}

impl fmt::Display for ServiceStatus
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self.name() {
			Some(name) => fmt.write_str(name),
			None => write!(fmt, "Status({})", self.code()),
		}
	}
}
