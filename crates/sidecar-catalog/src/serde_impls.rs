use {
	crate::ServiceStatus,
	serde::{
		de::{Deserialize, Deserializer},
		ser::{Serialize, Serializer},
	},
	time::{OffsetDateTime, macros::datetime},
};

/// Go's zero `time.Time`, which is what Sidecar sends for unset timestamps.
pub(crate) const ZERO_TIME: OffsetDateTime = datetime!(0001-01-01 00:00 UTC);

impl Serialize for ServiceStatus
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(self.code())
	}
}

impl<'de> Deserialize<'de> for ServiceStatus
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		i64::deserialize(deserializer).map(ServiceStatus::from_code)
	}
}

/// Sidecar is written in Go, which encodes empty slices and maps as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
