use {serde::Deserialize, std::num::NonZero};

pub const DEFAULT_HISTORY_CAPACITY: NonZero<usize> = nonzero(20);
pub const DEFAULT_QUEUE_CAPACITY: NonZero<usize> = nonzero(25);
pub const DEFAULT_MAILBOX_CAPACITY: NonZero<usize> = nonzero(100);

/// Sizes of the relay's buffers.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RelayConfig
{
	/// How many of the most recent events `/state` can return.
	pub history_capacity: NonZero<usize>,

	/// How many submitted events may wait for processing before `/update` starts blocking.
	pub queue_capacity: NonZero<usize>,

	/// How many notifications a single listener may fall behind before it starts missing them.
	pub mailbox_capacity: NonZero<usize>,
}

impl Default for RelayConfig
{
	fn default() -> Self
	{
		Self {
			history_capacity: DEFAULT_HISTORY_CAPACITY,
			queue_capacity: DEFAULT_QUEUE_CAPACITY,
			mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
		}
	}
}

/// Only meant for constants, so a zero fails the build instead of panicking at runtime.
const fn nonzero(value: usize) -> NonZero<usize>
{
	match NonZero::new(value) {
		Some(value) => value,
		None => panic!("value must not be zero"),
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn defaults_match_constants()
	{
		let config = RelayConfig::default();

		assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
		assert_eq!(config.queue_capacity.get(), 25);
		assert_eq!(config.mailbox_capacity.get(), 100);
		assert_eq!(DEFAULT_HISTORY_CAPACITY.get(), 20);
	}
}
