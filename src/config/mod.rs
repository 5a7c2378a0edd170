//! Runtime configuration.
//!
//! Every section and every key is optional; anything left out falls back to its default. See
//! `superside.example.toml` in the repository root for all available options.

use {
	color_eyre::{
		Section,
		eyre::{self, WrapErr},
	},
	serde::Deserialize,
	std::{fs, path::Path},
};

pub use self::{
	http::HttpConfig,
	relay::{
		DEFAULT_HISTORY_CAPACITY,
		DEFAULT_MAILBOX_CAPACITY,
		DEFAULT_QUEUE_CAPACITY,
		RelayConfig,
	},
	runtime::RuntimeConfig,
	tracing::{FilesConfig, Filter, StderrConfig, TracingConfig},
};

mod http;
mod relay;
mod runtime;
mod tracing;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config
{
	pub http: HttpConfig,
	pub relay: RelayConfig,
	pub runtime: RuntimeConfig,
	pub tracing: TracingConfig,
}

impl Config
{
	pub fn load_from_file(path: impl AsRef<Path>) -> eyre::Result<Self>
	{
		let file = fs::read_to_string(path.as_ref())
			.wrap_err_with(|| format!("failed to read configuration file at {:?}", path.as_ref()))
			.suggestion("create the file or run with `--config-file` to specify an alternative path")?;

		toml::from_str(&file)
			.wrap_err_with(|| format!("failed to parse configuration file at {:?}", path.as_ref()))
	}
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		std::{
			net::{IpAddr, Ipv4Addr},
			num::NonZero,
			time::Duration,
		},
	};

	#[test]
	fn empty_file_yields_defaults() -> color_eyre::Result<()>
	{
		let config = toml::from_str::<Config>("")?;

		assert_eq!(config.http.ip, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
		assert_eq!(config.http.port, 7778);
		assert_eq!(&*config.http.static_dir, Path::new("public"));
		assert_eq!(config.http.shutdown_timeout, Duration::from_secs(5));
		assert_eq!(config.relay.history_capacity.get(), 20);
		assert_eq!(config.relay.queue_capacity.get(), 25);
		assert_eq!(config.relay.mailbox_capacity.get(), 100);
		assert_eq!(config.runtime.worker_threads, None);
		assert!(config.tracing.enable);
		assert!(config.tracing.stderr.enable);
		assert!(!config.tracing.files.enable);

		Ok(())
	}

	#[test]
	fn parses_every_section() -> color_eyre::Result<()>
	{
		let config = toml::from_str::<Config>(
			r#"
			[http]
			ip = "127.0.0.1"
			port = 8080
			static-dir = "/srv/superside"
			shutdown-timeout = 1.5

			[relay]
			history-capacity = 50
			queue-capacity = 10
			mailbox-capacity = 5

			[runtime]
			worker-threads = 4

			[tracing]
			enable = true
			filters = ["superside=debug", "tower_http=info"]

			[tracing.stderr]
			enable = true
			ansi = false

			[tracing.files]
			enable = true
			directory = "/tmp/superside-logs"
			"#,
		)?;

		assert_eq!(config.http.socket_addr().to_string(), "127.0.0.1:8080");
		assert_eq!(&*config.http.static_dir, Path::new("/srv/superside"));
		assert_eq!(config.http.shutdown_timeout, Duration::from_millis(1500));
		assert_eq!(config.relay.history_capacity.get(), 50);
		assert_eq!(config.relay.queue_capacity.get(), 10);
		assert_eq!(config.relay.mailbox_capacity.get(), 5);
		assert_eq!(config.runtime.worker_threads.map(NonZero::get), Some(4));
		assert_eq!(config.tracing.filters.len(), 2);
		assert!(!config.tracing.stderr.ansi);
		assert!(config.tracing.files.enable);
		assert_eq!(&*config.tracing.files.directory, Path::new("/tmp/superside-logs"));

		Ok(())
	}

	#[test]
	fn partial_sections_keep_remaining_defaults() -> color_eyre::Result<()>
	{
		let config = toml::from_str::<Config>("[relay]\nhistory-capacity = 3\n")?;

		assert_eq!(config.relay.history_capacity.get(), 3);
		assert_eq!(config.relay.queue_capacity.get(), 25);
		assert_eq!(config.relay.mailbox_capacity.get(), 100);

		Ok(())
	}

	#[test]
	fn rejects_zero_capacities()
	{
		for key in ["history-capacity", "queue-capacity", "mailbox-capacity"] {
			let source = format!("[relay]\n{key} = 0\n");
			assert!(matches!(toml::from_str::<Config>(&source), Err(_)), "{key} = 0 was accepted");
		}
	}

	#[test]
	fn rejects_unknown_keys()
	{
		assert!(matches!(toml::from_str::<Config>("[http]\nlisten = 1\n"), Err(_)));
		assert!(matches!(toml::from_str::<Config>("[database]\n"), Err(_)));
	}

	#[test]
	fn rejects_invalid_filter_directives()
	{
		assert!(matches!(
			toml::from_str::<Config>("[tracing]\nfilters = [\"superside=loud\"]\n"),
			Err(_),
		));
	}

	#[test]
	fn missing_file_is_an_error()
	{
		assert!(matches!(Config::load_from_file("/this/file/does/not/exist.toml"), Err(_)));
	}
}
