use {
	std::{net::IpAddr, path::PathBuf},
	superside::Config,
};

/// Path the configuration is read from if `--config-file` is not given.
///
/// Unlike an explicitly specified file, this one is allowed to be missing.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "superside.toml";

pub(crate) fn args() -> Args
{
	<Args as clap::Parser>::parse()
}

/// Relays Sidecar service-state changes to WebSocket listeners.
#[derive(Debug, clap::Parser)]
pub(crate) struct Args
{
	/// Path to the configuration file
	#[arg(short = 'f', long, env = "SUPERSIDE_CONFIG_FILE")]
	pub(crate) config_file: Option<PathBuf>,

	/// The IP address the server should listen on
	///
	/// Takes precedence over the configuration file.
	#[arg(long)]
	pub(crate) ip: Option<IpAddr>,

	/// The port the server should listen on
	///
	/// Takes precedence over the configuration file.
	#[arg(long)]
	pub(crate) port: Option<u16>,
}

impl Args
{
	pub(crate) fn apply_to_config(&self, config: &mut Config)
	{
		if let Some(ip) = self.ip {
			config.http.ip = ip;
		}

		if let Some(port) = self.port {
			config.http.port = port;
		}
	}
}
