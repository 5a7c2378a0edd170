use {
	serde::{Deserialize, Deserializer},
	std::{
		net::{IpAddr, Ipv4Addr, SocketAddr},
		path::{Path, PathBuf},
		time::Duration,
	},
};

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct HttpConfig
{
	/// The IP address to listen on.
	pub ip: IpAddr,

	/// The port to listen on.
	pub port: u16,

	/// Directory served under `/static`.
	pub static_dir: Box<Path>,

	/// How long to wait for connections and background tasks to wind down (in seconds).
	#[serde(deserialize_with = "deserialize_duration")]
	pub shutdown_timeout: Duration,
}

impl HttpConfig
{
	pub fn socket_addr(&self) -> SocketAddr
	{
		SocketAddr::new(self.ip, self.port)
	}
}

impl Default for HttpConfig
{
	fn default() -> Self
	{
		Self {
			ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
			port: 7778,
			static_dir: PathBuf::from("public").into_boxed_path(),
			shutdown_timeout: Duration::from_secs(5),
		}
	}
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
	D: Deserializer<'de>,
{
	f64::deserialize(deserializer).and_then(|secs| {
		Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
	})
}
