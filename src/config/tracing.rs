use {
	serde::{Deserialize, Deserializer, de},
	std::path::{Path, PathBuf},
	tracing_subscriber::{EnvFilter, filter::Directive},
};

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TracingConfig
{
	/// Install a tracing subscriber at all.
	pub enable: bool,

	/// Filter directives applied on top of `RUST_LOG`.
	pub filters: Vec<Filter>,

	pub stderr: StderrConfig,
	pub files: FilesConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct StderrConfig
{
	pub enable: bool,

	/// Emit ANSI escape codes for colors and other formatting.
	pub ansi: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilesConfig
{
	pub enable: bool,

	/// Directory to store (daily rotated) log files in.
	pub directory: Box<Path>,
}

/// A filter directive, e.g. `superside::relay=trace`.
#[derive(Debug)]
pub struct Filter(pub Directive);

impl TracingConfig
{
	/// Builds an [`EnvFilter`] from `RUST_LOG` and the configured directives.
	pub fn env_filter(&self) -> EnvFilter
	{
		self.filters
			.iter()
			.map(|Filter(directive)| directive.clone())
			.fold(EnvFilter::from_default_env(), EnvFilter::add_directive)
	}
}

impl Default for TracingConfig
{
	fn default() -> Self
	{
		Self {
			enable: true,
			filters: Vec::new(),
			stderr: StderrConfig::default(),
			files: FilesConfig::default(),
		}
	}
}

impl Default for StderrConfig
{
	fn default() -> Self
	{
		Self { enable: true, ansi: true }
	}
}

impl Default for FilesConfig
{
	fn default() -> Self
	{
		Self { enable: false, directory: PathBuf::from("/var/log/superside").into_boxed_path() }
	}
}

impl<'de> Deserialize<'de> for Filter
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer)?
			.parse::<Directive>()
			.map(Self)
			.map_err(de::Error::custom)
	}
}
