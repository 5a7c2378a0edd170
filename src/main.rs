use {
	color_eyre::eyre::{self, WrapErr},
	std::{fs, io},
	superside::{Config, config::RuntimeConfig},
	tokio::runtime::{Builder, Runtime},
};

mod cli;

fn main() -> eyre::Result<()>
{
	color_eyre::install()?;

	let args = cli::args();
	let mut config = match args.config_file.as_deref() {
		Some(path) => Config::load_from_file(path)?,
		None if fs::exists(cli::DEFAULT_CONFIG_PATH)? => {
			Config::load_from_file(cli::DEFAULT_CONFIG_PATH)?
		},
		None => Config::default(),
	};

	args.apply_to_config(&mut config);

	let _guard = superside::logging::init(&config.tracing).wrap_err("failed to initialize tracing")?;

	tracing::debug!(?config, "loaded configuration");

	build_runtime(&config.runtime)
		.wrap_err("failed to build tokio runtime")?
		.block_on(superside::run(config))
		.wrap_err("failed to run superside")
}

fn build_runtime(config: &RuntimeConfig) -> io::Result<Runtime>
{
	let mut builder = Builder::new_multi_thread();

	builder.enable_time();
	builder.enable_io();

	if let Some(worker_threads) = config.worker_threads {
		builder.worker_threads(worker_threads.get());
	}

	builder.build()
}
