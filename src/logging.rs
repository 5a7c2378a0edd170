//! [`tracing`] setup.
//!
//! Logs can go to stderr and/or to daily rotated files; both outputs share one [`EnvFilter`]
//! built from `RUST_LOG` plus whatever directives the configuration adds.
//!
//! [`EnvFilter`]: tracing_subscriber::EnvFilter

use {
	crate::config::{FilesConfig, StderrConfig, TracingConfig},
	std::{fs, io},
	tracing_appender::{non_blocking::WorkerGuard, rolling::Rotation},
	tracing_subscriber::{
		Layer,
		fmt::format::FmtSpan,
		layer::SubscriberExt,
		registry::LookupSpan,
		util::SubscriberInitExt,
	},
};

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so it should be kept alive until the
/// process exits.
pub fn init(config: &TracingConfig) -> io::Result<Option<WorkerGuard>>
{
	if !config.enable {
		return Ok(None);
	}

	let stderr = stderr_layer(&config.stderr);
	let (files, guard) = files_layer(&config.files)?.unzip();

	tracing_subscriber::registry()
		.with(Layer::and_then(stderr, files).with_filter(config.env_filter()))
		.try_init()
		.map_err(io::Error::other)?;

	tracing::info!("initialized tracing");

	Ok(guard)
}

fn stderr_layer<S>(config: &StderrConfig) -> Option<impl Layer<S>>
where
	S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
	if !config.enable {
		return None;
	}

	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(config.ansi)
		.with_file(true)
		.with_level(true)
		.with_line_number(true)
		.with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
		.with_target(true)
		.with_thread_names(true)
		.with_writer(io::stderr);

	Some(layer)
}

fn files_layer<S>(config: &FilesConfig) -> io::Result<Option<(impl Layer<S>, WorkerGuard)>>
where
	S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
	if !config.enable {
		return Ok(None);
	}

	fs::create_dir_all(&config.directory)?;

	let log_dir = config.directory.canonicalize()?;
	let (writer, guard) = tracing_appender::rolling::Builder::new()
		.rotation(Rotation::DAILY)
		.filename_prefix("superside")
		.filename_suffix("log")
		.build(&log_dir)
		.map(tracing_appender::non_blocking)
		.map_err(io::Error::other)?;

	let layer = tracing_subscriber::fmt::layer()
		.json()
		.with_file(true)
		.with_level(true)
		.with_line_number(true)
		.with_span_events(FmtSpan::FULL)
		.with_target(true)
		.with_thread_ids(true)
		.with_thread_names(true)
		.with_writer(writer);

	Ok(Some((layer, guard)))
}
