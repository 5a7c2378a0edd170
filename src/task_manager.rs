use {
	std::{io, time::Duration},
	tokio::task,
	tokio_util::{sync::CancellationToken, task::TaskTracker},
	tracing::Instrument,
};

/// Keeps track of long-running background tasks, like the relay and listener connections.
#[derive(Debug, Default, Clone)]
pub struct TaskManager
{
	#[debug("{}", tasks.len())]
	tasks: TaskTracker,

	#[debug(skip)]
	cancellation_token: CancellationToken,
}

impl TaskManager
{
	/// Spawns a tracked task.
	///
	/// `make_task` receives a token that is cancelled once [`TaskManager::shutdown()`] is called.
	pub fn spawn<F>(
		&self,
		span: tracing::Span,
		make_task: impl FnOnce(CancellationToken) -> F,
	) -> io::Result<task::JoinHandle<F::Output>>
	where
		F: Future + Send + 'static,
		F::Output: Send + 'static,
	{
		if self.tasks.is_closed() {
			return Err(io::Error::other("task tracker has been closed"));
		}

		let current_span = tracing::Span::current();

		if !current_span.is_disabled() {
			span.follows_from(current_span);
		}

		let future = make_task(self.cancellation_token.child_token()).instrument(span);

		Ok(self.tasks.spawn(future))
	}

	/// Returns the number of tasks that are still running.
	pub fn len(&self) -> usize
	{
		self.tasks.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.tasks.is_empty()
	}

	/// Cancels every task and waits up to `timeout` for them to exit.
	///
	/// Returns `false` if some tasks were still running when the timeout elapsed.
	#[tracing::instrument(level = "debug")]
	pub async fn shutdown(self, timeout: Duration) -> bool
	{
		self.tasks.close();
		tracing::trace!("closed task tracker");

		self.cancellation_token.cancel();
		tracing::trace!("cancelled tasks");

		if tokio::time::timeout(timeout, self.tasks.wait()).await.is_err() {
			tracing::warn!(remaining = self.tasks.len(), "tasks did not exit in time");
			return false;
		}

		tracing::trace!("all tasks have exited");
		true
	}
}
