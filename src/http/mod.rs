//! The HTTP facade.
//!
//! | Route          | Handler                  |
//! |----------------|--------------------------|
//! | `POST /update` | [`handlers::update()`]   |
//! | `GET /health`  | [`handlers::health()`]   |
//! | `GET /state`   | [`handlers::state()`]    |
//! | `GET /listen`  | [`handlers::listen()`]   |
//! | `GET /static/` | files from `static-dir`  |

use {
	crate::{
		history::History,
		relay::RelayHandle,
		subscribers::Subscribers,
		task_manager::TaskManager,
	},
	axum::{
		Router,
		extract::FromRef,
		routing::{get, post},
	},
	std::{path::Path, sync::Arc},
	tower_http::services::ServeDir,
};

mod handlers;
mod listen;
mod response;
mod trace;

#[derive(Debug, Clone, FromRef)]
pub(crate) struct AppState
{
	pub(crate) relay: RelayHandle,
	pub(crate) history: Arc<History>,
	pub(crate) subscribers: Arc<Subscribers>,
	pub(crate) task_manager: TaskManager,
}

pub(crate) fn router(state: AppState, static_dir: &Path) -> Router
{
	Router::new()
		.route("/update", post(handlers::update))
		.route("/health", get(handlers::health))
		.route("/state", get(handlers::state))
		.route("/listen", get(handlers::listen))
		.nest_service("/static", ServeDir::new(static_dir))
		.layer(trace::layer())
		.with_state(state)
}
