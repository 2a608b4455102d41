use std::{path::Path, sync::Arc};

use axum::{routing::{get, post}, Router};
use tower_http::services::ServeDir;

pub mod chat;
pub mod config;
pub mod home;
pub mod registration;

use chat::ChatFlow;

#[macro_export]
macro_rules! log_and_ret{
	($err: expr, $($fmt:tt)+) => {{
		let msg = format!($($fmt)+);
		tracing::error!("{msg}");
		return Err(($err, msg));
	}};
}

#[derive(Clone)]
pub struct AppState {
	pub flow: Arc<ChatFlow>
}

impl AppState {
	pub fn new(flow: ChatFlow) -> Self {
		Self { flow: Arc::new(flow) }
	}
}

pub fn router(state: AppState, frontend_dir: impl AsRef<Path>) -> Router {
	Router::new()
		.route("/", get(home::landing_page))
		.route("/api/chat", post(chat::api::chat))
		.route("/api/register", post(registration::register))
		.route("/healthz", get(|| async { "ok" }))
		// the widget bundle, built from the frontend crate
		.nest_service(home::PKG_PATH, ServeDir::new(frontend_dir.as_ref()))
		.with_state(state)
}
