use std::{net::SocketAddr, sync::Arc};

use backend::{
	chat::{gemini::GeminiModel, keyword::KeywordModel, model::GenerativeModel, ChatFlow},
	config::Config,
	router,
	AppState
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// it's fine to not have a .env, everything can come from the real environment too
	let env_file = dotenv::dotenv();

	let config = Config::from_env()?;

	tracing_subscriber::fmt()
		.with_max_level(config.log_level)
		.init();

	match env_file {
		Ok(path) => info!("Read env from {}", path.display()),
		Err(e) => info!("No .env loaded ({e}), using the environment as-is")
	}

	let model: Arc<dyn GenerativeModel> = match &config.gemini {
		Some(gemini) => Arc::new(GeminiModel::new(gemini)?),
		None => {
			warn!("GEMINI_API_KEY isn't set; answering chat queries with the offline keyword model");
			Arc::new(KeywordModel)
		}
	};

	let flow = ChatFlow::new(model).with_max_tool_rounds(config.max_tool_rounds);
	info!(model = flow.model_name(), max_tool_rounds = config.max_tool_rounds, "Chat flow ready");

	if !config.frontend_dir.exists() {
		warn!(
			"Frontend dir {} doesn't exist; the chat widget won't load until it's built",
			config.frontend_dir.display()
		);
	}

	let app = router(AppState::new(flow), &config.frontend_dir);

	let addr = SocketAddr::from((config.bind_addr, config.port));
	let listener = tokio::net::TcpListener::bind(addr).await?;

	info!("Serving axum on {addr}...");

	axum::serve(listener, app.into_make_service()).await?;

	Ok(())
}
