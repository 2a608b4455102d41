use axum::{extract::State, http::StatusCode, Json};
use shared_data::{ChatQuery, ChatReply};
use tracing::info;

use crate::{log_and_ret, AppState};

pub async fn chat(
	State(state): State<AppState>,
	Json(input): Json<ChatQuery>
) -> Result<Json<ChatReply>, (StatusCode, String)> {
	if input.query.trim().is_empty() {
		return Err((StatusCode::BAD_REQUEST, "Query must not be empty".into()));
	}

	match state.flow.run(input).await {
		Ok(reply) => {
			info!(should_escalate = reply.should_escalate, "Answered chat query");
			Ok(Json(reply))
		},
		Err(e) => log_and_ret!(StatusCode::BAD_GATEWAY, "Chat flow failed: {e}")
	}
}
