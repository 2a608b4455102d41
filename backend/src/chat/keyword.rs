use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
	model::{GenerateRequest, GenerativeModel, ModelError, ModelTurn, ToolCall},
	tools::{self, LocalTool, HANDOFF_PHRASE}
};

/// Stands in for a real model when there's no api key around (local dev, or if the key gets
/// pulled). It always asks for both tools and then builds its answer from what they said, which
/// is exactly what the prompt tells a real model to do.
#[derive(Default, Clone, Copy, Debug)]
pub struct KeywordModel;

#[async_trait]
impl GenerativeModel for KeywordModel {
	fn name(&self) -> &str {
		"keyword"
	}

	async fn generate(&self, request: &GenerateRequest) -> Result<ModelTurn, ModelError> {
		let offered = |tool: LocalTool| request.tools.iter().any(|t| t.name == tool.name());

		if request.history.is_empty() && LocalTool::ALL.into_iter().all(offered) {
			let args = json!({ "query": request.query });
			return Ok(ModelTurn::ToolCalls(
				LocalTool::ALL.into_iter()
					.map(|tool| ToolCall { name: tool.name().to_string(), args: args.clone() })
					.collect()
			));
		}

		let result_for = |tool: LocalTool| request.results()
			.filter(|r| r.name == tool.name())
			.map(|r| &r.output)
			.last();

		// if we somehow weren't given the tools, just run the rules ourselves
		let escalate = result_for(LocalTool::ShouldEscalate)
			.and_then(Value::as_bool)
			.unwrap_or_else(|| tools::should_escalate(&request.query));

		let answer = result_for(LocalTool::AnswerQuery)
			.and_then(Value::as_str)
			.map_or_else(|| tools::answer_query(&request.query).to_string(), str::to_string);

		let response = if escalate { HANDOFF_PHRASE.to_string() } else { answer };

		Ok(ModelTurn::Output(Some(json!({
			"response": response,
			"shouldEscalate": escalate
		}))))
	}
}
