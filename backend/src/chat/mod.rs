//! The chatbot behind the widget.
//!
//! A query goes to the model along with the two local tools ([`tools::LocalTool`]); the model can
//! ask for those to be run as many times as it wants (up to a limit) before it hands back a
//! structured reply. Whatever the model says about escalation, the final call is made locally by
//! [`tools::should_escalate`] so that the same query always escalates (or doesn't) the same way.

use std::sync::Arc;

use serde_json::Value;
use shared_data::{ChatQuery, ChatReply};
use tracing::{debug, instrument};

pub mod api;
pub mod gemini;
pub mod keyword;
pub mod model;
pub mod tools;

use model::{GenerateRequest, GenerativeModel, ModelError, ModelTurn, ToolCall, ToolResult, ToolRound};
use tools::{LocalTool, ToolError, HANDOFF_PHRASE};

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

#[derive(thiserror::Error, Debug)]
pub enum ChatError {
	// transparent so that whatever the backend said is exactly what the caller sees
	#[error(transparent)]
	Model(#[from] ModelError),
	#[error("No output from AI")]
	NoOutput,
	#[error("Model output didn't look like a reply: {0}")]
	MalformedOutput(#[source] serde_json::Error),
	#[error("Model asked for unknown tool `{0}`")]
	UnknownTool(String),
	#[error(transparent)]
	ToolArgs(#[from] ToolError),
	#[error("Model was still calling tools after {0} rounds")]
	ToolLoop(usize)
}

pub struct ChatFlow {
	model: Arc<dyn GenerativeModel>,
	max_tool_rounds: usize
}

impl ChatFlow {
	pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
		Self { model, max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS }
	}

	#[must_use]
	pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
		self.max_tool_rounds = rounds;
		self
	}

	pub fn model_name(&self) -> &str {
		self.model.name()
	}

	#[instrument(skip(self), fields(model = self.model.name()))]
	pub async fn run(&self, input: ChatQuery) -> Result<ChatReply, ChatError> {
		let mut request = GenerateRequest::for_query(&input.query);

		for round in 0..=self.max_tool_rounds {
			match self.model.generate(&request).await? {
				ModelTurn::Output(output) => return finish(&input.query, output),
				// asking for nothing is the same as saying nothing
				ModelTurn::ToolCalls(calls) if calls.is_empty() => return Err(ChatError::NoOutput),
				// out of rounds, and there'd be no one to hand the results to anyway
				ModelTurn::ToolCalls(_) if round == self.max_tool_rounds => break,
				ModelTurn::ToolCalls(calls) => {
					debug!(round, ?calls, "Model requested tools");
					let results = calls.iter()
						.map(run_tool)
						.collect::<Result<Vec<_>, _>>()?;

					request.history.push(ToolRound { calls, results });
				}
			}
		}

		Err(ChatError::ToolLoop(self.max_tool_rounds))
	}
}

fn run_tool(call: &ToolCall) -> Result<ToolResult, ChatError> {
	let tool = LocalTool::from_name(&call.name)
		.ok_or_else(|| ChatError::UnknownTool(call.name.clone()))?;

	Ok(ToolResult {
		name: call.name.clone(),
		output: tool.invoke(&call.args)?
	})
}

fn finish(query: &str, output: Option<Value>) -> Result<ChatReply, ChatError> {
	let output = match output {
		None | Some(Value::Null) => return Err(ChatError::NoOutput),
		Some(o) => o
	};

	let reply: ChatReply = serde_json::from_value(output).map_err(ChatError::MalformedOutput)?;

	let escalate = tools::should_escalate(query);
	if escalate != reply.should_escalate {
		debug!(model_said = reply.should_escalate, escalate, "Overriding model's escalation decision");
	}

	// the model's text is thrown away when escalating, so it only has to be there otherwise
	if escalate {
		return Ok(ChatReply { response: HANDOFF_PHRASE.to_string(), should_escalate: true });
	}

	if reply.response.trim().is_empty() {
		return Err(ChatError::NoOutput);
	}

	Ok(ChatReply { should_escalate: false, ..reply })
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use tools::PACKAGE_DETAILS;

	#[test]
	fn escalation_overrides_response() {
		let reply = finish(
			"Nối máy với tư vấn viên",
			Some(json!({ "response": "Sure, here's our menu", "shouldEscalate": false }))
		).unwrap();

		assert_eq!(reply, ChatReply { response: HANDOFF_PHRASE.into(), should_escalate: true });
	}

	#[test]
	fn escalation_ignores_blank_response() {
		let reply = finish(
			"talk to a representative",
			Some(json!({ "response": "", "shouldEscalate": true }))
		).unwrap();

		assert_eq!(reply.response, HANDOFF_PHRASE);
	}

	#[test]
	fn no_keyword_means_no_escalation() {
		let reply = finish(
			"Chi tiết gói 79 triệu?",
			Some(json!({ "response": PACKAGE_DETAILS, "shouldEscalate": true }))
		).unwrap();

		assert!(!reply.should_escalate);
		assert_eq!(reply.response, PACKAGE_DETAILS);
	}

	#[test]
	fn missing_output_is_no_output() {
		for output in [None, Some(Value::Null), Some(json!({ "response": "  ", "shouldEscalate": false }))] {
			let err = finish("hi", output).unwrap_err();
			assert!(matches!(err, ChatError::NoOutput));
			assert_eq!(err.to_string(), "No output from AI");
		}
	}

	#[test]
	fn wrong_shape_is_malformed() {
		let err = finish("hi", Some(json!({ "text": "hello" }))).unwrap_err();
		assert!(matches!(err, ChatError::MalformedOutput(_)));

		let err = finish("hi", Some(json!("just a string"))).unwrap_err();
		assert!(matches!(err, ChatError::MalformedOutput(_)));
	}

	#[test]
	fn unknown_tools_are_refused() {
		let call = ToolCall { name: "bookVenue".into(), args: json!({}) };
		assert!(matches!(run_tool(&call), Err(ChatError::UnknownTool(name)) if name == "bookVenue"));
	}
}
