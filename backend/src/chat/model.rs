use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::tools::{ToolDeclaration, LocalTool, HANDOFF_PHRASE, NOT_SURE_PHRASE};

/// A call the model wants us to make before it answers
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolCall {
	pub name: String,
	#[serde(default)]
	pub args: Value
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolResult {
	pub name: String,
	pub output: Value
}

/// One back-and-forth of tool calling: what the model asked for, and what we answered
#[derive(Clone, Debug, PartialEq)]
pub struct ToolRound {
	pub calls: Vec<ToolCall>,
	pub results: Vec<ToolResult>
}

#[derive(Clone, Debug)]
pub struct GenerateRequest {
	pub query: String,
	pub prompt: String,
	pub tools: Vec<ToolDeclaration>,
	pub output_schema: Value,
	pub history: Vec<ToolRound>
}

impl GenerateRequest {
	#[must_use]
	pub fn for_query(query: &str) -> Self {
		let output_schema = reply_schema();
		Self {
			query: query.to_string(),
			prompt: assistant_prompt(query, &output_schema),
			tools: LocalTool::ALL.into_iter().map(LocalTool::declaration).collect(),
			output_schema,
			history: Vec::new()
		}
	}

	/// Everything the tools have answered so far, latest last
	pub fn results(&self) -> impl Iterator<Item = &ToolResult> {
		self.history.iter().flat_map(|round| round.results.iter())
	}
}

/// What came back from one call to the model. The output is left untyped here; it's the flow's
/// job to check that it actually looks like a reply.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelTurn {
	ToolCalls(Vec<ToolCall>),
	Output(Option<Value>)
}

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
	#[error("Couldn't reach the model: {0}")]
	Http(#[from] reqwest::Error),
	#[error("Model returned {status}: {body}")]
	Status {
		status: u16,
		body: String
	},
	#[error("Couldn't decode the model's response: {0}")]
	Decode(String),
	#[error("{0}")]
	Service(String)
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
	fn name(&self) -> &str;

	async fn generate(&self, request: &GenerateRequest) -> Result<ModelTurn, ModelError>;
}

#[must_use]
pub fn reply_schema() -> Value {
	json!({
		"type": "object",
		"properties": {
			"response": {
				"type": "string",
				"description": "The chatbot response."
			},
			"shouldEscalate": {
				"type": "boolean",
				"description": "Whether the chatbot should escalate to a live person."
			}
		},
		"required": ["response", "shouldEscalate"]
	})
}

fn assistant_prompt(query: &str, output_schema: &Value) -> String {
	let answer = LocalTool::AnswerQuery.name();
	let escalate = LocalTool::ShouldEscalate.name();

	format!(
		"You are a chatbot assistant for a wedding venue. Your primary goal is to answer user questions using the provided tools.

- Use the '{answer}' tool to respond to questions about packages and services.
- Use the '{escalate}' tool to determine if the conversation needs to be handed off to a human.
- If the '{escalate}' tool returns 'true', your final response should be \"{HANDOFF_PHRASE}\" and you must set the 'shouldEscalate' output field to true.
- If you cannot answer the query with the available tools, respond with \"{NOT_SURE_PHRASE}\" and set 'shouldEscalate' to true.

Reply with only a JSON object that matches this JSON schema: {output_schema}

User query: {query}"
	)
}
