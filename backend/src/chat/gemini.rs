//! Google's Generative Language api (`generateContent`), with function calling.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use super::{
	model::{GenerateRequest, GenerativeModel, ModelError, ModelTurn, ToolCall},
	tools::ToolDeclaration
};

pub struct GeminiModel {
	client: reqwest::Client,
	api_key: String,
	base_url: String,
	model: String
}

impl GeminiModel {
	pub fn new(config: &GeminiConfig) -> Result<Self, ModelError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(60))
			.build()?;

		Ok(Self {
			client,
			api_key: config.api_key.clone(),
			base_url: config.base_url.trim_end_matches('/').to_string(),
			model: config.model.clone()
		})
	}

	fn url(&self) -> String {
		format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
	}

	// the key goes in a header so it never shows up in logged urls
	fn request(&self, request: &GenerateRequest) -> reqwest::RequestBuilder {
		self.client
			.post(self.url())
			.header("x-goog-api-key", &self.api_key)
			.json(&to_gemini(request))
	}
}

#[async_trait]
impl GenerativeModel for GeminiModel {
	fn name(&self) -> &str {
		&self.model
	}

	async fn generate(&self, request: &GenerateRequest) -> Result<ModelTurn, ModelError> {
		let response = self.request(request)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ModelError::Status { status: status.as_u16(), body });
		}

		let decoded: GeminiResponse = response.json()
			.await
			.map_err(|e| ModelError::Decode(e.to_string()))?;

		Ok(from_gemini(decoded))
	}
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
	contents: Vec<Content>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	tools: Vec<ToolSet<'a>>,
	generation_config: GenerationConfig
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ToolSet<'a> {
	function_declarations: &'a [ToolDeclaration]
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
	temperature: f32,
	// gemini won't take a response schema alongside function calling, so these are only set
	// when no tools are offered
	#[serde(skip_serializing_if = "Option::is_none")]
	response_mime_type: Option<&'static str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	response_schema: Option<Value>
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
struct Content {
	#[serde(default)]
	role: String,
	#[serde(default)]
	parts: Vec<Part>
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Part {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	text: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	function_call: Option<FunctionCall>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	function_response: Option<FunctionResponse>
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct FunctionCall {
	name: String,
	#[serde(default)]
	args: Value
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct FunctionResponse {
	name: String,
	response: Value
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
	#[serde(default)]
	candidates: Vec<Candidate>
}

#[derive(Deserialize, Debug)]
struct Candidate {
	#[serde(default)]
	content: Option<Content>
}

fn to_gemini(request: &GenerateRequest) -> GeminiRequest<'_> {
	let mut contents = vec![Content {
		role: "user".into(),
		parts: vec![Part { text: Some(request.prompt.clone()), ..Part::default() }]
	}];

	for round in &request.history {
		contents.push(Content {
			role: "model".into(),
			parts: round.calls.iter()
				.map(|call| Part {
					function_call: Some(FunctionCall { name: call.name.clone(), args: call.args.clone() }),
					..Part::default()
				})
				.collect()
		});

		// function responses have to be objects, so the raw value gets wrapped
		contents.push(Content {
			role: "user".into(),
			parts: round.results.iter()
				.map(|result| Part {
					function_response: Some(FunctionResponse {
						name: result.name.clone(),
						response: json!({ "name": result.name, "content": result.output })
					}),
					..Part::default()
				})
				.collect()
		});
	}

	let (tools, generation_config) = if request.tools.is_empty() {
		(vec![], GenerationConfig {
			temperature: 0.2,
			response_mime_type: Some("application/json"),
			response_schema: Some(gemini_schema(&request.output_schema))
		})
	} else {
		(vec![ToolSet { function_declarations: &request.tools }], GenerationConfig {
			temperature: 0.2,
			response_mime_type: None,
			response_schema: None
		})
	};

	GeminiRequest {
		contents,
		tools,
		generation_config
	}
}

// gemini's schema dialect spells types in upper case (`OBJECT`, `STRING`, ...)
fn gemini_schema(schema: &Value) -> Value {
	match schema {
		Value::Object(map) => Value::Object(map.iter()
			.map(|(key, value)| {
				let value = match (key.as_str(), value) {
					("type", Value::String(ty)) => Value::String(ty.to_uppercase()),
					_ => gemini_schema(value)
				};
				(key.clone(), value)
			})
			.collect()),
		Value::Array(items) => Value::Array(items.iter().map(gemini_schema).collect()),
		other => other.clone()
	}
}

fn from_gemini(response: GeminiResponse) -> ModelTurn {
	let parts = response.candidates
		.into_iter()
		.next()
		.and_then(|c| c.content)
		.map(|c| c.parts)
		.unwrap_or_default();

	let mut calls = Vec::new();
	let mut text = String::new();

	for part in parts {
		if let Some(FunctionCall { name, args }) = part.function_call {
			calls.push(ToolCall { name, args });
		} else if let Some(t) = part.text {
			text.push_str(&t);
		}
	}

	if !calls.is_empty() {
		return ModelTurn::ToolCalls(calls);
	}

	if text.trim().is_empty() {
		debug!("Model returned no text");
		return ModelTurn::Output(None);
	}

	match serde_json::from_str(strip_code_fence(&text)) {
		Ok(value) => ModelTurn::Output(Some(value)),
		Err(e) => {
			warn!("Model text wasn't json ({e}): {text}");
			ModelTurn::Output(None)
		}
	}
}

// models love wrapping json in ```json ... ``` even when asked not to
fn strip_code_fence(text: &str) -> &str {
	let text = text.trim();
	let Some(inner) = text.strip_prefix("```") else {
		return text;
	};

	// drop the language tag, if any
	let inner = inner.split_once('\n').map_or(inner, |(_, rest)| rest);
	inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chat::model::{ToolResult, ToolRound};

	fn response(parts: Value) -> GeminiResponse {
		serde_json::from_value(json!({
			"candidates": [{ "content": { "role": "model", "parts": parts } }]
		})).unwrap()
	}

	#[test]
	fn first_request_has_prompt_and_tools() {
		let req = GenerateRequest::for_query("Chi tiết gói 79 triệu?");
		let body = serde_json::to_value(to_gemini(&req)).unwrap();

		assert_eq!(body["contents"].as_array().unwrap().len(), 1);
		assert_eq!(body["contents"][0]["role"], "user");
		assert_eq!(body["contents"][0]["parts"][0]["text"], Value::from(req.prompt.clone()));

		let decls = body["tools"][0]["functionDeclarations"].as_array().unwrap();
		assert_eq!(decls.len(), 2);
		assert_eq!(decls[0]["name"], "answerQuery");
		assert_eq!(decls[1]["parameters"]["required"], json!(["query"]));
	}

	#[test]
	fn tool_rounds_become_call_and_response_turns() {
		let mut req = GenerateRequest::for_query("q");
		req.history.push(ToolRound {
			calls: vec![ToolCall { name: "shouldEscalate".into(), args: json!({ "query": "q" }) }],
			results: vec![ToolResult { name: "shouldEscalate".into(), output: json!(false) }]
		});

		let body = serde_json::to_value(to_gemini(&req)).unwrap();
		let contents = body["contents"].as_array().unwrap();
		assert_eq!(contents.len(), 3);

		assert_eq!(contents[1]["role"], "model");
		assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "shouldEscalate");
		assert!(contents[1]["parts"][0].get("text").is_none());

		assert_eq!(contents[2]["parts"][0]["functionResponse"]["response"]["content"], json!(false));
	}

	#[test]
	fn no_tools_means_no_tools_field() {
		let mut req = GenerateRequest::for_query("q");
		req.tools.clear();
		let body = serde_json::to_value(to_gemini(&req)).unwrap();
		assert!(body.get("tools").is_none());
	}

	#[test]
	fn without_tools_the_output_schema_is_enforced() {
		let mut req = GenerateRequest::for_query("q");
		req.tools.clear();
		let body = serde_json::to_value(to_gemini(&req)).unwrap();

		let config = &body["generationConfig"];
		assert_eq!(config["responseMimeType"], "application/json");
		assert_eq!(config["responseSchema"]["type"], "OBJECT");
		assert_eq!(config["responseSchema"]["properties"]["shouldEscalate"]["type"], "BOOLEAN");
		assert_eq!(config["responseSchema"]["required"], json!(["response", "shouldEscalate"]));
	}

	#[test]
	fn with_tools_the_schema_stays_in_the_prompt() {
		let req = GenerateRequest::for_query("q");
		let body = serde_json::to_value(to_gemini(&req)).unwrap();

		assert!(body["generationConfig"].get("responseSchema").is_none());
		let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
		assert!(prompt.contains(&req.output_schema.to_string()));
	}

	#[test]
	fn key_goes_in_a_header() {
		let model = GeminiModel::new(&GeminiConfig {
			api_key: "secret".into(),
			model: "gemini-2.5-flash".into(),
			base_url: "https://example.com/".into()
		}).unwrap();

		let req = model.request(&GenerateRequest::for_query("q")).build().unwrap();
		assert_eq!(req.url().as_str(), "https://example.com/v1beta/models/gemini-2.5-flash:generateContent");
		assert!(req.url().query().is_none());
		assert_eq!(req.headers()["x-goog-api-key"], "secret");
	}

	#[test]
	fn function_calls_are_tool_calls() {
		let turn = from_gemini(response(json!([
			{ "functionCall": { "name": "answerQuery", "args": { "query": "hi" } } },
			{ "functionCall": { "name": "shouldEscalate", "args": { "query": "hi" } } }
		])));

		let ModelTurn::ToolCalls(calls) = turn else { panic!("expected tool calls") };
		assert_eq!(calls.len(), 2);
		assert_eq!(calls[1].name, "shouldEscalate");
	}

	#[test]
	fn fenced_json_text_is_output() {
		let turn = from_gemini(response(json!([
			{ "text": "```json\n{\"response\": \"hello\", \"shouldEscalate\": false}\n```" }
		])));

		assert_eq!(turn, ModelTurn::Output(Some(json!({ "response": "hello", "shouldEscalate": false }))));
	}

	#[test]
	fn prose_or_nothing_is_no_output() {
		assert_eq!(from_gemini(response(json!([{ "text": "Sure! Happy to help." }]))), ModelTurn::Output(None));
		assert_eq!(from_gemini(GeminiResponse { candidates: vec![] }), ModelTurn::Output(None));
	}

	#[test]
	fn code_fences() {
		assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
		assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
		assert_eq!(strip_code_fence("```json\n[1]```"), "[1]");
	}
}
