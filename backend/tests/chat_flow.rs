use std::{
	collections::VecDeque,
	sync::{Arc, Mutex}
};

use async_trait::async_trait;
use backend::chat::{
	keyword::KeywordModel,
	model::{GenerateRequest, GenerativeModel, ModelError, ModelTurn, ToolCall},
	tools::{HANDOFF_PHRASE, SCHEDULING_ANSWER, UNKNOWN_ANSWER},
	ChatError,
	ChatFlow
};
use serde_json::json;
use shared_data::ChatQuery;

/// Hands back whatever it was told to, in order, and remembers what it was asked
#[derive(Default)]
struct Scripted {
	turns: Mutex<VecDeque<Result<ModelTurn, ModelError>>>,
	seen: Mutex<Vec<GenerateRequest>>
}

impl Scripted {
	fn new(turns: impl IntoIterator<Item = Result<ModelTurn, ModelError>>) -> Arc<Self> {
		Arc::new(Self { turns: Mutex::new(turns.into_iter().collect()), ..Self::default() })
	}
}

#[async_trait]
impl GenerativeModel for Scripted {
	fn name(&self) -> &str {
		"scripted"
	}

	async fn generate(&self, request: &GenerateRequest) -> Result<ModelTurn, ModelError> {
		self.seen.lock().unwrap().push(request.clone());
		self.turns.lock().unwrap()
			.pop_front()
			.unwrap_or(Ok(ModelTurn::Output(None)))
	}
}

/// Never stops asking for tools
struct Chatty;

#[async_trait]
impl GenerativeModel for Chatty {
	fn name(&self) -> &str {
		"chatty"
	}

	async fn generate(&self, request: &GenerateRequest) -> Result<ModelTurn, ModelError> {
		Ok(ModelTurn::ToolCalls(vec![ToolCall {
			name: "answerQuery".into(),
			args: json!({ "query": request.query })
		}]))
	}
}

fn query(q: &str) -> ChatQuery {
	ChatQuery { query: q.into() }
}

fn keyword_flow() -> ChatFlow {
	ChatFlow::new(Arc::new(KeywordModel))
}

#[tokio::test]
async fn package_question_gets_package_details() {
	let reply = keyword_flow().run(query("Chi tiết gói 79 triệu?")).await.unwrap();

	assert!(reply.response.contains("79 million VND"));
	assert!(!reply.should_escalate);
}

#[tokio::test]
async fn asking_for_a_person_escalates() {
	let reply = keyword_flow().run(query("Nối máy với tư vấn viên")).await.unwrap();

	assert!(reply.should_escalate);
	assert_eq!(reply.response, HANDOFF_PHRASE);
}

#[tokio::test]
async fn unknown_question_still_answers() {
	let reply = keyword_flow().run(query("Bãi đỗ xe ở đâu?")).await.unwrap();

	assert_eq!(reply.response, UNKNOWN_ANSWER);
	assert!(!reply.should_escalate);
}

#[tokio::test]
async fn scheduling_question_gets_scheduling_answer() {
	let reply = keyword_flow().run(query("Can I Schedule a tasting next week?")).await.unwrap();

	assert_eq!(reply.response, SCHEDULING_ANSWER);
	assert!(!reply.should_escalate);
}

#[tokio::test]
async fn escalation_is_the_same_every_time() {
	let flow = keyword_flow();

	for q in ["Chi tiết gói 79 triệu?", "Tôi muốn gặp nhân viên", "Còn ngày trống không?"] {
		let first = flow.run(query(q)).await.unwrap();
		let second = flow.run(query(q)).await.unwrap();
		assert_eq!(first.should_escalate, second.should_escalate, "{q}");
	}
}

#[tokio::test]
async fn backend_errors_come_through_untouched() {
	let model = Scripted::new([Err(ModelError::Service("API Error".into()))]);
	let err = ChatFlow::new(model).run(query("hi")).await.unwrap_err();

	assert!(matches!(err, ChatError::Model(_)));
	assert_eq!(err.to_string(), "API Error");
}

#[tokio::test]
async fn empty_output_is_an_error() {
	let model = Scripted::new([Ok(ModelTurn::Output(None))]);
	let err = ChatFlow::new(model).run(query("hi")).await.unwrap_err();

	assert!(matches!(err, ChatError::NoOutput));
	assert_eq!(err.to_string(), "No output from AI");
}

#[tokio::test]
async fn output_that_isnt_a_reply_is_an_error() {
	let model = Scripted::new([Ok(ModelTurn::Output(Some(json!({ "answer": "hi" }))))]);
	let err = ChatFlow::new(model).run(query("hi")).await.unwrap_err();

	assert!(matches!(err, ChatError::MalformedOutput(_)));
}

#[tokio::test]
async fn tool_results_are_fed_back() {
	let model = Scripted::new([
		Ok(ModelTurn::ToolCalls(vec![
			ToolCall { name: "answerQuery".into(), args: json!({ "query": "79 triệu" }) },
			ToolCall { name: "shouldEscalate".into(), args: json!({ "query": "79 triệu" }) }
		])),
		Ok(ModelTurn::Output(Some(json!({ "response": "It's 79 million VND", "shouldEscalate": false }))))
	]);

	let reply = ChatFlow::new(model.clone()).run(query("79 triệu")).await.unwrap();
	assert_eq!(reply.response, "It's 79 million VND");

	let seen = model.seen.lock().unwrap();
	assert_eq!(seen.len(), 2);
	assert!(seen[0].history.is_empty());

	let results = seen[1].results().collect::<Vec<_>>();
	assert_eq!(results.len(), 2);
	assert!(results[0].output.as_str().unwrap().contains("79 million VND"));
	assert_eq!(results[1].output, json!(false));
}

#[tokio::test]
async fn model_cant_skip_escalation() {
	let model = Scripted::new([
		Ok(ModelTurn::Output(Some(json!({ "response": "Let me help you myself", "shouldEscalate": false }))))
	]);

	let reply = ChatFlow::new(model).run(query("Can I talk to a representative?")).await.unwrap();
	assert!(reply.should_escalate);
	assert_eq!(reply.response, HANDOFF_PHRASE);
}

#[tokio::test]
async fn escalation_doesnt_need_model_text() {
	let model = Scripted::new([
		Ok(ModelTurn::Output(Some(json!({ "response": "", "shouldEscalate": true }))))
	]);

	let reply = ChatFlow::new(model).run(query("talk to a representative")).await.unwrap();
	assert!(reply.should_escalate);
	assert_eq!(reply.response, HANDOFF_PHRASE);
}

#[tokio::test]
async fn unknown_tools_are_rejected() {
	let model = Scripted::new([
		Ok(ModelTurn::ToolCalls(vec![ToolCall { name: "bookVenue".into(), args: json!({}) }]))
	]);

	let err = ChatFlow::new(model).run(query("hi")).await.unwrap_err();
	assert!(matches!(err, ChatError::UnknownTool(ref name) if name == "bookVenue"));
}

#[tokio::test]
async fn bad_tool_args_are_rejected() {
	let model = Scripted::new([
		Ok(ModelTurn::ToolCalls(vec![ToolCall { name: "answerQuery".into(), args: json!({ "q": 1 }) }]))
	]);

	let err = ChatFlow::new(model).run(query("hi")).await.unwrap_err();
	assert!(matches!(err, ChatError::ToolArgs(_)));
}

#[tokio::test]
async fn tool_loop_is_bounded() {
	let err = ChatFlow::new(Arc::new(Chatty))
		.with_max_tool_rounds(2)
		.run(query("hi"))
		.await
		.unwrap_err();

	assert!(matches!(err, ChatError::ToolLoop(2)));
}

#[tokio::test]
async fn last_rounds_tools_arent_run() {
	let calls = || -> Result<ModelTurn, ModelError> {
		Ok(ModelTurn::ToolCalls(vec![
			ToolCall { name: "answerQuery".into(), args: json!({ "query": "hi" }) }
		]))
	};

	// if the third round's tools were run, its bad args would fail with ToolArgs instead
	let model = Scripted::new([
		calls(),
		calls(),
		Ok(ModelTurn::ToolCalls(vec![ToolCall { name: "answerQuery".into(), args: json!({ "q": 1 }) }]))
	]);

	let err = ChatFlow::new(model.clone())
		.with_max_tool_rounds(2)
		.run(query("hi"))
		.await
		.unwrap_err();

	assert!(matches!(err, ChatError::ToolLoop(2)));

	let seen = model.seen.lock().unwrap();
	assert_eq!(seen.len(), 3);
	assert_eq!(seen[2].history.len(), 2);
}
