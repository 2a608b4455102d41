use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PACKAGE_DETAILS: &str = r#"The "Dream Wedding" package for 200 guests is 79 million VND. It includes the venue, 8-course meal, drinks, decoration, MC, sound system, wedding cake, and a honeymoon night at a 5-star hotel."#;
pub const SCHEDULING_ANSWER: &str = "Please contact us to check date availability.";
pub const UNKNOWN_ANSWER: &str = "I am sorry, I don't have information about that. Please contact a representative for further assistance.";

pub const HANDOFF_PHRASE: &str = "A representative will be with you shortly.";
pub const NOT_SURE_PHRASE: &str = "I'm not sure how to handle that. Would you like to speak to a representative?";

// all lowercase, since they're matched against the lowercased query
const ESCALATION_KEYWORDS: [&str; 3] = ["escalate", "representative", "tư vấn viên"];
const PACKAGE_KEYWORDS: [&str; 2] = ["79 million", "79 triệu"];

/// Canned answers for the questions we actually know about. Some day this might come from
/// somewhere editable, but for now the package doesn't change.
#[must_use]
pub fn answer_query(query: &str) -> &'static str {
	let query = query.to_lowercase();

	if PACKAGE_KEYWORDS.iter().any(|k| query.contains(k)) {
		PACKAGE_DETAILS
	} else if query.contains("schedule") {
		SCHEDULING_ANSWER
	} else {
		UNKNOWN_ANSWER
	}
}

#[must_use]
pub fn should_escalate(query: &str) -> bool {
	let query = query.to_lowercase();
	ESCALATION_KEYWORDS.iter().any(|k| query.contains(k))
}

/// How a tool is described to the model
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ToolDeclaration {
	pub name: &'static str,
	pub description: &'static str,
	pub parameters: Value
}

#[derive(thiserror::Error, Debug)]
pub enum ToolError {
	#[error("Bad arguments for tool `{tool}`: {source}")]
	Args {
		tool: &'static str,
		#[source]
		source: serde_json::Error
	}
}

#[derive(Deserialize)]
struct QueryArgs {
	query: String
}

/// The functions the model is allowed to call back into
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LocalTool {
	AnswerQuery,
	ShouldEscalate
}

impl LocalTool {
	pub const ALL: [Self; 2] = [Self::AnswerQuery, Self::ShouldEscalate];

	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::AnswerQuery => "answerQuery",
			Self::ShouldEscalate => "shouldEscalate"
		}
	}

	#[must_use]
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|t| t.name() == name)
	}

	#[must_use]
	pub fn declaration(self) -> ToolDeclaration {
		let description = match self {
			Self::AnswerQuery => "Answers a user query about wedding packages and scheduling at the restaurant. Returns the answer as a string.",
			Self::ShouldEscalate => "Determines whether the chatbot should escalate the conversation to a live person. Returns a boolean."
		};

		ToolDeclaration {
			name: self.name(),
			description,
			parameters: json!({
				"type": "object",
				"properties": {
					"query": {
						"type": "string",
						"description": "The user query."
					}
				},
				"required": ["query"]
			})
		}
	}

	pub fn invoke(self, args: &Value) -> Result<Value, ToolError> {
		let QueryArgs { query } = QueryArgs::deserialize(args)
			.map_err(|source| ToolError::Args { tool: self.name(), source })?;

		Ok(match self {
			Self::AnswerQuery => Value::from(answer_query(&query)),
			Self::ShouldEscalate => Value::from(should_escalate(&query))
		})
	}
}
