mod image_loader;
pub mod session;

pub use image_loader::sized_image_url;
pub use session::ChatSession;

use serde::{Deserialize, Serialize};

/// What the widget sends to `/api/chat`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatQuery {
	pub query: String
}

// The field is `shouldEscalate` on the wire since that's also what the model is asked to produce
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
	pub response: String,
	pub should_escalate: bool
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Assistant
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConversationTurn {
	pub role: Role,
	pub content: String,
	// only ever set on assistant turns that came back from the flow
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub should_escalate: Option<bool>
}

impl ConversationTurn {
	#[must_use]
	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into(), should_escalate: None }
	}

	#[must_use]
	pub fn assistant(content: impl Into<String>) -> Self {
		Self { role: Role::Assistant, content: content.into(), should_escalate: None }
	}

	#[must_use]
	pub fn wants_representative(&self) -> bool {
		self.should_escalate.unwrap_or(false)
	}
}

impl From<ChatReply> for ConversationTurn {
	fn from(reply: ChatReply) -> Self {
		Self {
			role: Role::Assistant,
			content: reply.response,
			should_escalate: Some(reply.should_escalate)
		}
	}
}

pub static SITE_NAME: &str = "Dream Wedding Deals";

pub static BASE_STYLE: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Playfair+Display:wght@600;700&family=Be+Vietnam+Pro:wght@400;600&display=swap');
* {
	--background: #fdf8f3;
	--card: #f6ede4;
	--primary: #c8a165;
	--primary-foreground: #3d2b1f;
	--accent: #9e4b4b;
	--accent-foreground: #fdf8f3;
	--muted: #ece3da;
	--muted-foreground: #7a6a5d;
	--footer: #2e2a27;
	box-sizing: border-box;
	font-family: "Be Vietnam Pro", Arial, sans-serif;
	color: var(--primary-foreground);
}
body {
	background-color: var(--background);
	margin: 0;
}
h1, h2, h3, .headline {
	font-family: "Playfair Display", Georgia, serif;
}
button, .button {
	border: none;
	border-radius: 6px;
	padding: 10px 20px;
	cursor: pointer;
	font-size: 16px;
	text-decoration: none;
	display: inline-block;
}
.button-primary {
	background-color: var(--primary);
	color: var(--primary-foreground);
}
.button-accent {
	background-color: var(--accent);
	color: var(--accent-foreground);
}
.button-outline {
	background-color: transparent;
	border: 1px solid var(--primary);
	color: var(--primary);
}
input {
	border: 1px solid var(--muted);
	border-radius: 6px;
	padding: 8px 12px;
	font-size: 16px;
	background-color: var(--background);
}
"#;

pub static CHAT_STYLE: &str = r"
#chat-launcher {
	position: fixed;
	bottom: 16px;
	right: 16px;
	z-index: 50;
	width: 64px;
	height: 64px;
	border-radius: 50%;
	background-color: var(--primary);
	box-shadow: 0 4px 12px rgba(0, 0, 0, 0.25);
	font-size: 28px;
	transition: transform 0.3s ease-in-out;
}
#chat-launcher.hidden {
	transform: translateX(calc(100% + 2rem));
}
#chat-panel {
	position: fixed;
	bottom: 16px;
	right: 16px;
	z-index: 50;
	width: calc(100vw - 2rem);
	max-width: 448px;
	height: 70vh;
	display: flex;
	flex-direction: column;
	background-color: var(--background);
	border-radius: 10px;
	box-shadow: 0 10px 30px rgba(0, 0, 0, 0.3);
}
#chat-header {
	display: flex;
	justify-content: space-between;
	align-items: center;
	padding: 12px 16px;
	border-bottom: 1px solid var(--muted);
}
#chat-scroll {
	flex: 1;
	overflow-y: auto;
	padding: 16px;
	scroll-behavior: smooth;
}
.turn {
	display: flex;
	margin-bottom: 12px;
}
.turn.user {
	justify-content: flex-end;
}
.bubble {
	border-radius: 8px;
	padding: 8px 16px;
	max-width: 80%;
	white-space: pre-wrap;
}
.turn.user .bubble {
	background-color: var(--primary);
}
.turn.assistant .bubble {
	background-color: var(--muted);
	color: var(--muted-foreground);
}
.escalation-note {
	font-size: 12px;
	font-style: italic;
	margin-top: 8px;
	opacity: 0.8;
}
.typing span {
	display: inline-block;
	width: 8px;
	height: 8px;
	margin: 0 2px;
	border-radius: 50%;
	background-color: var(--primary-foreground);
	animation: pulse 1s infinite;
}
@keyframes pulse {
	50% { opacity: 0.3; }
}
#suggestions {
	display: grid;
	grid-template-columns: 1fr 1fr;
	gap: 8px;
}
#suggestions button {
	background-color: transparent;
	border: 1px solid var(--muted);
	text-align: left;
}
#chat-form {
	display: flex;
	gap: 8px;
	padding: 16px;
	border-top: 1px solid var(--muted);
}
#chat-form input {
	flex: 1;
}
";
