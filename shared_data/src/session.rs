//! State for the chat widget.
//!
//! This lives here instead of in the frontend so that the state machine can be tested without a
//! browser; the yew component just forwards its events into a [`ChatSession`] and renders what
//! comes out.

use crate::{ChatReply, ConversationTurn};

pub const GREETING: &str = "Chào bạn, Dream Wedding Deals có thể giúp gì cho kế hoạch ngày cưới của bạn không ạ?";
pub const ERROR_TURN: &str = "Xin lỗi, đã có lỗi xảy ra. Vui lòng thử lại sau.";
pub const ESCALATION_NOTE: &str = "Để được hỗ trợ tốt hơn, vui lòng kết nối với tư vấn viên.";

pub const SUGGESTED_QUESTIONS: [&str; 4] = [
	"Chi tiết gói 79 triệu?",
	"Tôi muốn xem sảnh tiệc",
	"Đặt lịch ăn thử",
	"Nối máy với tư vấn viên"
];

/// How long the page sits idle before the chat opens itself
pub const AUTO_OPEN_DELAY_MS: u32 = 10_000;

/// Viewports narrower than this (in css pixels) count as mobile and never get auto-opened
pub const MOBILE_MAX_WIDTH: f64 = 768.;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
	Closed,
	OpenIdle,
	OpenLoading
}

/// A submitted query that hasn't been answered yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingQuery {
	pub seq: u32,
	pub query: String
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ChatSession {
	turns: Vec<ConversationTurn>,
	is_open: bool,
	draft: String,
	pending: Option<PendingQuery>,
	// once the user has opened the chat themselves (or we've auto-opened it), the timer is done
	auto_open_spent: bool,
	next_seq: u32
}

impl ChatSession {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn turns(&self) -> &[ConversationTurn] {
		&self.turns
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		self.is_open
	}

	#[must_use]
	pub fn is_loading(&self) -> bool {
		self.pending.is_some()
	}

	#[must_use]
	pub fn draft(&self) -> &str {
		&self.draft
	}

	#[must_use]
	pub fn pending(&self) -> Option<&PendingQuery> {
		self.pending.as_ref()
	}

	#[must_use]
	pub fn phase(&self) -> Phase {
		match (self.is_open, self.is_loading()) {
			(false, _) => Phase::Closed,
			(true, false) => Phase::OpenIdle,
			(true, true) => Phase::OpenLoading
		}
	}

	pub fn set_draft(&mut self, draft: impl Into<String>) {
		self.draft = draft.into();
	}

	pub fn open(&mut self) {
		self.is_open = true;
		self.auto_open_spent = true;
	}

	pub fn close(&mut self) {
		self.is_open = false;
	}

	/// Whether the idle timer should still be running
	#[must_use]
	pub fn auto_open_armed(&self) -> bool {
		!self.auto_open_spent && !self.is_open && self.turns.is_empty()
	}

	/// Called when the idle timer fires. Returns whether the chat actually opened.
	pub fn auto_open(&mut self, is_mobile: bool) -> bool {
		if !self.auto_open_armed() {
			return false;
		}

		self.auto_open_spent = true;

		if is_mobile {
			return false;
		}

		self.is_open = true;
		self.turns.push(ConversationTurn::assistant(GREETING));
		true
	}

	/// Submits whatever's in the draft box
	pub fn submit_draft(&mut self) -> Option<PendingQuery> {
		let draft = self.draft.clone();
		self.submit(draft)
	}

	/// Starts a request for `text` if it's allowed right now. Suggestion chips go straight
	/// through here, skipping the draft.
	pub fn submit(&mut self, text: impl Into<String>) -> Option<PendingQuery> {
		let query = text.into();
		if query.trim().is_empty() || self.phase() != Phase::OpenIdle {
			return None;
		}

		self.turns.push(ConversationTurn::user(query.clone()));
		self.draft.clear();

		let pending = PendingQuery { seq: self.next_seq, query };
		self.next_seq = self.next_seq.wrapping_add(1);
		self.pending = Some(pending.clone());
		Some(pending)
	}

	/// Resolves the request numbered `seq`, appending exactly one assistant turn. Anything that
	/// isn't the current request is dropped and `false` is returned.
	pub fn settle<E>(&mut self, seq: u32, result: Result<ChatReply, E>) -> bool {
		if self.pending.as_ref().is_none_or(|p| p.seq != seq) {
			return false;
		}

		self.pending = None;
		self.turns.push(match result {
			Ok(reply) => reply.into(),
			Err(_) => ConversationTurn::assistant(ERROR_TURN)
		});
		true
	}

	/// The chips only show up before any real exchange has happened
	#[must_use]
	pub fn shows_suggestions(&self) -> bool {
		self.turns.len() <= 1 && !self.is_loading()
	}
}
