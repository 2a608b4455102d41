use std::rc::Rc;

use gloo_console::{error, log};
use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use shared_data::{
	session::{PendingQuery, AUTO_OPEN_DELAY_MS, ESCALATION_NOTE, MOBILE_MAX_WIDTH, SUGGESTED_QUESTIONS},
	ChatQuery,
	ChatReply,
	ChatSession,
	ConversationTurn,
	Role
};
use web_sys::{Element, HtmlInputElement};
use yew::prelude::*;

pub enum ChatMsg {
	Open,
	Close,
	AutoOpen { mobile: bool },
	Draft(String),
	// `None` sends the draft, `Some` is a suggestion chip
	Submit(Option<String>),
	Settle(u32, Result<ChatReply, String>)
}

#[derive(PartialEq, Eq, Default, Clone)]
pub struct Widget {
	pub session: ChatSession
}

impl Reducible for Widget {
	type Action = ChatMsg;

	fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
		let mut session = self.session.clone();

		match action {
			ChatMsg::Open => session.open(),
			ChatMsg::Close => session.close(),
			ChatMsg::AutoOpen { mobile } => if !session.auto_open(mobile) {
				log!("Not auto-opening the chat");
			},
			ChatMsg::Draft(draft) => session.set_draft(draft),
			ChatMsg::Submit(text) => {
				let pending = match text {
					None => session.submit_draft(),
					Some(text) => session.submit(text)
				};

				if pending.is_none() {
					return self;
				}
			},
			ChatMsg::Settle(seq, result) => if !session.settle(seq, result) {
				log!(format!("Dropping reply to stale chat request {seq}"));
				return self;
			}
		}

		Self { session }.into()
	}
}

fn is_mobile() -> bool {
	web_sys::window()
		.and_then(|win| win.inner_width().ok())
		.and_then(|width| width.as_f64())
		.is_some_and(|width| width < MOBILE_MAX_WIDTH)
}

async fn ask(query: String) -> Result<ChatReply, String> {
	let request = Request::post("/api/chat")
		.json(&ChatQuery { query })
		.map_err(|e| format!("Couldn't encode the query: {e:?}"))?;

	let res = request.send()
		.await
		.map_err(|e| format!("Couldn't reach the server: {e:?}"))?;

	if !res.ok() {
		let status = res.status();
		return Err(match res.text().await {
			Ok(text) => format!("Server returned {status}: {text}"),
			Err(err) => format!("Server returned {status}, and the body couldn't be read: {err:?}")
		});
	}

	res.json::<ChatReply>()
		.await
		.map_err(|e| format!("Couldn't decode the reply: {e:?}"))
}

fn turn_view(turn: &ConversationTurn) -> Html {
	let class = match turn.role {
		Role::User => "turn user",
		Role::Assistant => "turn assistant"
	};

	html! {
		<div class={ class }>
			<div class="bubble">
				{ turn.content.clone() }
				if turn.wants_representative() {
					<p class="escalation-note">{ ESCALATION_NOTE }</p>
				}
			</div>
		</div>
	}
}

#[function_component(ChatWidget)]
pub fn chat_widget() -> Html {
	let chat = use_reducer_eq(Widget::default);
	let scroll_ref = use_node_ref();

	// The idle timer. Dropping the `Timeout` cancels it, which happens on unmount or as soon as
	// the session stops being armed (e.g. the launcher got clicked first)
	{
		let chat = chat.clone();
		use_effect_with(chat.session.auto_open_armed(), move |armed| {
			let timer = armed.then(|| Timeout::new(AUTO_OPEN_DELAY_MS, move || {
				chat.dispatch(ChatMsg::AutoOpen { mobile: is_mobile() });
			}));

			move || drop(timer)
		});
	}

	// One request per submitted query, keyed on its sequence number
	{
		let chat = chat.clone();
		let pending = chat.session.pending().cloned();
		use_effect_with(pending.as_ref().map(|p| p.seq), move |_| {
			if let Some(PendingQuery { seq, query }) = pending {
				wasm_bindgen_futures::spawn_local(async move {
					let result = ask(query).await;
					if let Err(ref err) = result {
						error!(format!("Chat request failed: {err}"));
					}

					chat.dispatch(ChatMsg::Settle(seq, result));
				});
			}

			|| ()
		});
	}

	{
		let scroll_ref = scroll_ref.clone();
		use_effect_with((chat.session.turns().len(), chat.session.is_loading()), move |_| {
			if let Some(scroll) = scroll_ref.cast::<Element>() {
				scroll.set_scroll_top(scroll.scroll_height());
			}

			|| ()
		});
	}

	let session = &chat.session;
	let loading = session.is_loading();

	let open = {
		let chat = chat.clone();
		Callback::from(move |_: MouseEvent| chat.dispatch(ChatMsg::Open))
	};

	let close = {
		let chat = chat.clone();
		Callback::from(move |_: MouseEvent| chat.dispatch(ChatMsg::Close))
	};

	let draft = {
		let chat = chat.clone();
		Callback::from(move |e: InputEvent| {
			let input: HtmlInputElement = e.target_unchecked_into();
			chat.dispatch(ChatMsg::Draft(input.value()));
		})
	};

	let submit = {
		let chat = chat.clone();
		Callback::from(move |e: SubmitEvent| {
			e.prevent_default();
			chat.dispatch(ChatMsg::Submit(None));
		})
	};

	html! {
		<>
			<button
				id="chat-launcher"
				class={ classes!(session.is_open().then_some("hidden")) }
				aria-label="Mở trò chuyện"
				onclick={ open }
			>{ "💬" }</button>
			if session.is_open() {
				<div id="chat-panel" role="dialog">
					<div id="chat-header">
						<h3 class="headline">{ "Trợ lý ảo Dream Wedding" }</h3>
						<button aria-label="Đóng" onclick={ close }>{ "✕" }</button>
					</div>
					<div id="chat-scroll" ref={ scroll_ref }>
						{ for session.turns().iter().map(turn_view) }
						if loading {
							<div class="turn assistant">
								<div class="bubble typing"><span/><span/><span/></div>
							</div>
						}
						if session.shows_suggestions() {
							<div id="suggestions">
								{ for SUGGESTED_QUESTIONS.iter().map(|question| {
									let chat = chat.clone();
									let question = *question;
									html! {
										<button onclick={ move |_| chat.dispatch(ChatMsg::Submit(Some(question.to_string()))) }>
											{ question }
										</button>
									}
								}) }
							</div>
						}
					</div>
					<form id="chat-form" onsubmit={ submit }>
						<input
							type="text"
							placeholder="Nhập câu hỏi của bạn..."
							value={ session.draft().to_string() }
							oninput={ draft }
							disabled={ loading }
						/>
						<button
							type="submit"
							class="button button-primary"
							disabled={ loading || session.draft().trim().is_empty() }
						>{ "Gửi" }</button>
					</form>
				</div>
			}
		</>
	}
}
