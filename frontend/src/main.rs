use chat::ChatWidget;

mod chat;

fn main() {
	// the page is rendered by the backend; all we own is the one mount point
	let root = web_sys::window()
		.and_then(|win| win.document())
		.and_then(|doc| doc.get_element_by_id("chat-widget"));

	match root {
		Some(root) => {
			yew::Renderer::<ChatWidget>::with_root(root).render();
		},
		None => gloo_console::error!("There's no #chat-widget on this page to mount the chat into")
	}
}
