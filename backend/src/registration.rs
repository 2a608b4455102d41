use std::collections::BTreeMap;

use axum::{http::StatusCode, response::Html, Form};
use chrono::{Local, NaiveDate};
use horrorshow::{html, RenderOnce, TemplateBuffer};
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use crate::home;

pub const NAME_MESSAGE: &str = "Tên phải có ít nhất 2 ký tự.";
pub const PHONE_MESSAGE: &str = "Số điện thoại không hợp lệ.";
pub const EMAIL_MESSAGE: &str = "Email không hợp lệ.";
pub const DATE_MESSAGE: &str = "Ngày cưới không hợp lệ.";

#[derive(Deserialize, Validate, Default, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RegistrationForm {
	#[validate(length(min = 2, message = "Tên phải có ít nhất 2 ký tự."))]
	pub name: String,
	#[validate(length(min = 10, message = "Số điện thoại không hợp lệ."))]
	pub phone: String,
	#[validate(email(message = "Email không hợp lệ."))]
	pub email: String,
	// optional, but when present it has to be `YYYY-MM-DD` and not already gone
	pub wedding_date: String
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
	pub name: String,
	pub phone: String,
	pub email: String,
	pub wedding_date: Option<NaiveDate>
}

/// Field name to the message shown under it
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
	pub fn get(&self, field: &str) -> Option<&str> {
		self.0.get(field).map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

impl RegistrationForm {
	fn trimmed(&self) -> Self {
		Self {
			name: self.name.trim().to_string(),
			phone: self.phone.trim().to_string(),
			email: self.email.trim().to_string(),
			wedding_date: self.wedding_date.trim().to_string()
		}
	}

	pub fn check(&self, today: NaiveDate) -> Result<Registration, FieldErrors> {
		let form = self.trimmed();
		let mut errors = FieldErrors::default();

		if let Err(e) = form.validate() {
			for (field, errs) in e.field_errors() {
				if let Some(msg) = errs.iter().find_map(|err| err.message.as_ref()) {
					errors.0.insert(field.to_string(), msg.to_string());
				}
			}
		}

		let wedding_date = if form.wedding_date.is_empty() {
			None
		} else {
			match NaiveDate::parse_from_str(&form.wedding_date, "%Y-%m-%d") {
				Ok(date) if date >= today => Some(date),
				_ => {
					errors.0.insert("wedding_date".into(), DATE_MESSAGE.into());
					None
				}
			}
		};

		if !errors.is_empty() {
			return Err(errors);
		}

		Ok(Registration {
			name: form.name,
			phone: form.phone,
			email: form.email,
			wedding_date
		})
	}
}

pub enum FormState {
	Blank,
	Invalid {
		form: RegistrationForm,
		errors: FieldErrors
	},
	Submitted {
		name: String
	}
}

pub async fn register(Form(form): Form<RegistrationForm>) -> Result<(StatusCode, Html<String>), (StatusCode, String)> {
	let today = Local::now().date_naive();

	let (status, state) = match form.check(today) {
		Ok(reg) => {
			info!(
				name = reg.name,
				phone = reg.phone,
				email = reg.email,
				wedding_date = ?reg.wedding_date,
				"New venue registration"
			);
			(StatusCode::OK, FormState::Submitted { name: reg.name })
		},
		Err(errors) => {
			debug!(?errors, "Rejected registration");
			(StatusCode::UNPROCESSABLE_ENTITY, FormState::Invalid { form, errors })
		}
	};

	home::render(state).map(|page| (status, Html(page)))
}

struct Field<'a> {
	id: &'static str,
	label: &'static str,
	kind: &'static str,
	placeholder: &'static str,
	value: &'a str,
	error: Option<&'a str>
}

impl RenderOnce for Field<'_> {
	fn render_once(self, tmpl: &mut TemplateBuffer) {
		tmpl << html! {
			label(for = self.id) : self.label;
			input(type = self.kind, id = self.id, name = self.id, placeholder = self.placeholder, value = self.value);
			@ if let Some(err) = self.error {
				span(class = "field-error") : err;
			}
		};
	}
}

impl RenderOnce for FormState {
	fn render_once(self, tmpl: &mut TemplateBuffer) {
		let (form, errors) = match self {
			Self::Submitted { name } => {
				tmpl << html! {
					div(id = "form-thanks", class = "center") {
						h3 : format!("Cảm ơn {name}!");
						p(class = "muted") : "Chúng tôi đã nhận được thông tin và sẽ liên hệ với bạn trong 30 phút.";
					}
				};
				return;
			},
			Self::Blank => (RegistrationForm::default(), FieldErrors::default()),
			Self::Invalid { form, errors } => (form, errors)
		};

		let fields = [
			Field { id: "name", label: "Tên Cô Dâu & Chú Rể", kind: "text", placeholder: "Ví dụ: Anh & Bảo", value: &form.name, error: errors.get("name") },
			Field { id: "phone", label: "Số Điện Thoại", kind: "tel", placeholder: "09xxxxxxxx", value: &form.phone, error: errors.get("phone") },
			Field { id: "email", label: "Email", kind: "email", placeholder: "email@example.com", value: &form.email, error: errors.get("email") },
			Field { id: "wedding_date", label: "Ngày Cưới Dự Kiến", kind: "date", placeholder: "", value: &form.wedding_date, error: errors.get("wedding_date") },
		];

		tmpl << html! {
			form(action = "/api/register#form-dang-ky", method = "POST", id = "registration-form") {
				@ for field in fields {
					: field;
				}
				input(type = "submit", class = "button button-accent", value = "NHẬN TƯ VẤN & GIỮ ƯU ĐÃI NGAY!");
			}
		};
	}
}
