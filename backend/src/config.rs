use std::{net::IpAddr, path::PathBuf};

use tracing::Level;

use crate::chat::DEFAULT_MAX_TOOL_ROUNDS;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
	#[error("{key} is set to '{value}', which isn't valid: {reason}")]
	Invalid {
		key: &'static str,
		value: String,
		reason: String
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeminiConfig {
	pub api_key: String,
	pub model: String,
	pub base_url: String
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
	pub bind_addr: IpAddr,
	pub port: u16,
	// no key means no gemini, and the keyword model takes over
	pub gemini: Option<GeminiConfig>,
	pub max_tool_rounds: usize,
	pub frontend_dir: PathBuf,
	pub log_level: Level
}

impl Config {
	/// Reads from the environment, with `.env` already loaded by the caller
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| dotenv::var(key).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		// empty values count as unset, so `GEMINI_API_KEY=` in .env turns gemini off
		let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

		macro_rules! parse_var{
			($key:expr, $default:expr) => {
				match var($key) {
					None => $default,
					Some(v) => v.trim().parse().map_err(|e| ConfigError::Invalid {
						key: $key,
						reason: format!("{e}"),
						value: v
					})?
				}
			}
		}

		let gemini = var("GEMINI_API_KEY").map(|api_key| GeminiConfig {
			api_key,
			model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
			base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.into())
		});

		Ok(Self {
			bind_addr: parse_var!("BIND_ADDR", IpAddr::from([127, 0, 0, 1])),
			port: parse_var!("BACKEND_PORT", 8080),
			gemini,
			max_tool_rounds: parse_var!("MAX_TOOL_ROUNDS", DEFAULT_MAX_TOOL_ROUNDS),
			frontend_dir: var("FRONTEND_DIR").map_or_else(|| PathBuf::from("frontend/dist"), PathBuf::from),
			log_level: parse_var!("LOG_LEVEL", Level::INFO)
		})
	}
}
