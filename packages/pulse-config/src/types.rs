use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub sanitizer: Sanitizer,
	#[serde(default)]
	pub insights: Insights,
	#[serde(default)]
	pub worker: Worker,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// The primary backend handles attempts 1-3; the fallback takes over for
/// attempts 4-7.
#[derive(Debug, Deserialize)]
pub struct Providers {
	pub primary: InferenceProviderConfig,
	pub fallback: InferenceProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct InferenceProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Sanitizer {
	pub max_field_chars: u32,
	pub blocked_phrases: Vec<String>,
}
impl Default for Sanitizer {
	fn default() -> Self {
		Self { max_field_chars: 3_000, blocked_phrases: default_blocked_phrases() }
	}
}

/// Bounds the response validator enforces on model output.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Insights {
	pub max_title_chars: u32,
	pub max_summary_chars: u32,
	pub max_action_items: u32,
	pub max_action_chars: u32,
	pub max_list_items: u32,
	pub max_signal_chars: u32,
	pub max_insight_chars: u32,
	pub max_topics: u32,
	pub max_topic_chars: u32,
	pub max_style_chars: u32,
}
impl Default for Insights {
	fn default() -> Self {
		Self {
			max_title_chars: 150,
			max_summary_chars: 1_000,
			max_action_items: 10,
			max_action_chars: 300,
			max_list_items: 5,
			max_signal_chars: 300,
			max_insight_chars: 500,
			max_topics: 10,
			max_topic_chars: 100,
			max_style_chars: 500,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Worker {
	pub poll_interval_ms: u64,
	pub lease_seconds: u32,
	pub sweep_interval_seconds: u32,
}
impl Default for Worker {
	fn default() -> Self {
		Self { poll_interval_ms: 500, lease_seconds: 30, sweep_interval_seconds: 3_600 }
	}
}

pub fn default_blocked_phrases() -> Vec<String> {
	[
		"ignore previous instructions",
		"ignore all previous instructions",
		"disregard previous instructions",
		"disregard the above",
		"you are now",
		"act as",
		"pretend to be",
		"pretend you are",
		"system prompt:",
		"new instructions:",
		"forget everything",
	]
	.into_iter()
	.map(str::to_string)
	.collect()
}
