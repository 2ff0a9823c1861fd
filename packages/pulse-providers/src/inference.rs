use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Sends one chat-completion request and returns the raw response text.
///
/// Retry is the caller's job; a failure here surfaces immediately so the
/// queue-level policy can schedule the next attempt.
pub async fn infer(cfg: &pulse_config::InferenceProviderConfig, prompt: &str) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let text = response_text(&json)
		.ok_or_else(|| eyre::eyre!("Inference response has an unrecognized shape."))?;

	if text.trim().is_empty() {
		return Err(eyre::eyre!("Inference response is empty."));
	}

	Ok(text)
}

/// Normalizes the three response envelopes in use across providers: OpenAI
/// chat completions, Anthropic messages, and bare `{"response": …}` proxies.
fn response_text(json: &Value) -> Option<String> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		return Some(content.to_string());
	}

	if let Some(text) = json
		.get("content")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|block| block.get("text"))
		.and_then(|t| t.as_str())
	{
		return Some(text.to_string());
	}

	if let Some(text) = json.get("response").and_then(|v| v.as_str()) {
		return Some(text.to_string());
	}

	None
}
