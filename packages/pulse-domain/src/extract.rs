//! Parsing and validation of model output into structured note insights.

use regex::Regex;
use serde_json::Value;

use pulse_config::Insights;

use crate::records::{ActionOwner, DueHint};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
	#[error("No JSON object found in model output.")]
	NoJsonFound,
	#[error("Model output contains malformed JSON.")]
	MalformedJson(#[source] serde_json::Error),
	#[error("Schema validation failed at {field}: {message}")]
	SchemaValidation { field: String, message: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtractedAction {
	pub description: String,
	pub owner: ActionOwner,
	pub due_hint: DueHint,
}

#[derive(Clone, Debug)]
pub struct NoteInsights {
	pub title: String,
	pub summary: String,
	pub action_items: Vec<ExtractedAction>,
	pub risk_signals: Vec<String>,
	pub personal_details: Vec<String>,
	pub key_insights: Vec<String>,
	pub relationship_signals: Vec<String>,
	pub follow_up_recommendations: Vec<String>,
	pub sentiment_score: f32,
	pub topics: Vec<String>,
	pub communication_style: Option<String>,
}

/// Pulls the first JSON object out of raw model output and validates it
/// against the configured bounds.
///
/// Models wrap JSON in prose and code fences despite instructions, so this
/// takes the greedy span from the first `{` to the last `}`. That span is the
/// compatibility contract with every provider envelope we have seen.
pub fn extract_insights(raw: &str, bounds: &Insights) -> Result<NoteInsights, ExtractError> {
	let candidate = Regex::new(r"\{[\s\S]*\}")
		.ok()
		.and_then(|re| re.find(raw))
		.ok_or(ExtractError::NoJsonFound)?;
	let value: Value =
		serde_json::from_str(candidate.as_str()).map_err(ExtractError::MalformedJson)?;

	let title = opt_str(&value, "title", bounds.max_title_chars)?
		.filter(|title| !title.trim().is_empty())
		.unwrap_or_else(|| "Untitled Note".to_string());
	let summary = opt_str(&value, "summary", bounds.max_summary_chars)?
		.filter(|summary| !summary.trim().is_empty())
		.ok_or_else(|| ExtractError::SchemaValidation {
			field: "summary".to_string(),
			message: "summary is required and must be a non-empty string.".to_string(),
		})?;
	let action_items = extract_actions(&value, bounds)?;
	let risk_signals =
		string_list(&value, "risk_signals", bounds.max_list_items, bounds.max_signal_chars)?;
	let personal_details =
		string_list(&value, "personal_details", bounds.max_list_items, bounds.max_signal_chars)?;
	let key_insights =
		string_list(&value, "key_insights", bounds.max_list_items, bounds.max_insight_chars)?;
	let relationship_signals = string_list(
		&value,
		"relationship_signals",
		bounds.max_list_items,
		bounds.max_signal_chars,
	)?;
	let follow_up_recommendations = string_list(
		&value,
		"follow_up_recommendations",
		bounds.max_list_items,
		bounds.max_insight_chars,
	)?;
	let sentiment_score = value
		.get("sentiment_score")
		.and_then(Value::as_f64)
		.map(|score| score.clamp(-1.0, 1.0) as f32)
		.unwrap_or(0.0);
	let topics = string_list(&value, "topics", bounds.max_topics, bounds.max_topic_chars)?;
	let communication_style = opt_str(&value, "communication_style", bounds.max_style_chars)?
		.filter(|style| !style.trim().is_empty());

	Ok(NoteInsights {
		title,
		summary,
		action_items,
		risk_signals,
		personal_details,
		key_insights,
		relationship_signals,
		follow_up_recommendations,
		sentiment_score,
		topics,
		communication_style,
	})
}

fn extract_actions(value: &Value, bounds: &Insights) -> Result<Vec<ExtractedAction>, ExtractError> {
	let Some(items) = value.get("action_items") else {
		return Ok(Vec::new());
	};
	let items = items.as_array().ok_or_else(|| ExtractError::SchemaValidation {
		field: "action_items".to_string(),
		message: "action_items must be an array.".to_string(),
	})?;

	if items.len() > bounds.max_action_items as usize {
		return Err(ExtractError::SchemaValidation {
			field: "action_items".to_string(),
			message: format!(
				"action_items must contain at most {} entries.",
				bounds.max_action_items
			),
		});
	}

	let mut actions = Vec::with_capacity(items.len());

	for (index, item) in items.iter().enumerate() {
		let description = opt_str(item, "description", bounds.max_action_chars)?
			.filter(|description| !description.trim().is_empty())
			.ok_or_else(|| ExtractError::SchemaValidation {
				field: format!("action_items[{index}].description"),
				message: "description is required and must be a non-empty string.".to_string(),
			})?;
		let owner = item
			.get("owner")
			.and_then(Value::as_str)
			.and_then(ActionOwner::parse)
			.ok_or_else(|| ExtractError::SchemaValidation {
				field: format!("action_items[{index}].owner"),
				message: "owner must be \"me\" or \"client\".".to_string(),
			})?;
		let due_hint = item
			.get("due_hint")
			.and_then(Value::as_str)
			.map(DueHint::parse)
			.unwrap_or(DueHint::NoSpecificDate);

		actions.push(ExtractedAction { description, owner, due_hint });
	}

	Ok(actions)
}

fn opt_str(value: &Value, field: &str, max_chars: u32) -> Result<Option<String>, ExtractError> {
	let Some(raw) = value.get(field) else {
		return Ok(None);
	};

	if raw.is_null() {
		return Ok(None);
	}

	let text = raw.as_str().ok_or_else(|| ExtractError::SchemaValidation {
		field: field.to_string(),
		message: format!("{field} must be a string."),
	})?;

	if text.chars().count() > max_chars as usize {
		return Err(ExtractError::SchemaValidation {
			field: field.to_string(),
			message: format!("{field} must be at most {max_chars} characters."),
		});
	}

	Ok(Some(text.to_string()))
}

fn string_list(
	value: &Value,
	field: &str,
	max_items: u32,
	max_chars: u32,
) -> Result<Vec<String>, ExtractError> {
	let Some(raw) = value.get(field) else {
		return Ok(Vec::new());
	};

	if raw.is_null() {
		return Ok(Vec::new());
	}

	let items = raw.as_array().ok_or_else(|| ExtractError::SchemaValidation {
		field: field.to_string(),
		message: format!("{field} must be an array of strings."),
	})?;

	if items.len() > max_items as usize {
		return Err(ExtractError::SchemaValidation {
			field: field.to_string(),
			message: format!("{field} must contain at most {max_items} entries."),
		});
	}

	let mut out = Vec::with_capacity(items.len());

	for (index, item) in items.iter().enumerate() {
		let text = item.as_str().ok_or_else(|| ExtractError::SchemaValidation {
			field: format!("{field}[{index}]"),
			message: "entry must be a string.".to_string(),
		})?;

		if text.chars().count() > max_chars as usize {
			return Err(ExtractError::SchemaValidation {
				field: format!("{field}[{index}]"),
				message: format!("entry must be at most {max_chars} characters."),
			});
		}

		let text = text.trim();

		if !text.is_empty() {
			out.push(text.to_string());
		}
	}

	Ok(out)
}
