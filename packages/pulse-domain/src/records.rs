//! Shared record types flowing between the queue, the pipeline, and storage.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub const JOB_TYPE_PROCESS_NOTE: &str = "PROCESS_NOTE";

/// A queued request to run the insight pipeline over one note.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NoteJob {
	pub note_id: Uuid,
	pub tenant_id: String,
	pub attempt: i32,
	pub provider: ProviderKind,
	pub enqueued_at: OffsetDateTime,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	Primary,
	Fallback,
}
impl ProviderKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Primary => "primary",
			Self::Fallback => "fallback",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"primary" => Some(Self::Primary),
			"fallback" => Some(Self::Fallback),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
	Pending,
	Processing,
	Completed,
	Failed,
}
impl AiStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Processing => "processing",
			Self::Completed => "completed",
			Self::Failed => "failed",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"pending" => Some(Self::Pending),
			"processing" => Some(Self::Processing),
			"completed" => Some(Self::Completed),
			"failed" => Some(Self::Failed),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
	Healthy,
	Watch,
	Attention,
}
impl HealthStatus {
	pub fn for_score(score: i32) -> Self {
		if score >= 70 {
			Self::Healthy
		} else if score >= 40 {
			Self::Watch
		} else {
			Self::Attention
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Healthy => "healthy",
			Self::Watch => "watch",
			Self::Attention => "attention",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"healthy" => Some(Self::Healthy),
			"watch" => Some(Self::Watch),
			"attention" => Some(Self::Attention),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTrend {
	Improving,
	Stable,
	Declining,
}
impl HealthTrend {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Improving => "improving",
			Self::Stable => "stable",
			Self::Declining => "declining",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"improving" => Some(Self::Improving),
			"stable" => Some(Self::Stable),
			"declining" => Some(Self::Declining),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Low,
	Medium,
	High,
}
impl Severity {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOwner {
	Me,
	Client,
}
impl ActionOwner {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Me => "me",
			Self::Client => "client",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"me" => Some(Self::Me),
			"client" => Some(Self::Client),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
	Open,
	Done,
}
impl ActionStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Open => "open",
			Self::Done => "done",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"open" => Some(Self::Open),
			"done" => Some(Self::Done),
			_ => None,
		}
	}
}

/// Coarse scheduling hint the model emits for an action item.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DueHint {
	#[serde(rename = "today")]
	Today,
	#[serde(rename = "this week")]
	ThisWeek,
	#[serde(rename = "next week")]
	NextWeek,
	#[serde(rename = "no specific date")]
	NoSpecificDate,
}
impl DueHint {
	/// Lenient parse. Model output varies in casing and whitespace, and an
	/// unrecognized hint means the action simply gets no due date.
	pub fn parse(value: &str) -> Self {
		match value.trim().to_lowercase().as_str() {
			"today" => Self::Today,
			"this week" => Self::ThisWeek,
			"next week" => Self::NextWeek,
			_ => Self::NoSpecificDate,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClientNote {
	pub note_id: Uuid,
	pub tenant_id: String,
	pub client_id: Uuid,
	pub title: String,
	pub has_user_title: bool,
	pub summary: String,
	pub discussed: String,
	pub decisions: String,
	pub raw_action_items: String,
	pub concerns: String,
	pub personal_notes: String,
	pub next_steps: String,
	pub mood: Option<String>,
	pub meeting_date: Date,
	pub meeting_type: String,
	pub ai_status: AiStatus,
	pub ai_summary: Option<String>,
	pub ai_topics: Vec<String>,
	pub ai_risk_signals: Vec<String>,
	pub ai_relationship_signals: Vec<String>,
	pub ai_follow_up_recommendations: Vec<String>,
	pub ai_communication_style: Option<String>,
	pub ai_sentiment_score: Option<f32>,
	pub ai_error: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActionItem {
	pub action_id: Uuid,
	pub tenant_id: String,
	pub client_id: Uuid,
	pub note_id: Option<Uuid>,
	pub description: String,
	pub owner: ActionOwner,
	pub due_date: Option<Date>,
	pub status: ActionStatus,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClientRecord {
	pub client_id: Uuid,
	pub tenant_id: String,
	pub name: String,
	pub last_contact_at: Option<OffsetDateTime>,
	pub health_score: i32,
	pub health_status: HealthStatus,
	pub health_signals: Vec<HealthSignal>,
	pub health_trend: HealthTrend,
	pub health_updated_at: Option<OffsetDateTime>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HealthSignal {
	pub signal_type: String,
	pub severity: Severity,
	pub title: String,
	pub description: String,
}
