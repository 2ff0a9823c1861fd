//! Row types bridging Postgres and the domain records.

use sqlx::types::Json;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use pulse_domain::records::{
	ActionItem, ActionOwner, ActionStatus, AiStatus, ClientNote, ClientRecord, HealthSignal,
	HealthStatus, HealthTrend, NoteJob, ProviderKind,
};
use pulse_service::JobDelivery;

use crate::Error;

#[derive(Debug, sqlx::FromRow)]
pub struct ClientNoteRow {
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
	pub ai_status: String,
	pub ai_summary: Option<String>,
	pub ai_topics: Json<Vec<String>>,
	pub ai_risk_signals: Json<Vec<String>>,
	pub ai_relationship_signals: Json<Vec<String>>,
	pub ai_follow_up_recommendations: Json<Vec<String>>,
	pub ai_communication_style: Option<String>,
	pub ai_sentiment_score: Option<f32>,
	pub ai_error: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl TryFrom<ClientNoteRow> for ClientNote {
	type Error = Error;

	fn try_from(row: ClientNoteRow) -> Result<Self, Self::Error> {
		let ai_status = AiStatus::parse(&row.ai_status).ok_or_else(|| {
			Error::InvalidArgument(format!("Unknown ai_status {:?}.", row.ai_status))
		})?;

		Ok(Self {
			note_id: row.note_id,
			tenant_id: row.tenant_id,
			client_id: row.client_id,
			title: row.title,
			has_user_title: row.has_user_title,
			summary: row.summary,
			discussed: row.discussed,
			decisions: row.decisions,
			raw_action_items: row.raw_action_items,
			concerns: row.concerns,
			personal_notes: row.personal_notes,
			next_steps: row.next_steps,
			mood: row.mood,
			meeting_date: row.meeting_date,
			meeting_type: row.meeting_type,
			ai_status,
			ai_summary: row.ai_summary,
			ai_topics: row.ai_topics.0,
			ai_risk_signals: row.ai_risk_signals.0,
			ai_relationship_signals: row.ai_relationship_signals.0,
			ai_follow_up_recommendations: row.ai_follow_up_recommendations.0,
			ai_communication_style: row.ai_communication_style,
			ai_sentiment_score: row.ai_sentiment_score,
			ai_error: row.ai_error,
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct ClientRow {
	pub client_id: Uuid,
	pub tenant_id: String,
	pub name: String,
	pub last_contact_at: Option<OffsetDateTime>,
	pub health_score: i32,
	pub health_status: String,
	pub health_signals: Json<Vec<HealthSignal>>,
	pub health_trend: String,
	pub health_updated_at: Option<OffsetDateTime>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl TryFrom<ClientRow> for ClientRecord {
	type Error = Error;

	fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
		let health_status = HealthStatus::parse(&row.health_status).ok_or_else(|| {
			Error::InvalidArgument(format!("Unknown health_status {:?}.", row.health_status))
		})?;
		let health_trend = HealthTrend::parse(&row.health_trend).ok_or_else(|| {
			Error::InvalidArgument(format!("Unknown health_trend {:?}.", row.health_trend))
		})?;

		Ok(Self {
			client_id: row.client_id,
			tenant_id: row.tenant_id,
			name: row.name,
			last_contact_at: row.last_contact_at,
			health_score: row.health_score,
			health_status,
			health_signals: row.health_signals.0,
			health_trend,
			health_updated_at: row.health_updated_at,
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct ActionItemRow {
	pub action_id: Uuid,
	pub tenant_id: String,
	pub client_id: Uuid,
	pub note_id: Option<Uuid>,
	pub description: String,
	pub owner: String,
	pub due_date: Option<Date>,
	pub status: String,
	pub created_at: OffsetDateTime,
}
impl TryFrom<ActionItemRow> for ActionItem {
	type Error = Error;

	fn try_from(row: ActionItemRow) -> Result<Self, Self::Error> {
		let owner = ActionOwner::parse(&row.owner)
			.ok_or_else(|| Error::InvalidArgument(format!("Unknown owner {:?}.", row.owner)))?;
		let status = ActionStatus::parse(&row.status)
			.ok_or_else(|| Error::InvalidArgument(format!("Unknown status {:?}.", row.status)))?;

		Ok(Self {
			action_id: row.action_id,
			tenant_id: row.tenant_id,
			client_id: row.client_id,
			note_id: row.note_id,
			description: row.description,
			owner,
			due_date: row.due_date,
			status,
			created_at: row.created_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct NoteJobRow {
	pub job_id: Uuid,
	pub note_id: Uuid,
	pub tenant_id: String,
	pub attempt: i32,
	pub provider: String,
	pub enqueued_at: OffsetDateTime,
}
impl NoteJobRow {
	pub fn into_delivery(self) -> Result<JobDelivery, Error> {
		let provider = ProviderKind::parse(&self.provider).ok_or_else(|| {
			Error::InvalidArgument(format!("Unknown provider {:?}.", self.provider))
		})?;

		Ok(JobDelivery {
			delivery_id: self.job_id,
			job: NoteJob {
				note_id: self.note_id,
				tenant_id: self.tenant_id,
				attempt: self.attempt,
				provider,
				enqueued_at: self.enqueued_at,
			},
		})
	}
}
