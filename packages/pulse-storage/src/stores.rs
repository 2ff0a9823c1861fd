//! Postgres-backed implementations of the service store traits.

use sqlx::{PgPool, types::Json};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use pulse_domain::{
	health::HealthReport,
	records::{ActionItem, ClientNote, ClientRecord},
};
use pulse_service::{
	ActionStore, BoxFuture, ClientRef, ClientStore, InsightsUpdate, NoteStore,
	ServiceError, ServiceResult,
};

use crate::Result;

#[derive(Clone)]
pub struct PgStores {
	pool: PgPool,
}
impl PgStores {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	async fn fetch_note_inner(
		&self,
		tenant_id: &str,
		note_id: Uuid,
	) -> Result<Option<ClientNote>> {
		let row = sqlx::query_as::<_, crate::models::ClientNoteRow>(
			"\
SELECT *
FROM client_notes
WHERE tenant_id = $1 AND note_id = $2",
		)
		.bind(tenant_id)
		.bind(note_id)
		.fetch_optional(&self.pool)
		.await?;

		row.map(ClientNote::try_from).transpose()
	}

	async fn set_status_inner(
		&self,
		tenant_id: &str,
		note_id: Uuid,
		status: &str,
		error: Option<&str>,
	) -> Result<()> {
		sqlx::query(
			"\
UPDATE client_notes
SET ai_status = $3, ai_error = $4, updated_at = now()
WHERE tenant_id = $1 AND note_id = $2",
		)
		.bind(tenant_id)
		.bind(note_id)
		.bind(status)
		.bind(error)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn complete_note_inner(
		&self,
		tenant_id: &str,
		note_id: Uuid,
		update: InsightsUpdate,
	) -> Result<()> {
		sqlx::query(
			"\
UPDATE client_notes
SET title = COALESCE($3, title),
	ai_status = 'completed',
	ai_summary = $4,
	ai_topics = $5,
	ai_risk_signals = $6,
	ai_relationship_signals = $7,
	ai_follow_up_recommendations = $8,
	ai_communication_style = $9,
	ai_sentiment_score = $10,
	ai_error = NULL,
	updated_at = now()
WHERE tenant_id = $1 AND note_id = $2",
		)
		.bind(tenant_id)
		.bind(note_id)
		.bind(update.title)
		.bind(update.summary)
		.bind(Json(update.topics))
		.bind(Json(update.risk_signals))
		.bind(Json(update.relationship_signals))
		.bind(Json(update.follow_up_recommendations))
		.bind(update.communication_style)
		.bind(update.sentiment_score)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn recent_notes_inner(
		&self,
		tenant_id: &str,
		client_id: Uuid,
		since: OffsetDateTime,
		limit: u32,
	) -> Result<Vec<ClientNote>> {
		let rows = sqlx::query_as::<_, crate::models::ClientNoteRow>(
			"\
SELECT *
FROM client_notes
WHERE tenant_id = $1 AND client_id = $2 AND meeting_date >= $3
ORDER BY meeting_date DESC, created_at DESC
LIMIT $4",
		)
		.bind(tenant_id)
		.bind(client_id)
		.bind(since.date())
		.bind(i64::from(limit))
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(ClientNote::try_from).collect()
	}

	async fn insert_actions_inner(&self, actions: Vec<ActionItem>) -> Result<()> {
		let mut tx = self.pool.begin().await?;

		for action in actions {
			sqlx::query(
				"\
INSERT INTO action_items
	(action_id, tenant_id, client_id, note_id, description, owner, due_date, status, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
			)
			.bind(action.action_id)
			.bind(&action.tenant_id)
			.bind(action.client_id)
			.bind(action.note_id)
			.bind(&action.description)
			.bind(action.owner.as_str())
			.bind(action.due_date)
			.bind(action.status.as_str())
			.bind(action.created_at)
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;

		Ok(())
	}

	async fn overdue_me_count_inner(
		&self,
		tenant_id: &str,
		client_id: Uuid,
		today: Date,
	) -> Result<u32> {
		let count: i64 = sqlx::query_scalar(
			"\
SELECT COUNT(*)
FROM action_items
WHERE tenant_id = $1
	AND client_id = $2
	AND owner = 'me'
	AND status = 'open'
	AND due_date < $3",
		)
		.bind(tenant_id)
		.bind(client_id)
		.bind(today)
		.fetch_one(&self.pool)
		.await?;

		Ok(count as u32)
	}

	async fn fetch_client_inner(
		&self,
		tenant_id: &str,
		client_id: Uuid,
	) -> Result<Option<ClientRecord>> {
		let row = sqlx::query_as::<_, crate::models::ClientRow>(
			"\
SELECT *
FROM clients
WHERE tenant_id = $1 AND client_id = $2",
		)
		.bind(tenant_id)
		.bind(client_id)
		.fetch_optional(&self.pool)
		.await?;

		row.map(ClientRecord::try_from).transpose()
	}

	async fn write_health_inner(
		&self,
		tenant_id: &str,
		client_id: Uuid,
		report: &HealthReport,
		now: OffsetDateTime,
	) -> Result<()> {
		sqlx::query(
			"\
UPDATE clients
SET health_score = $3,
	health_status = $4,
	health_signals = $5,
	health_trend = $6,
	health_updated_at = $7,
	updated_at = $7
WHERE tenant_id = $1 AND client_id = $2",
		)
		.bind(tenant_id)
		.bind(client_id)
		.bind(report.score)
		.bind(report.status.as_str())
		.bind(Json(report.signals.clone()))
		.bind(report.trend.as_str())
		.bind(now)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn touch_last_contact_inner(
		&self,
		tenant_id: &str,
		client_id: Uuid,
		at: OffsetDateTime,
	) -> Result<()> {
		sqlx::query(
			"\
UPDATE clients
SET last_contact_at = GREATEST(COALESCE(last_contact_at, $3), $3), updated_at = now()
WHERE tenant_id = $1 AND client_id = $2",
		)
		.bind(tenant_id)
		.bind(client_id)
		.bind(at)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn client_refs_inner(&self) -> Result<Vec<ClientRef>> {
		let rows = sqlx::query_as::<_, (String, Uuid)>(
			"\
SELECT tenant_id, client_id
FROM clients",
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows
			.into_iter()
			.map(|(tenant_id, client_id)| ClientRef { tenant_id, client_id })
			.collect())
	}
}

fn to_service_err(err: crate::Error) -> ServiceError {
	ServiceError::Storage { message: err.to_string() }
}

impl NoteStore for PgStores {
	fn fetch_note<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
	) -> BoxFuture<'a, ServiceResult<Option<ClientNote>>> {
		Box::pin(async move {
			self.fetch_note_inner(tenant_id, note_id).await.map_err(to_service_err)
		})
	}

	fn mark_processing<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
	) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move {
			self.set_status_inner(tenant_id, note_id, "processing", None)
				.await
				.map_err(to_service_err)
		})
	}

	fn complete_note<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
		update: InsightsUpdate,
	) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move {
			self.complete_note_inner(tenant_id, note_id, update).await.map_err(to_service_err)
		})
	}

	fn mark_retry_pending<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
		error: &'a str,
	) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move {
			self.set_status_inner(tenant_id, note_id, "pending", Some(error))
				.await
				.map_err(to_service_err)
		})
	}

	fn reset_pending<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
	) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move {
			self.set_status_inner(tenant_id, note_id, "pending", None)
				.await
				.map_err(to_service_err)
		})
	}

	fn mark_failed<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
		error: &'a str,
	) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move {
			self.set_status_inner(tenant_id, note_id, "failed", Some(error))
				.await
				.map_err(to_service_err)
		})
	}

	fn recent_notes<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
		since: OffsetDateTime,
		limit: u32,
	) -> BoxFuture<'a, ServiceResult<Vec<ClientNote>>> {
		Box::pin(async move {
			self.recent_notes_inner(tenant_id, client_id, since, limit)
				.await
				.map_err(to_service_err)
		})
	}
}

impl ActionStore for PgStores {
	fn insert_actions<'a>(&'a self, actions: Vec<ActionItem>) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move { self.insert_actions_inner(actions).await.map_err(to_service_err) })
	}

	fn overdue_me_count<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
		today: Date,
	) -> BoxFuture<'a, ServiceResult<u32>> {
		Box::pin(async move {
			self.overdue_me_count_inner(tenant_id, client_id, today).await.map_err(to_service_err)
		})
	}
}

impl ClientStore for PgStores {
	fn fetch_client<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
	) -> BoxFuture<'a, ServiceResult<Option<ClientRecord>>> {
		Box::pin(async move {
			self.fetch_client_inner(tenant_id, client_id).await.map_err(to_service_err)
		})
	}

	fn write_health<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
		report: &'a HealthReport,
		now: OffsetDateTime,
	) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move {
			self.write_health_inner(tenant_id, client_id, report, now)
				.await
				.map_err(to_service_err)
		})
	}

	fn touch_last_contact<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
		at: OffsetDateTime,
	) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move {
			self.touch_last_contact_inner(tenant_id, client_id, at).await.map_err(to_service_err)
		})
	}

	fn client_refs<'a>(&'a self) -> BoxFuture<'a, ServiceResult<Vec<ClientRef>>> {
		Box::pin(async move { self.client_refs_inner().await.map_err(to_service_err) })
	}
}
