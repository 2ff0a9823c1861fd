//! Client health recomputation.

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use pulse_domain::health::{self, HealthInputs, NoteFactors};

use crate::{PulseService, ServiceError, ServiceResult};

/// Notes older than this window do not influence the score.
pub const HEALTH_WINDOW_DAYS: i64 = 30;
pub const HEALTH_NOTE_LIMIT: u32 = 10;

impl PulseService {
	/// Recomputes and persists one client's health from recent notes and
	/// open commitments.
	pub async fn refresh_client_health(
		&self,
		tenant_id: &str,
		client_id: Uuid,
		now: OffsetDateTime,
	) -> ServiceResult<()> {
		let client = self
			.stores
			.clients
			.fetch_client(tenant_id, client_id)
			.await?
			.ok_or_else(|| ServiceError::NotFound {
				message: format!("Client {client_id} not found."),
			})?;
		let since = now - Duration::days(HEALTH_WINDOW_DAYS);
		let notes = self
			.stores
			.notes
			.recent_notes(tenant_id, client_id, since, HEALTH_NOTE_LIMIT)
			.await?;
		let overdue = self.stores.actions.overdue_me_count(tenant_id, client_id, now.date()).await?;
		let inputs = HealthInputs {
			days_since_contact: client.last_contact_at.map(|at| (now - at).whole_days()),
			overdue_commitments: overdue,
			notes: notes
				.iter()
				.map(|note| NoteFactors {
					sentiment: note.ai_sentiment_score,
					risk_signal_count: note.ai_risk_signals.len() as u32,
					mood: note.mood.clone(),
					has_concerns: !note.concerns.trim().is_empty(),
				})
				.collect(),
		};
		let report = health::score_health(&inputs);

		tracing::debug!(
			client_id = %client_id,
			score = report.score,
			status = report.status.as_str(),
			trend = report.trend.as_str(),
			"Recomputed client health."
		);

		self.stores.clients.write_health(tenant_id, client_id, &report, now).await
	}

	/// Recomputes health for every known client. Per-client failures are
	/// logged and skipped so one bad row cannot stall the sweep.
	pub async fn run_health_sweep(&self, now: OffsetDateTime) -> ServiceResult<()> {
		let refs = self.stores.clients.client_refs().await?;

		for client in refs {
			if let Err(err) =
				self.refresh_client_health(&client.tenant_id, client.client_id, now).await
			{
				tracing::error!(
					client_id = %client.client_id,
					error = %err,
					"Health sweep failed for client."
				);
			}
		}

		Ok(())
	}
}
