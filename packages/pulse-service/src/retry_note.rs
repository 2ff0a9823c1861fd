//! Manual retry of a terminally failed note.

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use pulse_domain::records::{AiStatus, NoteJob, ProviderKind};

use crate::{PulseService, ServiceError, ServiceResult};

impl PulseService {
	/// Requeues a failed note from attempt one on the primary provider. Only
	/// terminally failed notes qualify; anything else is either in flight or
	/// already done.
	pub async fn reset_for_retry(&self, tenant_id: &str, note_id: Uuid) -> ServiceResult<()> {
		let note = self
			.stores
			.notes
			.fetch_note(tenant_id, note_id)
			.await?
			.ok_or_else(|| ServiceError::NotFound {
				message: format!("Note {note_id} not found."),
			})?;

		if note.ai_status != AiStatus::Failed {
			return Err(ServiceError::InvalidRequest {
				message: format!(
					"Note {note_id} is {} and cannot be retried.",
					note.ai_status.as_str()
				),
			});
		}

		self.stores.notes.reset_pending(tenant_id, note_id).await?;
		self.stores
			.queue
			.enqueue(
				NoteJob {
					note_id,
					tenant_id: tenant_id.to_string(),
					attempt: 1,
					provider: ProviderKind::Primary,
					enqueued_at: OffsetDateTime::now_utc(),
				},
				Duration::ZERO,
			)
			.await?;

		tracing::info!(note_id = %note_id, "Requeued failed note for manual retry.");

		Ok(())
	}
}
