//! The per-job pipeline: sanitize, prompt, infer, extract, persist.

use time::OffsetDateTime;
use uuid::Uuid;

use pulse_domain::{
	extract, prompt,
	records::{ActionItem, ActionStatus, AiStatus, NoteJob},
	retry::{self, RetryDecision},
	schedule,
};

use crate::{InsightsUpdate, JobDelivery, PulseService, ServiceError, ServiceResult};

const MAX_ERROR_CHARS: usize = 1_024;

/// What processing one delivery did to the note.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobOutcome {
	Completed,
	/// The note was already completed or has disappeared; the delivery is
	/// acknowledged without side effects.
	Skipped,
	Retried { attempt: i32, provider: pulse_domain::records::ProviderKind, delay: time::Duration },
	Failed,
}

impl PulseService {
	/// Processes one delivery end to end. The delivery is acknowledged no
	/// matter how processing ends; retries travel as newly enqueued jobs, so
	/// an unacked redelivery would only duplicate work.
	pub async fn process_delivery(&self, delivery: JobDelivery) -> ServiceResult<JobOutcome> {
		let outcome = self.run_state_machine(&delivery.job).await;

		self.stores.queue.ack(delivery.delivery_id).await?;

		outcome
	}

	async fn run_state_machine(&self, job: &NoteJob) -> ServiceResult<JobOutcome> {
		// Storage failures ahead of the pipeline follow the same retry
		// schedule as everything else; only a missing or already-completed
		// note bypasses it.
		let note = match self.stores.notes.fetch_note(&job.tenant_id, job.note_id).await {
			Ok(Some(note)) => note,
			Ok(None) => {
				tracing::warn!(note_id = %job.note_id, "Skipping job for a missing note.");

				return Ok(JobOutcome::Skipped);
			},
			Err(err) => return self.handle_failure(job, err).await,
		};

		// Redelivery of an already-finished job must not reprocess the note.
		if note.ai_status == AiStatus::Completed {
			tracing::info!(note_id = %job.note_id, "Skipping job for a completed note.");

			return Ok(JobOutcome::Skipped);
		}

		if let Err(err) = self.stores.notes.mark_processing(&job.tenant_id, job.note_id).await {
			return self.handle_failure(job, err).await;
		}

		match self.run_pipeline(job).await {
			Ok(()) => Ok(JobOutcome::Completed),
			Err(err) => self.handle_failure(job, err).await,
		}
	}

	async fn run_pipeline(&self, job: &NoteJob) -> ServiceResult<()> {
		let now = OffsetDateTime::now_utc();
		let note = self
			.stores
			.notes
			.fetch_note(&job.tenant_id, job.note_id)
			.await?
			.ok_or_else(|| ServiceError::NotFound {
				message: format!("Note {} disappeared mid-pipeline.", job.note_id),
			})?;
		let client = self
			.stores
			.clients
			.fetch_client(&job.tenant_id, note.client_id)
			.await?
			.ok_or_else(|| ServiceError::NotFound {
				message: format!("Client {} not found for note {}.", note.client_id, note.note_id),
			})?;
		let prompt =
			prompt::build_prompt(&note, &client.name, &self.cfg.sanitizer, &self.cfg.insights);
		let raw = self.inference.infer(self.provider_config(job.provider), &prompt).await?;
		let insights = extract::extract_insights(&raw, &self.cfg.insights)?;
		let today = now.date();
		let actions = insights
			.action_items
			.iter()
			.map(|action| ActionItem {
				action_id: Uuid::new_v4(),
				tenant_id: note.tenant_id.clone(),
				client_id: note.client_id,
				note_id: Some(note.note_id),
				description: action.description.clone(),
				owner: action.owner,
				due_date: schedule::resolve_due_date(action.due_hint, today),
				status: ActionStatus::Open,
				created_at: now,
			})
			.collect::<Vec<_>>();
		// A user-supplied title is never overwritten by the derived one.
		let update = InsightsUpdate {
			title: (!note.has_user_title).then(|| insights.title.clone()),
			summary: insights.summary.clone(),
			topics: insights.topics.clone(),
			risk_signals: insights.risk_signals.clone(),
			relationship_signals: insights.relationship_signals.clone(),
			follow_up_recommendations: insights.follow_up_recommendations.clone(),
			communication_style: insights.communication_style.clone(),
			sentiment_score: insights.sentiment_score,
		};

		self.stores.notes.complete_note(&note.tenant_id, note.note_id, update).await?;

		if !actions.is_empty() {
			self.stores.actions.insert_actions(actions).await?;
		}

		let contact_at = note.meeting_date.midnight().assume_utc();

		if client.last_contact_at.is_none_or(|at| contact_at > at) {
			self.stores.clients.touch_last_contact(&note.tenant_id, note.client_id, contact_at).await?;
		}

		self.refresh_client_health(&note.tenant_id, note.client_id, now).await?;

		tracing::info!(
			note_id = %note.note_id,
			client_id = %note.client_id,
			attempt = job.attempt,
			provider = job.provider.as_str(),
			"Completed note insight pipeline."
		);

		Ok(())
	}

	async fn handle_failure(&self, job: &NoteJob, err: ServiceError) -> ServiceResult<JobOutcome> {
		let error_text = sanitize_error(&err.to_string());

		match retry::next_retry(job.attempt) {
			RetryDecision::Retry { attempt, provider, delay } => {
				tracing::warn!(
					note_id = %job.note_id,
					attempt = job.attempt,
					next_attempt = attempt,
					next_provider = provider.as_str(),
					error = %error_text,
					"Note processing failed; scheduling retry."
				);
				self.stores
					.notes
					.mark_retry_pending(&job.tenant_id, job.note_id, &error_text)
					.await?;
				self.stores
					.queue
					.enqueue(
						NoteJob {
							note_id: job.note_id,
							tenant_id: job.tenant_id.clone(),
							attempt,
							provider,
							enqueued_at: OffsetDateTime::now_utc(),
						},
						delay,
					)
					.await?;

				Ok(JobOutcome::Retried { attempt, provider, delay })
			},
			RetryDecision::GiveUp => {
				tracing::error!(
					note_id = %job.note_id,
					attempt = job.attempt,
					error = %error_text,
					"Note processing failed terminally."
				);
				self.stores.notes.mark_failed(&job.tenant_id, job.note_id, &error_text).await?;

				Ok(JobOutcome::Failed)
			},
		}
	}
}

/// Redacts credential-shaped fragments from an error message before it is
/// persisted alongside the note.
pub(crate) fn sanitize_error(text: &str) -> String {
	let mut parts = Vec::new();
	let mut redact_next = false;

	for raw in text.split_whitespace() {
		let mut word = raw.to_string();

		if redact_next {
			word = "[REDACTED]".to_string();
			redact_next = false;
		}
		if raw.eq_ignore_ascii_case("bearer") {
			redact_next = true;
		}

		let lowered = raw.to_ascii_lowercase();

		for key in ["api_key", "apikey", "password", "secret", "token"] {
			if lowered.contains(key) && (lowered.contains('=') || lowered.contains(':')) {
				let sep = if raw.contains('=') { '=' } else { ':' };
				let prefix = match raw.split(sep).next() {
					Some(prefix) => prefix,
					None => raw,
				};

				word = format!("{prefix}{sep}[REDACTED]");

				break;
			}
		}

		parts.push(word);
	}

	let mut out = parts.join(" ");

	if out.chars().count() > MAX_ERROR_CHARS {
		out = out.chars().take(MAX_ERROR_CHARS).collect();
		out.push_str("...");
	}

	out
}
