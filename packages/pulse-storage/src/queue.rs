//! Postgres-backed job queue with lease-based visibility.

use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use pulse_domain::records::{JOB_TYPE_PROCESS_NOTE, NoteJob};
use pulse_service::{BoxFuture, JobDelivery, JobQueue, ServiceError, ServiceResult};

use crate::Result;

#[derive(Clone)]
pub struct PgJobQueue {
	pool: PgPool,
	lease_seconds: i64,
}
impl PgJobQueue {
	pub fn new(pool: PgPool, lease_seconds: u32) -> Self {
		Self { pool, lease_seconds: i64::from(lease_seconds) }
	}

	async fn enqueue_inner(&self, job: NoteJob, delay: Duration) -> Result<()> {
		sqlx::query(
			"\
INSERT INTO note_jobs
	(job_id, job_type, note_id, tenant_id, attempt, provider, status, available_at, enqueued_at)
VALUES ($1, $2, $3, $4, $5, $6, 'PENDING', $7, $8)",
		)
		.bind(Uuid::new_v4())
		.bind(JOB_TYPE_PROCESS_NOTE)
		.bind(job.note_id)
		.bind(&job.tenant_id)
		.bind(job.attempt)
		.bind(job.provider.as_str())
		.bind(job.enqueued_at + delay)
		.bind(job.enqueued_at)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn pull_inner(&self, now: OffsetDateTime) -> Result<Option<JobDelivery>> {
		let mut tx = self.pool.begin().await?;
		let row = sqlx::query_as::<_, crate::models::NoteJobRow>(
			"\
SELECT job_id, note_id, tenant_id, attempt, provider, enqueued_at
FROM note_jobs
WHERE status = 'PENDING' AND job_type = $1 AND available_at <= $2
ORDER BY available_at ASC
LIMIT 1
FOR UPDATE SKIP LOCKED",
		)
		.bind(JOB_TYPE_PROCESS_NOTE)
		.bind(now)
		.fetch_optional(&mut *tx)
		.await?;
		let Some(row) = row else {
			tx.commit().await?;

			return Ok(None);
		};

		// Push visibility forward so the job reappears if this worker dies
		// before acking.
		sqlx::query(
			"\
UPDATE note_jobs
SET available_at = $2, updated_at = now()
WHERE job_id = $1",
		)
		.bind(row.job_id)
		.bind(now + Duration::seconds(self.lease_seconds))
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		row.into_delivery().map(Some)
	}

	async fn ack_inner(&self, delivery_id: Uuid) -> Result<()> {
		sqlx::query(
			"\
UPDATE note_jobs
SET status = 'DONE', updated_at = now()
WHERE job_id = $1",
		)
		.bind(delivery_id)
		.execute(&self.pool)
		.await?;

		Ok(())
	}
}

fn to_service_err(err: crate::Error) -> ServiceError {
	ServiceError::Storage { message: err.to_string() }
}

impl JobQueue for PgJobQueue {
	fn enqueue<'a>(&'a self, job: NoteJob, delay: Duration) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move { self.enqueue_inner(job, delay).await.map_err(to_service_err) })
	}

	fn pull<'a>(&'a self, now: OffsetDateTime) -> BoxFuture<'a, ServiceResult<Option<JobDelivery>>> {
		Box::pin(async move { self.pull_inner(now).await.map_err(to_service_err) })
	}

	fn ack<'a>(&'a self, delivery_id: Uuid) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move { self.ack_inner(delivery_id).await.map_err(to_service_err) })
	}
}
