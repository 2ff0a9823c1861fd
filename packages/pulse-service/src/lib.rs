//! Orchestration layer for the note pipeline.
//!
//! Storage and the job queue sit behind traits so acceptance tests can run
//! against in-memory doubles; `pulse-storage` provides the Postgres-backed
//! implementations.

pub mod health;
pub mod process_note;
pub mod retry_note;

use std::{future::Future, pin::Pin, sync::Arc};

use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

use pulse_config::{Config, InferenceProviderConfig};
use pulse_domain::{
	extract::ExtractError,
	health::HealthReport,
	records::{ActionItem, ClientNote, ClientRecord, NoteJob, ProviderKind},
};
pub use process_note::JobOutcome;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	NotFound { message: String },
	Provider { message: String },
	Extraction { message: String },
	Storage { message: String },
}
impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::NotFound { message } => write!(f, "Not found: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Extraction { message } => write!(f, "Extraction error: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}
impl std::error::Error for ServiceError {}
impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
impl From<ExtractError> for ServiceError {
	fn from(err: ExtractError) -> Self {
		Self::Extraction { message: err.to_string() }
	}
}

/// One leased job pulled off the queue. The delivery id acknowledges this
/// lease, not the job itself; a redelivered job carries a fresh delivery id.
#[derive(Clone, Debug)]
pub struct JobDelivery {
	pub delivery_id: Uuid,
	pub job: NoteJob,
}

/// Derived fields written back to a note on successful completion.
#[derive(Clone, Debug)]
pub struct InsightsUpdate {
	pub title: Option<String>,
	pub summary: String,
	pub topics: Vec<String>,
	pub risk_signals: Vec<String>,
	pub relationship_signals: Vec<String>,
	pub follow_up_recommendations: Vec<String>,
	pub communication_style: Option<String>,
	pub sentiment_score: f32,
}

#[derive(Clone, Debug)]
pub struct ClientRef {
	pub tenant_id: String,
	pub client_id: Uuid,
}

pub trait NoteStore
where
	Self: Send + Sync,
{
	fn fetch_note<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
	) -> BoxFuture<'a, ServiceResult<Option<ClientNote>>>;

	fn mark_processing<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
	) -> BoxFuture<'a, ServiceResult<()>>;

	fn complete_note<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
		update: InsightsUpdate,
	) -> BoxFuture<'a, ServiceResult<()>>;

	/// Records the failure and returns the note to `pending` ahead of the
	/// next attempt.
	fn mark_retry_pending<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
		error: &'a str,
	) -> BoxFuture<'a, ServiceResult<()>>;

	/// Clears any recorded failure and returns the note to `pending`.
	fn reset_pending<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
	) -> BoxFuture<'a, ServiceResult<()>>;

	fn mark_failed<'a>(
		&'a self,
		tenant_id: &'a str,
		note_id: Uuid,
		error: &'a str,
	) -> BoxFuture<'a, ServiceResult<()>>;

	fn recent_notes<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
		since: OffsetDateTime,
		limit: u32,
	) -> BoxFuture<'a, ServiceResult<Vec<ClientNote>>>;
}

pub trait ActionStore
where
	Self: Send + Sync,
{
	fn insert_actions<'a>(&'a self, actions: Vec<ActionItem>) -> BoxFuture<'a, ServiceResult<()>>;

	/// Open action items owed to the client by us with a due date before
	/// `today`.
	fn overdue_me_count<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
		today: Date,
	) -> BoxFuture<'a, ServiceResult<u32>>;
}

pub trait ClientStore
where
	Self: Send + Sync,
{
	fn fetch_client<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
	) -> BoxFuture<'a, ServiceResult<Option<ClientRecord>>>;

	fn write_health<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
		report: &'a HealthReport,
		now: OffsetDateTime,
	) -> BoxFuture<'a, ServiceResult<()>>;

	/// Moves `last_contact_at` forward to `at`. Never moves it backward.
	fn touch_last_contact<'a>(
		&'a self,
		tenant_id: &'a str,
		client_id: Uuid,
		at: OffsetDateTime,
	) -> BoxFuture<'a, ServiceResult<()>>;

	fn client_refs<'a>(&'a self) -> BoxFuture<'a, ServiceResult<Vec<ClientRef>>>;
}

pub trait JobQueue
where
	Self: Send + Sync,
{
	fn enqueue<'a>(&'a self, job: NoteJob, delay: Duration) -> BoxFuture<'a, ServiceResult<()>>;

	/// Leases the next due job, pushing its visibility forward so other
	/// workers skip it while the lease holds.
	fn pull<'a>(&'a self, now: OffsetDateTime) -> BoxFuture<'a, ServiceResult<Option<JobDelivery>>>;

	fn ack<'a>(&'a self, delivery_id: Uuid) -> BoxFuture<'a, ServiceResult<()>>;
}

pub trait InferenceProvider
where
	Self: Send + Sync,
{
	fn infer<'a>(
		&'a self,
		cfg: &'a InferenceProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

struct DefaultInference;

impl InferenceProvider for DefaultInference {
	fn infer<'a>(
		&'a self,
		cfg: &'a InferenceProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(pulse_providers::inference::infer(cfg, prompt))
	}
}

#[derive(Clone)]
pub struct Stores {
	pub notes: Arc<dyn NoteStore>,
	pub actions: Arc<dyn ActionStore>,
	pub clients: Arc<dyn ClientStore>,
	pub queue: Arc<dyn JobQueue>,
}
impl Stores {
	pub fn new(
		notes: Arc<dyn NoteStore>,
		actions: Arc<dyn ActionStore>,
		clients: Arc<dyn ClientStore>,
		queue: Arc<dyn JobQueue>,
	) -> Self {
		Self { notes, actions, clients, queue }
	}
}

pub struct PulseService {
	pub cfg: Config,
	pub stores: Stores,
	pub inference: Arc<dyn InferenceProvider>,
}
impl PulseService {
	pub fn new(cfg: Config, stores: Stores) -> Self {
		Self { cfg, stores, inference: Arc::new(DefaultInference) }
	}

	pub fn with_inference(cfg: Config, stores: Stores, inference: Arc<dyn InferenceProvider>) -> Self {
		Self { cfg, stores, inference }
	}

	pub(crate) fn provider_config(&self, kind: ProviderKind) -> &InferenceProviderConfig {
		match kind {
			ProviderKind::Primary => &self.cfg.providers.primary,
			ProviderKind::Fallback => &self.cfg.providers.fallback,
		}
	}
}
