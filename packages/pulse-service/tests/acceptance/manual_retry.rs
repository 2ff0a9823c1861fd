use std::sync::Arc;

use pulse_domain::records::{AiStatus, ProviderKind};
use pulse_service::ServiceError;

use super::{MemoryStores, StubInference, build_service, client_fixture, note_fixture};

#[tokio::test]
async fn failed_notes_are_reset_and_requeued() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let mut note = note_fixture("t1", client.client_id);

	note.ai_status = AiStatus::Failed;
	note.ai_error = Some("Provider error: upstream unreachable".to_string());

	let note_id = note.note_id;

	stores.insert_client(client);
	stores.insert_note(note);

	let service = build_service(&stores, Arc::new(StubInference { payload: String::new() }));

	service.reset_for_retry("t1", note_id).await.expect("Expected manual retry to succeed.");

	let note = stores.note(note_id).expect("Note must exist.");

	assert_eq!(note.ai_status, AiStatus::Pending);
	assert_eq!(note.ai_error, None);

	let entries = stores.queue_entries();

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].job.note_id, note_id);
	assert_eq!(entries[0].job.attempt, 1);
	assert_eq!(entries[0].job.provider, ProviderKind::Primary);
	assert!(!entries[0].acked);
}

#[tokio::test]
async fn only_failed_notes_can_be_retried() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);
	let note_id = note.note_id;

	stores.insert_client(client);
	stores.insert_note(note);

	let service = build_service(&stores, Arc::new(StubInference { payload: String::new() }));
	let err = service
		.reset_for_retry("t1", note_id)
		.await
		.expect_err("Expected retry of a pending note to be rejected.");

	assert!(matches!(err, ServiceError::InvalidRequest { .. }), "Unexpected error: {err}");
	assert!(stores.queue_entries().is_empty());
}

#[tokio::test]
async fn retrying_an_unknown_note_is_not_found() {
	let stores = MemoryStores::new();
	let service = build_service(&stores, Arc::new(StubInference { payload: String::new() }));
	let err = service
		.reset_for_retry("t1", uuid::Uuid::new_v4())
		.await
		.expect_err("Expected retry of an unknown note to be rejected.");

	assert!(matches!(err, ServiceError::NotFound { .. }), "Unexpected error: {err}");
}
