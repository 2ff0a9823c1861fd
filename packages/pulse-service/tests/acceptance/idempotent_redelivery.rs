use std::sync::Arc;

use pulse_domain::records::AiStatus;
use pulse_service::JobOutcome;

use super::{
	MemoryStores, ScriptedInference, build_service, client_fixture, deliver, job_fixture,
	model_payload, note_fixture,
};

#[tokio::test]
async fn redelivering_a_completed_job_is_a_no_op() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);
	let note_id = note.note_id;

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let inference = Arc::new(ScriptedInference::new(vec![Ok(model_payload())]));
	let service = build_service(&stores, inference.clone());
	let job = job_fixture(&note);
	let outcome = service
		.process_delivery(deliver(&stores, job.clone()))
		.await
		.expect("Expected first delivery to succeed.");

	assert_eq!(outcome, JobOutcome::Completed);

	let completed = stores.note(note_id).expect("Note must exist.");

	// Same job again under a fresh delivery id, as after a lease expiry.
	let outcome = service
		.process_delivery(deliver(&stores, job))
		.await
		.expect("Expected redelivery to succeed.");

	assert_eq!(outcome, JobOutcome::Skipped);
	assert_eq!(inference.calls(), 1, "Redelivery must not call the model again.");

	let note = stores.note(note_id).expect("Note must exist.");

	assert_eq!(note.ai_status, AiStatus::Completed);
	assert_eq!(note.title, completed.title);
	assert_eq!(note.ai_summary, completed.ai_summary);
	assert_eq!(
		stores.actions_for_note(note_id).len(),
		1,
		"Redelivery must not duplicate action items."
	);
	assert!(stores.queue_entries().iter().all(|entry| entry.acked));
}

#[tokio::test]
async fn jobs_for_deleted_notes_are_skipped() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);

	stores.insert_client(client);

	// The note was never inserted, as if deleted after enqueue.
	let inference = Arc::new(ScriptedInference::new(vec![Ok(model_payload())]));
	let service = build_service(&stores, inference.clone());
	let outcome = service
		.process_delivery(deliver(&stores, job_fixture(&note)))
		.await
		.expect("Expected delivery to succeed.");

	assert_eq!(outcome, JobOutcome::Skipped);
	assert_eq!(inference.calls(), 0);
	assert!(stores.queue_entries().iter().all(|entry| entry.acked));
}
