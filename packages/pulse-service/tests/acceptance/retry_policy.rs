use std::sync::Arc;

use color_eyre::eyre;
use time::Duration;

use pulse_domain::records::{AiStatus, ProviderKind};
use pulse_service::{JobOutcome, PulseService};

use super::{
	BrokenNoteStore, MemoryStores, ScriptedInference, StubInference, build_service, client_fixture,
	deliver, job_fixture, note_fixture, test_config,
};

#[tokio::test]
async fn first_failure_schedules_a_primary_retry() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);
	let note_id = note.note_id;

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let inference =
		Arc::new(ScriptedInference::new(vec![Err(eyre::eyre!("upstream timed out"))]));
	let service = build_service(&stores, inference);
	let outcome = service
		.process_delivery(deliver(&stores, job_fixture(&note)))
		.await
		.expect("Expected failure handling to succeed.");

	assert_eq!(
		outcome,
		JobOutcome::Retried {
			attempt: 2,
			provider: ProviderKind::Primary,
			delay: Duration::minutes(2)
		}
	);

	let note = stores.note(note_id).expect("Note must exist.");

	assert_eq!(note.ai_status, AiStatus::Pending);
	assert!(
		note.ai_error.as_deref().is_some_and(|err| err.contains("upstream timed out")),
		"Unexpected error: {:?}",
		note.ai_error
	);

	let entries = stores.queue_entries();
	let requeued = entries
		.iter()
		.find(|entry| !entry.acked)
		.expect("A follow-up job must be queued.");

	assert_eq!(requeued.job.attempt, 2);
	assert_eq!(requeued.job.provider, ProviderKind::Primary);
}

#[tokio::test]
async fn third_failure_switches_to_the_fallback_provider() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let inference = Arc::new(ScriptedInference::new(vec![Err(eyre::eyre!("still down"))]));
	let service = build_service(&stores, inference.clone());
	let mut job = job_fixture(&note);

	job.attempt = 3;

	let outcome = service
		.process_delivery(deliver(&stores, job))
		.await
		.expect("Expected failure handling to succeed.");

	assert_eq!(
		outcome,
		JobOutcome::Retried {
			attempt: 4,
			provider: ProviderKind::Fallback,
			delay: Duration::seconds(30)
		}
	);
	// The switch applies to the follow-up job; attempt 3 itself still runs
	// on the primary backend.
	assert_eq!(
		*inference.providers.lock().expect("Provider log must be available."),
		vec!["primary-test".to_string()]
	);
}

#[tokio::test]
async fn seventh_failure_is_terminal() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);
	let note_id = note.note_id;

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let inference =
		Arc::new(ScriptedInference::new(vec![Err(eyre::eyre!("provider unreachable"))]));
	let service = build_service(&stores, inference.clone());
	let mut job = job_fixture(&note);

	job.attempt = 7;
	job.provider = ProviderKind::Fallback;

	let outcome = service
		.process_delivery(deliver(&stores, job))
		.await
		.expect("Expected failure handling to succeed.");

	assert_eq!(outcome, JobOutcome::Failed);
	assert_eq!(
		*inference.providers.lock().expect("Provider log must be available."),
		vec!["fallback-test".to_string()]
	);

	let note = stores.note(note_id).expect("Note must exist.");

	assert_eq!(note.ai_status, AiStatus::Failed);
	assert!(
		note.ai_error.as_deref().is_some_and(|err| err.contains("provider unreachable")),
		"Unexpected error: {:?}",
		note.ai_error
	);
	assert!(
		stores.queue_entries().iter().all(|entry| entry.acked),
		"A terminal failure must not requeue."
	);
}

#[tokio::test]
async fn storage_failures_enter_the_retry_schedule() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);
	let note_id = note.note_id;

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let inference = Arc::new(ScriptedInference::new(Vec::new()));
	let mut bundle = stores.stores();

	bundle.notes = Arc::new(BrokenNoteStore { inner: stores.clone() });

	let service = PulseService::with_inference(test_config(), bundle, inference.clone());
	let outcome = service
		.process_delivery(deliver(&stores, job_fixture(&note)))
		.await
		.expect("Expected failure handling to succeed.");

	assert_eq!(
		outcome,
		JobOutcome::Retried {
			attempt: 2,
			provider: ProviderKind::Primary,
			delay: Duration::minutes(2)
		}
	);
	assert_eq!(inference.calls(), 0, "The pipeline must not run past a broken store.");

	let note = stores.note(note_id).expect("Note must exist.");

	assert_eq!(note.ai_status, AiStatus::Pending);
	assert!(
		note.ai_error.as_deref().is_some_and(|err| err.contains("connection reset")),
		"Unexpected error: {:?}",
		note.ai_error
	);

	let entries = stores.queue_entries();
	let requeued = entries
		.iter()
		.find(|entry| !entry.acked)
		.expect("A follow-up job must be queued.");

	assert_eq!(requeued.job.attempt, 2);
	assert_eq!(requeued.job.provider, ProviderKind::Primary);
	assert!(
		entries.iter().filter(|entry| entry.acked).count() == 1,
		"The original delivery must be acknowledged."
	);
}

#[tokio::test]
async fn unparseable_model_output_is_retried_not_failed() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);
	let note_id = note.note_id;

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let service = build_service(
		&stores,
		Arc::new(StubInference { payload: "I cannot produce structured output.".to_string() }),
	);
	let outcome = service
		.process_delivery(deliver(&stores, job_fixture(&note)))
		.await
		.expect("Expected failure handling to succeed.");

	assert!(
		matches!(outcome, JobOutcome::Retried { attempt: 2, .. }),
		"Unexpected outcome: {outcome:?}"
	);

	let note = stores.note(note_id).expect("Note must exist.");

	assert_eq!(note.ai_status, AiStatus::Pending);
	assert!(
		note.ai_error.as_deref().is_some_and(|err| err.contains("No JSON object")),
		"Unexpected error: {:?}",
		note.ai_error
	);
}
