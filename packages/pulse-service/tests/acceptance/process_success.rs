use std::sync::Arc;

use time::OffsetDateTime;

use pulse_domain::records::{ActionOwner, ActionStatus, AiStatus, HealthTrend};
use pulse_service::JobOutcome;

use super::{
	MemoryStores, ScriptedInference, build_service, client_fixture, deliver, job_fixture,
	model_payload, note_fixture,
};

#[tokio::test]
async fn completes_a_pending_note_end_to_end() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let note = note_fixture("t1", client.client_id);
	let client_id = client.client_id;
	let note_id = note.note_id;
	let meeting_date = note.meeting_date;

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let inference = Arc::new(ScriptedInference::new(vec![Ok(model_payload())]));
	let service = build_service(&stores, inference.clone());
	let outcome = service
		.process_delivery(deliver(&stores, job_fixture(&note)))
		.await
		.expect("Expected processing to succeed.");

	assert_eq!(outcome, JobOutcome::Completed);
	assert_eq!(inference.calls(), 1);

	let note = stores.note(note_id).expect("Note must exist.");

	assert_eq!(note.ai_status, AiStatus::Completed);
	assert_eq!(note.title, "Quarterly check-in");
	assert_eq!(note.ai_summary.as_deref(), Some("Client is happy with the rollout."));
	assert_eq!(note.ai_topics, vec!["rollout".to_string()]);
	assert_eq!(note.ai_sentiment_score, Some(0.6));
	assert_eq!(note.ai_communication_style.as_deref(), Some("direct and upbeat"));
	assert_eq!(note.ai_error, None);

	let actions = stores.actions_for_note(note_id);

	assert_eq!(actions.len(), 1);
	assert_eq!(actions[0].description, "Send the renewal proposal");
	assert_eq!(actions[0].owner, ActionOwner::Me);
	assert_eq!(actions[0].status, ActionStatus::Open);
	assert!(actions[0].due_date.is_some(), "A this-week hint must resolve to a date.");

	let client = stores.client(client_id).expect("Client must exist.");

	assert_eq!(client.last_contact_at, Some(meeting_date.midnight().assume_utc()));
	assert!(client.health_updated_at.is_some());
	assert_eq!(client.health_score, 100);
	assert_eq!(client.health_trend, HealthTrend::Improving);

	let prompts = inference.prompts.lock().expect("Prompt log must be available.");

	assert!(prompts[0].contains("Client: Acme Corp"));
	assert!(prompts[0].contains("--- NOTE START ---"));

	let entries = stores.queue_entries();

	assert_eq!(entries.len(), 1);
	assert!(entries[0].acked, "The delivery must be acknowledged.");
}

#[tokio::test]
async fn user_supplied_titles_are_preserved() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let mut note = note_fixture("t1", client.client_id);

	note.title = "My own title".to_string();
	note.has_user_title = true;

	let note_id = note.note_id;

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let service =
		build_service(&stores, Arc::new(ScriptedInference::new(vec![Ok(model_payload())])));
	let outcome = service
		.process_delivery(deliver(&stores, job_fixture(&note)))
		.await
		.expect("Expected processing to succeed.");

	assert_eq!(outcome, JobOutcome::Completed);

	let note = stores.note(note_id).expect("Note must exist.");

	assert_eq!(note.title, "My own title");
	assert_eq!(note.ai_summary.as_deref(), Some("Client is happy with the rollout."));
}

#[tokio::test]
async fn completion_does_not_move_last_contact_backward() {
	let stores = MemoryStores::new();
	let mut client = client_fixture("t1", "Acme Corp");
	let later = OffsetDateTime::now_utc() + time::Duration::days(2);

	client.last_contact_at = Some(later);

	let client_id = client.client_id;
	let note = note_fixture("t1", client.client_id);

	stores.insert_client(client);
	stores.insert_note(note.clone());

	let service =
		build_service(&stores, Arc::new(ScriptedInference::new(vec![Ok(model_payload())])));

	service
		.process_delivery(deliver(&stores, job_fixture(&note)))
		.await
		.expect("Expected processing to succeed.");

	let client = stores.client(client_id).expect("Client must exist.");

	assert_eq!(client.last_contact_at, Some(later));
}
