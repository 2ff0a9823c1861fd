use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use pulse_domain::records::{
	ActionItem, ActionOwner, ActionStatus, AiStatus, HealthStatus, HealthTrend,
};

use super::{MemoryStores, StubInference, build_service, client_fixture, note_fixture};

fn overdue_action(tenant_id: &str, client_id: Uuid, days_overdue: i64) -> ActionItem {
	let now = OffsetDateTime::now_utc();

	ActionItem {
		action_id: Uuid::new_v4(),
		tenant_id: tenant_id.to_string(),
		client_id,
		note_id: None,
		description: "Follow up on open request".to_string(),
		owner: ActionOwner::Me,
		due_date: Some(now.date() - Duration::days(days_overdue)),
		status: ActionStatus::Open,
		created_at: now,
	}
}

fn service_for(stores: &MemoryStores) -> pulse_service::PulseService {
	build_service(stores, Arc::new(StubInference { payload: String::new() }))
}

#[tokio::test]
async fn stale_contact_and_overdue_commitments_score_watch() {
	let stores = MemoryStores::new();
	let mut client = client_fixture("t1", "Acme Corp");
	let now = OffsetDateTime::now_utc();

	client.last_contact_at = Some(now - Duration::days(25));

	let client_id = client.client_id;

	stores.insert_client(client);
	stores.insert_action(overdue_action("t1", client_id, 3));
	stores.insert_action(overdue_action("t1", client_id, 10));

	let service = service_for(&stores);

	service
		.refresh_client_health("t1", client_id, now)
		.await
		.expect("Expected health refresh to succeed.");

	let client = stores.client(client_id).expect("Client must exist.");

	// 100 - 25 for the contact gap, - 20 for two overdue commitments.
	assert_eq!(client.health_score, 55);
	assert_eq!(client.health_status, HealthStatus::Watch);
	assert_eq!(client.health_trend, HealthTrend::Stable);
	assert_eq!(client.health_updated_at, Some(now));

	let types = client
		.health_signals
		.iter()
		.map(|signal| signal.signal_type.as_str())
		.collect::<Vec<_>>();

	assert_eq!(types, ["contact_gap", "overdue_commitments"]);
}

#[tokio::test]
async fn spread_out_risk_signals_stay_healthy_but_declining() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let client_id = client.client_id;
	let now = OffsetDateTime::now_utc();

	stores.insert_client(client);

	for day in 0..4 {
		let mut note = note_fixture("t1", client_id);

		note.meeting_date = (now - Duration::days(day * 2)).date();
		note.ai_status = AiStatus::Completed;
		note.ai_risk_signals = vec!["Budget pressure mentioned".to_string()];
		note.mood = None;

		stores.insert_note(note);
	}

	let service = service_for(&stores);

	service
		.refresh_client_health("t1", client_id, now)
		.await
		.expect("Expected health refresh to succeed.");

	let client = stores.client(client_id).expect("Client must exist.");

	assert_eq!(client.health_score, 75);
	assert_eq!(client.health_status, HealthStatus::Healthy);
	assert_eq!(client.health_trend, HealthTrend::Declining);
}

#[tokio::test]
async fn notes_outside_the_window_do_not_count() {
	let stores = MemoryStores::new();
	let client = client_fixture("t1", "Acme Corp");
	let client_id = client.client_id;
	let now = OffsetDateTime::now_utc();

	stores.insert_client(client);

	let mut note = note_fixture("t1", client_id);

	note.meeting_date = (now - Duration::days(45)).date();
	note.ai_status = AiStatus::Completed;
	note.ai_risk_signals = vec!["Old concern".to_string(); 4];
	note.concerns = "Unhappy with support".to_string();

	stores.insert_note(note);

	let service = service_for(&stores);

	service
		.refresh_client_health("t1", client_id, now)
		.await
		.expect("Expected health refresh to succeed.");

	let client = stores.client(client_id).expect("Client must exist.");

	assert_eq!(client.health_score, 100);
	assert!(client.health_signals.is_empty());
}

#[tokio::test]
async fn sweep_recomputes_every_client() {
	let stores = MemoryStores::new();
	let healthy = client_fixture("t1", "Acme Corp");
	let mut quiet = client_fixture("t1", "Globex");
	let now = OffsetDateTime::now_utc();

	quiet.last_contact_at = Some(now - Duration::days(30));

	let healthy_id = healthy.client_id;
	let quiet_id = quiet.client_id;

	stores.insert_client(healthy);
	stores.insert_client(quiet);

	let service = service_for(&stores);

	service.run_health_sweep(now).await.expect("Expected sweep to succeed.");

	let healthy = stores.client(healthy_id).expect("Client must exist.");
	let quiet = stores.client(quiet_id).expect("Client must exist.");

	assert_eq!(healthy.health_updated_at, Some(now));
	assert_eq!(healthy.health_score, 100);
	assert_eq!(quiet.health_updated_at, Some(now));
	assert_eq!(quiet.health_score, 75);
	assert_eq!(quiet.health_status, HealthStatus::Healthy);
	assert_eq!(quiet.health_signals[0].title, "Needs check-in");
}
