//! Deterministic relationship health scoring.
//!
//! Scoring starts at 100 and applies six independent deductions over a
//! recent-notes window: contact gap, overdue commitments, average sentiment,
//! accumulated risk signals, negative meeting moods, and concern mentions.

use serde::{Deserialize, Serialize};

use crate::records::{HealthSignal, HealthStatus, HealthTrend, Severity};

const NEGATIVE_MOODS: &[&str] = &["concerned", "frustrated", "negative"];

/// Per-note factors distilled from one recent note.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NoteFactors {
	pub sentiment: Option<f32>,
	pub risk_signal_count: u32,
	pub mood: Option<String>,
	pub has_concerns: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HealthInputs {
	pub days_since_contact: Option<i64>,
	pub overdue_commitments: u32,
	pub notes: Vec<NoteFactors>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HealthReport {
	pub score: i32,
	pub status: HealthStatus,
	pub trend: HealthTrend,
	pub signals: Vec<HealthSignal>,
}

pub fn score_health(inputs: &HealthInputs) -> HealthReport {
	let mut score = 100i32;
	let mut signals = Vec::new();

	if let Some(days) = inputs.days_since_contact {
		if days > 21 {
			score -= 25;
			signals.push(HealthSignal {
				signal_type: "contact_gap".to_string(),
				severity: Severity::High,
				title: "Needs check-in".to_string(),
				description: format!("No contact in {days} days."),
			});
		} else if days > 14 {
			score -= 10;
			signals.push(HealthSignal {
				signal_type: "contact_gap".to_string(),
				severity: Severity::Medium,
				title: "Getting quiet".to_string(),
				description: format!("No contact in {days} days."),
			});
		}
	}

	if inputs.overdue_commitments > 0 {
		let deduction = (inputs.overdue_commitments * 10).min(30) as i32;

		score -= deduction;
		signals.push(HealthSignal {
			signal_type: "overdue_commitments".to_string(),
			severity: if inputs.overdue_commitments >= 3 { Severity::High } else { Severity::Medium },
			title: "Overdue commitments".to_string(),
			description: format!(
				"{} overdue commitment(s) owed to this client.",
				inputs.overdue_commitments
			),
		});
	}

	let sentiments =
		inputs.notes.iter().filter_map(|note| note.sentiment).collect::<Vec<_>>();
	let avg_sentiment = if sentiments.is_empty() {
		None
	} else {
		Some(sentiments.iter().sum::<f32>() / sentiments.len() as f32)
	};

	if let Some(avg) = avg_sentiment {
		if avg < -0.3 {
			score -= 20;
			signals.push(HealthSignal {
				signal_type: "sentiment".to_string(),
				severity: Severity::High,
				title: "Negative sentiment".to_string(),
				description: format!("Average sentiment across recent notes is {avg:.2}."),
			});
		} else if avg < -0.1 {
			score -= 10;
			signals.push(HealthSignal {
				signal_type: "sentiment".to_string(),
				severity: Severity::Medium,
				title: "Negative sentiment".to_string(),
				description: format!("Average sentiment across recent notes is {avg:.2}."),
			});
		}
	}

	let risk_count = inputs.notes.iter().map(|note| note.risk_signal_count).sum::<u32>();

	if risk_count >= 1 {
		let (deduction, severity) = match risk_count {
			1 => (8, Severity::Low),
			2..=3 => (15, Severity::Medium),
			_ => (25, Severity::High),
		};

		score -= deduction;
		signals.push(HealthSignal {
			signal_type: "risk_signals".to_string(),
			severity,
			title: "Risk signals detected".to_string(),
			description: format!("{risk_count} risk signal(s) across recent notes."),
		});
	}

	let negative_moods = inputs
		.notes
		.iter()
		.filter(|note| {
			note.mood
				.as_deref()
				.is_some_and(|mood| NEGATIVE_MOODS.contains(&mood.trim().to_lowercase().as_str()))
		})
		.count() as u32;

	if negative_moods >= 1 {
		let (deduction, severity) =
			if negative_moods >= 2 { (15, Severity::High) } else { (8, Severity::Medium) };

		score -= deduction;
		signals.push(HealthSignal {
			signal_type: "mood".to_string(),
			severity,
			title: "Negative meeting mood".to_string(),
			description: format!("{negative_moods} recent note(s) recorded a negative mood."),
		});
	}

	let concern_notes = inputs.notes.iter().filter(|note| note.has_concerns).count() as u32;

	if concern_notes >= 1 {
		let (deduction, severity) =
			if concern_notes >= 2 { (12, Severity::High) } else { (6, Severity::Medium) };

		score -= deduction;
		signals.push(HealthSignal {
			signal_type: "concerns".to_string(),
			severity,
			title: "Concerns raised".to_string(),
			description: format!("{concern_notes} recent note(s) raised concerns."),
		});
	}

	let score = score.clamp(0, 100);

	HealthReport {
		score,
		status: HealthStatus::for_score(score),
		trend: trend_for(avg_sentiment, risk_count, negative_moods),
		signals,
	}
}

fn trend_for(avg_sentiment: Option<f32>, risk_count: u32, negative_moods: u32) -> HealthTrend {
	let avg = avg_sentiment.unwrap_or(0.0);

	if avg > 0.3 && risk_count == 0 {
		HealthTrend::Improving
	} else if avg < -0.2 || risk_count >= 3 || negative_moods >= 2 {
		HealthTrend::Declining
	} else {
		HealthTrend::Stable
	}
}
