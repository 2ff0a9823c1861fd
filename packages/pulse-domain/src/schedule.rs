//! Due-date resolution for extracted action items.

use time::{Date, Duration};

use crate::records::DueHint;

/// Resolves a coarse due hint against the processing date. Weeks end on
/// Sunday, so "this week" lands on the upcoming Sunday and "next week" is a
/// flat seven days out.
pub fn resolve_due_date(hint: DueHint, today: Date) -> Option<Date> {
	match hint {
		DueHint::Today => Some(today),
		DueHint::ThisWeek => {
			let days_left = 6 - i64::from(today.weekday().number_days_from_monday());

			today.checked_add(Duration::days(days_left))
		},
		DueHint::NextWeek => today.checked_add(Duration::days(7)),
		DueHint::NoSpecificDate => None,
	}
}
