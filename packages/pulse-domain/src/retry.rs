//! Retry policy for failed pipeline attempts.

use time::Duration;

use crate::records::ProviderKind;

/// Attempts 1-3 run on the primary provider, attempts 4-7 on the fallback.
/// A failure on attempt 7 is terminal.
pub const MAX_ATTEMPTS: i32 = 7;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryDecision {
	Retry { attempt: i32, provider: ProviderKind, delay: Duration },
	GiveUp,
}

/// Decides what follows a failure on the given attempt. The provider for the
/// next attempt is fixed by the attempt number alone: primary backs off
/// exponentially, then the schedule switches to the fallback with short,
/// mostly flat delays.
pub fn next_retry(attempt: i32) -> RetryDecision {
	let (provider, delay) = match attempt {
		1 => (ProviderKind::Primary, Duration::minutes(2)),
		2 => (ProviderKind::Primary, Duration::minutes(4)),
		3 => (ProviderKind::Fallback, Duration::seconds(30)),
		4 => (ProviderKind::Fallback, Duration::seconds(30)),
		5 => (ProviderKind::Fallback, Duration::seconds(60)),
		6 => (ProviderKind::Fallback, Duration::seconds(120)),
		_ => return RetryDecision::GiveUp,
	};

	RetryDecision::Retry { attempt: attempt + 1, provider, delay }
}
