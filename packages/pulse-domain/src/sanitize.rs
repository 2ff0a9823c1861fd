//! Note-field sanitization applied before any text reaches a model prompt.
//!
//! The pipeline treats note content as untrusted data. Fields pass through
//! invisible-character stripping, chat-delimiter neutralization, blocked
//! phrase filtering, HTML tag escaping, and a character cap, in that order.

use regex::Regex;

use pulse_config::Sanitizer;

// Zero-width and bidi control characters used to smuggle instructions past
// human review.
const INVISIBLE_CLASS: &str =
	"[\u{200B}-\u{200F}\u{202A}-\u{202E}\u{2060}-\u{2064}\u{FEFF}]";

// Chat-template delimiters a model might interpret as turn boundaries.
const DELIMITER_RULES: &[(&str, &str)] = &[
	(r"(?i)\[/?(?:INST|SYS|SYSTEM)\]", "[tag]"),
	(r"(?i)<<\s*/?\s*SYS\s*>>", "[tag]"),
	(r"(?i)<\|[a-z0-9_-]+\|>", "[token]"),
	(r"(?i)</?\s*(?:system|user|assistant|s)\s*>", "[tag]"),
];

pub fn sanitize_field(text: &str, cfg: &Sanitizer) -> String {
	let text = strip_invisible(text);
	let text = neutralize_delimiters(&text);
	let text = filter_phrases(&text, &cfg.blocked_phrases);
	let text = escape_tags(&text);

	truncate_chars(&text, cfg.max_field_chars as usize)
}

fn strip_invisible(text: &str) -> String {
	Regex::new(INVISIBLE_CLASS)
		.map(|re| re.replace_all(text, "").into_owned())
		.unwrap_or_else(|_| text.to_string())
}

fn neutralize_delimiters(text: &str) -> String {
	let mut out = text.to_string();

	for (pattern, replacement) in DELIMITER_RULES {
		if let Ok(re) = Regex::new(pattern) {
			out = re.replace_all(&out, *replacement).into_owned();
		}
	}

	out
}

fn filter_phrases(text: &str, phrases: &[String]) -> String {
	if phrases.is_empty() {
		return text.to_string();
	}

	let escaped = phrases.iter().map(|phrase| regex::escape(phrase)).collect::<Vec<_>>().join("|");

	Regex::new(&format!("(?i){escaped}"))
		.map(|re| re.replace_all(text, "[filtered]").into_owned())
		.unwrap_or_else(|_| text.to_string())
}

fn escape_tags(text: &str) -> String {
	Regex::new("<([A-Za-z])")
		.map(|re| re.replace_all(text, "&lt;$1").into_owned())
		.unwrap_or_else(|_| text.to_string())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	text.chars().take(max_chars).collect()
}
