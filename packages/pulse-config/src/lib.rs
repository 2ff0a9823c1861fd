mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, InferenceProviderConfig, Insights, Postgres, Providers, Sanitizer, Service, Storage,
	Worker, default_blocked_phrases,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation { message: "service.log_level must be non-empty.".to_string() });
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, provider) in
		[("primary", &cfg.providers.primary), ("fallback", &cfg.providers.fallback)]
	{
		if provider.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if provider.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_key must be non-empty."),
			});
		}
		if provider.model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.model must be non-empty."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
		if !provider.temperature.is_finite() || provider.temperature < 0.0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be zero or greater."),
			});
		}
	}

	if cfg.sanitizer.max_field_chars == 0 {
		return Err(Error::Validation {
			message: "sanitizer.max_field_chars must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("insights.max_title_chars", cfg.insights.max_title_chars),
		("insights.max_summary_chars", cfg.insights.max_summary_chars),
		("insights.max_action_items", cfg.insights.max_action_items),
		("insights.max_action_chars", cfg.insights.max_action_chars),
		("insights.max_list_items", cfg.insights.max_list_items),
		("insights.max_signal_chars", cfg.insights.max_signal_chars),
		("insights.max_insight_chars", cfg.insights.max_insight_chars),
		("insights.max_topics", cfg.insights.max_topics),
		("insights.max_topic_chars", cfg.insights.max_topic_chars),
		("insights.max_style_chars", cfg.insights.max_style_chars),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.worker.poll_interval_ms == 0 {
		return Err(Error::Validation {
			message: "worker.poll_interval_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.worker.lease_seconds == 0 {
		return Err(Error::Validation {
			message: "worker.lease_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.worker.sweep_interval_seconds == 0 {
		return Err(Error::Validation {
			message: "worker.sweep_interval_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.sanitizer.blocked_phrases.retain(|phrase| !phrase.trim().is_empty());

	for provider in [&mut cfg.providers.primary, &mut cfg.providers.fallback] {
		while provider.api_base.ends_with('/') {
			provider.api_base.pop();
		}
	}
}
