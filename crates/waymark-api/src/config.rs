//! Server configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use waymark_core::model::VoiceId;
use waymark_overlay::domain::settings::TourSettings;

use crate::error::AppError;

/// Settings for the API binary.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` URL for the flag store. In-memory flags when unset.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    /// YAML template document to load into the registry.
    pub templates_path: Option<PathBuf>,
    /// Defaults applied to every tour session.
    pub tour: TourSettings,
}

impl ApiConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut tour = TourSettings::default();

        if let Some(secs) = lookup("WAYMARK_DWELL_SECS") {
            tour.dwell = parse_secs("WAYMARK_DWELL_SECS", &secs)?;
        }
        if let Some(secs) = lookup("WAYMARK_NARRATION_TIMEOUT_SECS") {
            tour.synthesis_timeout = parse_secs("WAYMARK_NARRATION_TIMEOUT_SECS", &secs)?;
        }
        if let Some(flag) = lookup("WAYMARK_AUTO_ADVANCE") {
            tour.auto_advance = parse_bool("WAYMARK_AUTO_ADVANCE", &flag)?;
        }
        if let Some(voice) = lookup("WAYMARK_VOICE").filter(|v| !v.trim().is_empty()) {
            tour.voice = VoiceId::new(voice.trim());
        }

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            templates_path: lookup("WAYMARK_TEMPLATES").map(PathBuf::from),
            tour,
        })
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration, AppError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{name} must be a whole number of seconds: {e}")))?;
    if secs == 0 {
        return Err(AppError::Config(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!("{name} must be a boolean, got `{other}`"))),
    }
}
