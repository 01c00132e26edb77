//! Configuration read from the environment.

use keepsake_presentation::domain::pacing::Pacing;
use keepsake_presentation::domain::script::Script;

use crate::error::AppError;

/// Names script YAML file; the built-in script is used when unset.
pub const SCRIPT_VAR: &str = "KEEPSAKE_SCRIPT";
/// Names a pacing YAML file; default pacing is used when unset.
pub const PACING_VAR: &str = "KEEPSAKE_PACING";
/// Multiplies every delay.
pub const TIME_SCALE_VAR: &str = "KEEPSAKE_TIME_SCALE";
/// Denies ambient playback.
pub const MUTE_VAR: &str = "KEEPSAKE_MUTE";
/// Switches log output to JSON.
pub const LOG_JSON_VAR: &str = "KEEPSAKE_LOG_JSON";

/// Everything the binary needs to start a presentation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Presentation content.
    pub script: Script,
    /// Delays, already multiplied by the time scale.
    pub pacing: Pacing,
    /// Whether ambient playback is refused.
    pub mute: bool,
    /// Whether logs are written as JSON.
    pub log_json: bool,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if a variable is invalid or a referenced file
    /// cannot be read or parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if a variable is invalid or a referenced file
    /// cannot be read or parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let script = match lookup(SCRIPT_VAR) {
            Some(path) => Script::from_yaml(&read(path)?)?,
            None => Script::default(),
        };
        let pacing = match lookup(PACING_VAR) {
            Some(path) => Pacing::from_yaml(&read(path)?)?,
            None => Pacing::default(),
        };
        let pacing = match lookup(TIME_SCALE_VAR) {
            Some(raw) => {
                let factor: f64 = raw.trim().parse().map_err(|e| {
                    AppError::Config(format!("{TIME_SCALE_VAR} must be a number: {e}"))
                })?;
                pacing.scaled(factor)?
            }
            None => pacing,
        };

        Ok(Self {
            script,
            pacing,
            mute: is_set(lookup(MUTE_VAR)),
            log_json: is_set(lookup(LOG_JSON_VAR)),
        })
    }
}

fn read(path: String) -> Result<String, AppError> {
    std::fs::read_to_string(&path).map_err(|source| AppError::ReadFile { path, source })
}

/// Flags count as set unless empty, `0` or `false`.
fn is_set(value: Option<String>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim();
        !(v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false"))
    })
}
