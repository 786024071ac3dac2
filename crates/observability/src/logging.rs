//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Konfigdatei):
//! - `ORAKEL_LOG_LEVEL`: EnvFilter-Direktive, z.B. `debug` oder `orakel_server=trace`
//! - `ORAKEL_LOG_FORMAT`: `text` oder `json`

use std::str::FromStr;

use tracing_subscriber::{EnvFilter, fmt};

pub const ENV_LOG_LEVEL: &str = "ORAKEL_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "ORAKEL_LOG_FORMAT";

/// Ausgabeformat der Logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("Unbekanntes Log-Format: '{other}'")),
        }
    }
}

/// Waehlt das Format: Umgebung vor Konfiguration, unbekannte Werte -> Text
pub fn format_bestimmen(aus_env: Option<&str>, aus_konfig: &str) -> LogFormat {
    aus_env
        .unwrap_or(aus_konfig)
        .parse()
        .unwrap_or_default()
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Level aus der Konfiguration, ungueltige Werte werden zu `info`
pub fn level_oder_standard(level: &str) -> &str {
    if log_level_gueltig(level) { level } else { "info" }
}

/// Initialisiert das Logging-System.
///
/// `ORAKEL_LOG_LEVEL` darf eine beliebige Filter-Direktive sein. Ein
/// ungueltiges `level` aus der Konfiguration wird nach der Initialisierung
/// gemeldet und durch `info` ersetzt.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .unwrap_or_else(|_| EnvFilter::new(level_oder_standard(level)));

    let format_env = std::env::var(ENV_LOG_FORMAT).ok();

    match format_bestimmen(format_env.as_deref(), format) {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .init();
        }
        LogFormat::Text => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }

    if !log_level_gueltig(level) {
        tracing::warn!(level = %level, "Ungueltiges Log-Level in der Konfiguration, verwende info");
    }
}
