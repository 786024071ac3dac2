//! Orakel Server – Einstiegspunkt
//!
//! Wertet die Kommandozeile aus, laedt die Konfiguration, initialisiert das
//! Logging und startet den Server.

use anyhow::Result;
use orakel_server::config::{KonfigQuelle, ServerConfig};
use orakel_server::{Server, cli};

/// Umgebungsvariable fuer den Konfigurationspfad
const ENV_CONFIG: &str = "ORAKEL_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Pflicht-Flags zuerst, vor jedem Bind
    let argumente = match cli::auswerten(std::env::args_os()) {
        Ok(argumente) => argumente,
        Err(fehler) => {
            fehler.ausgeben();
            std::process::exit(fehler.exit_code());
        }
    };

    let config_pfad = argumente
        .config
        .as_ref()
        .map(|pfad| pfad.to_string_lossy().into_owned())
        .or_else(|| std::env::var(ENV_CONFIG).ok())
        .unwrap_or_else(|| "orakel.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let (config, quelle) = ServerConfig::laden(&config_pfad)?;
    let config = config.cli_anwenden(&argumente);

    orakel_observability::logging_initialisieren(&config.logging.level, &config.logging.format);

    if quelle == KonfigQuelle::Standardwerte {
        tracing::warn!(
            pfad = %config_pfad,
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Orakel Server wird initialisiert"
    );

    let server = Server::aus_konfig(config)?;
    server.starten().await?;

    Ok(())
}
