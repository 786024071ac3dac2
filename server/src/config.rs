//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Kommandozeilen-Flags ueberschreiben die Datei.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::StartArgumente;

/// Umgebungsvariable fuer die Wolfram-Alpha-App-ID
pub const ENV_APP_ID: &str = "WOLFRAM_APPID";

/// Herkunft einer geladenen Konfiguration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KonfigQuelle {
    Datei,
    /// Datei fehlte, alle Werte sind Standardwerte
    Standardwerte,
}

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub netzwerk: NetzwerkEinstellungen,
    pub sicherheit: SicherheitsEinstellungen,
    pub antwort: AntwortEinstellungen,
    pub sprache: SprachEinstellungen,
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Host, `0.0.0.0` (alle Interfaces) oder z.B. `localhost`
    pub bind_adresse: String,
    pub port: u16,
    /// Maximale Anzahl wartender Verbindungen in der OS-Queue
    pub backlog: u32,
    /// Maximale Anzahl Bytes die pro Verbindung gelesen werden
    pub puffer_groesse: usize,
    /// 1 = streng seriell, weitere Clients warten im Backlog
    pub max_parallele_sitzungen: usize,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 9000,
            backlog: 5,
            puffer_groesse: 4096,
            max_parallele_sitzungen: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SicherheitsEinstellungen {
    /// Umschlaege mit falscher Pruefsumme ablehnen statt nur zu protokollieren
    pub pruefsumme_erzwingen: bool,
}

/// Wolfram-Alpha-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AntwortEinstellungen {
    /// App-ID (leer = aus `WOLFRAM_APPID`)
    pub app_id: Option<String>,
    pub api_url: String,
    /// Zeitlimit pro Abfrage in Sekunden (leer = unbegrenzt)
    pub timeout_secs: Option<u64>,
}

impl Default for AntwortEinstellungen {
    fn default() -> Self {
        Self {
            app_id: None,
            api_url: orakel_antwort::wolfram::STANDARD_API_URL.into(),
            timeout_secs: None,
        }
    }
}

/// Art der Sprachausgabe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprachModus {
    /// Nur protokollieren
    Stumm,
    /// Google TTS + Player
    #[default]
    Google,
    /// Lokales Programm, Text als letztes Argument
    Kommando,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SprachEinstellungen {
    pub modus: SprachModus,
    /// Sprachcode fuer Google TTS
    pub sprache: String,
    pub player: String,
    pub datei: PathBuf,
    /// Programm + Argumente fuer `modus = "kommando"`
    pub kommando: Vec<String>,
}

impl Default for SprachEinstellungen {
    fn default() -> Self {
        Self {
            modus: SprachModus::Google,
            sprache: "en".into(),
            player: "mplayer".into(),
            datei: PathBuf::from("./saythis.mp3"),
            kommando: vec!["espeak".into()],
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    ///
    /// Laeuft vor der Logging-Initialisierung; der Aufrufer meldet
    /// [`KonfigQuelle::Standardwerte`] selbst.
    pub fn laden(pfad: &str) -> anyhow::Result<(Self, KonfigQuelle)> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok((config, KonfigQuelle::Datei))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok((Self::default(), KonfigQuelle::Standardwerte))
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Uebernimmt die Werte der Kommandozeile
    pub fn cli_anwenden(mut self, argumente: &StartArgumente) -> Self {
        self.netzwerk.port = argumente.port;
        self.netzwerk.backlog = argumente.backlog;
        self.netzwerk.puffer_groesse = argumente.puffer_groesse;
        if let Some(host) = &argumente.host {
            self.netzwerk.bind_adresse = host.clone();
        }
        self
    }

    /// Gibt die vollstaendige Bind-Adresse zurueck
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    /// App-ID aus der Datei, sonst aus der Umgebung
    pub fn app_id(&self) -> Option<String> {
        self.antwort
            .app_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| std::env::var(ENV_APP_ID).ok().filter(|id| !id.is_empty()))
    }

    pub fn antwort_timeout(&self) -> Option<Duration> {
        self.antwort.timeout_secs.map(Duration::from_secs)
    }
}
