//! Fehler bei der Abfrage – werden intern in eine Entschuldigung umgewandelt

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbfrageFehler {
    #[error("Keine App-ID konfiguriert")]
    KeineAppId,

    #[error("HTTP-Fehler: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Abfrage nicht erfolgreich")]
    NichtErfolgreich,

    #[error("Kein Ergebnis-Pod in der Antwort")]
    KeinErgebnis,
}
