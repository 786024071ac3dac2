//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Ungueltiger Schluessel: {0}")]
    UngueltigerSchluessel(String),

    #[error("Schluessel-Generierung fehlgeschlagen")]
    SchluesselGenerierung,

    #[error("Entschluesselung fehlgeschlagen: {0}")]
    Entschluesselung(String),

    #[error("Klartext ist kein gueltiges UTF-8: {0}")]
    KeinText(#[from] std::str::Utf8Error),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
