//! Fehlertypen fuer den Orakel-Server

use orakel_crypto::CryptoError;
use orakel_protocol::{FehlerMeldung, ProtokollFehler};
use thiserror::Error;

/// Alles, woran eine einzelne Sitzung scheitern kann
///
/// Keiner dieser Fehler beendet die Accept-Loop; die Verbindung wird
/// geschlossen und der naechste Client bedient.
#[derive(Debug, Error)]
pub enum SitzungsFehler {
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Umschlag nicht dekodierbar: {0}")]
    Protokoll(#[from] ProtokollFehler),

    #[error("Client sendete einen Fehler-Frame statt eines Umschlags")]
    UnerwarteteNachricht,

    #[error("Pruefsumme ungueltig")]
    Integritaet,

    #[error("Kryptografie-Fehler: {0}")]
    Crypto(#[from] CryptoError),
}

pub type SitzungsResult<T> = Result<T, SitzungsFehler>;

impl SitzungsFehler {
    /// Fehler-Code fuer FEHLER-Frames
    pub fn fehler_code(&self) -> u16 {
        match self {
            Self::Protokoll(_) => 1005,
            Self::UnerwarteteNachricht => 1006,
            Self::Integritaet => 1010,
            Self::Crypto(_) => 1020,
            Self::Io(_) => 5001,
        }
    }

    /// Fehler als Meldung fuer den Client
    pub fn als_meldung(&self) -> FehlerMeldung {
        FehlerMeldung::neu(self.fehler_code(), self.to_string())
    }
}
