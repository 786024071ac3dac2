//! Fehlertypen fuer das Wire-Format

use thiserror::Error;

/// Fehler beim Kodieren oder Dekodieren eines Frames
#[derive(Debug, Error)]
pub enum ProtokollFehler {
    #[error("Frame unvollstaendig: erwartet {erwartet} Bytes, erhalten {erhalten}")]
    Unvollstaendig { erwartet: usize, erhalten: usize },

    #[error("Frame zu gross: {laenge} Bytes (Maximum: {maximum} Bytes)")]
    ZuGross { laenge: usize, maximum: usize },

    #[error("Protokollversion nicht unterstuetzt: erwartet={erwartet}, erhalten={erhalten}")]
    Version { erwartet: u8, erhalten: u8 },

    #[error("Unbekannter Frame-Typ: {0:#04x}")]
    UnbekannterTyp(u8),

    #[error("Feld '{feld}' ist abgeschnitten")]
    FeldAbgeschnitten { feld: &'static str },

    #[error("{0} ueberzaehlige Bytes nach dem Frame")]
    UeberzaehligeBytes(usize),

    #[error("Fehlertext ist kein gueltiges UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProtokollResult<T> = Result<T, ProtokollFehler>;
