//! Fehlertypen fuer die Sprachausgabe

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Sprachsynthese fehlgeschlagen: {0}")]
    Synthese(#[from] reqwest::Error),

    #[error("Audiodatei nicht schreibbar: {0}")]
    Datei(std::io::Error),

    #[error("Programm '{programm}' konnte nicht gestartet werden: {fehler}")]
    Start {
        programm: String,
        fehler: std::io::Error,
    },

    #[error("Programm '{programm}' endete mit {status}")]
    Wiedergabe { programm: String, status: String },
}

pub type SpeechResult<T> = Result<T, SpeechError>;
