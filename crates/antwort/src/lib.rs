//! orakel-antwort – Beantwortet entschluesselte Fragen
//!
//! Eine [`AntwortQuelle`] liefert immer einen Text. Scheitert die Abfrage,
//! wird daraus eine feste Entschuldigung ([`entschuldigung`]); Fehler
//! erreichen den Client nie.

pub mod error;
pub mod wolfram;

use async_trait::async_trait;

pub use error::AbfrageFehler;
pub use wolfram::{WolframAlpha, WolframKonfig};

/// Text rein, Text raus
///
/// Die Latenz ist unbegrenzt, sofern die Implementierung kein eigenes
/// Zeitlimit setzt.
#[async_trait]
pub trait AntwortQuelle: Send + Sync {
    async fn abfragen(&self, frage: &str) -> String;
}

/// Antworttext wenn keine Antwort gefunden wurde
pub fn entschuldigung(frage: &str) -> String {
    format!(
        "Wolfram Alpha was unable to find an answer for {frage}. Please try something else."
    )
}
