//! orakel-sprache – Sprachausgabe als austauschbare Faehigkeit
//!
//! Der Server spricht jede empfangene Frage aus. Wie das geschieht
//! (Google TTS + Player, lokales Kommando, gar nicht) entscheidet die
//! injizierte [`Sprecher`]-Implementierung.

pub mod error;
pub mod google;
pub mod kommando;

use async_trait::async_trait;

pub use error::{SpeechError, SpeechResult};
pub use google::{GoogleTts, GoogleTtsKonfig};
pub use kommando::KommandoSprecher;

/// Spricht einen Text aus
#[async_trait]
pub trait Sprecher: Send + Sync {
    async fn sagen(&self, text: &str) -> SpeechResult<()>;
}

/// Sprecher ohne Audio-Ausgabe, protokolliert nur
#[derive(Debug, Default, Clone, Copy)]
pub struct StummerSprecher;

#[async_trait]
impl Sprecher for StummerSprecher {
    async fn sagen(&self, text: &str) -> SpeechResult<()> {
        tracing::info!(text = %text, "Spreche (stumm)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stummer_sprecher_gelingt_immer() {
        assert!(StummerSprecher.sagen("2+2").await.is_ok());
        assert!(StummerSprecher.sagen("").await.is_ok());
    }
}
