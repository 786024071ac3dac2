//! Sprachausgabe ueber ein lokales Programm (z.B. `espeak`)

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::Sprecher;
use crate::error::{SpeechError, SpeechResult};

/// Startet `programm` mit `argumente` und wartet auf das Ende
///
/// Ausgaben des Programms werden verworfen.
pub(crate) async fn programm_ausfuehren<I, S>(programm: &str, argumente: I) -> SpeechResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let status = Command::new(programm)
        .args(argumente)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|fehler| SpeechError::Start {
            programm: programm.to_string(),
            fehler,
        })?;

    if !status.success() {
        return Err(SpeechError::Wiedergabe {
            programm: programm.to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Uebergibt den Text als letztes Argument an ein Programm
#[derive(Debug, Clone)]
pub struct KommandoSprecher {
    programm: String,
    argumente: Vec<String>,
}

impl KommandoSprecher {
    pub fn neu(programm: impl Into<String>, argumente: Vec<String>) -> Self {
        Self {
            programm: programm.into(),
            argumente,
        }
    }
}

#[async_trait]
impl Sprecher for KommandoSprecher {
    async fn sagen(&self, text: &str) -> SpeechResult<()> {
        tracing::info!(text = %text, programm = %self.programm, "Spreche");
        let argumente = self
            .argumente
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(text));
        programm_ausfuehren(&self.programm, argumente).await
    }
}
