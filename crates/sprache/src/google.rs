//! Google Translate TTS + externer Player
//!
//! Der Text wird in Stuecke von hoechstens [`MAX_STUECK_ZEICHEN`] Zeichen
//! zerlegt (Limit des Endpunkts), jedes Stueck als MP3 geladen, die MP3s
//! aneinandergehaengt in eine Datei geschrieben und mit dem Player
//! abgespielt.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::Sprecher;
use crate::error::{SpeechError, SpeechResult};
use crate::kommando::programm_ausfuehren;

/// Standard-Endpunkt
pub const STANDARD_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Maximale Zeichen pro Anfrage
pub const MAX_STUECK_ZEICHEN: usize = 100;

#[derive(Debug, Clone)]
pub struct GoogleTtsKonfig {
    /// Sprachcode, z.B. "en" oder "de"
    pub sprache: String,
    /// Abspielprogramm, erhaelt den Dateipfad als einziges Argument
    pub player: String,
    /// Zieldatei fuer das MP3
    pub datei: PathBuf,
    pub tts_url: String,
    pub timeout: Option<Duration>,
}

impl Default for GoogleTtsKonfig {
    fn default() -> Self {
        Self {
            sprache: "en".into(),
            player: "mplayer".into(),
            datei: PathBuf::from("./saythis.mp3"),
            tts_url: STANDARD_TTS_URL.into(),
            timeout: None,
        }
    }
}

/// Zerlegt `text` an Wortgrenzen in Stuecke von hoechstens `max` Zeichen
///
/// Woerter die allein laenger als `max` sind werden hart getrennt.
pub fn text_aufteilen(text: &str, max: usize) -> Vec<String> {
    let mut stuecke = Vec::new();
    let mut aktuell = String::new();

    for wort in text.split_whitespace() {
        let mut wort: Vec<char> = wort.chars().collect();
        while wort.len() > max {
            if !aktuell.is_empty() {
                stuecke.push(std::mem::take(&mut aktuell));
            }
            stuecke.push(wort.drain(..max).collect());
        }
        if wort.is_empty() {
            continue;
        }

        let wort: String = wort.into_iter().collect();
        let neue_laenge = aktuell.chars().count() + usize::from(!aktuell.is_empty()) + wort.chars().count();
        if neue_laenge > max && !aktuell.is_empty() {
            stuecke.push(std::mem::take(&mut aktuell));
        }
        if !aktuell.is_empty() {
            aktuell.push(' ');
        }
        aktuell.push_str(&wort);
    }

    if !aktuell.is_empty() {
        stuecke.push(aktuell);
    }
    stuecke
}

pub struct GoogleTts {
    client: reqwest::Client,
    konfig: GoogleTtsKonfig,
}

impl GoogleTts {
    pub fn neu(konfig: GoogleTtsKonfig) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = konfig.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            konfig,
        })
    }

    /// Laedt das MP3 fuer `text`
    pub async fn synthetisieren(&self, text: &str) -> SpeechResult<Vec<u8>> {
        let stuecke = text_aufteilen(text, MAX_STUECK_ZEICHEN);
        let anzahl = stuecke.len().to_string();
        let mut mp3 = Vec::new();

        for (index, stueck) in stuecke.iter().enumerate() {
            let index = index.to_string();
            let bytes = self
                .client
                .get(&self.konfig.tts_url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.konfig.sprache.as_str()),
                    ("q", stueck.as_str()),
                    ("total", anzahl.as_str()),
                    ("idx", index.as_str()),
                ])
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            mp3.extend_from_slice(&bytes);
        }

        Ok(mp3)
    }
}

#[async_trait]
impl Sprecher for GoogleTts {
    async fn sagen(&self, text: &str) -> SpeechResult<()> {
        tracing::info!(text = %text, "Spreche");

        let mp3 = self.synthetisieren(text).await?;
        tokio::fs::write(&self.konfig.datei, &mp3)
            .await
            .map_err(SpeechError::Datei)?;

        tracing::debug!(
            datei = %self.konfig.datei.display(),
            bytes = mp3.len(),
            player = %self.konfig.player,
            "Audiodatei geschrieben, starte Wiedergabe"
        );

        programm_ausfuehren(&self.konfig.player, [self.konfig.datei.as_os_str()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn kurzer_text_bleibt_ganz() {
        assert_eq!(text_aufteilen("what is 2+2", 100), vec!["what is 2+2"]);
    }

    #[test]
    fn leerer_text_ergibt_keine_stuecke() {
        assert!(text_aufteilen("", 100).is_empty());
        assert!(text_aufteilen("   ", 100).is_empty());
    }

    #[test]
    fn aufteilung_an_wortgrenzen() {
        let stuecke = text_aufteilen("eins zwei drei vier", 9);
        assert_eq!(stuecke, vec!["eins zwei", "drei vier"]);
        assert!(stuecke.iter().all(|s| s.chars().count() <= 9));
    }

    #[test]
    fn ueberlanges_wort_wird_hart_getrennt() {
        let stuecke = text_aufteilen("ab abcdefghij cd", 4);
        assert_eq!(stuecke, vec!["ab", "abcd", "efgh", "ij", "cd"]);
    }

    #[test]
    fn mehrbyte_zeichen_zaehlen_als_ein_zeichen() {
        let stuecke = text_aufteilen("äöü ß", 5);
        assert_eq!(stuecke, vec!["äöü ß"]);
    }

    /// Beantwortet `anfragen` HTTP-Anfragen mit jeweils `body`
    async fn mock_tts(anfragen: usize, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for _ in 0..anfragen {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut puffer = [0u8; 4096];
                let _ = stream.read(&mut puffer).await;
                let kopf = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(kopf.as_bytes()).await;
                let _ = stream.write_all(body).await;
            }
        });
        format!("http://{addr}/translate_tts")
    }

    fn konfig(url: String, player: &str, name: &str) -> GoogleTtsKonfig {
        GoogleTtsKonfig {
            sprache: "en".into(),
            player: player.into(),
            datei: std::env::temp_dir().join(format!("orakel-{name}-{}.mp3", std::process::id())),
            tts_url: url,
            timeout: Some(Duration::from_secs(5)),
        }
    }

    #[tokio::test]
    async fn synthese_haengt_stuecke_an() {
        let url = mock_tts(2, b"MP3").await;
        let text = "a".repeat(150);
        let tts = GoogleTts::neu(konfig(url, "true", "synthese")).unwrap();
        assert_eq!(tts.synthetisieren(&text).await.unwrap(), b"MP3MP3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sagen_schreibt_datei_und_spielt_ab() {
        let url = mock_tts(1, b"ID3-fake").await;
        let k = konfig(url, "true", "sagen");
        let datei = k.datei.clone();
        let tts = GoogleTts::neu(k).unwrap();

        tts.sagen("2+2").await.unwrap();
        assert_eq!(std::fs::read(&datei).unwrap(), b"ID3-fake");
        let _ = std::fs::remove_file(datei);
    }

    #[tokio::test]
    async fn fehlender_player() {
        let url = mock_tts(1, b"x").await;
        let k = konfig(url, "/nicht/vorhanden/mplayer", "player");
        let datei = k.datei.clone();
        let tts = GoogleTts::neu(k).unwrap();

        assert!(matches!(tts.sagen("hi").await, Err(SpeechError::Start { .. })));
        let _ = std::fs::remove_file(datei);
    }

    #[tokio::test]
    async fn unerreichbarer_dienst() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tts = GoogleTts::neu(konfig(format!("http://{addr}/tts"), "true", "offline")).unwrap();
        assert!(matches!(tts.sagen("hi").await, Err(SpeechError::Synthese(_))));
    }
}
