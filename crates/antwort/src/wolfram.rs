//! Wolfram Alpha Full Results API (v2)
//!
//! `GET {api_url}?appid=..&input=..&output=json&format=plaintext`
//!
//! Aus der Antwort wird der erste Pod genommen, der `primary` ist oder den
//! Titel `Result` traegt; dessen erster Subpod liefert den Klartext.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AbfrageFehler;
use crate::{AntwortQuelle, entschuldigung};

/// Standard-Endpunkt der Full Results API
pub const STANDARD_API_URL: &str = "https://api.wolframalpha.com/v2/query";

/// Konfiguration des Wolfram-Alpha-Clients
#[derive(Debug, Clone)]
pub struct WolframKonfig {
    /// App-ID (None = jede Abfrage endet in der Entschuldigung)
    pub app_id: Option<String>,
    pub api_url: String,
    /// Zeitlimit pro Abfrage (None = unbegrenzt)
    pub timeout: Option<Duration>,
}

impl Default for WolframKonfig {
    fn default() -> Self {
        Self {
            app_id: None,
            api_url: STANDARD_API_URL.into(),
            timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Antwort-Format (nur die benoetigten Felder)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WolframAntwort {
    queryresult: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    pods: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    #[serde(default)]
    title: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    subpods: Vec<Subpod>,
}

#[derive(Debug, Deserialize)]
struct Subpod {
    #[serde(default)]
    plaintext: String,
}

/// Sucht den Ergebnistext in einer geparsten Antwort
fn ergebnis_extrahieren(antwort: WolframAntwort) -> Result<String, AbfrageFehler> {
    let result = antwort.queryresult;
    if !result.success {
        return Err(AbfrageFehler::NichtErfolgreich);
    }

    result
        .pods
        .into_iter()
        .filter(|pod| pod.primary || pod.title == "Result")
        .find_map(|pod| pod.subpods.into_iter().next())
        .map(|subpod| subpod.plaintext)
        .filter(|text| !text.trim().is_empty())
        .ok_or(AbfrageFehler::KeinErgebnis)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP-Client fuer Wolfram Alpha
pub struct WolframAlpha {
    client: reqwest::Client,
    konfig: WolframKonfig,
}

impl WolframAlpha {
    pub fn neu(konfig: WolframKonfig) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = konfig.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            konfig,
        })
    }

    /// Fuehrt die Abfrage aus, ohne Fehler in Text umzuwandeln
    pub async fn abfragen_roh(&self, frage: &str) -> Result<String, AbfrageFehler> {
        let app_id = self
            .konfig
            .app_id
            .as_deref()
            .ok_or(AbfrageFehler::KeineAppId)?;

        let antwort: WolframAntwort = self
            .client
            .get(&self.konfig.api_url)
            .query(&[
                ("appid", app_id),
                ("input", frage),
                ("output", "json"),
                ("format", "plaintext"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        ergebnis_extrahieren(antwort)
    }
}

#[async_trait]
impl AntwortQuelle for WolframAlpha {
    async fn abfragen(&self, frage: &str) -> String {
        tracing::info!(frage = %frage, "Sende Frage an Wolfram Alpha");

        let antwort = match self.abfragen_roh(frage).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(fehler = %e, "Wolfram Alpha lieferte keine Antwort");
                entschuldigung(frage)
            }
        };

        tracing::info!(antwort = %antwort, "Antwort von Wolfram Alpha erhalten");
        antwort
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn parse(json: &str) -> WolframAntwort {
        serde_json::from_str(json).unwrap()
    }

    const ZWEI_PLUS_ZWEI: &str = r#"{
        "queryresult": {
            "success": true,
            "error": false,
            "numpods": 2,
            "pods": [
                {"title": "Input", "id": "Input", "subpods": [{"title": "", "plaintext": "2 + 2"}]},
                {"title": "Result", "id": "Result", "primary": true,
                 "subpods": [{"title": "", "plaintext": "4"}]}
            ]
        }
    }"#;

    /// Minimaler HTTP-Server der genau eine Anfrage mit `body` beantwortet
    async fn mock_server(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut puffer = [0u8; 4096];
            let _ = stream.read(&mut puffer).await;
            let antwort = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(antwort.as_bytes()).await;
        });
        format!("http://{addr}/v2/query")
    }

    fn quelle(api_url: String) -> WolframAlpha {
        WolframAlpha::neu(WolframKonfig {
            app_id: Some("TEST-APPID".into()),
            api_url,
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    #[test]
    fn primaerer_pod_wird_gewaehlt() {
        assert_eq!(ergebnis_extrahieren(parse(ZWEI_PLUS_ZWEI)).unwrap(), "4");
    }

    #[test]
    fn result_titel_ohne_primary() {
        let json = r#"{"queryresult": {"success": true, "pods": [
            {"title": "Input", "subpods": [{"plaintext": "x"}]},
            {"title": "Result", "subpods": [{"plaintext": "42"}]}
        ]}}"#;
        assert_eq!(ergebnis_extrahieren(parse(json)).unwrap(), "42");
    }

    #[test]
    fn nicht_erfolgreich() {
        let json = r#"{"queryresult": {"success": false, "error": false, "numpods": 0}}"#;
        assert!(matches!(
            ergebnis_extrahieren(parse(json)),
            Err(AbfrageFehler::NichtErfolgreich)
        ));
    }

    #[test]
    fn fehlerobjekt_statt_bool() {
        let json = r#"{"queryresult": {"success": false,
            "error": {"code": "1", "msg": "Invalid appid"}}}"#;
        assert!(ergebnis_extrahieren(parse(json)).is_err());
    }

    #[test]
    fn kein_ergebnis_pod() {
        let json = r#"{"queryresult": {"success": true, "pods": [
            {"title": "Input", "subpods": [{"plaintext": "x"}]}
        ]}}"#;
        assert!(matches!(
            ergebnis_extrahieren(parse(json)),
            Err(AbfrageFehler::KeinErgebnis)
        ));
    }

    #[tokio::test]
    async fn abfrage_gegen_mock_server() {
        let url = mock_server("200 OK", ZWEI_PLUS_ZWEI).await;
        assert_eq!(quelle(url).abfragen("2+2").await, "4");
    }

    #[tokio::test]
    async fn http_fehler_wird_zur_entschuldigung() {
        let url = mock_server("500 Internal Server Error", "{}").await;
        assert_eq!(quelle(url).abfragen("2+2").await, entschuldigung("2+2"));
    }

    #[tokio::test]
    async fn kaputtes_json_wird_zur_entschuldigung() {
        let url = mock_server("200 OK", "kein json").await;
        assert_eq!(quelle(url).abfragen("frage").await, entschuldigung("frage"));
    }

    #[tokio::test]
    async fn unerreichbarer_server_wird_zur_entschuldigung() {
        // Port binden und sofort wieder freigeben -> Verbindung wird abgelehnt
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let antwort = quelle(format!("http://{addr}/v2/query")).abfragen("2+2").await;
        assert_eq!(antwort, entschuldigung("2+2"));
    }

    #[tokio::test]
    async fn ohne_app_id_keine_anfrage() {
        let quelle = WolframAlpha::neu(WolframKonfig::default()).unwrap();
        assert!(matches!(
            quelle.abfragen_roh("2+2").await,
            Err(AbfrageFehler::KeineAppId)
        ));
        assert_eq!(quelle.abfragen("2+2").await, entschuldigung("2+2"));
    }
}
