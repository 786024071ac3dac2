//! End-to-End-Tests: echter TCP-Server auf Loopback, echter Client

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use orakel_antwort::{AntwortQuelle, WolframAlpha, WolframKonfig, entschuldigung};
use orakel_crypto::{Schluessel, umschlag_versiegeln};
use orakel_protocol::{FehlerMeldung, Nachricht};
use orakel_server::Server;
use orakel_server::client::{ClientFehler, frage_stellen, umschlag_senden};
use orakel_server::config::ServerConfig;
use orakel_sprache::{KommandoSprecher, Sprecher, StummerSprecher};

const MAX: usize = 4096;

/// Rechnet "a+b", alles andere bekommt die Entschuldigung
struct Rechner;

#[async_trait]
impl AntwortQuelle for Rechner {
    async fn abfragen(&self, frage: &str) -> String {
        let summe = frage
            .split_once('+')
            .and_then(|(a, b)| Some(a.trim().parse::<i64>().ok()? + b.trim().parse::<i64>().ok()?));
        match summe {
            Some(summe) => summe.to_string(),
            None => entschuldigung(frage),
        }
    }
}

/// Antwortet mit `laenge` mal "x"
struct LangeAntwort(usize);

#[async_trait]
impl AntwortQuelle for LangeAntwort {
    async fn abfragen(&self, _frage: &str) -> String {
        "x".repeat(self.0)
    }
}

struct LaufenderServer {
    adresse: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<std::io::Result<()>>,
}

fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.netzwerk.bind_adresse = "127.0.0.1".into();
    config.netzwerk.port = 0;
    config
}

async fn server_starten(
    config: ServerConfig,
    antwort: Arc<dyn AntwortQuelle>,
    sprecher: Arc<dyn Sprecher>,
) -> LaufenderServer {
    let server = Server::neu(config, antwort, sprecher);
    let listener = server.binden().await.unwrap();
    let adresse = listener.lokale_adresse().unwrap();
    let handler = server.sitzungs_handler();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(listener.laufen(handler, shutdown_rx));
    LaufenderServer {
        adresse,
        shutdown_tx,
        task,
    }
}

async fn rechner_server(config: ServerConfig) -> LaufenderServer {
    server_starten(config, Arc::new(Rechner), Arc::new(StummerSprecher)).await
}

#[tokio::test]
async fn frage_wird_beantwortet() {
    let server = rechner_server(test_config()).await;
    let schluessel = Schluessel::generieren().unwrap();

    let antwort = frage_stellen(server.adresse, "2+2", &schluessel, MAX).await.unwrap();
    assert_eq!(antwort.text, "4");
    assert!(antwort.pruefsumme_gueltig);
}

#[tokio::test]
async fn unbekannte_frage_bekommt_entschuldigung() {
    let server = rechner_server(test_config()).await;
    let schluessel = Schluessel::generieren().unwrap();

    let antwort = frage_stellen(server.adresse, "Sinn des Lebens", &schluessel, MAX)
        .await
        .unwrap();
    assert_eq!(antwort.text, entschuldigung("Sinn des Lebens"));
}

#[tokio::test]
async fn falsche_pruefsumme_wird_beantwortet() {
    let server = rechner_server(test_config()).await;
    let schluessel = Schluessel::generieren().unwrap();
    let mut umschlag = umschlag_versiegeln(&schluessel, b"2+2");
    umschlag.pruefsumme[0] ^= 0xFF;

    let antwort = umschlag_senden(server.adresse, umschlag, MAX).await.unwrap();
    let Nachricht::Umschlag(antwort) = antwort else {
        panic!("Umschlag erwartet");
    };
    assert_eq!(schluessel.entschluesseln(&antwort.chiffrat).unwrap(), b"4");
}

#[tokio::test]
async fn falsche_pruefsumme_wird_abgelehnt_wenn_erzwungen() {
    let mut config = test_config();
    config.sicherheit.pruefsumme_erzwingen = true;
    let server = rechner_server(config).await;
    let schluessel = Schluessel::generieren().unwrap();
    let mut umschlag = umschlag_versiegeln(&schluessel, b"2+2");
    umschlag.pruefsumme[0] ^= 0xFF;

    let antwort = umschlag_senden(server.adresse, umschlag, MAX).await.unwrap();
    assert_eq!(
        antwort,
        Nachricht::Fehler(FehlerMeldung::neu(1010, "Pruefsumme ungueltig"))
    );

    // Gueltige Frage an denselben Server geht weiterhin durch
    let antwort = frage_stellen(server.adresse, "1+2", &schluessel, MAX).await.unwrap();
    assert_eq!(antwort.text, "3");
}

#[tokio::test]
async fn leere_verbindung_bekommt_keine_antwort() {
    let server = rechner_server(test_config()).await;

    let mut stream = TcpStream::connect(server.adresse).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut empfangen = Vec::new();
    stream.read_to_end(&mut empfangen).await.unwrap();
    assert!(empfangen.is_empty());

    let schluessel = Schluessel::generieren().unwrap();
    let antwort = frage_stellen(server.adresse, "2+3", &schluessel, MAX).await.unwrap();
    assert_eq!(antwort.text, "5");
}

#[tokio::test]
async fn kaputte_daten_beenden_den_server_nicht() {
    let server = rechner_server(test_config()).await;

    let mut stream = TcpStream::connect(server.adresse).await.unwrap();
    stream.write_all(b"kein gueltiger umschlag").await.unwrap();
    stream.shutdown().await.unwrap();
    let mut empfangen = Vec::new();
    // Der Server schliesst ohne Antwort; ein Reset gilt ebenfalls als geschlossen
    let _ = stream.read_to_end(&mut empfangen).await;
    assert!(empfangen.is_empty());

    let schluessel = Schluessel::generieren().unwrap();
    let antwort = frage_stellen(server.adresse, "20+22", &schluessel, MAX).await.unwrap();
    assert_eq!(antwort.text, "42");
}

#[tokio::test]
async fn clients_werden_nacheinander_bedient() {
    let server = rechner_server(test_config()).await;

    // Erster Client belegt die einzige Sitzung und sendet nichts
    let blockierer = TcpStream::connect(server.adresse).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let adresse = server.adresse;
    let zweiter = tokio::spawn(async move {
        let schluessel = Schluessel::generieren().unwrap();
        frage_stellen(adresse, "2+2", &schluessel, MAX).await
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!zweiter.is_finished(), "zweiter Client wurde parallel bedient");

    drop(blockierer);
    let antwort = tokio::time::timeout(Duration::from_secs(5), zweiter)
        .await
        .expect("zweiter Client wurde nie bedient")
        .unwrap()
        .unwrap();
    assert_eq!(antwort.text, "4");
}

#[tokio::test]
async fn parallele_sitzungen_wenn_konfiguriert() {
    let mut config = test_config();
    config.netzwerk.max_parallele_sitzungen = 2;
    let server = rechner_server(config).await;

    let _blockierer = TcpStream::connect(server.adresse).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let schluessel = Schluessel::generieren().unwrap();
    let antwort = tokio::time::timeout(
        Duration::from_secs(5),
        frage_stellen(server.adresse, "1+1", &schluessel, MAX),
    )
    .await
    .expect("zweite Sitzung blockiert")
    .unwrap();
    assert_eq!(antwort.text, "2");
}

#[tokio::test]
async fn antwort_groesser_als_anfrage_puffer_kommt_an() {
    let server = server_starten(
        test_config(),
        Arc::new(LangeAntwort(20_000)),
        Arc::new(StummerSprecher),
    )
    .await;
    let schluessel = Schluessel::generieren().unwrap();

    let antwort = frage_stellen(server.adresse, "2+2", &schluessel, MAX).await.unwrap();
    assert_eq!(antwort.text.len(), 20_000);
}

#[tokio::test]
async fn zu_grosse_antwort_wird_zur_entschuldigung() {
    let server = server_starten(
        test_config(),
        Arc::new(LangeAntwort(50_000)),
        Arc::new(StummerSprecher),
    )
    .await;
    let schluessel = Schluessel::generieren().unwrap();

    let antwort = frage_stellen(server.adresse, "2+2", &schluessel, MAX).await.unwrap();
    assert_eq!(antwort.text, entschuldigung("2+2"));
    assert!(antwort.pruefsumme_gueltig);
}

#[tokio::test]
async fn unerreichbares_wolfram_alpha_liefert_entschuldigung() {
    let wolfram = WolframAlpha::neu(WolframKonfig {
        app_id: Some("TEST-ID".into()),
        api_url: "http://127.0.0.1:1/v2/query".into(),
        timeout: Some(Duration::from_secs(2)),
    })
    .unwrap();
    let server = server_starten(test_config(), Arc::new(wolfram), Arc::new(StummerSprecher)).await;
    let schluessel = Schluessel::generieren().unwrap();

    let antwort = frage_stellen(server.adresse, "2+2", &schluessel, MAX).await.unwrap();
    assert_eq!(
        antwort.text,
        "Wolfram Alpha was unable to find an answer for 2+2. Please try something else."
    );
}

#[tokio::test]
async fn kaputte_sprachausgabe_stoert_die_antwort_nicht() {
    let sprecher = KommandoSprecher::neu("orakel-gibt-es-nicht-als-programm", Vec::new());
    let server = server_starten(test_config(), Arc::new(Rechner), Arc::new(sprecher)).await;
    let schluessel = Schluessel::generieren().unwrap();

    let antwort = frage_stellen(server.adresse, "2+2", &schluessel, MAX).await.unwrap();
    assert_eq!(antwort.text, "4");
}

#[tokio::test]
async fn zu_kleiner_puffer_schneidet_ab() {
    let mut config = test_config();
    config.netzwerk.puffer_groesse = 16;
    let server = rechner_server(config).await;
    let schluessel = Schluessel::generieren().unwrap();

    // Der Server liest nur 16 Bytes, kann nichts dekodieren und schliesst
    let ergebnis = frage_stellen(server.adresse, "2+2", &schluessel, MAX).await;
    assert!(matches!(
        ergebnis,
        Err(ClientFehler::Protokoll(_) | ClientFehler::Io(_))
    ));
}

#[tokio::test]
async fn shutdown_beendet_die_accept_loop() {
    let server = rechner_server(test_config()).await;
    server.shutdown_tx.send(true).unwrap();

    let ergebnis = tokio::time::timeout(Duration::from_secs(2), server.task)
        .await
        .expect("Listener reagiert nicht auf Shutdown")
        .unwrap();
    assert!(ergebnis.is_ok());
}
