//! Sitzungs-Handler – genau ein Frage/Antwort-Austausch pro Verbindung
//!
//! Ablauf: Lesen → Dekodieren → Pruefen → Entschluesseln → Sprechen
//! (fire-and-forget) → Abfragen → Verschluesseln → Antworten → Schliessen.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

use orakel_antwort::{AntwortQuelle, entschuldigung};
use orakel_crypto::{Schluessel, umschlag_oeffnen, umschlag_versiegeln};
use orakel_protocol::wire::{DEFAULT_MAX_FRAME_SIZE, frame_schreiben};
use orakel_protocol::{Nachricht, Umschlag, frame_dekodieren, frame_vollstaendig, umschlag_passt};
use orakel_sprache::Sprecher;

pub use orakel_crypto::umschlag_pruefen;

use crate::error::{SitzungsFehler, SitzungsResult};

/// Groesse eines einzelnen Lesevorgangs
const LESE_STUECK: usize = 4096;

// ---------------------------------------------------------------------------
// Zustand
// ---------------------------------------------------------------------------

/// Zustand einer Sitzung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitzungsZustand {
    Angenommen,
    Lesen,
    /// Keine Daten empfangen, es folgt nur noch `Geschlossen`
    Leer,
    Dekodieren,
    Dekodiert,
    Pruefen,
    Entschluesseln,
    Sprechen,
    Abfragen,
    Verschluesseln,
    Antworten,
    Geschlossen,
}

/// Eine angenommene Verbindung
#[derive(Debug)]
pub struct Sitzung {
    pub id: Uuid,
    pub peer: SocketAddr,
    pub zustand: SitzungsZustand,
    /// Rohdaten wie vom Socket gelesen
    pub puffer: BytesMut,
}

impl Sitzung {
    pub fn neu(peer: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer,
            zustand: SitzungsZustand::Angenommen,
            puffer: BytesMut::new(),
        }
    }

    fn wechseln(&mut self, nach: SitzungsZustand) {
        tracing::debug!(
            sitzung = %self.id,
            von = ?self.zustand,
            nach = ?nach,
            "Zustandswechsel"
        );
        self.zustand = nach;
    }
}

/// Ausgang einer Sitzung ohne Fehler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitzungsErgebnis {
    /// Client sendete nichts, keine Antwort
    Leer,
    /// Antwort-Umschlag gesendet
    Beantwortet { pruefsumme_gueltig: bool },
    /// Integritaetsfehler gemeldet, nichts entschluesselt
    Abgelehnt,
}

// ---------------------------------------------------------------------------
// Einzeloperationen
// ---------------------------------------------------------------------------

/// Liest hoechstens `puffer_groesse` Bytes
///
/// Endet frueher bei EOF oder sobald ein vollstaendiges Frame vorliegt.
/// Ein leerer Puffer bedeutet: der Client hat nichts gesendet.
pub async fn empfangen<R>(reader: &mut R, puffer_groesse: usize) -> std::io::Result<BytesMut>
where
    R: AsyncRead + Unpin,
{
    let mut puffer = BytesMut::with_capacity(puffer_groesse.min(DEFAULT_MAX_FRAME_SIZE));
    let mut stueck = [0u8; LESE_STUECK];

    while puffer.len() < puffer_groesse {
        let max = (puffer_groesse - puffer.len()).min(LESE_STUECK);
        let n = reader.read(&mut stueck[..max]).await?;
        if n == 0 {
            break;
        }
        puffer.extend_from_slice(&stueck[..n]);
        if frame_vollstaendig(&puffer) {
            break;
        }
    }

    Ok(puffer)
}

/// Dekodiert die empfangenen Bytes zu einem Umschlag
pub fn umschlag_dekodieren(bytes: &[u8], max_frame_size: usize) -> SitzungsResult<Umschlag> {
    match frame_dekodieren(bytes, max_frame_size)? {
        Nachricht::Umschlag(umschlag) => Ok(umschlag),
        Nachricht::Fehler(_) => Err(SitzungsFehler::UnerwarteteNachricht),
    }
}

/// Verschluesselt die Antwort unter dem Client-Schluessel
///
/// Passt die Antwort nicht in ein Frame, wird stattdessen die Entschuldigung
/// fuer `frage` versiegelt.
pub fn antwort_versiegeln(schluessel: &Schluessel, frage: &str, antwort: &str) -> Umschlag {
    let umschlag = umschlag_versiegeln(schluessel, antwort.as_bytes());
    if umschlag_passt(&umschlag, DEFAULT_MAX_FRAME_SIZE) {
        return umschlag;
    }
    tracing::warn!(
        antwort_bytes = antwort.len(),
        maximum = DEFAULT_MAX_FRAME_SIZE,
        "Antwort zu gross fuer ein Frame, sende Entschuldigung"
    );
    umschlag_versiegeln(schluessel, entschuldigung(frage).as_bytes())
}

/// Sendet den Antwort-Umschlag
pub async fn antworten<W>(writer: &mut W, umschlag: Umschlag) -> SitzungsResult<()>
where
    W: AsyncWrite + Unpin,
{
    frame_schreiben(writer, &Nachricht::Umschlag(umschlag), DEFAULT_MAX_FRAME_SIZE).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SitzungsKonfig {
    pub puffer_groesse: usize,
    pub pruefsumme_erzwingen: bool,
}

/// Fuehrt Sitzungen durch; wird zwischen allen Verbindungen geteilt
pub struct SitzungsHandler {
    konfig: SitzungsKonfig,
    antwort: Arc<dyn AntwortQuelle>,
    sprecher: Arc<dyn Sprecher>,
}

impl SitzungsHandler {
    pub fn neu(
        konfig: SitzungsKonfig,
        antwort: Arc<dyn AntwortQuelle>,
        sprecher: Arc<dyn Sprecher>,
    ) -> Self {
        Self {
            konfig,
            antwort,
            sprecher,
        }
    }

    /// Behandelt eine Verbindung vollstaendig und schliesst sie
    ///
    /// Gibt `None` zurueck wenn die Sitzung an einem Fehler scheiterte; der
    /// Fehler ist dann bereits protokolliert.
    pub async fn behandeln<S>(&self, mut stream: S, peer: SocketAddr) -> Option<SitzungsErgebnis>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut sitzung = Sitzung::neu(peer);
        tracing::info!(
            sitzung = %sitzung.id,
            adresse = %peer.ip(),
            port = peer.port(),
            "Client-Verbindung angenommen"
        );

        let ergebnis = self.austausch(&mut stream, &mut sitzung).await;
        let _ = stream.shutdown().await;
        sitzung.wechseln(SitzungsZustand::Geschlossen);

        match ergebnis {
            Ok(ergebnis) => {
                tracing::debug!(sitzung = %sitzung.id, ergebnis = ?ergebnis, "Verbindung geschlossen");
                Some(ergebnis)
            }
            Err(e) => {
                tracing::warn!(
                    sitzung = %sitzung.id,
                    zustand = ?sitzung.zustand,
                    code = e.fehler_code(),
                    fehler = %e,
                    "Sitzung fehlgeschlagen, Verbindung verworfen"
                );
                None
            }
        }
    }

    async fn austausch<S>(&self, stream: &mut S, sitzung: &mut Sitzung) -> SitzungsResult<SitzungsErgebnis>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        sitzung.wechseln(SitzungsZustand::Lesen);
        sitzung.puffer = empfangen(stream, self.konfig.puffer_groesse).await?;
        if sitzung.puffer.is_empty() {
            sitzung.wechseln(SitzungsZustand::Leer);
            tracing::info!(sitzung = %sitzung.id, "Keine Daten empfangen, schliesse ohne Antwort");
            return Ok(SitzungsErgebnis::Leer);
        }
        tracing::info!(sitzung = %sitzung.id, bytes = sitzung.puffer.len(), "Daten empfangen");

        sitzung.wechseln(SitzungsZustand::Dekodieren);
        let umschlag = umschlag_dekodieren(&sitzung.puffer, self.konfig.puffer_groesse)?;
        sitzung.wechseln(SitzungsZustand::Dekodiert);

        sitzung.wechseln(SitzungsZustand::Pruefen);
        let pruefsumme_gueltig = umschlag_pruefen(&umschlag);
        if pruefsumme_gueltig {
            tracing::info!(sitzung = %sitzung.id, "Pruefsumme ist GUELTIG");
        } else {
            tracing::warn!(
                sitzung = %sitzung.id,
                pruefsumme = %hex::encode(&umschlag.pruefsumme),
                "Pruefsumme ist UNGUELTIG"
            );
            if self.konfig.pruefsumme_erzwingen {
                let meldung = SitzungsFehler::Integritaet.als_meldung();
                frame_schreiben(stream, &Nachricht::Fehler(meldung), DEFAULT_MAX_FRAME_SIZE).await?;
                return Ok(SitzungsErgebnis::Abgelehnt);
            }
        }

        sitzung.wechseln(SitzungsZustand::Entschluesseln);
        let geoeffnet = umschlag_oeffnen(&umschlag)?;
        let frage = geoeffnet.text()?.to_string();
        tracing::info!(
            sitzung = %sitzung.id,
            klartext = %frage,
            schluessel_bytes = umschlag.schluessel.len(),
            "Frage entschluesselt"
        );

        sitzung.wechseln(SitzungsZustand::Sprechen);
        self.sprechen(sitzung.id, &frage);

        sitzung.wechseln(SitzungsZustand::Abfragen);
        let antwort = self.antwort.abfragen(&frage).await;

        sitzung.wechseln(SitzungsZustand::Verschluesseln);
        let antwort_umschlag = antwort_versiegeln(&geoeffnet.schluessel, &frage, &antwort);
        tracing::info!(
            sitzung = %sitzung.id,
            chiffrat_bytes = antwort_umschlag.chiffrat.len(),
            pruefsumme = %hex::encode(&antwort_umschlag.pruefsumme),
            "Antwort verschluesselt"
        );

        sitzung.wechseln(SitzungsZustand::Antworten);
        antworten(stream, antwort_umschlag).await?;
        tracing::info!(sitzung = %sitzung.id, "Antwort gesendet");

        Ok(SitzungsErgebnis::Beantwortet { pruefsumme_gueltig })
    }

    /// Startet die Sprachausgabe ohne auf sie zu warten
    fn sprechen(&self, sitzung: Uuid, text: &str) {
        let sprecher = Arc::clone(&self.sprecher);
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = sprecher.sagen(&text).await {
                tracing::warn!(sitzung = %sitzung, fehler = %e, "Sprachausgabe fehlgeschlagen");
            }
        });
    }
}
