//! Orakel-Client – stellt eine Frage und liest die Antwort
//!
//! Gegenstueck zum Server, genutzt von `orakel-frage` und den
//! Integrationstests.

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};

use orakel_crypto::{CryptoError, Schluessel, umschlag_oeffnen, umschlag_pruefen, umschlag_versiegeln};
use orakel_protocol::wire::{DEFAULT_MAX_FRAME_SIZE, frame_lesen, frame_schreiben};
use orakel_protocol::{FehlerMeldung, Nachricht, ProtokollFehler, Umschlag};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientFehler {
    #[error("Verbindungsfehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] ProtokollFehler),

    #[error("Antwort nicht lesbar: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Server meldet Fehler {}: {}", .0.code, .0.text)]
    ServerFehler(FehlerMeldung),
}

/// Entschluesselte Antwort des Servers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAntwort {
    pub text: String,
    /// Ob die Pruefsumme der Antwort stimmte
    pub pruefsumme_gueltig: bool,
}

/// Sendet einen Umschlag und wartet auf genau ein Antwort-Frame
///
/// `max_frame_size` begrenzt nur die Anfrage. Antworten duerfen bis zu
/// [`DEFAULT_MAX_FRAME_SIZE`] gross sein, so viel sendet der Server hoechstens.
pub async fn umschlag_senden<A>(
    adresse: A,
    umschlag: Umschlag,
    max_frame_size: usize,
) -> Result<Nachricht, ClientFehler>
where
    A: ToSocketAddrs,
{
    let mut stream = TcpStream::connect(adresse).await?;
    frame_schreiben(&mut stream, &Nachricht::Umschlag(umschlag), max_frame_size).await?;
    let antwort = frame_lesen(&mut stream, max_frame_size.max(DEFAULT_MAX_FRAME_SIZE)).await?;
    let _ = stream.shutdown().await;
    Ok(antwort)
}

/// Verschluesselt `frage` mit `schluessel`, sendet sie und oeffnet die Antwort
pub async fn frage_stellen<A>(
    adresse: A,
    frage: &str,
    schluessel: &Schluessel,
    max_frame_size: usize,
) -> Result<ClientAntwort, ClientFehler>
where
    A: ToSocketAddrs,
{
    let umschlag = umschlag_versiegeln(schluessel, frage.as_bytes());
    tracing::debug!(bytes = umschlag.nutzlast_laenge(), "Sende Frage");

    match umschlag_senden(adresse, umschlag, max_frame_size).await? {
        Nachricht::Umschlag(antwort) => {
            let pruefsumme_gueltig = umschlag_pruefen(&antwort);
            if !pruefsumme_gueltig {
                tracing::warn!("Pruefsumme der Antwort ist UNGUELTIG");
            }
            let geoeffnet = umschlag_oeffnen(&antwort)?;
            Ok(ClientAntwort {
                text: geoeffnet.text()?.to_string(),
                pruefsumme_gueltig,
            })
        }
        Nachricht::Fehler(meldung) => Err(ClientFehler::ServerFehler(meldung)),
    }
}
