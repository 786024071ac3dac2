//! Wire-Format fuer TCP-Verbindungen
//!
//! Versioniertes Binaer-Frame: Length(u32 big-endian) + Nutzlast.
//!
//! ## Frame-Format
//!
//! ```text
//! +-----------------+---------+-----+---------------------------+
//! | Laenge (u32 BE) | Version | Typ | Felder                    |
//! +-----------------+---------+-----+---------------------------+
//!
//! Typ 0x01 UMSCHLAG: [u32 len][schluessel] [u32 len][chiffrat] [u32 len][pruefsumme]
//! Typ 0x02 FEHLER:   [u16 code] [u32 len][UTF-8 text]
//! ```
//!
//! Die Laenge gibt die Anzahl der Nutzlast-Bytes an (ohne die 4 Laengen-Bytes).
//! Alle Zahlen sind big-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtokollFehler, ProtokollResult};
use crate::umschlag::{FehlerMeldung, Nachricht, Umschlag};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Aktuelle Protokollversion
pub const PROTOKOLL_VERSION: u8 = 1;

/// Frame-Typ fuer einen Umschlag
pub const TYP_UMSCHLAG: u8 = 0x01;

/// Frame-Typ fuer eine Fehlermeldung
pub const TYP_FEHLER: u8 = 0x02;

/// Groesse des Laengen-Felds in Bytes
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Standard-maximale Frame-Groesse (64 KiB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Version + Typ
const KOPF_GROESSE: usize = 2;

// ---------------------------------------------------------------------------
// Nutzlast
// ---------------------------------------------------------------------------

fn nutzlast_laenge(nachricht: &Nachricht) -> usize {
    match nachricht {
        Nachricht::Umschlag(u) => umschlag_nutzlast_laenge(u),
        Nachricht::Fehler(f) => KOPF_GROESSE + 2 + LENGTH_FIELD_SIZE + f.text.len(),
    }
}

fn umschlag_nutzlast_laenge(umschlag: &Umschlag) -> usize {
    KOPF_GROESSE + 3 * LENGTH_FIELD_SIZE + umschlag.nutzlast_laenge()
}

/// Prueft ob `umschlag` als Frame hoechstens `max_frame_size` Nutzlast-Bytes belegt
pub fn umschlag_passt(umschlag: &Umschlag, max_frame_size: usize) -> bool {
    umschlag_nutzlast_laenge(umschlag) <= max_frame_size
}

fn feld_schreiben(dst: &mut BytesMut, wert: &[u8]) {
    dst.put_u32(wert.len() as u32);
    dst.put_slice(wert);
}

fn nutzlast_schreiben(nachricht: &Nachricht, dst: &mut BytesMut) {
    dst.put_u8(PROTOKOLL_VERSION);
    dst.put_u8(nachricht.typ());
    match nachricht {
        Nachricht::Umschlag(u) => {
            feld_schreiben(dst, &u.schluessel);
            feld_schreiben(dst, &u.chiffrat);
            feld_schreiben(dst, &u.pruefsumme);
        }
        Nachricht::Fehler(f) => {
            dst.put_u16(f.code);
            feld_schreiben(dst, f.text.as_bytes());
        }
    }
}

fn feld_lesen(buf: &mut &[u8], feld: &'static str) -> ProtokollResult<Vec<u8>> {
    if buf.remaining() < LENGTH_FIELD_SIZE {
        return Err(ProtokollFehler::FeldAbgeschnitten { feld });
    }
    let laenge = buf.get_u32() as usize;
    if buf.remaining() < laenge {
        return Err(ProtokollFehler::FeldAbgeschnitten { feld });
    }
    let wert = buf[..laenge].to_vec();
    buf.advance(laenge);
    Ok(wert)
}

fn nutzlast_lesen(mut buf: &[u8]) -> ProtokollResult<Nachricht> {
    if buf.remaining() < KOPF_GROESSE {
        return Err(ProtokollFehler::FeldAbgeschnitten { feld: "kopf" });
    }

    let version = buf.get_u8();
    if version != PROTOKOLL_VERSION {
        return Err(ProtokollFehler::Version {
            erwartet: PROTOKOLL_VERSION,
            erhalten: version,
        });
    }

    let nachricht = match buf.get_u8() {
        TYP_UMSCHLAG => {
            let schluessel = feld_lesen(&mut buf, "schluessel")?;
            let chiffrat = feld_lesen(&mut buf, "chiffrat")?;
            let pruefsumme = feld_lesen(&mut buf, "pruefsumme")?;
            Nachricht::Umschlag(Umschlag {
                schluessel,
                chiffrat,
                pruefsumme,
            })
        }
        TYP_FEHLER => {
            if buf.remaining() < 2 {
                return Err(ProtokollFehler::FeldAbgeschnitten { feld: "code" });
            }
            let code = buf.get_u16();
            let text = String::from_utf8(feld_lesen(&mut buf, "text")?)?;
            Nachricht::Fehler(FehlerMeldung { code, text })
        }
        andere => return Err(ProtokollFehler::UnbekannterTyp(andere)),
    };

    if buf.has_remaining() {
        return Err(ProtokollFehler::UeberzaehligeBytes(buf.remaining()));
    }

    Ok(nachricht)
}

// ---------------------------------------------------------------------------
// Slice-Hilfsfunktionen
// ---------------------------------------------------------------------------

/// Gibt true zurueck sobald `src` mindestens ein vollstaendiges Frame enthaelt
pub fn frame_vollstaendig(src: &[u8]) -> bool {
    if src.len() < LENGTH_FIELD_SIZE {
        return false;
    }
    let laenge = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
    src.len() - LENGTH_FIELD_SIZE >= laenge
}

/// Kodiert eine Nachricht als vollstaendiges Frame
pub fn frame_kodieren(nachricht: &Nachricht, max_frame_size: usize) -> ProtokollResult<Bytes> {
    let laenge = nutzlast_laenge(nachricht);
    if laenge > max_frame_size {
        return Err(ProtokollFehler::ZuGross {
            laenge,
            maximum: max_frame_size,
        });
    }

    let mut dst = BytesMut::with_capacity(LENGTH_FIELD_SIZE + laenge);
    dst.put_u32(laenge as u32);
    nutzlast_schreiben(nachricht, &mut dst);
    Ok(dst.freeze())
}

/// Dekodiert genau ein Frame aus `src`
///
/// Wartet nicht auf weitere Daten: ein abgeschnittenes Frame ist ein Fehler, ebenso Bytes hinter dem
/// Frame-Ende.
pub fn frame_dekodieren(src: &[u8], max_frame_size: usize) -> ProtokollResult<Nachricht> {
    if src.len() < LENGTH_FIELD_SIZE {
        return Err(ProtokollFehler::Unvollstaendig {
            erwartet: LENGTH_FIELD_SIZE,
            erhalten: src.len(),
        });
    }

    let laenge = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
    if laenge > max_frame_size {
        return Err(ProtokollFehler::ZuGross {
            laenge,
            maximum: max_frame_size,
        });
    }

    let gesamt = LENGTH_FIELD_SIZE + laenge;
    if src.len() < gesamt {
        return Err(ProtokollFehler::Unvollstaendig {
            erwartet: gesamt,
            erhalten: src.len(),
        });
    }
    if src.len() > gesamt {
        return Err(ProtokollFehler::UeberzaehligeBytes(src.len() - gesamt));
    }

    nutzlast_lesen(&src[LENGTH_FIELD_SIZE..gesamt])
}

// ---------------------------------------------------------------------------
// Async Lesen/Schreiben
// ---------------------------------------------------------------------------

/// Liest ein einzelnes Frame aus einem `AsyncRead`
///
/// # Fehler
/// - `Io(UnexpectedEof)` wenn die Verbindung vor Abschluss des Frames endet
/// - `ZuGross` wenn das Laengen-Feld `max_frame_size` ueberschreitet
pub async fn frame_lesen<R>(reader: &mut R, max_frame_size: usize) -> ProtokollResult<Nachricht>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; LENGTH_FIELD_SIZE];
    reader.read_exact(&mut len_buf).await?;
    let laenge = u32::from_be_bytes(len_buf) as usize;

    if laenge > max_frame_size {
        return Err(ProtokollFehler::ZuGross {
            laenge,
            maximum: max_frame_size,
        });
    }

    let mut nutzlast = vec![0u8; laenge];
    reader.read_exact(&mut nutzlast).await?;
    nutzlast_lesen(&nutzlast)
}

/// Schreibt ein einzelnes Frame in einen `AsyncWrite`
pub async fn frame_schreiben<W>(
    writer: &mut W,
    nachricht: &Nachricht,
    max_frame_size: usize,
) -> ProtokollResult<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = frame_kodieren(nachricht, max_frame_size)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
