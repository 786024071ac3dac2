//! MD5-Pruefsumme ueber das Chiffrat
//!
//! Dient nur der Integritaets-Signalisierung, nicht der Authentifizierung:
//! wer das Chiffrat aendern kann, kann auch die Pruefsumme neu berechnen.

use md5::{Digest, Md5};

/// Laenge eines MD5-Digests in Bytes
pub const PRUEFSUMMEN_LAENGE: usize = 16;

/// Berechnet den Digest ueber `daten`
pub fn pruefsumme(daten: &[u8]) -> [u8; PRUEFSUMMEN_LAENGE] {
    let mut digest = [0u8; PRUEFSUMMEN_LAENGE];
    digest.copy_from_slice(&Md5::digest(daten));
    digest
}

/// Vergleicht den neu berechneten Digest byteweise mit `erwartet`
pub fn pruefsumme_gueltig(daten: &[u8], erwartet: &[u8]) -> bool {
    pruefsumme(daten).as_slice() == erwartet
}
