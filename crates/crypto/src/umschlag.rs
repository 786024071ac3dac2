//! Umschlag oeffnen, pruefen und versiegeln
//!
//! Der Server verwendet immer den Schluessel, der im Umschlag mitkommt,
//! und antwortet unter genau diesem Schluessel.

use orakel_protocol::Umschlag;

use crate::error::CryptoResult;
use crate::pruefsumme::{pruefsumme, pruefsumme_gueltig};
use crate::schluessel::Schluessel;

/// Ergebnis von [`umschlag_oeffnen`]
#[derive(Debug)]
pub struct GeoeffneterUmschlag {
    /// Der mitgelieferte Schluessel, fuer die Antwort wiederverwendet
    pub schluessel: Schluessel,
    pub klartext: Vec<u8>,
}

impl GeoeffneterUmschlag {
    /// Klartext als UTF-8
    pub fn text(&self) -> CryptoResult<&str> {
        Ok(std::str::from_utf8(&self.klartext)?)
    }
}

/// Prueft ob `pruefsumme == digest(chiffrat)`
pub fn umschlag_pruefen(umschlag: &Umschlag) -> bool {
    pruefsumme_gueltig(&umschlag.chiffrat, &umschlag.pruefsumme)
}

/// Entschluesselt das Chiffrat mit dem beigelegten Schluessel
///
/// Die Pruefsumme wird hier nicht betrachtet.
pub fn umschlag_oeffnen(umschlag: &Umschlag) -> CryptoResult<GeoeffneterUmschlag> {
    let schluessel = Schluessel::aus_bytes(&umschlag.schluessel)?;
    let klartext = schluessel.entschluesseln(&umschlag.chiffrat)?;
    Ok(GeoeffneterUmschlag {
        schluessel,
        klartext,
    })
}

/// Verschluesselt `klartext` und berechnet eine frische Pruefsumme
pub fn umschlag_versiegeln(schluessel: &Schluessel, klartext: &[u8]) -> Umschlag {
    let chiffrat = schluessel.verschluesseln(klartext);
    let digest = pruefsumme(&chiffrat);
    Umschlag::neu(schluessel.als_bytes(), chiffrat, digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;

    #[test]
    fn versiegelter_umschlag_ist_gueltig() {
        let schluessel = Schluessel::generieren().unwrap();
        let umschlag = umschlag_versiegeln(&schluessel, b"2+2");
        assert!(umschlag_pruefen(&umschlag));
        assert_eq!(umschlag.schluessel, schluessel.als_bytes());
        assert_eq!(umschlag.pruefsumme.len(), crate::PRUEFSUMMEN_LAENGE);
    }

    #[test]
    fn oeffnen_liefert_klartext_und_schluessel() {
        let schluessel = Schluessel::generieren().unwrap();
        let umschlag = umschlag_versiegeln(&schluessel, "Wie spät ist es?".as_bytes());

        let geoeffnet = umschlag_oeffnen(&umschlag).unwrap();
        assert_eq!(geoeffnet.text().unwrap(), "Wie spät ist es?");
        assert_eq!(geoeffnet.schluessel.als_bytes(), schluessel.als_bytes());
    }

    #[test]
    fn falsche_pruefsumme_wird_erkannt_aber_oeffnen_klappt() {
        let schluessel = Schluessel::generieren().unwrap();
        let mut umschlag = umschlag_versiegeln(&schluessel, b"2+2");
        umschlag.pruefsumme[0] ^= 0xFF;

        assert!(!umschlag_pruefen(&umschlag));
        assert_eq!(umschlag_oeffnen(&umschlag).unwrap().klartext, b"2+2");
    }

    #[test]
    fn fremder_schluessel_im_umschlag() {
        let a = Schluessel::generieren().unwrap();
        let b = Schluessel::generieren().unwrap();
        let mut umschlag = umschlag_versiegeln(&a, b"geheim");
        umschlag.schluessel = b.als_bytes().to_vec();

        assert!(matches!(
            umschlag_oeffnen(&umschlag),
            Err(CryptoError::Entschluesselung(_))
        ));
    }

    #[test]
    fn klartext_ohne_utf8() {
        let schluessel = Schluessel::generieren().unwrap();
        let umschlag = umschlag_versiegeln(&schluessel, &[0xC3, 0x28]);
        let geoeffnet = umschlag_oeffnen(&umschlag).unwrap();
        assert!(matches!(geoeffnet.text(), Err(CryptoError::KeinText(_))));
    }
}
