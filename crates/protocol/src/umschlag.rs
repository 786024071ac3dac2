//! Umschlag und Protokoll-Nachrichten
//!
//! Ein Umschlag transportiert genau eine Frage oder Antwort. Der Sender legt
//! den symmetrischen Schluessel selbst bei; der Server besitzt keinen eigenen
//! Schluesselspeicher.

/// (Schluessel, Chiffrat, Pruefsumme) – lebt nur fuer einen Austausch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Umschlag {
    /// Symmetrischer Schluessel (Fernet, Base64url-kodiert)
    pub schluessel: Vec<u8>,
    /// Verschluesselte Nutzlast (Fernet-Token)
    pub chiffrat: Vec<u8>,
    /// Digest ueber `chiffrat`
    pub pruefsumme: Vec<u8>,
}

impl Umschlag {
    pub fn neu(
        schluessel: impl Into<Vec<u8>>,
        chiffrat: impl Into<Vec<u8>>,
        pruefsumme: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            schluessel: schluessel.into(),
            chiffrat: chiffrat.into(),
            pruefsumme: pruefsumme.into(),
        }
    }

    /// Summe der Feldlaengen (ohne Frame-Overhead)
    pub fn nutzlast_laenge(&self) -> usize {
        self.schluessel.len() + self.chiffrat.len() + self.pruefsumme.len()
    }
}

/// Explizite Fehlerantwort des Servers (z.B. bei verletzter Integritaet)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FehlerMeldung {
    pub code: u16,
    pub text: String,
}

impl FehlerMeldung {
    pub fn neu(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }
}

/// Alles, was in einem Frame uebertragen werden kann
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nachricht {
    Umschlag(Umschlag),
    Fehler(FehlerMeldung),
}

impl Nachricht {
    /// Frame-Typ-Byte fuer das Wire-Format
    pub fn typ(&self) -> u8 {
        match self {
            Nachricht::Umschlag(_) => crate::wire::TYP_UMSCHLAG,
            Nachricht::Fehler(_) => crate::wire::TYP_FEHLER,
        }
    }
}

impl From<Umschlag> for Nachricht {
    fn from(umschlag: Umschlag) -> Self {
        Nachricht::Umschlag(umschlag)
    }
}

impl From<FehlerMeldung> for Nachricht {
    fn from(meldung: FehlerMeldung) -> Self {
        Nachricht::Fehler(meldung)
    }
}
