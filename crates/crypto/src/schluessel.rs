//! Fernet-Schluessel
//!
//! Der Schluessel wird als Base64url-kodierte 32 Bytes transportiert
//! (16 Bytes Signatur-Schluessel + 16 Bytes AES-128-Schluessel). Das
//! Chiffrat ist ein Fernet-Token, ebenfalls ASCII.

use fernet::Fernet;

use crate::error::{CryptoError, CryptoResult};

/// Symmetrischer Schluessel eines Umschlags
pub struct Schluessel {
    kodiert: String,
    fernet: Fernet,
}

impl Schluessel {
    /// Erzeugt einen neuen Zufallsschluessel (nur clientseitig benoetigt)
    pub fn generieren() -> CryptoResult<Self> {
        let kodiert = Fernet::generate_key();
        let fernet = Fernet::new(&kodiert).ok_or(CryptoError::SchluesselGenerierung)?;
        Ok(Self { kodiert, fernet })
    }

    /// Liest einen Schluessel aus den Bytes eines Umschlags
    pub fn aus_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let kodiert = std::str::from_utf8(bytes)
            .map_err(|_| CryptoError::UngueltigerSchluessel("kein ASCII".into()))?
            .to_string();
        let fernet = Fernet::new(&kodiert).ok_or_else(|| {
            CryptoError::UngueltigerSchluessel(format!(
                "kein Base64url-kodierter 32-Byte-Schluessel ({} Bytes)",
                bytes.len()
            ))
        })?;
        Ok(Self { kodiert, fernet })
    }

    /// Schluessel in der Form, in der er im Umschlag steht
    pub fn als_bytes(&self) -> &[u8] {
        self.kodiert.as_bytes()
    }

    /// Verschluesselt `klartext` zu einem Fernet-Token
    pub fn verschluesseln(&self, klartext: &[u8]) -> Vec<u8> {
        self.fernet.encrypt(klartext).into_bytes()
    }

    /// Entschluesselt ein Fernet-Token
    ///
    /// Schlaegt fehl wenn das Token nicht mit diesem Schluessel erzeugt wurde.
    pub fn entschluesseln(&self, chiffrat: &[u8]) -> CryptoResult<Vec<u8>> {
        let token = std::str::from_utf8(chiffrat)
            .map_err(|_| CryptoError::Entschluesselung("Token ist kein ASCII".into()))?;
        self.fernet.decrypt(token).map_err(|_| {
            CryptoError::Entschluesselung(
                "Token ungueltig oder mit anderem Schluessel erzeugt".into(),
            )
        })
    }
}

impl std::fmt::Debug for Schluessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schluessel")
            .field("laenge", &self.kodiert.len())
            .finish_non_exhaustive()
    }
}
