//! # orakel-crypto
//!
//! Verschluesselung und Integritaetspruefung fuer Orakel-Umschlaege.
//!
//! ## Module
//! - `schluessel` - Fernet-Schluessel (vom Client mitgeliefert)
//! - `pruefsumme` - MD5-Digest ueber das Chiffrat
//! - `umschlag` - Umschlag oeffnen, pruefen und versiegeln
//! - `error` - Fehlertypen

pub mod error;
pub mod pruefsumme;
pub mod schluessel;
pub mod umschlag;

pub use error::{CryptoError, CryptoResult};
pub use pruefsumme::{PRUEFSUMMEN_LAENGE, pruefsumme, pruefsumme_gueltig};
pub use schluessel::Schluessel;
pub use umschlag::{GeoeffneterUmschlag, umschlag_oeffnen, umschlag_pruefen, umschlag_versiegeln};
