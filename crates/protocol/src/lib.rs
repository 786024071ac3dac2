//! orakel-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert den Umschlag (Schluessel, Chiffrat, Pruefsumme)
//! und das versionierte Binaer-Frame, in dem Client und Server ihn
//! austauschen.

pub mod error;
pub mod umschlag;
pub mod wire;

pub use error::{ProtokollFehler, ProtokollResult};
pub use umschlag::{FehlerMeldung, Nachricht, Umschlag};
pub use wire::{frame_dekodieren, frame_kodieren, frame_vollstaendig, umschlag_passt};
