//! Kommandozeile des Servers
//!
//! `-p`, `-b` und `-z` sind Pflicht. Fehlt eines davon oder ist ein Wert
//! keine Zahl, endet der Prozess mit Status 1, bevor ein Socket gebunden wird.

use std::ffi::OsString;
use std::num::ParseIntError;
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use thiserror::Error;

/// Orakel-Server: beantwortet verschluesselte Fragen
#[derive(Parser, Debug)]
#[command(name = "orakel-server", version, about, long_about = None)]
struct Argumente {
    /// Server-Port
    #[arg(short = 'p', value_name = "PORT")]
    port: Option<String>,

    /// Groesse des Verbindungs-Backlogs
    #[arg(short = 'b', value_name = "BACKLOG")]
    backlog: Option<String>,

    /// Groesse des Empfangspuffers in Bytes
    #[arg(short = 'z', value_name = "BYTES")]
    puffer: Option<String>,

    /// Bind-Host (ueberschreibt die Konfigurationsdatei)
    #[arg(short = 'H', long = "host", value_name = "HOST")]
    host: Option<String>,

    /// Pfad zur TOML-Konfiguration
    #[arg(short = 'c', long = "config", value_name = "DATEI")]
    config: Option<PathBuf>,
}

/// Ausgewertete Startparameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartArgumente {
    pub port: u16,
    pub backlog: u32,
    pub puffer_groesse: usize,
    pub host: Option<String>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum CliFehler {
    #[error("{meldung}")]
    FehlendesFlag { flag: char, meldung: &'static str },

    #[error("Ungueltiger Wert '{wert}' fuer -{flag}: {fehler}")]
    KeineZahl {
        flag: char,
        wert: String,
        fehler: ParseIntError,
    },

    #[error("Ungueltiger Wert fuer -{flag}: {grund}")]
    Ungueltig { flag: char, grund: &'static str },

    #[error(transparent)]
    Clap(#[from] clap::Error),
}

impl CliFehler {
    /// Exit-Code des Prozesses (Hilfe/Version: 0, sonst 1)
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Clap(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => 0,
            _ => 1,
        }
    }

    /// Gibt die Meldung aus, Hilfe und Version auf stdout
    pub fn ausgeben(&self) {
        match self {
            Self::Clap(e) => {
                let _ = e.print();
            }
            andere => eprintln!("{andere}"),
        }
    }
}

fn pflicht(wert: Option<String>, flag: char, meldung: &'static str) -> Result<String, CliFehler> {
    wert.ok_or(CliFehler::FehlendesFlag { flag, meldung })
}

fn zahl<T>(wert: String, flag: char) -> Result<T, CliFehler>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    wert.trim()
        .parse()
        .map_err(|fehler| CliFehler::KeineZahl { flag, wert, fehler })
}

/// Wertet die Kommandozeile aus (erstes Element = Programmname)
pub fn auswerten<I, T>(args: I) -> Result<StartArgumente, CliFehler>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argumente = Argumente::try_parse_from(args)?;

    // Reihenfolge wie in der Usage: erst alle Pflicht-Flags, dann Zahlen
    let port = pflicht(argumente.port, 'p', "Please set server port with the -p flag.")?;
    let backlog = pflicht(argumente.backlog, 'b', "Please set backlog size with the -b flag.")?;
    let puffer = pflicht(argumente.puffer, 'z', "Please set socket size with the -z flag.")?;

    let port = zahl(port, 'p')?;
    let backlog = zahl(backlog, 'b')?;
    let puffer_groesse: usize = zahl(puffer, 'z')?;
    if puffer_groesse == 0 {
        return Err(CliFehler::Ungueltig {
            flag: 'z',
            grund: "Puffer-Groesse muss mindestens 1 Byte sein",
        });
    }

    Ok(StartArgumente {
        port,
        backlog,
        puffer_groesse,
        host: argumente.host,
        config: argumente.config,
    })
}
