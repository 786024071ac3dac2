//! orakel-frage – stellt dem Orakel eine Frage
//!
//! Erzeugt pro Aufruf einen frischen Schluessel, sendet die verschluesselte
//! Frage und gibt die entschluesselte Antwort aus.

use anyhow::{Context, Result};
use clap::Parser;
use orakel_crypto::Schluessel;
use orakel_server::client::frage_stellen;

#[derive(Parser, Debug)]
#[command(name = "orakel-frage", version, about = "Stellt dem Orakel eine Frage", long_about = None)]
struct Argumente {
    /// Server-Host
    #[arg(short = 's', value_name = "HOST", default_value = "localhost")]
    server: String,

    /// Server-Port
    #[arg(short = 'p', value_name = "PORT")]
    port: u16,

    /// Maximale Groesse der Anfrage in Bytes
    #[arg(short = 'z', value_name = "BYTES", default_value_t = 4096)]
    puffer: usize,

    /// Die Frage
    #[arg(short = 'q', value_name = "FRAGE")]
    frage: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let argumente = Argumente::parse();
    orakel_observability::logging_initialisieren("warn", "text");

    let schluessel = Schluessel::generieren().context("Schluessel nicht erzeugbar")?;
    let antwort = frage_stellen(
        (argumente.server.as_str(), argumente.port),
        &argumente.frage,
        &schluessel,
        argumente.puffer,
    )
    .await
    .with_context(|| format!("Frage an {}:{} fehlgeschlagen", argumente.server, argumente.port))?;

    if !antwort.pruefsumme_gueltig {
        eprintln!("Warnung: Pruefsumme der Antwort ist ungueltig");
    }
    println!("{}", antwort.text);
    Ok(())
}
