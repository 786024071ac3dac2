//! orakel-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod listener;
pub mod sitzung;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::{ServerConfig, SprachModus};
use listener::OrakelListener;
use orakel_antwort::{AntwortQuelle, WolframAlpha, WolframKonfig};
use orakel_sprache::{GoogleTts, GoogleTtsKonfig, KommandoSprecher, Sprecher, StummerSprecher};
use sitzung::{SitzungsHandler, SitzungsKonfig};
use tokio::sync::watch;

/// Haelt den Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    antwort: Arc<dyn AntwortQuelle>,
    sprecher: Arc<dyn Sprecher>,
}

impl Server {
    /// Erstellt einen Server mit expliziten Faehigkeiten (z.B. Test-Stubs)
    pub fn neu(
        config: ServerConfig,
        antwort: Arc<dyn AntwortQuelle>,
        sprecher: Arc<dyn Sprecher>,
    ) -> Self {
        Self {
            config,
            antwort,
            sprecher,
        }
    }

    /// Erstellt Wolfram-Alpha-Client und Sprecher aus der Konfiguration
    pub fn aus_konfig(config: ServerConfig) -> Result<Self> {
        let app_id = config.app_id();
        if app_id.is_none() {
            tracing::warn!(
                env = config::ENV_APP_ID,
                "Keine Wolfram-Alpha-App-ID gesetzt, alle Fragen werden mit einer Entschuldigung beantwortet"
            );
        }

        let wolfram = WolframAlpha::neu(WolframKonfig {
            app_id,
            api_url: config.antwort.api_url.clone(),
            timeout: config.antwort_timeout(),
        })
        .context("HTTP-Client fuer Wolfram Alpha nicht erstellbar")?;

        let sprecher = sprecher_aus_konfig(&config)?;
        Ok(Self::neu(config, Arc::new(wolfram), sprecher))
    }

    /// Bindet den Server-Socket laut Konfiguration
    pub async fn binden(&self) -> Result<OrakelListener> {
        let netzwerk = &self.config.netzwerk;
        OrakelListener::binden(
            &netzwerk.bind_adresse,
            netzwerk.port,
            netzwerk.backlog,
            netzwerk.max_parallele_sitzungen,
        )
        .await
        .with_context(|| format!("Bind an {} fehlgeschlagen", self.config.bind_adresse()))
    }

    pub fn sitzungs_handler(&self) -> Arc<SitzungsHandler> {
        Arc::new(SitzungsHandler::neu(
            SitzungsKonfig {
                puffer_groesse: self.config.netzwerk.puffer_groesse,
                pruefsumme_erzwingen: self.config.sicherheit.pruefsumme_erzwingen,
            },
            Arc::clone(&self.antwort),
            Arc::clone(&self.sprecher),
        ))
    }

    /// Bindet, bedient Clients und laeuft bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            adresse = %self.config.bind_adresse(),
            backlog = self.config.netzwerk.backlog,
            puffer_groesse = self.config.netzwerk.puffer_groesse,
            sprache = ?self.config.sprache.modus,
            "Server startet"
        );

        let listener = self.binden().await?;
        let handler = self.sitzungs_handler();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                let _ = shutdown_tx.send(true);
            }
        });

        listener.laufen(handler, shutdown_rx).await?;
        Ok(())
    }
}

/// Waehlt die Sprachausgabe laut `[sprache]`
pub fn sprecher_aus_konfig(config: &ServerConfig) -> Result<Arc<dyn Sprecher>> {
    let sprache = &config.sprache;
    let sprecher: Arc<dyn Sprecher> = match sprache.modus {
        SprachModus::Stumm => Arc::new(StummerSprecher),
        SprachModus::Google => Arc::new(
            GoogleTts::neu(GoogleTtsKonfig {
                sprache: sprache.sprache.clone(),
                player: sprache.player.clone(),
                datei: sprache.datei.clone(),
                ..GoogleTtsKonfig::default()
            })
            .context("HTTP-Client fuer Sprachsynthese nicht erstellbar")?,
        ),
        SprachModus::Kommando => {
            let (programm, argumente) = sprache
                .kommando
                .split_first()
                .context("[sprache] kommando darf nicht leer sein")?;
            Arc::new(KommandoSprecher::neu(programm.clone(), argumente.to_vec()))
        }
    };
    Ok(sprecher)
}
