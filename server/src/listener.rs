//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! ## Concurrency-Modell
//! Vor jedem `accept` wird eine Sitzungs-Erlaubnis aus einem Semaphor
//! geholt. Mit `max_parallele_sitzungen = 1` bedient der Server also streng
//! einen Client nach dem anderen; weitere Clients warten in der Backlog-Queue
//! des Betriebssystems.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tokio::sync::{Semaphore, watch};

use crate::sitzung::SitzungsHandler;

/// Gebundener Server-Socket
pub struct OrakelListener {
    listener: TcpListener,
    sitzungen: Arc<Semaphore>,
}

impl OrakelListener {
    /// Bindet `host:port` mit der angegebenen Backlog-Groesse
    ///
    /// `host` darf ein Name sein (z.B. `localhost`); verwendet wird die erste
    /// aufgeloeste Adresse.
    pub async fn binden(
        host: &str,
        port: u16,
        backlog: u32,
        max_parallele_sitzungen: usize,
    ) -> std::io::Result<Self> {
        let adresse = lookup_host((host, port)).await?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("Host '{host}' konnte nicht aufgeloest werden"),
            )
        })?;

        let socket = match adresse {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(adresse)?;
        let listener = socket.listen(backlog)?;

        tracing::info!(
            adresse = %listener.local_addr()?,
            backlog,
            max_parallele_sitzungen,
            "Server-Socket gebunden"
        );

        Ok(Self {
            listener,
            sitzungen: Arc::new(Semaphore::new(max_parallele_sitzungen.max(1))),
        })
    }

    /// Tatsaechlich gebundene Adresse (relevant bei Port 0)
    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept-Loop; laeuft bis `shutdown_rx` ein `true`-Signal empfaengt
    ///
    /// Fehler einzelner Sitzungen beenden die Loop nie.
    pub async fn laufen(
        self,
        handler: Arc<SitzungsHandler>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        tracing::info!(adresse = %self.listener.local_addr()?, "Warte auf Verbindungen");

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let erlaubnis = tokio::select! {
                erlaubnis = Arc::clone(&self.sitzungen).acquire_owned() => match erlaubnis {
                    Ok(erlaubnis) => erlaubnis,
                    Err(_) => break,
                },
                Ok(()) = shutdown_rx.changed() => continue,
            };

            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let handler = Arc::clone(&handler);
                            tokio::spawn(async move {
                                handler.behandeln(stream, peer_addr).await;
                                drop(erlaubnis);
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {}
            }
        }

        tracing::info!("Shutdown-Signal empfangen, Listener gestoppt");
        Ok(())
    }
}
