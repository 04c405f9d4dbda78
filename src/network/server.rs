//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel;

use crate::backend::MemoryBackend;
use crate::config::Config;
use crate::error::{Result, StateError};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Signals a running server to stop accepting connections
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Development key-value server
pub struct Server {
    config: Config,
    backend: MemoryBackend,
    listener: TcpListener,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Bind the listener on `config.listen_addr`
    ///
    /// Port 0 picks an ephemeral port; see [`Server::local_addr`].
    pub fn bind(config: Config, backend: MemoryBackend) -> Result<Self> {
        if config.worker_threads == 0 {
            return Err(StateError::Config(
                "server needs at least one worker thread".to_string(),
            ));
        }

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            backend,
            listener,
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Start the server (blocking until shutdown)
    ///
    /// Workers drain in-flight connections before this returns.
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Serving on {} with {} workers",
            self.local_addr()?,
            self.config.worker_threads
        );

        let (sender, receiver) = channel::bounded(self.config.worker_threads * 4);

        let workers: Vec<_> = (0..self.config.worker_threads)
            .map(|id| {
                let receiver = receiver.clone();
                let backend = self.backend.clone();
                let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

                thread::Builder::new()
                    .name(format!("statekv-worker-{}", id))
                    .spawn(move || {
                        for stream in receiver.iter() {
                            let served = Connection::new(stream, backend.clone()).and_then(|mut conn| {
                                conn.set_timeouts(read_ms, write_ms)?;
                                conn.handle()
                            });
                            if let Err(e) = served {
                                tracing::warn!("Connection failed: {}", e);
                            }
                        }
                    })
            })
            .collect::<std::io::Result<_>>()?;

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::trace!("Accepted connection from {}", peer);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    if sender.send(stream).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        drop(sender);
        for worker in workers {
            let _ = worker.join();
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }
}
