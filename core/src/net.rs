/*
 * net.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of pop3_core, the POP3 client engine of Tagliacarte.
 *
 * pop3_core is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pop3_core is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pop3_core.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Transport for POP3: a TCP stream, optionally wrapped in rustls for implicit
//! TLS (POP3S, port 995).
//!
//! The transport knows nothing about lines or status tokens. It offers the
//! primitives the session engine is built on: write all bytes, read one chunk,
//! close. Each primitive is bounded by an optional deadline.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::ClientConfig;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::RootCertStore;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::protocol::pop3::{Pop3Error, Result};

/// Build a root certificate store: platform native certs first, then webpki-roots as fallback.
fn build_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            for cert in certs {
                let _ = root_store.add(cert);
            }
        }
        Err(e) => warn!("could not load native root certificates: {}", e),
    }
    if root_store.is_empty() {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    root_store
}

static DEFAULT_CLIENT_CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();

/// Default TLS client config (native + Mozilla roots, no client auth).
/// Used whenever a caller asks for TLS without supplying its own config.
pub fn default_client_config() -> Arc<ClientConfig> {
    DEFAULT_CLIENT_CONFIG
        .get_or_init(|| {
            let config = ClientConfig::builder()
                .with_root_certificates(build_root_store())
                .with_no_client_auth();
            Arc::new(config)
        })
        .clone()
}

/// Split `host:port` into host and port. IPv6 literals may be bracketed (`[::1]:110`).
pub fn split_address(address: &str) -> Result<(&str, u16)> {
    let invalid = || Pop3Error::InvalidAddress(address.to_string());
    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    let port: u16 = port.parse().map_err(|_| invalid())?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(invalid());
    }
    Ok((host, port))
}

/// Byte stream for POP3: plain TCP or TLS.
pub enum Pop3Stream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for Pop3Stream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Pop3Stream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            Pop3Stream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Pop3Stream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Pop3Stream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            Pop3Stream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Pop3Stream::Plain(s) => Pin::new(s).poll_flush(cx),
            Pop3Stream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Pop3Stream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            Pop3Stream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Per-operation time limits. `None` waits indefinitely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadlines {
    /// Bounds the TCP dial and, separately, the TLS handshake.
    pub connect: Option<Duration>,
    /// Bounds each write and each chunk read.
    pub io: Option<Duration>,
}

async fn with_deadline<T, F>(limit: Option<Duration>, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Pop3Error::Timeout { operation })?,
        None => fut.await,
    }
}

/// An open POP3 connection. Owned by exactly one session.
pub struct Transport {
    stream: Option<Pop3Stream>,
    deadlines: Deadlines,
}

impl Transport {
    /// Dial `address` (`host:port`) and, when `use_tls` is set, perform the TLS
    /// handshake with `tls_config` (or [`default_client_config`] when `None`).
    /// Nothing is retried.
    pub async fn open(
        address: &str,
        tls_config: Option<Arc<ClientConfig>>,
        use_tls: bool,
        deadlines: Deadlines,
    ) -> Result<Self> {
        let (host, _) = split_address(address)?;
        let tcp = with_deadline(deadlines.connect, "connect", async {
            TcpStream::connect(address)
                .await
                .map_err(|source| Pop3Error::Connect {
                    address: address.to_string(),
                    source,
                })
        })
        .await?;
        if let Err(e) = tcp.set_nodelay(true) {
            debug!("set_nodelay failed: {}", e);
        }

        let stream = if use_tls {
            let server_name = ServerName::try_from(host)
                .map_err(|_| Pop3Error::InvalidAddress(address.to_string()))?
                .to_owned();
            let connector = TlsConnector::from(tls_config.unwrap_or_else(default_client_config));
            let tls = with_deadline(deadlines.connect, "TLS handshake", async {
                connector
                    .connect(server_name, tcp)
                    .await
                    .map_err(|source| Pop3Error::Tls {
                        address: address.to_string(),
                        source,
                    })
            })
            .await?;
            Pop3Stream::Tls(Box::new(tls))
        } else {
            Pop3Stream::Plain(tcp)
        };
        debug!(address, tls = use_tls, "transport open");
        Ok(Self {
            stream: Some(stream),
            deadlines,
        })
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self.stream, Some(Pop3Stream::Tls(_)))
    }

    /// Write all of `bytes` and flush. A short write surfaces as an I/O error.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        let limit = self.deadlines.io;
        let stream = self.stream.as_mut().ok_or(Pop3Error::NotConnected)?;
        with_deadline(limit, "write", async {
            stream.write_all(bytes).await?;
            stream.flush().await?;
            Ok::<_, Pop3Error>(bytes.len())
        })
        .await
    }

    /// Wait for at least one byte and return at most `max_bytes`.
    /// End of stream is [`Pop3Error::ConnectionClosed`], never an empty chunk.
    pub async fn read_chunk(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        let limit = self.deadlines.io;
        let stream = self.stream.as_mut().ok_or(Pop3Error::NotConnected)?;
        let mut buf = vec![0u8; max_bytes.max(1)];
        let n = with_deadline(limit, "read", async {
            Ok::<_, Pop3Error>(stream.read(&mut buf).await?)
        })
        .await?;
        if n == 0 {
            return Err(Pop3Error::ConnectionClosed);
        }
        buf.truncate(n);
        Ok(buf)
    }

    /// Shut down and release the socket. Safe to call more than once.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("shutdown on close failed: {}", e);
            }
            debug!("transport closed");
        }
    }
}
