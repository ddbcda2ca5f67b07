/*
 * client.rs
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

//! POP3 session engine: connect and greeting, USER/PASS, STAT, LIST, RETR,
//! DELE, RSET, NOOP, TOP, QUIT.
//!
//! A session is not for concurrent use. Every command takes `&mut self`, writes
//! one command line and waits for the complete response before returning.
//! Callers that need parallel conversations open several sessions.
//!
//! Commands are not guarded by protocol state unless [`Pop3Config::strict_state`]
//! is set: a transaction command sent before PASS succeeds goes to the server,
//! and whatever the server answers (usually `-ERR`) is returned.

use std::sync::Arc;

use bytes::Bytes;
use tokio_rustls::rustls::ClientConfig;

use super::error::{Pop3Error, Result};
use super::observer::{SessionObserver, TracingObserver};
use super::response::{LineBuffer, MultiLine, Reply, Response, Status, TERMINATOR};
use crate::config::Pop3Config;
use crate::net::Transport;

/// POP3 session states (RFC 1939 section 3, without UPDATE which is server side).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authorization,
    Transaction,
    Terminated,
}

/// Format a command line (without CRLF). Arguments must not contain line breaks.
fn command_line(verb: &str, arg: Option<&str>) -> Result<String> {
    match arg {
        None => Ok(verb.to_string()),
        Some(arg) if arg.contains(|c: char| c == '\r' || c == '\n') => Err(
            Pop3Error::InvalidArgument(format!("{} argument contains a line break", verb)),
        ),
        Some(arg) => Ok(format!("{} {}", verb, arg)),
    }
}

/// POP3 session over a plain or TLS transport. Connect, USER/PASS, commands, then quit.
pub struct Pop3Session {
    transport: Option<Transport>,
    address: String,
    greeting: String,
    authorized: bool,
    encrypted: bool,
    state: SessionState,
    lines: LineBuffer,
    chunk_size: usize,
    strict_state: bool,
    observer: Box<dyn SessionObserver>,
}

impl Pop3Session {
    /// Connect with default settings and log through `tracing`.
    /// `tls_config` may be `None` to use the system roots.
    pub async fn connect(
        address: &str,
        tls_config: Option<Arc<ClientConfig>>,
        use_tls: bool,
    ) -> Result<Self> {
        let config = Pop3Config::new(address, use_tls);
        Self::connect_with(&config, tls_config, Box::new(TracingObserver)).await
    }

    /// Open the transport and read the greeting. Fails unless the greeting is `+OK`;
    /// no session is returned on failure.
    pub async fn connect_with(
        config: &Pop3Config,
        tls_config: Option<Arc<ClientConfig>>,
        observer: Box<dyn SessionObserver>,
    ) -> Result<Self> {
        let mut session = Self {
            transport: None,
            address: String::new(),
            greeting: String::new(),
            authorized: false,
            encrypted: config.use_tls,
            state: SessionState::Connecting,
            lines: LineBuffer::new().with_max_line(config.max_line_length),
            chunk_size: config.chunk_size.max(1),
            strict_state: config.strict_state,
            observer,
        };
        let transport = Transport::open(
            &config.address,
            tls_config,
            config.use_tls,
            config.deadlines(),
        )
        .await?;
        session.transport = Some(transport);
        session.address = config.address.clone();
        session.state = SessionState::Authorization;
        session.observer.connected(&session.address, session.encrypted);

        if let Err(e) = session.read_greeting().await {
            session.terminate().await;
            return Err(e);
        }
        Ok(session)
    }

    async fn read_greeting(&mut self) -> Result<()> {
        let line = self.read_status_line().await?;
        self.observer.greeting(&line);
        if Status::classify(&line) != Some(Status::Ok) {
            return Err(Pop3Error::GreetingRejected(line));
        }
        self.greeting = line;
        self.authorized = true;
        Ok(())
    }

    /// Greeting line captured at connect (empty after quit).
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// True once a `+OK` greeting was seen; false again after quit.
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Server address (empty after quit).
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// USER name. Many servers accept any name here and only judge at PASS.
    pub async fn user(&mut self, name: &str) -> Result<Reply> {
        self.require_state("USER", SessionState::Authorization)?;
        self.simple_command("USER", Some(name)).await
    }

    /// PASS password. A `+OK` moves the session to the transaction state; a `-ERR`
    /// is returned as is, and the caller decides whether to retry or quit.
    pub async fn pass(&mut self, password: &str) -> Result<Reply> {
        self.require_state("PASS", SessionState::Authorization)?;
        let reply = self.simple_command("PASS", Some(password)).await?;
        if reply.is_ok() {
            self.state = SessionState::Transaction;
        }
        Ok(reply)
    }

    /// STAT: `+OK count size`. See [`Reply::stat`].
    pub async fn stat(&mut self) -> Result<Reply> {
        self.require_state("STAT", SessionState::Transaction)?;
        self.simple_command("STAT", None).await
    }

    /// LIST. Without a message number the answer is a listing (or a single `-ERR`);
    /// with one it is a single `+OK msg size` or `-ERR` line.
    pub async fn list(&mut self, msg_no: Option<u32>) -> Result<Response> {
        self.require_state("LIST", SessionState::Transaction)?;
        match msg_no {
            Some(n) => {
                let reply = self.simple_command("LIST", Some(&n.to_string())).await?;
                Ok(Response::Single(reply))
            }
            None => {
                self.send_command("LIST", None).await?;
                self.read_response().await
            }
        }
    }

    /// RETR msg. `+OK` followed by the message lines and the terminator, or a
    /// single `-ERR` line (no terminator is waited for).
    pub async fn retr(&mut self, msg: &str) -> Result<Response> {
        self.require_state("RETR", SessionState::Transaction)?;
        self.send_command("RETR", Some(msg)).await?;
        self.read_response().await
    }

    /// DELE msg. The server only removes marked messages when the session quits.
    pub async fn dele(&mut self, msg: &str) -> Result<Reply> {
        self.require_state("DELE", SessionState::Transaction)?;
        self.simple_command("DELE", Some(msg)).await
    }

    /// RSET: unmark every message marked by DELE in this session.
    pub async fn rset(&mut self) -> Result<Reply> {
        self.require_state("RSET", SessionState::Transaction)?;
        self.simple_command("RSET", None).await
    }

    pub async fn noop(&mut self) -> Result<Reply> {
        self.require_state("NOOP", SessionState::Transaction)?;
        self.simple_command("NOOP", None).await
    }

    /// TOP msg n: headers, blank line, then the first `lines` body lines.
    /// Same shape rules as [`Pop3Session::retr`].
    pub async fn top(&mut self, msg_no: u32, lines: u32) -> Result<Response> {
        self.require_state("TOP", SessionState::Transaction)?;
        if msg_no == 0 {
            return Err(Pop3Error::InvalidArgument(
                "TOP message number must be at least 1".to_string(),
            ));
        }
        self.send_command("TOP", Some(&format!("{} {}", msg_no, lines)))
            .await?;
        self.read_response().await
    }

    /// QUIT. The transport is closed and the session reset whatever the server
    /// answers, and also when the exchange itself fails.
    pub async fn quit(&mut self) -> Result<Reply> {
        if self.transport.is_none() {
            return Err(Pop3Error::NotConnected);
        }
        let result = match self.send_command("QUIT", None).await {
            Ok(()) => self.read_reply().await,
            Err(e) => Err(e),
        };
        self.terminate().await;
        result
    }

    /// Release the transport and clear everything but the encryption flag.
    async fn terminate(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            self.observer.closed(&self.address);
        }
        self.address.clear();
        self.greeting.clear();
        self.authorized = false;
        self.state = SessionState::Terminated;
        self.lines.clear();
    }

    fn require_state(&self, command: &'static str, expected: SessionState) -> Result<()> {
        if self.transport.is_none() {
            return Err(Pop3Error::NotConnected);
        }
        if self.strict_state && self.state != expected {
            return Err(Pop3Error::WrongState {
                command,
                state: self.state,
            });
        }
        Ok(())
    }

    async fn simple_command(&mut self, verb: &'static str, arg: Option<&str>) -> Result<Reply> {
        self.send_command(verb, arg).await?;
        self.read_reply().await
    }

    async fn send_command(&mut self, verb: &'static str, arg: Option<&str>) -> Result<()> {
        let line = command_line(verb, arg)?;
        if verb == "PASS" {
            self.observer.command("PASS ****");
        } else {
            self.observer.command(&line);
        }
        let transport = self.transport.as_mut().ok_or(Pop3Error::NotConnected)?;
        transport.write(format!("{}\r\n", line).as_bytes()).await?;
        Ok(())
    }

    /// Next complete line as raw bytes, reading more chunks as needed.
    async fn read_line(&mut self) -> Result<Bytes> {
        loop {
            if let Some(line) = self.lines.next_line()? {
                return Ok(line);
            }
            let transport = self.transport.as_mut().ok_or(Pop3Error::NotConnected)?;
            let chunk = transport.read_chunk(self.chunk_size).await?;
            self.lines.extend(&chunk);
        }
    }

    /// Next line decoded as a status line.
    async fn read_status_line(&mut self) -> Result<String> {
        let line = self.read_line().await?;
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let line = self.read_line().await?;
        self.parse_reply(&line)
    }

    /// Status text is expected to be ASCII; other bytes are replaced rather
    /// than rejected.
    fn parse_reply(&mut self, raw: &[u8]) -> Result<Reply> {
        let line = String::from_utf8_lossy(raw).into_owned();
        self.observer.response_line(&line);
        match Reply::parse(line.as_str()) {
            Some(reply) => Ok(reply),
            None => Err(Pop3Error::MalformedResponse(line)),
        }
    }

    /// Read a response that is multi-line on `+OK` and single-line on `-ERR`.
    /// The first line decides how much more to read. Lines are kept as the
    /// raw bytes received.
    async fn read_response(&mut self) -> Result<Response> {
        let first = self.read_line().await?;
        let reply = self.parse_reply(&first)?;
        if reply.is_err() {
            return Ok(Response::Single(reply));
        }
        let mut lines = vec![first];
        loop {
            let line = self.read_line().await?;
            self.observer.response_line(&String::from_utf8_lossy(&line));
            let done = line[..] == *TERMINATOR.as_bytes();
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(Response::Multi(MultiLine::new(lines)))
    }
}

impl Drop for Pop3Session {
    fn drop(&mut self) {
        if self.transport.take().is_some() {
            self.observer.closed(&self.address);
        }
    }
}
