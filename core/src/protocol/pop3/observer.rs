/*
 * observer.rs
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

//! Session observers: receive every I/O step of a POP3 session.
//!
//! An observer is handed to the session at construction. The default,
//! [`TracingObserver`], forwards events to `tracing`; tests plug in their own
//! to record the conversation.

use tracing::{debug, info, trace};

/// Receives session events in the order they happen.
pub trait SessionObserver: Send {
    /// Transport is open (before the greeting is read).
    fn connected(&mut self, address: &str, encrypted: bool);
    /// Greeting line as received.
    fn greeting(&mut self, line: &str);
    /// Command line about to be written, without CRLF. PASS arguments arrive redacted.
    fn command(&mut self, line: &str);
    /// Each response line read, without CRLF. Bytes that are not UTF-8 arrive
    /// replaced with U+FFFD; the session keeps the raw line.
    fn response_line(&mut self, line: &str);
    /// Transport released by QUIT or drop.
    fn closed(&mut self, address: &str);
}

/// Logs session events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn connected(&mut self, address: &str, encrypted: bool) {
        info!(address, encrypted, "POP3 connected");
    }

    fn greeting(&mut self, line: &str) {
        debug!("S: {}", line);
    }

    fn command(&mut self, line: &str) {
        debug!("C: {}", line);
    }

    fn response_line(&mut self, line: &str) {
        trace!("S: {}", line);
    }

    fn closed(&mut self, address: &str) {
        info!(address, "POP3 session closed");
    }
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn connected(&mut self, _address: &str, _encrypted: bool) {}
    fn greeting(&mut self, _line: &str) {}
    fn command(&mut self, _line: &str) {}
    fn response_line(&mut self, _line: &str) {}
    fn closed(&mut self, _address: &str) {}
}
