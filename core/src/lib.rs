/*
 * lib.rs
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

//! POP3 client engine.
//!
//! - [`net`]: plain or implicit-TLS transport with per-operation deadlines.
//! - [`protocol::pop3`]: the session state machine, command framing and
//!   response classification.
//! - [`config`]: connection settings, optionally loaded from XML.

pub mod config;
pub mod net;
pub mod protocol;

pub use config::Pop3Config;
pub use protocol::pop3::{Pop3Error, Pop3Session, Reply, Response, SessionState};
