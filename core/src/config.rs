/*
 * config.rs
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

//! Connection settings for a POP3 session.
//!
//! Settings can be built in code or read from a single `<pop3/>` element:
//!
//! ```xml
//! <pop3 address="pop.example.com:995" tls="true"
//!       connect-timeout="30" io-timeout="60" chunk-size="512"
//!       max-line-length="1048576" strict="false"/>
//! ```
//!
//! Timeouts are in seconds; `0` disables the limit. Credentials are not part
//! of this file: callers supply them to `user`/`pass` directly.

use std::fs;
use std::path::Path;
use std::time::Duration;

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use thiserror::Error;

use crate::net::Deadlines;
use crate::protocol::pop3::response::MAX_LINE_LENGTH;

/// Default POP3 port (plain).
pub const DEFAULT_PORT: u16 = 110;
/// Default POP3S port (implicit TLS).
pub const DEFAULT_TLS_PORT: u16 = 995;
/// Bytes requested per transport read.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("config XML error: {0}")]
    Xml(String),

    #[error("config has no <pop3> element")]
    MissingElement,

    #[error("config is missing the address attribute")]
    MissingAddress,

    #[error("invalid value {value:?} for {attribute}")]
    InvalidValue { attribute: String, value: String },
}

/// Settings for one POP3 session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pop3Config {
    /// `host:port`
    pub address: String,
    pub use_tls: bool,
    pub connect_timeout: Option<Duration>,
    pub io_timeout: Option<Duration>,
    pub chunk_size: usize,
    /// Longest response line accepted, line ending excluded.
    pub max_line_length: usize,
    /// Reject transaction commands before PASS succeeds instead of sending them.
    pub strict_state: bool,
}

impl Pop3Config {
    pub fn new(address: impl Into<String>, use_tls: bool) -> Self {
        Self {
            address: address.into(),
            use_tls,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            io_timeout: Some(DEFAULT_IO_TIMEOUT),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_line_length: MAX_LINE_LENGTH,
            strict_state: false,
        }
    }

    /// `host` on the conventional port for the chosen security.
    pub fn for_host(host: &str, use_tls: bool) -> Self {
        let port = if use_tls { DEFAULT_TLS_PORT } else { DEFAULT_PORT };
        Self::new(format!("{}:{}", host, port), use_tls)
    }

    pub fn deadlines(&self) -> Deadlines {
        Deadlines {
            connect: self.connect_timeout,
            io: self.io_timeout,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_xml(&content)
    }

    /// Parse the first `<pop3>` element. Unknown attributes are ignored.
    pub fn from_xml(content: &str) -> Result<Self, ConfigError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Err(e) => return Err(ConfigError::Xml(e.to_string())),
                Ok(Event::Eof) => return Err(ConfigError::MissingElement),
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"pop3" => {
                    return Self::from_element(&e);
                }
                _ => {}
            }
            buf.clear();
        }
    }

    fn from_element(element: &BytesStart<'_>) -> Result<Self, ConfigError> {
        let mut config = Self::new(String::new(), false);
        for attr in element.attributes() {
            let attr = attr.map_err(|e| ConfigError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| ConfigError::Xml(e.to_string()))?
                .trim()
                .to_string();
            match key.as_str() {
                "address" => config.address = value,
                "tls" => config.use_tls = parse_bool(&key, &value)?,
                "strict" => config.strict_state = parse_bool(&key, &value)?,
                "connect-timeout" => config.connect_timeout = parse_timeout(&key, &value)?,
                "io-timeout" => config.io_timeout = parse_timeout(&key, &value)?,
                "chunk-size" => config.chunk_size = parse_size(&key, &value)?,
                "max-line-length" => config.max_line_length = parse_size(&key, &value)?,
                _ => {}
            }
        }
        if config.address.is_empty() {
            return Err(ConfigError::MissingAddress);
        }
        Ok(config)
    }

    /// Serialize as a single `<pop3/>` element with an XML declaration.
    pub fn to_xml(&self) -> Result<String, ConfigError> {
        let mut out = Vec::new();
        let mut writer = Writer::new(&mut out);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| ConfigError::Xml(e.to_string()))?;
        let seconds = |t: Option<Duration>| t.map_or(0, |d| d.as_secs()).to_string();
        let mut element = BytesStart::new("pop3");
        element.push_attribute(("address", self.address.as_str()));
        element.push_attribute(("tls", if self.use_tls { "true" } else { "false" }));
        element.push_attribute(("connect-timeout", seconds(self.connect_timeout).as_str()));
        element.push_attribute(("io-timeout", seconds(self.io_timeout).as_str()));
        element.push_attribute(("chunk-size", self.chunk_size.to_string().as_str()));
        element.push_attribute(("max-line-length", self.max_line_length.to_string().as_str()));
        element.push_attribute(("strict", if self.strict_state { "true" } else { "false" }));
        writer
            .write_event(Event::Empty(element))
            .map_err(|e| ConfigError::Xml(e.to_string()))?;
        String::from_utf8(out).map_err(|e| ConfigError::Xml(e.to_string()))
    }
}

fn invalid(attribute: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(attribute: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(attribute, value)),
    }
}

fn parse_size(attribute: &str, value: &str) -> Result<usize, ConfigError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(attribute, value)),
    }
}

fn parse_timeout(attribute: &str, value: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = value.parse().map_err(|_| invalid(attribute, value))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
