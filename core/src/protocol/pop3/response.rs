/*
 * response.rs
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

//! POP3 responses: status classification, the rolling line buffer, and the
//! single-line / multi-line reply types returned by session commands.

use std::borrow::Cow;

use bytes::{Bytes, BytesMut};

use super::error::{Pop3Error, Result};

/// Positive status token.
pub const OK: &str = "+OK";
/// Negative status token.
pub const ERR: &str = "-ERR";
/// Line that ends a multi-line response.
pub const TERMINATOR: &str = ".";

/// Leading status token of a response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Err,
}

impl Status {
    /// Classify a status line by its leading token. `None` if it has neither.
    pub fn classify(line: &str) -> Option<Status> {
        if line.starts_with(OK) {
            Some(Status::Ok)
        } else if line.starts_with(ERR) {
            Some(Status::Err)
        } else {
            None
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Status::Ok => OK,
            Status::Err => ERR,
        }
    }
}

/// STAT response: message count and total size in octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatResponse {
    pub count: u32,
    pub total_size: u64,
}

/// LIST entry: message number and size in octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry {
    pub msg_no: u32,
    pub size: u64,
}

fn parse_number_pair<A: std::str::FromStr, B: std::str::FromStr>(text: &str) -> Option<(A, B)> {
    let mut parts = text.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    Some((a, b))
}

/// One status line, kept verbatim (token included, CRLF removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: Status,
    line: String,
}

impl Reply {
    /// Returns `None` when the line carries neither status token.
    pub fn parse(line: impl Into<String>) -> Option<Reply> {
        let line = line.into();
        let status = Status::classify(&line)?;
        Some(Reply { status, line })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn is_err(&self) -> bool {
        self.status == Status::Err
    }

    /// The full line as received.
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Free-form text after the status token.
    pub fn text(&self) -> &str {
        self.line[self.status.token().len()..].trim()
    }

    /// `+OK count size` from STAT.
    pub fn stat(&self) -> Option<StatResponse> {
        if !self.is_ok() {
            return None;
        }
        let (count, total_size) = parse_number_pair(self.text())?;
        Some(StatResponse { count, total_size })
    }

    /// `+OK msg size` from LIST with an argument.
    pub fn list_entry(&self) -> Option<ListEntry> {
        if !self.is_ok() {
            return None;
        }
        let (msg_no, size) = parse_number_pair(self.text())?;
        Some(ListEntry { msg_no, size })
    }

    pub fn into_string(self) -> String {
        self.line
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line)
    }
}

/// A complete multi-line response: status line, raw content lines (still
/// dot-stuffed), and the terminator line.
///
/// Lines are kept as the bytes the server sent, minus the line ending. Message
/// content is not required to be UTF-8; [`MultiLine::raw_lines`] and
/// [`MultiLine::body_bytes`] give it back untouched, while the `str` views
/// decode it lossily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiLine {
    status_line: String,
    lines: Vec<Bytes>,
}

impl MultiLine {
    /// `lines` must start with a `+OK` line and end with the terminator.
    pub(crate) fn new(lines: Vec<Bytes>) -> Self {
        debug_assert!(lines.len() >= 2);
        let status_line = String::from_utf8_lossy(&lines[0]).into_owned();
        Self { status_line, lines }
    }

    /// Every line as received, including the status line and the terminator.
    pub fn raw_lines(&self) -> &[Bytes] {
        &self.lines
    }

    /// Every line decoded as text. Invalid UTF-8 is replaced.
    pub fn lines(&self) -> Vec<Cow<'_, str>> {
        self.lines.iter().map(|line| String::from_utf8_lossy(line)).collect()
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Content lines between status and terminator, dot-unstuffed.
    pub fn body_bytes(&self) -> Vec<&[u8]> {
        self.lines[1..self.lines.len() - 1]
            .iter()
            .map(|line| {
                if line.starts_with(b"..") {
                    &line[1..]
                } else {
                    &line[..]
                }
            })
            .collect()
    }

    /// [`MultiLine::body_bytes`] decoded as text.
    pub fn body(&self) -> Vec<Cow<'_, str>> {
        self.body_bytes()
            .into_iter()
            .map(String::from_utf8_lossy)
            .collect()
    }

    /// Scan listing lines (`msg size`). Lines that do not parse are skipped.
    pub fn list_entries(&self) -> Vec<ListEntry> {
        self.body_bytes()
            .into_iter()
            .filter_map(|line| std::str::from_utf8(line).ok())
            .filter_map(parse_number_pair::<u32, u64>)
            .filter(|&(msg_no, _)| msg_no > 0)
            .map(|(msg_no, size)| ListEntry { msg_no, size })
            .collect()
    }

    pub fn into_raw_lines(self) -> Vec<Bytes> {
        self.lines
    }
}

/// Result of a command that may answer with either shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Single(Reply),
    Multi(MultiLine),
}

impl Response {
    pub fn status(&self) -> Status {
        match self {
            Response::Single(reply) => reply.status(),
            // A multi-line response is only ever read after a +OK line.
            Response::Multi(_) => Status::Ok,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status() == Status::Ok
    }

    pub fn first_line(&self) -> &str {
        match self {
            Response::Single(reply) => reply.as_str(),
            Response::Multi(multi) => multi.status_line(),
        }
    }

    pub fn lines(&self) -> Vec<Cow<'_, str>> {
        match self {
            Response::Single(reply) => vec![Cow::Borrowed(reply.as_str())],
            Response::Multi(multi) => multi.lines(),
        }
    }

    pub fn as_multi(&self) -> Option<&MultiLine> {
        match self {
            Response::Single(_) => None,
            Response::Multi(multi) => Some(multi),
        }
    }
}

/// Longest line accepted by default, line ending excluded.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Reassembles lines from arbitrarily split chunks.
///
/// Chunks are appended as they arrive; [`LineBuffer::next_line`] hands out one
/// complete line at a time. A CRLF (or a terminator line) split across two
/// chunks is only seen once both halves are buffered. Bytes past the last
/// complete line stay buffered for the next call.
///
/// Bytes already searched for a line feed are not searched again. A line that
/// grows past the length limit without ending is a `MalformedResponse`.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    scanned: usize,
    max_line: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            scanned: 0,
            max_line: MAX_LINE_LENGTH,
        }
    }

    /// Change the longest accepted line (line ending excluded).
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete line without its line ending, as raw bytes. Lines end in
    /// CRLF; a bare LF is accepted too.
    pub fn next_line(&mut self) -> Result<Option<Bytes>> {
        let found = self.buf[self.scanned..].iter().position(|&b| b == b'\n');
        let lf = match found {
            Some(offset) => self.scanned + offset,
            None => {
                self.scanned = self.buf.len();
                if self.buf.len() > self.max_line {
                    return Err(self.too_long());
                }
                return Ok(None);
            }
        };
        self.scanned = 0;
        let mut line = self.buf.split_to(lf + 1);
        let mut end = lf;
        if end > 0 && line[end - 1] == b'\r' {
            end -= 1;
        }
        if end > self.max_line {
            return Err(self.too_long());
        }
        line.truncate(end);
        Ok(Some(line.freeze()))
    }

    fn too_long(&self) -> Pop3Error {
        Pop3Error::MalformedResponse(format!("line longer than {} bytes", self.max_line))
    }

    /// Bytes received but not yet part of a complete line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }
}
