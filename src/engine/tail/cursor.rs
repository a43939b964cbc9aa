// src/engine/tail/cursor.rs

//! Per-tick read state of a tail session.
//!
//! `TailCursor` owns the read offset and the carried, unterminated tail of
//! the last read. It has no timers and no channels, so every rule of the
//! tailing algorithm can be exercised against an in-memory reader.
//!
//! The carry is kept as raw bytes: a read can stop in the middle of a
//! multi-byte UTF-8 sequence, and only complete lines are ever decoded.

use std::io::{self, SeekFrom};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailCursor {
    offset: u64,
    carry: Vec<u8>,
}

impl TailCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of the file already consumed (delivered or carried).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Unterminated fragment waiting for its line terminator.
    pub fn carry(&self) -> &[u8] {
        &self.carry
    }

    /// Start over from byte zero with no carry.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.carry.clear();
    }

    /// Read whatever was appended since the last call and return the newly
    /// completed lines.
    ///
    /// - `size < offset`: the file was truncated or replaced; start over.
    /// - `size == offset`: nothing new.
    /// - otherwise seek to the offset and read to EOF.
    ///
    /// On error the offset and carry are left untouched, so the same bytes
    /// are read again on the next successful call.
    pub async fn read_new<R>(&mut self, reader: &mut R, size: u64) -> io::Result<Vec<String>>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        if size < self.offset {
            debug!(
                offset = self.offset,
                size, "log file shrank; restarting from the beginning"
            );
            self.reset();
        }

        if size == self.offset {
            return Ok(Vec::new());
        }

        reader.seek(SeekFrom::Start(self.offset)).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;

        self.offset += buf.len() as u64;
        Ok(self.absorb(&buf))
    }

    /// Append `bytes` to the carry and split off every complete line.
    ///
    /// Whatever follows the last `\n` stays in the carry. Lines are decoded
    /// lossily as UTF-8 and a trailing `\r` is stripped.
    pub fn absorb(&mut self, bytes: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(bytes);

        let Some(last_newline) = self.carry.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.carry.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.carry, rest);

        complete[..complete.len() - 1]
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect()
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Split lines into consecutive batches of at most `max` lines.
pub fn into_batches(lines: Vec<String>, max: usize) -> Vec<Vec<String>> {
    let max = max.max(1);
    let mut batches = Vec::with_capacity(lines.len().div_ceil(max));
    let mut iter = lines.into_iter().peekable();

    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(max).collect());
    }
    batches
}
