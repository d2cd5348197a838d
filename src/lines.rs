//! Line numbers for CSV input.
//!
//! The CSV reader skips blank lines and stamps each record with the position
//! it started scanning from, which lies before any skipped blank lines. With
//! CRLF input the `\n` of a terminator is only consumed by the next read.
//! [`LineTracker`] sits under the CSV reader, remembers where line breaks
//! are, and turns a record's scan offset into the line its content is on.

use std::collections::VecDeque;
use std::io::{self, Read};

pub(crate) struct LineTracker<R> {
    inner: R,
    /// Bytes handed out so far.
    offset: u64,
    /// Offset and byte of every `\r` / `\n` not yet passed.
    breaks: VecDeque<(u64, u8)>,
    /// `\n` bytes already passed.
    newlines_passed: u64,
}

impl<R> LineTracker<R> {
    pub(crate) fn new(inner: R) -> Self {
        LineTracker {
            inner,
            offset: 0,
            breaks: VecDeque::new(),
            newlines_passed: 0,
        }
    }

    /// 1-indexed line of the first byte at or after `start` that is not a
    /// line break.
    ///
    /// Offsets must be non-decreasing across calls; everything before the
    /// located byte is forgotten.
    pub(crate) fn line_at(&mut self, start: u64) -> u64 {
        let mut content = start;

        while let Some(&(at, byte)) = self.breaks.front() {
            if at < content {
                self.pass(byte);
            } else if at == content {
                self.pass(byte);
                content += 1;
            } else {
                break;
            }
        }

        self.newlines_passed + 1
    }

    fn pass(&mut self, byte: u8) {
        if byte == b'\n' {
            self.newlines_passed += 1;
        }
        self.breaks.pop_front();
    }
}

impl<R: Read> Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for (i, &byte) in buf[..n].iter().enumerate() {
            if byte == b'\n' || byte == b'\r' {
                self.breaks.push_back((self.offset + i as u64, byte));
            }
        }
        self.offset += n as u64;
        Ok(n)
    }
}
