/*
 Copyright 2021 Google LLC

 Licensed under the Apache License, Version 2.0 (the "License");
 you may not use this file except in compliance with the License.
 You may obtain a copy of the License at

      https://www.apache.org/licenses/LICENSE-2.0

 Unless required by applicable law or agreed to in writing, software
 distributed under the License is distributed on an "AS IS" BASIS,
 WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 See the License for the specific language governing permissions and
 limitations under the License.
 */

//! Reads a file one line at a time from the end backward.
//!
//! Grounded in `examples/original_source/src/read_file_backwards.h`'s
//! `ReadFileBackwards`, which walks the file byte-by-byte via `seekg`. We
//! read in fixed-size blocks instead of one byte at a time — the idiomatic
//! buffered-I/O equivalent — but preserve the same externally observable
//! behavior: lines come out newest-to-oldest, with no trailing newline, and
//! a trailing blank line in the file (the usual "file ends with \n" case)
//! is silently skipped rather than yielded as an empty match.
//!
//! Only used by the `--query` one-shot CLI debug path (SPEC_FULL.md §4.4);
//! the live UI always goes through the Ingestor's forward tail instead.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

const BLOCK_SIZE: usize = 8192;

pub struct ReverseFileReader {
    file: File,
    /// Absolute offset of the start of `buf` within the file.
    buf_start: u64,
    buf: Vec<u8>,
    /// Bytes in `buf` not yet yielded, processed back to front.
    cursor: usize,
    exhausted: bool,
}

impl ReverseFileReader {
    pub fn open(path: &std::path::Path) -> std::io::Result<ReverseFileReader> {
        let mut file = File::open(path)?;
        let len = file.seek(SeekFrom::End(0))?;
        Ok(ReverseFileReader {
            file,
            buf_start: len,
            buf: Vec::new(),
            cursor: 0,
            exhausted: len == 0,
        })
    }

    /// Pull the previous block into `buf`, prepending it to whatever is
    /// left unconsumed so a line spanning a block boundary still joins up.
    fn fill(&mut self) -> std::io::Result<bool> {
        if self.buf_start == 0 {
            return Ok(false);
        }
        let read_len = BLOCK_SIZE.min(self.buf_start as usize);
        let new_start = self.buf_start - read_len as u64;
        let mut block = vec![0u8; read_len];
        self.file.seek(SeekFrom::Start(new_start))?;
        self.file.read_exact(&mut block)?;

        block.extend_from_slice(&self.buf[..self.cursor]);
        self.buf = block;
        self.cursor = self.buf.len();
        self.buf_start = new_start;
        Ok(true)
    }
}

impl Iterator for ReverseFileReader {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<std::io::Result<String>> {
        if self.exhausted {
            return None;
        }
        loop {
            if let Some(newline_pos) = self.buf[..self.cursor].iter().rposition(|&b| b == b'\n') {
                let line = self.buf[newline_pos + 1..self.cursor].to_vec();
                self.cursor = newline_pos;
                // A file ending in '\n' (the common case) would otherwise
                // surface as a spurious empty line on the very first yield;
                // `newline_pos + 1 == self.buf.len()` is only true for that
                // first, not-yet-consumed-from buffer.
                if line.is_empty() && newline_pos + 1 == self.buf.len() {
                    continue;
                }
                return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.buf_start == 0 {
                self.exhausted = true;
                if self.cursor == 0 {
                    return None;
                }
                let line = self.buf[..self.cursor].to_vec();
                self.cursor = 0;
                return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
            }

            match self.fill() {
                Ok(_) => continue,
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
