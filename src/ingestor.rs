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

//! Tails a log file and emits partial `Index`es onto the bus.
//!
//! Grounded in `examples/original_source/src/ingestor.h`'s
//! `updateIndex`/`startIngesting`. The original parses with
//! `nlohmann::json::parse` in discard-on-error mode and treats any
//! `istream::eof()` as "caught up, go to sleep"; we use a `BufReader` over
//! a `File` and treat a short/partial final line the same way.

use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{error, warn};

use crate::bus::{BusSender, Msg};
use crate::index::Index;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Tails `file` from its current position, parsing NDJSON records and
/// sending partial `Index`es on `tx` until `should_shutdown` is set.
/// Returns on a read error (fatal); a JSON parse error is logged and the
/// offending line is simply not advanced past within this pass — the next
/// pass re-reads from the same stream position, so a torn write is picked
/// up correctly once the writer finishes it.
pub fn run<R: Read + Seek>(
    mut file: R,
    tx: &BusSender,
    should_shutdown: &AtomicBool,
) -> std::io::Result<()> {
    let mut index = Index::new();
    let mut last_line_number_sent: Option<u64> = None;

    loop {
        let pass_start = file.stream_position()?;
        let mut reader = BufReader::new(&mut file);
        let mut pos = pass_start;

        loop {
            let line_start = pos;
            let mut line = String::new();
            let bytes_read = reader.read_line(&mut line)?;
            if bytes_read == 0 || !line.ends_with('\n') {
                // EOF, or a partial line with no trailing newline yet —
                // either way, stop and let the next pass retry from `pos`.
                break;
            }
            let trimmed = line.trim_end_matches('\n');

            match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(record) => {
                    index.update(record);
                    pos += bytes_read as u64;
                }
                Err(e) => {
                    warn!("failed to parse log line as JSON: {e}");
                    // Leave `pos` at `line_start` so the next pass re-reads
                    // this line from scratch instead of skipping past it.
                    pos = line_start;
                    break;
                }
            }
        }

        if !index.lines.is_empty() {
            let new_start = index.start_idx + index.lines.len() as u64;
            if let Some(last_sent) = last_line_number_sent {
                if index.start_idx > last_sent + 1 {
                    error!(
                        "ingestor contiguity violated: start_idx={} last_sent={}",
                        index.start_idx, last_sent
                    );
                    return Err(std::io::Error::other(
                        "ingestor index start_idx is not contiguous with last_line_number_sent",
                    ));
                }
            }
            last_line_number_sent = Some(new_start - 1);

            let to_send = std::mem::replace(
                &mut index,
                Index {
                    start_idx: new_start,
                    ..Index::default()
                },
            );
            if tx.send(Msg::Index(to_send)).is_err() {
                // receiver gone — the Query Service (and the process) is
                // shutting down.
                return Ok(());
            }
        }

        file.seek(SeekFrom::Start(pos))?;

        if should_shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
        std::thread::sleep(POLL_INTERVAL);
        if should_shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
    }
}

/// Spawn the Ingestor as its own thread. `file` must be positioned at the
/// start of the log before being passed in.
pub fn spawn(
    file: std::fs::File,
    tx: BusSender,
    should_shutdown: Arc<AtomicBool>,
) -> std::thread::JoinHandle<std::io::Result<()>> {
    std::thread::spawn(move || run(file, &tx, &should_shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    /// An in-memory `Read + Seek` stream that can have bytes appended to it
    /// between ingestor passes, to exercise the tail-follow behavior
    /// without a real filesystem poll interval.
    struct GrowableCursor {
        inner: Cursor<Vec<u8>>,
    }

    impl GrowableCursor {
        fn new(initial: &str) -> GrowableCursor {
            GrowableCursor {
                inner: Cursor::new(initial.as_bytes().to_vec()),
            }
        }
    }

    impl Read for GrowableCursor {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Seek for GrowableCursor {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn sends_one_partial_index_per_pass_then_shuts_down() {
        let mut data = GrowableCursor::new("{\"msg\": \"a\"}\n{\"msg\": \"b\"}\n");
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = AtomicBool::new(true); // stop after first pass

        run(&mut data, &tx, &shutdown).unwrap();
        drop(tx);

        let msgs: Vec<Msg> = rx.try_iter().collect();
        assert_eq!(msgs.len(), 1);
        match &msgs[0] {
            Msg::Index(idx) => {
                assert_eq!(idx.start_idx, 0);
                assert_eq!(idx.lines.len(), 2);
            }
            _ => panic!("expected an Index message"),
        }
    }

    #[test]
    fn skips_a_bad_line_without_advancing_past_it() {
        let mut data = GrowableCursor::new("{\"msg\": \"a\"}\nnot json\n");
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = AtomicBool::new(true);

        run(&mut data, &tx, &shutdown).unwrap();

        let msgs: Vec<Msg> = rx.try_iter().collect();
        assert_eq!(msgs.len(), 1);
        match &msgs[0] {
            Msg::Index(idx) => assert_eq!(idx.lines.len(), 1),
            _ => panic!("expected an Index message"),
        }

        // The stream must be left positioned right after the good line, not
        // past the malformed one, so a later pass retries it from scratch.
        let line1_len = "{\"msg\": \"a\"}\n".len() as u64;
        assert_eq!(data.inner.position(), line1_len);

        // Replace "not json" with a valid line at the same offset and run a
        // second pass: if `pos` had wrongly advanced past the bad line on
        // the first pass, this line would never be retried.
        let mut fixed = b"{\"msg\": \"a\"}\n".to_vec();
        fixed.extend_from_slice(b"{\"msg\": \"b\"}\n");
        data.inner = Cursor::new(fixed);
        data.inner.set_position(line1_len);

        run(&mut data, &tx, &shutdown).unwrap();
        drop(tx);

        let msgs: Vec<Msg> = rx.try_iter().collect();
        assert_eq!(msgs.len(), 1);
        match &msgs[0] {
            Msg::Index(idx) => {
                assert_eq!(idx.lines.len(), 1);
                assert_eq!(idx.lines[0], serde_json::json!({"msg": "b"}));
            }
            _ => panic!("expected an Index message"),
        }
    }

    #[test]
    fn an_empty_pass_sends_nothing() {
        let mut data = GrowableCursor::new("");
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = AtomicBool::new(true);

        run(&mut data, &tx, &shutdown).unwrap();
        drop(tx);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn appended_data_is_picked_up_on_a_later_pass() {
        // Simulate two passes worth of writes manually by running twice
        // against the same growable buffer, appending between calls.
        let mut buf = b"{\"msg\": \"a\"}\n".to_vec();
        let mut data = GrowableCursor {
            inner: Cursor::new(buf.clone()),
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = AtomicBool::new(true);
        run(&mut data, &tx, &shutdown).unwrap();

        buf.write_all(b"{\"msg\": \"b\"}\n").unwrap();
        let pos = data.inner.position();
        data.inner = Cursor::new(buf);
        data.inner.set_position(pos);
        run(&mut data, &tx, &shutdown).unwrap();
        drop(tx);

        let msgs: Vec<Msg> = rx.try_iter().collect();
        assert_eq!(msgs.len(), 2);
        match (&msgs[0], &msgs[1]) {
            (Msg::Index(a), Msg::Index(b)) => {
                assert_eq!(a.start_idx, 0);
                assert_eq!(b.start_idx, 1);
            }
            _ => panic!("expected two Index messages"),
        }
    }
}
