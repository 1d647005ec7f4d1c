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

//! The `Index` data model: a dense line store plus per-key presence
//! bit-sets, and the contiguous-range merge used to fold partial indices
//! from the Ingestor into the Query Service's master index.
//!
//! Grounded in `examples/original_source/src/types.h` (`Index`) and
//! `query_service.h` (`mergeIndex`).

use rustc_hash::FxHashMap;

use crate::bitset::BitSet;

pub type PathHash = u64;

/// `start_idx` is the absolute line number of `lines[0]`. For the master
/// index this is always 0; for a partial index produced by the Ingestor
/// it is one past the highest absolute line number previously emitted.
#[derive(Debug, Default)]
pub struct Index {
    pub start_idx: u64,
    pub lines: Vec<serde_json::Value>,
    pub bitsets: FxHashMap<PathHash, BitSet>,
}

/// Error returned by `Index::merge` when the two ranges are not
/// contiguous (`b`'s start is more than one past `a`'s end). Fatal at the
/// Query Service per spec.md §7 (`IndexGap`); kept as a plain value here
/// rather than panicking so callers choose how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexGap {
    pub a_end: u64,
    pub b_start: u64,
}

impl Index {
    pub fn new() -> Index {
        Index::default()
    }

    /// Append `record` to `lines` and set the presence bit for every
    /// top-level key at the new line's local index. Mirrors `updateIndex`.
    pub fn update(&mut self, record: serde_json::Value) {
        let line_num = self.lines.len();
        if let serde_json::Value::Object(map) = &record {
            for key in map.keys() {
                let hash = front_hash(key);
                let bitset = self.bitsets.entry(hash).or_default();
                bitset.set(line_num, true);
            }
        }
        self.lines.push(record);
    }

    /// Absolute index one past the last line this index covers, or
    /// `start_idx` if empty (an empty index covers no lines).
    fn end_idx(&self) -> u64 {
        self.start_idx + self.lines.len() as u64
    }

    /// Fold `other` onto `self` as a contiguous append: `self` must start
    /// at or before `other` (`self.start_idx <= other.start_idx`), and the
    /// two ranges must not leave a gap. Only the suffix of `other` that
    /// extends past `self`'s current end is copied over, so re-merging an
    /// `other` that's fully contained in `self` is a no-op (idempotent).
    pub fn merge(&mut self, other: Index) -> Result<(), IndexGap> {
        assert!(
            self.start_idx <= other.start_idx,
            "merge requires self.start_idx <= other.start_idx"
        );

        let a_end = self.end_idx(); // one past self's last line, absolute
        let b_start = other.start_idx;
        let b_end = other.start_idx + other.lines.len() as u64;

        if b_start > a_end {
            return Err(IndexGap {
                a_end,
                b_start,
            });
        }

        // local offset into `other.lines`/`other.bitsets` of the first line
        // not already covered by `self`.
        let skip = (a_end - b_start) as usize;

        for line in other.lines.into_iter().skip(skip) {
            self.lines.push(line);
        }

        for (hash, other_bitset) in other.bitsets {
            let bitset = self.bitsets.entry(hash).or_default();
            for local_i in skip..other_bitset.len() {
                let abs_i = (b_start as usize) + local_i - (self.start_idx as usize);
                bitset.set(abs_i, other_bitset.get(local_i));
            }
        }

        debug_assert_eq!(self.end_idx(), a_end.max(b_end));
        Ok(())
    }
}

/// A stable hash of a single top-level key, used as an `Index::bitsets`
/// key — the same role `Path::front_hash` plays for a query's leading
/// segment, so the two must agree on how a segment is hashed.
pub fn front_hash(segment: &str) -> PathHash {
    crate::path::Path::new(vec![segment.to_string()]).front_hash()
}
