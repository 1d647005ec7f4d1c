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

//! A single filter submission and the formatted result it produces against
//! an `Index`.
//!
//! Grounded in `examples/original_source/src/types.h` (`Query`,
//! `QueryResult`) and `query_service.h` (`queryMatches`, `linesWithPathRoot`,
//! `formatResult`, `runQueryOnIndex`).

use crate::bitset::BitSet;
use crate::expr::Expr;
use crate::index::Index;
use crate::parser;
use crate::path::Path;

/// A parsed filter submission. `seq` increases with every keystroke the UI
/// sends, so a stale `QueryResult` can be told apart from the latest one
/// (the UI only ever renders the result whose `seq` it most recently asked
/// for — see `ui.rs`).
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub seq: u64,
    pub str: String,
    pub exprs: Vec<Expr>,
    pub max_matches: usize,
}

impl Query {
    /// Parse `str` into its filter atoms. `None` means the text doesn't
    /// parse — the caller (the UI) keeps showing the previous result rather
    /// than submitting this one.
    pub fn parse(str: String, seq: u64, max_matches: usize) -> Option<Query> {
        let exprs = parser::parse_exprs(&str)?;
        Some(Query {
            seq,
            str,
            exprs,
            max_matches,
        })
    }
}

/// The most recent successful query and its formatted matches, newest match
/// last (so the UI can render top-to-bottom with the newest line at the
/// bottom of the viewport without reversing on every frame).
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub query: Query,
    pub lines: Vec<String>,
}

/// Does every atom in `query` match `line`? An empty `exprs` list (the
/// empty-string query) matches everything.
fn query_matches(query: &Query, line: &serde_json::Value) -> bool {
    query.exprs.iter().all(|expr| expr.matches(line))
}

/// AND together the presence bitsets of every non-wildcard atom's leading
/// path segment, to get a cheap superset of lines that could possibly
/// match before paying for the full per-expression evaluation. An atom
/// whose root segment was never seen in `index` (or is the wildcard)
/// contributes no information and is skipped, matching the original's
/// `continue` on an absent `frontHash`.
fn lines_with_path_root(index: &Index, query: &Query) -> BitSet {
    let mut filter = BitSet::true_mask(index.lines.len());
    for expr in &query.exprs {
        if expr.path.is_wildcard() {
            continue;
        }
        let Some(bitset) = index.bitsets.get(&expr.path.front_hash()) else {
            continue;
        };
        filter &= bitset;
    }
    filter
}

/// Build the projection of `line` onto `query`'s paths: a fresh JSON object
/// containing just the queried paths, each set at its own (possibly nested)
/// pointer location. A wildcard atom replaces the whole accumulated
/// projection with `line` itself — mirroring the original's
/// `filtered[expr.path.ptr] = jsonLine[expr.path.ptr]` where the wildcard's
/// pointer is the empty pointer, i.e. the document root.
fn project(line: &serde_json::Value, query: &Query) -> serde_json::Value {
    let mut filtered = serde_json::Value::Object(serde_json::Map::new());
    for expr in &query.exprs {
        if expr.path.is_wildcard() {
            filtered = line.clone();
            continue;
        }
        let Path::Segments(segments) = &expr.path else {
            continue;
        };
        if let Some(value) = expr.path.resolve(line) {
            set_at_segments(&mut filtered, segments, value.clone());
        }
    }
    filtered
}

/// Insert `value` into `root` at the nested location named by `segments`,
/// creating intermediate objects as needed.
fn set_at_segments(root: &mut serde_json::Value, segments: &[String], value: serde_json::Value) {
    if !root.is_object() {
        *root = serde_json::Value::Object(serde_json::Map::new());
    }
    let mut cur = root;
    for (i, seg) in segments.iter().enumerate() {
        let obj = cur.as_object_mut().expect("cur is always made an object above");
        if i == segments.len() - 1 {
            obj.insert(seg.clone(), value);
            return;
        }
        cur = obj
            .entry(seg.clone())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    }
}

/// Render a projected record as `"key: value,  key: value"`, in the
/// projection's own (top-level) key order. Mirrors `formatResult`'s
/// `key: value.dump()` joining; `serde_json`'s `preserve_order` feature
/// keeps object key order stable across the projection the way the
/// original's `ordered_json` does.
fn format_result(filtered: &serde_json::Value) -> String {
    let mut out = String::new();
    let Some(obj) = filtered.as_object() else {
        return out;
    };
    for (key, value) in obj {
        if !out.is_empty() {
            out.push_str(",  ");
        }
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&value.to_string());
    }
    out
}

/// Evaluate `query` against `index`, scanning newest-line-first and
/// stopping once `max_matches` results have been collected. Returns `None`
/// when nothing matched, so the caller (the Query Service) can leave the
/// previous `QueryResult` in place rather than replacing it with an empty
/// one — matching the original's "no update on zero matches" behavior.
pub fn run_query_on_index(index: &Index, query: Query) -> Option<QueryResult> {
    let filter = lines_with_path_root(index, &query);
    let mut formatted = Vec::new();

    for line_idx in filter.iter_true_rev() {
        if formatted.len() == query.max_matches {
            break;
        }
        let line = &index.lines[line_idx];
        if !query_matches(&query, line) {
            continue;
        }
        formatted.push(format_result(&project(line, &query)));
    }

    if formatted.is_empty() {
        return None;
    }

    // newest-first during the scan, reversed so the UI can render oldest on
    // top / newest at the bottom without extra bookkeeping per frame.
    formatted.reverse();
    Some(QueryResult {
        query,
        lines: formatted,
    })
}
