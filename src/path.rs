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

//! JSON-pointer-like paths used by filter atoms.
//!
//! Grounded in `examples/original_source/src/expr.h`/`parser.h`: the
//! original stores a `json::json_pointer` plus a separately-computed
//! `frontHash`. `Path` equality compares the segment sequence (or
//! wildcard-ness) directly, and `front_hash` exists purely as a `HashMap`
//! key, never as an equality proxy.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Either the wildcard (`*`, matches every record) or a non-empty ordered
/// sequence of string segments (`foo.bar` / `/foo/bar`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Path {
    Wildcard,
    Segments(Vec<String>),
}

impl Path {
    /// Build a path from an already-split segment list. Panics on an empty
    /// list — callers (the parser) never produce one; `Path::wildcard()`
    /// is the dedicated constructor for the wildcard case.
    pub fn new(segments: Vec<String>) -> Path {
        assert!(!segments.is_empty(), "Path requires at least one segment");
        Path::Segments(segments)
    }

    pub fn wildcard() -> Path {
        Path::Wildcard
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Path::Wildcard)
    }

    /// A stable hash of the first segment, used as the `Index::bitsets`
    /// key. Not meaningful (and never called) on the wildcard.
    pub fn front_hash(&self) -> u64 {
        match self {
            Path::Wildcard => 0,
            Path::Segments(segs) => {
                let mut h = FxHasher::default();
                segs[0].hash(&mut h);
                h.finish()
            }
        }
    }

    /// The JSON Pointer form (`/foo/bar`) used to index into a
    /// `serde_json::Value`.
    pub fn pointer(&self) -> String {
        match self {
            Path::Wildcard => String::new(),
            Path::Segments(segs) => {
                let mut s = String::with_capacity(segs.iter().map(|s| s.len() + 1).sum());
                for seg in segs {
                    s.push('/');
                    // Paths are plain alpha segments (see the parser grammar);
                    // JSON Pointer's `~0`/`~1` escaping never applies here.
                    s.push_str(seg);
                }
                s
            }
        }
    }

    /// The dotted textual form (`foo.bar`), the inverse of the parser's
    /// `path` rule. Used when re-printing a parsed `Expr` so parse and
    /// print round-trip to an equal `Expr`.
    pub fn to_dotted_string(&self) -> String {
        match self {
            Path::Wildcard => "*".to_string(),
            Path::Segments(segs) => segs.join("."),
        }
    }

    /// Does `obj` contain a value at this path? Wildcard always does.
    pub fn exists_in(&self, obj: &serde_json::Value) -> bool {
        match self {
            Path::Wildcard => true,
            Path::Segments(_) => obj.pointer(&self.pointer()).is_some(),
        }
    }

    /// Resolve the leaf value at this path, if present. Returns `None` for
    /// the wildcard (callers special-case wildcard before calling this).
    pub fn resolve<'a>(&self, obj: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        match self {
            Path::Wildcard => None,
            Path::Segments(_) => obj.pointer(&self.pointer()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_is_segment_based() {
        assert_eq!(
            Path::new(vec!["foo".into(), "bar".into()]),
            Path::new(vec!["foo".into(), "bar".into()])
        );
        assert_ne!(
            Path::new(vec!["foo".into()]),
            Path::new(vec!["bar".into()])
        );
        assert_eq!(Path::wildcard(), Path::wildcard());
        assert_ne!(Path::wildcard(), Path::new(vec!["foo".into()]));
    }

    #[test]
    fn pointer_form_round_trips_lookup() {
        let obj = json!({"foo": {"bar": 1}});
        let p = Path::new(vec!["foo".into(), "bar".into()]);
        assert_eq!(p.pointer(), "/foo/bar");
        assert_eq!(p.resolve(&obj), Some(&json!(1)));
    }

    #[test]
    fn wildcard_always_exists_but_has_no_single_leaf() {
        let obj = json!({"foo": 1});
        let w = Path::wildcard();
        assert!(w.exists_in(&obj));
        assert_eq!(w.resolve(&obj), None);
    }

    #[test]
    fn front_hash_is_stable_and_keys_only() {
        let a = Path::new(vec!["foo".into(), "bar".into()]);
        let b = Path::new(vec!["foo".into(), "baz".into()]);
        assert_eq!(a.front_hash(), b.front_hash());
        assert_ne!(a, b);
    }
}
