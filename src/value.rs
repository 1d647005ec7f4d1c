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

//! Typed leaf values pulled out of parsed JSON records.
//!
//! Grounded in `examples/original_source/src/expr.h`'s `Value`: a tagged
//! union of number and string with same-tag-only ordering, re-expressed as
//! a Rust enum instead of a `std::variant`.

use std::cmp::Ordering;
use std::fmt;

/// A comparable leaf value: either a 64-bit float or a UTF-8 string.
///
/// Equality and ordering are only meaningful between two values of the
/// same variant; comparing across variants is a caller error (the core
/// never does this — see `Expr::matches`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
}

impl Value {
    /// `Some(Number)` for any JSON number, `Some(String)` for a JSON
    /// string, `None` for anything else (object, array, null, bool) — a
    /// direct port of `Value::from_json`.
    pub fn from_json(node: &serde_json::Value) -> Option<Value> {
        match node {
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }

    pub fn is_num(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Same-tag partial ordering. Returns `None` for a cross-tag
    /// comparison instead of panicking — callers (only `Expr::matches`)
    /// are contracted to never invoke this across tags.
    pub fn partial_cmp_same_tag(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}
