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

//! Filter atoms: `(path, op?, rhs?)`.
//!
//! Grounded in `examples/original_source/src/expr.h`'s `Expr` class and
//! `lib.h`'s `opMatches`/`filterLine`.

use crate::path::Path;
use crate::value::Value;

/// Comparison operators a filter atom can carry. `In` and `Fzf` are
/// reserved: they parse but always evaluate to `false` — set membership
/// and fuzzy matching are intentionally unimplemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Lt,
    Eq,
    Gt,
    In,
    Fzf,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Lt => "<",
            Op::Eq => "==",
            Op::Gt => ">",
            Op::In => "in",
            Op::Fzf => "fzf",
        }
    }
}

/// A single filter atom. `op` and `rhs` always co-occur — enforced by
/// construction (`Expr::presence`/`Expr::comparison`), never by a runtime
/// check, so the invariant can't be violated by outside code.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub path: Path,
    comparison: Option<(Op, Value)>,
}

impl Expr {
    pub fn presence(path: Path) -> Expr {
        Expr {
            path,
            comparison: None,
        }
    }

    pub fn comparison(path: Path, op: Op, rhs: Value) -> Expr {
        Expr {
            path,
            comparison: Some((op, rhs)),
        }
    }

    pub fn op(&self) -> Option<Op> {
        self.comparison.as_ref().map(|(op, _)| *op)
    }

    pub fn rhs(&self) -> Option<&Value> {
        self.comparison.as_ref().map(|(_, v)| v)
    }

    /// The `path.to_string()`/`op_str`/`rhs->to_string()` triple from the
    /// original's `Expr::to_string`, used for round-trip tests and the
    /// (currently unused outside tests) textual re-printer.
    pub fn to_dotted_string(&self) -> String {
        match &self.comparison {
            None => self.path.to_dotted_string(),
            Some((op, rhs)) => {
                let rhs_str = match rhs {
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => format!("'{s}'"),
                };
                format!("{} {} {}", self.path.to_dotted_string(), op.as_str(), rhs_str)
            }
        }
    }

    /// Wildcard always matches; absence of the path never matches; a bare
    /// presence atom matches on presence alone; a comparison atom requires
    /// the leaf to resolve to a `Value` of the same tag as `rhs`, with
    /// `in`/`fzf` always `false`.
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        if self.path.is_wildcard() {
            return true;
        }
        let Some(leaf) = self.path.resolve(record) else {
            return false;
        };

        let Some((op, rhs)) = &self.comparison else {
            return true;
        };

        let Some(val) = Value::from_json(leaf) else {
            return false;
        };

        match op {
            Op::Eq => val == *rhs,
            Op::Lt => val.partial_cmp_same_tag(rhs) == Some(std::cmp::Ordering::Less),
            Op::Gt => val.partial_cmp_same_tag(rhs) == Some(std::cmp::Ordering::Greater),
            Op::In | Op::Fzf => false,
        }
    }
}
