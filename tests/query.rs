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

//! End-to-end scenarios from spec.md §8, run against the real `Index` +
//! `Query` + `run_query_on_index` stack rather than any single module's
//! unit tests.

use llq::index::{Index, IndexGap};
use llq::query::{run_query_on_index, Query};
use serde_json::json;

fn sample_index() -> Index {
    let mut index = Index::new();
    index.update(json!({"msg": "first message", "count": 1, "tag": 5}));
    index.update(json!({"msg": "hi", "count": 2, "tag": 3}));
    index.update(json!({"msg": "hi", "count": 3}));
    index.update(json!({"msg": "4th message", "count": 4, "tag": 5}));
    index
}

fn run(index: &Index, expr: &str) -> Vec<String> {
    let exprs = llq::parser::parse_exprs(expr).expect("expr should parse");
    let query = Query {
        seq: 1,
        str: expr.to_string(),
        exprs,
        max_matches: usize::MAX,
    };
    run_query_on_index(index, query).map(|r| r.lines).unwrap_or_default()
}

#[test]
fn scenario_1_bare_path_presence() {
    let index = sample_index();
    assert_eq!(
        run(&index, "msg"),
        vec![
            "msg: \"4th message\"",
            "msg: \"hi\"",
            "msg: \"hi\"",
            "msg: \"first message\"",
        ]
    );
}

#[test]
fn scenario_2_bare_path_numeric() {
    let index = sample_index();
    assert_eq!(
        run(&index, "count"),
        vec!["count: 4", "count: 3", "count: 2", "count: 1"]
    );
}

#[test]
fn scenario_3_comparison() {
    let index = sample_index();
    assert_eq!(run(&index, "count > 2"), vec!["count: 4", "count: 3"]);
}

#[test]
fn scenario_4_multi_atom_conjunction() {
    let index = sample_index();
    assert_eq!(
        run(&index, "msg, count == 1"),
        vec!["msg: \"first message\",  count: 1"]
    );
}

#[test]
fn scenario_5_wildcard_projects_whole_record() {
    let index = sample_index();
    assert_eq!(
        run(&index, "*"),
        vec![
            "msg: \"4th message\",  count: 4,  tag: 5",
            "msg: \"hi\",  count: 3",
            "msg: \"hi\",  count: 2,  tag: 3",
            "msg: \"first message\",  count: 1,  tag: 5",
        ]
    );
}

#[test]
fn scenario_6_equality_on_absent_field_skips_records_without_it() {
    let index = sample_index();
    assert_eq!(run(&index, "tag == 5"), vec!["tag: 5", "tag: 5"]);
}

#[test]
fn max_matches_caps_the_result_set() {
    let index = sample_index();
    let exprs = llq::parser::parse_exprs("msg").unwrap();
    let query = Query {
        seq: 1,
        str: "msg".to_string(),
        exprs,
        max_matches: 2,
    };
    let result = run_query_on_index(&index, query).unwrap();
    assert_eq!(result.lines, vec!["msg: \"4th message\"", "msg: \"hi\""]);
}

#[test]
fn merge_with_overlapping_range_preserves_start_idx_and_all_lines() {
    let mut a = Index::new();
    a.update(json!({"n": 0}));
    a.update(json!({"n": 1}));

    let mut b = Index {
        start_idx: 1,
        ..Index::new()
    };
    b.update(json!({"n": 1}));
    b.update(json!({"n": 2}));

    a.merge(b).expect("overlapping ranges should merge");
    assert_eq!(a.start_idx, 0);
    assert_eq!(a.lines.len(), 3);
}

#[test]
fn merge_with_a_gap_fails() {
    let mut a = Index::new();
    a.update(json!({"n": 0}));
    a.update(json!({"n": 1}));

    let mut b = Index {
        start_idx: 3,
        ..Index::new()
    };
    b.update(json!({"n": 3}));

    let err = a.merge(b).unwrap_err();
    assert_eq!(err, IndexGap { a_end: 2, b_start: 3 });
}
