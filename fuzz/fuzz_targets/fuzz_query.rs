#![no_main]
use libfuzzer_sys::fuzz_target;

// Exercises the filter-expression grammar (spec.md §3): the parser must
// never panic on arbitrary input, and anything it accepts must evaluate
// against an empty record without panicking either.
fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };

    if let Some(exprs) = llq::parser::parse_exprs(query) {
        let empty = serde_json::Value::Object(serde_json::Map::new());
        for expr in &exprs {
            let _ = expr.matches(&empty);
        }
    }
});
