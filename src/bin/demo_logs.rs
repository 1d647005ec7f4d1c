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

//! A small standalone NDJSON log producer used to exercise `llq`'s
//! tail-follow loop by hand: appends one record every 200ms to a file,
//! forever.
//!
//! Grounded in `examples/original_source/src/logProducerBin.cpp`: same
//! `count`/modulus-tagged fields and 200ms cadence, reworked from
//! `Log::info(msg, {fields...})` calls into directly-built `serde_json`
//! objects written with `serde_json::to_writer` + a trailing newline.

use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;

use serde_json::json;

fn main() -> std::io::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "demo_logs.ndjson".to_string());
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

    println!("writing demo log lines to {path} every 200ms (Ctrl+C to stop)");

    let mut count: u64 = 0;
    loop {
        write_line(&mut file, &json!({"level": "info", "msg": "in the loop", "count": count}))?;

        if count % 2 == 0 {
            write_line(&mut file, &json!({"level": "info", "msg": "even", "count": count, "tag": "even"}))?;
        }
        if count % 3 == 0 {
            write_line(&mut file, &json!({"level": "info", "msg": "multiple of three", "count": count, "tag": "three"}))?;
        }
        if count % 5 == 0 {
            write_line(&mut file, &json!({"level": "info", "msg": "multiple of five", "count": count, "tag": "five"}))?;
        }
        if count % 7 == 0 {
            write_line(&mut file, &json!({"level": "info", "msg": "multiple of seven", "count": count, "tag": "seven"}))?;
        }
        write_line(&mut file, &json!({"level": "info", "msg": "using some strings too", "name": format!("Bobby {count}")}))?;

        count += 1;
        std::thread::sleep(Duration::from_millis(200));
    }
}

fn write_line(file: &mut std::fs::File, record: &serde_json::Value) -> std::io::Result<()> {
    serde_json::to_writer(&mut *file, record)?;
    file.write_all(b"\n")?;
    file.flush()
}
