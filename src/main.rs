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

#[macro_use]
extern crate log;

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use llq::bus::{bus, Msg};
use llq::index::Index;
use llq::query::{run_query_on_index, Query, QueryResult};
use llq::reverse_reader::ReverseFileReader;
use llq::{ingestor, logging, query_service, ui, LlqError};

fn main() -> ExitCode {
    let args = llq::cli::parse_arguments();
    let level = logging::level_for(args.verbosity);

    if let Some(expr) = &args.query {
        logging::init_to_stderr(level);
        return match run_one_shot(&args.log_file, expr, args.max_matches) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let log_path = default_log_path();
    if let Err(e) = logging::init_to_file(&log_path, level) {
        eprintln!("warning: failed to open log file {}: {e}", log_path.display());
    }

    match run_ui_mode(&args.log_file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn default_log_path() -> std::path::PathBuf {
    std::path::PathBuf::from("llq.log")
}

/// Evaluate a single filter expression against the whole file and print the
/// matches, without starting the Ingestor/Query Service/bus pipeline or the
/// TUI. Grounded in the original's `runQuery`/`ReadFileBackwards` batch path
/// (SPEC_FULL.md §4.4); a debug/test utility, never used by the shipping UI.
fn run_one_shot(log_file: &Path, expr: &str, max_matches: usize) -> llq::Result<()> {
    let exprs = llq::parser::parse_exprs(expr)
        .ok_or_else(|| LlqError::InvalidQuery(expr.to_string()))?;

    let mut index = Index::new();
    let reader = ReverseFileReader::open(log_file)?;

    // Build the index forward-in-line-number order (reverse file order, so
    // collect then reverse) so absolute line numbers line up with the
    // newest-first scan `run_query_on_index` performs.
    let mut lines = Vec::new();
    for line in reader {
        let line = line.map_err(LlqError::IoRead)?;
        match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(record) => lines.push(record),
            Err(source) => warn!("{}", LlqError::ParseLine { line: line.clone(), source }),
        }
    }
    lines.reverse();
    for record in lines {
        index.update(record);
    }

    let query = Query {
        seq: 1,
        str: expr.to_string(),
        exprs,
        max_matches,
    };

    if let Some(QueryResult { lines, .. }) = run_query_on_index(&index, query) {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}

/// Open `log_file`, spawn the Ingestor and Query Service threads, and run
/// the interactive UI until the operator quits. Joins both threads before
/// returning so the process doesn't exit out from under a thread that's
/// still mid-flush.
fn run_ui_mode(log_file: &Path) -> llq::Result<()> {
    let mut file = File::open(log_file)?;
    // Tail from the current end of the file so the UI starts on a clean
    // slate rather than replaying the entire historical log.
    let start_at_end = file.metadata()?.len();
    file.seek(SeekFrom::Start(start_at_end))?;

    let (tx, rx) = bus();
    let should_shutdown = Arc::new(AtomicBool::new(false));
    let result: query_service::SharedQueryResult = Arc::new(RwLock::new(QueryResult::default()));
    let (redraw_tx, redraw_rx) = crossbeam_channel::bounded(1);

    let ingestor_handle = ingestor::spawn(file, tx.clone(), should_shutdown.clone());

    let on_result: query_service::OnResult = Box::new(move || {
        let _ = redraw_tx.try_send(());
    });
    let query_service_handle = {
        let result = result.clone();
        std::thread::spawn(move || query_service::run(rx, result, on_result))
    };

    let ui_result = ui::run(tx.clone(), result, should_shutdown.clone(), redraw_rx);

    should_shutdown.store(true, Ordering::Relaxed);
    // The Ingestor only notices `should_shutdown` on its next wake, so the
    // Query Service's `rx.iter()` loop needs its own explicit signal to
    // drain and exit rather than waiting on a channel hang-up.
    let _ = tx.send(Msg::StopSignal);

    let ingestor_result = ingestor_handle
        .join()
        .map_err(|_| LlqError::IoRead(std::io::Error::other("ingestor thread panicked")))?;
    let query_service_result = query_service_handle
        .join()
        .map_err(|_| LlqError::IoRead(std::io::Error::other("query service thread panicked")))?;

    ingestor_result.map_err(LlqError::IoRead)?;
    query_service_result?;
    ui_result.map_err(LlqError::IoRead)?;
    Ok(())
}

