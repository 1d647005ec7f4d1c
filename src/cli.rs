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

//! Command-line argument parsing.
//!
//! `clap` builder-API usage (`App`/`Arg`, `occurrences_of("v")` verbosity
//! counting, `ArgRequiredElseHelp`) applied to `llq`'s surface: a required
//! log file positional, a `-v` repeat flag, and the debug-only
//! `--query`/`--max-matches` one-shot path.

use std::path::PathBuf;

use clap::{App, Arg};

pub struct Args {
    pub log_file: PathBuf,
    pub verbosity: u64,
    /// `--query <expr>`: run a single filter against the whole file and
    /// print matches, bypassing the Ingestor/Query Service/TUI entirely.
    pub query: Option<String>,
    pub max_matches: usize,
}

/// Parse command arguments and return them inside the `Args` structure.
/// The clap crate handles program exit and error messages for invalid
/// arguments, and prints the usage banner (exiting non-zero) when
/// `log_file` is missing, matching spec.md §6.
pub fn parse_arguments() -> Args {
    let matches = App::new("llq")
        .version(env!("CARGO_PKG_VERSION"))
        .about(help::ABOUT)
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .arg(
            Arg::with_name("LOG_FILE")
                .help("Newline-delimited JSON log file to tail.")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("v")
                .long("verbose")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity."),
        )
        .arg(
            Arg::with_name("query")
                .long("query")
                .takes_value(true)
                .help("Debug: evaluate a single filter over the whole file and exit, instead of starting the interactive UI."),
        )
        .arg(
            Arg::with_name("max-matches")
                .long("max-matches")
                .takes_value(true)
                .help("Debug: cap the number of matches printed by --query."),
        )
        .get_matches();

    let log_file = PathBuf::from(matches.value_of("LOG_FILE").unwrap());
    let verbosity = matches.occurrences_of("v");
    let query = matches.value_of("query").map(str::to_string);
    let max_matches = matches
        .value_of("max-matches")
        .and_then(|v| v.parse().ok())
        .unwrap_or(usize::MAX);

    Args {
        log_file,
        verbosity,
        query,
        max_matches,
    }
}

mod help {
    pub const ABOUT: &str = "\
llq is a live log query tool. It tails a newline-delimited JSON log file,
keeps an in-memory bitset-accelerated index, and lets you type a small
filter expression that is re-evaluated on every keystroke and whenever new
log lines arrive.

A filter is a comma-separated list of atoms, each either a bare path
(presence test) or a path followed by a comparison: `msg`, `count > 2`,
`tag == 5`, `msg, count == 1`. `*` matches and projects every record.";
}
