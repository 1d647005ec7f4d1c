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

//! `-v`/`-vv` occurrence counting and `simplelog` setup, split into two
//! distinct destinations depending on whether the TUI owns the terminal.

use log::LevelFilter;
use simplelog::{Config, TermLogger, TerminalMode, WriteLogger};

pub fn level_for(verbosity_occurrences: u64) -> LevelFilter {
    match verbosity_occurrences {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Live-UI mode: the terminal is in alternate-screen raw mode, so stray log
/// lines would corrupt the display. Logs go to `path` instead.
pub fn init_to_file(path: &std::path::Path, level: LevelFilter) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let _ = WriteLogger::init(level, Config::default(), file);
    Ok(())
}

/// One-shot `--query` mode: there's no live screen to protect, so logs go
/// straight to stderr.
pub fn init_to_stderr(level: LevelFilter) {
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}
