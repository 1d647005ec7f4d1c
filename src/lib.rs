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

//! `llq` — a live log query tool. Tails a newline-delimited JSON log file,
//! keeps an in-memory bitset-accelerated index, and re-evaluates a small
//! filter expression on every keystroke and whenever new lines arrive.
//!
//! The module layout mirrors the core components of the pipeline plus the
//! ambient stack around them: [`bitset`] (dynamic bit-vectors),
//! [`value`]/[`path`]/[`expr`] (the data model for a filter atom),
//! [`parser`] (the filter grammar), [`index`] (the dense line store plus
//! presence bitsets and its contiguous-range merge), [`ingestor`] (the
//! tail-follow thread), [`query`] (a parsed filter submission and its
//! evaluation against an `Index`), [`query_service`] (the thread owning the
//! master index), [`bus`] (the message queue tying the three threads
//! together), [`reverse_reader`] (the end-to-beginning file reader backing
//! the one-shot debug path), [`error`], [`logging`], and [`cli`].

#[macro_use]
extern crate log;

pub mod bitset;
pub mod bus;
pub mod cli;
pub mod error;
pub mod expr;
pub mod index;
pub mod ingestor;
pub mod logging;
pub mod parser;
pub mod path;
pub mod query;
pub mod query_service;
pub mod reverse_reader;
pub mod ui;
pub mod value;

pub use error::{LlqError, Result};
