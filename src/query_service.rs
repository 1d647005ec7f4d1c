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

//! The Query Service thread: owns the master `Index`, answers `Query`
//! messages, and re-runs the last query whenever a new partial `Index`
//! arrives.
//!
//! Grounded in `examples/original_source/src/query_service.h`'s
//! `startQueryService`/`spawnQueryService`. `folly::Synchronized` becomes
//! `std::sync::RwLock`; the `std::function<void()> onResult` callback
//! becomes a boxed closure, same as the original.

use std::sync::{Arc, RwLock};

use log::{debug, error, info};

use crate::bus::{BusReceiver, Msg};
use crate::error::LlqError;
use crate::index::Index;
use crate::query::{self, Query, QueryResult};

pub type SharedQueryResult = Arc<RwLock<QueryResult>>;

/// Wakes the UI after a new `QueryResult` has been published. Boxed rather
/// than generic since the Query Service is spawned behind `thread::spawn`,
/// which needs a single concrete, `'static + Send` type either way.
pub type OnResult = Box<dyn Fn() + Send>;

/// Runs until a `StopSignal` is received or the bus hangs up. Returns
/// `Err` on an `IndexGap` (spec.md §7: fatal, programmer error) so the
/// caller can report it the same way as any other fatal `LlqError`
/// instead of the thread unwinding via `panic!`.
pub fn run(rx: BusReceiver, result: SharedQueryResult, on_result: OnResult) -> crate::Result<()> {
    info!("starting query service");
    let mut index = Index::new();
    let mut last_served_seq: u64 = 0;

    let mut handle_query = |index: &Index, query: Query| {
        debug!("evaluating query seq={}", query.seq);
        if let Some(fresh) = query::run_query_on_index(index, query) {
            *result.write().expect("query result lock poisoned") = fresh;
            on_result();
        }
    };

    for msg in rx.iter() {
        match msg {
            Msg::StopSignal => {
                info!("query service received stop signal");
                break;
            }
            Msg::Query(query) => {
                if query.seq < last_served_seq {
                    debug!("dropping stale query seq={}", query.seq);
                    continue;
                }
                last_served_seq = query.seq;
                handle_query(&index, query);
            }
            Msg::Index(partial) => {
                if let Err(gap) = index.merge(partial) {
                    // A gap here means the Ingestor's contiguity invariant
                    // was violated; there is no way to make progress.
                    let err = LlqError::from(gap);
                    error!("{err}");
                    return Err(err);
                }
                let last_query = result.read().expect("query result lock poisoned").query.clone();
                if last_query.seq > 0 {
                    handle_query(&index, last_query);
                }
            }
        }
    }
    info!("query service shutting down");
    Ok(())
}
