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

//! The message bus between the Ingestor, the UI, and the Query Service.
//!
//! Grounded in `examples/original_source/src/types.h`'s
//! `using Msg = std::variant<Index, Query, StopSignal>` over a
//! `folly::MPMCQueue<Msg>`. `crossbeam_channel` is the idiomatic Rust
//! equivalent of a bounded MPMC queue.

use crossbeam_channel::{Receiver, Sender};

use crate::index::Index;
use crate::query::Query;

/// Capacity chosen to absorb a burst of keystrokes or a batch of freshly
/// ingested lines without blocking the sender, while still bounding memory
/// if the Query Service falls behind.
pub const BUS_CAPACITY: usize = 100;

pub enum Msg {
    /// A partial index produced by the Ingestor, to be merged into the
    /// Query Service's master index.
    Index(Index),
    /// A freshly parsed filter submission from the UI.
    Query(Query),
    /// Cooperative shutdown request.
    StopSignal,
}

pub type BusSender = Sender<Msg>;
pub type BusReceiver = Receiver<Msg>;

/// A bounded MPMC channel pair carrying `Msg`s between the Ingestor, the
/// UI, and the Query Service.
pub fn bus() -> (BusSender, BusReceiver) {
    crossbeam_channel::bounded(BUS_CAPACITY)
}
