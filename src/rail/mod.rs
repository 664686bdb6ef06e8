// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Parallel rails: a single-producer, multi-consumer rendezvous.
//!
//! * `parallel` - `ParallelFlow`, the public fan-out/fan-in operators
//! * `producer` - round-robin producer loop
//! * `slot` - single-slot fan-out mailbox per rail
//! * `join` - single-slot fan-in mailbox and the joiner behind `sequential()`
//! * `pipeline` - shared failure/cancellation control block
//! * `scheduler` - picks the runtime each rail runs on

mod join;
mod parallel;
mod pipeline;
mod producer;
mod scheduler;
mod slot;


pub use parallel::{parallel, try_parallel, ParallelExt, ParallelFlow, RailStream};
pub use scheduler::RailScheduler;
