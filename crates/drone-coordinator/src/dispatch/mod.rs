//! The dispatch subsystem: priority queue, required/assigned bookkeeping,
//! and the engine that turns events into unit assignments.

mod bookkeeping;
mod engine;
mod queue;

pub use bookkeeping::DispatchState;
pub use engine::DispatchEngine;
pub use queue::PriorityQueue;
