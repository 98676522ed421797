//! Dual-clock FIFO for moving transfer words between clock domains.
//!
//! The queue is split into a [`QueueWriter`] owned by the producer domain and
//! a [`QueueReader`] owned by the consumer domain. Each side only sees the
//! other side's pointer through its own [`Synchronizer`], clocked by its own
//! `tick()`, so status flags are always conservative:
//!
//! - the reader never reports data whose slot write has not completed
//! - the writer never reports space that the reader has not yet freed
//!
//! Any ratio between the two tick rates is safe, and the handles are `Send`
//! so the domains may run on separate threads.

mod dual_clock;
mod sync;

pub use dual_clock::{dual_clock_queue, QueueConfig, QueueReader, QueueWriter};
pub use sync::Synchronizer;

/// Default synchronizer depth, the classic two-flop chain.
pub const DEFAULT_SYNC_STAGES: usize = 2;
