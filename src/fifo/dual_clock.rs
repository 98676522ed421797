use super::sync::Synchronizer;
use super::DEFAULT_SYNC_STAGES;
use crate::clock::Domain;
use crate::error::ConfigError;
use crate::word::Word;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
  /// Number of entries, a power of two.
  pub capacity: usize,
  pub sync_stages: usize,
  pub producer: Domain,
  pub consumer: Domain,
}

impl QueueConfig {
  pub fn new(capacity: usize, producer: Domain, consumer: Domain) -> Self {
    Self {
      capacity,
      sync_stages: DEFAULT_SYNC_STAGES,
      producer,
      consumer,
    }
  }

  pub fn with_sync_stages(mut self, sync_stages: usize) -> Self {
    self.sync_stages = sync_stages;
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.capacity < 2 || !self.capacity.is_power_of_two() {
      return Err(ConfigError::InvalidCapacity(self.capacity));
    }
    if self.sync_stages == 0 {
      return Err(ConfigError::InvalidSyncStages);
    }
    Ok(())
  }
}

/// State shared by both ends. Pointers are free-running counters; a slot
/// index is the pointer masked by `capacity - 1`.
#[derive(Debug)]
struct Shared {
  slots: Box<[AtomicU32]>,
  mask: usize,
  /// Write pointer, published with Release after the slot store.
  w_ptr: AtomicUsize,
  /// Read pointer, published with Release after the slot load.
  r_ptr: AtomicUsize,
}

/// Creates a dual-clock queue and returns its producer and consumer ends.
pub fn dual_clock_queue(config: &QueueConfig) -> Result<(QueueWriter, QueueReader), ConfigError> {
  config.validate()?;

  let slots: Vec<AtomicU32> = (0..config.capacity).map(|_| AtomicU32::new(0)).collect();
  let shared = Arc::new(Shared {
    slots: slots.into_boxed_slice(),
    mask: config.capacity - 1,
    w_ptr: AtomicUsize::new(0),
    r_ptr: AtomicUsize::new(0),
  });

  log::debug!(
    "dual-clock queue: capacity={} stages={} {} -> {}",
    config.capacity,
    config.sync_stages,
    config.producer,
    config.consumer
  );

  let writer = QueueWriter {
    shared: Arc::clone(&shared),
    w_ptr: 0,
    r_sync: Synchronizer::new(config.sync_stages),
    domain: config.producer,
  };
  let reader = QueueReader {
    shared,
    r_ptr: 0,
    w_sync: Synchronizer::new(config.sync_stages),
    domain: config.consumer,
  };
  Ok((writer, reader))
}

/// Producer end, owned by the producer clock domain.
#[derive(Debug)]
pub struct QueueWriter {
  shared: Arc<Shared>,
  w_ptr: usize,
  r_sync: Synchronizer,
  domain: Domain,
}

impl QueueWriter {
  pub fn capacity(&self) -> usize {
    self.shared.mask + 1
  }

  /// Fill level as seen by the producer. It may overstate the true level
  /// until the reader's progress has crossed the synchronizer.
  pub fn w_level(&self) -> usize {
    self.w_ptr.wrapping_sub(self.r_sync.output())
  }

  /// Space available.
  pub fn w_rdy(&self) -> bool {
    self.w_level() < self.capacity()
  }

  /// Enqueues `word` if there is space. A push while full is refused and
  /// leaves the queue untouched.
  pub fn push(&mut self, word: Word) -> bool {
    if !self.w_rdy() {
      log::trace!("[{}] push refused, queue full", self.domain);
      return false;
    }

    self.shared.slots[self.w_ptr & self.shared.mask].store(word, Ordering::Relaxed);
    self.w_ptr = self.w_ptr.wrapping_add(1);
    self.shared.w_ptr.store(self.w_ptr, Ordering::Release);
    true
  }

  /// One producer clock edge.
  pub fn tick(&mut self) {
    let r_ptr = self.shared.r_ptr.load(Ordering::Acquire);
    self.r_sync.clock(r_ptr);
  }

  pub fn domain(&self) -> Domain {
    self.domain
  }
}

/// Consumer end, owned by the consumer clock domain.
#[derive(Debug)]
pub struct QueueReader {
  shared: Arc<Shared>,
  r_ptr: usize,
  w_sync: Synchronizer,
  domain: Domain,
}

impl QueueReader {
  pub fn capacity(&self) -> usize {
    self.shared.mask + 1
  }

  /// Fill level as seen by the consumer. It may understate the true level
  /// until recent writes have crossed the synchronizer.
  pub fn r_level(&self) -> usize {
    self.w_sync.output().wrapping_sub(self.r_ptr)
  }

  /// Data available.
  pub fn r_rdy(&self) -> bool {
    self.r_level() > 0
  }

  /// Head entry, without consuming it.
  pub fn peek(&self) -> Option<Word> {
    if !self.r_rdy() {
      return None;
    }
    Some(self.shared.slots[self.r_ptr & self.shared.mask].load(Ordering::Relaxed))
  }

  /// Dequeues the head entry. Returns `None` and keeps the read position
  /// when nothing is available.
  pub fn pop(&mut self) -> Option<Word> {
    let word = self.peek()?;
    self.r_ptr = self.r_ptr.wrapping_add(1);
    self.shared.r_ptr.store(self.r_ptr, Ordering::Release);
    Some(word)
  }

  /// One consumer clock edge.
  pub fn tick(&mut self) {
    let w_ptr = self.shared.w_ptr.load(Ordering::Acquire);
    self.w_sync.clock(w_ptr);
  }

  pub fn domain(&self) -> Domain {
    self.domain
  }
}
