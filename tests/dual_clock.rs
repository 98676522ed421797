use ftbridge::clock::{ClockPair, Domain};
use ftbridge::fifo::{dual_clock_queue, QueueConfig, QueueReader, QueueWriter};
use ftbridge::Word;
use std::thread;

fn queue(capacity: usize, sync_stages: usize) -> (QueueWriter, QueueReader) {
  let config = QueueConfig::new(capacity, Domain::Host, Domain::Peripheral).with_sync_stages(sync_stages);
  dual_clock_queue(&config).unwrap()
}

/// Producer on host edges, consumer on peripheral edges. Returns the words
/// received and the number of scheduler steps it took.
fn transfer(host_ps: u64, periph_ps: u64, capacity: usize, count: u32) -> (Vec<Word>, u64) {
  let (mut tx, mut rx) = queue(capacity, 2);
  let mut clocks = ClockPair::new(host_ps, periph_ps).unwrap();
  let mut next = 0;
  let mut out = Vec::new();
  let mut steps = 0;

  while out.len() < count as usize && steps < 1_000_000 {
    let edges = clocks.advance();
    steps += 1;
    if edges.host {
      if next < count && tx.w_rdy() {
        assert!(tx.push(next));
        next += 1;
      }
      assert!(tx.w_level() <= capacity);
      tx.tick();
    }
    if edges.peripheral {
      if let Some(word) = rx.pop() {
        out.push(word);
      }
      assert!(rx.r_level() <= capacity);
      rx.tick();
    }
  }
  (out, steps)
}

#[test]
fn ordered_delivery_across_clock_ratios() {
  let ratios = [
    (40_000, 10_000),
    (10_000, 40_000),
    (10_000, 10_000),
    (7_000, 3_000),
    (3_000, 7_000),
    (12_345, 10_000),
    (10_000, 12_345),
  ];
  for (host_ps, periph_ps) in ratios {
    for capacity in [2, 4, 16] {
      let (out, _) = transfer(host_ps, periph_ps, capacity, 500);
      assert_eq!(
        out,
        (0..500).collect::<Vec<Word>>(),
        "host={}ps periph={}ps capacity={}",
        host_ps,
        periph_ps,
        capacity
      );
    }
  }
}

#[test]
fn visibility_latency_equals_sync_depth() {
  for stages in 1..=4 {
    let (mut tx, mut rx) = queue(4, stages);
    tx.push(42);
    for _ in 0..stages - 1 {
      rx.tick();
      assert!(!rx.r_rdy(), "visible early with {} stages", stages);
    }
    rx.tick();
    assert_eq!(rx.pop(), Some(42));
  }
}

#[test]
fn space_is_reported_late_never_early() {
  let (mut tx, mut rx) = queue(2, 2);
  tx.push(1);
  tx.push(2);
  rx.tick();
  rx.tick();
  assert_eq!(rx.pop(), Some(1));
  assert_eq!(rx.pop(), Some(2));

  // reader is empty, writer still believes it is full
  assert_eq!(rx.r_level(), 0);
  assert_eq!(tx.w_level(), 2);
  assert!(!tx.push(3));
  tx.tick();
  tx.tick();
  assert_eq!(tx.w_level(), 0);
}

fn run_threads(count: u32, capacity: usize) {
  let (mut tx, mut rx) = queue(capacity, 2);

  let producer = thread::spawn(move || {
    let mut next = 0;
    while next < count {
      if tx.push(next) {
        next += 1;
      } else {
        thread::yield_now();
      }
      tx.tick();
    }
  });

  let consumer = thread::spawn(move || {
    let mut expected = 0;
    while expected < count {
      match rx.pop() {
        Some(word) => {
          assert_eq!(word, expected);
          expected += 1;
        },
        None => thread::yield_now(),
      }
      rx.tick();
    }
  });

  producer.join().unwrap();
  consumer.join().unwrap();
}

#[test]
fn threads_as_clock_domains() {
  run_threads(20_000, 8);
}

#[cfg(feature = "soak-tests")]
#[test]
fn soak_threads_as_clock_domains() {
  for capacity in [2, 64, 1024] {
    run_threads(5_000_000, capacity);
  }
}
