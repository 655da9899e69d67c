//! Integration tests for the producer/consumer buffer.
//!
//! These tests drive the buffer from real threads and check ordering,
//! blocking, and liveness as seen by producers and consumers.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use taproom_core::BufferConfig;
use taproom_sync::ProducerConsumer;

#[test]
fn test_fourth_put_blocks_until_first_get() {
    let pc = Arc::new(ProducerConsumer::startup(&BufferConfig { capacity: 3 }).unwrap());
    let (stored_tx, stored_rx) = unbounded();

    let producer = {
        let pc = Arc::clone(&pc);
        thread::spawn(move || {
            for item in 1..=4 {
                pc.put(item);
                stored_tx.send(item).unwrap();
            }
        })
    };

    // The first three puts complete, the fourth is stuck on a full buffer
    thread::sleep(Duration::from_millis(100));
    assert_eq!(stored_rx.try_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(pc.len(), 3);

    assert_eq!(pc.get(), 1);
    assert_eq!(
        stored_rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        4
    );
    producer.join().unwrap();

    let rest: Vec<_> = (0..3).map(|_| pc.get()).collect();
    assert_eq!(rest, vec![2, 3, 4]);
    assert!(pc.is_empty());

    let pc = Arc::try_unwrap(pc).unwrap();
    assert!(pc.shutdown().is_empty());
}

#[test]
fn test_each_producer_stream_stays_in_order() {
    let pc = Arc::new(ProducerConsumer::startup(&BufferConfig { capacity: 2 }).unwrap());
    let producers = 3;
    let per_producer = 100;

    let handles: Vec<_> = (0..producers)
        .map(|producer| {
            let pc = Arc::clone(&pc);
            thread::spawn(move || {
                for seq in 0..per_producer {
                    pc.put((producer, seq));
                }
            })
        })
        .collect();

    let mut next_expected = vec![0; producers];
    for _ in 0..producers * per_producer {
        let (producer, seq) = pc.get();
        assert_eq!(seq, next_expected[producer]);
        next_expected[producer] += 1;
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(next_expected, vec![per_producer; producers]);
}

#[test]
fn test_blocked_consumers_all_make_progress() {
    let pc = Arc::new(ProducerConsumer::startup(&BufferConfig { capacity: 1 }).unwrap());
    let (done_tx, done_rx) = unbounded();

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let pc = Arc::clone(&pc);
            let done_tx = done_tx.clone();
            thread::spawn(move || {
                let item: u32 = pc.get();
                done_tx.send(item).unwrap();
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    for item in 0..4 {
        pc.put(item);
    }

    let mut received: Vec<_> = (0..4)
        .map(|_| done_rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();
    received.sort_unstable();
    assert_eq!(received, vec![0, 1, 2, 3]);

    for consumer in consumers {
        consumer.join().unwrap();
    }
}
