#![allow(dead_code)]

use casn::CasArray;
use tracing::debug;

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::Arc;
        pub(crate) use loom::thread;
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::Arc;
        pub(crate) use shuttle::thread;
    } else {
        pub(crate) use std::sync::Arc;
        pub(crate) use std::thread;
    }
}

/// Two threads race a CAS2 over the same pair of cells with different updates. Exactly one of them
/// wins, and both cells show the winner's update.
pub(crate) fn racing_cas2_test() {
    let array: Arc<CasArray<usize>> = Arc::new(CasArray::new(4, 0));

    let join_handles: Vec<thread::JoinHandle<bool>> = [1usize, 5]
        .into_iter()
        .map(|update| {
            let array: Arc<CasArray<usize>> = array.clone();
            thread::spawn(move || array.compare_and_set2(0, 0, update, 2, 0, update))
        })
        .collect();

    let results: Vec<bool> = join_handles
        .into_iter()
        .map(|join_handle| join_handle.join().expect("A thread panicked"))
        .collect();
    debug!("results: {results:?}");

    assert_eq!(results.iter().filter(|won| **won).count(), 1);
    let winner: usize = if results[0] { 1 } else { 5 };
    assert_eq!(array.read(0), winner);
    assert_eq!(array.read(2), winner);
    assert_eq!(array.read(1), 0);
    assert_eq!(array.read(3), 0);
}

/// One thread moves a pair of cells with CAS2 while another hammers the second cell with
/// single-cell CAS. Every successful operation is accounted for in the final values.
pub(crate) fn mixed_cas_test(num_attempts: usize) {
    let array: Arc<CasArray<usize>> = Arc::new(CasArray::new(2, 0));

    let pair_array: Arc<CasArray<usize>> = array.clone();
    let pair_handle: thread::JoinHandle<usize> = thread::spawn(move || {
        let mut successes: usize = 0;
        for _ in 0..num_attempts {
            let first: usize = pair_array.read(0);
            let second: usize = pair_array.read(1);
            if pair_array.compare_and_set2(0, first, first + 1, 1, second, second + 1) {
                successes += 1;
            }
        }
        successes
    });

    let single_array: Arc<CasArray<usize>> = array.clone();
    let single_handle: thread::JoinHandle<usize> = thread::spawn(move || {
        let mut successes: usize = 0;
        for _ in 0..num_attempts {
            let second: usize = single_array.read(1);
            if single_array.compare_and_set(1, &second, second + 1) {
                successes += 1;
            }
        }
        successes
    });

    let pair_successes: usize = pair_handle.join().expect("A thread panicked");
    let single_successes: usize = single_handle.join().expect("A thread panicked");

    assert_eq!(array.read(0), pair_successes);
    assert_eq!(array.read(1), pair_successes + single_successes);
}

/// Writers move cells 1 and 0 together with CAS2 while a reader samples cell 1 and then cell 0.
/// Both cells only ever grow and always move as a pair, so the later read of cell 0 can never be
/// behind the earlier read of cell 1 unless a half-applied pair was visible.
pub(crate) fn paired_reader_test(num_writers: usize, moves_per_writer: usize, num_samples: usize) {
    let array: Arc<CasArray<usize>> = Arc::new(CasArray::new(2, 0));

    let writer_handles: Vec<thread::JoinHandle<()>> = (0..num_writers)
        .map(|_| {
            let array: Arc<CasArray<usize>> = array.clone();
            thread::spawn(move || {
                let mut moves: usize = 0;
                while moves < moves_per_writer {
                    let current: usize = array.read(1);
                    if array.compare_and_set2(1, current, current + 1, 0, current, current + 1) {
                        moves += 1;
                    }
                }
            })
        })
        .collect();

    let reader_array: Arc<CasArray<usize>> = array.clone();
    let reader_handle: thread::JoinHandle<()> = thread::spawn(move || {
        for _ in 0..num_samples {
            let second: usize = reader_array.read(1);
            let first: usize = reader_array.read(0);
            assert!(
                first >= second,
                "read cell 1 = {second} before cell 0 = {first}"
            );
        }
    });

    writer_handles
        .into_iter()
        .for_each(|join_handle| join_handle.join().expect("A thread panicked"));
    reader_handle.join().expect("A thread panicked");

    assert_eq!(array.read(0), num_writers * moves_per_writer);
    assert_eq!(array.read(1), num_writers * moves_per_writer);
}
