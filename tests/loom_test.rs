#![cfg(loom)]

mod common;

#[test]
fn two_thread_loom_test() {
    loom::model(|| {
        common::racing_cas2_test();
    })
}

#[test]
fn paired_reader_loom_test() {
    loom::model(|| {
        common::paired_reader_test(1, 1, 1);
    })
}

#[test]
fn mixed_cas_loom_test() {
    loom::model(|| {
        common::mixed_cas_test(1);
    })
}
