use crate::cell::{Cell, Node};
use crate::descriptor::{Completable, Descriptor, DcssDescriptor};
use crate::sync::{AtomicUsize, Ordering};
use crate::types::{CellIndex, Outcome};
use crossbeam_epoch::Guard;
use std::sync::Arc;
use tracing::{debug, trace};

/// A two-cell compare-and-set which any thread may finish.
///
/// The descriptor is installed in its lower-indexed cell first. Completing it means reserving the
/// higher-indexed cell (through a [DcssDescriptor]), deciding the [Outcome], and finally pushing
/// the decided values into both cells. Only the outcome ever changes after construction.
pub(crate) struct CasnDescriptor<E> {
    pub(crate) index1: CellIndex,
    pub(crate) expected1: E,
    pub(crate) update1: E,
    pub(crate) index2: CellIndex,
    pub(crate) expected2: E,
    pub(crate) update2: E,
    outcome: AtomicUsize,
}

impl<E> CasnDescriptor<E> {
    /// Build an undecided descriptor, swapping the two triples if necessary so that `index1` is
    /// always the lower index. Every CAS2 touching the same pair claims it in the same order.
    pub(crate) fn new(
        index1: CellIndex,
        expected1: E,
        update1: E,
        index2: CellIndex,
        expected2: E,
        update2: E,
    ) -> Self {
        debug_assert_ne!(index1, index2, "a CASN descriptor needs two distinct cells");
        if index1 < index2 {
            Self::with_order(index1, expected1, update1, index2, expected2, update2)
        } else {
            Self::with_order(index2, expected2, update2, index1, expected1, update1)
        }
    }

    fn with_order(
        index1: CellIndex,
        expected1: E,
        update1: E,
        index2: CellIndex,
        expected2: E,
        update2: E,
    ) -> Self {
        Self {
            index1,
            expected1,
            update1,
            index2,
            expected2,
            update2,
            outcome: AtomicUsize::new(Outcome::Undecided as usize),
        }
    }

    pub(crate) fn outcome(&self) -> Outcome {
        let outcome: usize = self.outcome.load(Ordering::SeqCst);
        match Outcome::try_from(outcome) {
            Ok(outcome) => outcome,
            // only Outcome tags are ever stored
            Err(error) => unreachable!("{error}"),
        }
    }

    /// Try to move the outcome from `Undecided` to `decision` and return whichever terminal
    /// outcome won.
    pub(crate) fn decide(&self, decision: Outcome) -> Outcome {
        match self.outcome.compare_exchange(
            Outcome::Undecided as usize,
            decision as usize,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                debug!(
                    "cells {} and {}: decided {decision}",
                    self.index1, self.index2
                );
                decision
            }
            Err(_) => self.outcome(),
        }
    }

    pub(crate) fn is(&self, other: &CasnDescriptor<E>) -> bool {
        core::ptr::eq(self, other)
    }
}

impl<E: Clone + PartialEq> CasnDescriptor<E> {
    /// Overwrite each cell which still holds this descriptor with the given value.
    ///
    /// A cell holding anything else has either been pushed by another helper already or was never
    /// reserved, so there is nothing to do there.
    fn push(&self, cells: &[Cell<E>], value1: &E, value2: &E, guard: &Guard) {
        for (index, value) in [(self.index1, value1), (self.index2, value2)] {
            let cell: &Cell<E> = &cells[index];
            // allocated only once the cell is known to still hold this descriptor
            let mut node: Option<Box<Node<E>>> = None;
            loop {
                let snapshot = cell.load(guard);
                match snapshot.node() {
                    Node::Descriptor(Descriptor::Casn(held)) if held.is(self) => {
                        let new: Box<Node<E>> = node
                            .take()
                            .unwrap_or_else(|| Box::new(Node::Value(value.clone())));
                        match cell.compare_exchange(snapshot, new, guard) {
                            Ok(_) => {
                                trace!("cell {index}: pushed final value");
                                break;
                            }
                            Err(returned) => node = Some(returned),
                        }
                    }
                    _ => break,
                }
            }
        }
    }
}

impl<E: Clone + PartialEq> Completable<E> for Arc<CasnDescriptor<E>> {
    fn drive_to_completion(&self, cells: &[Cell<E>], guard: &Guard) {
        let second: &Cell<E> = &cells[self.index2];
        let outcome: Outcome = loop {
            let outcome: Outcome = self.outcome();
            if outcome.is_terminal() {
                break outcome;
            }

            let snapshot = second.load(guard);
            match snapshot.node() {
                Node::Descriptor(Descriptor::Casn(held)) if held.is(self) => {
                    break self.decide(Outcome::Success);
                }
                Node::Descriptor(foreign) => {
                    trace!("cell {}: helping a descriptor in the way", self.index2);
                    foreign.drive_to_completion(cells, guard);
                }
                Node::Value(value) if *value == self.expected2 => {
                    let dcss: DcssDescriptor<E> =
                        DcssDescriptor::new(self.index2, value.clone(), Arc::clone(self));
                    let node: Box<Node<E>> = Box::new(Node::Descriptor(Descriptor::Dcss(dcss)));
                    if let Ok(installed) = second.compare_exchange(snapshot, node, guard) {
                        trace!("cell {}: installed reservation", self.index2);
                        installed.drive_to_completion(cells, guard);
                    }
                }
                Node::Value(_) => {
                    break self.decide(Outcome::Fail);
                }
            }
        };

        match outcome {
            Outcome::Success => self.push(cells, &self.update1, &self.update2, guard),
            _ => self.push(cells, &self.expected1, &self.expected2, guard),
        }
    }
}
