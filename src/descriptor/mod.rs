//! Descriptors announce an in-flight operation in place of a plain value.
//!
//! Any thread which finds a descriptor in a cell must drive it to completion before it can make
//! progress on that cell. Both descriptor kinds are therefore [Completable], and completing one is
//! idempotent: any number of threads may complete the same descriptor concurrently.

use crate::cell::{Cell, Node};
use crossbeam_epoch::Guard;
use std::sync::Arc;

pub(crate) use casn::CasnDescriptor;
pub(crate) use dcss::DcssDescriptor;

mod casn;
mod dcss;

/// A pending operation occupying a cell.
pub(crate) enum Descriptor<E> {
    /// A two-cell compare-and-set. Shared, because it may occupy both of its cells and is
    /// referenced by the DCSS descriptors created on its behalf.
    Casn(Arc<CasnDescriptor<E>>),
    /// A reservation of the second cell of a [CasnDescriptor], conditional on it still being
    /// undecided. Lives in exactly one node.
    Dcss(DcssDescriptor<E>),
}

/// Something a thread can finish on behalf of whoever started it.
pub(crate) trait Completable<E> {
    /// Drive the operation until the cells it occupies no longer reference it, or until it is
    /// clear that another thread is responsible for the remaining steps.
    fn drive_to_completion(&self, cells: &[Cell<E>], guard: &Guard);
}

impl<E: Clone + PartialEq> Completable<E> for Descriptor<E> {
    fn drive_to_completion(&self, cells: &[Cell<E>], guard: &Guard) {
        match self {
            Descriptor::Casn(casn) => casn.drive_to_completion(cells, guard),
            Descriptor::Dcss(dcss) => dcss.drive_to_completion(cells, guard),
        }
    }
}

impl<E: Clone + PartialEq> Completable<E> for Node<E> {
    fn drive_to_completion(&self, cells: &[Cell<E>], guard: &Guard) {
        if let Node::Descriptor(descriptor) = self {
            descriptor.drive_to_completion(cells, guard);
        }
    }
}
