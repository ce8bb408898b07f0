use crate::cell::{Cell, Node};
use crate::descriptor::{CasnDescriptor, Completable, Descriptor};
use crate::types::{CellIndex, Outcome};
use crossbeam_epoch::Guard;
use std::sync::Arc;
use tracing::trace;

/// Double-compare single-swap: replace the plain value `expected` at `index` with `owner`, but only
/// while `owner` is still undecided.
///
/// Created fresh for every reservation attempt and never reused. Checking the owner's outcome and
/// writing the cell must look atomic to every helper, which is why the check happens while this
/// descriptor already occupies the cell.
pub(crate) struct DcssDescriptor<E> {
    index: CellIndex,
    expected: E,
    owner: Arc<CasnDescriptor<E>>,
}

impl<E> DcssDescriptor<E> {
    pub(crate) fn new(index: CellIndex, expected: E, owner: Arc<CasnDescriptor<E>>) -> Self {
        Self {
            index,
            expected,
            owner,
        }
    }
}

impl<E: Clone + PartialEq> Completable<E> for DcssDescriptor<E> {
    fn drive_to_completion(&self, cells: &[Cell<E>], guard: &Guard) {
        let cell: &Cell<E> = &cells[self.index];
        let snapshot = cell.load(guard);
        match snapshot.node() {
            Node::Descriptor(Descriptor::Dcss(held)) if core::ptr::eq(held, self) => {}
            // already completed by someone else
            _ => return,
        }

        let replacement: Node<E> = if self.owner.outcome() == Outcome::Undecided {
            Node::Descriptor(Descriptor::Casn(Arc::clone(&self.owner)))
        } else {
            Node::Value(self.expected.clone())
        };
        let keeps_reservation: bool = matches!(replacement, Node::Descriptor(_));
        if cell
            .compare_exchange(snapshot, Box::new(replacement), guard)
            .is_ok()
        {
            if keeps_reservation {
                trace!("cell {}: reservation kept", self.index);
            } else {
                trace!("cell {}: reservation abandoned", self.index);
            }
        }
    }
}
