use crate::cell::{Cell, Node, Snapshot};
use crate::descriptor::{CasnDescriptor, Completable, Descriptor};
use crate::err::Error;
use crate::types::{CellIndex, Outcome};
use core::fmt::{Debug, Formatter};
use crossbeam_epoch::{self as epoch, Guard};
use std::sync::Arc;
use tracing::{instrument, trace};

/// A fixed-size array of cells supporting lock-free single-cell and two-cell compare-and-set.
///
/// Every accessor helps: whenever it finds another thread's pending operation in a cell, it
/// finishes that operation before going on with its own. No accessor ever observes a two-cell
/// operation half-applied, and a thread suspended in the middle of one never blocks others.
///
/// The `try_` methods report an out-of-bounds index as an [Error]. Their counterparts without
/// the prefix panic on it instead, like slice indexing does.
pub struct CasArray<E> {
    pub(crate) cells: Box<[Cell<E>]>,
}

impl<E> CasArray<E>
where
    E: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create an array of `size` cells which all start out holding `initial`.
    pub fn new(size: usize, initial: E) -> Self {
        core::iter::repeat(initial).take(size).collect()
    }

    /// Create an array whose cells start out holding `values`, in order.
    pub fn from_vec(values: Vec<E>) -> Self {
        values.into_iter().collect()
    }

    /// The number of cells, fixed at construction.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the array has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read the value at `index`, completing any operation pending on that cell first.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn read(&self, index: usize) -> E {
        or_panic(self.try_read(index))
    }

    /// Set the value at `index` unconditionally.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn write(&self, index: usize, value: E) {
        or_panic(self.try_write(index, value))
    }

    /// Replace the value at `index` with `update` if it equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn compare_and_set(&self, index: usize, expected: &E, update: E) -> bool {
        or_panic(self.try_compare_and_set(index, expected, update))
    }

    /// Atomically replace the values at `index1` and `index2` with `update1` and `update2` if they
    /// equal `expected1` and `expected2` respectively.
    ///
    /// See [CasArray::try_compare_and_set2] for what happens when both indices are the same.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[track_caller]
    pub fn compare_and_set2(
        &self,
        index1: usize,
        expected1: E,
        update1: E,
        index2: usize,
        expected2: E,
        update2: E,
    ) -> bool {
        or_panic(self.try_compare_and_set2(index1, expected1, update1, index2, expected2, update2))
    }

    #[instrument(level = "trace", skip_all, fields(index = index))]
    pub fn try_read(&self, index: usize) -> Result<E, Error> {
        let cell: &Cell<E> = self.cell(index)?;
        let guard: &Guard = &epoch::pin();
        let (_, value) = self.settle(cell, guard);
        Ok(value.clone())
    }

    /// Set the value at `index`. The write is a CAS loop from whatever plain value the cell holds,
    /// so an operation pending on the cell is completed rather than overwritten.
    #[instrument(level = "trace", skip_all, fields(index = index))]
    pub fn try_write(&self, index: usize, value: E) -> Result<(), Error> {
        let cell: &Cell<E> = self.cell(index)?;
        let guard: &Guard = &epoch::pin();

        let mut node: Box<Node<E>> = Box::new(Node::Value(value));
        loop {
            let (snapshot, _) = self.settle(cell, guard);
            match cell.compare_exchange(snapshot, node, guard) {
                Ok(_) => return Ok(()),
                Err(returned) => node = returned,
            }
        }
    }

    /// A mismatch between the plain value in the cell and `expected` fails immediately. Only
    /// interference from another thread causes a retry.
    #[instrument(level = "trace", skip_all, fields(index = index))]
    pub fn try_compare_and_set(
        &self,
        index: usize,
        expected: &E,
        update: E,
    ) -> Result<bool, Error> {
        let cell: &Cell<E> = self.cell(index)?;
        let guard: &Guard = &epoch::pin();

        let mut node: Box<Node<E>> = Box::new(Node::Value(update));
        loop {
            let (snapshot, current) = self.settle(cell, guard);
            if current != expected {
                return Ok(false);
            }
            match cell.compare_exchange(snapshot, node, guard) {
                Ok(_) => return Ok(true),
                Err(returned) => node = returned,
            }
        }
    }

    /// If `index1 == index2`, a single cell cannot equal two different expected values, so this
    /// returns `false` unless `expected1 == expected2`, in which case it is
    /// `compare_and_set(index1, &expected1, update2)`. `update1` is ignored.
    #[instrument(level = "trace", skip_all, fields(index1 = index1, index2 = index2))]
    pub fn try_compare_and_set2(
        &self,
        index1: usize,
        expected1: E,
        update1: E,
        index2: usize,
        expected2: E,
        update2: E,
    ) -> Result<bool, Error> {
        self.cell(index1)?;
        self.cell(index2)?;
        if index1 == index2 {
            if expected1 != expected2 {
                return Ok(false);
            }
            return self.try_compare_and_set(index1, &expected1, update2);
        }

        let descriptor: Arc<CasnDescriptor<E>> = Arc::new(CasnDescriptor::new(
            index1, expected1, update1, index2, expected2, update2,
        ));
        let first: &Cell<E> = &self.cells[descriptor.index1];
        let guard: &Guard = &epoch::pin();

        let mut node: Box<Node<E>> =
            Box::new(Node::Descriptor(Descriptor::Casn(Arc::clone(&descriptor))));
        loop {
            let (snapshot, current) = self.settle(first, guard);
            if *current != descriptor.expected1 {
                return Ok(false);
            }
            match first.compare_exchange(snapshot, node, guard) {
                Ok(_) => break,
                Err(returned) => node = returned,
            }
        }
        trace!("cell {}: installed descriptor", descriptor.index1);

        descriptor.drive_to_completion(&self.cells, guard);
        Ok(descriptor.outcome() == Outcome::Success)
    }

    fn cell(&self, index: CellIndex) -> Result<&Cell<E>, Error> {
        self.cells.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.cells.len(),
        })
    }

    /// Help until `cell` holds a plain value, and return it along with the node holding it.
    fn settle<'g>(&self, cell: &Cell<E>, guard: &'g Guard) -> (Snapshot<'g, E>, &'g E) {
        loop {
            let snapshot: Snapshot<'g, E> = cell.load(guard);
            match snapshot.node() {
                Node::Value(value) => return (snapshot, value),
                Node::Descriptor(descriptor) => {
                    descriptor.drive_to_completion(&self.cells, guard)
                }
            }
        }
    }

    /// Consume the array and return the values of its cells in order.
    pub fn into_vec(self) -> Vec<E> {
        (0..self.len()).map(|index| self.read(index)).collect()
    }
}

impl<E> FromIterator<E> for CasArray<E>
where
    E: Clone + PartialEq + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = E>>(values: I) -> Self {
        Self {
            cells: values.into_iter().map(Cell::new).collect(),
        }
    }
}

impl<E> Debug for CasArray<E>
where
    E: Debug + Clone + PartialEq + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries((0..self.len()).map(|index| self.read(index)))
            .finish()
    }
}

#[track_caller]
fn or_panic<T>(result: Result<T, Error>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => panic!("{error}"),
    }
}
