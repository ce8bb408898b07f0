use crate::descriptor::Descriptor;
use crate::sync::{AtomicPtr, Ordering};
use core::marker::PhantomData;
use crossbeam_epoch::{Guard, Shared};

/// What a cell currently holds: either a plain value or a pending operation which must be helped
/// to completion before the cell can be read.
pub(crate) enum Node<E> {
    Value(E),
    Descriptor(Descriptor<E>),
}

/// One slot of a [crate::CasArray].
///
/// The slot points at a heap-allocated [Node]. Every change to a slot is a single-word CAS from
/// one node pointer to a freshly allocated one, so a node is never re-installed after it has been
/// swapped out. Swapped-out nodes are retired through the epoch [Guard] of the thread which
/// swapped them out.
pub(crate) struct Cell<E> {
    node: AtomicPtr<Node<E>>,
    _marker: PhantomData<Box<Node<E>>>,
}

/// A node observed in a [Cell] while a [Guard] is pinned.
///
/// The pointer doubles as the expected value of a later [Cell::compare_exchange].
pub(crate) struct Snapshot<'g, E> {
    ptr: *mut Node<E>,
    node: &'g Node<E>,
}

impl<'g, E> Clone for Snapshot<'g, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'g, E> Copy for Snapshot<'g, E> {}

impl<'g, E> Snapshot<'g, E> {
    pub(crate) fn node(&self) -> &'g Node<E> {
        self.node
    }
}

impl<E> Cell<E> {
    pub(crate) fn new(value: E) -> Self {
        Self {
            node: AtomicPtr::new(Box::into_raw(Box::new(Node::Value(value)))),
            _marker: PhantomData,
        }
    }

    pub(crate) fn load<'g>(&self, _guard: &'g Guard) -> Snapshot<'g, E> {
        let ptr: *mut Node<E> = self.node.load(Ordering::SeqCst);
        // the pointer is never null, and a node is only freed once every guard pinned before it
        // was swapped out has been dropped
        let node: &'g Node<E> = unsafe { &*ptr };
        Snapshot { ptr, node }
    }

    /// Replace the node observed in `current` with `new`.
    ///
    /// On success, the replaced node is retired and a reference to the installed node is
    /// returned. On failure, `new` is handed back unpublished so the caller can retry with the
    /// same allocation.
    pub(crate) fn compare_exchange<'g>(
        &self,
        current: Snapshot<'g, E>,
        new: Box<Node<E>>,
        guard: &'g Guard,
    ) -> Result<&'g Node<E>, Box<Node<E>>> {
        let new_ptr: *mut Node<E> = Box::into_raw(new);
        match self
            .node
            .compare_exchange(current.ptr, new_ptr, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {
                unsafe {
                    guard.defer_destroy(Shared::from(current.ptr as *const Node<E>));
                    Ok(&*new_ptr)
                }
            }
            // never published, so still exclusively ours
            Err(_) => Err(unsafe { Box::from_raw(new_ptr) }),
        }
    }
}

impl<E> Drop for Cell<E> {
    fn drop(&mut self) {
        let ptr: *mut Node<E> = self.node.load(Ordering::Relaxed);
        drop(unsafe { Box::from_raw(ptr) });
    }
}
