use displaydoc::Display;

/// Any error which can be reported by a [crate::CasArray] operation.
///
/// Losing a compare-and-set is not an error; it is reported through the `bool` result. The only
/// errors are precondition violations, which are never retried.
#[derive(Debug, Display, Eq, PartialEq, Clone, Copy)]
pub enum Error {
    /// Index {index} is out of bounds for an array of length {len}
    IndexOutOfBounds { index: usize, len: usize },
}

impl std::error::Error for Error {}

/// Attempted to convert a usize into an Outcome but it was out of bounds: {0}
#[derive(Debug, Display, Eq, PartialEq)]
pub(crate) struct OutcomeOutOfBoundsError(pub(crate) usize);
