use crate::err::OutcomeOutOfBoundsError;
use core::fmt::{Display, Formatter};

/// The position of a cell within a [crate::CasArray].
pub(crate) type CellIndex = usize;

/// The decision made for a two-cell operation.
///
/// `Undecided` can transition to either `Success` or `Fail`, exactly once. Both terminal
/// outcomes are final.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub(crate) enum Outcome {
    /// Nobody has decided yet whether both cells held their expected values.
    Undecided = 0,
    /// Both cells were reserved; they now move to their updated values.
    Success = 1,
    /// The second cell did not hold its expected value; both cells keep their expected values.
    Fail = 2,
}

impl Outcome {
    pub(crate) fn is_terminal(self) -> bool {
        self != Outcome::Undecided
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl TryFrom<usize> for Outcome {
    type Error = OutcomeOutOfBoundsError;

    fn try_from(outcome: usize) -> Result<Self, OutcomeOutOfBoundsError> {
        match outcome {
            i if i == Outcome::Undecided as usize => Ok(Outcome::Undecided),
            i if i == Outcome::Success as usize => Ok(Outcome::Success),
            i if i == Outcome::Fail as usize => Ok(Outcome::Fail),
            i => Err(OutcomeOutOfBoundsError(i)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Outcome;
    use crate::err::OutcomeOutOfBoundsError;
    use test_log::test;

    #[test]
    fn test_outcome_tags_decode_to_themselves() {
        for outcome in [Outcome::Undecided, Outcome::Success, Outcome::Fail] {
            assert_eq!(Outcome::try_from(outcome as usize), Ok(outcome));
        }
    }

    #[test]
    fn test_unknown_outcome_tag_is_rejected() {
        assert_eq!(Outcome::try_from(7), Err(OutcomeOutOfBoundsError(7)));
    }

    #[test]
    fn test_only_undecided_is_not_terminal() {
        assert!(!Outcome::Undecided.is_terminal());
        assert!(Outcome::Success.is_terminal());
        assert!(Outcome::Fail.is_terminal());
    }
}
