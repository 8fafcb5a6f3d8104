use std::ops::BitXor;

/// Three-valued acceptance state of a statement within a position.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Acceptance {
    Rejected = 0,
    Accepted = 1,
    Undecided = 2,
}

impl Acceptance {
    #[inline]
    pub const fn is_undecided(self) -> bool {
        (self as u8) > 1
    }

    #[inline]
    pub const fn is_decided(self) -> bool {
        !self.is_undecided()
    }
}

impl From<bool> for Acceptance {
    fn from(b: bool) -> Self {
        if b {
            Acceptance::Accepted
        } else {
            Acceptance::Rejected
        }
    }
}

// Acceptance ^ bool
//
// Xor-ing with `true` swaps Accepted and Rejected, which is exactly the
// lookup rule for negative literals.
impl BitXor<bool> for Acceptance {
    type Output = Acceptance;

    fn bitxor(self, rhs: bool) -> Self::Output {
        match (self, rhs) {
            (Acceptance::Undecided, _) => Acceptance::Undecided,
            (value, false) => value,
            (Acceptance::Accepted, true) => Acceptance::Rejected,
            (Acceptance::Rejected, true) => Acceptance::Accepted,
        }
    }
}
