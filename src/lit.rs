use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// A signed statement reference: `+i` asserts statement `i`,
/// `-i` asserts its negation. Zero is not a literal.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Lit(i32);

impl Lit {
    pub fn new(val: i32) -> Self {
        assert!(val != 0, "literal must not be zero");
        Lit(val)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// The statement referenced, i.e. `|lit|`.
    pub const fn statement(self) -> u32 {
        self.0.unsigned_abs()
    }

    pub const fn sign(self) -> i32 {
        self.0.signum()
    }

    pub const fn negated(self) -> bool {
        self.0 < 0
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl From<i32> for Lit {
    fn from(val: i32) -> Self {
        Self::new(val)
    }
}

impl<L> From<&L> for Lit
where
    L: Into<Lit> + Copy,
{
    fn from(val: &L) -> Self {
        (*val).into()
    }
}

// Into<i32>
impl From<Lit> for i32 {
    fn from(lit: Lit) -> Self {
        lit.get()
    }
}

// -Lit
impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from(-self.0)
    }
}
