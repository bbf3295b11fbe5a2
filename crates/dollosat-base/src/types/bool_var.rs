//! Single boolean variable.

use serde::{Deserialize, Serialize};
use super::VarId;

/// A single boolean variable, numbered as in DIMACS (the first variable is 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoolVar {
    /// Unique identifier.
    id: VarId,
}

impl BoolVar {
    /// Creates a new boolean variable with the given DIMACS index.
    #[must_use]
    pub const fn new(id: VarId) -> Self {
        debug_assert!(id > 0, "DIMACS variables start at 1");
        Self { id }
    }

    /// Returns the variable ID.
    #[must_use]
    pub const fn id(&self) -> VarId {
        self.id
    }

    /// Creates a negated literal.
    #[must_use]
    pub const fn not(&self) -> Literal {
        Literal { var: *self, negated: true }
    }

    /// Creates a positive literal.
    #[must_use]
    pub const fn pos(&self) -> Literal {
        Literal { var: *self, negated: false }
    }
}

/// A literal is a variable with optional negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// The underlying variable.
    pub var: BoolVar,
    /// Whether this literal is negated.
    pub negated: bool,
}

impl Literal {
    /// Negates this literal.
    #[must_use]
    pub const fn negate(&self) -> Self {
        Self {
            var: self.var,
            negated: !self.negated,
        }
    }

    /// Converts to DIMACS format (positive = id, negative = -id).
    #[must_use]
    pub fn to_dimacs(&self) -> i64 {
        let base = self.var.id() as i64;
        if self.negated { -base } else { base }
    }

    /// Evaluates the literal under a value of its variable.
    #[must_use]
    pub const fn eval(&self, value: bool) -> bool {
        value != self.negated
    }
}

impl From<BoolVar> for Literal {
    fn from(var: BoolVar) -> Self {
        var.pos()
    }
}

impl std::ops::Not for BoolVar {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal { var: self, negated: true }
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_dimacs() {
        let v = BoolVar::new(7);
        assert_eq!(v.pos().to_dimacs(), 7);
        assert_eq!((!v).to_dimacs(), -7);
        assert_eq!((!!v.pos()).to_dimacs(), 7);
    }

    #[test]
    fn test_literal_eval() {
        let v = BoolVar::new(1);
        assert!(v.pos().eval(true));
        assert!(!v.pos().eval(false));
        assert!(v.not().eval(false));
    }
}
