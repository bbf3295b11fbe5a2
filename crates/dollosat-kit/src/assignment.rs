//! Variable assignments read back from samplers or the pre-check.

use dollosat_base::{BoolVar, Error, Literal, Result};
use dollosat_format::{SampleBody, SampleLine};
use std::fmt;

/// A partial valuation over variables `1..=num_vars`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Index `k` holds variable `k + 1`.
    values: Vec<Option<bool>>,
}

impl Assignment {
    /// An assignment with every variable unset.
    pub fn unset(num_vars: usize) -> Self {
        Self {
            values: vec![None; num_vars],
        }
    }

    /// Builds an assignment from signed DIMACS literals.
    ///
    /// Literals beyond `num_vars`, and variables given both polarities, are
    /// rejected.
    pub fn from_literals(num_vars: usize, literals: &[i64]) -> Result<Self> {
        let mut assignment = Self::unset(num_vars);
        for &lit in literals {
            if lit == 0 {
                continue;
            }
            let var = lit.unsigned_abs() as usize;
            if var > num_vars {
                return Err(Error::AllocatorMappingMismatch(format!(
                    "literal {lit} exceeds the {num_vars} allocated variables"
                )));
            }
            let slot = &mut assignment.values[var - 1];
            match *slot {
                Some(value) if value != (lit > 0) => {
                    return Err(Error::AllocatorMappingMismatch(format!(
                        "variable {var} is assigned both polarities"
                    )))
                }
                _ => *slot = Some(lit > 0),
            }
        }
        Ok(assignment)
    }

    /// Builds an assignment from a bit string; bit `k` is variable `k + 1`.
    pub fn from_bits(num_vars: usize, bits: &[bool]) -> Result<Self> {
        if bits.len() > num_vars {
            return Err(Error::AllocatorMappingMismatch(format!(
                "{} bits given for {num_vars} allocated variables",
                bits.len()
            )));
        }
        let mut assignment = Self::unset(num_vars);
        for (slot, &bit) in assignment.values.iter_mut().zip(bits) {
            *slot = Some(bit);
        }
        Ok(assignment)
    }

    /// Builds an assignment from a normalized sampler line.
    pub fn from_sample(num_vars: usize, sample: &SampleLine) -> Result<Self> {
        match &sample.body {
            SampleBody::Literals(lits) => Self::from_literals(num_vars, lits),
            SampleBody::Bits(bits) => Self::from_bits(num_vars, bits),
        }
    }

    /// Wraps a complete model as returned by the pre-check.
    pub fn from_model(model: &[bool]) -> Self {
        Self {
            values: model.iter().map(|&b| Some(b)).collect(),
        }
    }

    /// Number of variables covered.
    pub fn num_vars(&self) -> usize {
        self.values.len()
    }

    /// Number of variables with a value.
    pub fn assigned(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Value of a variable, if assigned.
    pub fn value(&self, var: BoolVar) -> Option<bool> {
        let index = usize::try_from(var.id()).ok()?.checked_sub(1)?;
        self.values.get(index).copied().flatten()
    }

    /// Truth value of a literal, if its variable is assigned.
    pub fn literal(&self, lit: Literal) -> Option<bool> {
        self.value(lit.var).map(|v| lit.eval(v))
    }

    /// Truth value of a DIMACS literal, if its variable is assigned.
    pub fn dimacs(&self, lit: i64) -> Option<bool> {
        let index = (lit.unsigned_abs() as usize).checked_sub(1)?;
        self.values
            .get(index)
            .copied()
            .flatten()
            .map(|v| v == (lit > 0))
    }

    /// Sets a variable.
    ///
    /// # Panics
    ///
    /// Panics if the variable is outside the assignment.
    pub fn set(&mut self, var: BoolVar, value: bool) {
        self.values[var.id() as usize - 1] = Some(value);
    }

    /// Signed literals of all assigned variables, in variable order.
    pub fn to_literals(&self) -> Vec<i64> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(k, v)| {
                let var = (k + 1) as i64;
                v.map(|b| if b { var } else { -var })
            })
            .collect()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lit in self.to_literals() {
            write!(f, "{lit} ")?;
        }
        write!(f, "0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_literals() {
        let a = Assignment::from_literals(3, &[1, -3]).unwrap();
        assert_eq!(a.value(BoolVar::new(1)), Some(true));
        assert_eq!(a.value(BoolVar::new(2)), None);
        assert_eq!(a.value(BoolVar::new(3)), Some(false));
        assert_eq!(a.assigned(), 2);
        assert_eq!(a.dimacs(-3), Some(true));
        assert_eq!(a.to_string(), "1 -3 0");
    }

    #[test]
    fn test_literal_beyond_map_rejected() {
        let err = Assignment::from_literals(2, &[1, 3]).unwrap_err();
        assert!(matches!(err, Error::AllocatorMappingMismatch(_)));
    }

    #[test]
    fn test_contradicting_literals_rejected() {
        assert!(Assignment::from_literals(2, &[1, -1]).is_err());
        assert!(Assignment::from_literals(2, &[1, 1]).is_ok());
    }

    #[test]
    fn test_from_bits() {
        let a = Assignment::from_bits(3, &[true, false]).unwrap();
        assert_eq!(a.to_literals(), vec![1, -2]);
        assert!(Assignment::from_bits(1, &[true, false]).is_err());
    }

    #[test]
    fn test_from_sample() {
        let sample = SampleLine::parse(1, "2: 101").unwrap().unwrap();
        let a = Assignment::from_sample(3, &sample).unwrap();
        assert_eq!(a.to_literals(), vec![1, -2, 3]);
    }

    #[test]
    fn test_value_outside_range_is_none() {
        let a = Assignment::from_model(&[true]);
        assert_eq!(a.value(BoolVar::new(5)), None);
    }
}
