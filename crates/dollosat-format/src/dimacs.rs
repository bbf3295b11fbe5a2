//! DIMACS CNF format.
//!
//! Standard format consumed by QuickSampler and UniGen. UniGen needs the
//! `p cnf` header; QuickSampler is fed clause lines only, so the header is
//! optional in both directions.

use dollosat_base::{Error, Result};
use std::io::{BufRead, BufReader, Read, Write};

/// A DIMACS CNF formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimacsCnf {
    /// Number of variables.
    pub num_vars: usize,
    /// Clauses as vectors of literals.
    pub clauses: Vec<Vec<i64>>,
}

impl DimacsCnf {
    /// Parses DIMACS CNF from a reader.
    ///
    /// Without a header, the variable count is the largest variable mentioned.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut declared_vars = None;
        let mut clauses = Vec::new();
        let mut clause = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('c') {
                continue;
            }

            // Parse header
            if line.starts_with('p') {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 4 || parts[1] != "cnf" {
                    return Err(Error::Serialization(format!("Invalid DIMACS header: {line}")));
                }
                let num_vars: usize = parts[2]
                    .parse()
                    .map_err(|e| Error::Serialization(format!("Invalid variable count: {e}")))?;
                let num_clauses: usize = parts[3]
                    .parse()
                    .map_err(|e| Error::Serialization(format!("Invalid clause count: {e}")))?;
                declared_vars = Some(num_vars);
                clauses.reserve(num_clauses);
                continue;
            }

            // Parse clause; a clause may span several lines until its 0.
            for token in line.split_whitespace() {
                let lit: i64 = token
                    .parse()
                    .map_err(|e| Error::Serialization(format!("Invalid literal '{token}': {e}")))?;
                if lit == 0 {
                    clauses.push(std::mem::take(&mut clause));
                } else {
                    clause.push(lit);
                }
            }
        }
        if !clause.is_empty() {
            clauses.push(clause);
        }

        let max_var = clauses
            .iter()
            .flatten()
            .map(|l| l.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);
        let num_vars = match declared_vars {
            Some(n) if n < max_var => {
                return Err(Error::Serialization(format!(
                    "Literal {max_var} exceeds declared variable count {n}"
                )))
            }
            Some(n) => n,
            None => max_var,
        };

        Ok(Self { num_vars, clauses })
    }

    /// Parses DIMACS CNF from a string.
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Writes the formula, with or without the `p cnf` header.
    pub fn write_to<W: Write>(&self, writer: W, header: bool) -> Result<()> {
        let mut out = DimacsWriter::new(writer);
        if header {
            out.header(self.num_vars, self.clauses.len())?;
        }
        for clause in &self.clauses {
            out.clause(clause)?;
        }
        out.finish()
    }

    /// Converts to a DIMACS string with header.
    pub fn to_dimacs(&self) -> Result<String> {
        let mut out = Vec::new();
        self.write_to(&mut out, true)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Streaming DIMACS writer, used for formulas too large to buffer as text.
pub struct DimacsWriter<W: Write> {
    inner: W,
    clauses: usize,
}

impl<W: Write> DimacsWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner, clauses: 0 }
    }

    /// Writes the `p cnf` header line.
    pub fn header(&mut self, num_vars: usize, num_clauses: usize) -> Result<()> {
        writeln!(self.inner, "p cnf {num_vars} {num_clauses}")?;
        Ok(())
    }

    /// Writes a comment line.
    pub fn comment(&mut self, text: &str) -> Result<()> {
        writeln!(self.inner, "c {text}")?;
        Ok(())
    }

    /// Writes one clause terminated by `0`.
    pub fn clause(&mut self, literals: &[i64]) -> Result<()> {
        for lit in literals {
            write!(self.inner, "{lit} ")?;
        }
        writeln!(self.inner, "0")?;
        self.clauses += 1;
        Ok(())
    }

    /// Number of clauses written so far.
    pub fn clauses_written(&self) -> usize {
        self.clauses
    }

    /// Flushes the underlying writer.
    pub fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
