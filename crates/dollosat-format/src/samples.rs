//! Sampler output normalization.
//!
//! Samplers frame their assignments differently:
//!
//! ```text
//! 3: 0110100...           QuickSampler: "<count>: <one bit per variable>"
//! v1 -2 3 ... 0:2         UniGen: leading 'v', terminator, ":<count>" suffix
//! 1 -2 3 ... 0            plain signed literals
//! ```
//!
//! Each line is reduced to a [`SampleLine`] carrying the multiplicity and the
//! raw assignment body. Interpreting the body against a variable map is the
//! decoder's job.

use dollosat_base::{Error, Result};
use std::io::{BufRead, BufReader, Read};

/// The assignment part of a sample line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleBody {
    /// Signed literals, without the `0` terminator.
    Literals(Vec<i64>),
    /// One bit per variable; position `k` is variable `k + 1`.
    Bits(Vec<bool>),
}

/// A normalized sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLine {
    /// 1-based line number in the sampler output.
    pub line: usize,
    /// How many times the sampler produced this assignment.
    pub multiplicity: usize,
    /// The assignment itself.
    pub body: SampleBody,
}

impl SampleLine {
    /// Normalizes one line of sampler output.
    ///
    /// Returns `Ok(None)` for blank and comment lines.
    pub fn parse(line_no: usize, raw: &str) -> Result<Option<Self>> {
        let mut text = raw.trim();
        if text.is_empty() || text.starts_with('c') {
            return Ok(None);
        }
        if let Some(rest) = text.strip_prefix('v') {
            text = rest.trim_start();
        }

        let (multiplicity, body) = split_multiplicity(text)
            .map_err(|e| Error::MalformedInput(format!("sample line {line_no}: {e}")))?;
        let body = parse_body(body)
            .map_err(|e| Error::MalformedInput(format!("sample line {line_no}: {e}")))?;

        Ok(Some(Self {
            line: line_no,
            multiplicity,
            body,
        }))
    }

    /// Reads every sample from sampler output.
    ///
    /// Lines that cannot be normalized are logged and skipped so that one
    /// garbled line does not discard the rest of the batch.
    pub fn read_all<R: Read>(reader: R) -> Result<Vec<Self>> {
        let reader = BufReader::new(reader);
        let mut samples = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            match Self::parse(idx + 1, &line) {
                Ok(Some(sample)) => samples.push(sample),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping sample: {}", e),
            }
        }
        tracing::debug!("Normalized {} samples", samples.len());
        Ok(samples)
    }
}

fn split_multiplicity(text: &str) -> std::result::Result<(usize, &str), String> {
    let Some((left, right)) = text.split_once(':') else {
        return Ok((1, text));
    };
    let (left, right) = (left.trim(), right.trim());
    let is_count = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if is_count(left) && !right.is_empty() {
        // "<count>: <body>"
        let count = left.parse().map_err(|_| format!("invalid count '{left}'"))?;
        Ok((count, right))
    } else if is_count(right) {
        // "<body> 0:<count>"
        let count = right.parse().map_err(|_| format!("invalid count '{right}'"))?;
        Ok((count, left))
    } else {
        Err(format!("cannot interpret framing of '{text}'"))
    }
}

fn parse_body(body: &str) -> std::result::Result<SampleBody, String> {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Err("empty sample".to_string()),
        [single] if single.bytes().all(|b| b == b'0' || b == b'1') => {
            Ok(SampleBody::Bits(single.bytes().map(|b| b == b'1').collect()))
        }
        _ => {
            let mut literals = Vec::with_capacity(tokens.len());
            for token in tokens {
                let lit: i64 = token
                    .parse()
                    .map_err(|_| format!("invalid literal '{token}'"))?;
                if lit == 0 {
                    break;
                }
                literals.push(lit);
            }
            Ok(SampleBody::Literals(literals))
        }
    }
}
