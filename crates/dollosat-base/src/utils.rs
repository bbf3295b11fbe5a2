//! Utility functions and helpers.

/// Number of unordered pairs `{a, b}` with `a != b` drawn from `n` items.
#[must_use]
pub const fn pair_count(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}

/// Dense index of the unordered pair `{a, b}` among `n` items.
///
/// Pairs are ordered lexicographically: `(0,1), (0,2), ..., (0,n-1), (1,2), ...`.
/// The arguments may be given in either order but must differ.
#[must_use]
pub fn pair_index(a: usize, b: usize, n: usize) -> usize {
    debug_assert!(a != b, "pair_index called with identical items");
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    debug_assert!(hi < n, "pair item {hi} out of range for {n} items");
    lo * (2 * n - lo - 1) / 2 + (hi - lo - 1)
}

/// Iterates over all unordered pairs `(a, b)` with `a < b < n`, in
/// [`pair_index`] order.
pub fn pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |a| (a + 1..n).map(move |b| (a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_count() {
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(1), 0);
        assert_eq!(pair_count(2), 1);
        assert_eq!(pair_count(5), 10);
    }

    #[test]
    fn test_pair_index_is_dense() {
        for n in 0..7 {
            let indices: Vec<usize> = pairs(n).map(|(a, b)| pair_index(a, b, n)).collect();
            let expected: Vec<usize> = (0..pair_count(n)).collect();
            assert_eq!(indices, expected);
        }
    }

    #[test]
    fn test_pair_index_symmetric() {
        assert_eq!(pair_index(1, 3, 4), pair_index(3, 1, 4));
    }
}
