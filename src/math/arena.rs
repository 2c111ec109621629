//! Reusable scratch buffer for repeated lattice pricing.

/// Caller-owned rolling buffer for [`crate::engines::tree::BinomialTreeEngine::price_with_arena`].
///
/// The buffer grows on demand and never shrinks, so sweeping step counts upward
/// allocates once per new maximum. Every pricing call overwrites the slice it uses
/// in full, so nothing carries over from one call to the next.
#[derive(Debug, Clone, Default)]
pub struct LatticeArena {
    values: Vec<f64>,
}

impl LatticeArena {
    /// Creates an arena sized for lattices of up to `max_steps` steps.
    pub fn with_capacity(max_steps: usize) -> Self {
        Self {
            values: Vec::with_capacity(max_steps.saturating_add(1)),
        }
    }

    /// Current backing length.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a mutable slice of length `n`.
    #[inline]
    pub fn values_slice(&mut self, n: usize) -> &mut [f64] {
        if self.values.len() < n {
            self.values.resize(n, 0.0);
        }
        &mut self.values[..n]
    }
}

#[cfg(test)]
mod tests {
    use super::LatticeArena;

    #[test]
    fn arena_grows_but_does_not_shrink() {
        let mut arena = LatticeArena::with_capacity(4);
        assert!(arena.is_empty());

        assert_eq!(arena.values_slice(5).len(), 5);
        let len = arena.len();

        assert_eq!(arena.values_slice(2).len(), 2);
        assert_eq!(arena.len(), len);

        assert_eq!(arena.values_slice(9).len(), 9);
        assert_eq!(arena.len(), 9);
    }
}
