//! Pool configuration parameters.

/// Configuration for a [`BlockPool`](crate::BlockPool).
///
/// Holds the size-class boundary table. A payload of `n` bytes lands in the
/// first class whose boundary is at least `n`; payloads larger than every
/// boundary land in a single overflow bucket. Validated at construction;
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Upper byte boundaries of the sized classes, strictly increasing.
    ///
    /// Default: `[8, 16, 32, 64, 128]`. The overflow bucket (everything
    /// above the last boundary) is implicit and always present.
    classes: Vec<usize>,
}

impl PoolConfig {
    /// Default size-class boundaries in bytes.
    pub const DEFAULT_CLASSES: [usize; 5] = [8, 16, 32, 64, 128];

    /// Create a config with the given class boundaries.
    ///
    /// # Panics
    ///
    /// Panics if `classes` is empty, starts at zero, or is not strictly
    /// increasing. Class tables are fixed at pool construction, so a bad
    /// table is a programming error rather than a runtime condition.
    pub fn new(classes: Vec<usize>) -> Self {
        assert!(!classes.is_empty(), "size-class table must be non-empty");
        assert!(classes[0] > 0, "size classes start above zero bytes");
        assert!(
            classes.windows(2).all(|w| w[0] < w[1]),
            "size-class boundaries must be strictly increasing"
        );
        Self { classes }
    }

    /// Total number of buckets, including the overflow bucket.
    pub fn bucket_count(&self) -> usize {
        self.classes.len() + 1
    }

    /// Map a payload size in bytes to its bucket index.
    ///
    /// Oversized payloads are clamped to the overflow bucket; a block keeps
    /// this bucket for its whole lifetime.
    pub fn bucket_for(&self, bytes: usize) -> usize {
        self.classes
            .iter()
            .position(|&boundary| bytes <= boundary)
            .unwrap_or(self.classes.len())
    }

    /// The boundary table.
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CLASSES.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_six_buckets() {
        let config = PoolConfig::default();
        assert_eq!(config.bucket_count(), 6);
    }

    #[test]
    fn bucket_for_boundary_values() {
        let config = PoolConfig::default();
        assert_eq!(config.bucket_for(1), 0);
        assert_eq!(config.bucket_for(8), 0);
        assert_eq!(config.bucket_for(9), 1);
        assert_eq!(config.bucket_for(128), 4);
        assert_eq!(config.bucket_for(129), 5);
        assert_eq!(config.bucket_for(usize::MAX), 5);
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn non_increasing_table_rejected() {
        let _ = PoolConfig::new(vec![8, 8, 32]);
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn empty_table_rejected() {
        let _ = PoolConfig::new(Vec::new());
    }
}
