//! Alpha threshold shared by the codec, border detection and compositing.

/// Cut-off below which a pixel counts as transparent.
///
/// The value is clamped to `-1..=256`: `-1` disables the check (no alpha value
/// is below it) and `256` makes every pixel transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlphaThreshold(i32);

impl AlphaThreshold {
    pub const MIN: i32 = -1;
    pub const MAX: i32 = 256;

    /// Sentinel that never classifies a pixel as transparent.
    pub const DISABLED: AlphaThreshold = AlphaThreshold(Self::MIN);

    pub fn new(value: i32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// Whether `alpha` falls below the threshold.
    #[inline]
    pub fn is_below(self, alpha: u8) -> bool {
        i32::from(alpha) < self.0
    }
}

impl Default for AlphaThreshold {
    fn default() -> Self {
        Self(128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_to_range() {
        assert_eq!(AlphaThreshold::new(-50).value(), -1);
        assert_eq!(AlphaThreshold::new(1000).value(), 256);
        assert_eq!(AlphaThreshold::new(77).value(), 77);
    }

    #[test]
    fn test_is_below() {
        let threshold = AlphaThreshold::default();
        assert!(threshold.is_below(127));
        assert!(!threshold.is_below(128));
        assert!(!AlphaThreshold::DISABLED.is_below(0));
        assert!(AlphaThreshold::new(256).is_below(255));
    }
}
