//! Multiplicity filter between the automaton and the sink

/// Accepts a verified combination when its multiplicity lies in the
/// configured inclusive bounds. Combinations outside the bounds are
/// defined out of scope by configuration, so they drop silently with
/// no overflow accounting.
#[derive(Clone, Copy, Debug)]
pub struct MultiplicityFilter {
    min: u8,
    max: u8,
}

impl MultiplicityFilter {
    pub fn new(min: u8, max: u8) -> MultiplicityFilter {
        MultiplicityFilter { min, max }
    }

    pub fn accepts(&self, mask: u16) -> bool {
        let n = mask.count_ones() as u8;
        return self.min <= n && n <= self.max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_bounds() {
        let f = MultiplicityFilter::new(2, 3);
        assert!(!f.accepts(0b0001));
        assert!(f.accepts(0b0011));
        assert!(f.accepts(0b0111));
        assert!(!f.accepts(0b1111));
        assert!(!f.accepts(0));
    }

    #[test]
    fn zero_min_accepts_empty_mask() {
        let f = MultiplicityFilter::new(0, 1);
        assert!(f.accepts(0));
        assert!(f.accepts(0b1000_0000_0000_0000));
        assert!(!f.accepts(0b11));
    }
}
