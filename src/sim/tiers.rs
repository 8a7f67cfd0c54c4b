//! Tier table
//!
//! Static, ordered list of fruit tiers. Pure lookup, no mutable state.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shortest table the spawn picker can work with
pub const MIN_TIERS: usize = 3;

/// One size/value class of fruit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub index: usize,
    pub name: String,
    pub radius: f32,
    pub score: u32,
}

impl Tier {
    pub fn new(index: usize, name: &str, radius: f32, score: u32) -> Self {
        Self {
            index,
            name: name.to_string(),
            radius,
            score,
        }
    }
}

/// Ordered tiers, strictly increasing in radius and score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self::classic()
    }
}

impl TierTable {
    /// Build a table, checking ordering and indexing
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        if tiers.len() < MIN_TIERS {
            return Err(Error::InvalidTierTable {
                reason: format!("need at least {MIN_TIERS} tiers, got {}", tiers.len()),
            });
        }
        for (i, tier) in tiers.iter().enumerate() {
            if tier.index != i {
                return Err(Error::InvalidTierTable {
                    reason: format!("tier at position {i} has index {}", tier.index),
                });
            }
            if !(tier.radius > 0.0 && tier.radius.is_finite()) {
                return Err(Error::InvalidTierTable {
                    reason: format!("tier {i} has radius {}", tier.radius),
                });
            }
        }
        for pair in tiers.windows(2) {
            if pair[1].radius <= pair[0].radius || pair[1].score <= pair[0].score {
                return Err(Error::InvalidTierTable {
                    reason: format!(
                        "tier {} does not grow past tier {}",
                        pair[1].index, pair[0].index
                    ),
                });
            }
        }
        Ok(Self { tiers })
    }

    /// The ten shipped fruits, cherry to watermelon
    pub fn classic() -> Self {
        let fruits: [(&str, f32, u32); 10] = [
            ("Cherry", 20.0, 2),
            ("Plum", 26.0, 4),
            ("Apricot", 32.0, 8),
            ("Apple", 38.0, 16),
            ("Pear", 44.0, 32),
            ("Orange", 52.0, 64),
            ("Peach", 60.0, 128),
            ("Coconut", 72.0, 256),
            ("Melon", 86.0, 512),
            ("Watermelon", 104.0, 1024),
        ];
        let tiers = fruits
            .iter()
            .enumerate()
            .map(|(i, &(name, radius, score))| Tier::new(i, name, radius, score))
            .collect();
        Self { tiers }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Index of the largest tier
    pub fn top(&self) -> usize {
        self.tiers.len() - 1
    }

    /// Look up a tier, clamping out-of-range indices to the top tier
    pub fn get(&self, index: usize) -> &Tier {
        &self.tiers[index.min(self.top())]
    }

    /// Tier produced by merging two fruits of `index`
    pub fn merged(&self, index: usize) -> usize {
        (index + 1).min(self.top())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_table() {
        let table = TierTable::classic();
        assert_eq!(table.len(), 10);
        assert_eq!(table.get(0).radius, 20.0);
        assert_eq!(table.get(0).score, 2);
        assert_eq!(table.get(2).score, 8);
        assert_eq!(table.get(9).name, "Watermelon");
        // Re-validating the shipped table must succeed
        assert!(TierTable::new(table.iter().cloned().collect()).is_ok());
    }

    #[test]
    fn test_lookup_clamps() {
        let table = TierTable::classic();
        assert_eq!(table.get(42).index, 9);
    }

    #[test]
    fn test_merge_clamps_at_top() {
        let table = TierTable::classic();
        assert_eq!(table.merged(0), 1);
        assert_eq!(table.merged(8), 9);
        assert_eq!(table.merged(9), 9);
    }

    #[test]
    fn test_rejects_short_table() {
        let tiers = vec![Tier::new(0, "a", 10.0, 1), Tier::new(1, "b", 12.0, 2)];
        assert!(matches!(
            TierTable::new(tiers),
            Err(Error::InvalidTierTable { .. })
        ));
    }

    #[test]
    fn test_rejects_non_increasing() {
        let tiers = vec![
            Tier::new(0, "a", 10.0, 1),
            Tier::new(1, "b", 10.0, 2),
            Tier::new(2, "c", 14.0, 4),
        ];
        assert!(TierTable::new(tiers).is_err());
    }

    #[test]
    fn test_rejects_misindexed() {
        let tiers = vec![
            Tier::new(0, "a", 10.0, 1),
            Tier::new(2, "b", 12.0, 2),
            Tier::new(1, "c", 14.0, 4),
        ];
        assert!(TierTable::new(tiers).is_err());
    }
}
