//! Routing weight of one outgoing port.

use std::collections::BTreeMap;

use lightpath_shared::MAX_CONDITIONAL_WEIGHTS;

use super::ids::PortId;

/// Weight of an outgoing port, optionally overridden per incoming port.
///
/// The override table is bounded by `MAX_CONDITIONAL_WEIGHTS`; adding a
/// new key to a full table is logged and ignored, while updating an
/// existing key always succeeds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Weight {
    default: u8,
    conditional: BTreeMap<PortId, u8>,
}

impl Weight {
    /// Creates a weight with no overrides.
    #[must_use]
    pub fn new(default: u8) -> Self {
        Self {
            default,
            conditional: BTreeMap::new(),
        }
    }

    /// The weight used when no override matches.
    #[inline]
    #[must_use]
    pub fn default_weight(&self) -> u8 {
        self.default
    }

    /// Sets the weight used when no override matches.
    pub fn set_default_weight(&mut self, weight: u8) {
        self.default = weight;
    }

    /// Overrides the weight for lights arriving through `incoming`.
    ///
    /// # Returns
    ///
    /// False if the table is full and `incoming` is a new key.
    pub fn add(&mut self, incoming: PortId, weight: u8) -> bool {
        if self.conditional.len() >= MAX_CONDITIONAL_WEIGHTS
            && !self.conditional.contains_key(&incoming)
        {
            tracing::warn!(
                "weight override table full ({} entries), ignoring {}",
                MAX_CONDITIONAL_WEIGHTS,
                incoming
            );
            return false;
        }
        self.conditional.insert(incoming, weight);
        true
    }

    /// Weight for a light arriving through `incoming` (or none).
    #[inline]
    #[must_use]
    pub fn get(&self, incoming: Option<PortId>) -> u8 {
        incoming
            .and_then(|port| self.conditional.get(&port).copied())
            .unwrap_or(self.default)
    }

    /// Drops the override for `incoming`, if any.
    pub fn remove(&mut self, incoming: PortId) {
        self.conditional.remove(&incoming);
    }

    /// The override table, ordered by incoming port id.
    #[must_use]
    pub fn conditional_weights(&self) -> &BTreeMap<PortId, u8> {
        &self.conditional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_override() {
        let mut weight = Weight::new(5);
        assert_eq!(weight.get(None), 5);
        assert_eq!(weight.get(Some(PortId(3))), 5);

        assert!(weight.add(PortId(3), 40));
        assert_eq!(weight.get(Some(PortId(3))), 40);
        assert_eq!(weight.get(Some(PortId(4))), 5);

        weight.remove(PortId(3));
        assert_eq!(weight.get(Some(PortId(3))), 5);
    }

    #[test]
    fn test_overflow_is_ignored() {
        let mut weight = Weight::new(1);
        for i in 0..MAX_CONDITIONAL_WEIGHTS as u16 {
            assert!(weight.add(PortId(i), 9));
        }

        assert!(!weight.add(PortId(500), 9));
        assert_eq!(weight.get(Some(PortId(500))), 1);

        // existing keys can still be updated
        assert!(weight.add(PortId(0), 2));
        assert_eq!(weight.get(Some(PortId(0))), 2);
    }
}
