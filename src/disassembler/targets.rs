//! Set of code addresses referenced by label operands.

/// Jump and call targets of a program.
///
/// Targets are collected unordered while decoding, then sealed once (sorted and
/// deduplicated) so that lookups during rendering are binary searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpTargets {
    targets: Vec<u32>,
    sealed: bool,
}

impl JumpTargets {
    /// Creates an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target. Unseals the set.
    pub fn push(&mut self, target: u32) {
        self.targets.push(target);
        self.sealed = false;
    }

    /// Sorts and deduplicates the targets.
    pub fn seal(&mut self) {
        if !self.sealed {
            self.targets.sort_unstable();
            self.targets.dedup();
            self.sealed = true;
        }
    }

    /// Returns `true` if `address` is a target.
    ///
    /// Addresses that do not fit into 32 bits are never targets.
    #[must_use]
    pub fn contains(&self, address: usize) -> bool {
        let Ok(address) = u32::try_from(address) else {
            return false;
        };

        if self.sealed {
            self.targets.binary_search(&address).is_ok()
        } else {
            self.targets.contains(&address)
        }
    }

    /// Number of collected targets; duplicates are counted until the set is sealed
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no target was collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates over the targets, in ascending order once sealed
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.targets.iter().copied()
    }
}

impl FromIterator<u32> for JumpTargets {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut targets = JumpTargets {
            targets: iter.into_iter().collect(),
            sealed: false,
        };
        targets.seal();
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_sorts_and_dedups() {
        let mut targets = JumpTargets::new();
        for target in [40, 4, 40, 17, 4] {
            targets.push(target);
        }
        assert_eq!(targets.len(), 5);
        assert!(targets.contains(17));

        targets.seal();
        assert_eq!(targets.iter().collect::<Vec<_>>(), vec![4, 17, 40]);
        assert!(targets.contains(40));
        assert!(!targets.contains(5));
    }

    #[test]
    fn push_after_seal() {
        let mut targets: JumpTargets = [9, 3].into_iter().collect();
        assert_eq!(targets.iter().collect::<Vec<_>>(), vec![3, 9]);

        targets.push(1);
        assert!(targets.contains(1));
        targets.seal();
        assert_eq!(targets.iter().collect::<Vec<_>>(), vec![1, 3, 9]);
    }

    #[test]
    fn wide_addresses() {
        let targets: JumpTargets = [u32::MAX].into_iter().collect();
        assert!(targets.contains(u32::MAX as usize));
        assert!(!targets.contains(u32::MAX as usize + 1));
        assert!(JumpTargets::new().is_empty());
    }
}
