use std::hash::Hasher;

use fnv::FnvHasher;

/// Canonical identity of an unordered pair of titles.
///
/// The titles are stored in lexicographic order, hence `PairKey::new(x, y)` and
/// `PairKey::new(y, x)` are equal and share the same partition hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: String,
    second: String,
    hash: u64,
}

impl PairKey {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        let (x, y) = (x.into(), y.into());
        let (first, second) = if x <= y { (x, y) } else { (y, x) };
        let hash = pair_hash(&first, &second);

        Self {
            first,
            second,
            hash,
        }
    }

    /// The lexicographically smaller title.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger title.
    pub fn second(&self) -> &str {
        &self.second
    }

    /// The stable hash used to partition pairs.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The partition of this pair among `partitions` many partitions.
    pub fn partition(&self, partitions: usize) -> usize {
        (self.hash % partitions.max(1) as u64) as usize
    }

    /// True iff both titles are equal.
    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }

    pub fn contains(&self, title: &str) -> bool {
        self.first == title || self.second == title
    }
}

/// FNV-1a over both titles, separated by a nul byte.
fn pair_hash(first: &str, second: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(first.as_bytes());
    hasher.write_u8(0);
    hasher.write(second.as_bytes());
    hasher.finish()
}

/// A single co-citation of a pair within one document.
#[derive(Clone, Debug, PartialEq)]
pub struct CooccurrenceObservation {
    pub key: PairKey,
    /// Word distance between both links, at least 1.
    pub distance: u32,
}

impl CooccurrenceObservation {
    pub fn new(key: PairKey, distance: u32) -> Self {
        Self {
            key,
            distance: distance.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest(
        x,
        y,
        case("A", "B"),
        case("Zebra", "Apple"),
        case("same", "same"),
        case("", "x"),
        case("Ä", "A")
    )]
    fn test_pair_key_symmetric(x: &str, y: &str) {
        let key = PairKey::new(x, y);
        let twin = PairKey::new(y, x);

        assert_eq!(key, twin);
        assert_eq!(key.hash(), twin.hash());
        assert!(key.first() <= key.second());
    }

    #[test]
    fn test_pair_key_separates_titles() {
        assert_ne!(PairKey::new("ab", "c").hash(), PairKey::new("a", "bc").hash());
    }

    #[test]
    fn test_partition_in_range() {
        let key = PairKey::new("Berlin", "Germany");
        assert!(key.partition(7) < 7);
        assert_eq!(key.partition(0), 0);
    }

    #[test]
    fn test_self_pair() {
        assert!(PairKey::new("A", "A").is_self_pair());
        assert!(!PairKey::new("A", "B").is_self_pair());
    }

    #[test]
    fn test_observation_distance_clamped() {
        assert_eq!(CooccurrenceObservation::new(PairKey::new("A", "B"), 0).distance, 1);
    }
}
