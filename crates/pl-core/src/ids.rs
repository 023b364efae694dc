use core::cmp::Ordering;
use core::fmt;

use crate::{CoreError, CoreResult};

/// Stable identity of a part.
///
/// Two references that produce the same `PartId` are the same part for
/// deduplication purposes. Ordering is by character code point, which agrees
/// in sign with [`PartId::distance`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PartId(String);

impl PartId {
    /// Create an identity, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> CoreResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Signed comparison distance to `other`.
    ///
    /// Returns the code point difference at the first differing character,
    /// or the difference in length (in characters) when one id is a prefix
    /// of the other. Zero iff the ids are equal.
    pub fn distance(&self, other: &PartId) -> i32 {
        let mut lhs = self.0.chars();
        let mut rhs = other.0.chars();
        loop {
            match (lhs.next(), rhs.next()) {
                (Some(a), Some(b)) if a != b => return a as i32 - b as i32,
                (Some(_), Some(_)) => continue,
                (Some(_), None) => return 1 + lhs.count() as i32,
                (None, Some(_)) => return -(1 + rhs.count() as i32),
                (None, None) => return 0,
            }
        }
    }

    /// Ordering derived from [`PartId::distance`].
    pub fn compare(&self, other: &PartId) -> Ordering {
        self.distance(other).cmp(&0)
    }
}

impl fmt::Debug for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartId({})", self.0)
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PartId {
        PartId::new(s).unwrap()
    }

    #[test]
    fn distance_of_first_differing_char() {
        assert_eq!(id("nekC").distance(&id("nuwV")), -16);
        assert_eq!(id("nuwV").distance(&id("nekC")), 16);
        assert_eq!(id("nekC").distance(&id("nekC")), 0);
    }

    #[test]
    fn distance_of_prefix_is_length_difference() {
        assert_eq!(id("abc").distance(&id("abcde")), -2);
        assert_eq!(id("abcde").distance(&id("abc")), 2);
    }

    #[test]
    fn empty_id_rejected() {
        assert_eq!(PartId::new(""), Err(CoreError::EmptyId));
    }

    #[test]
    fn ord_matches_distance_sign() {
        let ids = ["a", "ab", "b", "B", "zz", "z", "é", "nekC", "nuwV"];
        for a in ids {
            for b in ids {
                assert_eq!(id(a).cmp(&id(b)), id(a).compare(&id(b)), "{a} vs {b}");
            }
        }
    }
}
