//! Office tiers of the cursus honorum.

use serde::{Deserialize, Serialize};

/// An office tier, ordered from the most junior to the most senior.
///
/// The derived ordering follows seniority, so a `BTreeMap<Tier, _>` iterates
/// Quaestor first and Consul last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Entry-level financial office.
    Quaestor,
    /// Magistrate responsible for public works and games.
    Aedile,
    /// Judicial magistrate.
    Praetor,
    /// Highest elected office.
    Consul,
}

impl Tier {
    /// Every tier in seniority order.
    pub const ALL: [Self; 4] = [Self::Quaestor, Self::Aedile, Self::Praetor, Self::Consul];

    /// Human-readable office name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Quaestor => "Quaestor",
            Self::Aedile => "Aedile",
            Self::Praetor => "Praetor",
            Self::Consul => "Consul",
        }
    }

    /// The next more senior tier, or `None` for Consul.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Quaestor => Some(Self::Aedile),
            Self::Aedile => Some(Self::Praetor),
            Self::Praetor => Some(Self::Consul),
            Self::Consul => None,
        }
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_seniority_order() {
        let mut sorted = Tier::ALL;
        sorted.sort();
        assert_eq!(sorted, Tier::ALL);
    }

    #[test]
    fn next_walks_the_ladder() {
        assert_eq!(Tier::Quaestor.next(), Some(Tier::Aedile));
        assert_eq!(Tier::Aedile.next(), Some(Tier::Praetor));
        assert_eq!(Tier::Praetor.next(), Some(Tier::Consul));
        assert_eq!(Tier::Consul.next(), None);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Tier::Quaestor).ok();
        assert_eq!(json.as_deref(), Some("\"quaestor\""));
    }
}
