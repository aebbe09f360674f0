//! A single officeholder.
//!
//! Nothing besides age is ever read, so an individual is a plain `Copy`
//! value. Aging produces a new value rather than mutating identity.

use serde::{Deserialize, Serialize};

/// An office-holding individual, identified only by age in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Individual {
    /// Age in whole years.
    age: u32,
}

impl Individual {
    /// Create an individual of the given age.
    pub const fn new(age: u32) -> Self {
        Self { age }
    }

    /// Current age in years.
    pub const fn age(self) -> u32 {
        self.age
    }

    /// The same individual one year older, or `None` on overflow.
    pub const fn aged(self) -> Option<Self> {
        match self.age.checked_add(1) {
            Some(age) => Some(Self { age }),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aged_adds_one_year() {
        assert_eq!(Individual::new(30).aged(), Some(Individual::new(31)));
    }

    #[test]
    fn aged_overflow_is_none() {
        assert_eq!(Individual::new(u32::MAX).aged(), None);
    }
}
