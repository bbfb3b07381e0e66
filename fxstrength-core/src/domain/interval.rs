//! Timeframe identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::currency::DomainError;

/// Chart timeframe a policy and a ledger column are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    M1,
    M5,
    M15,
    M30,
    H1,
    H2,
    H4,
    D1,
    W1,
    MN,
}

impl Interval {
    pub const ALL: [Interval; 10] = [
        Interval::M1,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H2,
        Interval::H4,
        Interval::D1,
        Interval::W1,
        Interval::MN,
    ];

    /// Column label (`H1`, `D1`, ...).
    pub fn label(self) -> &'static str {
        match self {
            Interval::M1 => "M1",
            Interval::M5 => "M5",
            Interval::M15 => "M15",
            Interval::M30 => "M30",
            Interval::H1 => "H1",
            Interval::H2 => "H2",
            Interval::H4 => "H4",
            Interval::D1 => "D1",
            Interval::W1 => "W1",
            Interval::MN => "MN",
        }
    }

    /// Nominal bar length in minutes (a month counts as 30 days).
    pub fn minutes(self) -> i64 {
        match self {
            Interval::M1 => 1,
            Interval::M5 => 5,
            Interval::M15 => 15,
            Interval::M30 => 30,
            Interval::H1 => 60,
            Interval::H2 => 120,
            Interval::H4 => 240,
            Interval::D1 => 1_440,
            Interval::W1 => 10_080,
            Interval::MN => 43_200,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interval {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Interval::ALL
            .into_iter()
            .find(|iv| iv.label() == wanted)
            .ok_or(DomainError::UnknownInterval(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for iv in Interval::ALL {
            assert_eq!(iv.label().parse::<Interval>().unwrap(), iv);
        }
        assert_eq!("h4".parse::<Interval>().unwrap(), Interval::H4);
        assert!("H3".parse::<Interval>().is_err());
    }

    #[test]
    fn minutes_increase_with_interval() {
        let mins: Vec<i64> = Interval::ALL.iter().map(|iv| iv.minutes()).collect();
        assert!(mins.windows(2).all(|w| w[0] < w[1]));
    }
}
