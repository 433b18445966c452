//! Station identifier types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A numeric station identifier as used by the fare store.
///
/// Zero is never a valid identifier: the store uses it (or a missing field)
/// for rows whose station could not be resolved, so this type rejects it.
///
/// # Examples
///
/// ```
/// use fare_server::domain::StationId;
///
/// let paris = StationId::new(87686006).unwrap();
/// assert_eq!(paris.get(), 87686006);
///
/// assert!(StationId::new(0).is_err());
/// assert!(StationId::parse("abc").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct StationId(u32);

impl StationId {
    /// Create a station id, rejecting zero.
    pub fn new(id: u32) -> Result<Self, InvalidStationId> {
        if id == 0 {
            return Err(InvalidStationId {
                reason: "must be non-zero",
            });
        }
        Ok(StationId(id))
    }

    /// Parse a station id from its decimal representation.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let id = s.trim().parse::<u32>().map_err(|_| InvalidStationId {
            reason: "must be a decimal number",
        })?;
        Self::new(id)
    }

    /// Returns the raw numeric id.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for StationId {
    type Error = InvalidStationId;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<StationId> for u32 {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A station with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
}

impl Station {
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Error returned when parsing an invalid station pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station pair {input:?}: expected \"{{departure}}-{{arrival}}\"")]
pub struct InvalidStationPair {
    input: String,
}

/// An ordered (departure, arrival) pair of stations.
///
/// This is the key for both journeys and route geometries. It is formatted
/// as `"{departure}-{arrival}"`; the reverse direction is a different key.
///
/// # Examples
///
/// ```
/// use fare_server::domain::StationPair;
///
/// let pair: StationPair = "1-2".parse().unwrap();
/// assert_eq!(pair.to_string(), "1-2");
/// assert_eq!(pair.reversed().to_string(), "2-1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationPair {
    pub departure: StationId,
    pub arrival: StationId,
}

impl StationPair {
    pub fn new(departure: StationId, arrival: StationId) -> Self {
        Self { departure, arrival }
    }

    /// The same pair travelled in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            departure: self.arrival,
            arrival: self.departure,
        }
    }

    /// Direction-independent form: the smaller id first.
    pub fn undirected(&self) -> Self {
        if self.departure <= self.arrival {
            *self
        } else {
            self.reversed()
        }
    }
}

impl fmt::Display for StationPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.departure, self.arrival)
    }
}

impl FromStr for StationPair {
    type Err = InvalidStationPair;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidStationPair {
            input: s.to_string(),
        };
        let (dep, arr) = s.split_once('-').ok_or_else(invalid)?;
        let departure = StationId::parse(dep).map_err(|_| invalid())?;
        let arrival = StationId::parse(arr).map_err(|_| invalid())?;
        Ok(Self { departure, arrival })
    }
}

impl Serialize for StationPair {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StationPair {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any non-zero id survives a display/parse round trip
        #[test]
        fn id_roundtrip(n in 1u32..) {
            let parsed = StationId::parse(&StationId::new(n).unwrap().to_string()).unwrap();
            prop_assert_eq!(parsed.get(), n);
        }

        /// Reversing twice is the identity
        #[test]
        fn reverse_involution(a in 1u32.., b in 1u32..) {
            let pair = StationPair::new(StationId::new(a).unwrap(), StationId::new(b).unwrap());
            prop_assert_eq!(pair.reversed().reversed(), pair);
        }
    }
}
