use std::{error::Error, fmt::Display, num::NonZeroU32, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifier of a picture displayed on the game screen.
///
/// Ids are assigned by the engine and start at 1. The engine keeps pictures in slot arrays
/// indexed by id, which is what [`PictureId::slot`] maps to.
#[derive(
    Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct PictureId(NonZeroU32);

impl PictureId {
    pub const fn new(id: u32) -> Option<Self> {
        match NonZeroU32::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }

    pub const fn slot(self) -> usize {
        self.0.get() as usize
    }

    pub fn from_slot(slot: usize) -> Option<Self> {
        u32::try_from(slot).ok().and_then(Self::new)
    }
}

impl Display for PictureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PictureId {
    type Err = InvalidPictureId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidPictureId(s.to_owned()))
    }
}

#[derive(Debug)]
pub struct InvalidPictureId(String);

impl Display for InvalidPictureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} is not a valid picture id", self.0)
    }
}

impl Error for InvalidPictureId {}

#[cfg(test)]
mod test {
    use super::PictureId;

    #[test]
    fn zero_is_not_a_picture() {
        assert!(PictureId::new(0).is_none());
        assert!(PictureId::from_slot(0).is_none());
        assert!("0".parse::<PictureId>().is_err());
    }

    #[test]
    fn parses_and_maps_to_slot() {
        let id: PictureId = " 12 ".parse().unwrap();

        assert_eq!(12, id.get());
        assert_eq!(12, id.slot());
        assert_eq!(Some(id), PictureId::from_slot(12));
        assert_eq!("12", id.to_string());
    }

    #[test]
    fn rejects_garbage() {
        let err = "twelve".parse::<PictureId>().unwrap_err();

        assert_eq!("\"twelve\" is not a valid picture id", err.to_string());
    }
}
