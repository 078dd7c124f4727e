//! Colours and timings: the two axes a wire filters on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three independent pulse channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    Red,
    Green,
    Blue,
}

impl Colour {
    pub const ALL: [Colour; 3] = [Colour::Red, Colour::Green, Colour::Blue];
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Colour::Red => "red",
            Colour::Green => "green",
            Colour::Blue => "blue",
        })
    }
}

/// Colour filter on a wire. `Any` lets every channel through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireColour {
    #[default]
    Any,
    Red,
    Green,
    Blue,
}

impl WireColour {
    pub fn admits(self, colour: Colour) -> bool {
        match self {
            WireColour::Any => true,
            WireColour::Red => colour == Colour::Red,
            WireColour::Green => colour == Colour::Green,
            WireColour::Blue => colour == Colour::Blue,
        }
    }
}

impl From<Colour> for WireColour {
    fn from(colour: Colour) -> Self {
        match colour {
            Colour::Red => WireColour::Red,
            Colour::Green => WireColour::Green,
            Colour::Blue => WireColour::Blue,
        }
    }
}

/// Where in time a wire (or a query) looks, relative to its target.
///
/// Serialized as the plain integers -1, 0 and 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Timing {
    Past,
    #[default]
    Now,
    Future,
}

impl Timing {
    /// Walking a wire backwards, from target to source, inverts its timing.
    pub fn flip(self) -> Self {
        match self {
            Timing::Past => Timing::Future,
            Timing::Now => Timing::Now,
            Timing::Future => Timing::Past,
        }
    }

    /// Signed frame step: -1, 0 or 1.
    pub fn step(self) -> i32 {
        i8::from(self) as i32
    }
}

impl From<Timing> for i8 {
    fn from(timing: Timing) -> Self {
        match timing {
            Timing::Past => -1,
            Timing::Now => 0,
            Timing::Future => 1,
        }
    }
}

impl TryFrom<i8> for Timing {
    type Error = String;

    fn try_from(raw: i8) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(Timing::Past),
            0 => Ok(Timing::Now),
            1 => Ok(Timing::Future),
            other => Err(format!("timing must be -1, 0 or 1, got {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_admits_every_colour() {
        for colour in Colour::ALL {
            assert!(WireColour::Any.admits(colour));
        }
    }

    #[test]
    fn single_colour_admits_only_itself() {
        assert!(WireColour::Blue.admits(Colour::Blue));
        assert!(!WireColour::Blue.admits(Colour::Red));
        assert!(!WireColour::from(Colour::Green).admits(Colour::Blue));
    }

    #[test]
    fn flipping_timing() {
        assert_eq!(Timing::Past.flip(), Timing::Future);
        assert_eq!(Timing::Future.flip(), Timing::Past);
        assert_eq!(Timing::Now.flip(), Timing::Now);
        assert_eq!(Timing::Future.flip().step(), -1);
    }

    #[test]
    fn timing_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Timing::Past).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<Timing>("1").unwrap(), Timing::Future);
        assert!(serde_json::from_str::<Timing>("2").is_err());
    }
}
