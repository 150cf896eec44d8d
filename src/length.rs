//! Lengths with units, and their conversion to DIPs.

use crate::error::{Error, Result};
use crate::rect::Margin;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// The unit of a [`Length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    /// No length at all. Always resolves to zero.
    None,
    /// Device-independent pixels.
    Dip,
    /// Multiples of the font size of the view.
    Em,
    /// Multiples of the system font size.
    Sem,
}

impl TryFrom<i32> for LengthUnit {
    type Error = Error;

    /// Converts a raw unit tag as used on the native side.
    fn try_from(tag: i32) -> Result<LengthUnit> {
        match tag {
            0 => Ok(LengthUnit::None),
            1 => Ok(LengthUnit::Dip),
            2 => Ok(LengthUnit::Em),
            3 => Ok(LengthUnit::Sem),
            tag => Err(Error::InvalidUnit(tag.to_string())),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let suffix = match self {
            LengthUnit::None => "none",
            LengthUnit::Dip => "dip",
            LengthUnit::Em => "em",
            LengthUnit::Sem => "sem",
        };
        f.write_str(suffix)
    }
}

/// A length value with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub fn none() -> Length {
        Length {
            value: 0.,
            unit: LengthUnit::None,
        }
    }

    pub fn dip(value: f64) -> Length {
        Length {
            value,
            unit: LengthUnit::Dip,
        }
    }

    pub fn em(value: f64) -> Length {
        Length {
            value,
            unit: LengthUnit::Em,
        }
    }

    pub fn sem(value: f64) -> Length {
        Length {
            value,
            unit: LengthUnit::Sem,
        }
    }
}

impl Default for Length {
    fn default() -> Length {
        Length::none()
    }
}

/// Parses `"12"`, `"12dip"`, `"1.5em"`, `"2sem"` or `"none"`.
impl FromStr for Length {
    type Err = Error;

    fn from_str(s: &str) -> Result<Length> {
        let s = s.trim();
        if s == "none" {
            return Ok(Length::none());
        }

        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or_else(|| s.len());
        let (number, suffix) = s.split_at(split);
        let unit = match suffix {
            "" | "dip" => LengthUnit::Dip,
            "em" => LengthUnit::Em,
            "sem" => LengthUnit::Sem,
            suffix => return Err(Error::InvalidUnit(suffix.to_string())),
        };
        let value = number
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidArgument(format!("invalid length: {:?}", s)))?;

        Ok(Length { value, unit })
    }
}

/// A margin whose sides are [`Length`]s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UiMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl UiMargin {
    /// Creates a new margin (clockwise from the top).
    pub fn new(top: Length, right: Length, bottom: Length, left: Length) -> UiMargin {
        UiMargin {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same length on all four sides.
    pub fn uniform(length: Length) -> UiMargin {
        UiMargin::new(length, length, length, length)
    }

    /// A margin in DIPs with separate vertical and horizontal values.
    pub fn dips(vertical: f64, horizontal: f64) -> UiMargin {
        UiMargin::new(
            Length::dip(vertical),
            Length::dip(horizontal),
            Length::dip(vertical),
            Length::dip(horizontal),
        )
    }
}

/// Resolves a length to DIPs.
///
/// `em_size` and `sem_size` are the reference font sizes in DIPs.
pub fn length_to_dips(length: Length, em_size: f64, sem_size: f64) -> f64 {
    match length.unit {
        LengthUnit::None => 0.,
        LengthUnit::Dip => length.value,
        LengthUnit::Em => length.value * em_size,
        LengthUnit::Sem => length.value * sem_size,
    }
}

/// Resolves all four sides of a margin to DIPs.
pub fn margin_to_dip_margin(margin: &UiMargin, em_size: f64, sem_size: f64) -> Margin {
    let resolve = |length| length_to_dips(length, em_size, sem_size);
    Margin::new(
        resolve(margin.top),
        resolve(margin.right),
        resolve(margin.bottom),
        resolve(margin.left),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_always_zero() {
        for &(em, sem) in &[(0., 0.), (16., 14.), (f64::MAX, 1e9)] {
            let length = Length {
                value: 42.,
                unit: LengthUnit::None,
            };
            assert_eq!(length_to_dips(length, em, sem), 0.);
        }
    }

    #[test]
    fn relative_units_scale_with_font() {
        assert_eq!(length_to_dips(Length::dip(7.), 16., 14.), 7.);
        assert_eq!(length_to_dips(Length::em(2.), 16., 14.), 32.);
        assert_eq!(length_to_dips(Length::sem(0.5), 16., 14.), 7.);
    }

    #[test]
    fn margin_sides_resolve_independently() {
        let margin = UiMargin::new(Length::dip(1.), Length::em(1.), Length::sem(1.), Length::none());
        assert_eq!(
            margin_to_dip_margin(&margin, 10., 20.),
            Margin::new(1., 10., 20., 0.)
        );
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(LengthUnit::try_from(2), Ok(LengthUnit::Em));
        assert_eq!(
            LengthUnit::try_from(7),
            Err(Error::InvalidUnit("7".to_string()))
        );
        assert_eq!(
            "3px".parse::<Length>(),
            Err(Error::InvalidUnit("px".to_string()))
        );
    }

    #[test]
    fn parse_lengths() {
        assert_eq!("12".parse::<Length>(), Ok(Length::dip(12.)));
        assert_eq!(" 1.5em".parse::<Length>(), Ok(Length::em(1.5)));
        assert_eq!("2sem".parse::<Length>(), Ok(Length::sem(2.)));
        assert_eq!("none".parse::<Length>(), Ok(Length::none()));
        assert!(matches!(
            "em".parse::<Length>(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
