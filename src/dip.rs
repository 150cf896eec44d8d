//! Alignment of DIP geometry to the physical pixel grid.

use crate::error::{Error, Result};
use crate::rect::{Rect, Size};
use cgmath::Point2;

/// How a value is rounded onto a pixel boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundType {
    Nearest,
    Up,
    Down,
}

/// Aligns a single DIP value to the pixel grid. Non-finite values are returned unchanged.
pub fn pixel_align_value(value: f64, scale_factor: f64, round: RoundType) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let pixels = value * scale_factor;
    let pixels = match round {
        RoundType::Nearest => pixels.round(),
        RoundType::Up => pixels.ceil(),
        RoundType::Down => pixels.floor(),
    };
    pixels / scale_factor
}

/// Aligns a rectangle to the pixel grid of a display with the given scale factor (pixels per
/// DIP, e.g. 2 on a “2x” display).
///
/// Position and size are rounded independently.
pub fn pixel_align(
    rect: Rect,
    scale_factor: f64,
    position_round: RoundType,
    size_round: RoundType,
) -> Result<Rect> {
    if !scale_factor.is_finite() || scale_factor <= 0. {
        return Err(Error::InvalidArgument(format!(
            "pixel scale factor must be finite and positive, got {}",
            scale_factor
        )));
    }

    let origin = Point2::new(
        pixel_align_value(rect.origin.x, scale_factor, position_round),
        pixel_align_value(rect.origin.y, scale_factor, position_round),
    );
    let mut size = Size::new(
        pixel_align_value(rect.size.width, scale_factor, size_round),
        pixel_align_value(rect.size.height, scale_factor, size_round),
    );
    size.clamp_non_negative();

    Ok(Rect::from_parts(origin, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn aligns_to_half_points_at_2x() {
        let rect = Rect::new(10.3, 10.2, 20.74, 5.1);
        let aligned = pixel_align(rect, 2., RoundType::Nearest, RoundType::Nearest).unwrap();
        assert_eq!(aligned, Rect::new(10.5, 10., 20.5, 5.));

        let up = pixel_align(rect, 2., RoundType::Down, RoundType::Up).unwrap();
        assert_eq!(up, Rect::new(10., 10., 21., 5.5));
    }

    #[test]
    fn rejects_bad_scale_factors() {
        for &scale in &[0., -1., f64::NAN, f64::INFINITY] {
            assert!(matches!(
                pixel_align(Rect::zero(), scale, RoundType::Nearest, RoundType::Nearest),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn infinite_sizes_stay_infinite() {
        let rect = Rect::new(0.4, 0., f64::INFINITY, 3.);
        let aligned = pixel_align(rect, 3., RoundType::Nearest, RoundType::Nearest).unwrap();
        assert!(aligned.size.width.is_infinite());
    }

    proptest! {
        #[test]
        fn alignment_is_idempotent(
            x in -1e4f64..1e4,
            y in -1e4f64..1e4,
            w in 0f64..1e4,
            h in 0f64..1e4,
            scale in 1u32..5,
        ) {
            let scale = f64::from(scale);
            let once = pixel_align(Rect::new(x, y, w, h), scale, RoundType::Nearest, RoundType::Nearest).unwrap();
            let twice = pixel_align(once, scale, RoundType::Nearest, RoundType::Nearest).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
