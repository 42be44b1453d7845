//! Clockwise quarter-turn rotations and the pixel transform they apply inside a square cell.
//!
//! A grid applies one [`Rotation`] twice: once to choose which physical panel a virtual
//! region lands on (see [`GridLayout`](crate::grid::layout::GridLayout)), and once inside
//! every panel to orient its pixels (see [`Rotation::transform`]). Both halves use the same
//! clockwise convention, so the virtual canvas turns as a single image.

use embedded_graphics::prelude::Point;

/// A clockwise rotation by a whole number of quarter turns.
///
/// Coordinates use a screen-style convention: `(0, 0)` is the top-left corner, `x`
/// increases to the right, and `y` increases downward.
///
/// ```rust
/// use panel_grid::rotation::Rotation;
/// use embedded_graphics::prelude::Point;
///
/// // Top-left of the image lands in the top-right corner of the panel.
/// assert_eq!(Rotation::Deg90.transform(Point::new(0, 0), 8), Point::new(7, 0));
/// assert_eq!(Rotation::Deg180.transform(Point::new(0, 0), 8), Point::new(7, 7));
///
/// // Out-of-range integers fall back to no rotation.
/// assert_eq!(Rotation::from_quarter_turns(7), Rotation::Deg0);
/// ```
///
/// ```text
/// Deg0:        Deg90:       Deg180:      Deg270:
///   A B          C A          D C          B D
///   C D          D B          B A          A C
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// 90° clockwise.
    Deg90,
    /// 180°.
    Deg180,
    /// 270° clockwise (90° counter-clockwise).
    Deg270,
}

impl Rotation {
    /// All four rotations in quarter-turn order.
    pub const ALL: [Self; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Convert a quarter-turn count. Accepts 0-3; anything else is [`Rotation::Deg0`].
    #[must_use]
    pub const fn from_quarter_turns(quarter_turns: i32) -> Self {
        match quarter_turns {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Number of clockwise quarter turns, 0-3.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Apply `self` then `other`: `(self + other) mod 4`.
    #[must_use]
    pub const fn compose(self, other: Self) -> Self {
        Self::from_quarter_turns(((self.quarter_turns() + other.quarter_turns()) % 4) as i32)
    }

    /// Whether this rotation swaps width and height.
    #[must_use]
    pub const fn is_transposed(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    /// Rotate `point` inside a `side × side` square.
    ///
    /// In (row, col) terms with `N = side`:
    ///
    /// - `Deg0`: (r, c)
    /// - `Deg90`: swap, then mirror the column: (c, N-1-r)
    /// - `Deg180`: (N-1-r, N-1-c)
    /// - `Deg270`: swap, then mirror the row: (N-1-c, r)
    ///
    /// The caller is responsible for `point` lying inside the square; the result then does too.
    #[must_use]
    pub const fn transform(self, point: Point, side: i32) -> Point {
        let last = side - 1;
        match self {
            Self::Deg0 => point,
            Self::Deg90 => Point::new(last - point.y, point.x),
            Self::Deg180 => Point::new(last - point.x, last - point.y),
            Self::Deg270 => Point::new(point.y, last - point.x),
        }
    }

    /// The rotation that undoes `self`.
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self::from_quarter_turns(((4 - self.quarter_turns()) % 4) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIDE: i32 = 8;

    fn all_points() -> impl Iterator<Item = Point> {
        (0..SIDE).flat_map(|y| (0..SIDE).map(move |x| Point::new(x, y)))
    }

    #[test]
    fn every_rotation_is_a_bijection_on_the_panel() {
        for rotation in Rotation::ALL {
            let mut hit = [[false; 8]; 8];
            for point in all_points() {
                let out = rotation.transform(point, SIDE);
                assert!((0..SIDE).contains(&out.x) && (0..SIDE).contains(&out.y));
                let cell = &mut hit[out.y as usize][out.x as usize];
                assert!(!*cell, "{rotation:?} maps two inputs onto {out:?}");
                *cell = true;
            }
            assert!(hit.iter().flatten().all(|&seen| seen));
        }
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        for point in all_points() {
            let mut turned = point;
            for _ in 0..4 {
                turned = Rotation::Deg90.transform(turned, SIDE);
            }
            assert_eq!(turned, point);
        }
    }

    #[test]
    fn repeated_quarter_turns_match_larger_rotations() {
        for point in all_points() {
            let once = Rotation::Deg90.transform(point, SIDE);
            let twice = Rotation::Deg90.transform(once, SIDE);
            let thrice = Rotation::Deg90.transform(twice, SIDE);
            assert_eq!(twice, Rotation::Deg180.transform(point, SIDE));
            assert_eq!(thrice, Rotation::Deg270.transform(point, SIDE));
        }
    }

    #[test]
    fn reference_corners() {
        // (x, y) = (col, row)
        let origin = Point::new(0, 0);
        assert_eq!(Rotation::Deg0.transform(origin, SIDE), Point::new(0, 0));
        assert_eq!(Rotation::Deg90.transform(origin, SIDE), Point::new(7, 0));
        assert_eq!(Rotation::Deg180.transform(origin, SIDE), Point::new(7, 7));
        assert_eq!(Rotation::Deg270.transform(origin, SIDE), Point::new(0, 7));

        // row 1, col 2
        let point = Point::new(2, 1);
        assert_eq!(Rotation::Deg90.transform(point, SIDE), Point::new(6, 2));
        assert_eq!(Rotation::Deg270.transform(point, SIDE), Point::new(1, 5));
    }

    #[test]
    fn out_of_range_quarter_turns_fall_back_to_zero() {
        assert_eq!(Rotation::from_quarter_turns(-1), Rotation::Deg0);
        assert_eq!(Rotation::from_quarter_turns(4), Rotation::Deg0);
        assert_eq!(Rotation::from_quarter_turns(3), Rotation::Deg270);
    }

    #[test]
    fn compose_and_inverse() {
        assert_eq!(Rotation::Deg270.compose(Rotation::Deg180), Rotation::Deg90);
        for rotation in Rotation::ALL {
            assert_eq!(rotation.compose(rotation.inverse()), Rotation::Deg0);
        }
    }
}
