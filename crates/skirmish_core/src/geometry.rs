//! Shapes and overlap tests.
//!
//! Structures occupy a [`Footprint`]: an axis-aligned rectangle for ordinary
//! buildings, a circle for fixed defenses. Placement validation, mine blasts
//! and projectile impacts all go through the tests in this module.
//!
//! Overlap is strict: shapes that only touch along an edge do not overlap,
//! so structures may be placed flush against each other.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Axis-aligned rectangle stored as centre plus half extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Centre point.
    pub center: Vec2Fixed,
    /// Half of the width.
    #[serde(with = "fixed_serde")]
    pub half_width: Fixed,
    /// Half of the height.
    #[serde(with = "fixed_serde")]
    pub half_height: Fixed,
}

impl Rect {
    /// Rectangle of the given full size centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2Fixed, width: Fixed, height: Fixed) -> Self {
        let two = Fixed::from_num(2);
        Self {
            center,
            half_width: width / two,
            half_height: height / two,
        }
    }

    /// Lower-left corner.
    #[must_use]
    pub fn min(&self) -> Vec2Fixed {
        Vec2Fixed::new(
            self.center.x - self.half_width,
            self.center.y - self.half_height,
        )
    }

    /// Upper-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2Fixed {
        Vec2Fixed::new(
            self.center.x + self.half_width,
            self.center.y + self.half_height,
        )
    }

    /// Point containment, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Same centre, every side pushed out by `margin`.
    #[must_use]
    pub fn expanded(&self, margin: Fixed) -> Self {
        Self {
            center: self.center,
            half_width: self.half_width + margin,
            half_height: self.half_height + margin,
        }
    }

    /// Closest point of the rectangle to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec2Fixed) -> Vec2Fixed {
        let (min, max) = (self.min(), self.max());
        Vec2Fixed::new(point.x.clamp(min.x, max.x), point.y.clamp(min.y, max.y))
    }
}

/// Circle with centre and radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Circle {
    /// Centre point.
    pub center: Vec2Fixed,
    /// Radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
}

impl Circle {
    /// Create a circle.
    #[must_use]
    pub const fn new(center: Vec2Fixed, radius: Fixed) -> Self {
        Self { center, radius }
    }
}

/// Rect/rect overlap.
#[must_use]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
}

/// Rect/circle overlap via the closest point on the rectangle.
#[must_use]
pub fn rect_circle_overlap(rect: &Rect, circle: &Circle) -> bool {
    let closest = rect.closest_point(circle.center);
    closest.distance_squared(circle.center) < circle.radius * circle.radius
}

/// Circle/circle overlap.
#[must_use]
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) < reach * reach
}

/// Squared distance from `point` to the segment `a..b`.
#[must_use]
pub fn point_segment_distance_squared(point: Vec2Fixed, a: Vec2Fixed, b: Vec2Fixed) -> Fixed {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == Fixed::ZERO {
        return point.distance_squared(a);
    }

    let t = ((point - a).dot(ab) / len_sq).clamp(Fixed::ZERO, Fixed::ONE);
    let closest = a + ab.scale(t);
    point.distance_squared(closest)
}

/// Whether the segment `a..b` touches the rectangle (slab test).
#[must_use]
pub fn segment_intersects_rect(a: Vec2Fixed, b: Vec2Fixed, rect: &Rect) -> bool {
    if rect.contains(a) || rect.contains(b) {
        return true;
    }

    let (min, max) = (rect.min(), rect.max());
    let d = b - a;
    let mut t_enter = Fixed::ZERO;
    let mut t_exit = Fixed::ONE;

    for (origin, delta, lo, hi) in [(a.x, d.x, min.x, max.x), (a.y, d.y, min.y, max.y)] {
        if delta == Fixed::ZERO {
            if origin < lo || origin > hi {
                return false;
            }
            continue;
        }

        let mut t0 = (lo - origin).saturating_div(delta);
        let mut t1 = (hi - origin).saturating_div(delta);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return false;
        }
    }

    true
}

/// Space occupied by a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Footprint {
    /// Ordinary buildings.
    Rect(Rect),
    /// Fixed defenses.
    Circle(Circle),
}

impl Footprint {
    /// Centre of the footprint.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        match self {
            Self::Rect(r) => r.center,
            Self::Circle(c) => c.center,
        }
    }

    /// Overlap test for any pairing of shapes.
    #[must_use]
    pub fn overlaps(&self, other: &Footprint) -> bool {
        match (self, other) {
            (Self::Rect(a), Self::Rect(b)) => rects_overlap(a, b),
            (Self::Rect(r), Self::Circle(c)) | (Self::Circle(c), Self::Rect(r)) => {
                rect_circle_overlap(r, c)
            }
            (Self::Circle(a), Self::Circle(b)) => circles_overlap(a, b),
        }
    }

    /// Overlap with a circle.
    #[must_use]
    pub fn overlaps_circle(&self, circle: &Circle) -> bool {
        self.overlaps(&Footprint::Circle(*circle))
    }

    /// Whether the swept segment `a..b` comes within `margin` of the footprint.
    ///
    /// Rectangles are inflated by `margin` on every side, which is slightly
    /// generous at the corners.
    #[must_use]
    pub fn segment_within(&self, a: Vec2Fixed, b: Vec2Fixed, margin: Fixed) -> bool {
        match self {
            Self::Rect(r) => segment_intersects_rect(a, b, &r.expanded(margin)),
            Self::Circle(c) => {
                let reach = c.radius + margin;
                point_segment_distance_squared(c.center, a, b) <= reach * reach
            }
        }
    }

    /// Point at distance `gap` outside the left edge of the footprint.
    ///
    /// Constructors stand here while they work.
    #[must_use]
    pub fn approach_point(&self, gap: Fixed) -> Vec2Fixed {
        let center = self.center();
        let extent = match self {
            Self::Rect(r) => r.half_width,
            Self::Circle(c) => c.radius,
        };
        Vec2Fixed::new(center.x - extent - gap, center.y)
    }
}

/// Playable area, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapBounds {
    /// Width in world units.
    #[serde(with = "crate::math::decimal_serde")]
    pub width: Fixed,
    /// Height in world units.
    #[serde(with = "crate::math::decimal_serde")]
    pub height: Fixed,
}

impl MapBounds {
    /// Create bounds of the given size.
    #[must_use]
    pub fn new(width: Fixed, height: Fixed) -> Self {
        Self { width, height }
    }

    /// Point containment, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        point.x >= Fixed::ZERO
            && point.y >= Fixed::ZERO
            && point.x <= self.width
            && point.y <= self.height
    }

    /// Whether the whole footprint lies on the map.
    #[must_use]
    pub fn contains_footprint(&self, footprint: &Footprint) -> bool {
        match footprint {
            Footprint::Rect(r) => self.contains(r.min()) && self.contains(r.max()),
            Footprint::Circle(c) => {
                let offset = Vec2Fixed::new(c.radius, c.radius);
                self.contains(c.center - offset) && self.contains(c.center + offset)
            }
        }
    }

    /// Nearest on-map point.
    #[must_use]
    pub fn clamp(&self, point: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            point.x.clamp(Fixed::ZERO, self.width),
            point.y.clamp(Fixed::ZERO, self.height),
        )
    }
}
