use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;

/// Axis-aligned square region of the simulation plane.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points.iter().filter(|point| is_finite(**point)) {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !is_finite(min) || !is_finite(max) {
            return None;
        }

        let span = (max - min).max(vec2(1.0, 1.0));
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span.max_elem() * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    pub(super) fn side(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared gap between two squares; zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let gap = ((self.center - other.center).abs() - vec2(reach, reach)).max(Vec2::ZERO);
        gap.length_sq()
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign_x = if quadrant & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if quadrant & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x * quarter, sign_y * quarter),
            half_extent: quarter,
        }
    }
}

/// Barnes–Hut cell. Leaves own body indices; inner cells only aggregate mass.
pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) bodies: Vec<usize>,
    pub(super) children: [Option<Box<Cell>>; 4],
}

impl Cell {
    /// `None` when no position is finite.
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        let bodies = (0..positions.len())
            .filter(|&index| is_finite(positions[index]))
            .collect::<Vec<_>>();
        Some(Self::subdivide(square, bodies, positions, 0))
    }

    fn subdivide(square: Square, bodies: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = bodies.len() as f32;
        let center_of_mass = if bodies.is_empty() {
            square.center
        } else {
            bodies.iter().fold(Vec2::ZERO, |sum, &index| sum + positions[index]) / mass
        };

        let mut cell = Self {
            square,
            center_of_mass,
            mass,
            bodies,
            children: std::array::from_fn(|_| None),
        };
        if depth >= MAX_DEPTH || cell.bodies.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.bodies {
            buckets[square.quadrant_of(positions[index])].push(index);
        }
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() < 2 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                cell.children[quadrant] = Some(Box::new(Self::subdivide(
                    square.quadrant(quadrant),
                    bucket,
                    positions,
                    depth + 1,
                )));
            }
        }
        cell.bodies.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &Cell> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

fn is_finite(point: Vec2) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_bodies(cell: &Cell, out: &mut Vec<usize>) {
        out.extend_from_slice(&cell.bodies);
        for child in cell.children() {
            leaf_bodies(child, out);
        }
    }

    #[test]
    fn every_finite_body_lands_in_exactly_one_leaf() {
        let mut positions = (0..60)
            .map(|index| {
                let angle = index as f32 * 0.37;
                vec2(angle.cos(), angle.sin()) * (10.0 + index as f32 * 7.0)
            })
            .collect::<Vec<_>>();
        positions.push(vec2(f32::NAN, 1.0));

        let root = Cell::build(&positions).unwrap();
        assert!(!root.is_leaf());
        assert_eq!(root.mass, 60.0);

        let mut seen = Vec::new();
        leaf_bodies(&root, &mut seen);
        seen.sort_unstable();
        assert_eq!(seen, (0..60).collect::<Vec<_>>());
    }

    #[test]
    fn gap_between_touching_squares_is_zero() {
        let a = Square {
            center: vec2(0.0, 0.0),
            half_extent: 1.0,
        };
        let b = Square {
            center: vec2(2.0, 0.0),
            half_extent: 1.0,
        };
        let c = Square {
            center: vec2(5.0, 4.0),
            half_extent: 1.0,
        };
        assert_eq!(a.gap_sq(b), 0.0);
        assert_eq!(a.gap_sq(c), 3.0 * 3.0 + 2.0 * 2.0);
        assert!(a.contains(vec2(1.0, -1.0)));
    }
}
