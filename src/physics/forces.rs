use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::Body;
use super::quadtree::Cell;

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) strength: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) reach_sq: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CenterParams {
    pub(super) target: Vec2,
    pub(super) strength: f32,
    pub(super) falloff: f32,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Spring {
    pub(super) from: usize,
    pub(super) to: usize,
    pub(super) rest_length: f32,
    pub(super) stiffness: f32,
}

/// Stable direction for two coincident bodies, so they still separate.
fn tiebreak_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin())
}

fn charge(delta: Vec2, mass: f32, params: RepulsionParams) -> Vec2 {
    delta * (params.strength * mass / (delta.length_sq() + params.softening))
}

pub(super) fn accumulate_repulsion(
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    params: RepulsionParams,
    force: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];
    if cell.is_leaf() {
        for &other in cell.bodies.iter().filter(|&&other| other != index) {
            let mut delta = point - positions[other];
            if delta.length_sq() < 1e-6 {
                delta = tiebreak_direction(index, other) * 1e-3;
            }
            *force += charge(delta, 1.0, params);
        }
        return;
    }

    let delta = point - cell.center_of_mass;
    let distance = delta.length().max(1e-2);
    let far_enough = !cell.square.contains(point) && cell.square.side() / distance < params.theta;
    if far_enough && cell.mass > 1.0 {
        *force += charge(delta, cell.mass, params);
        return;
    }

    for child in cell.children() {
        accumulate_repulsion(child, index, positions, params, force);
    }
}

fn push_apart(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    forces: &mut [Vec2],
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    let min_distance = radii[from] + radii[to];
    if distance >= min_distance {
        return;
    }

    let direction = if distance > 1e-4 {
        delta / distance
    } else {
        tiebreak_direction(from, to)
    };
    let push = direction * ((min_distance - distance) * strength);
    forces[from] += push;
    forces[to] -= push;
}

/// Dual-tree walk over every pair of bodies whose cells are within collision reach.
pub(super) fn accumulate_collisions(
    a: &Cell,
    b: &Cell,
    same: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if a.square.gap_sq(b.square) > params.reach_sq {
        return;
    }

    if a.is_leaf() && b.is_leaf() {
        for (offset, &from) in a.bodies.iter().enumerate() {
            let partners = if same { &a.bodies[offset + 1..] } else { &b.bodies[..] };
            for &to in partners {
                push_apart(from, to, positions, radii, params.strength, forces);
            }
        }
        return;
    }

    if same {
        let children = a.children().collect::<Vec<_>>();
        for (offset, first) in children.iter().enumerate() {
            accumulate_collisions(first, first, true, positions, radii, params, forces);
            for second in &children[offset + 1..] {
                accumulate_collisions(first, second, false, positions, radii, params, forces);
            }
        }
        return;
    }

    let split_a = !a.is_leaf() && (b.is_leaf() || a.square.half_extent >= b.square.half_extent);
    if split_a {
        for child in a.children() {
            accumulate_collisions(child, b, false, positions, radii, params, forces);
        }
    } else {
        for child in b.children() {
            accumulate_collisions(a, child, false, positions, radii, params, forces);
        }
    }
}

pub(super) fn accumulate_springs(
    bodies: &[Body],
    springs: &[Spring],
    damping: f32,
    forces: &mut [Vec2],
) {
    for spring in springs {
        if spring.from == spring.to {
            continue;
        }
        let (from, to) = (&bodies[spring.from], &bodies[spring.to]);

        let delta = from.position - to.position;
        let distance = delta.length();
        if distance <= 1e-4 {
            continue;
        }
        let direction = delta / distance;

        let stretch = (distance - spring.rest_length) * spring.stiffness;
        let closing = (from.velocity - to.velocity).dot(direction) * damping;
        let correction = direction * (stretch + closing);

        forces[spring.from] -= correction;
        forces[spring.to] += correction;
    }
}

/// Gravity toward the target; the pull per unit offset weakens with distance.
pub(super) fn accumulate_centering(positions: &[Vec2], params: CenterParams, forces: &mut [Vec2]) {
    if params.strength <= 0.0 {
        return;
    }

    for (position, force) in positions.iter().zip(forces.iter_mut()) {
        let offset = *position - params.target;
        let scale = params.strength / (1.0 + offset.length() / params.falloff);
        *force -= offset * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32, y: f32) -> Body {
        Body {
            id: String::new(),
            position: vec2(x, y),
            velocity: Vec2::ZERO,
            radius: 10.0,
            pinned: false,
        }
    }

    #[test]
    fn repulsion_pushes_bodies_apart_symmetrically() {
        let positions = vec![vec2(-5.0, 0.0), vec2(5.0, 0.0)];
        let tree = Cell::build(&positions).unwrap();
        let params = RepulsionParams {
            strength: 100.0,
            softening: 1.0,
            theta: 0.7,
        };

        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;
        accumulate_repulsion(&tree, 0, &positions, params, &mut left);
        accumulate_repulsion(&tree, 1, &positions, params, &mut right);

        assert!(left.x < 0.0 && right.x > 0.0);
        assert!((left + right).length() < 1e-5);
    }

    #[test]
    fn collisions_only_touch_overlapping_pairs() {
        let positions = vec![vec2(0.0, 0.0), vec2(15.0, 0.0), vec2(100.0, 0.0)];
        let radii = vec![10.0; 3];
        let tree = Cell::build(&positions).unwrap();
        let mut forces = vec![Vec2::ZERO; 3];
        accumulate_collisions(
            &tree,
            &tree,
            true,
            &positions,
            &radii,
            CollisionParams {
                strength: 0.5,
                reach_sq: 40.0 * 40.0,
            },
            &mut forces,
        );

        assert_eq!(forces[0], vec2(-2.5, 0.0));
        assert_eq!(forces[1], vec2(2.5, 0.0));
        assert_eq!(forces[2], Vec2::ZERO);
    }

    #[test]
    fn stretched_spring_pulls_endpoints_together() {
        let bodies = vec![body(0.0, 0.0), body(100.0, 0.0)];
        let springs = [Spring {
            from: 0,
            to: 1,
            rest_length: 60.0,
            stiffness: 0.5,
        }];
        let mut forces = vec![Vec2::ZERO; 2];
        accumulate_springs(&bodies, &springs, 0.0, &mut forces);
        assert_eq!(forces[0], vec2(20.0, 0.0));
        assert_eq!(forces[1], vec2(-20.0, 0.0));
    }

    #[test]
    fn centering_weakens_with_distance() {
        let positions = vec![vec2(10.0, 0.0), vec2(1000.0, 0.0)];
        let mut forces = vec![Vec2::ZERO; 2];
        accumulate_centering(
            &positions,
            CenterParams {
                target: Vec2::ZERO,
                strength: 0.1,
                falloff: 100.0,
            },
            &mut forces,
        );

        assert!(forces[0].x < 0.0 && forces[1].x < 0.0);
        let near_per_unit = -forces[0].x / 10.0;
        let far_per_unit = -forces[1].x / 1000.0;
        assert!(far_per_unit < near_per_unit);
    }
}
