mod forces;
mod live;
mod quadtree;

use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::config::LayoutConfig;
use crate::model::{Graph, NodeRecord, PositionTable};
use crate::util::stable_pair;

use forces::{
    CenterParams, CollisionParams, RepulsionParams, Spring, accumulate_centering,
    accumulate_collisions, accumulate_repulsion, accumulate_springs,
};
pub use live::{LiveLayout, LoopState};
use quadtree::Cell;

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Held in place by a drag; still repels others.
    pub pinned: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    pub tick: usize,
    pub max_speed: f32,
    pub kinetic_energy: f32,
    pub settled: bool,
}

/// How a batch run ended. Hitting the tick budget unsettled is a normal outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutOutcome {
    pub ticks: usize,
    pub settled: bool,
}

#[derive(Default)]
struct Scratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

/// Iterative force-directed placement over a snapshot of the graph topology.
///
/// Every completed `step` leaves positions and velocities consistent; nothing is observable
/// mid-step.
pub struct ForceLayout {
    config: LayoutConfig,
    bodies: Vec<Body>,
    index_by_id: HashMap<String, usize>,
    springs: Vec<Spring>,
    scratch: Scratch,
    tick: usize,
    settled: bool,
    revision: u64,
}

impl ForceLayout {
    pub fn new(graph: &Graph, config: LayoutConfig) -> Self {
        let mut layout = Self {
            config: config.sanitized(),
            bodies: Vec::new(),
            index_by_id: HashMap::new(),
            springs: Vec::new(),
            scratch: Scratch::default(),
            tick: 0,
            settled: graph.is_empty(),
            revision: 0,
        };
        layout.sync_topology(graph);
        layout
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn tick_count(&self) -> usize {
        self.tick
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Bumped whenever any position may have changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Marks the simulation as moving again, e.g. after a drag.
    pub fn wake(&mut self) {
        self.settled = self.bodies.is_empty();
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.index_by_id
            .get(id)
            .map(|&index| self.bodies[index].position)
    }

    pub fn positions(&self) -> PositionTable {
        let mut table = PositionTable::new(self.revision);
        for body in &self.bodies {
            table.insert(body.id.clone(), body.position);
        }
        table
    }

    /// Follows the graph's node and edge set. Surviving nodes keep position and velocity;
    /// new nodes are placed next to an already placed neighbor when there is one.
    pub fn sync_topology(&mut self, graph: &Graph) {
        let mut previous = std::mem::take(&mut self.bodies)
            .into_iter()
            .map(|body| (body.id.clone(), body))
            .collect::<HashMap<_, _>>();
        let node_count = graph.node_count();

        let mut fresh = Vec::new();
        for (index, node) in graph.nodes().iter().enumerate() {
            let radius = node.radius.unwrap_or(self.config.collision_radius).max(0.0);
            match previous.remove(&node.id) {
                Some(mut body) => {
                    body.radius = radius;
                    self.bodies.push(body);
                }
                None => {
                    let position = self.initial_position(node, index, node_count);
                    fresh.push(self.bodies.len());
                    self.bodies.push(Body {
                        id: node.id.clone(),
                        position,
                        velocity: Vec2::ZERO,
                        radius,
                        pinned: false,
                    });
                }
            }
        }

        self.index_by_id = self
            .bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (body.id.clone(), index))
            .collect();

        self.springs = graph
            .edges()
            .iter()
            .filter_map(|edge| {
                let from = *self.index_by_id.get(&edge.source)?;
                let to = *self.index_by_id.get(&edge.target)?;
                Some(Spring {
                    from,
                    to,
                    rest_length: edge
                        .rest_length
                        .unwrap_or(self.config.link_distance)
                        .max(0.0),
                    stiffness: edge
                        .stiffness
                        .unwrap_or(self.config.link_stiffness)
                        .clamp(0.0, 1.0),
                })
            })
            .collect();

        for &index in &fresh {
            let has_explicit_position = graph
                .node(&self.bodies[index].id)
                .is_some_and(|node| node.position.is_some());
            if !has_explicit_position {
                self.place_near_neighbor(index, &fresh);
            }
        }

        if !fresh.is_empty() || !previous.is_empty() {
            self.wake();
            self.revision += 1;
        }
        log::debug!(
            "layout topology synced: {} bodies, {} springs, {} added, {} dropped",
            self.bodies.len(),
            self.springs.len(),
            fresh.len(),
            previous.len()
        );
    }

    fn initial_position(&self, node: &NodeRecord, index: usize, node_count: usize) -> Vec2 {
        if let Some(position) = node.position {
            return position;
        }

        let spacing = self.config.initial_spacing;
        let ring = (node_count.max(1) as f32).sqrt() * spacing;
        let angle = (index as f32 / node_count.max(1) as f32) * TAU;
        let (jx, jy) = stable_pair(self.config.seed, &node.id);
        self.config.center() + vec2(angle.cos(), angle.sin()) * ring + vec2(jx, jy) * (spacing * 0.35)
    }

    fn place_near_neighbor(&mut self, index: usize, fresh: &[usize]) {
        let anchor = self.springs.iter().find_map(|spring| {
            let other = if spring.from == index {
                spring.to
            } else if spring.to == index {
                spring.from
            } else {
                return None;
            };
            (!fresh.contains(&other)).then(|| self.bodies[other].position)
        });

        if let Some(anchor) = anchor {
            let body = &mut self.bodies[index];
            let (jx, jy) = stable_pair(self.config.seed, &body.id);
            let mut direction = vec2(jx, jy);
            if direction.length_sq() <= 1e-4 {
                direction = vec2(1.0, 0.0);
            }
            body.position = anchor + direction.normalized() * self.config.link_distance;
        }
    }

    /// Holds a node at `position` until `release`. Returns `false` for unknown ids.
    pub fn pin(&mut self, id: &str, position: Vec2) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        let body = &mut self.bodies[index];
        body.position = position;
        body.velocity = Vec2::ZERO;
        body.pinned = true;
        self.revision += 1;
        self.wake();
        true
    }

    pub fn release(&mut self, id: &str) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        self.bodies[index].pinned = false;
        self.wake();
        true
    }

    /// One integration tick: accumulate every force, then `v = (v + f) * damping; p += v`.
    pub fn step(&mut self) -> StepReport {
        let Self {
            config,
            bodies,
            springs,
            scratch,
            ..
        } = self;
        let node_count = bodies.len();

        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.positions.clear();
        scratch.positions.extend(bodies.iter().map(|body| body.position));
        scratch.radii.clear();
        scratch.radii.extend(bodies.iter().map(|body| body.radius));
        let max_radius = scratch.radii.iter().copied().fold(0.0_f32, f32::max);

        if let Some(tree) = Cell::build(&scratch.positions) {
            if config.repulsion_strength > 0.0 {
                let params = RepulsionParams {
                    strength: config.repulsion_strength,
                    softening: config.repulsion_softening,
                    theta: config.barnes_hut_theta,
                };
                for (index, force) in scratch.forces.iter_mut().enumerate() {
                    accumulate_repulsion(&tree, index, &scratch.positions, params, force);
                }
            }

            if config.collision_strength > 0.0 && max_radius > 0.0 {
                let reach = max_radius * 2.0;
                accumulate_collisions(
                    &tree,
                    &tree,
                    true,
                    &scratch.positions,
                    &scratch.radii,
                    CollisionParams {
                        strength: config.collision_strength,
                        reach_sq: reach * reach,
                    },
                    &mut scratch.forces,
                );
            }
        }

        accumulate_springs(bodies, springs, config.link_damping, &mut scratch.forces);
        accumulate_centering(
            &scratch.positions,
            CenterParams {
                target: config.center(),
                strength: config.center_strength,
                falloff: config.center_falloff,
            },
            &mut scratch.forces,
        );

        let mut max_speed = 0.0_f32;
        let mut kinetic_energy = 0.0_f32;
        for (body, force) in bodies.iter_mut().zip(&scratch.forces) {
            if body.pinned {
                body.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = (body.velocity + *force) * config.damping;
            if !velocity.x.is_finite() || !velocity.y.is_finite() {
                velocity = Vec2::ZERO;
            }
            let speed = velocity.length();
            if speed > config.max_speed {
                velocity *= config.max_speed / speed;
            }

            body.velocity = velocity;
            body.position += velocity;
            max_speed = max_speed.max(velocity.length());
            kinetic_energy += 0.5 * velocity.length_sq();
        }

        self.tick += 1;
        self.revision += 1;
        self.settled = max_speed < self.config.settle_speed;
        StepReport {
            tick: self.tick,
            max_speed,
            kinetic_energy,
            settled: self.settled,
        }
    }

    /// Batch mode: steps until settled or `max_ticks` steps were taken.
    pub fn run(&mut self) -> LayoutOutcome {
        let mut ticks = 0;
        while ticks < self.config.max_ticks && !(ticks > 0 && self.settled) {
            if self.bodies.is_empty() {
                self.settled = true;
                break;
            }
            self.step();
            ticks += 1;
        }

        log::debug!(
            "batch layout finished after {ticks} ticks (settled: {})",
            self.settled
        );
        LayoutOutcome {
            ticks,
            settled: self.settled,
        }
    }

    /// Copies current positions into the graph as authoritative node positions.
    pub fn write_back(&self, graph: &mut Graph) {
        for body in &self.bodies {
            if let Err(error) = graph.set_position(&body.id, body.position) {
                log::debug!("skipping layout write-back: {error}");
            }
        }
    }
}
