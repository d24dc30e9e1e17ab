use std::collections::HashMap;

use eframe::egui::{Rect, Vec2, pos2};

/// Node id -> position in simulation (world) space, stamped with the revision that produced it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionTable {
    revision: u64,
    entries: HashMap<String, Vec2>,
}

impl PositionTable {
    pub fn new(revision: u64) -> Self {
        Self {
            revision,
            entries: HashMap::new(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub fn insert(&mut self, id: impl Into<String>, position: Vec2) {
        self.entries.insert(id.into(), position);
    }

    pub fn with(mut self, id: impl Into<String>, position: Vec2) -> Self {
        self.insert(id, position);
        self
    }

    pub fn get(&self, id: &str) -> Option<Vec2> {
        self.entries.get(id).copied()
    }

    pub fn remove(&mut self, id: &str) -> Option<Vec2> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec2)> {
        self.entries.iter().map(|(id, position)| (id.as_str(), *position))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// World-space bounding box of every finite position.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self
            .entries
            .values()
            .filter(|position| position.x.is_finite() && position.y.is_finite());
        let first = points.next()?;
        let mut bounds = Rect::from_min_max(pos2(first.x, first.y), pos2(first.x, first.y));
        for point in points {
            bounds.extend_with(pos2(point.x, point.y));
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn bounds_skip_non_finite_points() {
        let table = PositionTable::new(1)
            .with("a", vec2(-10.0, 5.0))
            .with("b", vec2(30.0, -20.0))
            .with("c", vec2(f32::NAN, 0.0));
        let bounds = table.bounds().unwrap();
        assert_eq!(bounds.min, pos2(-10.0, -20.0));
        assert_eq!(bounds.max, pos2(30.0, 5.0));
        assert!(PositionTable::default().bounds().is_none());
    }
}
