//! labels for points picked in an interactive viewer
//!
//! A [`PickRegistry`] belongs to one viewer session. The viewer hands it to its
//! pick callback, and drains it with [`PickRegistry::clear`] when the session
//! ends so every remaining label can be removed.

use crate::mesh::Point;

use std::collections::HashMap;

/// exact coordinates of a picked point. `-0.0` and `0.0` share a key.
type PointKey = [u64; 3];

fn point_key(point: Point) -> PointKey {
    point.map(|coordinate| {
        if coordinate == 0.0 {
            0.0f64.to_bits()
        } else {
            coordinate.to_bits()
        }
    })
}

/// text shown next to a picked point
pub fn label_text(point: Point) -> String {
    format!("{:.1}, {:.1}, {:.1}", point[0], point[1], point[2])
}

#[derive(Debug, PartialEq)]
/// What a pick did to the registry
pub enum Toggle<L> {
    /// a label was created for a new point
    Added,
    /// the point was already labeled. The caller removes this label from the viewer.
    Removed(L),
}

#[derive(Debug)]
/// Labels of the currently picked points, keyed by their exact coordinates.
///
/// `L` is whatever handle the viewer returns for a label actor.
pub struct PickRegistry<L> {
    labels: HashMap<PointKey, L>,
}

impl<L> Default for PickRegistry<L> {
    fn default() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }
}

impl<L> PickRegistry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label `point` if it has no label yet, otherwise hand its label back.
    ///
    /// `make_label` receives the label text and returns the viewer's handle. It
    /// is only called when a label is added.
    pub fn toggle<F>(&mut self, point: Point, make_label: F) -> Toggle<L>
    where
        F: FnOnce(&str) -> L,
    {
        let key = point_key(point);

        match self.labels.remove(&key) {
            Some(label) => {
                tracing::debug!(?point, "removed point label");
                Toggle::Removed(label)
            }
            None => {
                let label = make_label(&label_text(point));
                self.labels.insert(key, label);
                tracing::debug!(?point, "added point label");
                Toggle::Added
            }
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.labels.contains_key(&point_key(point))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// remove every label, returning the handles for the viewer to discard
    pub fn clear(&mut self) -> Vec<L> {
        self.labels.drain().map(|(_, label)| label).collect()
    }
}
