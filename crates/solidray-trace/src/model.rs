//! The scene: a list of top-level shapes.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Point3};
use solidray_shape::{Diagnostics, Prepared, Shape};

use crate::error::{Result, TraceError};

/// Top-level shapes rendered together; the image shows their union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model<C> {
    /// Shapes in insertion order.
    pub shapes: Vec<Shape<C>>,
}

impl<C> Default for Model<C> {
    fn default() -> Self {
        Self { shapes: Vec::new() }
    }
}

impl<C> Model<C> {
    /// Empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape.
    pub fn push(&mut self, shape: Shape<C>) {
        self.shapes.push(shape);
    }

    /// Number of top-level shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether there are no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Validate every shape, stopping after `max_errors` errors.
    pub fn check(&self, max_errors: usize) -> Diagnostics {
        let mut diag = Diagnostics::new(max_errors);
        for (k, s) in self.shapes.iter().enumerate() {
            if diag.capped() {
                break;
            }
            s.check_into(&mut diag, &format!("{k}/{}", s.name()));
        }
        diag
    }

    /// Push operator color tags onto untagged descendants.
    pub fn propagate_base(&mut self)
    where
        C: Clone,
    {
        for s in &mut self.shapes {
            s.propagate_base();
        }
    }

    /// Union of the shapes' bounds.
    pub fn aabb(&self) -> Bbox {
        self.shapes
            .iter()
            .fold(Bbox::empty(), |acc, s| acc.union(&s.aabb()))
    }

    /// Prepare every shape for `eye`.
    pub fn process(&self, eye: &Point3) -> Vec<Prepared<'_, C>> {
        self.shapes.iter().map(|s| s.process(eye)).collect()
    }
}

impl<C> FromIterator<Shape<C>> for Model<C> {
    fn from_iter<I: IntoIterator<Item = Shape<C>>>(iter: I) -> Self {
        Self {
            shapes: iter.into_iter().collect(),
        }
    }
}

impl<C: for<'de> Deserialize<'de>> Model<C> {
    /// Load from a JSON array of shapes.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| TraceError::Config(e.to_string()))
    }
}
