//! Point lights and surface finish.

use serde::{Deserialize, Serialize};
use solidray_math::Point3;

/// Reflectance coefficients shared by every surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finish {
    /// Light received regardless of orientation.
    pub ambient: f64,
    /// Lambertian weight.
    pub diffuse: f64,
    /// Highlight weight.
    pub specular: f64,
    /// Highlight exponent.
    pub shininess: f64,
}

impl Default for Finish {
    fn default() -> Self {
        Self {
            ambient: 0.2,
            diffuse: 0.7,
            specular: 0.3,
            shininess: 32.0,
        }
    }
}

/// Light sources of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    /// Positions of point lights.
    pub sources: Vec<Point3>,
    /// Surface response.
    pub finish: Finish,
}

impl Default for Light {
    fn default() -> Self {
        Self::single(Point3::new(100.0, 60.0, 80.0))
    }
}

impl Light {
    /// Point lights at the given positions.
    pub fn new(sources: Vec<Point3>) -> Self {
        Self {
            sources,
            finish: Finish::default(),
        }
    }

    /// One point light.
    pub fn single(at: Point3) -> Self {
        Self::new(vec![at])
    }
}
