//! Scheduler tuning.

use serde::{Deserialize, Serialize};
use solidray_shape::Rgb;
use tracing::warn;

use crate::error::{Result, TraceError};

/// Largest accepted samples-per-axis; a pixel costs `anti²` rays.
pub const MAX_ANTI: usize = 16;

/// Which scheduler renders the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Screen zones with per-zone shape lists.
    #[default]
    Uniform,
    /// Quadtree subdivision of the screen.
    Recursive,
    /// Voxel blocks; currently renders with [`Method::Uniform`].
    Block,
    /// Every shape against every pixel.
    Linear,
}

/// Rendering parameters.
///
/// Every field has a default, so partial TOML or JSON documents load.
/// Out-of-range values are repaired by [`Engine::fix`] before a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engine {
    /// Scheduler.
    pub method: Method,
    /// Number of zone columns.
    pub hzone: usize,
    /// Number of zone rows.
    pub vzone: usize,
    /// Fine subdivisions per zone column, used to clip each shape's pixel
    /// range.
    pub hsub: usize,
    /// Fine subdivisions per zone row.
    pub vsub: usize,
    /// Smallest sorted prefix of a zone's shape list.
    pub sort_min: usize,
    /// Sorted prefix as a fraction of the zone's shape count (0 to 1).
    pub sort_frac: f64,
    /// Safety margin in pixels added to every screen-space half-space
    /// (0 to 1, exclusive).
    pub fudge: f64,
    /// Prune zone insertions with 45° half-spaces through zone corners.
    pub diagonal: bool,
    /// Samples per pixel along each axis, at most [`MAX_ANTI`].
    pub anti: usize,
    /// Jitter samples within their stratum.
    pub jitter: bool,
    /// Seed for sample jitter.
    pub seed: u64,
    /// Worker threads; 0 uses one per core.
    pub threads: usize,
    /// Color of pixels where no shape is seen.
    pub background: Rgb,
    /// Diagnostic cap for scene checks.
    pub max_errors: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            method: Method::Uniform,
            hzone: 16,
            vzone: 16,
            hsub: 4,
            vsub: 4,
            sort_min: 8,
            sort_frac: 0.1,
            fudge: 0.01,
            diagonal: false,
            anti: 1,
            jitter: false,
            seed: 0,
            threads: 0,
            background: Rgb::BLACK,
            max_errors: 100,
        }
    }
}

impl Engine {
    /// Parse from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| TraceError::Config(e.to_string()))
    }

    /// Parse from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| TraceError::Config(e.to_string()))
    }

    /// Replace out-of-range values with defaults.
    ///
    /// Returns one line per correction; each is also logged. Running it a
    /// second time changes nothing.
    pub fn fix(&mut self) -> Vec<String> {
        let d = Self::default();
        let mut fixes = Vec::new();
        let mut note = |field: &str, was: String, now: String| {
            warn!(field, was = %was, now = %now, "engine option out of range");
            fixes.push(format!("{field}: {was} -> {now}"));
        };

        for (field, v, dv) in [
            ("hzone", &mut self.hzone, d.hzone),
            ("vzone", &mut self.vzone, d.vzone),
            ("hsub", &mut self.hsub, d.hsub),
            ("vsub", &mut self.vsub, d.vsub),
            ("sort_min", &mut self.sort_min, d.sort_min),
            ("anti", &mut self.anti, d.anti),
            ("max_errors", &mut self.max_errors, d.max_errors),
        ] {
            if *v == 0 {
                note(field, v.to_string(), dv.to_string());
                *v = dv;
            }
        }
        if self.anti > MAX_ANTI {
            note("anti", self.anti.to_string(), MAX_ANTI.to_string());
            self.anti = MAX_ANTI;
        }
        if !(0.0..=1.0).contains(&self.sort_frac) {
            note("sort_frac", self.sort_frac.to_string(), d.sort_frac.to_string());
            self.sort_frac = d.sort_frac;
        }
        if !(0.0..1.0).contains(&self.fudge) {
            note("fudge", self.fudge.to_string(), d.fudge.to_string());
            self.fudge = d.fudge;
        }
        let bg = self.background;
        if ![bg.r, bg.g, bg.b].iter().all(|c| c.is_finite()) {
            note("background", format!("{bg:?}"), format!("{:?}", d.background));
            self.background = d.background;
        }
        fixes
    }
}
