//! Camera placement and per-pixel rays.
//!
//! The eye orbits `target` at distance `d`: `theta` is the azimuth from +x
//! in the xy plane, `phi` the elevation above it, both in degrees, and +z
//! is up. Pixel rays run from the eye to a screen plane through `target`,
//! so `q = 1` lands on that plane.

use serde::{Deserialize, Serialize};
use solidray_math::{Half, Point3, Vec3};
use solidray_shape::Ray;

use crate::error::{Result, TraceError};

/// Where the camera is and what it sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct View {
    /// Point the camera looks at.
    pub target: Point3,
    /// Distance from the eye to `target`.
    pub d: f64,
    /// Azimuth in degrees.
    pub theta: f64,
    /// Elevation in degrees.
    pub phi: f64,
    /// Rotation about the viewing direction in degrees.
    pub roll: f64,
    /// Field of view across the larger image dimension, in degrees.
    pub fov: f64,
}

impl Default for View {
    fn default() -> Self {
        Self {
            target: Point3::origin(),
            d: 10.0,
            theta: 60.0,
            phi: 30.0,
            roll: 0.0,
            fov: 16.0,
        }
    }
}

impl View {
    /// View from `d` away along the given angles.
    pub fn new(target: Point3, d: f64, theta: f64, phi: f64) -> Self {
        Self {
            target,
            d,
            theta,
            phi,
            ..Self::default()
        }
    }

    /// Reject parameters that cannot form an image.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.d, self.theta, self.phi, self.roll, self.fov]
            .iter()
            .chain(self.target.coords.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(TraceError::InvalidView("non-finite parameter".into()));
        }
        if self.d <= 0.0 {
            return Err(TraceError::InvalidView(format!("distance must be positive, got {}", self.d)));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(TraceError::InvalidView(format!(
                "field of view must be in (0, 180) degrees, got {}",
                self.fov
            )));
        }
        Ok(())
    }

    /// Eye position.
    pub fn eye(&self) -> Point3 {
        let (st, ct) = self.theta.to_radians().sin_cos();
        let (sp, cp) = self.phi.to_radians().sin_cos();
        self.target + self.d * Vec3::new(cp * ct, cp * st, sp)
    }

    /// Camera for a `width × height` image.
    pub fn camera(&self, width: usize, height: usize) -> Result<Camera> {
        self.validate()?;
        if width == 0 || height == 0 {
            return Err(TraceError::ImageSize { width, height });
        }
        let eye = self.eye();
        let forward = (self.target - eye) / self.d;
        // Azimuthal tangent; well defined even looking straight down.
        let (st, ct) = self.theta.to_radians().sin_cos();
        let right0 = Vec3::new(-st, ct, 0.0);
        let up0 = right0.cross(&forward);
        let (sr, cr) = self.roll.to_radians().sin_cos();
        let right = cr * right0 + sr * up0;
        let up = cr * up0 - sr * right0;
        let span = 2.0 * self.d * (self.fov.to_radians() / 2.0).tan();
        Ok(Camera {
            eye,
            center: self.target,
            forward,
            right,
            up,
            d: self.d,
            scale: span / width.max(height) as f64,
            width,
            height,
        })
    }
}

/// A view resolved against an image size.
///
/// Screen coordinates are in pixels: `x` grows to the right from the left
/// edge, `y` grows downward from the top edge, and pixel `(i, j)` covers
/// `[i, i+1) × [j, j+1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub eye: Point3,
    center: Point3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    d: f64,
    scale: f64,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
}

impl Camera {
    /// Ray from the eye through screen position `(x, y)`.
    pub fn ray(&self, x: f64, y: f64) -> Ray {
        let target = self.center
            + self.right * (self.scale * (x - self.width as f64 / 2.0))
            + self.up * (self.scale * (self.height as f64 / 2.0 - y));
        Ray::new(self.eye, target)
    }

    /// Unit viewing direction.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Half-space of points that project onto the screen region
    /// `a·x + b·y >= c`, or that lie behind the eye.
    ///
    /// The bounding plane passes through the eye; every pixel ray with
    /// `a·x + b·y >= c` stays inside it for all `q > 0`.
    pub fn screen_half(&self, a: f64, b: f64, c: f64) -> Half {
        let w2 = self.width as f64 / 2.0;
        let h2 = self.height as f64 / 2.0;
        let g = self.scale * (a * w2 + b * h2 - c) / self.d;
        Half::new(self.eye, self.right * a - self.up * b + self.forward * g)
    }

    /// Half-space in front of the eye.
    pub fn front(&self) -> Half {
        Half::new(self.eye, self.forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_eye_from_angles() {
        let v = View::new(Point3::origin(), 10.0, 0.0, 90.0);
        let e = v.eye();
        assert!(e.x.abs() < 1e-12 && e.y.abs() < 1e-12);
        assert_relative_eq!(e.z, 10.0, epsilon = 1e-12);

        let v = View::new(Point3::new(1.0, 2.0, 3.0), 5.0, 90.0, 0.0);
        assert!((v.eye() - Point3::new(1.0, 7.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_center_ray_hits_target() {
        let v = View::new(Point3::new(1.0, -1.0, 0.5), 8.0, 30.0, 20.0);
        let cam = v.camera(101, 51).unwrap();
        let ray = cam.ray(50.5, 25.5);
        assert!((ray.at(1.0) - v.target).norm() < 1e-12);
        assert_relative_eq!(ray.length(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_screen_orientation() {
        // Eye on +x looking back at the origin: right is +y, up is +z.
        let v = View::new(Point3::origin(), 10.0, 0.0, 0.0);
        let cam = v.camera(100, 100).unwrap();
        let right = cam.ray(100.0, 50.0).at(1.0);
        let top = cam.ray(50.0, 0.0).at(1.0);
        assert!(right.y > 0.0 && right.z.abs() < 1e-12);
        assert!(top.z > 0.0 && top.y.abs() < 1e-12);

        let rolled = View { roll: 90.0, ..v }.camera(100, 100).unwrap();
        let r = rolled.ray(100.0, 50.0).at(1.0);
        assert!(r.z > 0.0 && r.y.abs() < 1e-12);
    }

    #[test]
    fn test_fov_spans_larger_dimension() {
        let v = View {
            fov: 90.0,
            ..View::new(Point3::origin(), 1.0, 0.0, 0.0)
        };
        let cam = v.camera(200, 100).unwrap();
        let left = cam.ray(0.0, 50.0).at(1.0);
        let right = cam.ray(200.0, 50.0).at(1.0);
        assert_relative_eq!((right - left).norm(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_screen_half_contains_rays() {
        let v = View::new(Point3::new(0.0, 0.0, 1.0), 6.0, 40.0, 25.0);
        let cam = v.camera(64, 48).unwrap();
        // Region x >= 20.
        let h = cam.screen_half(1.0, 0.0, 20.0);
        for (x, y, inside) in [(25.0, 10.0, true), (20.5, 40.0, true), (19.5, 3.0, false)] {
            let ray = cam.ray(x, y);
            for q in [0.1, 1.0, 7.0] {
                assert_eq!(h.eval(&ray.at(q)) >= 0.0, inside, "x={x} q={q}");
            }
        }
        // Region x + y >= 50.
        let h = cam.screen_half(1.0, 1.0, 50.0);
        assert!(h.contains(&cam.ray(30.0, 21.0).at(2.0)));
        assert!(!h.contains(&cam.ray(30.0, 19.0).at(2.0)));
        // Region y <= 10, i.e. -y >= -10.
        let h = cam.screen_half(0.0, -1.0, -10.0);
        assert!(h.contains(&cam.ray(5.0, 9.0).at(0.5)));
        assert!(!h.contains(&cam.ray(5.0, 11.0).at(0.5)));
        assert!(cam.front().contains(&cam.ray(5.0, 11.0).at(0.5)));
    }

    #[test]
    fn test_validate() {
        assert!(View::default().validate().is_ok());
        let bad = View { d: 0.0, ..View::default() };
        assert!(matches!(bad.validate(), Err(TraceError::InvalidView(_))));
        let bad = View { fov: 180.0, ..View::default() };
        assert!(bad.validate().is_err());
        let bad = View { phi: f64::NAN, ..View::default() };
        assert!(bad.validate().is_err());
        assert!(matches!(
            View::default().camera(0, 10),
            Err(TraceError::ImageSize { width: 0, height: 10 })
        ));
    }
}
