#![warn(missing_docs)]

//! Constructive solid geometry for the solidray ray tracer.
//!
//! A scene is a tree of [`Shape`]s: primitive leaves (spheres, boxes,
//! cylinders, triangles, planes, ...) combined by boolean operators. Every
//! node answers the same small set of questions:
//!
//! - [`Shape::process`] - per-frame preparation for a fixed eye point,
//!   producing a [`Prepared`] tree with the eye's inside/outside state and a
//!   lower bound on the eye-to-surface distance
//! - [`Prepared::infirst`] / [`Prepared::inall`] - first or all visible
//!   crossings of a ray within a parameter window
//! - [`Shape::dry`] - conservative "entirely outside this half-space" test
//!   used by the screen-space scheduler
//! - [`Shape::aabb`] - tagged axis-aligned bounds
//! - [`Shape::check`] - structural validation into [`Diagnostics`]
//!
//! # Example
//!
//! ```ignore
//! use solidray_shape::{Ray, Rgb, Shape};
//! use solidray_math::Point3;
//!
//! let ball: Shape<Rgb> = Shape::sphere(Point3::origin(), 1.0);
//! let eye = Point3::new(-5.0, 0.0, 0.0);
//! let prepared = ball.process(&eye);
//! let hit = prepared.infirst(&Ray::new(eye, Point3::origin()), f64::INFINITY);
//! ```

pub mod color;
pub mod diagnostic;
pub mod operator;
pub mod prepare;
pub mod primitive;
mod ray;
pub mod shape;

pub use color::{Color, Rgb};
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use operator::Logic;
pub use prepare::Prepared;
pub use ray::{Inq, Ray};
pub use shape::{Shape, ShapeKind};
