#![warn(missing_docs)]

//! Rendering for the solidray CSG ray tracer.
//!
//! [`trace`] turns a [`Model`] seen through a [`View`] into an [`Image`].
//! The [`Engine`] picks a scheduler, which decides which shapes each pixel
//! ray is tested against:
//!
//! - [`Uniform`] - screen zones filled with a half-space dry test; the
//!   default
//! - [`Recursive`] - quadtree subdivision of the screen with the same test
//! - [`Linear`] - every shape against every ray; the reference
//!
//! All three produce the same pixels. Work runs on a private rayon pool
//! sized by [`Engine::threads`].
//!
//! # Example
//!
//! ```ignore
//! use solidray_math::Point3;
//! use solidray_shape::{Rgb, Shape};
//! use solidray_trace::{render, Engine, Light, Model, View};
//!
//! let mut model = Model::new();
//! model.push(Shape::sphere(Point3::origin(), 1.0).with_base(Rgb::new(0.9, 0.2, 0.2)));
//! let view = View::new(Point3::origin(), 10.0, 30.0, 20.0);
//! let image = render(&model, &view, &Light::default(), &Engine::default(), 640, 480)?;
//! std::fs::write("out.ppm", image.to_ppm())?;
//! ```

pub mod engine;
pub mod error;
pub mod image;
mod lazy_sort;
pub mod light;
pub mod linear;
pub mod model;
pub mod recursive;
pub mod scheduler;
mod segment;
pub mod shade;
pub mod uniform;
pub mod view;

pub use engine::{Engine, Method, MAX_ANTI};
pub use error::{Result, TraceError};
pub use image::{Image, Rgba, Tile};
pub use light::{Finish, Light};
pub use linear::Linear;
pub use model::Model;
pub use recursive::Recursive;
pub use scheduler::{Scheduler, Stage};
pub use shade::shade;
pub use uniform::Uniform;
pub use view::{Camera, View};

use std::time::Instant;

use rayon::ThreadPoolBuilder;
use solidray_shape::Color;
use tracing::{info, instrument, warn};

/// Render `model` into `image`, overwriting every pixel.
///
/// The engine is copied and fixed first, so out-of-range options are
/// logged and replaced rather than rejected.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn trace<C: Color + Sync>(
    model: &Model<C>,
    view: &View,
    light: &Light,
    engine: &Engine,
    image: &mut Image,
) -> Result<()> {
    let mut engine = engine.clone();
    engine.fix();
    let camera = view.camera(image.width(), image.height())?;
    let pool = ThreadPoolBuilder::new().num_threads(engine.threads).build()?;

    let method = match engine.method {
        Method::Block => {
            warn!("block method is not available, using uniform");
            Method::Uniform
        }
        m => m,
    };

    let start = Instant::now();
    let tiles = pool.install(|| {
        let stage = Stage::new(model, camera, light, &engine);
        match method {
            Method::Uniform | Method::Block => Uniform.render(&stage),
            Method::Recursive => Recursive.render(&stage),
            Method::Linear => Linear.render(&stage),
        }
    });
    for tile in &tiles {
        image.blit(tile);
    }
    info!(
        ?method,
        shapes = model.len(),
        tiles = tiles.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
        "trace complete"
    );
    Ok(())
}

/// Render into a fresh `width × height` image.
pub fn render<C: Color + Sync>(
    model: &Model<C>,
    view: &View,
    light: &Light,
    engine: &Engine,
    width: usize,
    height: usize,
) -> Result<Image> {
    let mut image = Image::new(width, height)?;
    trace(model, view, light, engine, &mut image)?;
    Ok(image)
}
