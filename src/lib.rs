//! # digit-sketch
//!
//! Core of a handwritten-digit sketchpad: pointer strokes are rasterized with
//! a soft brush onto a 28×28 intensity grid that matches MNIST pixel
//! statistics, the grid is sent to a remote classifier, and the classifier's
//! probabilities and per-layer feature maps are turned into images.
//!
//! ## Architecture
//!
//! Data flows through three stages:
//!
//! 1. **Rasterizer**: [`rasterizer::StrokeRasterizer`] owns the grid for one
//!    drawing session and deposits the [`brush::BrushStencil`] along each
//!    interpolated stroke segment.
//! 2. **Classifier boundary**: [`classifier`] builds the request body, parses
//!    the response, and gates requests so only one is ever in flight.
//! 3. **Visualizer**: [`visualizer`] and [`scores`] turn grids, feature maps
//!    and probabilities into RGBA images and rankings, painting through the
//!    [`renderer_base::RendererBase`] / [`pixfmt_rgba::PixelFormat`] seam.
//!
//! Nothing here touches a display; the `demo/wasm` crate paints into a
//! browser canvas and `tools/sketch-tool` writes files.

// Foundation types
pub mod basics;
pub mod color;
pub mod config;
pub mod error;

// Pixel pipeline
pub mod image;
pub mod pixfmt_rgba;
pub mod renderer_base;
pub mod rendering_buffer;

// Drawing
pub mod brush;
pub mod grid;
pub mod preset;
pub mod rasterizer;

// Classifier output
pub mod classifier;
pub mod diagram;
pub mod feature_map;
pub mod scores;
pub mod visualizer;

pub use error::{ClassifierError, ConfigError, SketchError};
pub use grid::IntensityGrid;
pub use rasterizer::StrokeRasterizer;
