//! CircuitSketch Application
//!
//! Headless shell around the core editor: configuration loading, a scripted
//! session over the demo circuit, and persistence.

mod app;
mod demo;

pub use app::{App, AppConfig, AppError};
pub use demo::demo_circuit;
