//! Infrastructure wiring.

pub mod resources;

pub use resources::ResourceManager;
