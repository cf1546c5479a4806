pub mod spacecraft;

pub use spacecraft::{presets, Spacecraft, SpacecraftBuilder};
