pub mod drag;
pub mod earth;
pub mod gravity;

pub use earth::{eci_to_ground, gmst, GroundPoint};
pub use gravity::{GravityModel, G0, J2_EARTH, MU_EARTH, R_EARTH};
