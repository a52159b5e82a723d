//! Seeded procedural generation of star systems: body configurations, simplex noise,
//! displaced cube-sphere meshes, and orbit placement.

pub mod body;
pub mod error;
pub mod gradient;
pub mod noise_field;
pub mod orbit;
pub mod seed;
pub mod settings;
pub mod sphere_mesh;
pub mod star_system;

pub use body::*;
pub use error::*;
pub use gradient::*;
pub use noise_field::*;
pub use orbit::*;
pub use seed::*;
pub use settings::*;
pub use sphere_mesh::*;
pub use star_system::*;
