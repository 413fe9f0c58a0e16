//! The interaction simulation proper: isle detection, generation
//! constraints, the generator seam, unknown-word back-substitution, and the
//! per-sentence correction session that ties them together.

pub mod constraints;
pub mod generator;
pub mod isles;
pub mod session;
pub mod unknowns;
