//! Simulation of a user interactively post-editing machine translation
//! output. Each reference sentence plays the part of the translation the
//! user wants; the simulator corrects the system's hypothesis one word per
//! regeneration cycle, keeping validated word isles fixed, and accumulates
//! the keystroke and mouse effort the session would have cost a real user.

pub mod config;
pub mod corpus;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod simulation;
pub mod vocabulary;

pub use config::SessionConfig;
pub use error::{SimError, SimResult};
pub use metrics::{CorpusEffort, SentenceEffort};
