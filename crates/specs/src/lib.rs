//! Readers for the specification files shared by the simulation tools.
//!
//! - Agent listings: YAML sequences of [`AgentRecord`]s, one per simulated agent.
//! - Project files (`.assisi`): name the arena and topology files of a setup.
//! - Arena files (`.arena`): layered tables of node poses.

pub mod arena;
pub mod error;
pub mod listing;

pub use arena::{Arena, ArenaNode, ArenaPose, ProjectSpec};
pub use error::SpecError;
pub use listing::{
    ensure_unique, find_duplicates, parse_listing, read_listing, read_listings, AgentRecord, Pose,
    DEFAULT_PUB_ADDR, DEFAULT_SUB_ADDR,
};
