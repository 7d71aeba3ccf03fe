//! Workflow subsystems of the lab common space.

pub mod library;
pub mod selection;
pub mod signal;
pub mod tensile;
pub mod thermal;
