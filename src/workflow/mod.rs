//! Workflow Descriptor Module
//!
//! Provides the descriptor model consumed by the generators, together with
//! loading and advisory validation of descriptor documents.
//!
//! # Structure
//!
//! - [`model`]: Descriptor data structures (tasks, commands, steps, structs)
//! - [`loader`]: YAML/JSON loading and saving
//! - [`validator`]: Advisory document checks

pub mod loader;
pub mod model;
pub mod validator;

pub use loader::{load_document, parse_document, save_document, Format};
pub use model::{Document, TaskDefinition, Workflow, WorkflowStep};
pub use validator::{validate_document, ValidationError};
