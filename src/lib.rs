//! wdlforge - WDL Source Generation
//!
//! Translates already-parsed workflow descriptors (tasks with commands,
//! typed inputs and outputs, runtime requirements, workflow steps) into WDL
//! source text.
//!
//! # Architecture
//!
//! The library is organized into two main modules:
//!
//! - [`workflow`]: Descriptor model, loading and advisory validation
//! - [`generator`]: Command synthesis, step composition and document assembly
//!
//! # Example
//!
//! ```rust,no_run
//! use wdlforge::generator::{render_document, RenderOptions};
//! use wdlforge::load_document;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load descriptors from YAML
//!     let document = load_document("pipeline.yaml")?;
//!
//!     // Render the WDL document
//!     let generated = render_document(&document, &RenderOptions::default());
//!     println!("{}", generated.text);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod generator;
pub mod workflow;

// Re-export commonly used types
pub use error::LoadError;
pub use generator::{compose, render_document, render_task, synthesize, RenderOptions};
pub use workflow::loader::load_document;
pub use workflow::model::{Document, Workflow, WorkflowStep};
pub use workflow::validator::validate_document;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "wdlforge";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::model::{Argument, Command};

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "wdlforge");
    }

    #[test]
    fn test_module_exports_synthesize() {
        let command = Command::new("echo").with_argument(Argument::new("hi"));
        assert_eq!(synthesize(&command, &[], &[]), "echo \\\n    hi");
    }

    #[test]
    fn test_module_exports_compose() {
        let composition = compose(&[WorkflowStep::new("a")], &[], &[]);
        assert_eq!(composition.body, "call a");
    }

    #[test]
    fn test_version_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
        for part in parts {
            assert!(part.parse::<u32>().is_ok(), "Version components should be numeric");
        }
    }
}
