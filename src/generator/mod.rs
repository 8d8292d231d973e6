//! WDL Generation Module
//!
//! Renders descriptor models into WDL source text. Every renderer is a pure
//! function of its inputs; nothing is cached between calls.
//!
//! # Architecture
//!
//! - [`command`]: Command line synthesis with positional ordering
//! - [`task`]: Full `task` declarations around a synthesized command
//! - [`compose`]: Workflow body composition, scatter and pre-scatter blocks
//! - [`document`]: Complete documents (imports, structs, workflow, tasks)

pub mod command;
pub mod compose;
pub mod document;
pub mod task;

pub use command::{
    synthesize, CommandSynthesizer, SerializationStrategy, StructFileStrategy, TypeCategory,
};
pub use compose::{compose, Composition, NestedTask, StepComposer};
pub use document::{render_document, GeneratedDocument};
pub use task::render_task;

/// One level of block indentation.
pub const INDENT: &str = "    ";

/// Order in which environment-variable requirements are prepended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvVarOrder {
    /// Each requirement is inserted at the very front, so the last declared
    /// requirement comes first.
    #[default]
    Reversed,
    /// Requirements appear in declaration order.
    Declared,
}

impl std::str::FromStr for EnvVarOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reversed" => Ok(Self::Reversed),
            "declared" => Ok(Self::Declared),
            other => Err(format!(
                "Invalid env-var order '{}': expected 'reversed' or 'declared'",
                other
            )),
        }
    }
}

/// Rendering options shared by all generators.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Indentation placed after each command line continuation
    pub continuation_indent: String,
    pub env_var_order: EnvVarOrder,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            continuation_indent: INDENT.to_string(),
            env_var_order: EnvVarOrder::default(),
        }
    }
}

impl RenderOptions {
    /// Sets the continuation indentation to `width` spaces.
    pub fn with_continuation_width(mut self, width: usize) -> Self {
        self.continuation_indent = " ".repeat(width);
        self
    }

    pub fn with_env_var_order(mut self, order: EnvVarOrder) -> Self {
        self.env_var_order = order;
        self
    }
}

/// Prefixes every non-empty line of `text` with `prefix`.
pub(crate) fn indent_block(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
