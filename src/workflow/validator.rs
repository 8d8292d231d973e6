//! Descriptor Validation
//!
//! Advisory checks over a loaded document. The generators never call into
//! this module and render malformed descriptors verbatim; the CLI reports
//! these diagnostics as warnings, or as errors under `--strict`.
//!
//! Checks:
//! - Empty and duplicate step task ids
//! - `stdout`/`stdin` naming a missing command input
//! - Types that are neither WDL primitives nor declared structs
//! - Pre-scatter aliases shadowing workflow inputs or earlier aliases

use std::collections::HashSet;

use log::{debug, info};
use once_cell::sync::Lazy;
use thiserror::Error;

use super::model::{Document, StructDefinition, TaskDefinition, Workflow};

/// Type names understood without a struct declaration.
static BUILTIN_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "String", "File", "Int", "Float", "Boolean", "Object", "Directory", "Array", "Map", "Pair",
    ]
    .into_iter()
    .collect()
});

/// A single diagnostic about a descriptor document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Step has empty or whitespace-only task id")]
    EmptyStepId,

    #[error("Duplicate step task id: '{0}'")]
    DuplicateStepId(String),

    #[error("Task '{task}': {stream} names unknown command input '{name}'")]
    UnknownStreamInput {
        task: String,
        stream: &'static str,
        name: String,
    },

    #[error("{owner}: '{name}' has unknown type '{variable_type}'")]
    UnknownType {
        owner: String,
        name: String,
        variable_type: String,
    },

    #[error("Step '{step}': pre-scatter alias '{name}' shadows an existing name")]
    ShadowedUnpack { step: String, name: String },
}

/// Validates a document and returns every diagnostic found.
pub fn validate_document(document: &Document) -> Vec<ValidationError> {
    let errors = match document {
        Document::Task(doc) => validate_task(&doc.task, &doc.structs),
        Document::Workflow(workflow) => validate_workflow(workflow),
    };

    if errors.is_empty() {
        info!("Descriptor document '{}' passed validation", document.name());
    } else {
        debug!("Found {} diagnostics in '{}'", errors.len(), document.name());
    }
    errors
}

fn validate_workflow(workflow: &Workflow) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let owner = format!("Workflow '{}'", workflow.name);

    for input in &workflow.inputs {
        check_type(&owner, &input.name, &input.variable_type, &workflow.structs, &mut errors);
    }
    for output in &workflow.outputs {
        check_type(&owner, &output.name, &output.variable_type, &workflow.structs, &mut errors);
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut bound: HashSet<&str> = workflow.inputs.iter().map(|v| v.name.as_str()).collect();

    for step in workflow.all_steps() {
        if step.task_id.trim().is_empty() {
            errors.push(ValidationError::EmptyStepId);
        } else if !seen_ids.insert(step.task_id.as_str()) {
            errors.push(ValidationError::DuplicateStepId(step.task_id.clone()));
        }

        for unpack in step.prescatter.iter().flat_map(|(_, unpacks)| unpacks) {
            check_type(&owner, &unpack.name, &unpack.variable_type, &workflow.structs, &mut errors);
            if !bound.insert(unpack.name.as_str()) {
                errors.push(ValidationError::ShadowedUnpack {
                    step: step.task_id.clone(),
                    name: unpack.name.clone(),
                });
            }
        }

        if let Some(definition) = &step.task_definition {
            errors.extend(validate_task(definition, &workflow.structs));
        }
    }

    errors
}

fn validate_task(task: &TaskDefinition, structs: &[StructDefinition]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let owner = format!("Task '{}'", task.name);

    for input in &task.inputs {
        check_type(&owner, &input.name, &input.variable_type, structs, &mut errors);
    }
    for input in &task.command.inputs {
        check_type(&owner, &input.name, &input.variable_type, structs, &mut errors);
    }
    for output in &task.outputs {
        check_type(&owner, &output.name, &output.variable_type, structs, &mut errors);
    }

    let streams = [("stdout", &task.command.stdout), ("stdin", &task.command.stdin)];
    for (stream, name) in streams {
        if let Some(name) = name {
            if !task.command.inputs.iter().any(|input| input.name == *name) {
                errors.push(ValidationError::UnknownStreamInput {
                    task: task.name.clone(),
                    stream,
                    name: name.clone(),
                });
            }
        }
    }

    errors
}

fn check_type(
    owner: &str,
    name: &str,
    variable_type: &str,
    structs: &[StructDefinition],
    errors: &mut Vec<ValidationError>,
) {
    if !is_known_type(variable_type, structs) {
        errors.push(ValidationError::UnknownType {
            owner: owner.to_string(),
            name: name.to_string(),
            variable_type: variable_type.to_string(),
        });
    }
}

/// Every identifier in the type must be a builtin or a declared struct.
fn is_known_type(variable_type: &str, structs: &[StructDefinition]) -> bool {
    let mut names = variable_type
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|part| !part.is_empty())
        .peekable();

    if names.peek().is_none() {
        return false;
    }

    names.all(|part| BUILTIN_TYPES.contains(part) || structs.iter().any(|s| s.name == part))
}
