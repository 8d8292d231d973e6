//! Task Declarations
//!
//! Wraps a synthesized command in a complete `task` block with its input
//! declarations, output expressions and runtime attributes.

use log::debug;

use crate::workflow::model::{Requirement, StructDefinition, TaskDefinition};

use super::command::CommandSynthesizer;
use super::{indent_block, RenderOptions, INDENT};

/// Renders a full `task NAME { ... }` declaration.
///
/// The `runtime` block is left out when no requirement maps to a runtime
/// attribute.
pub fn render_task(
    task: &TaskDefinition,
    structs: &[StructDefinition],
    options: &RenderOptions,
) -> String {
    let synthesizer = CommandSynthesizer::new(options.clone());
    render_task_with(task, structs, &synthesizer)
}

/// Renders a task with an already configured synthesizer.
pub fn render_task_with(
    task: &TaskDefinition,
    structs: &[StructDefinition],
    synthesizer: &CommandSynthesizer,
) -> String {
    debug!("Rendering task '{}'", task.name);

    let body_indent = INDENT.repeat(2);
    let command = synthesizer.synthesize(&task.command, &task.requirements, structs);

    let mut out = format!("task {} {{\n", task.name);

    for input in &task.inputs {
        out.push_str(&format!("{}{}\n", INDENT, input.declaration()));
    }
    if !task.inputs.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("{}command {{\n", INDENT));
    out.push_str(&indent_block(&command, &body_indent));
    out.push_str(&format!("\n{}}}\n", INDENT));

    out.push_str(&format!("\n{}output {{\n", INDENT));
    for output in &task.outputs {
        out.push_str(&format!(
            "{}{} {} = {}\n",
            body_indent, output.variable_type, output.name, output.output
        ));
    }
    out.push_str(&format!("{}}}\n", INDENT));

    let runtime = runtime_entries(&task.requirements);
    if runtime.is_empty() {
        debug!("Task '{}' has no runtime attributes", task.name);
    } else {
        out.push_str(&format!("\n{}runtime {{\n", INDENT));
        for entry in runtime {
            out.push_str(&format!("{}{}\n", body_indent, entry));
        }
        out.push_str(&format!("{}}}\n", INDENT));
    }

    out.push('}');
    out
}

/// `key: 'value'` lines for every runtime requirement.
///
/// Requirements without a type or value, and environment variables, are
/// not runtime attributes.
fn runtime_entries(requirements: &[Requirement]) -> Vec<String> {
    requirements
        .iter()
        .filter(|req| !req.is_env_var())
        .filter_map(|req| match (&req.requirement_type, &req.value) {
            (Some(kind), Some(value)) => Some(format!("{}: '{}'", kind, value)),
            _ => None,
        })
        .collect()
}
