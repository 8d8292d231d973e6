//! Workflow Step Composition
//!
//! Builds the body of a `workflow` block from its steps. Each step becomes a
//! `call`, optionally wrapped in its declared `scatter` and preceded by
//! synthesized pre-scatter blocks that unpack fields of record arrays.
//!
//! Nested task declarations, import lines and consumed task ids are
//! collected into the returned [`Composition`]; nothing outlives the call.

use log::{debug, info};

use crate::workflow::model::{ScatterPair, StepType, StructDefinition, Unpack, WorkflowStep};

use super::command::CommandSynthesizer;
use super::task::render_task_with;
use super::{indent_block, RenderOptions, INDENT};

/// A task declaration rendered for one of the composed steps.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedTask {
    pub name: String,
    pub text: String,
}

/// Result of composing one workflow body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    /// Step renderings separated by blank lines
    pub body: String,
    /// `import` lines for sub-workflows, in step order
    pub imports: Vec<String>,
    /// Task declarations owned by the steps, in step order
    pub nested_tasks: Vec<NestedTask>,
    /// Every consumed task id, in step order
    pub task_ids: Vec<String>,
}

/// Composes workflow steps with a configured command synthesizer.
pub struct StepComposer {
    synthesizer: CommandSynthesizer,
}

impl Default for StepComposer {
    fn default() -> Self {
        Self::new(&RenderOptions::default())
    }
}

impl StepComposer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            synthesizer: CommandSynthesizer::new(options.clone()),
        }
    }

    /// Uses `synthesizer` for nested task commands.
    pub fn with_synthesizer(synthesizer: CommandSynthesizer) -> Self {
        Self { synthesizer }
    }

    /// Composes `steps` followed by `subworkflows`.
    pub fn compose(
        &self,
        steps: &[WorkflowStep],
        subworkflows: &[WorkflowStep],
        structs: &[StructDefinition],
    ) -> Composition {
        let mut composition = Composition::default();
        let mut rendered = Vec::new();

        for step in steps.iter().chain(subworkflows) {
            composition.task_ids.push(step.task_id.clone());

            if let Some(definition) = &step.task_definition {
                match step.step_type {
                    StepType::Task => {
                        composition.nested_tasks.push(NestedTask {
                            name: definition.name.clone(),
                            text: render_task_with(definition, structs, &self.synthesizer),
                        });
                    }
                    StepType::Subworkflow => {
                        let leaf = step.leaf_id();
                        composition
                            .imports
                            .push(format!("import \"{}.wdl\" as {}", leaf, leaf));
                    }
                }
            }

            rendered.push(render_step(step));
        }

        composition.body = rendered.join("\n\n");

        info!(
            "Composed {} steps ({} nested tasks, {} imports)",
            composition.task_ids.len(),
            composition.nested_tasks.len(),
            composition.imports.len()
        );

        composition
    }
}

/// Composes with default options.
pub fn compose(
    steps: &[WorkflowStep],
    subworkflows: &[WorkflowStep],
    structs: &[StructDefinition],
) -> Composition {
    StepComposer::default().compose(steps, subworkflows, structs)
}

/// Renders one step: pre-scatter blocks, then the (scattered) call.
fn render_step(step: &WorkflowStep) -> String {
    let mut blocks: Vec<String> = step
        .prescatter
        .iter()
        .map(|(base, unpacks)| render_prescatter(base, unpacks))
        .collect();

    let call = render_call(step);
    if step.scatter.is_empty() {
        blocks.push(call);
    } else {
        debug!("Step '{}' scatters over {} pairs", step.task_id, step.scatter.len());
        blocks.push(wrap_scatter(&step.scatter, &call));
    }

    blocks.join("\n")
}

/// Renders the `call` statement with its input bindings.
fn render_call(step: &WorkflowStep) -> String {
    if step.inputs.is_empty() {
        return format!("call {}", step.task_id);
    }

    let qualifier = format!("{}.", step.task_id);
    let bindings: Vec<String> = step
        .inputs
        .iter()
        .map(|input| {
            let id = input
                .input_id
                .strip_prefix(&qualifier)
                .unwrap_or(&input.input_id);
            format!("{}={}", id, input.value)
        })
        .collect();

    let label = format!("{}input: ", INDENT);
    let pad = " ".repeat(label.len());
    format!(
        "call {} {{\n{}{}\n}}",
        step.task_id,
        label,
        bindings.join(&format!(",\n{}", pad))
    )
}

/// Unpacks fields of every record in `base` into typed aliases.
fn render_prescatter(base: &str, unpacks: &[Unpack]) -> String {
    let item = format!("{}_item", base.replace('.', "_"));
    let aliases: Vec<String> = unpacks
        .iter()
        .map(|unpack| {
            format!(
                "{}{} {} = {}.{}",
                INDENT, unpack.variable_type, unpack.name, item, unpack.field
            )
        })
        .collect();

    format!("scatter ({} in {}) {{\n{}\n}}", item, base, aliases.join("\n"))
}

/// Wraps `body` in a scatter over all declared pairs.
fn wrap_scatter(pairs: &[ScatterPair], body: &str) -> String {
    let header = "scatter (";
    let pad = " ".repeat(header.len());
    let pairs: Vec<String> = pairs
        .iter()
        .map(|pair| format!("{} in {}", pair.variable, pair.source))
        .collect();

    format!(
        "{}{}) {{\n{}\n}}",
        header,
        pairs.join(&format!(",\n{}", pad)),
        indent_block(body, INDENT)
    )
}
