//! Document Assembly
//!
//! Assembles complete WDL documents: sub-workflow imports, struct
//! declarations, the workflow block and the nested task declarations
//! produced while composing its steps.

use std::collections::HashSet;

use log::{debug, info};

use crate::workflow::model::{Document, StructDefinition, TaskDocument, Workflow, WorkflowOutput};

use super::compose::StepComposer;
use super::task::render_task;
use super::{indent_block, RenderOptions, INDENT};

/// A rendered document and the task ids its workflow consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub text: String,
    /// Empty for task documents
    pub task_ids: Vec<String>,
}

/// Renders a descriptor document into WDL source.
///
/// # Example
///
/// ```
/// use wdlforge::generator::{render_document, RenderOptions};
/// use wdlforge::workflow::model::{Document, Workflow, WorkflowStep};
///
/// let workflow = Workflow::new("main").with_step(WorkflowStep::new("hello"));
/// let generated = render_document(&Document::Workflow(workflow), &RenderOptions::default());
///
/// assert!(generated.text.contains("workflow main {\n    call hello\n}"));
/// assert_eq!(generated.task_ids, vec!["hello"]);
/// ```
pub fn render_document(document: &Document, options: &RenderOptions) -> GeneratedDocument {
    match document {
        Document::Task(doc) => GeneratedDocument {
            text: render_task_document(doc, options),
            task_ids: Vec::new(),
        },
        Document::Workflow(workflow) => render_workflow_document(workflow, options),
    }
}

fn render_task_document(doc: &TaskDocument, options: &RenderOptions) -> String {
    let mut sections: Vec<String> = doc.structs.iter().map(render_struct).collect();
    sections.push(render_task(&doc.task, &doc.structs, options));
    finish(sections)
}

fn render_workflow_document(workflow: &Workflow, options: &RenderOptions) -> GeneratedDocument {
    info!("Rendering workflow '{}'", workflow.name);

    let composition = StepComposer::new(options).compose(
        &workflow.steps,
        &workflow.subworkflows,
        &workflow.structs,
    );

    let mut sections = Vec::new();

    let imports = dedup(composition.imports.iter().map(String::as_str));
    if !imports.is_empty() {
        sections.push(imports.join("\n"));
    }

    sections.extend(workflow.structs.iter().map(render_struct));

    let mut parts = Vec::new();
    if !workflow.inputs.is_empty() {
        let declarations: Vec<String> = workflow.inputs.iter().map(|v| v.declaration()).collect();
        parts.push(declarations.join("\n"));
    }
    if !composition.body.is_empty() {
        parts.push(composition.body.clone());
    }
    if !workflow.outputs.is_empty() {
        parts.push(render_outputs(&workflow.outputs));
    }
    sections.push(format!(
        "workflow {} {{\n{}\n}}",
        workflow.name,
        indent_block(&parts.join("\n\n"), INDENT)
    ));

    let mut emitted = HashSet::new();
    for task in &composition.nested_tasks {
        if emitted.insert(task.name.as_str()) {
            sections.push(task.text.clone());
        } else {
            debug!("Skipping duplicate task declaration '{}'", task.name);
        }
    }

    GeneratedDocument {
        text: finish(sections),
        task_ids: composition.task_ids,
    }
}

/// Renders `struct NAME { ... }` with one `Type field` line per field.
fn render_struct(definition: &StructDefinition) -> String {
    let fields: Vec<String> = definition
        .fields
        .iter()
        .map(|(name, variable_type)| format!("{}{} {}", INDENT, variable_type, name))
        .collect();
    format!("struct {} {{\n{}\n}}", definition.name, fields.join("\n"))
}

fn render_outputs(outputs: &[WorkflowOutput]) -> String {
    let lines: Vec<String> = outputs
        .iter()
        .map(|output| {
            format!(
                "{}{} {} = {}",
                INDENT,
                output.variable_type,
                output.leaf_name(),
                output.name
            )
        })
        .collect();
    format!("output {{\n{}\n}}", lines.join("\n"))
}

/// Keeps the first occurrence of each line.
fn dedup<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    lines.filter(|line| seen.insert(*line)).collect()
}

fn finish(sections: Vec<String>) -> String {
    let mut text = sections.join("\n\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::model::{
        Command, CommandInput, TaskDefinition, TaskVariable, Unpack, WorkflowStep,
    };

    fn bwa_task() -> TaskDefinition {
        TaskDefinition::new(
            "bwa",
            Command::new("bwa").with_input(CommandInput::new("sample", "Sample").at(1)),
        )
        .with_input(TaskVariable::new("sample", "Sample"))
        .with_output("bam", "File", "\"out.bam\"")
    }

    #[test]
    fn test_struct_declaration_keeps_field_order() {
        let definition = StructDefinition::new("Sample")
            .with_field("reads", "File")
            .with_field("id", "String");

        assert_eq!(
            render_struct(&definition),
            "struct Sample {\n    File reads\n    String id\n}"
        );
    }

    #[test]
    fn test_full_workflow_document() {
        let mut workflow = Workflow::new("align_all");
        workflow.inputs.push(TaskVariable::new("samples", "Array[Sample]"));
        workflow.structs.push(StructDefinition::new("Sample").with_field("reads", "File"));
        workflow.outputs.push(WorkflowOutput {
            name: "bwa.bam".to_string(),
            variable_type: "Array[File]".to_string(),
        });
        workflow.steps.push(
            WorkflowStep::new("bwa")
                .with_definition(bwa_task())
                .with_input("bwa.sample", "s")
                .with_scatter("s", "samples"),
        );
        workflow
            .subworkflows
            .push(WorkflowStep::subworkflow("qc").with_definition(bwa_task()));

        let generated = render_document(&Document::Workflow(workflow), &RenderOptions::default());
        let expected = "\
import \"qc.wdl\" as qc

struct Sample {
    File reads
}

workflow align_all {
    Array[Sample] samples

    scatter (s in samples) {
        call bwa {
            input: sample=s
        }
    }

    call qc

    output {
        Array[File] bam = bwa.bam
    }
}

task bwa {
    Sample sample

    command {
        bwa \\
            ${write_struct(sample)}
    }

    output {
        File bam = \"out.bam\"
    }
}
";
        assert_eq!(generated.text, expected);
        assert_eq!(generated.task_ids, vec!["bwa", "qc"]);
    }

    #[test]
    fn test_duplicate_tasks_and_imports_emitted_once() {
        let mut workflow = Workflow::new("wf")
            .with_step(WorkflowStep::new("bwa").with_definition(bwa_task()))
            .with_step(WorkflowStep::new("bwa").with_definition(bwa_task()));
        workflow
            .subworkflows
            .push(WorkflowStep::subworkflow("a.qc").with_definition(bwa_task()));
        workflow
            .subworkflows
            .push(WorkflowStep::subworkflow("b.qc").with_definition(bwa_task()));

        let generated = render_document(&Document::Workflow(workflow), &RenderOptions::default());

        assert_eq!(generated.text.matches("task bwa {").count(), 1);
        assert_eq!(generated.text.matches("import \"qc.wdl\" as qc").count(), 1);
        assert_eq!(generated.task_ids, vec!["bwa", "bwa", "a.qc", "b.qc"]);
    }

    #[test]
    fn test_prescatter_inside_workflow_body() {
        let workflow = Workflow::new("wf").with_step(
            WorkflowStep::new("count")
                .with_prescatter("samples", vec![Unpack::new("ids", "id", "String")]),
        );

        let generated = render_document(&Document::Workflow(workflow), &RenderOptions::default());
        let prescatter = concat!(
            "    scatter (samples_item in samples) {\n",
            "        String ids = samples_item.id\n",
            "    }\n",
            "    call count",
        );
        assert!(generated.text.contains(prescatter));
    }

    #[test]
    fn test_task_document() {
        let doc = TaskDocument {
            task: bwa_task(),
            structs: vec![StructDefinition::new("Sample").with_field("reads", "File")],
        };

        let generated = render_document(&Document::Task(doc), &RenderOptions::default());
        assert!(generated.text.starts_with("struct Sample {\n    File reads\n}\n\ntask bwa {"));
        assert!(generated.text.ends_with("}\n"));
        assert!(generated.task_ids.is_empty());
    }

    #[test]
    fn test_empty_workflow() {
        let generated = render_document(
            &Document::Workflow(Workflow::new("empty")),
            &RenderOptions::default(),
        );
        assert_eq!(generated.text, "workflow empty {\n\n}\n");
    }
}
