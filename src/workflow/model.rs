//! Descriptor Data Model
//!
//! Already-parsed task, workflow and struct descriptors consumed by the
//! generators. Nothing in this module is mutated during generation.
//!
//! # Example YAML Format
//!
//! ```yaml
//! kind: workflow
//! name: align_all
//! inputs:
//!   - name: samples
//!     variable_type: Array[Sample]
//! structs:
//!   - name: Sample
//!     fields:
//!       reads: File
//!       id: String
//! steps:
//!   - task_id: bwa
//!     task_definition:
//!       name: bwa
//!       command:
//!         base_command: bwa
//!         arguments:
//!           - position: 0
//!             value: mem
//!         inputs:
//!           - name: reads
//!             variable_type: File
//!             position: 1
//!     inputs:
//!       - input_id: bwa.reads
//!         value: read
//!     scatter:
//!       - variable: read
//!         source: samples_reads
//!     prescatter:
//!       samples:
//!         - name: samples_reads
//!           field: reads
//!           variable_type: File
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Requirement type marking environment-variable declarations.
pub const ENV_VAR_REQUIREMENT: &str = "envVar";

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    " ".to_string()
}

/// Accepts any YAML/JSON scalar and keeps its printed form.
///
/// Environment values such as `OMP_NUM_THREADS: 1` are often written
/// unquoted; they end up in shell text either way.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Integer(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(x) => format!("{:?}", x),
        Scalar::Text(s) => s,
    })
}

/// A fixed command-line argument.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Argument {
    /// Relative placement hint; absent positions sort last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Emit a space between prefix and value
    #[serde(default = "default_true")]
    pub separate: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Argument {
    /// Creates a bare value argument with no position.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            position: None,
            prefix: None,
            separate: true,
            value: Some(value.into()),
        }
    }

    pub fn at(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, separate: bool) -> Self {
        self.prefix = Some(prefix.into());
        self.separate = separate;
        self
    }
}

/// An input bound onto the command line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommandInput {
    pub name: String,

    /// WDL type tag, e.g. `File`, `Boolean`, `Array[String]`
    pub variable_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default = "default_true")]
    pub separate: bool,

    #[serde(default = "default_true")]
    pub is_required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Item separator for array-typed inputs
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl CommandInput {
    /// Creates a required, unprefixed input with no position.
    pub fn new(name: impl Into<String>, variable_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_type: variable_type.into(),
            position: None,
            prefix: None,
            separate: true,
            is_required: true,
            default: None,
            separator: default_separator(),
        }
    }

    pub fn at(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, separate: bool) -> Self {
        self.prefix = Some(prefix.into());
        self.separate = separate;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// True for `Array[...]` typed inputs.
    pub fn is_array(&self) -> bool {
        self.variable_type.starts_with("Array")
    }
}

/// One `NAME='value'` pair of an environment-variable requirement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EnvVar {
    pub name: String,

    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
}

/// Payload of a [`Requirement`]; its shape depends on the requirement type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RequirementValue {
    EnvVars(Vec<EnvVar>),
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RequirementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVars(vars) => {
                let pairs: Vec<String> = vars
                    .iter()
                    .map(|var| format!("{}={}", var.name, var.value))
                    .collect();
                write!(f, "{}", pairs.join(" "))
            }
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            // `{:?}` keeps the fractional part of whole floats: 2.0, not 2
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A runtime or environment requirement of a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Requirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RequirementValue>,
}

impl Requirement {
    /// Creates a runtime requirement such as `docker` or `memory`.
    pub fn runtime(requirement_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            requirement_type: Some(requirement_type.into()),
            value: Some(RequirementValue::Text(value.into())),
        }
    }

    /// Creates an environment-variable requirement from name/value pairs.
    pub fn env_vars<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(name, value)| EnvVar {
                name: name.into(),
                value: value.into(),
            })
            .collect();
        Self {
            requirement_type: Some(ENV_VAR_REQUIREMENT.to_string()),
            value: Some(RequirementValue::EnvVars(vars)),
        }
    }

    pub fn is_env_var(&self) -> bool {
        self.requirement_type.as_deref() == Some(ENV_VAR_REQUIREMENT)
    }
}

/// A declared record type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StructDefinition {
    pub name: String,

    /// Field name -> WDL type, in declaration order
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl StructDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, variable_type: impl Into<String>) -> Self {
        self.fields.insert(name.into(), variable_type.into());
        self
    }
}

/// The command line of a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Command {
    pub base_command: String,

    #[serde(default)]
    pub arguments: Vec<Argument>,

    #[serde(default)]
    pub inputs: Vec<CommandInput>,

    /// Name of the command input captured from standard output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    /// Name of the command input fed to standard input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

impl Command {
    pub fn new(base_command: impl Into<String>) -> Self {
        Self {
            base_command: base_command.into(),
            arguments: Vec::new(),
            inputs: Vec::new(),
            stdout: None,
            stdin: None,
        }
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_input(mut self, input: CommandInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_stdout(mut self, name: impl Into<String>) -> Self {
        self.stdout = Some(name.into());
        self
    }

    pub fn with_stdin(mut self, name: impl Into<String>) -> Self {
        self.stdin = Some(name.into());
        self
    }
}

/// A declared task or workflow input.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskVariable {
    pub name: String,
    pub variable_type: String,

    #[serde(default = "default_true")]
    pub is_required: bool,
}

impl TaskVariable {
    pub fn new(name: impl Into<String>, variable_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_type: variable_type.into(),
            is_required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    /// Declaration text, `Type name` or `Type? name`.
    pub fn declaration(&self) -> String {
        if self.is_required {
            format!("{} {}", self.variable_type, self.name)
        } else {
            format!("{}? {}", self.variable_type, self.name)
        }
    }
}

/// A declared task output and the expression producing it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub name: String,
    pub variable_type: String,
    pub output: String,
}

/// A complete task description.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    pub name: String,

    #[serde(default)]
    pub inputs: Vec<TaskVariable>,

    #[serde(default)]
    pub outputs: Vec<TaskOutput>,

    pub command: Command,

    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl TaskDefinition {
    pub fn new(name: impl Into<String>, command: Command) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            command,
            requirements: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: TaskVariable) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(
        mut self,
        name: impl Into<String>,
        variable_type: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.outputs.push(TaskOutput {
            name: name.into(),
            variable_type: variable_type.into(),
            output: output.into(),
        });
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }
}

/// What a workflow step calls.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    #[default]
    Task,
    #[serde(alias = "workflow", alias = "sub-workflow")]
    Subworkflow,
}

/// A single `name=value` binding of a call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepInput {
    /// Possibly qualified by the step's task id, e.g. `bwa.reads`
    pub input_id: String,
    pub value: String,
}

/// One `variable in source` pair of a declared scatter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScatterPair {
    pub variable: String,
    pub source: String,
}

/// Request to project one field out of an array of records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Unpack {
    /// Name of the alias declared inside the pre-scatter block
    pub name: String,
    /// Field read from each record
    pub field: String,
    pub variable_type: String,
}

impl Unpack {
    pub fn new(
        name: impl Into<String>,
        field: impl Into<String>,
        variable_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            variable_type: variable_type.into(),
        }
    }
}

/// A call of a task or sub-workflow inside a workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowStep {
    pub task_id: String,

    #[serde(default)]
    pub step_type: StepType,

    /// Owned definition; absent when the task is imported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_definition: Option<TaskDefinition>,

    #[serde(default)]
    pub inputs: Vec<StepInput>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scatter: Vec<ScatterPair>,

    /// Base record-array expression -> fields to unpack
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub prescatter: IndexMap<String, Vec<Unpack>>,
}

impl WorkflowStep {
    /// Creates a task step without a definition or bindings.
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            step_type: StepType::Task,
            task_definition: None,
            inputs: Vec::new(),
            scatter: Vec::new(),
            prescatter: IndexMap::new(),
        }
    }

    pub fn subworkflow(task_id: impl Into<String>) -> Self {
        Self {
            step_type: StepType::Subworkflow,
            ..Self::new(task_id)
        }
    }

    pub fn with_definition(mut self, definition: TaskDefinition) -> Self {
        self.task_definition = Some(definition);
        self
    }

    pub fn with_input(mut self, input_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.push(StepInput {
            input_id: input_id.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_scatter(mut self, variable: impl Into<String>, source: impl Into<String>) -> Self {
        self.scatter.push(ScatterPair {
            variable: variable.into(),
            source: source.into(),
        });
        self
    }

    pub fn with_prescatter(mut self, base: impl Into<String>, unpacks: Vec<Unpack>) -> Self {
        self.prescatter.insert(base.into(), unpacks);
        self
    }

    /// Identifier after the last `.` of the task id.
    pub fn leaf_id(&self) -> &str {
        self.task_id.rsplit('.').next().unwrap_or(&self.task_id)
    }
}

/// A workflow-level output, named by its qualified source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowOutput {
    pub name: String,
    pub variable_type: String,
}

impl WorkflowOutput {
    /// Identifier after the last `.` of the output name.
    pub fn leaf_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A complete workflow description.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workflow {
    pub name: String,

    #[serde(default)]
    pub inputs: Vec<TaskVariable>,

    #[serde(default)]
    pub outputs: Vec<WorkflowOutput>,

    #[serde(default)]
    pub steps: Vec<WorkflowStep>,

    #[serde(default)]
    pub subworkflows: Vec<WorkflowStep>,

    #[serde(default)]
    pub structs: Vec<StructDefinition>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            steps: Vec::new(),
            subworkflows: Vec::new(),
            structs: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Iterates `steps` followed by `subworkflows`.
    pub fn all_steps(&self) -> impl Iterator<Item = &WorkflowStep> {
        self.steps.iter().chain(self.subworkflows.iter())
    }
}

/// A standalone task together with the structs it references.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskDocument {
    pub task: TaskDefinition,

    #[serde(default)]
    pub structs: Vec<StructDefinition>,
}

/// Root of a descriptor file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Document {
    Task(TaskDocument),
    Workflow(Workflow),
}

impl Document {
    pub fn name(&self) -> &str {
        match self {
            Self::Task(doc) => &doc.task.name,
            Self::Workflow(workflow) => &workflow.name,
        }
    }

    pub fn structs(&self) -> &[StructDefinition] {
        match self {
            Self::Task(doc) => &doc.structs,
            Self::Workflow(workflow) => &workflow.structs,
        }
    }
}
