//! Command Line Synthesis
//!
//! Turns a base command, its fixed arguments and its bound inputs into one
//! ordered WDL command string:
//! - Tokens are ordered by their optional `position` (absent positions last)
//! - Boolean flags that are off by default are elided
//! - Struct-typed inputs are replaced by a serialization token
//! - Environment variables are prepended, stdin/stdout redirects appended

use log::debug;

use crate::workflow::model::{
    Argument, Command, CommandInput, Requirement, RequirementValue, StructDefinition,
};

use super::{EnvVarOrder, RenderOptions};

/// Literals meaning "false" in a boolean default.
const FALSE_LITERALS: &[&str] = &["False", "false"];

/// Type tag of boolean flags.
const BOOLEAN_TYPE: &str = "Boolean";

/// Broad classification of a command input's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    /// Names a declared struct, possibly inside `Array[...]`
    Struct,
    Array,
    Scalar,
}

impl TypeCategory {
    /// Classifies `variable_type` against the known structs.
    pub fn classify(variable_type: &str, structs: &[StructDefinition]) -> Self {
        let base = base_type(variable_type);
        if structs.iter().any(|s| s.name == base) {
            Self::Struct
        } else if variable_type.starts_with("Array") {
            Self::Array
        } else {
            Self::Scalar
        }
    }
}

/// Strips every `Array[` and `]` from a type tag.
pub fn base_type(variable_type: &str) -> String {
    variable_type.replace("Array[", "").replace(']', "")
}

/// Produces replacement tokens for inputs that cannot be rendered as a plain
/// placeholder.
///
/// Returning `None` falls through to the standard placeholder rendering.
pub trait SerializationStrategy: Send + Sync {
    fn token(&self, input: &CommandInput, category: TypeCategory) -> Option<String>;
}

/// Writes struct values to a file with `write_struct` before the command runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructFileStrategy;

impl SerializationStrategy for StructFileStrategy {
    fn token(&self, input: &CommandInput, category: TypeCategory) -> Option<String> {
        match category {
            TypeCategory::Struct => Some(format!("${{write_struct({})}}", input.name)),
            TypeCategory::Array | TypeCategory::Scalar => None,
        }
    }
}

/// Configurable command synthesizer.
///
/// # Example
///
/// ```
/// use wdlforge::generator::CommandSynthesizer;
/// use wdlforge::workflow::model::{Argument, Command, CommandInput};
///
/// let command = Command::new("tool")
///     .with_argument(Argument::new("run").at(0))
///     .with_input(CommandInput::new("infile", "File").at(1).with_prefix("-i", true));
///
/// let text = CommandSynthesizer::default().synthesize(&command, &[], &[]);
/// assert_eq!(text, "tool \\\n    run \\\n    -i ${infile}");
/// ```
pub struct CommandSynthesizer {
    options: RenderOptions,
    strategy: Box<dyn SerializationStrategy>,
}

impl Default for CommandSynthesizer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl CommandSynthesizer {
    /// Creates a synthesizer using [`StructFileStrategy`].
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            strategy: Box::new(StructFileStrategy),
        }
    }

    /// Replaces the serialization strategy.
    pub fn with_strategy(mut self, strategy: impl SerializationStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Synthesizes the full command string.
    pub fn synthesize(
        &self,
        command: &Command,
        requirements: &[Requirement],
        structs: &[StructDefinition],
    ) -> String {
        // Base command is anchored at position 0
        let mut parts: Vec<(Option<i64>, String)> =
            vec![(Some(0), command.base_command.clone())];

        for argument in &command.arguments {
            parts.push((argument.position, render_argument(argument)));
        }

        for input in &command.inputs {
            if let Some(token) = self.render_input(input, command, structs) {
                parts.push((input.position, token));
            }
        }

        // Stable: equal keys keep declaration order
        parts.sort_by_key(|(position, _)| (position.is_none(), *position));

        let mut tokens: Vec<String> = parts.into_iter().map(|(_, token)| token).collect();

        self.prepend_env_vars(&mut tokens, requirements);

        if let Some(stdin) = &command.stdin {
            tokens.push(format!("< ${{{}}}", stdin));
        }
        if let Some(stdout) = &command.stdout {
            tokens.push(format!("> ${{{}}}", stdout));
        }

        let separator = format!(" \\\n{}", self.options.continuation_indent);
        tokens.join(&separator)
    }

    /// Renders one command input, or `None` when it contributes no token.
    fn render_input(
        &self,
        input: &CommandInput,
        command: &Command,
        structs: &[StructDefinition],
    ) -> Option<String> {
        if is_elided_flag(input) {
            debug!("Eliding boolean flag '{}'", input.name);
            return None;
        }

        let category = TypeCategory::classify(&input.variable_type, structs);
        let is_stream = command.stdout.as_deref() == Some(input.name.as_str())
            || command.stdin.as_deref() == Some(input.name.as_str());

        // Only struct substitution outranks the stdout/stdin exclusion.
        if is_stream && category != TypeCategory::Struct {
            return None;
        }
        if let Some(token) = self.strategy.token(input, category) {
            return Some(token);
        }
        if is_stream {
            return None;
        }

        Some(placeholder(input))
    }

    fn prepend_env_vars(&self, tokens: &mut Vec<String>, requirements: &[Requirement]) {
        let env_tokens = requirements
            .iter()
            .filter(|req| req.is_env_var())
            .filter_map(|req| match &req.value {
                Some(RequirementValue::EnvVars(vars)) => Some(
                    vars.iter()
                        .map(|var| format!("{}='{}'", var.name, var.value))
                        .collect::<Vec<_>>()
                        .join(" "),
                ),
                _ => {
                    debug!("Ignoring envVar requirement without name/value pairs");
                    None
                }
            });

        for (index, token) in env_tokens.enumerate() {
            match self.options.env_var_order {
                EnvVarOrder::Reversed => tokens.insert(0, token),
                EnvVarOrder::Declared => tokens.insert(index, token),
            }
        }
    }
}

/// Synthesizes a command with default options.
pub fn synthesize(
    command: &Command,
    requirements: &[Requirement],
    structs: &[StructDefinition],
) -> String {
    CommandSynthesizer::default().synthesize(command, requirements, structs)
}

/// Renders `prefix<sep>value`, or `value` alone when there is no prefix.
fn render_argument(argument: &Argument) -> String {
    let value = argument.value.as_deref().unwrap_or("");
    match &argument.prefix {
        Some(prefix) if argument.separate => format!("{} {}", prefix, value),
        Some(prefix) => format!("{}{}", prefix, value),
        None => value.to_string(),
    }
}

/// A boolean input that is off by default, or has no flag to emit.
fn is_elided_flag(input: &CommandInput) -> bool {
    if input.variable_type != BOOLEAN_TYPE {
        return false;
    }
    let defaults_false = input
        .default
        .as_deref()
        .is_some_and(|d| FALSE_LITERALS.contains(&d));
    defaults_false || input.prefix.is_none()
}

/// Renders the standard `${...}` placeholder for an input.
fn placeholder(input: &CommandInput) -> String {
    let mut expr = String::new();
    if input.is_array() {
        expr.push_str(&format!("sep='{}' ", input.separator));
    }
    if let Some(default) = &input.default {
        expr.push_str(&format!("default='{}' ", default));
    }
    expr.push_str(&input.name);

    match &input.prefix {
        None => format!("${{{}}}", expr),
        Some(prefix) if input.is_required && input.separate => format!("{} ${{{}}}", prefix, expr),
        Some(prefix) if input.is_required => format!("{}${{{}}}", prefix, expr),
        // Optional values may be absent at evaluation time
        Some(prefix) => format!("${{{} + {}}}", prefix, expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<&str> {
        text.split(" \\\n    ").collect()
    }

    #[test]
    fn test_literal_round_trip() {
        let command = Command::new("tool")
            .with_argument(Argument::new("run").at(0))
            .with_input(CommandInput::new("infile", "File").at(1).with_prefix("-i", true));

        let text = synthesize(&command, &[], &[]);
        assert_eq!(text, "tool \\\n    run \\\n    -i ${infile}");
    }

    #[test]
    fn test_positions_sorted_and_absent_last() {
        let command = Command::new("tool")
            .with_input(CommandInput::new("late", "File"))
            .with_input(CommandInput::new("third", "File").at(3))
            .with_argument(Argument::new("first").at(1))
            .with_input(CommandInput::new("later", "File"))
            .with_input(CommandInput::new("second", "File").at(2));

        let text = synthesize(&command, &[], &[]);
        assert_eq!(
            split(&text),
            vec!["tool", "first", "${second}", "${third}", "${late}", "${later}"]
        );
    }

    #[test]
    fn test_equal_positions_keep_declaration_order() {
        let command = Command::new("tool")
            .with_argument(Argument::new("a").at(1))
            .with_argument(Argument::new("b").at(1))
            .with_input(CommandInput::new("c", "File").at(1));

        let text = synthesize(&command, &[], &[]);
        assert_eq!(split(&text), vec!["tool", "a", "b", "${c}"]);
    }

    #[test]
    fn test_negative_position_precedes_base_command() {
        let command = Command::new("tool").with_argument(Argument::new("time").at(-1));
        assert_eq!(split(&synthesize(&command, &[], &[])), vec!["time", "tool"]);
    }

    #[test]
    fn test_argument_rendering() {
        let command = Command::new("tool")
            .with_argument(Argument::new("4").with_prefix("-t", true))
            .with_argument(Argument::new("8").with_prefix("--mem=", false))
            .with_argument(Argument {
                position: None,
                prefix: None,
                separate: true,
                value: None,
            })
            .with_argument(Argument::new("last"));

        let text = synthesize(&command, &[], &[]);
        assert_eq!(split(&text), vec!["tool", "-t 4", "--mem=8", "", "last"]);
    }

    #[test]
    fn test_boolean_elision() {
        let command = Command::new("tool")
            .with_input(
                CommandInput::new("verbose", "Boolean")
                    .at(1)
                    .with_prefix("-v", true)
                    .with_default("False"),
            )
            .with_input(CommandInput::new("quiet", "Boolean").at(2))
            .with_input(
                CommandInput::new("lower", "Boolean")
                    .with_prefix("-l", true)
                    .with_default("false"),
            )
            .with_input(CommandInput::new("force", "Boolean").at(3).with_prefix("-f", true));

        let text = synthesize(&command, &[], &[]);
        assert!(!text.contains("verbose"));
        assert!(!text.contains("quiet"));
        assert!(!text.contains("lower"));
        assert_eq!(split(&text), vec!["tool", "-f ${force}"]);
    }

    #[test]
    fn test_struct_substitution_precedence() {
        let structs = vec![StructDefinition::new("Sample").with_field("reads", "File")];
        let command = Command::new("tool")
            .with_input(
                CommandInput::new("sample", "Sample")
                    .at(2)
                    .with_prefix("--sample", true)
                    .with_default("x"),
            )
            .with_input(CommandInput::new("many", "Array[Sample]").at(1));

        let text = synthesize(&command, &[], &structs);
        assert_eq!(
            split(&text),
            vec!["tool", "${write_struct(many)}", "${write_struct(sample)}"]
        );
    }

    #[test]
    fn test_unknown_struct_renders_placeholder() {
        let command = Command::new("tool").with_input(CommandInput::new("sample", "Sample"));
        assert_eq!(split(&synthesize(&command, &[], &[])), vec!["tool", "${sample}"]);
    }

    #[test]
    fn test_stdout_excluded_and_suffixed() {
        let command = Command::new("tool")
            .with_input(CommandInput::new("report", "File").at(1).with_prefix("-o", true))
            .with_input(CommandInput::new("infile", "File").at(2))
            .with_stdout("report");

        let text = synthesize(&command, &[], &[]);
        assert_eq!(split(&text), vec!["tool", "${infile}", "> ${report}"]);
        assert!(text.ends_with("> ${report}"));
    }

    #[test]
    fn test_no_stdout_no_redirect() {
        let command = Command::new("tool").with_input(CommandInput::new("infile", "File"));
        assert!(!synthesize(&command, &[], &[]).contains('>'));
    }

    #[test]
    fn test_stdin_redirect_precedes_stdout() {
        let command = Command::new("sort")
            .with_input(CommandInput::new("unsorted", "File").at(1))
            .with_input(CommandInput::new("sorted", "File"))
            .with_stdin("unsorted")
            .with_stdout("sorted");

        let text = synthesize(&command, &[], &[]);
        assert_eq!(split(&text), vec!["sort", "< ${unsorted}", "> ${sorted}"]);
    }

    #[test]
    fn test_placeholder_shapes() {
        let required = CommandInput::new("x", "File").with_prefix("-f", true);
        assert_eq!(placeholder(&required), "-f ${x}");

        let optional = required.clone().optional();
        assert_eq!(placeholder(&optional), "${-f + x}");

        let bare = CommandInput::new("x", "File");
        assert_eq!(placeholder(&bare), "${x}");

        let joined = CommandInput::new("x", "File").with_prefix("--in=", false);
        assert_eq!(placeholder(&joined), "--in=${x}");
    }

    #[test]
    fn test_array_separator_and_default() {
        let input = CommandInput::new("files", "Array[File]")
            .with_prefix("-I", true)
            .with_separator(",")
            .with_default("a.txt");
        assert_eq!(placeholder(&input), "-I ${sep=',' default='a.txt' files}");

        let scalar = CommandInput::new("k", "Int")
            .with_default("31")
            .optional()
            .with_prefix("-k", true);
        assert_eq!(placeholder(&scalar), "${-k + default='31' k}");
    }

    #[test]
    fn test_env_vars_reversed_by_default() {
        let requirements = vec![
            Requirement::env_vars([("A", "1"), ("B", "2")]),
            Requirement::runtime("docker", "ubuntu"),
            Requirement::env_vars([("C", "3")]),
        ];
        let command = Command::new("tool");

        let text = synthesize(&command, &requirements, &[]);
        assert_eq!(split(&text), vec!["C='3'", "A='1' B='2'", "tool"]);
    }

    #[test]
    fn test_env_vars_declared_order() {
        let requirements = vec![
            Requirement::env_vars([("A", "1")]),
            Requirement::env_vars([("C", "3")]),
        ];
        let options = RenderOptions::default().with_env_var_order(EnvVarOrder::Declared);
        let command = Command::new("tool").with_stdout("out");

        let text = CommandSynthesizer::new(options).synthesize(&command, &requirements, &[]);
        assert_eq!(split(&text), vec!["A='1'", "C='3'", "tool", "> ${out}"]);
    }

    #[test]
    fn test_custom_continuation_indent() {
        let command = Command::new("tool").with_argument(Argument::new("run"));
        let options = RenderOptions::default().with_continuation_width(8);
        let text = CommandSynthesizer::new(options).synthesize(&command, &[], &[]);
        assert_eq!(text, "tool \\\n        run");
    }

    struct JsonArrayStrategy;

    impl SerializationStrategy for JsonArrayStrategy {
        fn token(&self, input: &CommandInput, category: TypeCategory) -> Option<String> {
            match category {
                TypeCategory::Array => Some(format!("${{write_json({})}}", input.name)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_custom_strategy() {
        let command = Command::new("tool")
            .with_input(CommandInput::new("xs", "Array[Int]"))
            .with_input(CommandInput::new("y", "Int"));

        let text = CommandSynthesizer::default()
            .with_strategy(JsonArrayStrategy)
            .synthesize(&command, &[], &[]);
        assert_eq!(split(&text), vec!["tool", "${write_json(xs)}", "${y}"]);
    }

    #[test]
    fn test_custom_strategy_keeps_stdout_input_off_the_line() {
        let command = Command::new("tool")
            .with_input(CommandInput::new("outs", "Array[File]"))
            .with_stdout("outs");

        let text = CommandSynthesizer::default()
            .with_strategy(JsonArrayStrategy)
            .synthesize(&command, &[], &[]);
        assert_eq!(split(&text), vec!["tool", "> ${outs}"]);
    }

    #[test]
    fn test_classify() {
        let structs = vec![StructDefinition::new("Sample")];
        assert_eq!(TypeCategory::classify("Sample", &structs), TypeCategory::Struct);
        assert_eq!(
            TypeCategory::classify("Array[Array[Sample]]", &structs),
            TypeCategory::Struct
        );
        assert_eq!(TypeCategory::classify("Array[File]", &structs), TypeCategory::Array);
        assert_eq!(TypeCategory::classify("File", &structs), TypeCategory::Scalar);
    }
}
