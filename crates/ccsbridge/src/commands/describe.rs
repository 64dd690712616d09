//! `describe`: print what the bridge exports to the panel host.

use serde::Serialize;
use tabled::Tabled;

use ccsbridge_core::surface;
use ccsbridge_core::{ActionDefinition, FeedbackDefinition, InputField, VariableDefinition};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Surface {
    variables: Vec<VariableDefinition>,
    actions: Vec<ActionDefinition>,
    feedbacks: Vec<FeedbackDefinition>,
    config: Vec<InputField>,
}

impl Surface {
    fn current() -> Self {
        Self {
            variables: surface::variable_definitions(),
            actions: surface::action_definitions(),
            feedbacks: surface::feedback_definitions(),
            config: surface::config_fields(),
        }
    }
}

#[derive(Tabled)]
struct SurfaceRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Options")]
    options: String,
}

fn option_ids(options: &[InputField]) -> String {
    options.iter().map(InputField::id).collect::<Vec<_>>().join(", ")
}

fn rows(s: &Surface) -> Vec<SurfaceRow> {
    let variables = s.variables.iter().map(|v| SurfaceRow {
        kind: "variable",
        id: v.id.to_string(),
        name: v.name,
        options: String::new(),
    });
    let actions = s.actions.iter().map(|a| SurfaceRow {
        kind: "action",
        id: a.id.to_string(),
        name: a.name,
        options: option_ids(&a.options),
    });
    let feedbacks = s.feedbacks.iter().map(|f| SurfaceRow {
        kind: "feedback",
        id: f.id.to_string(),
        name: f.name,
        options: option_ids(&f.options),
    });
    let config = s.config.iter().map(|field| {
        let label = match field {
            InputField::TextInput { label, .. } | InputField::Number { label, .. } => *label,
        };
        SurfaceRow {
            kind: "config",
            id: field.id().to_owned(),
            name: label,
            options: String::new(),
        }
    });

    variables.chain(actions).chain(feedbacks).chain(config).collect()
}

fn ids(s: &Surface) -> String {
    rows(s)
        .into_iter()
        .map(|r| format!("{}/{}", r.kind, r.id))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let surface = Surface::current();
    let out = output::render_single(
        global.output,
        &surface,
        |s| output::render_table(&rows(s)),
        ids,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
