//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use clisearch_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Renders both the optional system template and the user template with
/// Handlebars. HTML escaping is disabled: prompts are plain text and often
/// carry scraped page content.
///
/// # Example
/// ```no_run
/// use clisearch_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is Rust?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{builtin_prompt, ANSWER_PROMPT_ID};

    fn create_test_definition(system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            system: system.map(str::to_string),
            template: "Question: {{question}}".to_string(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape_markup() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Is 1 < 2 && \"yes\"?".to_string());

        let result = render_template("{{question}}", &vars).unwrap();
        assert_eq!(result, "Is 1 < 2 && \"yes\"?");
    }

    #[test]
    fn test_build_prompt_with_system() {
        let def = create_test_definition(Some("Answer about {{question}}"));
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Rust".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Question: Rust");
        assert_eq!(built.system.as_deref(), Some("Answer about Rust"));
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_build_builtin_answer_prompt() {
        let def = builtin_prompt(ANSWER_PROMPT_ID).unwrap();
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "What is the capital of France?".to_string());
        vars.insert("context".to_string(), "[1] Paris\nURL: https://a.com\nParis is the capital.".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert!(built.user.contains("What is the capital of France?"));
        assert!(built.user.contains("URL: https://a.com"));
    }

    #[test]
    fn test_render_template_missing_variable() {
        let vars = HashMap::new();
        // Handlebars renders missing variables as empty string
        let result = render_template("Question: {{missing}}", &vars).unwrap();
        assert_eq!(result, "Question: ");
    }
}
