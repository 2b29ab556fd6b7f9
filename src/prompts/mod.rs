use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

static PROMPT_REGISTRY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("generate_system", include_str!("generate_system.hbs"));
    m.insert("generate_user", include_str!("generate_user.hbs"));
    m.insert("refine_system", include_str!("refine_system.hbs"));
    m.insert("refine_user", include_str!("refine_user.hbs"));
    m.insert("explain_system", include_str!("explain_system.hbs"));
    m.insert("explain_user", include_str!("explain_user.hbs"));
    m.insert("convert_system", include_str!("convert_system.hbs"));
    m.insert("convert_user", include_str!("convert_user.hbs"));
    m
});

/// Render a prompt by name using Handlebars.
///
/// Usage:
///     render("generate_user", &json!({"base_prompt": "...", "delimiter": "|||"}))
///
pub fn render(name: &str, ctx: &Value) -> anyhow::Result<String> {
    let template = PROMPT_REGISTRY
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("unknown prompt '{name}'"))?;

    let mut hb = Handlebars::new();
    hb.set_strict_mode(true); // fail if a variable is missing
    hb.register_escape_fn(handlebars::no_escape); // patterns must reach the model verbatim

    hb.render_template(template, ctx)
        .map(|rendered| rendered.trim().to_string())
        .map_err(|e| anyhow::anyhow!("rendering prompt '{name}' failed: {e}"))
}
