//! HTML page rendering using Jinja2 syntax.
//!
//! Templates live in `templates/` and are embedded into the binary at compile
//! time, so rendering never depends on the working directory. Names ending in
//! `.html` are auto-escaped by minijinja.

use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("error.html", include_str!("../../templates/error.html")),
    (
        "files/index.html",
        include_str!("../../templates/files/index.html"),
    ),
    (
        "files/create.html",
        include_str!("../../templates/files/create.html"),
    ),
    (
        "files/update.html",
        include_str!("../../templates/files/update.html"),
    ),
];

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a page with the given context.
///
/// # Example
/// ```ignore
/// let html = render("files/create.html", context! { error => "Title is required." })?;
/// ```
pub fn render<S: Serialize>(template_name: &str, ctx: S) -> Result<String, minijinja::Error> {
    get_environment().get_template(template_name)?.render(ctx)
}
