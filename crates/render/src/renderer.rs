//! Handlebars renderer for interactions, sessions and the index page.

use std::path::Path;

use handlebars::Handlebars;
use kbquery_core::{AppError, AppResult};
use kbquery_query::{Interaction, Session};
use serde::Serialize;

use crate::loader::load_template_overrides;
use crate::templates::{
    HTML_TEMPLATES, INDEX_HTML, INTERACTION_TEXT, SESSION_HTML, TEXT_TEMPLATES,
};
use crate::view::{IndexPage, IndexView, InteractionView, SessionView};

/// Renders presentation output from registered templates.
///
/// Text templates are rendered verbatim; HTML templates escape every
/// interpolated value.
#[derive(Debug, Clone)]
pub struct Renderer {
    text: Handlebars<'static>,
    html: Handlebars<'static>,
}

impl Renderer {
    /// Create a renderer with the built-in templates.
    pub fn new() -> AppResult<Self> {
        let mut text = Handlebars::new();

        // Disable HTML escaping for console output
        text.register_escape_fn(handlebars::no_escape);

        let mut html = Handlebars::new();

        for (name, source) in TEXT_TEMPLATES {
            register(&mut text, name, source)?;
        }
        for (name, source) in HTML_TEMPLATES {
            register(&mut html, name, source)?;
        }

        Ok(Self { text, html })
    }

    /// Create a renderer, replacing built-ins with any templates found in
    /// the workspace's `.kbquery/templates/` directory.
    pub fn with_workspace(workspace_path: &Path) -> AppResult<Self> {
        let mut renderer = Self::new()?;

        for (name, source) in load_template_overrides(workspace_path)? {
            if TEXT_TEMPLATES.iter().any(|(n, _)| *n == name) {
                register(&mut renderer.text, &name, &source)?;
            } else {
                register(&mut renderer.html, &name, &source)?;
            }
        }

        Ok(renderer)
    }

    /// Console listing: answers, numbered citations, timing and overrides.
    pub fn render_interaction_text(&self, interaction: &Interaction) -> AppResult<String> {
        render(&self.text, INTERACTION_TEXT, &InteractionView::from(interaction))
    }

    /// Citation cards for every interaction in the session, newest first.
    pub fn render_session_html(&self, session: &Session) -> AppResult<String> {
        render(&self.html, SESSION_HTML, &SessionView::from(session))
    }

    pub fn render_index_html(&self, page: &IndexPage) -> AppResult<String> {
        render(&self.html, INDEX_HTML, &IndexView::from(page))
    }
}

fn register(registry: &mut Handlebars<'static>, name: &str, source: &str) -> AppResult<()> {
    registry
        .register_template_string(name, source)
        .map_err(|e| AppError::Render(format!("Failed to register template {}: {}", name, e)))
}

fn render<T: Serialize>(registry: &Handlebars<'static>, name: &str, data: &T) -> AppResult<String> {
    registry
        .render(name, data)
        .map_err(|e| AppError::Render(format!("Failed to render template {}: {}", name, e)))
}
