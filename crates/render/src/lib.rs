//! Rendering for KB Query presentation surfaces.
//!
//! This crate turns interactions and sessions into:
//! - Console text listings
//! - HTML citation cards for the web UI
//! - The web index page
//!
//! Built-in Handlebars templates can be replaced per workspace by files in
//! `.kbquery/templates/<name>.hbs`.

pub mod loader;
pub mod renderer;
pub mod templates;
pub mod view;

// Re-export main types
pub use loader::load_template_overrides;
pub use renderer::Renderer;
pub use view::IndexPage;
