//! Workspace template overrides.

use std::collections::HashMap;
use std::path::Path;

use kbquery_core::{AppError, AppResult};

use crate::templates::template_names;

/// Load template overrides from the workspace.
///
/// A template named `session.html` is replaced by
/// `.kbquery/templates/session.html.hbs` when that file exists. Unknown
/// files in the directory are ignored.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.kbquery/`
///
/// # Returns
/// Template name to template source for every override found.
pub fn load_template_overrides(workspace_path: &Path) -> AppResult<HashMap<String, String>> {
    let templates_dir = workspace_path.join(".kbquery/templates");
    let mut overrides = HashMap::new();

    if !templates_dir.is_dir() {
        return Ok(overrides);
    }

    for name in template_names() {
        let template_file = templates_dir.join(format!("{}.hbs", name));
        if !template_file.is_file() {
            continue;
        }

        tracing::debug!("Loading template override from: {:?}", template_file);

        let contents = std::fs::read_to_string(&template_file).map_err(|e| {
            AppError::Render(format!(
                "Failed to read template file {:?}: {}",
                template_file, e
            ))
        })?;

        if contents.trim().is_empty() {
            return Err(AppError::Render(format!(
                "Template override {:?} cannot be empty",
                template_file
            )));
        }

        tracing::info!("Using workspace template for {}", name);
        overrides.insert(name.to_string(), contents);
    }

    Ok(overrides)
}
