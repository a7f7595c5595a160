//! Server-rendered HTML pages.
//!
//! The form posts back to `/ask`. Earlier interactions travel with the form
//! as a serialized session in a hidden `history` field, so the page lists
//! the whole session newest first without any server-side state.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::Html,
    Form,
};
use kbquery_core::AppError;
use kbquery_query::{QueryInput, Session};
use serde::Deserialize;

use crate::{
    error_handler::{status_for, ApiError},
    state::AppState,
};

/// Fields posted by the index page form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AskForm {
    pub question: String,

    #[serde(default)]
    pub retrieval_reasoning_effort: Option<String>,

    #[serde(default)]
    pub knowledge_retrieval_output_mode: Option<String>,

    /// JSON-serialized session from the previous page
    #[serde(default)]
    pub history: Option<String>,
}

impl AskForm {
    fn query_input(&self) -> QueryInput {
        QueryInput {
            question: self.question.clone(),
            retrieval_reasoning_effort: self.retrieval_reasoning_effort.clone(),
            knowledge_retrieval_output_mode: self.knowledge_retrieval_output_mode.clone(),
        }
    }

    fn session(&self) -> Result<Session, ApiError> {
        match self.history.as_deref().map(str::trim) {
            None | Some("") => Ok(Session::new()),
            Some(history) => serde_json::from_str(history)
                .map_err(|e| ApiError::BadRequest(format!("Unreadable session history: {}", e))),
        }
    }
}

/// Handler: GET /
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let html = state.renderer.render_index_html(&state.index_page())?;
    Ok(Html(html))
}

/// Handler: POST /ask
///
/// Query failures are rendered into the page with the matching status code
/// rather than returned as JSON; the earlier history is kept either way.
pub async fn ask_form(
    State(state): State<AppState>,
    payload: Result<Form<AskForm>, FormRejection>,
) -> Result<(StatusCode, Html<String>), ApiError> {
    let Form(form) = payload?;
    let mut session = form.session()?;
    let input = form.query_input();

    let page = state.index_page().with_form(
        input.question.clone(),
        input.retrieval_reasoning_effort.clone(),
        input.knowledge_retrieval_output_mode.clone(),
    );

    let (status, mut page) = match state.service.submit(&input).await {
        Ok(interaction) => {
            session.record(interaction);
            (StatusCode::OK, page)
        }
        Err(failure) => (
            status_for(&failure.error),
            page.with_error(failure.to_string(), Some(failure.timing)),
        ),
    };

    if !session.is_empty() {
        page = page
            .with_results(state.renderer.render_session_html(&session)?)
            .with_history(serde_json::to_string(&session).map_err(AppError::from)?);
    }

    let html = state.renderer.render_index_html(&page)?;
    Ok((status, Html(html)))
}
