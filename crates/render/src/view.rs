//! Template data.
//!
//! Handlebars has no number formatting, so scores and durations are
//! formatted here before rendering.

use kbquery_provider::{OutputMode, ReasoningEffort};
use kbquery_query::{Citation, Interaction, Session, Timing};
use serde::Serialize;

/// Display title for a citation with neither title nor document.
pub const UNTITLED_SOURCE: &str = "Untitled source";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimingView {
    pub total: String,
    pub request_preparation: String,
    pub kb_retrieval: String,
    pub response_processing: String,
}

impl From<&Timing> for TimingView {
    fn from(timing: &Timing) -> Self {
        Self {
            total: seconds(timing.total),
            request_preparation: seconds(timing.request_preparation),
            kb_retrieval: seconds(timing.kb_retrieval),
            response_processing: seconds(timing.response_processing),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CitationView {
    pub id: u32,
    pub kind: &'static str,
    pub title: String,
    pub url: Option<String>,
    /// `url` when it is safe to emit as a hyperlink
    pub link: Option<String>,
    pub document: Option<String>,
    pub relevance: Option<String>,
    pub excerpt: Option<String>,
    pub note: Option<String>,
}

impl From<&Citation> for CitationView {
    fn from(citation: &Citation) -> Self {
        let title = citation
            .title
            .clone()
            .or_else(|| citation.document.clone())
            .unwrap_or_else(|| UNTITLED_SOURCE.to_string());

        Self {
            id: citation.id,
            kind: citation.kind.as_str(),
            title,
            url: citation.url.clone(),
            link: citation.url.as_deref().filter(|u| is_web_url(u)).map(str::to_string),
            document: citation.document.clone(),
            relevance: citation.relevance_score.map(|s| format!("{:.2}", s)),
            excerpt: citation.citation_text.clone(),
            note: citation.note.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InteractionView {
    pub question: String,
    pub answers: Vec<String>,
    pub citations: Vec<CitationView>,
    pub timing: TimingView,
    pub knowledge_base_name: String,
    pub reasoning_effort: String,
    pub output_mode: String,
}

impl From<&Interaction> for InteractionView {
    fn from(interaction: &Interaction) -> Self {
        let overrides = &interaction.metadata.request_overrides;
        Self {
            question: interaction.question.clone(),
            answers: interaction.answers.clone(),
            citations: interaction.citations.iter().map(CitationView::from).collect(),
            timing: TimingView::from(&interaction.timing),
            knowledge_base_name: interaction.metadata.knowledge_base_name.clone(),
            reasoning_effort: overrides.retrieval_reasoning_effort.clone(),
            output_mode: overrides.knowledge_retrieval_output_mode.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionView {
    pub interactions: Vec<InteractionView>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            interactions: session.iter().map(InteractionView::from).collect(),
        }
    }
}

/// A failed query shown on the index page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FailureView {
    pub message: String,
    pub timing: Option<TimingView>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OptionView {
    pub value: &'static str,
    pub selected: bool,
}

/// Contents of the web index page.
#[derive(Debug, Clone, Default)]
pub struct IndexPage {
    pub knowledge_base_name: String,
    pub search_endpoint: String,
    pub indexes: Vec<String>,

    /// Last submitted form values, echoed back into the form
    pub question: String,
    pub reasoning_effort: Option<String>,
    pub output_mode: Option<String>,

    /// Pre-rendered session HTML
    pub results_html: Option<String>,

    /// Serialized session posted back with the next question
    pub history: Option<String>,

    pub error: Option<String>,
    pub error_timing: Option<Timing>,
}

impl IndexPage {
    pub fn new(
        knowledge_base_name: impl Into<String>,
        search_endpoint: impl Into<String>,
        indexes: Vec<String>,
    ) -> Self {
        Self {
            knowledge_base_name: knowledge_base_name.into(),
            search_endpoint: search_endpoint.into(),
            indexes,
            ..Self::default()
        }
    }

    /// Echo the submitted form back.
    pub fn with_form(
        mut self,
        question: impl Into<String>,
        reasoning_effort: Option<String>,
        output_mode: Option<String>,
    ) -> Self {
        self.question = question.into();
        self.reasoning_effort = reasoning_effort;
        self.output_mode = output_mode;
        self
    }

    pub fn with_results(mut self, html: String) -> Self {
        self.results_html = Some(html);
        self
    }

    pub fn with_history(mut self, history: String) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>, timing: Option<Timing>) -> Self {
        self.error = Some(message.into());
        self.error_timing = timing;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IndexView<'a> {
    pub knowledge_base_name: &'a str,
    pub search_endpoint: &'a str,
    pub indexes: &'a [String],
    pub question: &'a str,
    pub effort_options: Vec<OptionView>,
    pub mode_options: Vec<OptionView>,
    pub results_html: Option<&'a str>,
    pub history: Option<&'a str>,
    pub failure: Option<FailureView>,
}

impl<'a> From<&'a IndexPage> for IndexView<'a> {
    fn from(page: &'a IndexPage) -> Self {
        let selected_effort = page
            .reasoning_effort
            .as_deref()
            .and_then(ReasoningEffort::parse);
        let selected_mode = page.output_mode.as_deref().and_then(OutputMode::parse);

        Self {
            knowledge_base_name: &page.knowledge_base_name,
            search_endpoint: &page.search_endpoint,
            indexes: &page.indexes,
            question: &page.question,
            effort_options: ReasoningEffort::ALL
                .iter()
                .map(|e| OptionView {
                    value: e.as_str(),
                    selected: selected_effort == Some(*e),
                })
                .collect(),
            mode_options: OutputMode::ALL
                .iter()
                .map(|m| OptionView {
                    value: m.as_str(),
                    selected: selected_mode == Some(*m),
                })
                .collect(),
            results_html: page.results_html.as_deref(),
            history: page.history.as_deref(),
            failure: page.error.as_ref().map(|message| FailureView {
                message: message.clone(),
                timing: page.error_timing.as_ref().map(TimingView::from),
            }),
        }
    }
}

/// Only http(s) URLs become links; anything else is shown as text.
fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

fn seconds(value: f64) -> String {
    format!("{:.2}s", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbquery_query::CitationType;

    #[test]
    fn test_citation_title_falls_back_to_document() {
        let mut citation = Citation::new(2, CitationType::SearchIndex);
        citation.document = Some("faq-1".to_string());
        citation.relevance_score = Some(0.5);

        let view = CitationView::from(&citation);
        assert_eq!(view.title, "faq-1");
        assert_eq!(view.kind, "searchIndex");
        assert_eq!(view.relevance.as_deref(), Some("0.50"));

        let bare = CitationView::from(&Citation::new(3, CitationType::Other));
        assert_eq!(bare.title, UNTITLED_SOURCE);
        assert!(bare.relevance.is_none());
    }

    #[test]
    fn test_only_web_urls_become_links() {
        let mut citation = Citation::new(1, CitationType::Web);
        citation.url = Some("HTTPS://news.example/a".to_string());
        assert_eq!(
            CitationView::from(&citation).link.as_deref(),
            Some("HTTPS://news.example/a")
        );

        citation.url = Some("javascript:alert(1)".to_string());
        let view = CitationView::from(&citation);
        assert!(view.link.is_none());
        assert_eq!(view.url.as_deref(), Some("javascript:alert(1)"));
    }

    #[test]
    fn test_timing_formatted_in_seconds() {
        let view = TimingView::from(&Timing::from_phases(0.01, 1.2, 0.004));
        assert_eq!(view.total, "1.21s");
        assert_eq!(view.kb_retrieval, "1.20s");
        assert_eq!(view.response_processing, "0.00s");
    }

    #[test]
    fn test_index_view_marks_selected_options() {
        let page = IndexPage::new("kb", "https://x", vec![])
            .with_form("q", Some("LOW".to_string()), None);
        let view = IndexView::from(&page);

        let selected: Vec<&str> = view
            .effort_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, vec!["low"]);
        assert!(view.mode_options.iter().all(|o| !o.selected));
    }
}
