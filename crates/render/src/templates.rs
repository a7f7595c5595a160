//! Built-in templates.

/// Console listing of one interaction.
pub const INTERACTION_TEXT: &str = "interaction.txt";

/// Citation cards for a whole session.
pub const SESSION_HTML: &str = "session.html";

/// The web index page.
pub const INDEX_HTML: &str = "index.html";

/// Templates rendered without HTML escaping.
pub const TEXT_TEMPLATES: &[(&str, &str)] = &[(INTERACTION_TEXT, INTERACTION_TEXT_SOURCE)];

/// Templates rendered with HTML escaping.
pub const HTML_TEMPLATES: &[(&str, &str)] = &[
    (SESSION_HTML, SESSION_HTML_SOURCE),
    (INDEX_HTML, INDEX_HTML_SOURCE),
];

/// Every template name that can be overridden.
pub fn template_names() -> impl Iterator<Item = &'static str> {
    TEXT_TEMPLATES
        .iter()
        .chain(HTML_TEMPLATES.iter())
        .map(|(name, _)| *name)
}

const INTERACTION_TEXT_SOURCE: &str = r#"Question: {{question}}

Answer:
{{#each answers}}
{{this}}

{{else}}
(no answer was returned)

{{/each}}
Citations:
{{#each citations}}
  [{{id}}] {{title}} ({{kind}})
{{#if url}}
      URL: {{url}}
{{/if}}
{{#if document}}
      Document: {{document}}
{{/if}}
{{#if relevance}}
      Relevance: {{relevance}}
{{/if}}
{{#if excerpt}}
      Excerpt: {{excerpt}}
{{/if}}
{{#if note}}
      Note: {{note}}
{{/if}}
{{else}}
  No citations
{{/each}}

Timing: {{timing.total}} total (preparation {{timing.requestPreparation}}, retrieval {{timing.kbRetrieval}}, processing {{timing.responseProcessing}})
Overrides: reasoning effort = {{reasoningEffort}}, output mode = {{outputMode}}
"#;

const SESSION_HTML_SOURCE: &str = r#"<section class="session">
{{#each interactions}}
  <article class="interaction">
    <h2 class="question">{{question}}</h2>
    <div class="answers">
    {{#each answers}}
      <p class="answer">{{this}}</p>
    {{else}}
      <p class="answer empty">No answer was returned.</p>
    {{/each}}
    </div>
    <div class="citations">
    {{#each citations}}
      <details class="citation-card citation-{{kind}}">
        <summary><span class="citation-id">[{{id}}]</span> {{title}}{{#if relevance}} <span class="relevance">{{relevance}}</span>{{/if}}</summary>
        {{#if link}}<p class="citation-url"><a href="{{link}}" rel="noopener" target="_blank">{{link}}</a></p>{{else}}{{#if url}}<p class="citation-url">{{url}}</p>{{/if}}{{/if}}
        {{#if document}}<p class="citation-document">{{document}}</p>{{/if}}
        {{#if excerpt}}<blockquote class="citation-text">{{excerpt}}</blockquote>{{/if}}
        {{#if note}}<p class="citation-note">{{note}}</p>{{/if}}
      </details>
    {{else}}
      <p class="no-citations">No citations</p>
    {{/each}}
    </div>
    <footer class="timing">
      Total {{timing.total}} &middot; preparation {{timing.requestPreparation}} &middot; retrieval {{timing.kbRetrieval}} &middot; processing {{timing.responseProcessing}}
      <span class="overrides">effort: {{reasoningEffort}}, mode: {{outputMode}}</span>
    </footer>
  </article>
{{else}}
  <p class="empty-session">No questions asked yet.</p>
{{/each}}
</section>
"#;

const INDEX_HTML_SOURCE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{knowledgeBaseName}} - KB Query</title>
</head>
<body>
  <header>
    <h1>{{knowledgeBaseName}}</h1>
    <p class="endpoint">{{searchEndpoint}}</p>
    <ul class="indexes">
    {{#each indexes}}
      <li>{{this}}</li>
    {{/each}}
    </ul>
  </header>
  <form method="post" action="/ask">
    <textarea name="question" rows="3" placeholder="Ask a question" required>{{question}}</textarea>
    <label>Reasoning effort
      <select name="retrievalReasoningEffort">
        <option value="">knowledge base default</option>
      {{#each effortOptions}}
        <option value="{{value}}"{{#if selected}} selected{{/if}}>{{value}}</option>
      {{/each}}
      </select>
    </label>
    <label>Output mode
      <select name="knowledgeRetrievalOutputMode">
        <option value="">knowledge base default</option>
      {{#each modeOptions}}
        <option value="{{value}}"{{#if selected}} selected{{/if}}>{{value}}</option>
      {{/each}}
      </select>
    </label>
    {{#if history}}<input type="hidden" name="history" value="{{history}}">{{/if}}
    <button type="submit">Ask</button>
  </form>
{{#if failure}}
  <div class="error" role="alert">
    <p>{{failure.message}}</p>
    {{#if failure.timing}}<p class="timing">Failed after {{failure.timing.total}}</p>{{/if}}
  </div>
{{/if}}
{{#if resultsHtml}}
  {{{resultsHtml}}}
{{/if}}
</body>
</html>
"#;
