use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::dispatch::{Article, ContentGenerator};

// Generation is the slowest upstream call of a run; give it more room than
// the mail and news clients.
const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(60);

/// Client for the LLM API that writes the weekly briefing.
pub struct LlmClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Secret<String>,
}

#[derive(serde::Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(serde::Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(serde::Serialize)]
struct RequestPart {
    text: String,
}

#[derive(serde::Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(serde::Deserialize)]
struct CandidatePart {
    text: String,
}

impl LlmClient {
    pub fn new(
        base_url: String,
        model: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        Self {
            http_client,
            base_url,
            model,
            api_key,
        }
    }

    /// Asks the model for the week's briefing in the 3-2-1 editorial
    /// structure: three major stories, two tools to try, one actionable
    /// insight. The reply is expected to be raw inline-styled HTML.
    pub async fn generate_briefing(&self, articles: &[Article]) -> Result<String, anyhow::Error> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: briefing_prompt(articles),
                }],
            }],
        };

        let response: GenerateContentResponse = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| anyhow::anyhow!("Model response contained no candidates"))?;

        Ok(strip_code_fences(&text))
    }
}

/// Models keep wrapping HTML in markdown fences despite the prompt; strip
/// them before the body reaches the email frame.
fn strip_code_fences(text: &str) -> String {
    text.replace("```html", "").replace("```", "").trim().to_string()
}

fn briefing_prompt(articles: &[Article]) -> String {
    let articles_context = articles
        .iter()
        .map(|article| {
            format!(
                "Title: {}\nDescription: {}\nSource: {}\nURL: {}\nImageURL: {}",
                article.title,
                article.description,
                article.source_name,
                article.url,
                article.image_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!(
        r#"You are the Lead Editor of "THE SIGNAL", a weekly intelligence briefing for technical founders and AI engineers.

Based on these sources:
{}

Create the weekly briefing following the exact 3-2-1 structure:

1. 3 MAJOR STORIES: the three most impactful AI developments of the week, each with a strategic headline, an analysis of why the shift matters, the article image, and a link to the source.
2. 2 NEW TOOLS TO TRY: two emerging AI tools or frameworks, each with a name, a one-line value proposition and a link.
3. 1 ACTIONABLE INSIGHT: one strategic insight or reusable prompt that saves real work.

Technical requirements:
- Return ONLY HTML content, no markdown.
- Use inline styles only.
- Colors: white #ffffff, primary #10b981, muted #94a3b8, background #0f172a."#,
        articles_context
    )
}

#[async_trait]
impl ContentGenerator for LlmClient {
    async fn generate(&self, articles: &[Article]) -> Result<String, anyhow::Error> {
        self.generate_briefing(articles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::assert_err;
    use fake::{Fake, Faker};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String) -> LlmClient {
        LlmClient::new(
            base_url,
            "test-model".to_string(),
            Secret::new(Faker.fake()),
            None,
        )
    }

    fn article() -> Article {
        Article {
            title: "A model release".to_string(),
            description: "Something shifted".to_string(),
            url: "https://news.example/a".to_string(),
            image_url: "https://news.example/a.png".to_string(),
            source_name: "Example Wire".to_string(),
        }
    }

    #[tokio::test]
    async fn generate_briefing_returns_the_first_candidate_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    { "content": { "parts": [{ "text": "<p>briefing</p>" }] } }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let body = client(mock_server.uri())
            .generate_briefing(&[article()])
            .await
            .unwrap();

        assert_eq!(body, "<p>briefing</p>");
    }

    #[tokio::test]
    async fn markdown_fences_are_stripped_from_the_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    { "content": { "parts": [{ "text": "```html\n<p>briefing</p>\n```" }] } }
                ]
            })))
            .mount(&mock_server)
            .await;

        let body = client(mock_server.uri())
            .generate_briefing(&[article()])
            .await
            .unwrap();

        assert_eq!(body, "<p>briefing</p>");
    }

    #[tokio::test]
    async fn empty_candidate_list_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&mock_server)
            .await;

        let response = client(mock_server.uri()).generate_briefing(&[article()]).await;

        assert_err!(response);
    }

    #[tokio::test]
    async fn server_error_is_propagated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let response = client(mock_server.uri()).generate_briefing(&[article()]).await;

        assert_err!(response);
    }

    #[test]
    fn prompt_includes_every_article() {
        let articles = vec![article(), {
            let mut second = article();
            second.title = "Another story".to_string();
            second
        }];

        let prompt = briefing_prompt(&articles);

        assert!(prompt.contains("A model release"));
        assert!(prompt.contains("Another story"));
    }
}
