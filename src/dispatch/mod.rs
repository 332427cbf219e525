pub mod briefing;
pub mod eligibility;
pub mod render;
pub mod run;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_email::SubscriberEmail;

/// One usable news article from the weekly upstream pull. Articles without a
/// title, description and image are dropped before they get here.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub source_name: String,
}

/// Read/write access to the subscriber list.
#[async_trait]
pub trait SubscriberStore {
    async fn list_all(&self) -> Result<Vec<Subscriber>, anyhow::Error>;

    /// Stamps the subscriber's `last_sent_date` with the local date computed
    /// by the gate. Only called after confirmed transport success. The update
    /// is conditional on the stored date differing, so concurrent runs cannot
    /// regress the marker.
    async fn mark_sent(&self, email: &SubscriberEmail, date: NaiveDate)
        -> Result<(), anyhow::Error>;
}

/// The weekly article pull that feeds content generation. An empty result is
/// fatal to the whole run.
#[async_trait]
pub trait NewsSource {
    async fn fetch_weekly(&self) -> Result<Vec<Article>, anyhow::Error>;
}

/// The expensive, rate-limited briefing generation call. Invoked at most once
/// per run, by the first eligible subscriber.
#[async_trait]
pub trait ContentGenerator {
    async fn generate(&self, articles: &[Article]) -> Result<String, anyhow::Error>;
}

/// Persists the generated issue for the web archive. Failure is logged only.
#[async_trait]
pub trait Archiver {
    async fn persist(&self, issue_label: &str, body: &str) -> Result<(), anyhow::Error>;
}

/// Delivers one rendered email. Failure is fatal only to that subscriber.
#[async_trait]
pub trait MailTransport {
    async fn send(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html_body: &str,
    ) -> Result<(), anyhow::Error>;
}

/// Failures that abort a run before any subscriber is processed. Everything
/// else is contained inside the loop.
#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to fetch this week's articles")]
    FetchArticles(#[source] anyhow::Error),
    #[error("No usable articles found for this week's briefing")]
    NoMaterial,
    #[error("Failed to load the subscriber list")]
    ListSubscribers(#[source] anyhow::Error),
}

impl std::fmt::Debug for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}
