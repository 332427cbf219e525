use crate::dispatch::{Archiver, Article, ContentGenerator};

/// Body used when generation fails; the run keeps going with this instead of
/// retrying the generator for every remaining subscriber.
pub const FALLBACK_BODY: &str =
    "<p style=\"color: #ffffff;\">Briefing generation failed. Visit the web archive for this week's issue.</p>";

/// Run-scoped cache for the shared briefing body.
///
/// The first eligible subscriber triggers generation and a one-shot archive
/// persist; every later subscriber in the same run gets the cached body. A run
/// with zero eligible subscribers never pays for either.
pub struct BriefingCache {
    body: Option<String>,
}

impl BriefingCache {
    pub fn new() -> Self {
        Self { body: None }
    }

    pub fn is_generated(&self) -> bool {
        self.body.is_some()
    }

    pub async fn get_or_generate(
        &mut self,
        generator: &impl ContentGenerator,
        archiver: &impl Archiver,
        articles: &[Article],
        issue_label: &str,
    ) -> &str {
        if self.body.is_none() {
            tracing::info!("Generating the shared briefing body");

            let body = match generator.generate(articles).await {
                Ok(body) => body,
                Err(err) => {
                    tracing::error!("Briefing generation failed: {:?}", err);
                    FALLBACK_BODY.to_string()
                }
            };

            // Archiving is attempted exactly once per run, whatever its
            // outcome; a failed persist never blocks sending.
            if let Err(err) = archiver.persist(issue_label, &body).await {
                tracing::error!("Failed to archive issue {}: {:?}", issue_label, err);
            }

            self.body = Some(body);
        }

        self.body.as_deref().unwrap()
    }
}

impl Default for BriefingCache {
    fn default() -> Self {
        Self::new()
    }
}
