use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use chrono::Utc;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use sqlx::PgPool;

use crate::dispatch::run::run_dispatch;
use crate::dispatch::DispatchError;
use crate::email_client::EmailClient;
use crate::llm_client::LlmClient;
use crate::news_client::NewsClient;
use crate::startup::ApplicationBaseUrl;
use crate::store::{PgArchive, PgSubscriberStore};

/// Shared secret the external scheduler has to present to trigger a run.
pub struct CronSecret(pub Secret<String>);

#[derive(Deserialize, Debug)]
pub struct DispatchParameters {
    /// Bypasses the delivery window and already-sent checks; manual runs only.
    #[serde(default)]
    pub force: bool,
}

/// Trigger endpoint for the hourly scheduler tick. The run itself decides,
/// per subscriber, whether this tick is their Monday-morning delivery moment.
#[tracing::instrument(
    name = "Newsletter dispatch trigger",
    skip(request, parameters, db_pool, email_client, news_client, llm_client, base_url, cron_secret),
    fields(force = %parameters.force)
)]
pub async fn handle_dispatch_newsletter(
    request: HttpRequest,
    parameters: web::Query<DispatchParameters>,
    db_pool: web::Data<PgPool>,
    email_client: web::Data<EmailClient>,
    news_client: web::Data<NewsClient>,
    llm_client: web::Data<LlmClient>,
    base_url: web::Data<ApplicationBaseUrl>,
    cron_secret: web::Data<CronSecret>,
) -> Result<HttpResponse, DispatchNewsletterError> {
    authorize(&request, &cron_secret)?;

    let store = PgSubscriberStore::new(db_pool.get_ref().clone());
    let archive = PgArchive::new(db_pool.get_ref().clone());

    // Partial per-subscriber failures surface only in the report counters and
    // the logs; the endpoint fails only when the run could not start at all.
    let report = run_dispatch(
        &store,
        news_client.get_ref(),
        llm_client.get_ref(),
        &archive,
        email_client.get_ref(),
        base_url.0.as_str(),
        Utc::now(),
        parameters.force,
    )
    .await?;

    Ok(HttpResponse::Ok().json(report))
}

fn authorize(
    request: &HttpRequest,
    cron_secret: &CronSecret,
) -> Result<(), DispatchNewsletterError> {
    let expected = format!("Bearer {}", cron_secret.0.expose_secret());
    let provided = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected.as_str()) {
        return Err(DispatchNewsletterError::Unauthorized);
    }

    Ok(())
}

#[derive(thiserror::Error)]
pub enum DispatchNewsletterError {
    #[error("Invalid or missing dispatch bearer token.")]
    Unauthorized,
    #[error(transparent)]
    RunFailed(#[from] DispatchError),
}

impl std::fmt::Debug for DispatchNewsletterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for DispatchNewsletterError {
    fn status_code(&self) -> StatusCode {
        match self {
            DispatchNewsletterError::Unauthorized => StatusCode::UNAUTHORIZED,
            DispatchNewsletterError::RunFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
