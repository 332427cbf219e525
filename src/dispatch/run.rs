use chrono::{DateTime, Utc};

use crate::dispatch::briefing::BriefingCache;
use crate::dispatch::eligibility;
use crate::dispatch::render;
use crate::dispatch::{
    Archiver, ContentGenerator, DispatchError, MailTransport, NewsSource, SubscriberStore,
};
use crate::domain::subscriber::Subscriber;

/// What one run did, reported back to the trigger caller. Per-subscriber
/// failures only show up here and in the logs, never as an HTTP error.
#[derive(Debug, Default, serde::Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    pub generated: bool,
}

/// One execution of the dispatch job: fetch the week's material, then walk the
/// subscriber list sequentially, gating each subscriber on their own local
/// calendar.
///
/// `now` is captured by the caller once, before the loop starts, so every
/// subscriber in a run is judged against the same instant. `force` bypasses
/// the delivery window and the already-sent check for manual runs.
#[tracing::instrument(
    name = "Newsletter dispatch run",
    skip(store, news, generator, archiver, transport, base_url),
    fields(force = %force)
)]
pub async fn run_dispatch(
    store: &impl SubscriberStore,
    news: &impl NewsSource,
    generator: &impl ContentGenerator,
    archiver: &impl Archiver,
    transport: &impl MailTransport,
    base_url: &str,
    now: DateTime<Utc>,
    force: bool,
) -> Result<DispatchReport, DispatchError> {
    let articles = news
        .fetch_weekly()
        .await
        .map_err(DispatchError::FetchArticles)?;

    if articles.is_empty() {
        return Err(DispatchError::NoMaterial);
    }

    let subscribers = store
        .list_all()
        .await
        .map_err(DispatchError::ListSubscribers)?;

    tracing::info!(
        "Evaluating {} subscribers against {} articles",
        subscribers.len(),
        articles.len()
    );

    let issue_label = render::issue_label(now);
    let mut cache = BriefingCache::new();
    let mut report = DispatchReport::default();

    for subscriber in &subscribers {
        let decision = eligibility::evaluate(
            now,
            subscriber.timezone.tz(),
            subscriber.last_sent_date,
            force,
        );

        tracing::info!(
            "Subscriber {} | day: {} | hour: {} | eligible: {}",
            subscriber.email,
            decision.local_weekday,
            decision.local_hour,
            decision.send_now
        );

        if !decision.send_now {
            report.skipped += 1;
            continue;
        }

        let shared_body = cache
            .get_or_generate(generator, archiver, &articles, &issue_label)
            .await
            .to_string();

        match deliver(
            store,
            transport,
            subscriber,
            &shared_body,
            &issue_label,
            base_url,
            decision.local_date,
        )
        .await
        {
            Ok(()) => report.sent += 1,
            Err(err) => {
                // One subscriber failing never aborts the run. Their marker is
                // untouched, so a later run retries them.
                tracing::error!("Dispatch failed for {}: {:?}", subscriber.email, err);
                report.failed += 1;
            }
        }
    }

    report.generated = cache.is_generated();

    tracing::info!(
        "Run complete: {} sent, {} skipped, {} failed",
        report.sent,
        report.skipped,
        report.failed
    );

    Ok(report)
}

/// Sends one issue and stamps the subscriber on success. The marker update
/// strictly follows confirmed transport success: a transport failure must
/// leave `last_sent_date` untouched.
async fn deliver(
    store: &impl SubscriberStore,
    transport: &impl MailTransport,
    subscriber: &Subscriber,
    shared_body: &str,
    issue_label: &str,
    base_url: &str,
    local_date: chrono::NaiveDate,
) -> Result<(), anyhow::Error> {
    let subject = render::issue_subject(issue_label);
    let html = render::issue_html(subscriber, shared_body, issue_label, base_url);

    transport.send(&subscriber.email, &subject, &html).await?;

    store.mark_sent(&subscriber.email, local_date).await?;

    Ok(())
}
