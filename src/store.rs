use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::dispatch::{Archiver, SubscriberStore};
use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;
use crate::domain::subscriber_timezone::SubscriberTimezone;

/// Subscriber store backed by the `subscribers` table.
pub struct PgSubscriberStore {
    db_pool: PgPool,
}

impl PgSubscriberStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

/// Rebuilds the domain types from raw column values. Rows are validated on
/// insert, but a stale row must not be able to take the whole run down.
fn subscriber_from_row(
    email: String,
    name: String,
    timezone: String,
    last_sent_date: Option<NaiveDate>,
) -> Result<Subscriber, String> {
    Ok(Subscriber {
        email: SubscriberEmail::parse(email)?,
        name: SubscriberName::parse(name)?,
        timezone: SubscriberTimezone::parse(timezone)?,
        last_sent_date,
    })
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    #[tracing::instrument(name = "Fetch all subscribers", skip(self))]
    async fn list_all(&self) -> Result<Vec<Subscriber>, anyhow::Error> {
        let rows = sqlx::query(
            r#"
            SELECT email, name, timezone, last_sent_date
            FROM subscribers
            "#,
        )
        .map(|row: PgRow| {
            (
                row.get::<String, _>("email"),
                row.get::<String, _>("name"),
                row.get::<String, _>("timezone"),
                row.get::<Option<NaiveDate>, _>("last_sent_date"),
            )
        })
        .fetch_all(&self.db_pool)
        .await?;

        let subscribers = rows
            .into_iter()
            .filter_map(|(email, name, timezone, last_sent_date)| {
                match subscriber_from_row(email.clone(), name, timezone, last_sent_date) {
                    Ok(subscriber) => Some(subscriber),
                    Err(err) => {
                        // A row that no longer parses is skipped; the rest of
                        // the run is unaffected.
                        tracing::error!("Skipping subscriber {}: {}", email, err);
                        None
                    }
                }
            })
            .collect();

        Ok(subscribers)
    }

    #[tracing::instrument(name = "Stamp subscriber last_sent_date", skip(self))]
    async fn mark_sent(
        &self,
        email: &SubscriberEmail,
        date: NaiveDate,
    ) -> Result<(), anyhow::Error> {
        // Conditional on the stored date differing: the update itself is the
        // at-most-once gate for a local date, so overlapping runs cannot
        // stamp the same day twice.
        sqlx::query(
            r#"
            UPDATE subscribers
            SET last_sent_date = $2
            WHERE email = $1 AND last_sent_date IS DISTINCT FROM $2
            "#,
        )
        .bind(email.as_ref())
        .bind(date)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }
}

/// A single archived issue, served by the web archive endpoint.
#[derive(Debug, serde::Serialize)]
pub struct ArchivedIssue {
    pub week_date: String,
    pub content_html: String,
    pub created_at: DateTime<Utc>,
}

/// Issue archive backed by the `newsletter_archive` table.
pub struct PgArchive {
    db_pool: PgPool,
}

impl PgArchive {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    #[tracing::instrument(name = "Fetch the latest archived issue", skip(self))]
    pub async fn latest(&self) -> Result<Option<ArchivedIssue>, sqlx::Error> {
        sqlx::query(
            r#"
            SELECT week_date, content_html, created_at
            FROM newsletter_archive
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .map(|row: PgRow| ArchivedIssue {
            week_date: row.get("week_date"),
            content_html: row.get("content_html"),
            created_at: row.get("created_at"),
        })
        .fetch_optional(&self.db_pool)
        .await
    }
}

#[async_trait]
impl Archiver for PgArchive {
    #[tracing::instrument(name = "Archive the generated issue", skip(self, body))]
    async fn persist(&self, issue_label: &str, body: &str) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            INSERT INTO newsletter_archive (id, week_date, content_html, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(issue_label)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::subscriber_from_row;
    use chrono::NaiveDate;
    use claims::{assert_err, assert_ok};

    #[test]
    fn valid_row_is_rebuilt_into_a_subscriber() {
        let subscriber = subscriber_from_row(
            "ada@signal.dev".to_string(),
            "Ada".to_string(),
            "Europe/Madrid".to_string(),
            Some(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()),
        );

        assert_ok!(&subscriber);
        assert_eq!(
            subscriber.unwrap().last_sent_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
        );
    }

    #[test]
    fn row_with_an_unknown_timezone_is_rejected_not_panicked() {
        let subscriber = subscriber_from_row(
            "ada@signal.dev".to_string(),
            "Ada".to_string(),
            "Mars/Olympus_Mons".to_string(),
            None,
        );

        assert_err!(subscriber);
    }

    #[test]
    fn row_with_a_malformed_email_is_rejected() {
        let subscriber = subscriber_from_row(
            "not-an-email".to_string(),
            "Ada".to_string(),
            "Europe/Madrid".to_string(),
            None,
        );

        assert_err!(subscriber);
    }
}
