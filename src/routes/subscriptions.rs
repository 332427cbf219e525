use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::new_subscriber::{NewSubscriber, NewSubscriberBody};
use crate::email_client::EmailClient;

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, db_pool, email_client),
    fields(
        subscriber_email = %body.email,
        subscriber_name = %body.name,
        subscriber_timezone = %body.timezone
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<NewSubscriberBody>,
    db_pool: web::Data<PgPool>,
    email_client: web::Data<EmailClient>,
) -> impl Responder {
    let new_subscriber: NewSubscriber = match body.try_into() {
        Ok(subscriber) => subscriber,
        Err(err) => {
            tracing::error!("Validation error: {:?}", err);
            return HttpResponse::BadRequest().finish();
        }
    };

    if let Err(err) = upsert_subscription(&new_subscriber, &db_pool).await {
        tracing::error!("Failed to upsert new subscriber: {:?}", err);
        return HttpResponse::InternalServerError().finish();
    }

    // A failed welcome email is not worth bouncing the signup over.
    if let Err(err) = send_welcome_email(&email_client, &new_subscriber).await {
        tracing::error!(
            "Failed to send a welcome email to {}: {:?}",
            new_subscriber.email.as_ref(),
            err
        );
    }

    HttpResponse::Created().finish()
}

#[tracing::instrument(
    name = "Upsert a subscriber into the database",
    skip(new_subscriber, db_pool)
)]
async fn upsert_subscription(
    new_subscriber: &NewSubscriber,
    db_pool: &web::Data<PgPool>,
) -> Result<(), sqlx::Error> {
    // Subscribing twice just refreshes name and timezone; last_sent_date is
    // left alone so a re-subscribe cannot trigger a duplicate send.
    sqlx::query(
        r#"
        INSERT INTO subscribers (email, name, timezone, subscribed_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email)
        DO UPDATE SET name = EXCLUDED.name, timezone = EXCLUDED.timezone
        "#,
    )
    .bind(new_subscriber.email.as_ref())
    .bind(new_subscriber.name.as_ref())
    .bind(new_subscriber.timezone.as_ref())
    .bind(Utc::now())
    .execute(db_pool.get_ref())
    .await
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        err
    })?;

    Ok(())
}

#[tracing::instrument(name = "Send a welcome email", skip(email_client, new_subscriber))]
async fn send_welcome_email(
    email_client: &EmailClient,
    new_subscriber: &NewSubscriber,
) -> Result<(), reqwest::Error> {
    let html_body = format!(
        r#"
            <div>
                <h1>Welcome to The Signal, {}.</h1>
                <p>Your briefing arrives every Monday at 9am, your time ({}).</p>
            </div>
        "#,
        new_subscriber.name.as_ref(),
        new_subscriber.timezone.as_ref()
    );

    email_client
        .send_email(
            &new_subscriber.email,
            "THE SIGNAL: Subscription activated",
            html_body.as_str(),
        )
        .await
}
