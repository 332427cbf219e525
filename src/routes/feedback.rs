use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::subscriber_email::SubscriberEmail;

#[derive(Deserialize, Debug)]
pub struct FeedbackBody {
    pub email: String,
    pub name: String,
    pub message: String,
}

#[tracing::instrument(
    name = "Feedback handler",
    skip(body, db_pool),
    fields(subscriber_email = %body.email)
)]
pub async fn handle_create_feedback(
    body: web::Json<FeedbackBody>,
    db_pool: web::Data<PgPool>,
) -> impl Responder {
    let email = match SubscriberEmail::parse(body.email.clone()) {
        Ok(email) => email,
        Err(err) => {
            tracing::error!("Validation error: {:?}", err);
            return HttpResponse::BadRequest().finish();
        }
    };

    if body.message.trim().is_empty() {
        return HttpResponse::BadRequest().finish();
    }

    match insert_feedback(&email, &body.name, &body.message, &db_pool).await {
        Ok(()) => HttpResponse::Created().finish(),
        Err(err) => {
            tracing::error!("Failed to store feedback: {:?}", err);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(name = "Insert feedback into the database", skip(message, db_pool))]
async fn insert_feedback(
    email: &SubscriberEmail,
    name: &str,
    message: &str,
    db_pool: &web::Data<PgPool>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO feedback (id, email, name, message, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email.as_ref())
    .bind(name)
    .bind(message)
    .bind(Utc::now())
    .execute(db_pool.get_ref())
    .await?;

    Ok(())
}
