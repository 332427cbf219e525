use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::PgPool;

use crate::domain::subscriber_email::SubscriberEmail;

#[derive(Deserialize, Debug)]
pub struct UnsubscribeBody {
    pub email: String,
}

#[tracing::instrument(
    name = "Unsubscribe handler",
    skip(body, db_pool),
    fields(subscriber_email = %body.email)
)]
pub async fn handle_unsubscribe(
    body: web::Json<UnsubscribeBody>,
    db_pool: web::Data<PgPool>,
) -> impl Responder {
    let email = match SubscriberEmail::parse(body.email.clone()) {
        Ok(email) => email,
        Err(err) => {
            tracing::error!("Validation error: {:?}", err);
            return HttpResponse::BadRequest().finish();
        }
    };

    match delete_subscription(&email, &db_pool).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => {
            tracing::error!("Failed to delete subscriber: {:?}", err);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(name = "Delete a subscriber from the database", skip(db_pool))]
async fn delete_subscription(
    email: &SubscriberEmail,
    db_pool: &web::Data<PgPool>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM subscribers
        WHERE email = $1
        "#,
    )
    .bind(email.as_ref())
    .execute(db_pool.get_ref())
    .await?;

    Ok(())
}
