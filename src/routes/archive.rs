use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

use crate::store::PgArchive;

/// Serves the most recently archived issue for the web view.
#[tracing::instrument(name = "Latest archived issue handler", skip(db_pool))]
pub async fn handle_get_latest_issue(db_pool: web::Data<PgPool>) -> impl Responder {
    let archive = PgArchive::new(db_pool.get_ref().clone());

    match archive.latest().await {
        Ok(Some(issue)) => HttpResponse::Ok().json(issue),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Failed to fetch the latest issue: {:?}", err);
            HttpResponse::InternalServerError().finish()
        }
    }
}
