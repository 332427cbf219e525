use actix_web::{HttpRequest, HttpResponse, Responder};

/// Liveness probe for the hosting platform and the scheduler; replies 200
/// with an empty body.
#[tracing::instrument(name = "Health Check handler")]
pub async fn health_check(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok()
}
