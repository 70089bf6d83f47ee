use actix_web::HttpResponse;

/// Liveness probe; independent of whether a snapshot exists.
pub async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().json("OK")
}
