use crate::domain::catalog;
use actix_web::HttpResponse;

/// The player catalog consumed by the mobile UI shell.
#[tracing::instrument(name = "Listing player channels")]
pub async fn list_channels() -> HttpResponse {
    HttpResponse::Ok().json(catalog::built_in())
}
