use actix_web::{web, HttpResponse};
use boa_supply_domain::SupplySnapshot;
use metrics::counter;

use crate::state::AppState;

use super::ApiError;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

pub async fn total_supply_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    respond(&state, "total", SupplySnapshot::total_display)
}

pub async fn circulating_supply_handler(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    respond(&state, "circulating", SupplySnapshot::circulating_display)
}

fn respond(
    state: &AppState,
    endpoint: &'static str,
    render: fn(&SupplySnapshot) -> String,
) -> Result<HttpResponse, ApiError> {
    let Some(snapshot) = state.publisher().current() else {
        counter!("api_supply_requests_total", "endpoint" => endpoint, "status" => "not_ready")
            .increment(1);
        return Err(ApiError::NotReady);
    };
    counter!("api_supply_requests_total", "endpoint" => endpoint, "status" => "ok").increment(1);
    Ok(HttpResponse::Ok()
        .content_type(TEXT_PLAIN)
        .body(render(&snapshot)))
}
