use std::time::Duration;

use actix_web::{HttpResponse, web};
use once_cell::sync::Lazy;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ApiError;

/// Nominatim requires an identifying User-Agent; browsers cannot send one
/// cross-origin, so the backend proxies the lookup.
static HTTP: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent("JagaKampung/1.0 (ronda attendance)")
        .timeout(Duration::from_secs(30))
        .build()
        .expect("reqwest client")
});

#[derive(Deserialize, IntoParams)]
pub struct GeocodeQuery {
    pub lat: f64,
    pub lon: f64,
}

/// Reverse-geocode a coordinate into a display address. Display-only: the
/// attendance record stores raw coordinates regardless.
#[utoipa::path(
    get,
    path = "/api/location/reverse-geocode",
    params(GeocodeQuery),
    responses(
        (status = 200, description = "Geocoder response, passed through"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Geocoder unreachable")
    ),
    security(("bearer_auth" = [])),
    tag = "Location"
)]
pub async fn reverse_geocode(
    _auth: AuthUser,
    config: web::Data<Config>,
    query: web::Query<GeocodeQuery>,
) -> Result<HttpResponse, ApiError> {
    let response = HTTP
        .get(&config.geocoder_url)
        .query(&[
            ("format", "jsonv2".to_string()),
            ("lat", query.lat.to_string()),
            ("lon", query.lon.to_string()),
        ])
        .send()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ApiError::Upstream(format!(
            "geocoder answered {}",
            response.status()
        )));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(HttpResponse::Ok().json(body))
}
