//! JWKS exposure, built from the active [`crate::token::keystore::KeyStore`]
//! rather than a single fixed key pair.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::token::keystore::jwk_modulus_exponent;
use crate::AppState;

#[derive(Serialize)]
struct Jwk {
    kty: &'static str,
    alg: &'static str,
    #[serde(rename = "use")]
    usage: &'static str,
    kid: String,
    n: String,
    e: String,
}

#[derive(Serialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

/// GET /.well-known/jwks.json
pub async fn jwks(State(state): State<AppState>) -> impl IntoResponse {
    let keys = state
        .keys
        .key_ids()
        .into_iter()
        .filter_map(|kid| {
            let public_key = state.keys.public_key(kid)?;
            let (n, e) = jwk_modulus_exponent(public_key);
            Some(Jwk {
                kty: "RSA",
                alg: "RS256",
                usage: "sig",
                kid: kid.to_string(),
                n,
                e,
            })
        })
        .collect();

    (
        [
            (header::CACHE_CONTROL, "public, max-age=3600"),
            (header::CONTENT_TYPE, "application/json"),
        ],
        Json(Jwks { keys }),
    )
}
