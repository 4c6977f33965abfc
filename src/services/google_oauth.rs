// src/services/google_oauth.rs
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The fields we need from a Google service account JSON file; the rest of
/// the file is ignored on deserialization.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    private_key: String,
    client_email: String,
    token_uri: String,
}

/// Claims for the service-account JWT grant. `scope` limits the token to the
/// Sheets API.
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    assertion: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Read the service account JSON and exchange a signed RS256 JWT for a
/// Bearer token valid for about an hour.
pub async fn fetch_access_token_from_file(service_account_json_path: &str) -> Result<String> {
    let json_bytes = std::fs::read(service_account_json_path)?;
    let key: ServiceAccountKey = serde_json::from_slice(&json_bytes)?;

    let iat = Utc::now();
    let exp = iat + Duration::minutes(59);
    let claims = Claims {
        iss: key.client_email.clone(),
        scope: "https://www.googleapis.com/auth/spreadsheets".to_string(),
        aud: key.token_uri.clone(),
        exp: exp.timestamp(),
        iat: iat.timestamp(),
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    let jwt = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

    let req_body = TokenRequest {
        grant_type: "urn:ietf:params:oauth:grant-type:jwt-bearer",
        assertion: &jwt,
    };

    let client = Client::new();
    let resp = client
        .post(&key.token_uri)
        .json(&req_body)
        .send()
        .await?
        .error_for_status()?
        .json::<TokenResponse>()
        .await?;

    Ok(resp.access_token)
}
