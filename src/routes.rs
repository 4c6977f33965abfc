// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::dashboard::{get_dashboard, get_years, DashboardQuery};
use crate::handlers::error::{ApiError, ApiErrorKind};
use crate::handlers::records::{get_records, submit_record};
use crate::services::sheets::SheetsStore;

// Map our custom rejections to HTTP statuses.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = match api_error.kind {
            ApiErrorKind::Store => warp::http::StatusCode::BAD_GATEWAY,
            ApiErrorKind::BadRequest => warp::http::StatusCode::BAD_REQUEST,
            ApiErrorKind::NotFound => warp::http::StatusCode::NOT_FOUND,
        };
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = e.to_string();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid query parameters".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    store: Arc<SheetsStore>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let store_filter = warp::any().map(move || store.clone());

    let records_route = warp::path!("api" / "v1" / "records")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(get_records);

    let submit_route = warp::path!("api" / "v1" / "records")
        .and(warp::post())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(submit_record);

    let years_route = warp::path!("api" / "v1" / "years")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(get_years);

    let dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::get())
        .and(warp::query::<DashboardQuery>())
        .and(store_filter.clone())
        .and_then(get_dashboard);

    info!("All routes configured successfully.");

    records_route
        .or(submit_route)
        .or(years_route)
        .or(dashboard_route)
        .recover(handle_rejection)
}
