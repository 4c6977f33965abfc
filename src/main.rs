use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use log::{info, warn};
use warp::Filter;

use econostat_dashboard::routes;
use econostat_dashboard::services::sheets::{SheetsConfig, SheetsStore};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 3030");
        "3030".to_string()
    });
    let port: u16 = port_str.parse().expect("PORT must be a number");
    info!("Using PORT: {}", port);

    let spreadsheet_id = env::var("SPREADSHEET_ID").expect("SPREADSHEET_ID must be set");
    let service_account_json_path =
        env::var("SERVICE_ACCOUNT_JSON_PATH").expect("SERVICE_ACCOUNT_JSON_PATH must be set");
    let sheet_name = env::var("SHEET_NAME").unwrap_or_else(|_| {
        warn!("$SHEET_NAME not set, defaulting to Triwulanan");
        "Triwulanan".to_string()
    });

    let store = Arc::new(SheetsStore::new(SheetsConfig {
        spreadsheet_id,
        service_account_json_path,
        sheet_name,
    }));

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(store).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
