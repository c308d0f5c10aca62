use crate::allocator;
use crate::catalog::Catalog;
use crate::data::{AllocationInput, AllocationReport};
use axum::{Json, Router, routing::post};

async fn allocate_handler(
    Json(input): Json<AllocationInput>,
) -> Result<Json<AllocationReport>, (axum::http::StatusCode, String)> {
    let catalog = Catalog::load(input.rooms)
        .map_err(|e| (axum::http::StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(allocator::allocate(&catalog, &input.sessions)))
}

pub async fn run_server() {
    let app = Router::new().route("/v1/allocation/solve", post(allocate_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .unwrap();

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
