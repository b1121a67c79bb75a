use crate::graphql::GraphQLSchema;
use crate::observability::metrics;
use axum::{
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use std::net::SocketAddr;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "collectives-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GraphiQL IDE endpoint
async fn graphiql() -> impl IntoResponse {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Prometheus scrape endpoint
async fn metrics_handler() -> Response {
    match metrics::render() {
        Some(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// GraphQL endpoint handler
async fn graphql_handler(Extension(schema): Extension<GraphQLSchema>, body: String) -> Response {
    let request = match serde_json::from_str::<async_graphql::Request>(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected GraphQL request body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("Invalid request: {e}")})),
            )
                .into_response();
        }
    };

    let operation = request
        .operation_name
        .clone()
        .unwrap_or_else(|| "anonymous".to_string());
    let started = Instant::now();
    let response = schema.execute(request).await;
    let elapsed = started.elapsed().as_secs_f64();

    metrics::graphql::request(&operation, elapsed);
    metrics::graphql::errors(response.errors.len());
    debug!(
        "GraphQL operation {} finished in {:.3}s with {} error(s)",
        operation,
        elapsed,
        response.errors.len()
    );

    Json(response).into_response()
}

/// Create the HTTP server router
pub fn create_router(schema: GraphQLSchema) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/graphiql", get(graphiql))
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(Extension(schema))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server
pub async fn start_server(schema: GraphQLSchema, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(schema);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    info!("HTTP server listening on http://{}", addr);
    info!("GraphQL:  http://{}/graphql", addr);
    info!("GraphiQL: http://{}/graphiql", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
