use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context as _;
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::prelude::*;

use graphql_api::config::Config;
use graphql_api::schema::{build_schema, AppSchema};
use graphql_api::DataContext;

async fn graphql_handler(schema: web::Data<AppSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn health_handler() -> &'static str {
    "ok"
}

/// SDL (Schema Definition Language) endpoint for client code generation
async fn schema_handler(schema: web::Data<AppSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(schema.sdl())
}

async fn playground_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn metrics_handler() -> HttpResponse {
    match db_pool::render_metrics() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // JSON logs with span context for log aggregation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,graphql_api=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    info!("Starting GraphQL API...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let ctx = DataContext::connect(&config.database)
        .await
        .context("Failed to initialise data context")?;

    info!("Data context initialised");

    let schema = build_schema(ctx.clone(), &config.graphql);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        workers = config.server.workers,
        playground = config.graphql.playground,
        "GraphQL API starting on http://{}",
        bind_addr
    );

    let playground = config.graphql.playground;
    let server = HttpServer::new(move || {
        let app = App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(schema.clone()))
            .route("/graphql", web::post().to(graphql_handler))
            .route("/graphql/schema", web::get().to(schema_handler))
            .route("/health", web::get().to(health_handler))
            .route("/metrics", web::get().to(metrics_handler));

        if playground {
            app.route("/playground", web::get().to(playground_handler))
        } else {
            app
        }
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr));

    // Release the pool on both the bind-failure and the normal shutdown path
    let result = match server {
        Ok(server) => server.run().await.context("HTTP server failed"),
        Err(e) => Err(e),
    };

    ctx.close().await;
    info!("GraphQL API stopped");

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(App::new().route("/health", web::get().to(health_handler))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "ok");
    }

    #[actix_web::test]
    async fn test_graphql_endpoint_executes_query() {
        let schema = build_schema(DataContext::in_memory(), &Default::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(schema))
                .route("/graphql", web::post().to(graphql_handler)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/graphql")
            .set_json(serde_json::json!({ "query": "{ allUsers { id } }" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["allUsers"], serde_json::json!([]));
    }
}
