use academy_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let admin_api = Router::new()
        .route(
            "/api/admin/courses",
            get(routes::admin::list_courses).post(routes::admin::create_course),
        )
        .route("/api/admin/courses/:id", get(routes::admin::get_course))
        .route(
            "/api/admin/assignments",
            get(routes::admin::list_assignments).post(routes::admin::create_assignment),
        )
        .route(
            "/api/admin/assignments/:id",
            get(routes::admin::get_assignment)
                .patch(routes::admin::update_assignment)
                .delete(routes::admin::delete_assignment),
        )
        .route(
            "/api/admin/assignments/:id/submissions",
            get(routes::admin::list_assignment_submissions),
        )
        .layer(axum::middleware::from_fn(
            academy_backend::middleware::auth::require_admin_or_trainer,
        ))
        .layer(axum::middleware::from_fn_with_state(
            academy_backend::middleware::rate_limit::new_rps_state(config.admin_rps),
            academy_backend::middleware::rate_limit::rps_middleware,
        ));

    let student_api = Router::new()
        .route(
            "/api/assignments",
            get(routes::assignments::list_assignments),
        )
        .route(
            "/api/assignments/:id",
            get(routes::assignments::get_assignment),
        )
        .route(
            "/api/assignments/:id/submit",
            post(routes::assignments::submit_assignment),
        )
        .route("/api/run", post(routes::assignments::run_code))
        .layer(axum::middleware::from_fn(
            academy_backend::middleware::auth::require_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            academy_backend::middleware::rate_limit::new_rps_state(config.student_rps),
            academy_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(admin_api)
        .merge(student_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
