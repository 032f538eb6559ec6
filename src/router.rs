use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use schoolhub_observability::{logging_middleware, metrics_middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::middleware::auth::require_auth;
use crate::middleware::rate_limit::rate_limit_auth;
use crate::middleware::role::{require_admin, require_staff};
use crate::modules::auth::router::init_auth_router;
use crate::modules::courses::router::{init_admin_courses_router, init_courses_router};
use crate::modules::enrollments::router::init_enrollments_router;
use crate::modules::health::router::init_health_router;
use crate::modules::library::router::{init_circulation_router, init_library_router};
use crate::modules::users::router::{init_admin_users_router, init_users_router};
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    let authenticated = || middleware::from_fn_with_state(state.clone(), require_auth);
    let admin_only = || middleware::from_fn_with_state(state.clone(), require_admin);
    let staff_only = || middleware::from_fn_with_state(state.clone(), require_staff);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .merge(init_health_router())
        .nest(
            "/api",
            Router::new()
                .nest(
                    "/auth",
                    init_auth_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        rate_limit_auth,
                    )),
                )
                .nest("/users", init_users_router().route_layer(authenticated()))
                .nest(
                    "/admin",
                    Router::new()
                        .nest("/users", init_admin_users_router())
                        .nest("/courses", init_admin_courses_router())
                        .route_layer(admin_only()),
                )
                .nest("/courses", init_courses_router().route_layer(authenticated()))
                .nest(
                    "/enrollments",
                    init_enrollments_router().route_layer(authenticated()),
                )
                .nest(
                    "/library",
                    init_library_router()
                        .nest(
                            "/circulation",
                            init_circulation_router().route_layer(staff_only()),
                        )
                        .route_layer(authenticated()),
                ),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
