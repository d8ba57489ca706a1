//! HTTP API for restaurant-server

pub mod customer;
pub mod foods;
pub mod health;
pub mod invoices;
mod json;
pub mod menus;
pub mod notes;
pub mod order_items;
pub mod orders;
pub mod restaurants;
pub mod tables;
pub mod users;

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::{get, patch, post};
use axum::{Router, middleware};
use serde::Deserialize;
use shared::error::AppError;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::rate_limit::{login_rate_limit, reset_rate_limit, signup_rate_limit};
use crate::auth::user_auth::user_auth_middleware;
use crate::error::BoxError;
use crate::state::AppState;

pub use json::Json;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// `?restaurant_id=` filter shared by list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct RestaurantFilter {
    pub restaurant_id: Option<i64>,
}

/// Staff routes (bearer token required)
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", get(users::list_users))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Restaurants
        .route(
            "/restaurants",
            get(restaurants::list_restaurants).post(restaurants::create_restaurant),
        )
        .route(
            "/restaurants/{id}",
            get(restaurants::get_restaurant)
                .patch(restaurants::update_restaurant)
                .delete(restaurants::delete_restaurant),
        )
        // Tables
        .route("/tables", get(tables::list_tables).post(tables::create_table))
        .route(
            "/tables/{id}",
            get(tables::get_table)
                .patch(tables::update_table)
                .delete(tables::delete_table),
        )
        // Menus
        .route("/menus", get(menus::list_menus).post(menus::create_menu))
        .route(
            "/menus/{id}",
            get(menus::get_menu)
                .patch(menus::update_menu)
                .delete(menus::delete_menu),
        )
        // Foods
        .route("/foods", get(foods::list_foods).post(foods::create_food))
        .route(
            "/foods/{id}",
            get(foods::get_food)
                .patch(foods::update_food)
                .delete(foods::delete_food),
        )
        // Notes
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .patch(notes::update_note)
                .delete(notes::delete_note),
        )
        // Orders
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .patch(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/{id}/status", patch(orders::update_order_status))
        .route("/orders/{id}/items", get(orders::list_order_items))
        .route("/orders/{id}/total", get(orders::get_order_total))
        .route("/orders/{id}/invoice", get(orders::get_order_invoice))
        // Order items
        .route(
            "/order-items",
            get(order_items::list_items).post(order_items::create_item),
        )
        .route(
            "/order-items/{id}",
            get(order_items::get_item)
                .patch(order_items::update_item)
                .delete(order_items::delete_item),
        )
        // Invoices
        .route("/invoices", get(invoices::list_invoices))
        .route("/invoices/{id}", get(invoices::get_invoice))
        .route("/invoices/{id}/document", get(invoices::get_invoice_document))
        .route("/invoices/{id}/pdf", get(invoices::download_invoice_pdf))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ))
}

/// Public customer routes
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customer/restaurants/{id}", get(customer::get_restaurant))
        .route("/customer/tables/{id}", get(customer::get_table))
        .route("/customer/menus", get(customer::list_menus))
        .route("/customer/foods", get(customer::list_foods))
        .route("/customer/orders", post(customer::create_order))
        .route("/customer/orders/{id}", patch(customer::update_order))
        .route("/customer/order-items", post(customer::add_item))
        .route(
            "/customer/order-items/{id}",
            patch(customer::update_item).delete(customer::remove_item),
        )
}

/// Signup, login and password reset (rate limited per IP)
fn account_routes(state: &AppState) -> Router<AppState> {
    let signup = Router::new()
        .route("/users/signup", post(users::signup))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            signup_rate_limit,
        ));

    let login = Router::new()
        .route("/users/login", post(users::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));

    let reset = Router::new()
        .route("/users/reset-password-otp", post(users::request_password_reset))
        .route("/users/reset-password", post(users::reset_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            reset_rate_limit,
        ));

    signup.merge(login).merge(reset)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parse_origins(origins))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

/// Errors raised by the tower stack (not by handlers)
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request exceeded its deadline");
        AppError::timeout()
    } else {
        AppError::internal(format!("Unhandled middleware error: {err}"))
    }
}

/// Create the combined router with the full middleware stack
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(account_routes(&state))
        .merge(customer_routes())
        .merge(protected_routes(&state))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors)
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user_auth::create_token;
    use crate::config::{Config, EmailTransport};
    use crate::email::testing::RecordingNotifier;
    use crate::orders::TransitionPolicy;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use shared::error::ErrorCode;
    use shared::models::{User, UserRole};
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    /// State whose pool never connects; only routes that fail before
    /// touching the database are exercised.
    fn test_state() -> AppState {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://restaurant@localhost/restaurant_test")
            .unwrap();
        let config = Config {
            database_url: "postgres://restaurant@localhost/restaurant_test".into(),
            http_port: 0,
            environment: "test".into(),
            jwt_secret: SECRET.into(),
            jwt_expiry_hours: 1,
            cors_allowed_origins: vec!["http://localhost:3000".into()],
            trust_proxy_headers: false,
            request_timeout_secs: 5,
            otp_ttl_secs: 300,
            order_transition_policy: TransitionPolicy::Permissive,
            email_from: "noreply@restaurant.local".into(),
            email_transport: EmailTransport::Log,
        };
        AppState::from_parts(pool, config, Arc::new(RecordingNotifier::default()))
    }

    fn bearer() -> String {
        let user = User {
            id: 1,
            username: "manager".into(),
            email: "manager@example.com".into(),
            phone: "5550001111".into(),
            role: UserRole::Admin,
            avatar_url: None,
            created_at: 0,
            updated_at: 0,
        };
        format!("Bearer {}", create_token(&user, SECRET, 1).unwrap())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "restaurant-server");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], ErrorCode::NotAuthenticated.code());
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let app = create_router(test_state());
        let request = Request::get("/invoices")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], ErrorCode::TokenInvalid.code());
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        let app = create_router(test_state());
        let mut request = json_request(
            "POST",
            "/restaurants",
            serde_json::json!({ "name": "ab", "owner_id": 1, "address": "Via Roma 1" }),
        );
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, bearer().parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], ErrorCode::ValidationFailed.code());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = create_router(test_state());
        let request = json_request(
            "POST",
            "/customer/order-items",
            serde_json::json!({ "order_id": 1 }),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["code"], ErrorCode::ValidationFailed.code());
        assert!(body["message"].as_str().unwrap().contains("food_id"));
    }

    #[tokio::test]
    async fn test_reset_rejects_short_password() {
        let app = create_router(test_state());
        let request = json_request(
            "POST",
            "/users/reset-password",
            serde_json::json!({ "email": "a@b.c", "otp": "123456", "new_password": "abc" }),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_rate_limited() {
        let state = test_state();
        for _ in 0..5 {
            assert!(state.rate_limiter.check("login", "10.0.0.9", 5, 60).await);
        }
        let app = create_router(state);
        let mut request = json_request(
            "POST",
            "/users/login",
            serde_json::json!({ "identifier": "manager", "password": "secret1" }),
        );
        // A rotated X-Forwarded-For does not change the key without a trusted proxy.
        request
            .headers_mut()
            .insert("x-forwarded-for", "198.51.100.7".parse().unwrap());
        let peer: std::net::SocketAddr = "10.0.0.9:40000".parse().unwrap();
        request
            .extensions_mut()
            .insert(axum::extract::ConnectInfo(peer));

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_timeout_maps_to_503() {
        let err: BoxError = Box::new(tower::timeout::error::Elapsed::new());
        let app_err = handle_middleware_error(err).await;
        assert_eq!(app_err.code, ErrorCode::TimeoutError);
        assert_eq!(app_err.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
