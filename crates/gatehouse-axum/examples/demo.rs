//! Demo server: one master schema, three guarded routes.
//!
//! ```text
//! curl 'http://127.0.0.1:3030/greet?firstName=Ada'      # 200
//! curl 'http://127.0.0.1:3030/greet'                    # 400 {"firstName": ...}
//! curl 'http://127.0.0.1:3030/users/7'                  # 200
//! curl 'http://127.0.0.1:3030/users/abc'                # 400 {"userId": ...}
//! curl -X POST 'http://127.0.0.1:3030/signup' \
//!   -H 'content-type: application/json' \
//!   -d '{"email": "ada@example.com", "password": "correct horse"}'
//! ```

use std::collections::HashMap;

use axum::extract::{Json, Path, Query};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use gatehouse_axum::{valid_body, valid_params, valid_query, FieldRule, Schema, SchemaRegistry};

/// The application's canonical field rules.
fn master_schema() -> Schema {
    let name = || {
        FieldRule::new(json!({"type": "string", "pattern": "^[A-Za-z][A-Za-z ]*$"})).required()
    };
    Schema::builder()
        .field(
            "userId",
            FieldRule::new(json!({"type": "integer", "minimum": 1}))
                .required()
                .label("User ID"),
        )
        .field("firstName", name().label("First Name"))
        .field("lastName", name().label("Last Name"))
        .field(
            "email",
            FieldRule::new(json!({
                "type": "string",
                "pattern": "^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$"
            }))
            .required(),
        )
        .field(
            "password",
            FieldRule::new(json!({"type": "string", "minLength": 8, "maxLength": 100}))
                .required(),
        )
        .build()
}

async fn greet(Query(params): Query<HashMap<String, String>>) -> String {
    format!("Hello, {}!", params["firstName"])
}

async fn get_user(Path(user_id): Path<u64>) -> String {
    format!("user {user_id}")
}

async fn signup(Json(body): Json<Value>) -> String {
    format!("registered {}", body["email"].as_str().unwrap_or("?"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let registry = SchemaRegistry::with_master(master_schema());

    let app = Router::new()
        .route("/", get(|| async { "Hello World!" }))
        .route(
            "/greet",
            get(greet).layer(valid_query(&registry, ["r:firstName"])?),
        )
        .route(
            "/users/{userId}",
            get(get_user).layer(valid_params(&registry, ["userId"])?),
        )
        .route(
            "/signup",
            post(signup).layer(valid_body(&registry, ["r:email", "r:password", "o:firstName"])?),
        )
        .layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], 3030));
    tracing::info!("demo app listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
