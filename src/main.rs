#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else, clippy::missing_errors_doc)]

use roster::{
    config::RuntimeConfiguration,
    routes::{
        dashboard::internal_get_dashboard,
        index::get_index_route,
        students::{
            internal_get_edit_student_form, internal_get_new_student_form,
            internal_get_student_avatar, internal_post_cancel_student_form,
            internal_post_clear_storage, internal_put_student_form,
        },
    },
    state::RosterState,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

async fn shutdown_signal(state: RosterState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.sensible_shutdown().await;
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        // a missing .env just means everything comes from the environment or the defaults
        eprintln!("not loading .env: {e}");
    }

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = RosterState::new(config);
    state.spawn_course_load();

    let trace_layer = TraceLayer::new_for_http();

    let app = Router::new()
        .route("/", get(get_index_route))
        .route("/internal/dashboard", get(internal_get_dashboard))
        .route(
            "/internal/students/new_form",
            get(internal_get_new_student_form),
        )
        .route(
            "/internal/students/edit_form",
            get(internal_get_edit_student_form),
        )
        .route("/internal/students/form", put(internal_put_student_form))
        .route(
            "/internal/students/cancel",
            post(internal_post_cancel_student_form),
        )
        .route(
            "/internal/students/avatar",
            get(internal_get_student_avatar),
        )
        .route(
            "/internal/storage/clear",
            post(internal_post_clear_storage),
        )
        .layer(trace_layer)
        .with_state(state.clone());

    let server_ip = state.config().server_ip().to_string();
    let listener = TcpListener::bind(&server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("unable to serve app");
}
