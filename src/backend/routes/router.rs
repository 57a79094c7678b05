/**
 * Router Configuration
 *
 * One router per service role. Every router carries the same outer layers:
 * permissive CORS (micro-frontends are embedded cross-origin) and HTTP
 * tracing.
 *
 * # Route Priority
 *
 * On the shell, static routes (`/health`, `/api/...`, `/static`) are
 * matched before the `/{service}` passthrough, so a micro-frontend cannot
 * shadow them.
 */

use crate::backend::chat::handlers::{chat_health, chat_page, handle_ws_upgrade};
use crate::backend::chat::ChatHub;
use crate::backend::server::state::ShellState;
use crate::backend::shell::{
    list_microfrontends, passthrough, passthrough_root, proxy_api, proxy_api_root, shell_health,
    shell_index,
};
use crate::backend::tasks::handlers::{
    create_task, delete_task, get_task, list_tasks, task_stats, tasks_health, tasks_page, update_task,
};
use crate::backend::tasks::TasksState;
use axum::{
    routing::{any, get},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Directory served under `/static` by the shell
pub const STATIC_DIR: &str = "static";

/// Shell server routes
///
/// # Routes
///
/// - `GET /` - shell document
/// - `GET /health`
/// - `GET /api/microfrontends`
/// - `* /api/proxy/{service}`, `* /api/proxy/{service}/{*endpoint}`
/// - `GET /static/*` - shell assets
/// - `* /{service}`, `* /{service}/{*path}` - micro-frontend passthrough,
///   including WebSocket upgrades
pub fn create_shell_router(state: ShellState) -> Router<()> {
    let router = Router::new()
        .route("/", get(shell_index))
        .route("/health", get(shell_health))
        .route("/api/microfrontends", get(list_microfrontends))
        .route("/api/proxy/{service}", any(proxy_api_root))
        .route("/api/proxy/{service}/", any(proxy_api_root))
        .route("/api/proxy/{service}/{*endpoint}", any(proxy_api))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .route("/{service}", any(passthrough_root))
        .route("/{service}/", any(passthrough_root))
        .route("/{service}/{*path}", any(passthrough))
        .with_state(state);

    with_common_layers(router)
}

/// Chat server routes: `GET /`, `GET /ws`, `GET /health`
pub fn create_chat_router(hub: ChatHub) -> Router<()> {
    let router = Router::new()
        .route("/", get(chat_page))
        .route("/ws", get(handle_ws_upgrade))
        .route("/health", get(chat_health))
        .with_state(hub);

    with_common_layers(router)
}

/// Tasks server routes
pub fn create_tasks_router(store: TasksState) -> Router<()> {
    let router = Router::new()
        .route("/", get(tasks_page))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
        .route("/api/stats", get(task_stats))
        .route("/health", get(tasks_health))
        .with_state(store);

    with_common_layers(router)
}

fn with_common_layers(router: Router<()>) -> Router<()> {
    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
