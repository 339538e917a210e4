//! Route table → axum router.

use axum::{
    extract::{Request, State},
    handler::Handler,
    response::Response,
    routing::MethodRouter,
    Router,
};

use crate::http::health::health_handler;
use crate::http::server::AppState;
use crate::routing::table::{RouteEntry, RouteMethod, RouteTable, RouteTarget};

/// Turn the table into an axum router. Entries sharing a path are merged
/// into one method router; unmatched requests fall through to the default
/// 404.
pub fn routes(table: &RouteTable) -> Router<AppState> {
    let mut by_path: Vec<(&str, MethodRouter<AppState>)> = Vec::new();

    for entry in table.entries() {
        let existing = by_path
            .iter()
            .position(|(path, _)| *path == entry.path)
            .map(|idx| by_path.remove(idx).1);

        let method_router = match entry.target {
            RouteTarget::Health => bind(existing, entry.method, health_handler),
            RouteTarget::Protocol => bind(existing, entry.method, protocol_handler),
            RouteTarget::Api(operation) => bind(
                existing,
                entry.method,
                move |State(state): State<AppState>, request: Request| async move {
                    state.api.call(operation, request).await
                },
            ),
        };
        by_path.push((entry.path.as_str(), method_router));
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            router.route(path, method_router)
        })
}

/// Log the table, used in debug mode.
pub fn log_routes(table: &RouteTable) {
    for RouteEntry { method, path, target } in table.entries() {
        tracing::debug!(method = method.as_str(), path = %path, target = ?target, "Route registered");
    }
}

fn bind<H, T>(
    existing: Option<MethodRouter<AppState>>,
    method: RouteMethod,
    handler: H,
) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    let method_router = existing.unwrap_or_else(MethodRouter::new);
    match method.method_filter() {
        Some(filter) => method_router.on(filter, handler),
        None => method_router.fallback(handler),
    }
}

async fn protocol_handler(State(state): State<AppState>, request: Request) -> Response {
    state.protocol.handle(request).await
}
