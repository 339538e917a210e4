//! The static route table.
//!
//! Assembled once before the server starts and never mutated; concurrent
//! readers need no lock. Order of registration is preserved for logging.

use axum::routing::MethodFilter;

use crate::api::ApiOperation;

pub const HEALTH_PATH: &str = "/health";
pub const MCP_PATH: &str = "/mcp";
/// Bare trailing slash; the catch-all below needs a non-empty remainder.
pub const MCP_TRAILING_PATH: &str = "/mcp/";
pub const MCP_SUBPATH: &str = "/mcp/{*path}";
pub const API_V1_PREFIX: &str = "/api/v1";

/// Method constraint of a route. `Any` accepts every method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    Any,
    Get,
    Post,
    Delete,
}

impl RouteMethod {
    /// `None` for the wildcard.
    pub fn method_filter(self) -> Option<MethodFilter> {
        match self {
            RouteMethod::Any => None,
            RouteMethod::Get => Some(MethodFilter::GET),
            RouteMethod::Post => Some(MethodFilter::POST),
            RouteMethod::Delete => Some(MethodFilter::DELETE),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteMethod::Any => "ANY",
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Delete => "DELETE",
        }
    }
}

/// What a route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Health,
    Protocol,
    Api(ApiOperation),
}

/// One (method, path pattern, handler) binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: RouteMethod,
    /// Path pattern in router syntax; `{*name}` is a trailing catch-all.
    pub path: String,
    pub target: RouteTarget,
}

impl RouteEntry {
    pub fn new(method: RouteMethod, path: impl Into<String>, target: RouteTarget) -> Self {
        Self {
            method,
            path: path.into(),
            target,
        }
    }

}

/// Ordered, immutable set of route entries.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// The gateway's route table: health, protocol endpoint, `/api/v1` group.
    pub fn standard() -> Self {
        use ApiOperation::*;
        use RouteMethod::{Delete, Get, Post};

        let mut entries = vec![
            RouteEntry::new(Get, HEALTH_PATH, RouteTarget::Health),
            RouteEntry::new(RouteMethod::Any, MCP_PATH, RouteTarget::Protocol),
            RouteEntry::new(RouteMethod::Any, MCP_TRAILING_PATH, RouteTarget::Protocol),
            RouteEntry::new(RouteMethod::Any, MCP_SUBPATH, RouteTarget::Protocol),
        ];

        let api = [
            (Get, "/login/status", LoginStatus),
            (Get, "/login/qrcode", LoginQrcode),
            (Delete, "/login/cookies", DeleteCookies),
            (Post, "/publish", Publish),
            (Post, "/publish_video", PublishVideo),
            (Get, "/feeds/list", ListFeeds),
            (Get, "/feeds/search", SearchFeeds),
            (Post, "/feeds/search", SearchFeeds),
            (Post, "/feeds/detail", FeedDetail),
            (Post, "/user/profile", UserProfile),
            (Post, "/feeds/comment", PostComment),
            (Post, "/feeds/comment/reply", ReplyComment),
            (Get, "/user/me", MyProfile),
        ];
        entries.extend(api.into_iter().map(|(method, path, operation)| {
            RouteEntry::new(
                method,
                format!("{API_V1_PREFIX}{path}"),
                RouteTarget::Api(operation),
            )
        }));

        Self { entries }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// API entries bound to `operation`, in registration order.
    pub fn api_entries(&self, operation: ApiOperation) -> impl Iterator<Item = &RouteEntry> {
        self.entries
            .iter()
            .filter(move |e| e.target == RouteTarget::Api(operation))
    }
}
