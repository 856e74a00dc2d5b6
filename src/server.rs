//! Serving endpoints over HTTP
//!
//! A [`Registry`] collects named endpoints and mounts each one at
//! `{prefix}/{name}` on an axum router.
//!
//! # Example
//!
//! ```ignore
//! let router = Registry::new()
//!     .bind("add", add)?
//!     .bind("echo", echo)?
//!     .into_router("/rpc");
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8765").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::collections::BTreeMap;

use axum::body::Body;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;

use crate::binding::{encode_error, Bindable, Endpoint};
use crate::error::{BindError, RequestError};

/// Largest request body read before the request is rejected.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Named endpoints, served in name order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    endpoints: BTreeMap<String, Endpoint>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a function and register it under `name`.
    pub fn bind<F, M>(mut self, name: &str, func: F) -> Result<Self, BindError>
    where
        F: Bindable<M>,
        M: 'static,
    {
        self.insert(Endpoint::bind(name, func)?);
        Ok(self)
    }

    /// Register an already bound endpoint, replacing one of the same name.
    pub fn insert(&mut self, endpoint: Endpoint) -> Option<Endpoint> {
        let replaced = self
            .endpoints
            .insert(endpoint.name().to_string(), endpoint);
        if let Some(old) = &replaced {
            tracing::warn!(endpoint = %old.name(), "replaced endpoint");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Mount every endpoint at `{prefix}/{name}`.
    ///
    /// Routes accept any method; the endpoint itself answers non-POST
    /// requests with 400.
    pub fn into_router(self, prefix: &str) -> Router {
        let prefix = prefix.trim_end_matches('/');
        let mut router = Router::new();

        for (name, endpoint) in self.endpoints {
            let path = format!("{}/{}", prefix, name);
            tracing::debug!(%path, "mounted endpoint");
            router = router.route(
                &path,
                any(move |request: Request| dispatch(endpoint.clone(), request)),
            );
        }

        router
    }
}

async fn dispatch(endpoint: Endpoint, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(endpoint = %endpoint.name(), %err, "failed to read request body");
            let response = encode_error(&RequestError::Body(Box::new(err)));
            return response.map(Body::from).into_response();
        }
    };

    endpoint
        .handle(http::Request::from_parts(parts, bytes))
        .map(Body::from)
        .into_response()
}
