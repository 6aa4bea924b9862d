//! Dispatch core: one instance per request
//!
//! Registration, routing and handler execution run inside a single catch.
//! Whatever is raised along the way becomes a plain-text error response;
//! otherwise the handler's value is sent back as JSON.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode, Uri};
use serde::de::DeserializeOwned;

use super::context::{Env, ExecutionContext};
use super::params::{Params, Query};
use super::table::RouteTable;
use crate::error::{Failure, Phase, Raised, RouteError};
use crate::http;
use crate::logger;
use crate::method::Method;
use crate::registry::{ControllerClass, Handler};

static NO_PARAMS: Params = Params::new();
static NO_QUERY: Query = Query::new();

/// Dispatch context for a single request
///
/// Passed to every controller constructor and to the matched handler.
pub struct Core {
    request: Request<Bytes>,
    env: Arc<Env>,
    execution: ExecutionContext,
    controllers: Vec<ControllerClass>,
    method: hyper::Method,
    url: Uri,
    params: OnceLock<Params>,
    query: OnceLock<Query>,
    not_found_status: StatusCode,
    finished: AtomicBool,
}

impl Core {
    pub fn new(
        request: Request<Bytes>,
        env: Arc<Env>,
        execution: ExecutionContext,
        controllers: Vec<ControllerClass>,
    ) -> Self {
        let method = request.method().clone();
        let url = request.uri().clone();
        Self {
            request,
            env,
            execution,
            controllers,
            method,
            url,
            params: OnceLock::new(),
            query: OnceLock::new(),
            not_found_status: StatusCode::INTERNAL_SERVER_ERROR,
            finished: AtomicBool::new(false),
        }
    }

    /// Status used when no route matches (500 unless overridden)
    #[must_use]
    pub const fn with_not_found_status(mut self, status: StatusCode) -> Self {
        self.not_found_status = status;
        self
    }

    pub const fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub const fn execution_context(&self) -> &ExecutionContext {
        &self.execution
    }

    pub const fn method(&self) -> &hyper::Method {
        &self.method
    }

    pub const fn url(&self) -> &Uri {
        &self.url
    }

    /// Path parameters of the matched route; empty before matching
    pub fn params(&self) -> &Params {
        self.params.get().unwrap_or(&NO_PARAMS)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params().get(name)
    }

    /// Query parameters; empty before matching
    pub fn query(&self) -> &Query {
        self.query.get().unwrap_or(&NO_QUERY)
    }

    /// Whether the response for this request has been produced
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Request body as UTF-8 text
    pub fn text(&self) -> Result<&str, Raised> {
        Ok(std::str::from_utf8(self.request.body())?)
    }

    /// Request body decoded as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Raised> {
        Ok(serde_json::from_slice(self.request.body())?)
    }

    /// Run the whole pipeline and produce the one response for this request
    pub async fn handle(self) -> Response<Full<Bytes>> {
        let core = Arc::new(self);
        let response = match core.run().await {
            Ok(value) => core.then(&value),
            Err(failure) => core.catch(&failure),
        };
        core.finally();
        response
    }

    async fn run(self: &Arc<Self>) -> Result<serde_json::Value, Failure> {
        let table = self.register()?;
        let handler = self.route(&table)?;

        match AssertUnwindSafe(handler.call(Arc::clone(self)))
            .catch_unwind()
            .await
        {
            Ok(result) => result.map_err(|raised| Failure::new(Phase::Handler, raised)),
            Err(payload) => Err(Failure::new(
                Phase::Handler,
                Raised::from_panic(payload.as_ref()),
            )),
        }
    }

    /// Instantiate every controller in order and collect its handlers
    fn register(self: &Arc<Self>) -> Result<RouteTable, Failure> {
        let mut table = RouteTable::new();
        for construct in &self.controllers {
            let controller = std::panic::catch_unwind(AssertUnwindSafe(|| construct(self)))
                .map_err(|payload| {
                    Failure::new(Phase::Registration, Raised::from_panic(payload.as_ref()))
                })?
                .map_err(|raised| Failure::new(Phase::Registration, raised))?;

            for handler in controller.handlers() {
                if let Err(err) = table.register(handler) {
                    logger::log_warning(&format!("Route not registered: {err}"));
                }
            }
        }
        Ok(table)
    }

    /// Match the request and record its params and query on the context
    fn route(&self, table: &RouteTable) -> Result<Handler, Failure> {
        let path = self.url.path();
        let matched = table
            .lookup(Method::from_http(&self.method), path)
            .ok_or_else(|| {
                Failure::new(
                    Phase::Routing,
                    RouteError::NotFound {
                        method: self.method.to_string(),
                        path: path.to_string(),
                    }
                    .into(),
                )
            })?;

        let _ = self.params.set(matched.params);
        let _ = self
            .query
            .set(self.url.query().map(Query::parse).unwrap_or_default());
        Ok(matched.handler.clone())
    }

    fn then(&self, value: &serde_json::Value) -> Response<Full<Bytes>> {
        http::json_response(StatusCode::OK, value)
    }

    fn catch(&self, failure: &Failure) -> Response<Full<Bytes>> {
        logger::log_dispatch_failure(self.method.as_str(), self.url.path(), failure);
        let status = if failure.is_not_found() {
            self.not_found_status
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        http::text_response(status, failure.raised.message())
    }

    fn finally(&self) {
        self.finished.store(true, Ordering::SeqCst);
        logger::log_debug(&format!(
            "[Dispatch] {} {} finished",
            self.method,
            self.url.path()
        ));
    }
}
