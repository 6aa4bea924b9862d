//! routeshim
//!
//! A small request-routing shim. Controllers declare handlers bound to a
//! method and a path template; for every request a fresh [`Core`] builds the
//! controllers, registers their handlers into a route table, runs the one
//! that matches and turns its value (or whatever it raised) into a response.
//!
//! The [`server`] module hosts the core behind a hyper HTTP/1 server.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod logger;
pub mod method;
pub mod registry;
pub mod server;

pub use dispatch::{Core, Env, ExecutionContext};
pub use error::Raised;
pub use method::Method;
pub use registry::{class, declare, Controller, ControllerClass, Handler, Member};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::{Request, Response};

    use crate::dispatch::{Core, Env, ExecutionContext};

    /// A buffered request as the host hands it to the core
    pub fn request(method: &str, uri: &str, body: &str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_of(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// A core with no bindings and no controllers
    pub fn test_core(method: &str, uri: &str) -> Arc<Core> {
        Arc::new(Core::new(
            request(method, uri, ""),
            Arc::new(Env::default()),
            ExecutionContext::new(),
            Vec::new(),
        ))
    }
}
