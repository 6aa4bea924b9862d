//! Controllers served by the binary, in registration order

mod diagnostics;
mod ping;
mod users;

use routeshim::{class, ControllerClass};

pub use diagnostics::Diagnostics;
pub use ping::Ping;
pub use users::Users;

/// Earlier controllers win when two declare the same route
pub fn all() -> Vec<ControllerClass> {
    vec![class::<Ping>(), class::<Users>(), class::<Diagnostics>()]
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::{Request, StatusCode};
    use routeshim::{Core, Env, ExecutionContext};

    /// Dispatch one request through every controller, returning status and body
    pub async fn dispatch(method: &str, uri: &str, body: &str, env: Env) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::from(body.to_string()))
            .unwrap();
        let response = Core::new(request, Arc::new(env), ExecutionContext::new(), super::all())
            .handle()
            .await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
