use std::sync::Arc;

use routeshim::{Controller, Core, Member, Method, Raised};
use serde_json::json;

/// Failure and bindings probes
pub struct Diagnostics;

impl Controller for Diagnostics {
    fn new(_core: &Arc<Core>) -> Result<Self, Raised> {
        Ok(Self)
    }

    fn members(&self) -> Vec<Member> {
        vec![
            self.handler(Method::Get, "/boom", |_core| async {
                Err::<(), _>(Raised::msg("bad state"))
            })
            .into(),
            self.handler(Method::All, "/env/{key}", |core: Arc<Core>| async move {
                let key = core.param("key").unwrap_or_default();
                match core.env().get(key) {
                    Some(value) => Ok(json!({ "key": key, "value": value })),
                    None => Err(Raised::msg(format!("no binding named {key}"))),
                }
            })
            .into(),
            self.handler(Method::Post, "/defer", |core: Arc<Core>| async move {
                let path = core.url().path().to_string();
                core.execution_context().wait_until(async move {
                    routeshim::logger::log_debug(&format!("[Defer] background work for {path} done"));
                });
                Ok::<_, Raised>(json!({ "queued": true }))
            })
            .into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crate::controllers::test_support::dispatch;
    use hyper::StatusCode;
    use routeshim::Env;
    use serde_json::json;

    #[tokio::test]
    async fn test_boom() {
        let (status, body) = dispatch("GET", "/boom", "", Env::default()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "bad state");
    }

    #[tokio::test]
    async fn test_env_any_method() {
        let bindings: Env = serde_json::from_value(json!({ "region": "eu-west" })).unwrap();
        let (status, body) = dispatch("DELETE", "/env/region", "", bindings).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"key":"region","value":"eu-west"}"#);
    }

    #[tokio::test]
    async fn test_env_missing_binding() {
        let (status, body) = dispatch("GET", "/env/region", "", Env::default()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "no binding named region");
    }

    #[tokio::test]
    async fn test_defer_responds_immediately() {
        let (status, body) = dispatch("POST", "/defer", "", Env::default()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"queued":true}"#);
    }
}
