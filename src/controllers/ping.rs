use std::sync::Arc;

use routeshim::{declare, Controller, Core, Handler, Member, Method, Raised};
use serde_json::json;

/// Liveness check
pub struct Ping {
    ping: Handler,
}

impl Controller for Ping {
    fn new(_core: &Arc<Core>) -> Result<Self, Raised> {
        Ok(Self {
            ping: declare(Method::Get, "/ping", |_core| async {
                Ok::<_, Raised>(json!({ "ok": true }))
            }),
        })
    }

    fn members(&self) -> Vec<Member> {
        vec![self.ping.clone().into()]
    }
}
