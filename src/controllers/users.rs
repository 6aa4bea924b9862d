use std::sync::Arc;

use routeshim::{Controller, Core, Member, Method, Raised};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
    #[serde(default)]
    email: Option<String>,
}

/// Echo endpoints for user records; nothing is stored
pub struct Users {
    page_size: u64,
}

impl Controller for Users {
    fn new(core: &Arc<Core>) -> Result<Self, Raised> {
        let page_size = match core.env().get("users_page_size") {
            None => DEFAULT_PAGE_SIZE,
            Some(value) => value
                .as_u64()
                .ok_or_else(|| Raised::msg(format!("users_page_size must be a number, got {value}")))?,
        };
        Ok(Self { page_size })
    }

    fn members(&self) -> Vec<Member> {
        let page_size = self.page_size;
        vec![
            Member::Other("page_size"),
            self.handler(Method::Get, "/users", move |core: Arc<Core>| async move {
                Ok::<_, Raised>(json!({
                    "users": [],
                    "page_size": page_size,
                    "query": core.query(),
                }))
            })
            .into(),
            self.handler(Method::Get, "/users/:id", |core: Arc<Core>| async move {
                Ok::<_, Raised>(json!({ "id": core.param("id") }))
            })
            .into(),
            self.handler(Method::Post, "/users", |core: Arc<Core>| async move {
                let user: NewUser = core.json()?;
                if user.name.trim().is_empty() {
                    return Err(Raised::msg("name must not be empty"));
                }
                Ok(json!({ "created": { "name": user.name, "email": user.email } }))
            })
            .into(),
        ]
    }
}
