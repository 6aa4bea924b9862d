//! Path template normalization
//!
//! Templates may use the colon form (`/users/:id`, `/files/*rest`) or the
//! router's native form (`/users/{id}`, `/files/{*rest}`). Colon-form
//! segments are rewritten to the native form before insertion.

/// Name given to a bare `*` catch-all segment
pub const WILDCARD: &str = "wildcard";

/// Rewrite `:name` and `*name` segments into `{name}` and `{*name}`
pub fn normalize(template: &str) -> String {
    template
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() {
                    segment.to_string()
                } else {
                    format!("{{{name}}}")
                }
            } else if let Some(name) = segment.strip_prefix('*') {
                let name = if name.is_empty() { WILDCARD } else { name };
                format!("{{*{name}}}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colon_params() {
        assert_eq!(normalize("/users/:id"), "/users/{id}");
        assert_eq!(
            normalize("/orgs/:org/repos/:repo"),
            "/orgs/{org}/repos/{repo}"
        );
    }

    #[test]
    fn test_catch_all() {
        assert_eq!(normalize("/files/*rest"), "/files/{*rest}");
        assert_eq!(normalize("/static/*"), "/static/{*wildcard}");
    }

    #[test]
    fn test_native_and_static_untouched() {
        assert_eq!(normalize("/users/{id}"), "/users/{id}");
        assert_eq!(normalize("/ping"), "/ping");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("/a:b"), "/a:b");
    }
}
