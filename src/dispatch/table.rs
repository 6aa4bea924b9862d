//! Per-request route table
//!
//! Handlers are kept in registration order and each template is compiled
//! into its own single-route `matchit` router. Lookup scans in order and the
//! first entry whose method and path match wins, so a later registration
//! never shadows an earlier overlapping one.

use super::params::Params;
use super::template;
use crate::method::Method;
use crate::registry::Handler;

/// Why a handler did not make it into the table
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("{method} {path} is masked by an earlier registration of {with}")]
    Masked {
        method: Method,
        path: String,
        with: String,
    },
    #[error("invalid path template {path}: {reason}")]
    InvalidTemplate { path: String, reason: String },
}

/// A matched handler and the placeholder values it matched with
#[derive(Debug)]
pub struct Matched<'a> {
    pub handler: &'a Handler,
    pub params: Params,
}

struct Route {
    template: String,
    matcher: matchit::Router<()>,
    handler: Handler,
}

#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler under its method and path
    ///
    /// A second registration of the same method and template can never be
    /// reached and is rejected.
    pub fn register(&mut self, handler: Handler) -> Result<(), RegisterError> {
        let method = handler.method();
        let template = template::normalize(handler.path());

        if let Some(earlier) = self
            .routes
            .iter()
            .find(|route| route.handler.method() == method && route.template == template)
        {
            return Err(RegisterError::Masked {
                method,
                path: handler.path().to_string(),
                with: earlier.handler.path().to_string(),
            });
        }

        let mut matcher = matchit::Router::new();
        matcher
            .insert(template.as_str(), ())
            .map_err(|err| RegisterError::InvalidTemplate {
                path: handler.path().to_string(),
                reason: err.to_string(),
            })?;

        self.routes.push(Route {
            template,
            matcher,
            handler,
        });
        Ok(())
    }

    /// Find the handler for a request, first registration first
    ///
    /// `method` is `None` for wire methods outside the enumeration; those
    /// only match `ALL` entries.
    pub fn lookup(&self, method: Option<Method>, path: &str) -> Option<Matched<'_>> {
        self.routes.iter().find_map(|route| {
            let accepts = match route.handler.method() {
                Method::All => true,
                declared => method == Some(declared),
            };
            if !accepts {
                return None;
            }
            let found = route.matcher.at(path).ok()?;
            Some(Matched {
                handler: &route.handler,
                params: Params::from(found.params),
            })
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Raised;
    use crate::registry::declare;

    fn handler(method: Method, path: &str) -> Handler {
        declare(method, path, |_core| async { Ok::<_, Raised>(()) })
    }

    #[test]
    fn test_lookup_with_params() {
        let mut table = RouteTable::new();
        table.register(handler(Method::Get, "/users/:id")).unwrap();
        table.register(handler(Method::Get, "/users")).unwrap();

        let matched = table.lookup(Some(Method::Get), "/users/42").unwrap();
        assert_eq!(matched.handler.path(), "/users/:id");
        assert_eq!(matched.params.get("id"), Some("42"));

        let matched = table.lookup(Some(Method::Get), "/users").unwrap();
        assert_eq!(matched.handler.path(), "/users");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_method_mismatch_misses() {
        let mut table = RouteTable::new();
        table.register(handler(Method::Post, "/users")).unwrap();
        assert!(table.lookup(Some(Method::Get), "/users").is_none());
        assert!(table.lookup(Some(Method::Post), "/nope").is_none());
    }

    #[test]
    fn test_duplicate_is_masked() {
        let mut table = RouteTable::new();
        let first = handler(Method::Get, "/ping");
        table.register(first).unwrap();

        let err = table.register(handler(Method::Get, "/ping")).unwrap_err();
        assert!(matches!(err, RegisterError::Masked { method: Method::Get, .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_same_path_other_method_is_not_masked() {
        let mut table = RouteTable::new();
        table.register(handler(Method::Get, "/items")).unwrap();
        table.register(handler(Method::Post, "/items")).unwrap();
        assert_eq!(table.len(), 2);

        let matched = table.lookup(Some(Method::Post), "/items").unwrap();
        assert_eq!(matched.handler.method(), Method::Post);
    }

    #[test]
    fn test_all_vs_specific_earliest_wins() {
        let mut table = RouteTable::new();
        table.register(handler(Method::All, "/any")).unwrap();
        table.register(handler(Method::Get, "/any")).unwrap();
        table.register(handler(Method::Get, "/late")).unwrap();
        table.register(handler(Method::All, "/late")).unwrap();

        let matched = table.lookup(Some(Method::Get), "/any").unwrap();
        assert_eq!(matched.handler.method(), Method::All);

        let matched = table.lookup(Some(Method::Get), "/late").unwrap();
        assert_eq!(matched.handler.method(), Method::Get);

        let matched = table.lookup(Some(Method::Delete), "/late").unwrap();
        assert_eq!(matched.handler.method(), Method::All);
    }

    #[test]
    fn test_unknown_wire_method_only_matches_all() {
        let mut table = RouteTable::new();
        table.register(handler(Method::Get, "/trace-me")).unwrap();
        assert!(table.lookup(None, "/trace-me").is_none());

        table.register(handler(Method::All, "/trace-me")).unwrap();
        let matched = table.lookup(None, "/trace-me").unwrap();
        assert_eq!(matched.handler.method(), Method::All);
    }

    #[test]
    fn test_invalid_template_rejected() {
        let mut table = RouteTable::new();
        let err = table.register(handler(Method::Get, "/files/{*rest}/more")).unwrap_err();
        assert!(matches!(err, RegisterError::InvalidTemplate { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn test_earlier_placeholder_shadows_later_static() {
        let mut table = RouteTable::new();
        table.register(handler(Method::Get, "/users/:id")).unwrap();
        table.register(handler(Method::Get, "/users/me")).unwrap();

        let matched = table.lookup(Some(Method::Get), "/users/me").unwrap();
        assert_eq!(matched.handler.path(), "/users/:id");
        assert_eq!(matched.params.get("id"), Some("me"));
    }

    #[test]
    fn test_registration_order_across_all_and_specific() {
        let mut table = RouteTable::new();
        table.register(handler(Method::Get, "/users/:id")).unwrap();
        table.register(handler(Method::All, "/users/me")).unwrap();
        table.register(handler(Method::Get, "/users/me")).unwrap();

        let matched = table.lookup(Some(Method::Get), "/users/me").unwrap();
        assert_eq!(matched.handler.method(), Method::Get);
        assert_eq!(matched.handler.path(), "/users/:id");

        let matched = table.lookup(Some(Method::Post), "/users/me").unwrap();
        assert_eq!(matched.handler.method(), Method::All);
    }

    #[test]
    fn test_colon_and_native_forms_are_duplicates() {
        let mut table = RouteTable::new();
        table.register(handler(Method::Get, "/users/:id")).unwrap();
        let err = table.register(handler(Method::Get, "/users/{id}")).unwrap_err();
        assert!(matches!(err, RegisterError::Masked { ref with, .. } if with == "/users/:id"));
    }
}
