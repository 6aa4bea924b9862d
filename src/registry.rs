//! Handler registry
//!
//! Controllers declare handlers with [`declare`] (or [`Controller::handler`])
//! and report every member they own through [`Controller::members`].
//! [`collect_handlers`] keeps only the handler members, in declaration order.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;

use crate::dispatch::Core;
use crate::error::Raised;
use crate::method::Method;

/// A boxed, pinned future that is `Send`
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler resolves to: a JSON value, or something raised
pub type HandlerResult = Result<serde_json::Value, Raised>;

type Callback = Arc<dyn Fn(Arc<Core>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// A callback bound to exactly one (method, path) pair
///
/// Fields are private and there are no setters: the routing identity of a
/// handler is fixed when it is declared. Clones share the same callback.
#[derive(Clone)]
pub struct Handler {
    method: Method,
    path: Arc<str>,
    callback: Callback,
}

impl Handler {
    pub const fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Invoke the callback with the dispatch context
    ///
    /// Nothing runs until the returned future is polled.
    pub fn call(&self, core: Arc<Core>) -> BoxFuture<'static, HandlerResult> {
        (self.callback)(core)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Build a handler from a callback
///
/// The callback's output is converted to JSON when the handler runs, so a
/// value that fails to serialize is raised like any other handler error.
/// Nothing is registered anywhere.
pub fn declare<F, Fut, T>(method: Method, path: impl Into<String>, callback: F) -> Handler
where
    F: Fn(Arc<Core>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, Raised>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let callback = Arc::new(callback);
    let erased: Callback = Arc::new(move |core| {
        let callback = Arc::clone(&callback);
        Box::pin(async move {
            let value = callback(core).await?;
            serde_json::to_value(value).map_err(Raised::from)
        })
    });

    Handler {
        method,
        path: Arc::from(path.into()),
        callback: erased,
    }
}

/// One member owned by a controller
#[derive(Debug, Clone)]
pub enum Member {
    Handler(Handler),
    /// Anything else the controller owns (helpers, fields), by name
    Other(&'static str),
}

impl From<Handler> for Member {
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

/// A grouping of related handlers, constructed fresh for every request
pub trait Controller: Send + 'static {
    /// Construct the controller for one request
    fn new(core: &Arc<Core>) -> Result<Self, Raised>
    where
        Self: Sized;

    /// Every member this controller owns, in declaration order
    fn members(&self) -> Vec<Member>;

    /// Declare a handler; same as [`declare`]
    fn handler<F, Fut, T>(&self, method: Method, path: impl Into<String>, callback: F) -> Handler
    where
        Self: Sized,
        F: Fn(Arc<Core>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Raised>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        declare(method, path, callback)
    }

    /// The handlers among this controller's members
    fn handlers(&self) -> Vec<Handler> {
        collect_handlers(self)
    }
}

/// Keep only the handler members of a controller, in declaration order
pub fn collect_handlers<C: Controller + ?Sized>(controller: &C) -> Vec<Handler> {
    controller
        .members()
        .into_iter()
        .filter_map(|member| match member {
            Member::Handler(handler) => Some(handler),
            Member::Other(_) => None,
        })
        .collect()
}

/// Constructor of a controller type, as handed to the dispatch core
pub type ControllerClass = fn(&Arc<Core>) -> Result<Box<dyn Controller>, Raised>;

/// The constructor for controller type `C`
pub fn class<C: Controller>() -> ControllerClass {
    construct::<C>
}

fn construct<C: Controller>(core: &Arc<Core>) -> Result<Box<dyn Controller>, Raised> {
    Ok(Box::new(C::new(core)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_core;
    use serde_json::json;

    struct Mixed {
        list: Handler,
        show: Handler,
    }

    impl Controller for Mixed {
        fn new(_core: &Arc<Core>) -> Result<Self, Raised> {
            Ok(Self {
                list: declare(Method::Get, "/items", |_core| async { Ok::<_, Raised>(vec![1, 2, 3]) }),
                show: declare(Method::Get, "/items/:id", |core: Arc<Core>| async move {
                    Ok::<_, Raised>(core.param("id").map(str::to_string))
                }),
            })
        }

        fn members(&self) -> Vec<Member> {
            vec![
                Member::Other("limit"),
                self.show.clone().into(),
                Member::Other("format_item"),
                self.list.clone().into(),
            ]
        }
    }

    struct Empty;

    impl Controller for Empty {
        fn new(_core: &Arc<Core>) -> Result<Self, Raised> {
            Ok(Self)
        }

        fn members(&self) -> Vec<Member> {
            vec![Member::Other("name")]
        }
    }

    #[test]
    fn test_collect_keeps_handlers_in_order() {
        let core = test_core("GET", "/");
        let controller = Mixed::new(&core).unwrap();
        let handlers = collect_handlers(&controller);

        let routes: Vec<_> = handlers.iter().map(|h| (h.method(), h.path())).collect();
        assert_eq!(
            routes,
            vec![(Method::Get, "/items/:id"), (Method::Get, "/items")]
        );
    }

    #[test]
    fn test_collect_empty_controller() {
        let core = test_core("GET", "/");
        let controller = Empty::new(&core).unwrap();
        assert!(controller.handlers().is_empty());
    }

    #[test]
    fn test_collect_through_trait_object() {
        let core = test_core("GET", "/");
        let controller = class::<Mixed>()(&core).unwrap();
        assert_eq!(controller.handlers().len(), 2);
    }

    #[test]
    fn test_clone_keeps_identity() {
        let handler = declare(Method::Post, "/users", |_core| async { Ok::<_, Raised>(json!(null)) });
        let copy = handler.clone();
        assert_eq!(copy.method(), Method::Post);
        assert_eq!(copy.path(), "/users");
        assert_eq!(handler.path(), copy.path());
    }

    #[tokio::test]
    async fn test_call_serializes_output() {
        let handler = declare(Method::Get, "/items", |_core| async {
            Ok::<_, Raised>(json!({ "ok": true }))
        });
        let value = handler.call(test_core("GET", "/items")).await.unwrap();
        assert_eq!(value, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_call_propagates_raised() {
        let handler = declare(Method::Get, "/boom", |_core| async {
            Err::<(), _>(Raised::msg("bad state"))
        });
        let err = handler.call(test_core("GET", "/boom")).await.unwrap_err();
        assert_eq!(err.message(), "bad state");
    }

    #[tokio::test]
    async fn test_serialize_failure_is_raised() {
        use std::collections::HashMap;

        let handler = declare(Method::Get, "/bad", |_core| async {
            let mut map = HashMap::new();
            map.insert(vec![1u8], "non-string key");
            Ok::<_, Raised>(map)
        });
        let err = handler.call(test_core("GET", "/bad")).await.unwrap_err();
        assert!(err.is_error());
    }
}
