//! Dispatch core
//!
//! Builds a fresh route table from the controller list for every request,
//! routes the request through it and turns the outcome into a response.

mod context;
mod params;
mod pipeline;
mod table;
pub mod template;

pub use context::{Env, ExecutionContext};
pub use params::{Params, Query, QueryValue};
pub use pipeline::Core;
pub use table::{Matched, RegisterError, RouteTable};
