//! HTTP response layer shared by the dispatch core and the server

pub mod response;

pub use response::{
    build_400_response, build_413_response, json_response, text_response, with_server_header,
};
