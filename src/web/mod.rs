//! Browser front end: an HTML form plus a small JSON API

pub mod handler;
pub mod page;
pub mod server;

pub use handler::{handle_request, status_for, ResponseBody, WebState};
pub use server::WebServer;
