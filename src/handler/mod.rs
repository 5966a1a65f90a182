//! HTTP-style `{status, body}` envelopes over the record service.
//!
//! Entry points (the command line, or an HTTP front end) decode their
//! request, call a [`Handler`] method and render the [`Response`].

mod record_handler;
mod response;

pub use record_handler::Handler;
pub use response::Response;
