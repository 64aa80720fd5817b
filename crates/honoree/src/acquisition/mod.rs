//! Plain HTTP acquisition: the async client and HTML-to-text conversion.
//!
//! Everything except the memorial directory is fetched here without a
//! browser.

pub mod html_text;
pub mod http_client;
