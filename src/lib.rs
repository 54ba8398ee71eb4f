//! # Mandrill Client
//! Asynchronous wrapper around the Mandrill (Mailchimp Transactional) HTTP API: build an outbound [`Message`], send it directly or through a stored template, and get per-recipient [`SendResult`]s back from a [`Client`].
//!
//! ## Audience and uses
//! For Rust applications that send transactional email (sign-up confirmations, receipts, alerts) through Mandrill. Configure a [`Client`] once with [`ClientBuilder`], then share it across tasks.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`. Diagnostics are emitted as `tracing` events; install a subscriber to see them.
//!
//! ## Out of scope
//! Only message sending and key validation are covered. Webhooks, inbound routing, templates management, reporting and account endpoints are not implemented. Requests are never retried.
//!
//! ## Errors
//! Transport failures surface as [`Error::Request`]. Errors reported by Mandrill become [`Error::Api`] carrying an [`ApiError`]; a failed response with an unrecognized body becomes [`Error::UnknownResponse`]. Rejected recipients are not errors: inspect [`SendResult::status`].
//!
//! ## Example
//! ```no_run
//! use mandrill_client::{Client, Message, SendStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mandrill_client::Error> {
//!     let client = Client::new("my-api-key")?;
//!     client.ping().await?;
//!
//!     let msg = Message::with_recipient("recipient@example.com", "Recipient")
//!         .subject("Hello")
//!         .from_email("noreply@example.com")
//!         .from_name("Example")
//!         .html("<p>HTML content</p>")
//!         .text("plain text content");
//!
//!     for result in client.send(&msg, false).await? {
//!         if result.status == SendStatus::Rejected {
//!             println!("{} rejected: {:?}", result.email, result.rejection_reason);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod models;

pub use client::{Client, ClientBuilder, RequestOptions};
pub use error::{ApiError, Error};
pub use models::{
    Attachment, MergeLanguage, Message, Recipient, RecipientMetadata, RecipientType, SendResult,
    SendStatus, Variable,
};

/// Result type alias for Mandrill operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
