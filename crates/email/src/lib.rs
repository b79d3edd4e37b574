//! Transactional email for the lead pipeline: tera-rendered HTML templates
//! delivered through a Resend-style HTTP API. Sends are fire-and-forget and
//! report a success boolean.

pub mod sender;
pub mod service;
pub mod templates;

pub use sender::{EmailSender, NoopEmailSender, OutboundEmail, ResendSender};
pub use service::EmailService;
pub use templates::{EmailTemplates, QuoteReadyEmail, TeamNotificationEmail, WelcomeEmail};
