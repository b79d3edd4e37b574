//! Slack notifications for the lead pipeline.
//!
//! Messages are built as typed Block Kit payloads (`blocks`), composed into
//! pipeline-specific templates (`notifications`), and delivered to an
//! incoming webhook (`sender`). Delivery is fire-and-forget: senders return
//! a success boolean and never propagate failures.

pub mod blocks;
pub mod notifications;
pub mod sender;

pub use blocks::{Block, ButtonElement, ButtonStyle, MessageBuilder, MessageTemplate, TextObject};
pub use notifications::{
    new_qualified_lead_message, quote_accepted_message, quote_declined_message,
    NewLeadNotification,
};
pub use sender::{NoopNotificationSender, NotificationSender, SlackWebhookSender};
