//! Mail records
//!
//! Inbox and outbox are append-only within an episode; only the read flag
//! is ever mutated after an email is created.

use serde::{Deserialize, Serialize};

/// One email in the inbox or outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub email_id: String,
    pub from_addr: String,
    pub to_addr: String,
    pub subject: String,
    pub body: String,
    pub day_sent: usize,
    pub is_read: bool,
}

impl Email {
    pub fn new(
        email_id: String,
        from_addr: &str,
        to_addr: &str,
        subject: &str,
        body: &str,
        day_sent: usize,
    ) -> Self {
        Self {
            email_id,
            from_addr: from_addr.to_string(),
            to_addr: to_addr.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            day_sent,
            is_read: false,
        }
    }
}
