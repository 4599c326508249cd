use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Destination for user-facing notifications. Delivery is fire-and-forget.
pub trait Notifier {
    fn notify(&mut self, user: &str, title: &str, text: &str);
}

/// 通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// 按用户保存的通知收件箱
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inbox {
    messages: BTreeMap<String, Vec<Notification>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages_for(&self, user: &str) -> &[Notification] {
        self.messages.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for Inbox {
    fn notify(&mut self, user: &str, title: &str, text: &str) {
        self.messages
            .entry(user.to_string())
            .or_default()
            .push(Notification {
                title: title.to_string(),
                text: text.to_string(),
                date: OffsetDateTime::now_utc(),
            });
    }
}

/// Writes notifications to the log instead of keeping them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, user: &str, title: &str, text: &str) {
        info!(target: "notify", "{} <- {}: {}", user, title, text);
    }
}
