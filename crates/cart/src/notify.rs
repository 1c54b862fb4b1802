//! Shopper-facing cart notifications.
//!
//! The store hands every notification to a [`Notifier`]. Delivery is
//! fire-and-forget: `notify` cannot fail, so a broken toast or log sink never
//! blocks a cart mutation.

use core::fmt;

use serde::Serialize;

/// Severity of a notification, mapped to toast styling by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
}

/// A human-readable message produced by a cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A new line item was appended.
    Added { name: String },
    /// An existing line item absorbed another add.
    QuantityUpdated { name: String, quantity: u32 },
    /// A line item was removed.
    Removed { name: String },
    /// An add was refused (or a line dropped) because no stock remains.
    OutOfStock { name: String },
}

impl Notification {
    #[must_use]
    pub const fn level(&self) -> NotificationLevel {
        match self {
            Self::Added { .. } | Self::QuantityUpdated { .. } => NotificationLevel::Success,
            Self::Removed { .. } => NotificationLevel::Info,
            Self::OutOfStock { .. } => NotificationLevel::Warning,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { name } => write!(f, "{name} added to cart"),
            Self::QuantityUpdated { quantity: 1, .. } => f.write_str("Quantity updated: 1 unit"),
            Self::QuantityUpdated { quantity, .. } => {
                write!(f, "Quantity updated: {quantity} units")
            }
            Self::Removed { name } => write!(f, "{name} removed from cart"),
            Self::OutOfStock { name } => write!(f, "{name} is out of stock"),
        }
    }
}

/// Sink for cart notifications (toast UI, log, test recorder).
pub trait Notifier {
    fn notify(&mut self, notification: &Notification);
}

/// Emits each notification as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, notification: &Notification) {
        match notification.level() {
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(target: "boutique_cart::notify", "{notification}");
            }
            NotificationLevel::Warning => {
                tracing::warn!(target: "boutique_cart::notify", "{notification}");
            }
        }
    }
}

/// Records notifications in order.
impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: &Notification) {
        self.push(notification.clone());
    }
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn notify(&mut self, notification: &Notification) {
        (**self).notify(notification);
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, notification: &Notification) {
        (**self).notify(notification);
    }
}
