// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound notification mail.
//!
//! Registration and approval send a notification to the affected user.
//! Delivery is best-effort and never blocks or fails the request that
//! triggered it. The default implementation only logs; wiring a real
//! provider means implementing [`Mailer`] and swapping it into the state.

/// Outbound mail sender.
pub trait Mailer: Send + Sync {
    /// Notify a freshly registered user that their account awaits review.
    fn send_welcome(&self, to: &str, name: &str);

    /// Notify a user that an admin approved their account.
    fn send_approval(&self, to: &str, name: &str);
}

/// Mailer that logs instead of sending.
pub struct NoopMailer;

impl Mailer for NoopMailer {
    fn send_welcome(&self, to: &str, name: &str) {
        tracing::info!(to, name, "welcome mail (not sent, no provider configured)");
    }

    fn send_approval(&self, to: &str, name: &str) {
        tracing::info!(to, name, "approval mail (not sent, no provider configured)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_mailer_never_panics() {
        let mailer = NoopMailer;
        mailer.send_welcome("alice@x.com", "Alice");
        mailer.send_approval("alice@x.com", "Alice");
    }
}
