//!
//! # Notification Sender
//!
//! The password-reset flow needs to deliver a reset link out-of-band. The
//! transport itself is an external concern, so this module only defines the
//! seam: a [`Mailer`] trait plus a logging implementation used in development
//! and a recording mock for tests. Handlers hold the sender as
//! `web::Data<dyn Mailer>`, so any transport can be wired in at startup.

use std::sync::Mutex;

use crate::error::AppError;

/// An outbound message: recipient, subject, body.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery seam for out-of-band notifications.
///
/// Failure is an opaque transport error; the forgot-password handler awaits
/// the send and surfaces a failure as a server error.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

/// Logs outbound mail instead of delivering it. The default wiring for local
/// development and CI.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        log::info!(
            "outbound mail to={} subject={:?} body={:?}",
            message.to,
            message.subject,
            message.body
        );
        Ok(())
    }
}

/// Records every message it is asked to send. Used by tests to assert whether
/// (and what) the forgot-password flow dispatched.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with a transport error.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for MockMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::Internal("mail transport unavailable".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
