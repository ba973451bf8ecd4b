// ============================================================================
// ripple-streams - Form Validation Pipeline
//
// Field slots feed pure validators; combine_latest derives the combined
// can-submit flag. Submit reads the last delivered flag - it never
// re-validates.
// ============================================================================

use crate::primitives::registry::Registry;
use crate::primitives::slot::{slot, Slot};
use crate::reactivity::combine::combine_latest;
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::stream::{Observable, StreamOps};

pub struct FormModel {
    pub email: Slot<String>,
    pub password: Slot<String>,
    pub email_error: Slot<Option<String>>,
    pub password_error: Slot<Option<String>>,
    pub can_submit: Slot<bool>,
    pub status_message: Slot<String>,
    registry: Registry,
}

impl FormModel {
    pub fn new(scheduler: &Scheduler) -> Self {
        let email = slot(String::new());
        let password = slot(String::new());
        let email_error = slot(None);
        let password_error = slot(None);
        let can_submit = slot(false);
        let status_message = slot(String::from("Fill both fields"));
        let registry = Registry::new();

        email
            .map(|value: &String| validate_email(value))
            .dedup()
            .deliver_on(scheduler)
            .observe({
                let email_error = email_error.clone();
                move |err: &Option<String>| email_error.set(err.clone())
            })
            .store_in(&registry);

        password
            .map(|value: &String| validate_password(value))
            .dedup()
            .deliver_on(scheduler)
            .observe({
                let password_error = password_error.clone();
                move |err: &Option<String>| password_error.set(err.clone())
            })
            .store_in(&registry);

        combine_latest(&email, &password)
            .map(|(email, password): &(String, String)| {
                validate_email(email).is_none() && validate_password(password).is_none()
            })
            .dedup()
            .deliver_on(scheduler)
            .observe({
                let can_submit = can_submit.clone();
                move |ok: &bool| can_submit.set(*ok)
            })
            .store_in(&registry);

        Self {
            email,
            password,
            email_error,
            password_error,
            can_submit,
            status_message,
            registry,
        }
    }

    /// Act on the last delivered validity; no re-validation here.
    pub fn submit(&self) {
        let message = if self.can_submit.current() {
            "Form valid. Submit intent triggered."
        } else {
            "Form invalid."
        };
        self.status_message.set(message.to_string());
    }

    pub fn discard(&self) {
        self.registry.dispose_all();
    }
}

fn validate_email(value: &str) -> Option<String> {
    if value.contains('@') && value.contains('.') {
        None
    } else {
        Some("Enter a valid email".to_string())
    }
}

fn validate_password(value: &str) -> Option<String> {
    if value.len() >= 8 {
        None
    } else {
        Some("Password must be at least 8 characters".to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
