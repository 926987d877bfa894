//! Deduplicating warning log.
//!
//! Grounded in the upstream Python project's `utils.warn`, which tracks
//! emitted messages in a process-lifetime set so a warning raised inside a
//! per-branch loop is only ever printed once. Warnings never abort the
//! process — they are printed to stderr and also logged at `warn!` for
//! `--verbose` capture.

use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
    static SEEN: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Print `message` to stderr (styled) unless an identical message was
/// already emitted earlier in this process.
pub fn warn(message: impl Into<String>) {
    let message = message.into();
    let first_time = SEEN.with(|seen| seen.borrow_mut().insert(message.clone()));
    if !first_time {
        return;
    }
    log::warn!("{message}");
    eprintln!("{}", crate::styling::styled(&format!("Warn: {message}"), crate::styling::YELLOW));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_repeated_messages() {
        SEEN.with(|seen| seen.borrow_mut().clear());
        assert!(SEEN.with(|seen| seen.borrow_mut().insert("first".to_string())));
        assert!(!SEEN.with(|seen| seen.borrow_mut().insert("first".to_string())));
        assert!(SEEN.with(|seen| seen.borrow_mut().insert("second".to_string())));
    }
}
