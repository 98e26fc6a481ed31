// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking of users currently mid-way through the topic-selection prompt.
//!
//! Prevents duplicate concurrent prompts: while a user's entry is present,
//! further first-contact messages from them are dropped.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use modmail_core::types::UserId;

/// Set of users with an outstanding topic-selection prompt.
#[derive(Default)]
pub struct ActivePromptSet {
    inner: Mutex<HashSet<UserId>>,
}

impl ActivePromptSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<UserId>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a prompt as outstanding for `user`.
    ///
    /// Returns `false` if one is already outstanding; the check and the
    /// insert are one critical section, so two racing first-contact events
    /// yield exactly one prompt.
    pub fn begin(&self, user: UserId) -> bool {
        self.lock().insert(user)
    }

    /// Clears the outstanding prompt for `user` (selection completed or the
    /// prompt was abandoned). Returns `false` if none was outstanding.
    pub fn finish(&self, user: UserId) -> bool {
        self.lock().remove(&user)
    }

    /// True if `user` currently has an outstanding prompt.
    pub fn contains(&self, user: UserId) -> bool {
        self.lock().contains(&user)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_is_exclusive_per_user() {
        let prompts = ActivePromptSet::new();
        assert!(prompts.begin(UserId(1)));
        assert!(!prompts.begin(UserId(1)));
        assert!(prompts.begin(UserId(2)));
        assert_eq!(prompts.len(), 2);
    }

    #[test]
    fn finish_clears_the_entry() {
        let prompts = ActivePromptSet::new();
        prompts.begin(UserId(1));
        assert!(prompts.contains(UserId(1)));
        assert!(prompts.finish(UserId(1)));
        assert!(!prompts.contains(UserId(1)));
        assert!(!prompts.finish(UserId(1)));
        assert!(prompts.is_empty());
    }

    #[test]
    fn racing_begins_yield_one_winner() {
        let prompts = std::sync::Arc::new(ActivePromptSet::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let prompts = prompts.clone();
                std::thread::spawn(move || prompts.begin(UserId(1)))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().expect("begin thread panicked"))
            .filter(|&won| won)
            .count();
        assert_eq!(winners, 1);
    }
}
