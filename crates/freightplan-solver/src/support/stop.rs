// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::sync::atomic::{AtomicBool, Ordering::Relaxed};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cheap cooperative cancel signal, honored at generation barriers.
/// Evaluations already in flight are allowed to finish.
#[derive(Clone, Default, Debug)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Relaxed)
    }

    #[inline]
    pub fn request_stop(&self) {
        self.0.store(true, Relaxed)
    }
}

impl PartialEq for StopToken {
    /// Equality is identity of the underlying flag, not its value.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for StopToken {}

/// Optional wall-clock budget for the search. An unlimited deadline
/// never expires.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    #[inline]
    pub fn unlimited() -> Self {
        Self { expires_at: None }
    }

    #[inline]
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + budget),
        }
    }

    #[inline]
    pub fn from_budget_ms(budget_ms: Option<u64>) -> Self {
        match budget_ms {
            Some(ms) => Self::after(Duration::from_millis(ms)),
            None => Self::unlimited(),
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.expires_at.is_some_and(|t| Instant::now() >= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_token_propagates_to_clones() {
        let a = StopToken::new();
        let b = a.clone();
        assert!(!a.is_set());
        b.request_stop();
        assert!(a.is_set());
        assert!(b.is_set());
    }

    #[test]
    fn test_stop_token_identity_equality() {
        let a = StopToken::new();
        let b = a.clone();
        let c = StopToken::new();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_unlimited_deadline_never_expires() {
        assert!(!Deadline::unlimited().expired());
        assert!(!Deadline::from_budget_ms(None).expired());
    }

    #[test]
    fn test_zero_budget_expires_immediately() {
        let d = Deadline::from_budget_ms(Some(0));
        assert!(d.expired());
    }

    #[test]
    fn test_generous_budget_does_not_expire_now() {
        let d = Deadline::after(Duration::from_secs(3600));
        assert!(!d.expired());
    }
}
