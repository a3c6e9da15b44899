// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounded retry loops with an explicit outcome

use std::ops::ControlFlow;

/// Result of a [`bounded_retry`] loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    /// An attempt reported that no further attempt is needed
    Converged { value: T, attempts: usize },
    /// Every allowed attempt asked to continue; `value` is the last best effort
    GaveUpAfter { value: T, attempts: usize },
}

impl<T> RetryOutcome<T> {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            Self::Converged { attempts, .. } | Self::GaveUpAfter { attempts, .. } => *attempts,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Converged { value, .. } | Self::GaveUpAfter { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Converged { value, .. } | Self::GaveUpAfter { value, .. } => value,
        }
    }
}

/// Run `attempt` until it breaks or `max_attempts` attempts have been made.
///
/// `attempt` receives the zero-based attempt index and returns
/// `ControlFlow::Break(value)` when done, or `ControlFlow::Continue(value)`
/// to ask for another attempt. At least one attempt is always made.
pub fn bounded_retry<T>(
    max_attempts: usize,
    mut attempt: impl FnMut(usize) -> ControlFlow<T, T>,
) -> RetryOutcome<T> {
    let max_attempts = max_attempts.max(1);
    let mut index = 0;
    loop {
        let flow = attempt(index);
        index += 1;
        match flow {
            ControlFlow::Break(value) => {
                return RetryOutcome::Converged {
                    value,
                    attempts: index,
                }
            }
            ControlFlow::Continue(value) if index >= max_attempts => {
                return RetryOutcome::GaveUpAfter {
                    value,
                    attempts: index,
                }
            }
            ControlFlow::Continue(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges() {
        let outcome = bounded_retry(10, |i| {
            if i == 3 {
                ControlFlow::Break(i)
            } else {
                ControlFlow::Continue(i)
            }
        });
        assert_eq!(outcome, RetryOutcome::Converged { value: 3, attempts: 4 });
        assert!(outcome.is_converged());
    }

    #[test]
    fn test_gives_up() {
        let outcome = bounded_retry(5, ControlFlow::<usize, usize>::Continue);
        assert_eq!(outcome, RetryOutcome::GaveUpAfter { value: 4, attempts: 5 });
        assert_eq!(outcome.attempts(), 5);
        assert_eq!(outcome.into_value(), 4);
    }

    #[test]
    fn test_zero_budget_still_attempts_once() {
        let mut calls = 0;
        let outcome = bounded_retry(0, |_| {
            calls += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(calls, 1);
        assert!(!outcome.is_converged());
    }
}
