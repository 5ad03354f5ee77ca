// src/core/services/saga.rs
//! Ordered workflow steps across systems that share no transaction.
//!
//! Each completed step may register an undo action. On failure the
//! registered actions run newest-first. A step that cannot be undone is
//! marked with [`Saga::pivot`], after which earlier undo actions are
//! discarded and the workflow can only move forward.

use std::fmt::Display;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, error, warn};

type Undo<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<(), String>> + Send + 'a>;

struct Compensation<'a, S> {
    step: &'static str,
    subject: S,
    undo: Undo<'a>,
}

/// `S` names what an undo action repairs, so a failed rollback can say
/// which resource was left behind.
pub struct Saga<'a, S> {
    name: &'static str,
    compensations: Vec<Compensation<'a, S>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUndo<S> {
    pub step: &'static str,
    pub subject: S,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackReport<S> {
    pub undone: Vec<&'static str>,
    /// Newest first, in the order the undo actions ran.
    pub failed: Vec<FailedUndo<S>>,
}

impl<S> Default for RollbackReport<S> {
    fn default() -> Self {
        Self {
            undone: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<S: Display> RollbackReport<S> {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human-readable list of the undo actions that failed.
    pub fn failures(&self) -> String {
        self.failed
            .iter()
            .map(|f| format!("{} ({}): {}", f.step, f.subject, f.reason))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<'a, S: Display> Saga<'a, S> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
        }
    }

    /// Registers how to undo `step`, which has just completed and
    /// affected `subject`.
    pub fn on_rollback<F, Fut, E>(&mut self, step: &'static str, subject: S, undo: F)
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<(), E>> + Send + 'a,
        E: Display,
    {
        debug!(saga = self.name, step, %subject, "step completed");
        self.compensations.push(Compensation {
            step,
            subject,
            undo: Box::new(move || async move { undo().await.map_err(|e| e.to_string()) }.boxed()),
        });
    }

    /// `step` is irreversible; nothing before it will be rolled back.
    pub fn pivot(&mut self, step: &'static str) {
        if !self.compensations.is_empty() {
            debug!(
                saga = self.name,
                step,
                discarded = self.compensations.len(),
                "pivot reached, earlier steps are final"
            );
        }
        self.compensations.clear();
    }

    pub fn commit(self) {
        debug!(saga = self.name, "saga committed");
    }

    /// Runs every registered undo action, newest first, and keeps going
    /// past failures.
    pub async fn rollback(self) -> RollbackReport<S> {
        let mut report = RollbackReport::default();

        for Compensation { step, subject, undo } in self.compensations.into_iter().rev() {
            match undo().await {
                Ok(()) => {
                    warn!(saga = self.name, step, %subject, "step rolled back");
                    report.undone.push(step);
                }
                Err(reason) => {
                    error!(saga = self.name, step, %subject, %reason, "rollback of step failed");
                    report.failed.push(FailedUndo {
                        step,
                        subject,
                        reason,
                    });
                }
            }
        }

        report
    }
}
