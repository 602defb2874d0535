//! Copy-count reconciliation for one book.
//!
//! The reconciler keeps `0 <= available <= total` across user-driven
//! increment and decrement actions. Incrementing past the total never
//! commits on its own: it parks in [`CopyState::PendingConfirm`] with a
//! proposal that grows both counters, and only an explicit confirm sends it.
//!
//! The transition methods ([`CopyReconciler::increment`],
//! [`CopyReconciler::decrement`], [`CopyReconciler::confirm`],
//! [`CopyReconciler::cancel`], [`CopyReconciler::settle`]) are pure; the
//! async [`CopyReconciler::dispatch`] drives them against a [`BookUpdater`]
//! and reports the result through a [`Notifier`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::{ApiError, ApiResult, LibraryApi};
use crate::model::{Book, BookPatch, CopyCounts};

/// Remote persistence of a partial book update.
///
/// The returned record is authoritative: the reconciler adopts its counters
/// verbatim.
#[async_trait]
pub trait BookUpdater: Send + Sync {
    async fn update_book(&self, id: Uuid, patch: &BookPatch) -> ApiResult<Book>;
}

#[async_trait]
impl<T> BookUpdater for T
where
    T: LibraryApi + ?Sized,
{
    async fn update_book(&self, id: Uuid, patch: &BookPatch) -> ApiResult<Book> {
        LibraryApi::update_book(self, id, patch).await
    }
}

/// User-facing message produced at the end of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Interaction state for one book's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Idle,
    /// Waiting for the user to approve growing the total.
    PendingConfirm(CopyCounts),
    /// A request carrying these counts is in flight.
    Committing(CopyCounts),
    /// The last commit failed and the counters were restored.
    Reverted,
}

/// User actions on the counter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyAction {
    Increment,
    Decrement,
    Confirm,
    Cancel,
}

/// A single update request to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub book_id: Uuid,
    pub proposed: CopyCounts,
    pub patch: BookPatch,
}

/// Result of a pure transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing to do in the current state.
    Ignored,
    AwaitConfirm(CopyCounts),
    Cancelled,
    Commit(Commit),
}

/// Result of a dispatched action, after any commit has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    NeedsConfirmation(CopyCounts),
    Cancelled,
    Committed(CopyCounts),
    Reverted { restored: CopyCounts, error: ApiError },
}

#[derive(Debug, Clone)]
pub struct CopyReconciler {
    book_id: Uuid,
    title: String,
    confirmed: CopyCounts,
    state: CopyState,
}

impl CopyReconciler {
    pub fn new(book: &Book) -> Self {
        Self {
            book_id: book.id,
            title: book.title.clone(),
            confirmed: book.counts(),
            state: CopyState::Idle,
        }
    }

    pub fn book_id(&self) -> Uuid {
        self.book_id
    }

    /// Last server-confirmed counters; what the control displays.
    pub fn counts(&self) -> CopyCounts {
        self.confirmed
    }

    pub fn state(&self) -> CopyState {
        self.state
    }

    fn accepts_counter_actions(&self) -> bool {
        matches!(self.state, CopyState::Idle | CopyState::Reverted)
    }

    /// Whether the decrement control is enabled.
    pub fn can_decrement(&self) -> bool {
        self.accepts_counter_actions() && self.confirmed.available > 0
    }

    pub fn can_increment(&self) -> bool {
        self.accepts_counter_actions()
    }

    pub fn decrement(&mut self) -> Transition {
        if !self.can_decrement() {
            return Transition::Ignored;
        }

        let proposed = CopyCounts::new(self.confirmed.available - 1, self.confirmed.total);
        self.begin_commit(proposed, BookPatch::counts(proposed.available, None))
    }

    pub fn increment(&mut self) -> Transition {
        if !self.can_increment() {
            return Transition::Ignored;
        }

        let Some(next) = self.confirmed.available.checked_add(1) else {
            return Transition::Ignored;
        };
        if next <= self.confirmed.total {
            let proposed = CopyCounts::new(next, self.confirmed.total);
            return self.begin_commit(proposed, BookPatch::counts(next, None));
        }

        let Some(grown_total) = self.confirmed.total.checked_add(1) else {
            return Transition::Ignored;
        };
        let proposed = CopyCounts::new(next, grown_total);
        self.state = CopyState::PendingConfirm(proposed);
        Transition::AwaitConfirm(proposed)
    }

    pub fn confirm(&mut self) -> Transition {
        match self.state {
            CopyState::PendingConfirm(proposed) => self.begin_commit(
                proposed,
                BookPatch::counts(proposed.available, Some(proposed.total)),
            ),
            _ => Transition::Ignored,
        }
    }

    pub fn cancel(&mut self) -> Transition {
        match self.state {
            CopyState::PendingConfirm(_) => {
                self.state = CopyState::Idle;
                Transition::Cancelled
            }
            _ => Transition::Ignored,
        }
    }

    pub fn apply(&mut self, action: CopyAction) -> Transition {
        match action {
            CopyAction::Increment => self.increment(),
            CopyAction::Decrement => self.decrement(),
            CopyAction::Confirm => self.confirm(),
            CopyAction::Cancel => self.cancel(),
        }
    }

    fn begin_commit(&mut self, proposed: CopyCounts, patch: BookPatch) -> Transition {
        self.state = CopyState::Committing(proposed);
        Transition::Commit(Commit {
            book_id: self.book_id,
            proposed,
            patch,
        })
    }

    /// Resolve an in-flight commit with the server's answer.
    pub fn settle(&mut self, result: ApiResult<Book>) -> Outcome {
        if !matches!(self.state, CopyState::Committing(_)) {
            return Outcome::Unchanged;
        }

        match result {
            Ok(book) => {
                self.confirmed = book.counts();
                self.title = book.title;
                self.state = CopyState::Idle;
                Outcome::Committed(self.confirmed)
            }
            Err(error) => {
                self.state = CopyState::Reverted;
                Outcome::Reverted {
                    restored: self.confirmed,
                    error,
                }
            }
        }
    }

    /// Run one action end to end: transition, commit, settle, notify.
    ///
    /// Errors never escape; a failed commit comes back as
    /// [`Outcome::Reverted`] after exactly one failure notification.
    pub async fn dispatch<U, N>(&mut self, action: CopyAction, updater: &U, notifier: &N) -> Outcome
    where
        U: BookUpdater + ?Sized,
        N: Notifier + ?Sized,
    {
        let commit = match self.apply(action) {
            Transition::Ignored => return Outcome::Unchanged,
            Transition::Cancelled => return Outcome::Cancelled,
            Transition::AwaitConfirm(proposed) => {
                tracing::debug!(
                    book_id = %self.book_id,
                    available = proposed.available,
                    total = proposed.total,
                    "increment exceeds total copies, awaiting confirmation"
                );
                return Outcome::NeedsConfirmation(proposed);
            }
            Transition::Commit(commit) => commit,
        };

        let result = updater.update_book(commit.book_id, &commit.patch).await;
        let outcome = self.settle(result);

        match &outcome {
            Outcome::Committed(counts) => {
                tracing::info!(
                    book_id = %self.book_id,
                    available = counts.available,
                    total = counts.total,
                    "copy counts committed"
                );
                notifier.notify(Notification::Success(format!(
                    "Copies updated for \"{}\"",
                    self.title
                )));
            }
            Outcome::Reverted { restored, error } => {
                tracing::warn!(
                    book_id = %self.book_id,
                    available = restored.available,
                    total = restored.total,
                    error = %error,
                    "copy count update failed, reverted"
                );
                notifier.notify(Notification::Failure(format!(
                    "Failed to update copies: {error}"
                )));
            }
            _ => {}
        }

        outcome
    }
}
