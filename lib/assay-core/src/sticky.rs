//! Sticky error state shared by a client and the inspectors it produces.
//!
//! An [`ErrorCell`] holds at most one error. The first write wins; later
//! writes are dropped. Inspectors never see the cell itself: they receive an
//! [`ErrorChannel`], a getter/setter pair injected by whoever built them.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::Error;

/// The recorded error, shared between the cell and every reader.
pub type SharedError = Arc<Error>;

/// Lock-guarded, write-once optional error.
///
/// Cloning the cell shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct ErrorCell {
    inner: Arc<RwLock<Option<SharedError>>>,
}

impl ErrorCell {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded error, if any.
    #[must_use]
    pub fn get(&self) -> Option<SharedError> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` once an error has been recorded.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Record `error` unless another error is already present.
    ///
    /// Returns `true` if this call stored the error.
    pub fn set(&self, error: Error) -> bool {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        tracing::debug!(error = %error, "recording sticky error");
        *slot = Some(Arc::new(error));
        true
    }

    /// Returns `true` if both handles point at the same slot.
    #[must_use]
    pub fn shares_slot_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// An accessor/mutator pair bound to this cell.
    #[must_use]
    pub fn channel(&self) -> ErrorChannel {
        let reader = self.clone();
        let writer = self.clone();
        ErrorChannel::new(
            move || reader.get(),
            move |error| {
                writer.set(error);
            },
        )
    }
}

type Getter = dyn Fn() -> Option<SharedError> + Send + Sync;
type Setter = dyn Fn(Error) + Send + Sync;

/// Getter/setter pair through which an inspector reads and reports the
/// sticky error it shares with its client.
#[derive(Clone)]
pub struct ErrorChannel {
    get: Arc<Getter>,
    set: Arc<Setter>,
}

impl fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("error", &self.error())
            .finish_non_exhaustive()
    }
}

impl ErrorChannel {
    /// Build a channel from an accessor and a mutator.
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> Option<SharedError> + Send + Sync + 'static,
        S: Fn(Error) + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    /// The current error as seen through the accessor.
    #[must_use]
    pub fn error(&self) -> Option<SharedError> {
        (self.get)()
    }

    /// Returns `true` if the accessor reports an error.
    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.error().is_some()
    }

    /// Hand `error` to the mutator.
    pub fn report(&self, error: Error) {
        (self.set)(error);
    }

    /// A channel whose mutator wraps every reported error with `context`.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let context = context.into();
        let set = self.set;
        Self {
            get: self.get,
            set: Arc::new(move |error: Error| set(error.context(context.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn empty_cell_has_no_error() {
        let cell = ErrorCell::new();
        check!(cell.get().is_none());
        check!(!cell.is_set());
    }

    #[test]
    fn first_error_wins() {
        let cell = ErrorCell::new();
        check!(cell.set(Error::expectation("first")));
        check!(!cell.set(Error::expectation("second")));

        let_assert!(Some(err) = cell.get());
        check!(err.to_string() == "first");
    }

    #[test]
    fn readers_see_the_same_value() {
        let cell = ErrorCell::new();
        cell.set(Error::Timeout);

        let_assert!(Some(a) = cell.get());
        let_assert!(Some(b) = cell.get());
        check!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn clones_share_the_slot() {
        let cell = ErrorCell::new();
        let other = cell.clone();
        other.set(Error::Timeout);

        check!(cell.is_set());
        check!(cell.shares_slot_with(&other));
        check!(!cell.shares_slot_with(&ErrorCell::new()));
    }

    #[test]
    fn channel_reads_and_writes_through_the_cell() {
        let cell = ErrorCell::new();
        let channel = cell.channel();
        check!(!channel.is_errored());

        channel.report(Error::expectation("boom"));
        check!(channel.is_errored());
        let_assert!(Some(err) = cell.get());
        check!(err.to_string() == "boom");
    }

    #[test]
    fn channel_context_wraps_reported_errors() {
        let cell = ErrorCell::new();
        let channel = cell
            .channel()
            .with_context(r#"doing a GET request to URL "http://localhost/x""#);

        channel.report(Error::expectation("expected status code 200 but got 404"));

        let_assert!(Some(err) = cell.get());
        insta::assert_snapshot!(
            err.to_string(),
            @r#"doing a GET request to URL "http://localhost/x": expected status code 200 but got 404"#
        );
    }

    #[test]
    fn concurrent_writers_record_exactly_one_error() {
        let cell = ErrorCell::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cell = cell.clone();
                thread::spawn(move || cell.set(Error::expectation(format!("writer {i}"))))
            })
            .collect();

        let stored = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .filter(|stored| *stored)
            .count();

        check!(stored == 1);
        check!(cell.is_set());
    }
}
