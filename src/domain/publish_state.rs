//! Reentrancy guard for the local dispatcher.

use std::cell::Cell;
use std::marker::PhantomData;

/// Whether a dispatcher is currently delivering an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishState {
    #[default]
    Idle,
    Publishing,
}

impl PublishState {
    pub fn is_publishing(self) -> bool {
        self == PublishState::Publishing
    }
}

/// Holds a dispatcher in `Publishing` for as long as it is alive.
///
/// Dropping the guard always moves the state back to `Idle`, including when a
/// subscriber returns an error or panics.
pub(crate) struct PublishGuard<'a> {
    state: &'a Cell<PublishState>,
}

impl<'a> PublishGuard<'a> {
    /// Move `Idle -> Publishing`. Returns `None` if a publish is already active.
    pub(crate) fn enter(state: &'a Cell<PublishState>) -> Option<Self> {
        match state.get() {
            PublishState::Idle => {
                state.set(PublishState::Publishing);
                Some(Self { state })
            }
            PublishState::Publishing => None,
        }
    }
}

impl Drop for PublishGuard<'_> {
    fn drop(&mut self) {
        self.state.set(PublishState::Idle);
    }
}

thread_local! {
    static THREAD_STATE: Cell<PublishState> = const { Cell::new(PublishState::Idle) };
}

/// Whether any thread-ambient dispatcher on this thread is delivering.
pub(crate) fn thread_is_publishing() -> bool {
    THREAD_STATE
        .try_with(|state| state.get().is_publishing())
        .unwrap_or(false)
}

/// Like [`PublishGuard`], but over the one state shared by every ambient
/// dispatcher of the calling thread, whatever its event type.
pub(crate) struct ThreadPublishGuard {
    _not_send: PhantomData<*const ()>,
}

impl ThreadPublishGuard {
    pub(crate) fn enter() -> Option<Self> {
        THREAD_STATE
            .try_with(|state| match state.get() {
                PublishState::Idle => {
                    state.set(PublishState::Publishing);
                    Some(Self {
                        _not_send: PhantomData,
                    })
                }
                PublishState::Publishing => None,
            })
            .ok()
            .flatten()
    }
}

impl Drop for ThreadPublishGuard {
    fn drop(&mut self) {
        let _ = THREAD_STATE.try_with(|state| state.set(PublishState::Idle));
    }
}
