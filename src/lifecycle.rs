// SPDX-License-Identifier: GPL-3.0-only

//! Lifecycle owner for the keyboard view.
//!
//! The keyboard surface is not hosted by a regular window container, so
//! nothing drives a lifecycle for it. The service owns a [`Lifecycle`] and
//! feeds it [`LifecycleEvent`]s at the points where the host creates, shows,
//! hides and destroys the input view. Components that need the state get a
//! reference at construction time.
//!
//! # State machine
//!
//! ```text
//! Initialized --Create--> Created --Start--> Started --Resume--> Resumed
//!                            ^                  |  ^                |
//!                            +------Stop--------+  +-----Pause------+
//!
//! any state except Destroyed --Destroy--> Destroyed
//! ```

/// Lifecycle states, ordered from least to most active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Terminal state. No further events are accepted.
    Destroyed,
    /// Constructed but not yet created.
    Initialized,
    /// Created, view not shown.
    Created,
    /// View shown but not interactive.
    Started,
    /// View shown and receiving input.
    Resumed,
}

/// Events driving the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// The state this event moves to.
    #[must_use]
    pub fn target_state(self) -> LifecycleState {
        match self {
            LifecycleEvent::Create | LifecycleEvent::Stop => LifecycleState::Created,
            LifecycleEvent::Start | LifecycleEvent::Pause => LifecycleState::Started,
            LifecycleEvent::Resume => LifecycleState::Resumed,
            LifecycleEvent::Destroy => LifecycleState::Destroyed,
        }
    }

    /// The state this event must be applied from, or `None` if any live
    /// state is accepted.
    fn source_state(self) -> Option<LifecycleState> {
        match self {
            LifecycleEvent::Create => Some(LifecycleState::Initialized),
            LifecycleEvent::Start | LifecycleEvent::Stop => None,
            LifecycleEvent::Resume => Some(LifecycleState::Started),
            LifecycleEvent::Pause => Some(LifecycleState::Resumed),
            LifecycleEvent::Destroy => None,
        }
    }
}

/// Errors raised by [`Lifecycle::handle_event`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot apply {event:?} in state {state:?}")]
    InvalidTransition {
        state: LifecycleState,
        event: LifecycleEvent,
    },
}

/// Explicit lifecycle owner plus the saved-state restoration flag.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    restored: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Initialized,
            restored: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns `true` if the current state is at least `state`.
    #[must_use]
    pub fn is_at_least(&self, state: LifecycleState) -> bool {
        self.state >= state
    }

    /// Marks saved state as restored. The keyboard keeps no saved state, so
    /// this only records that restoration happened before creation.
    pub fn perform_restore(&mut self) {
        self.restored = true;
    }

    /// Whether [`perform_restore`](Self::perform_restore) has been called.
    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Applies an event.
    ///
    /// `Start` is accepted from `Created` and is a no-op from `Started` or
    /// `Resumed`, matching hosts that re-show an already visible view.
    /// `Stop` from `Resumed` implies the missing `Pause`.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> Result<LifecycleState, LifecycleError> {
        let invalid = LifecycleError::InvalidTransition {
            state: self.state,
            event,
        };

        if self.state == LifecycleState::Destroyed {
            return Err(invalid);
        }

        match event {
            LifecycleEvent::Start => match self.state {
                LifecycleState::Created => self.state = LifecycleState::Started,
                LifecycleState::Started | LifecycleState::Resumed => {}
                _ => return Err(invalid),
            },
            LifecycleEvent::Stop => match self.state {
                LifecycleState::Started | LifecycleState::Resumed => {
                    self.state = LifecycleState::Created;
                }
                LifecycleState::Created => {}
                _ => return Err(invalid),
            },
            LifecycleEvent::Destroy => self.state = LifecycleState::Destroyed,
            other => {
                if other.source_state() != Some(self.state) {
                    return Err(invalid);
                }
                self.state = other.target_state();
            }
        }

        tracing::debug!("Lifecycle {:?} -> {:?}", event, self.state);
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_forward_and_back() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Initialized);

        for (event, expected) in [
            (LifecycleEvent::Create, LifecycleState::Created),
            (LifecycleEvent::Start, LifecycleState::Started),
            (LifecycleEvent::Resume, LifecycleState::Resumed),
            (LifecycleEvent::Pause, LifecycleState::Started),
            (LifecycleEvent::Stop, LifecycleState::Created),
            (LifecycleEvent::Destroy, LifecycleState::Destroyed),
        ] {
            assert_eq!(lifecycle.handle_event(event), Ok(expected));
        }
    }

    #[test]
    fn test_resume_requires_started() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.handle_event(LifecycleEvent::Create).unwrap();

        let err = lifecycle.handle_event(LifecycleEvent::Resume).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                state: LifecycleState::Created,
                event: LifecycleEvent::Resume,
            }
        );
        assert_eq!(lifecycle.state(), LifecycleState::Created);
    }

    #[test]
    fn test_destroyed_is_terminal() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.handle_event(LifecycleEvent::Destroy).unwrap();

        assert!(lifecycle.handle_event(LifecycleEvent::Create).is_err());
        assert!(lifecycle.handle_event(LifecycleEvent::Destroy).is_err());
    }

    #[test]
    fn test_repeated_start_is_noop() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.handle_event(LifecycleEvent::Create).unwrap();
        lifecycle.handle_event(LifecycleEvent::Start).unwrap();
        lifecycle.handle_event(LifecycleEvent::Resume).unwrap();

        assert_eq!(
            lifecycle.handle_event(LifecycleEvent::Start),
            Ok(LifecycleState::Resumed)
        );
    }

    #[test]
    fn test_is_at_least() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.handle_event(LifecycleEvent::Create).unwrap();
        lifecycle.handle_event(LifecycleEvent::Start).unwrap();

        assert!(lifecycle.is_at_least(LifecycleState::Created));
        assert!(lifecycle.is_at_least(LifecycleState::Started));
        assert!(!lifecycle.is_at_least(LifecycleState::Resumed));
    }

    #[test]
    fn test_restore_flag() {
        let mut lifecycle = Lifecycle::new();
        assert!(!lifecycle.is_restored());
        lifecycle.perform_restore();
        assert!(lifecycle.is_restored());
    }
}
