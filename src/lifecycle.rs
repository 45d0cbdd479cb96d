/// Host lifecycle as seen by the sensor and render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Active,
    Paused,
    Destroyed,
}

/// Events delivered by the windowing host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// View became visible / the app was resumed.
    Resume,
    /// View was hidden / the app was suspended.
    Pause,
    /// Window is closing.
    Destroy,
}

/// What the host must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEffect {
    RegisterSensor,
    UnregisterSensor,
    /// Transition happened but nothing needs doing (e.g. destroying a view
    /// whose sensor was never registered).
    None,
}

#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }

    /// Apply an event. Returns `None` if the event does not apply in the
    /// current state; the state is left unchanged in that case.
    pub fn handle(&mut self, event: LifecycleEvent) -> Option<LifecycleEffect> {
        use LifecycleEffect as Fx;
        use LifecycleEvent as Ev;
        use LifecycleState as St;

        let (next, effect) = match (self.state, event) {
            (St::Uninitialized | St::Paused, Ev::Resume) => (St::Active, Fx::RegisterSensor),
            (St::Active, Ev::Pause) => (St::Paused, Fx::UnregisterSensor),
            (St::Active, Ev::Destroy) => (St::Destroyed, Fx::UnregisterSensor),
            (St::Uninitialized | St::Paused, Ev::Destroy) => (St::Destroyed, Fx::None),
            (state, event) => {
                tracing::debug!(?state, ?event, "Ignoring lifecycle event");
                return None;
            }
        };

        tracing::info!(from = ?self.state, to = ?next, "Lifecycle transition");
        self.state = next;
        Some(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_pause_resume_destroy() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.state(), LifecycleState::Uninitialized);

        assert_eq!(lc.handle(LifecycleEvent::Resume), Some(LifecycleEffect::RegisterSensor));
        assert!(lc.is_active());

        assert_eq!(lc.handle(LifecycleEvent::Pause), Some(LifecycleEffect::UnregisterSensor));
        assert_eq!(lc.state(), LifecycleState::Paused);

        assert_eq!(lc.handle(LifecycleEvent::Resume), Some(LifecycleEffect::RegisterSensor));
        assert_eq!(lc.handle(LifecycleEvent::Destroy), Some(LifecycleEffect::UnregisterSensor));
        assert_eq!(lc.state(), LifecycleState::Destroyed);
    }

    #[test]
    fn duplicate_events_are_ignored() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.handle(LifecycleEvent::Pause), None);
        assert_eq!(lc.state(), LifecycleState::Uninitialized);

        lc.handle(LifecycleEvent::Resume);
        assert_eq!(lc.handle(LifecycleEvent::Resume), None);

        lc.handle(LifecycleEvent::Pause);
        assert_eq!(lc.handle(LifecycleEvent::Pause), None);
        assert_eq!(lc.state(), LifecycleState::Paused);
    }

    #[test]
    fn paused_destroy_does_not_unregister_twice() {
        let mut lc = Lifecycle::new();
        lc.handle(LifecycleEvent::Resume);
        lc.handle(LifecycleEvent::Pause);
        assert_eq!(lc.handle(LifecycleEvent::Destroy), Some(LifecycleEffect::None));
    }

    #[test]
    fn destroyed_is_terminal() {
        let mut lc = Lifecycle::new();
        lc.handle(LifecycleEvent::Destroy);
        for event in [LifecycleEvent::Resume, LifecycleEvent::Pause, LifecycleEvent::Destroy] {
            assert_eq!(lc.handle(event), None);
            assert_eq!(lc.state(), LifecycleState::Destroyed);
        }
    }
}
