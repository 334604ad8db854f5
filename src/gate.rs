use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Idle,
    Cooldown { deadline: Instant },
}

/// Trailing-edge debounce for host update notifications.
///
/// The first notification of a burst arms a window and is rejected, as is
/// everything inside the window. The first notification at or past the
/// deadline is admitted and closes the window. A stream that never pauses
/// past the deadline is never admitted.
#[derive(Debug, Clone)]
pub struct UpdateGate {
    delay: Duration,
    state: GateState,
}

impl UpdateGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: GateState::Idle,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_cooling_down(&self) -> bool {
        matches!(self.state, GateState::Cooldown { .. })
    }

    pub fn admit(&mut self, now: Instant) -> bool {
        match self.state {
            GateState::Idle => {
                self.state = GateState::Cooldown {
                    deadline: now + self.delay,
                };
                tracing::debug!("update gate armed for {:?}", self.delay);
                false
            }
            GateState::Cooldown { deadline } if now < deadline => false,
            GateState::Cooldown { .. } => {
                self.state = GateState::Idle;
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = GateState::Idle;
    }
}

impl Default for UpdateGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn admits_first_call_after_window() {
        let t0 = Instant::now();
        let mut gate = UpdateGate::new(ms(1000));
        assert!(!gate.admit(t0));
        assert!(!gate.admit(t0 + ms(500)));
        assert!(gate.admit(t0 + ms(1200)));
        assert!(!gate.is_cooling_down());
    }

    #[test]
    fn deadline_itself_is_admitted() {
        let t0 = Instant::now();
        let mut gate = UpdateGate::new(ms(1000));
        assert!(!gate.admit(t0));
        assert!(gate.admit(t0 + ms(1000)));
    }

    #[test]
    fn window_is_not_extended_by_calls_inside_it() {
        let t0 = Instant::now();
        let mut gate = UpdateGate::new(ms(1000));
        assert!(!gate.admit(t0));
        for step in 1..10 {
            assert!(!gate.admit(t0 + ms(step * 100)));
        }
        assert!(gate.admit(t0 + ms(1001)));
    }

    #[test]
    fn admission_starts_a_new_burst() {
        let t0 = Instant::now();
        let mut gate = UpdateGate::new(ms(1000));
        assert!(!gate.admit(t0));
        assert!(gate.admit(t0 + ms(1500)));
        assert!(!gate.admit(t0 + ms(1600)));
        assert!(gate.is_cooling_down());
        assert!(gate.admit(t0 + ms(2600)));
    }

    #[test]
    fn reset_returns_to_idle() {
        let t0 = Instant::now();
        let mut gate = UpdateGate::default();
        assert!(!gate.admit(t0));
        gate.reset();
        assert!(!gate.is_cooling_down());
        assert!(!gate.admit(t0 + ms(10)));
    }
}
