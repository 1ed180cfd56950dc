use std::thread::sleep;
use std::time::{Instant, Duration};

/// Tracks the quiet period a display needs after a DDC/CI transaction
/// before it will accept the next one.
#[derive(Clone, Debug, Default)]
pub struct Delay {
    time: Option<Instant>,
    delay: Duration,
}

impl Delay {
    /// Creates a new delay starting now.
    pub fn new(delay: Duration) -> Self {
        Delay {
            time: Some(Instant::now()),
            delay,
        }
    }

    /// Creates a new delay of `ms` milliseconds starting now.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// The time remaining in this delay.
    pub fn remaining(&self) -> Duration {
        self.time.as_ref()
            .and_then(|time| self.delay.checked_sub(time.elapsed()))
            .unwrap_or_default()
    }

    /// Waits out the remaining time in this delay. Later calls return
    /// immediately.
    pub fn sleep(&mut self) {
        if let Some(delay) = self.time.take().and_then(|time| self.delay.checked_sub(time.elapsed())) {
            sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_nothing_to_wait_for() {
        let mut delay = Delay::default();
        assert_eq!(delay.remaining(), Duration::default());
        let start = Instant::now();
        delay.sleep();
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn sleep_waits_out_the_remainder_once() {
        let mut delay = Delay::from_millis(30);
        assert!(delay.remaining() <= Duration::from_millis(30));
        let start = Instant::now();
        delay.sleep();
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(delay.remaining(), Duration::default());

        let start = Instant::now();
        delay.sleep();
        assert!(start.elapsed() < Duration::from_millis(20));
    }
}
