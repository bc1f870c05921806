//! Single active speaking session and its cancellation token.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::playback::ActivePlayback;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: Mutex<bool>,
    changed: Condvar,
}

/// Cancellation flag for one speaking session.
///
/// Sequential playback checks it before every step; cancelling never
/// interrupts a step already in progress, that is the job of stopping the
/// attached playback.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    generation: u64,
    state: Arc<TokenState>,
}

impl CancellationToken {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            state: Arc::new(TokenState::default()),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        *lock(&self.state.cancelled)
    }

    pub(crate) fn cancel(&self) {
        let mut cancelled = lock(&self.state.cancelled);
        if !*cancelled {
            *cancelled = true;
            self.state.changed.notify_all();
        }
    }

    /// Sleeps for `duration` unless cancelled first. Returns `true` if the
    /// token was cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut cancelled = lock(&self.state.cancelled);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = match self.state.changed.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        *cancelled
    }
}

struct CurrentSession {
    token: CancellationToken,
    playback: Option<Arc<dyn ActivePlayback>>,
}

#[derive(Default)]
struct RegistryState {
    generation: u64,
    current: Option<CurrentSession>,
}

impl RegistryState {
    fn is_current(&self, token: &CancellationToken) -> bool {
        self.current
            .as_ref()
            .is_some_and(|session| session.token.generation == token.generation)
    }

    fn interrupt(&mut self) -> Option<u64> {
        let session = self.current.take()?;
        session.token.cancel();
        if let Some(playback) = session.playback {
            playback.stop();
        }
        Some(session.token.generation)
    }
}

/// Tracks the one session allowed to make sound.
///
/// Every side effect of a session (attaching a clip, emitting an utterance)
/// happens under the registry lock and only while its token is current, so a
/// superseded session can never be heard.
#[derive(Default)]
pub(crate) struct SessionRegistry {
    state: Mutex<RegistryState>,
}

impl SessionRegistry {
    /// Interrupts the current session and opens a new one. `on_interrupt`
    /// runs under the registry lock after the old session was stopped.
    pub(crate) fn begin(&self, on_interrupt: impl FnOnce()) -> CancellationToken {
        let mut state = lock(&self.state);
        if let Some(previous) = state.interrupt() {
            log::debug!("Speech session {previous} interrupted");
        }
        on_interrupt();

        state.generation += 1;
        let token = CancellationToken::new(state.generation);
        state.current = Some(CurrentSession {
            token: token.clone(),
            playback: None,
        });
        log::debug!("Speech session {} started", token.generation);
        token
    }

    /// Stops the current session without starting another.
    pub(crate) fn end(&self, on_interrupt: impl FnOnce()) {
        let mut state = lock(&self.state);
        if let Some(previous) = state.interrupt() {
            log::debug!("Speech session {previous} stopped");
        }
        on_interrupt();
    }

    /// Marks `token`'s session as done if it is still current.
    pub(crate) fn finish(&self, token: &CancellationToken) {
        let mut state = lock(&self.state);
        if state.is_current(token) {
            state.current = None;
            log::debug!("Speech session {} finished", token.generation);
        }
    }

    pub(crate) fn is_current(&self, token: &CancellationToken) -> bool {
        lock(&self.state).is_current(token)
    }

    /// Makes `playback` the session's sound. A stale session's playback is
    /// stopped on the spot and `false` returned.
    pub(crate) fn attach(&self, token: &CancellationToken, playback: Arc<dyn ActivePlayback>) -> bool {
        let mut state = lock(&self.state);
        if state.is_current(token) {
            if let Some(session) = state.current.as_mut() {
                if let Some(previous) = session.playback.replace(playback) {
                    previous.stop();
                }
                return true;
            }
        }
        drop(state);
        log::debug!("Discarding playback of stale session {}", token.generation);
        playback.stop();
        false
    }

    /// Runs `f` under the registry lock if `token` is still current.
    pub(crate) fn run_if_current<R>(&self, token: &CancellationToken, f: impl FnOnce() -> R) -> Option<R> {
        let state = lock(&self.state);
        if state.is_current(token) {
            Some(f())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackControl;

    #[test]
    fn new_session_cancels_previous() {
        let registry = SessionRegistry::default();
        let first = registry.begin(|| {});
        let second = registry.begin(|| {});
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!registry.is_current(&first));
        assert!(registry.is_current(&second));
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn interrupt_stops_attached_playback() {
        let registry = SessionRegistry::default();
        let token = registry.begin(|| {});
        let control = PlaybackControl::new();
        assert!(registry.attach(&token, control.clone()));

        let mut interrupted = false;
        registry.end(|| interrupted = true);
        assert!(interrupted);
        assert!(control.is_stopped());
        assert!(token.is_cancelled());
    }

    #[test]
    fn stale_attach_is_stopped() {
        let registry = SessionRegistry::default();
        let stale = registry.begin(|| {});
        let _current = registry.begin(|| {});
        let control = PlaybackControl::new();
        assert!(!registry.attach(&stale, control.clone()));
        assert!(control.is_stopped());
        assert_eq!(registry.run_if_current(&stale, || 1), None);
    }

    #[test]
    fn sleep_wakes_on_cancel() {
        let registry = Arc::new(SessionRegistry::default());
        let token = registry.begin(|| {});
        let remote = Arc::clone(&registry);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.end(|| {});
        });
        let start = Instant::now();
        assert!(token.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn finished_session_is_no_longer_current() {
        let registry = SessionRegistry::default();
        let token = registry.begin(|| {});
        assert!(!token.sleep(Duration::from_millis(1)));
        registry.finish(&token);
        assert!(!registry.is_current(&token));
        assert!(!token.is_cancelled());
    }
}
