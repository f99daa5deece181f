use std::time::Duration;

/// A running repeat timer. Cancelling consumes the handle.
pub trait TimerHandle {
    fn cancel(self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerKind {
    Lobby,
    Chat,
    Ticket,
}

impl PollerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::Chat => "chat",
            Self::Ticket => "ticket",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling { key: u64 },
}

/// Idle/polling state machine owning at most one timer.
pub struct Poller<H: TimerHandle> {
    kind: PollerKind,
    active: Option<(u64, H)>,
}

impl<H: TimerHandle> Poller<H> {
    #[must_use]
    pub fn new(kind: PollerKind) -> Self {
        Self { kind, active: None }
    }

    #[must_use]
    pub fn kind(&self) -> PollerKind {
        self.kind
    }

    #[must_use]
    pub fn state(&self) -> PollerState {
        match &self.active {
            Some((key, _)) => PollerState::Polling { key: *key },
            None => PollerState::Idle,
        }
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.active.is_some()
    }

    /// Cancels any running timer before `schedule` creates the new one,
    /// so at most one timer per poller is ever live.
    pub fn start(&mut self, key: u64, interval: Duration, schedule: impl FnOnce(Duration) -> H) {
        if self.stop() {
            tracing::debug!(poller = self.kind.as_str(), "restarting poller");
        }
        let handle = schedule(interval);
        tracing::info!(
            poller = self.kind.as_str(),
            key,
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "poller started"
        );
        self.active = Some((key, handle));
    }

    /// Returns whether a timer was cancelled.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some((key, handle)) => {
                handle.cancel();
                tracing::debug!(poller = self.kind.as_str(), key, "poller stopped");
                true
            }
            None => false,
        }
    }
}

pub struct PollerSet<H: TimerHandle> {
    pub lobby: Poller<H>,
    pub chat: Poller<H>,
    pub ticket: Poller<H>,
}

impl<H: TimerHandle> Default for PollerSet<H> {
    fn default() -> Self {
        Self {
            lobby: Poller::new(PollerKind::Lobby),
            chat: Poller::new(PollerKind::Chat),
            ticket: Poller::new(PollerKind::Ticket),
        }
    }
}

impl<H: TimerHandle> PollerSet<H> {
    pub fn get_mut(&mut self, kind: PollerKind) -> &mut Poller<H> {
        match kind {
            PollerKind::Lobby => &mut self.lobby,
            PollerKind::Chat => &mut self.chat,
            PollerKind::Ticket => &mut self.ticket,
        }
    }

    /// Returns how many timers were cancelled.
    pub fn stop_all(&mut self) -> usize {
        [&mut self.lobby, &mut self.chat, &mut self.ticket]
            .into_iter()
            .map(Poller::stop)
            .filter(|stopped| *stopped)
            .count()
    }
}
