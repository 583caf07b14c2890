use std::time::Duration;
use tokio::{
    sync::mpsc,
    time::{interval_at, Instant, MissedTickBehavior},
};

/// Progress notifications emitted while the timer runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One more second of the session has elapsed
    Tick { elapsed_secs: u64, total_secs: u64 },
    /// Strict mode swallowed an interrupt; the timer restarts for what is left
    Refused {
        elapsed_secs: u64,
        remaining_secs: u64,
    },
}

/// How the countdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// Ran for the whole duration, absorbing `restarts` strict-mode interrupts
    Completed { restarts: u32 },
    /// Stopped early by the user
    Interrupted { elapsed_secs: u64 },
}

enum Phase {
    Expired,
    Interrupted { ran_secs: u64 },
}

/// Foreground countdown of a focus session.
///
/// Interrupts arrive on a channel. In strict mode an interrupt restarts the
/// countdown for the remaining seconds instead of ending it.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    total_secs: u64,
    strict: bool,
    tick: Duration,
}

impl SessionTimer {
    #[must_use]
    pub fn new(total_secs: u64, strict: bool) -> Self {
        Self {
            total_secs,
            strict,
            tick: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// Run until the duration expires or a non-strict interrupt arrives.
    ///
    /// A closed interrupt channel just means no further interrupts.
    pub async fn run<F>(
        &self,
        interrupts: &mut mpsc::UnboundedReceiver<()>,
        mut on_event: F,
    ) -> TimerOutcome
    where
        F: FnMut(TimerEvent),
    {
        let mut remaining = self.total_secs;
        let mut restarts = 0;
        let mut listening = true;

        loop {
            match self
                .run_phase(remaining, interrupts, &mut listening, &mut on_event)
                .await
            {
                Phase::Expired => return TimerOutcome::Completed { restarts },
                Phase::Interrupted { ran_secs } => {
                    remaining -= ran_secs;
                    let elapsed_secs = self.total_secs - remaining;

                    if !self.strict {
                        log::info!("Focus session interrupted after {elapsed_secs}s");
                        return TimerOutcome::Interrupted { elapsed_secs };
                    }

                    restarts += 1;
                    log::debug!("Strict mode: restarting timer for {remaining}s");
                    on_event(TimerEvent::Refused {
                        elapsed_secs,
                        remaining_secs: remaining,
                    });
                }
            }
        }
    }

    async fn run_phase<F>(
        &self,
        remaining: u64,
        interrupts: &mut mpsc::UnboundedReceiver<()>,
        listening: &mut bool,
        on_event: &mut F,
    ) -> Phase
    where
        F: FnMut(TimerEvent),
    {
        let offset = self.total_secs - remaining;
        let mut ticker = interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ran_secs = 0;
        while ran_secs < remaining {
            tokio::select! {
                _ = ticker.tick() => {
                    ran_secs += 1;
                    on_event(TimerEvent::Tick {
                        elapsed_secs: offset + ran_secs,
                        total_secs: self.total_secs,
                    });
                }
                signal = interrupts.recv(), if *listening => match signal {
                    Some(()) => return Phase::Interrupted { ran_secs },
                    None => *listening = false,
                },
            }
        }
        Phase::Expired
    }
}
