use crate::destroyable::Destroyable;
use crate::game::clock::Clock;
use crate::game::storage::{GameStorage, KeyValueStore};
use crate::model::{CooldownState, GameType};
use glib::{timeout_add_local, ControlFlow, SourceId};
use log::trace;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

pub const COOLDOWN_PERIOD: Duration = Duration::from_secs(12 * 60 * 60);
pub const COOLDOWN_TICK: Duration = Duration::from_secs(1);

/// Time left before a game type can be played again.
pub fn remaining_cooldown(last_played: Option<i64>, now_ms: i64, period: Duration) -> Duration {
    let Some(last_played) = last_played else {
        return Duration::ZERO;
    };
    let elapsed = now_ms.saturating_sub(last_played).max(0) as u128;
    let remaining = period.as_millis().saturating_sub(elapsed);
    Duration::from_millis(remaining as u64)
}

/// Answers cooldown questions from the stored last-played timestamps.
pub struct CooldownTracker<S: KeyValueStore> {
    storage: Rc<GameStorage<S>>,
    clock: Rc<dyn Clock>,
    period: Duration,
}

impl<S: KeyValueStore> Clone for CooldownTracker<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
            clock: Rc::clone(&self.clock),
            period: self.period,
        }
    }
}

impl<S: KeyValueStore> CooldownTracker<S> {
    pub fn new(storage: Rc<GameStorage<S>>, clock: Rc<dyn Clock>, period: Duration) -> Self {
        Self {
            storage,
            clock,
            period,
        }
    }

    pub fn remaining(&self, game_type: GameType) -> Duration {
        remaining_cooldown(
            self.storage.get_last_played(game_type),
            self.clock.now_ms(),
            self.period,
        )
    }

    pub fn is_on_cooldown(&self, game_type: GameType) -> bool {
        !self.remaining(game_type).is_zero()
    }

    pub fn state(&self, game_type: GameType) -> CooldownState {
        CooldownState::new(self.remaining(game_type))
    }
}

struct RunningTimer {
    generation: u64,
    source_id: SourceId,
}

type TimerMap = RefCell<HashMap<GameType, RunningTimer>>;

/// Registry of cooldown pollers, at most one per game type.
///
/// Timers run on the default glib main context and stop themselves once the
/// cooldown reaches zero.
pub struct CooldownTimers {
    tick: Duration,
    timers: Rc<TimerMap>,
    next_generation: Cell<u64>,
}

/// Cancels one poller started by [`CooldownTimers::start`].
pub struct CooldownHandle {
    game_type: GameType,
    generation: u64,
    timers: Weak<TimerMap>,
}

impl CooldownHandle {
    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn cancel(self) {
        if let Some(timers) = self.timers.upgrade() {
            cancel_timer(&timers, self.game_type, Some(self.generation));
        }
    }
}

fn cancel_timer(timers: &TimerMap, game_type: GameType, generation: Option<u64>) -> bool {
    let mut timers = timers.borrow_mut();
    let matches = timers
        .get(&game_type)
        .is_some_and(|timer| generation.map_or(true, |generation| timer.generation == generation));
    if !matches {
        return false;
    }
    if let Some(timer) = timers.remove(&game_type) {
        trace!(target: "cooldown", "Cancelling cooldown timer for {}", game_type);
        timer.source_id.remove();
    }
    true
}

impl CooldownTimers {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            timers: Rc::new(RefCell::new(HashMap::new())),
            next_generation: Cell::new(0),
        }
    }

    /// Publish the cooldown state for `game_type` every tick until it reaches zero.
    ///
    /// A poller already running for the game type is replaced.
    pub fn start<S, F>(
        &self,
        tracker: &CooldownTracker<S>,
        game_type: GameType,
        on_update: F,
    ) -> CooldownHandle
    where
        S: KeyValueStore + 'static,
        F: Fn(&CooldownState) + 'static,
    {
        self.cancel(game_type);

        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);

        let source_id = timeout_add_local(self.tick, {
            let tracker = tracker.clone();
            let timers = Rc::downgrade(&self.timers);
            move || {
                let state = tracker.state(game_type);
                on_update(&state);
                if state.is_on_cooldown {
                    return ControlFlow::Continue;
                }
                trace!(target: "cooldown", "Cooldown finished for {}", game_type);
                if let Some(timers) = timers.upgrade() {
                    let mut timers = timers.borrow_mut();
                    if timers
                        .get(&game_type)
                        .is_some_and(|timer| timer.generation == generation)
                    {
                        // the source is destroyed by returning Break
                        timers.remove(&game_type);
                    }
                }
                ControlFlow::Break
            }
        });

        self.timers.borrow_mut().insert(
            game_type,
            RunningTimer {
                generation,
                source_id,
            },
        );

        CooldownHandle {
            game_type,
            generation,
            timers: Rc::downgrade(&self.timers),
        }
    }

    pub fn cancel(&self, game_type: GameType) -> bool {
        cancel_timer(&self.timers, game_type, None)
    }

    pub fn is_running(&self, game_type: GameType) -> bool {
        self.timers.borrow().contains_key(&game_type)
    }

    pub fn clear_all(&self) {
        let drained: Vec<RunningTimer> = self
            .timers
            .borrow_mut()
            .drain()
            .map(|(_, timer)| timer)
            .collect();
        for timer in drained {
            timer.source_id.remove();
        }
    }
}

impl Default for CooldownTimers {
    fn default() -> Self {
        Self::new(COOLDOWN_TICK)
    }
}

impl Destroyable for CooldownTimers {
    fn destroy(&mut self) {
        self.clear_all();
    }
}

impl Drop for CooldownTimers {
    fn drop(&mut self) {
        self.clear_all();
    }
}
