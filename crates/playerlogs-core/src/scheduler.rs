//! Interval scheduler: per-module counters multiplexed onto one shared tick.

use playerlogs_api::{Module, ModuleError, Settings};
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::registry::ModuleRegistry;

/// A recurring timer owned by one active module. Once cancelled it is never
/// resumed; reactivation creates a fresh timer.
#[derive(Debug)]
pub struct IntervalTimer {
    task_id: u32,
    module: String,
    cache_key: String,
    counter: u64,
    cancelled: bool,
}

impl IntervalTimer {
    pub fn task_id(&self) -> u32 {
        self.task_id
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn cancel(&mut self) {
        if !self.cancelled {
            self.cancelled = true;
            debug!("Cancelled timer {} for {}", self.task_id, self.module);
        }
    }
}

/// What a timer did on one tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// The module is no longer active; the timer was cancelled.
    Cancelled,
    /// The counter exceeded a lowered interval and was reset without firing.
    Reset,
    /// The counter moved up to the given value.
    Advanced(u64),
    /// The action ran and the counter reset to 0.
    Fired,
    /// The action ran and returned an error; the counter still reset to 0.
    Failed(ModuleError),
}

#[derive(Default)]
pub struct Scheduler {
    timers: Vec<IntervalTimer>,
    next_task_id: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer for `module`, resuming the counter persisted under
    /// `cache_key`. Returns the existing task id if one is already running.
    pub fn start(&mut self, module: &str, cache_key: &str, cache: &mut CacheStore) -> u32 {
        if let Some(timer) = self.live_timer(module) {
            return timer.task_id;
        }

        let counter = match cache.get(cache_key) {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!("Ignoring malformed counter {raw:?} for {module}");
                0
            }),
            None => 0,
        };

        let task_id = self.next_task_id;
        self.next_task_id = self.next_task_id.wrapping_add(1);
        self.timers.push(IntervalTimer {
            task_id,
            module: module.to_string(),
            cache_key: cache_key.to_string(),
            counter,
            cancelled: false,
        });
        debug!("Started timer {task_id} for {module} at {counter}");
        task_id
    }

    pub fn timer(&self, module: &str) -> Option<&IntervalTimer> {
        self.live_timer(module)
    }

    pub fn timers(&self) -> &[IntervalTimer] {
        &self.timers
    }

    pub fn cancel(&mut self, module: &str) {
        for timer in self.timers.iter_mut().filter(|t| t.module == module) {
            timer.cancel();
        }
        self.timers.retain(|t| !t.cancelled);
    }

    pub fn cancel_all(&mut self) {
        for timer in &mut self.timers {
            timer.cancel();
        }
        self.timers.clear();
    }

    /// Advance every timer once, in start order. `fire` runs a module's
    /// recurring action when its counter reaches the interval.
    pub fn tick<F>(
        &mut self,
        registry: &mut ModuleRegistry,
        settings: &Settings,
        cache: &mut CacheStore,
        mut fire: F,
    ) -> Vec<(String, TickOutcome)>
    where
        F: FnMut(&mut dyn Module) -> Result<(), ModuleError>,
    {
        let mut outcomes = Vec::with_capacity(self.timers.len());

        for timer in &mut self.timers {
            if timer.cancelled {
                continue;
            }
            if !registry.is_active(&timer.module) {
                timer.cancel();
                outcomes.push((timer.module.clone(), TickOutcome::Cancelled));
                continue;
            }
            let Some(module) = registry.module_mut(&timer.module) else {
                timer.cancel();
                outcomes.push((timer.module.clone(), TickOutcome::Cancelled));
                continue;
            };

            let interval = module.interval(settings);

            if timer.counter > interval {
                timer.counter = 0;
                cache.set(&timer.cache_key, 0);
                outcomes.push((timer.module.clone(), TickOutcome::Reset));
                continue;
            }

            if timer.counter < interval {
                timer.counter += 1;
            }

            let outcome = if timer.counter == interval {
                let result = fire(module);
                timer.counter = 0;
                match result {
                    Ok(()) => TickOutcome::Fired,
                    Err(e) => TickOutcome::Failed(e),
                }
            } else {
                TickOutcome::Advanced(timer.counter)
            };
            cache.set(&timer.cache_key, timer.counter);
            outcomes.push((timer.module.clone(), outcome));
        }

        self.timers.retain(|t| !t.cancelled);
        outcomes
    }

    fn live_timer(&self, module: &str) -> Option<&IntervalTimer> {
        self.timers
            .iter()
            .find(|t| t.module == module && !t.cancelled)
    }
}
