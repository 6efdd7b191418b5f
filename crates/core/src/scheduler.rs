//! Simulated clock and ordered queue of pending actions.

use crate::action::{ActionFn, ActionId, Next, PendingAction};
use crate::event_queue::EventKey;
use crate::SimError;
use combatsim_types::{Priority, NEVER};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Result of an `advance()` / `run_until()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceSummary {
    /// Actions fired during this call.
    pub fired: u64,
    /// Clock after the call.
    pub now: Duration,
    /// Whether a trial-end action fired.
    pub ended: bool,
}

/// Discrete-event scheduler for one trial.
///
/// Strictly sequential: exactly one action runs at a time, and an action may
/// register new actions (including itself) that become visible to the same
/// `advance()` loop. The clock only moves forward.
///
/// `W` is the trial state handed to every callback.
pub struct Scheduler<W> {
    /// Current simulated time.
    now: Duration,

    /// Pending actions ordered by (time, priority, seq).
    queue: BTreeMap<EventKey, PendingAction<W>>,

    /// Where each pending action currently sits in the queue.
    index: HashMap<ActionId, EventKey>,

    /// Insertion sequence for deterministic tie-breaking.
    next_seq: u64,

    /// Next action handle. Not rewound by `reset()` so stale handles from a
    /// previous iteration never match a new action.
    next_id: u64,

    /// Actions fired since the last reset.
    fired: u64,

    /// Set once a trial-end action fires.
    ended: bool,
}

impl<W> Default for Scheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Scheduler<W> {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            queue: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
            next_id: 0,
            fired: 0,
            ended: false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no actions are pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Actions fired since the last reset.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Whether a trial-end action has fired.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Whether the action is waiting in the queue.
    ///
    /// An action that is currently executing is not pending.
    pub fn is_pending(&self, id: ActionId) -> bool {
        self.index.contains_key(&id)
    }

    /// When a pending action will fire.
    pub fn scheduled_at(&self, id: ActionId) -> Option<Duration> {
        self.index.get(&id).map(|key| key.time)
    }

    /// Time of the next action due, if any.
    pub fn next_time(&self) -> Option<Duration> {
        self.queue.keys().next().map(|key| key.time)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════════

    /// Register a new pending action.
    ///
    /// Scheduling at the current time is allowed; scheduling in the past is a
    /// caller defect and is rejected.
    pub fn schedule<F>(
        &mut self,
        at: Duration,
        priority: Priority,
        label: impl Into<Cow<'static, str>>,
        on_action: F,
    ) -> Result<ActionId, SimError>
    where
        F: FnMut(&mut Scheduler<W>, &mut W) -> Result<Next, SimError> + 'static,
    {
        let label = label.into();
        self.check_not_past(&label, at)?;

        let id = ActionId(self.next_id);
        self.next_id += 1;

        let on_action: ActionFn<W> = Box::new(on_action);
        self.insert(
            at,
            PendingAction {
                id,
                label,
                priority,
                on_action,
            },
        );
        Ok(id)
    }

    /// Register an action that ends the trial at `at`.
    pub fn schedule_end(&mut self, at: Duration) -> Result<ActionId, SimError> {
        self.schedule(at, Priority::TRIAL_END, "trial end", |_, _| Ok(Next::EndTrial))
    }

    /// Remove a pending action. Returns false if it was not pending.
    pub fn cancel(&mut self, id: ActionId) -> bool {
        match self.index.remove(&id) {
            Some(key) => {
                let removed = self.queue.remove(&key);
                trace!(action = %id, time = ?key.time, "Cancelled pending action");
                removed.is_some()
            }
            None => false,
        }
    }

    /// Move a pending action to a new time, keeping its id and priority.
    ///
    /// Returns `Ok(false)` if the action was not pending.
    pub fn reschedule(&mut self, id: ActionId, at: Duration) -> Result<bool, SimError> {
        let Some(key) = self.index.get(&id).copied() else {
            return Ok(false);
        };

        if at < self.now {
            let label = self
                .queue
                .get(&key)
                .map(|a| a.label.to_string())
                .unwrap_or_default();
            return Err(SimError::ScheduledInPast {
                label,
                at,
                now: self.now,
            });
        }

        self.index.remove(&id);
        if let Some(action) = self.queue.remove(&key) {
            self.insert(at, action);
        }
        Ok(true)
    }

    /// Drop every pending action and rewind the clock for a new iteration.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.index.clear();
        self.now = Duration::ZERO;
        self.next_seq = 0;
        self.fired = 0;
        self.ended = false;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Driving
    // ═══════════════════════════════════════════════════════════════════════

    /// Fire actions until the queue is empty or the trial ends.
    pub fn advance(&mut self, world: &mut W) -> Result<AdvanceSummary, SimError> {
        self.run_until(world, NEVER)
    }

    /// Fire every action due at or before `until`.
    ///
    /// The clock is left at the last fired action's time; it is not moved to
    /// `until`.
    pub fn run_until(&mut self, world: &mut W, until: Duration) -> Result<AdvanceSummary, SimError> {
        let fired_before = self.fired;

        while !self.ended {
            let Some(entry) = self.queue.first_entry() else {
                break;
            };
            if entry.key().time > until {
                break;
            }

            let (key, mut action) = entry.remove_entry();
            self.index.remove(&action.id);

            // schedule()/reschedule() already reject past times
            debug_assert!(key.time >= self.now, "clock moved backwards");
            self.now = key.time;
            self.fired += 1;

            trace!(
                action = %action.id,
                label = %action.label,
                time = ?key.time,
                priority = key.priority.0,
                remaining = self.queue.len(),
                "Firing action"
            );

            let next = (action.on_action)(self, world)
                .map_err(|err| err.in_action(&action.label, key.time))?;

            match next {
                Next::Done => {}
                Next::At(at) => {
                    self.check_not_past(&action.label, at)?;
                    self.insert(at, action);
                }
                Next::EndTrial => {
                    self.ended = true;
                    info!(
                        now = ?self.now,
                        fired = self.fired,
                        dropped = self.queue.len(),
                        "Trial ended"
                    );
                }
            }
        }

        Ok(AdvanceSummary {
            fired: self.fired - fired_before,
            now: self.now,
            ended: self.ended,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Internal
    // ═══════════════════════════════════════════════════════════════════════

    fn check_not_past(&self, label: &str, at: Duration) -> Result<(), SimError> {
        if at < self.now {
            debug!(label, at = ?at, now = ?self.now, "Rejected action scheduled in the past");
            return Err(SimError::ScheduledInPast {
                label: label.to_string(),
                at,
                now: self.now,
            });
        }
        Ok(())
    }

    fn insert(&mut self, at: Duration, action: PendingAction<W>) {
        let key = EventKey {
            time: at,
            priority: action.priority,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.index.insert(action.id, key);
        self.queue.insert(key, action);
    }
}
