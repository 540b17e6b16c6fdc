use crate::character::animation::AnimationMode;
use crate::character::{Activity, Mood, SpawnStep};
use crate::controller::Controller;
use crate::page::Page;
use crate::systems::target::{pointer_chase_point, teleport_point, TeleportRules};
use crate::timers::TimerKind;

/// What the next-action timer decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRoll {
    Hunt,
    Grab,
    Nothing,
}

/// Two independent rolls: hunt first, then grab.
pub fn roll_action(rng: &mut fastrand::Rng, hunt_chance: f64, grab_roll_chance: f64) -> ActionRoll {
    if rng.f64() < hunt_chance {
        ActionRoll::Hunt
    } else if rng.f64() < grab_roll_chance {
        ActionRoll::Grab
    } else {
        ActionRoll::Nothing
    }
}

impl<P: Page> Controller<P> {
    // -----------------------------------------------------------------------
    // Next action
    // -----------------------------------------------------------------------

    /// Re-arm the next-action timer. `delay` overrides the mood's range.
    /// Inactive characters leave it disarmed.
    pub(crate) fn schedule_next_action(&mut self, now: f64, delay: Option<f64>) {
        self.timers.cancel(TimerKind::NextAction);
        if !self.state.active {
            return;
        }
        let delay = delay.unwrap_or_else(|| {
            self.tuning
                .action_delay
                .get(self.state.mood)
                .sample(&mut self.rng)
        });
        self.arm(TimerKind::NextAction, now, delay);
    }

    pub(crate) fn run_next_action(&mut self, now: f64) {
        let s = &self.state;
        if !s.active || s.page_hidden || s.transitioning() || s.busy_with_element() {
            log::trace!("Next action skipped");
            let delay = self.tuning.action_retry_delay.sample(&mut self.rng);
            self.schedule_next_action(now, Some(delay));
            return;
        }

        let hunt_chance = self.tuning.hunt_chance.get(self.state.mood);
        match roll_action(&mut self.rng, hunt_chance, self.tuning.grab_roll_chance) {
            ActionRoll::Hunt => self.start_hunt(now),
            ActionRoll::Grab => self.attempt_grab(),
            ActionRoll::Nothing => {}
        }
        self.schedule_next_action(now, None);
    }

    // -----------------------------------------------------------------------
    // Mood
    // -----------------------------------------------------------------------

    pub(crate) fn schedule_mood_shift(&mut self, now: f64) {
        let delay = self
            .tuning
            .mood_duration
            .get(self.state.mood)
            .sample(&mut self.rng);
        self.arm(TimerKind::MoodShift, now, delay);
    }

    /// Calm flips to angry only rarely; angry always calms down.
    pub(crate) fn run_mood_shift(&mut self, now: f64) {
        if self.state.mood == Mood::Calm && self.rng.f64() > self.tuning.angry_trigger_chance {
            self.schedule_mood_shift(now);
            return;
        }
        let next = self.state.mood.flipped();
        self.set_mood(next, now);
        self.schedule_mood_shift(now);
    }

    pub(crate) fn set_mood(&mut self, mood: Mood, now: f64) {
        if self.state.mood == mood {
            return;
        }
        log::debug!("Mood: {} -> {}", self.state.mood.label(), mood.label());
        self.state.mood = mood;
        self.refresh_animation_mode();
        let burst = self.tuning.mood_burst_delay.get(mood).sample(&mut self.rng);
        self.schedule_next_action(now, Some(burst));
    }

    // -----------------------------------------------------------------------
    // Hunt
    // -----------------------------------------------------------------------

    pub(crate) fn start_hunt(&mut self, now: f64) {
        let s = &self.state;
        if !s.active || s.activity == Activity::Hunt || s.transitioning() {
            return;
        }
        self.state.activity = Activity::Hunt;
        self.set_animation_mode(AnimationMode::Hunt);
        let duration = self
            .tuning
            .hunt_duration
            .get(self.state.mood)
            .sample(&mut self.rng);
        self.arm(TimerKind::HuntEnd, now, duration);
        log::debug!("Hunt started for {:.1}s", duration / 1000.0);
    }

    /// Back to wandering. No-op unless hunting.
    pub(crate) fn stop_hunt(&mut self) {
        if self.state.activity != Activity::Hunt {
            return;
        }
        self.timers.cancel(TimerKind::HuntEnd);
        self.state.activity = Activity::Wander;
        let next = self.pick_wander_target();
        self.state.target = Some(next);
        self.refresh_animation_mode();
        log::debug!("Hunt ended");
    }

    // -----------------------------------------------------------------------
    // Teleport
    // -----------------------------------------------------------------------

    /// Caught the pointer: vanish and reappear somewhere far away.
    pub(crate) fn teleport_after_hunt(&mut self, now: f64) {
        let s = &self.state;
        if !s.active || s.transitioning() {
            return;
        }
        self.state.teleporting = true;
        self.timers.cancel(TimerKind::HuntEnd);
        self.cancel_pending_grab();
        self.drop_carried(now, false);
        self.state.activity = Activity::Spawn;
        self.set_animation_mode(AnimationMode::Spawn);
        self.play_spawn(now, SpawnStep::Vanish);
        log::debug!("Caught the pointer; teleporting");
    }

    /// Hidden: jump to a far point, then start the reappear animation.
    pub(crate) fn teleport_vanished(&mut self, now: f64) {
        self.set_hidden(true);
        let s = &self.state;
        let chase = pointer_chase_point(s.pointer, s.size, s.viewport);
        let rules = TeleportRules {
            min_distance: self.tuning.teleport_min_distance,
            cursor_distance: self.tuning.teleport_cursor_distance,
            attempts: self.tuning.teleport_attempts,
        };
        let (current, size, viewport) = (s.position, s.size, s.viewport);
        self.state.position = teleport_point(&mut self.rng, current, chase, size, viewport, rules);
        self.sync_position();
        let next = self.pick_wander_target();
        self.state.target = Some(next);
        self.set_animation_mode(AnimationMode::Spawn);
        self.set_hidden(false);
        self.play_spawn(now, SpawnStep::Reappear);
    }

    pub(crate) fn teleport_reappeared(&mut self, now: f64) {
        self.state.spawning = false;
        self.state.teleporting = false;
        self.state.activity = Activity::Wander;
        let next = self.pick_wander_target();
        self.state.target = Some(next);
        self.refresh_animation_mode();
        let delay = self.tuning.action_after_spawn.sample(&mut self.rng);
        self.schedule_next_action(now, Some(delay));
    }
}
