use crate::character::animation::AnimationMode;
use crate::character::{Activity, SpawnStep};
use crate::controller::Controller;
use crate::page::Page;
use crate::timers::TimerKind;

impl<P: Page> Controller<P> {
    /// Arm the outer cycle, `delay` defaulting to the configured interval.
    pub(crate) fn schedule_appearance_cycle(&mut self, now: f64, delay: Option<f64>) {
        let delay = delay.unwrap_or(self.tuning.appearance_interval);
        self.arm(TimerKind::AppearanceCycle, now, delay);
    }

    /// Cycle timer fired. The cycle is re-armed before anything else so a
    /// skipped begin never breaks the periodicity.
    pub(crate) fn begin_appearance(&mut self, now: f64) {
        self.schedule_appearance_cycle(now, None);
        if self.state.active || self.state.transitioning() {
            log::debug!("Appearance skipped; already on stage");
            return;
        }

        self.timers.cancel(TimerKind::AppearanceEnd);
        self.timers.cancel(TimerKind::NextAction);
        self.state.active = true;
        self.state.activity = Activity::Spawn;
        self.state.teleporting = false;
        self.set_hidden(false);
        self.set_animation_mode(AnimationMode::Spawn);
        self.play_spawn(now, SpawnStep::Arrive);

        let stay = self.tuning.appearance_duration.sample(&mut self.rng);
        self.arm(TimerKind::AppearanceEnd, now, stay);
        log::info!("Appearing for {:.0}s", stay / 1000.0);
    }

    /// Stay expired: let go of everything, play the exit cue, then hide.
    pub(crate) fn end_appearance(&mut self, now: f64) {
        self.schedule_appearance_cycle(now, None);
        if !self.state.active && !self.state.transitioning() {
            return;
        }

        self.timers.cancel(TimerKind::AppearanceEnd);
        self.timers.cancel(TimerKind::NextAction);
        self.timers.cancel(TimerKind::HuntEnd);
        self.cancel_pending_grab();
        self.drop_carried(now, false);
        self.state.active = false;
        // An interrupted teleport would otherwise block every later appearance.
        self.state.teleporting = false;
        self.state.activity = Activity::Spawn;
        self.set_animation_mode(AnimationMode::Spawn);
        self.play_spawn(now, SpawnStep::Depart);
        log::info!("Leaving the page");
    }

    /// Start one play-through of the spawn frames; `step` runs when it ends.
    pub(crate) fn play_spawn(&mut self, now: f64, step: SpawnStep) {
        self.state.spawning = true;
        self.state.spawn_step = Some(step);
        let duration = self
            .state
            .animation
            .cycle_duration(self.tuning.spawn_extra_delay);
        self.arm(TimerKind::SpawnAnimation, now, duration);
    }

    pub(crate) fn finish_spawn_step(&mut self, now: f64) {
        let Some(step) = self.state.spawn_step.take() else {
            return;
        };
        match step {
            SpawnStep::Arrive => self.arrived(now),
            SpawnStep::Depart => self.departed(),
            SpawnStep::Vanish => self.teleport_vanished(now),
            SpawnStep::Reappear => self.teleport_reappeared(now),
        }
    }

    fn arrived(&mut self, now: f64) {
        self.state.spawning = false;
        self.state.activity = Activity::Wander;
        let next = self.pick_wander_target();
        self.state.target = Some(next);
        self.refresh_animation_mode();
        let delay = self.tuning.action_after_spawn.sample(&mut self.rng);
        self.schedule_next_action(now, Some(delay));
    }

    fn departed(&mut self) {
        self.state.spawning = false;
        self.set_hidden(true);
        self.state.target = None;
        self.state.activity = Activity::Idle;
        self.set_animation_mode(AnimationMode::Idle);
    }
}
