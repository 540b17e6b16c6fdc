use glam::Vec2;

use crate::character::{Character, Facing};
use crate::claims::Claims;
use crate::config::Tuning;
use crate::page::Page;
use crate::systems;
use crate::systems::target::random_viewport_point;
use crate::timers::{TimerKind, Timers};

/// Owns the character state record, its timers and the page binding.
///
/// All mutation happens inside [`Controller::advance`] (timers, then one
/// tick) or inside one of the host event handlers. Nothing preempts
/// anything else, so no locking is involved.
pub struct Controller<P: Page> {
    pub(crate) page: P,
    pub(crate) state: Character<P::Element>,
    pub(crate) timers: Timers,
    pub(crate) claims: Claims<P::Element>,
    pub(crate) rng: fastrand::Rng,
    pub(crate) tuning: Tuning,
    /// Frame file currently shown by the render surface.
    pub(crate) drawn_frame: Option<&'static str>,
}

impl<P: Page> Controller<P> {
    /// Mount the sprite hidden at a random spot and arm the mood and
    /// appearance timers. `now` is the host clock in milliseconds.
    pub fn new(page: P, tuning: Tuning, viewport: Vec2, rng: fastrand::Rng, now: f64) -> Self {
        let size = tuning.default_size();
        let mut ctl = Self {
            page,
            state: Character::new(viewport, size),
            timers: Timers::new(),
            claims: Claims::new(),
            rng,
            tuning,
            drawn_frame: None,
        };

        ctl.page.mount_sprite();
        ctl.page.set_sprite_size(size);
        ctl.set_hidden(true);

        let start = random_viewport_point(&mut ctl.rng, size, viewport);
        ctl.state.position = start;
        ctl.state.target = Some(start);
        ctl.sync_position();
        ctl.page.set_sprite_facing(ctl.state.facing);
        ctl.sync_flags();
        ctl.draw_frame(true);

        ctl.schedule_mood_shift(now);
        let initial = ctl.tuning.initial_appearance_delay;
        ctl.schedule_appearance_cycle(now, Some(initial));

        log::info!(
            "Sprite mounted at ({:.0}, {:.0}); first appearance in {:.1}s",
            start.x,
            start.y,
            initial / 1000.0
        );
        ctl
    }

    /// Fire every timer due by `now` in deadline order, then run one tick.
    pub fn advance(&mut self, now: f64) {
        self.fire_due_timers(now);
        self.tick(now);
    }

    /// Dispatch due timers. Each handler sees its own deadline as "now", so
    /// re-armed timers keep their cadence even when the host falls behind.
    pub fn fire_due_timers(&mut self, now: f64) {
        while let Some((kind, at)) = self.timers.pop_due(now) {
            log::trace!("timer {} fired at {:.0}", kind.label(), at);
            match kind {
                TimerKind::NextAction => self.run_next_action(at),
                TimerKind::MoodShift => self.run_mood_shift(at),
                TimerKind::HuntEnd => self.stop_hunt(),
                TimerKind::SpawnAnimation => self.finish_spawn_step(at),
                TimerKind::AppearanceCycle => self.begin_appearance(at),
                TimerKind::AppearanceEnd => self.end_appearance(at),
                TimerKind::CarryDrop => self.drop_carried(at, true),
            }
        }
    }

    /// One display frame.
    pub fn tick(&mut self, now: f64) {
        systems::tick(self, now);
    }

    /// Earliest outstanding timer deadline.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Host events
    // -----------------------------------------------------------------------

    pub fn on_resize(&mut self, viewport: Vec2) {
        self.state.viewport = viewport;
        self.state.position = self.clamp(self.state.position);
        let target = self.state.target.unwrap_or(self.state.position);
        self.state.target = Some(self.clamp(target));
        self.follow_carried();
        self.sync_position();
    }

    pub fn on_pointer_move(&mut self, pointer: Vec2) {
        self.state.pointer = pointer;
    }

    /// Hidden pages lose any pending grab and active hunt at once.
    pub fn on_visibility_change(&mut self, hidden: bool, now: f64) {
        self.state.page_hidden = hidden;
        if hidden {
            self.cancel_pending_grab();
            self.stop_hunt();
        } else if self.state.active {
            let delay = self.tuning.action_after_resume.sample(&mut self.rng);
            self.schedule_next_action(now, Some(delay));
        }
    }

    /// Natural dimensions of the base frame once its image decodes.
    /// Missing or zero dimensions keep the current size.
    pub fn on_sprite_loaded(&mut self, natural: Option<(u32, u32)>) {
        let Some((width, height)) = natural.filter(|&(w, h)| w > 0 && h > 0) else {
            log::debug!("Sprite art reported no size; keeping {:?}", self.state.size);
            return;
        };
        let natural = Vec2::new(width as f32, height as f32);
        self.state.size = (natural * self.tuning.sprite_scale).round();
        self.page.set_sprite_size(self.state.size);
        self.state.position = self.clamp(self.state.position);
        self.sync_position();
    }

    /// Cancel every outstanding timer. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        log::debug!("Controller torn down");
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &Character<P::Element> {
        &self.state
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn claims(&self) -> &Claims<P::Element> {
        &self.claims
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    // -----------------------------------------------------------------------
    // Render surface sync
    // -----------------------------------------------------------------------

    pub(crate) fn clamp(&self, point: Vec2) -> Vec2 {
        crate::geometry::clamp_to_viewport(point, self.state.viewport, self.state.size)
    }

    pub(crate) fn sync_position(&mut self) {
        self.page.set_sprite_position(self.state.position);
    }

    pub(crate) fn sync_flags(&mut self) {
        self.page.set_sprite_flags(self.state.flags());
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.state.hidden = hidden;
        self.page.set_sprite_hidden(hidden);
    }

    pub(crate) fn set_facing(&mut self, facing: Facing) {
        if self.state.facing != facing {
            self.state.facing = facing;
            self.page.set_sprite_facing(facing);
        }
    }

    /// Arm `kind` `delay` milliseconds after `now`, replacing any instance.
    pub(crate) fn arm(&mut self, kind: TimerKind, now: f64, delay: f64) {
        self.timers.arm(kind, now + delay);
    }
}
