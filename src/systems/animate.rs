use crate::character::animation::{select_mode, AnimationMode, AnimationState, ModeInputs};
use crate::character::Activity;
use crate::controller::Controller;
use crate::page::Page;

impl<P: Page> Controller<P> {
    /// Mode the character should be showing right now.
    pub(crate) fn current_mode(&self) -> AnimationMode {
        let s = &self.state;
        select_mode(ModeInputs {
            transitioning: s.transitioning(),
            active: s.active,
            carrying: s.carrying.is_some(),
            hunting: s.activity == Activity::Hunt,
            distance_to_target: s.distance_to_target(),
            idle_distance: self.tuning.idle_distance,
        })
    }

    /// Re-resolve the frame list for `mode` and the current mood, reset the
    /// cursor and redraw.
    pub(crate) fn set_animation_mode(&mut self, mode: AnimationMode) {
        self.state.animation = AnimationState::resolve(self.state.mood, mode);
        self.draw_frame(true);
        self.sync_flags();
    }

    pub(crate) fn refresh_animation_mode(&mut self) {
        let mode = self.current_mode();
        self.set_animation_mode(mode);
    }

    /// Push the current frame to the sprite unless it is already showing.
    pub(crate) fn draw_frame(&mut self, force: bool) {
        let frame = self.state.animation.current_frame();
        if !force && self.drawn_frame == Some(frame) {
            return;
        }
        let url = self.page.asset_url(frame);
        self.page.set_sprite_frame(&url);
        self.drawn_frame = Some(frame);
    }
}

/// Follow mode changes and step the frame cursor.
pub fn update<P: Page>(ctl: &mut Controller<P>, now: f64) {
    let mode = ctl.current_mode();
    if ctl.state.animation.needs_resolve(ctl.state.mood, mode) {
        ctl.set_animation_mode(mode);
    }
    if ctl.state.animation.advance(now) {
        ctl.draw_frame(false);
    }
}
