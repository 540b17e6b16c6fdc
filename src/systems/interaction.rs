use glam::Vec2;

use crate::character::animation::AnimationMode;
use crate::character::{Carrying, PendingGrab};
use crate::claims::Claim;
use crate::config::GrabLimits;
use crate::controller::Controller;
use crate::geometry::Rect;
use crate::page::{visible_rect, ElementInfo, Lineage, OverlayStyle, Page, PageError, PlaceholderSpec};
use crate::systems::target::grab_approach_point;
use crate::timers::TimerKind;

/// Structural or non-visual tags that are never picked up.
const SKIPPED_TAGS: &[&str] = &[
    "HTML", "BODY", "HEAD", "SCRIPT", "STYLE", "META", "LINK", "NOSCRIPT", "TITLE", "TEMPLATE",
    "IFRAME", "VIDEO", "AUDIO", "CANVAS", "SVG",
];

/// Whether an (unclaimed) element is worth grabbing.
pub fn is_candidate(info: &ElementInfo, rect: Rect, viewport: Vec2, limits: &GrabLimits) -> bool {
    if SKIPPED_TAGS.contains(&info.tag.as_str()) {
        return false;
    }
    if info.lineage != Lineage::Host {
        return false;
    }
    if !info.laid_out && !info.fixed {
        return false;
    }
    if info.shadow || !rect.has_area() {
        return false;
    }
    if rect.width < limits.min_width || rect.height < limits.min_height {
        return false;
    }
    if rect.width > limits.max_width
        || rect.height > limits.max_height
        || rect.width * rect.height > limits.max_area
    {
        return false;
    }
    if !rect.intersects_viewport(viewport) {
        return false;
    }
    // Wide containers with many children are page structure, not widgets.
    !(info.child_count > limits.crowded_children && rect.width > limits.crowded_width)
}

/// Top-left that centers a `width`×`height` box on the hand anchor.
pub fn hold_offset(anchor: Vec2, width: f32, height: f32) -> Vec2 {
    anchor - Vec2::new(width, height) * 0.5
}

/// Promote a pending grab that got close enough, then keep any carried
/// element in the hand.
pub fn update<P: Page>(ctl: &mut Controller<P>, now: f64) {
    complete_pending_grab(ctl, now);
    ctl.follow_carried();
}

fn complete_pending_grab<P: Page>(ctl: &mut Controller<P>, now: f64) {
    if ctl.state.carrying.is_some() || ctl.state.transitioning() {
        return;
    }
    let Some(rect) = ctl.refresh_pending_rect() else {
        return;
    };
    let Some(pending) = ctl.state.pending_grab.as_mut() else {
        return;
    };
    let target = grab_approach_point(rect, ctl.state.size, ctl.state.viewport);
    pending.target = target;
    let (element, threshold) = (pending.element, pending.threshold);
    ctl.state.target = Some(target);

    if target.distance(ctl.state.position) <= threshold {
        ctl.cancel_pending_grab();
        ctl.grab_element(element, rect, now);
    }
}

impl<P: Page> Controller<P> {
    /// Hand position in viewport pixels for the current mood and facing.
    pub fn hand_anchor(&self) -> Vec2 {
        let s = &self.state;
        let hand = self.tuning.hand.get(s.mood);
        s.position + s.size * hand.fraction(s.facing) + Vec2::new(0.0, hand.vertical_offset)
    }

    // -----------------------------------------------------------------------
    // Discovery
    // -----------------------------------------------------------------------

    /// Uniformly random grabbable element, if any.
    pub(crate) fn pick_candidate(&mut self) -> Option<P::Element> {
        let viewport = self.state.viewport;
        let limits = self.tuning.grab_limits;
        let candidates: Vec<P::Element> = self
            .page
            .elements()
            .into_iter()
            .filter(|&el| !self.claims.is_claimed(el))
            .filter(|&el| {
                let Some(info) = self.page.inspect(el) else {
                    return false;
                };
                let Some(rect) = self.page.bounding_rect(el) else {
                    return false;
                };
                is_candidate(&info, rect, viewport, &limits)
            })
            .collect();

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.usize(..candidates.len())])
    }

    /// Gated grab attempt from the next-action timer.
    pub(crate) fn attempt_grab(&mut self) {
        let s = &self.state;
        if !s.active || s.busy_with_element() || s.transitioning() || s.page_hidden {
            return;
        }
        if self.rng.f64() > self.tuning.grab_chance {
            return;
        }
        match self.pick_candidate() {
            Some(element) => self.start_grab_approach(element),
            None => log::trace!("No grabbable element on the page"),
        }
    }

    /// Claim `element` and start walking toward it.
    pub(crate) fn start_grab_approach(&mut self, element: P::Element) {
        if !self.state.active || self.state.busy_with_element() {
            return;
        }
        let Some(rect) = self.page.bounding_rect(element).filter(Rect::has_area) else {
            return;
        };
        if !self.claims.try_claim(element, Claim::Pending) {
            return;
        }
        let target = grab_approach_point(rect, self.state.size, self.state.viewport);
        self.state.pending_grab = Some(PendingGrab {
            element,
            threshold: self.tuning.approach_threshold(rect.width, rect.height),
            last_rect: rect,
            target,
        });
        self.state.target = Some(target);
        log::debug!("Approaching {element:?} ({:.0}x{:.0})", rect.width, rect.height);
    }

    /// Drop the pending relation and release its claim.
    pub(crate) fn cancel_pending_grab(&mut self) {
        let Some(pending) = self.state.pending_grab.take() else {
            return;
        };
        self.claims.release(pending.element);
        self.state.target = if self.state.active {
            Some(self.pick_wander_target())
        } else {
            Some(self.state.position)
        };
    }

    /// Re-validate the pending element. Cancels the approach when it has
    /// left the document or the screen.
    pub(crate) fn refresh_pending_rect(&mut self) -> Option<Rect> {
        let element = self.state.pending_grab.as_ref()?.element;
        match visible_rect(&self.page, element, self.state.viewport) {
            Some(rect) => {
                if let Some(pending) = self.state.pending_grab.as_mut() {
                    pending.last_rect = rect;
                }
                Some(rect)
            }
            None => {
                log::debug!("Pending element {element:?} vanished; cancelling approach");
                self.cancel_pending_grab();
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Carry
    // -----------------------------------------------------------------------

    /// Lift `element` out of the layout, leaving a placeholder behind.
    pub(crate) fn grab_element(&mut self, element: P::Element, rect: Rect, now: f64) {
        if !self.page.is_connected(element) || !rect.has_area() {
            self.claims.release(element);
            return;
        }
        if !self.claims.try_claim(element, Claim::Carried) {
            return;
        }

        let original_style = self.page.style_attribute(element);
        let (display_block, margin) = self
            .page
            .inspect(element)
            .map(|info| (info.display_block, info.margin))
            .unwrap_or((false, String::new()));
        let spec = PlaceholderSpec {
            width: rect.width,
            height: rect.height,
            display_block,
            margin,
        };

        let placeholder = match self.lift(element, rect, &spec) {
            Ok(placeholder) => placeholder,
            Err(e) => {
                log::warn!("Grab of {element:?} failed: {e}");
                self.claims.release(element);
                if let Err(e) = self.page.set_style_attribute(element, original_style.as_deref()) {
                    log::warn!("Could not restore style of {element:?}: {e}");
                }
                return;
            }
        };

        let delay = self.tuning.drop_delay.get(self.state.mood).sample(&mut self.rng);
        self.arm(TimerKind::CarryDrop, now, delay);
        self.state.carrying = Some(Carrying {
            element,
            placeholder,
            original_style,
            width: rect.width,
            height: rect.height,
        });
        log::debug!("Grabbed {element:?}; dropping in {:.1}s", delay / 1000.0);

        self.follow_carried();
        self.set_animation_mode(AnimationMode::Grab);
    }

    /// Page mutations of a grab. On error the placeholder is discarded.
    fn lift(
        &mut self,
        element: P::Element,
        rect: Rect,
        spec: &PlaceholderSpec,
    ) -> Result<P::Element, PageError> {
        let placeholder = self.page.create_placeholder(spec)?;
        let overlay = OverlayStyle {
            width: rect.width,
            height: rect.height,
            offset: Vec2::new(rect.left, rect.top),
            z_index: self.tuning.carry_z_index,
            transition_ms: self.tuning.carry_transition_ms,
        };
        let result = self
            .page
            .insert_after(element, placeholder)
            .and_then(|_| self.page.apply_overlay_style(element, &overlay))
            .and_then(|_| self.page.append_to_body(element));
        match result {
            Ok(()) => Ok(placeholder),
            Err(e) => {
                self.page.remove(placeholder);
                Err(e)
            }
        }
    }

    /// Center the carried element on the hand anchor.
    pub(crate) fn follow_carried(&mut self) {
        if self.state.transitioning() {
            return;
        }
        let Some(carrying) = self.state.carrying.as_ref() else {
            return;
        };
        let (element, width, height) = (carrying.element, carrying.width, carrying.height);
        if !self.page.is_connected(element) {
            self.abandon_carry();
            return;
        }
        let offset = hold_offset(self.hand_anchor(), width, height);
        if let Err(e) = self.page.set_overlay_offset(element, offset) {
            log::warn!("Lost hold of {element:?}: {e}");
            self.abandon_carry();
        }
    }

    /// Put the carried element back where it came from. `reschedule` re-arms
    /// the next action after a cooldown; forced drops pass false.
    pub(crate) fn drop_carried(&mut self, now: f64, reschedule: bool) {
        let Some(carrying) = self.state.carrying.take() else {
            return;
        };
        self.timers.cancel(TimerKind::CarryDrop);
        self.claims.release(carrying.element);

        let Carrying {
            element,
            placeholder,
            original_style,
            ..
        } = carrying;
        if let Err(e) = self.page.set_style_attribute(element, original_style.as_deref()) {
            log::warn!("Could not restore style of {element:?}: {e}");
        }

        let restored = if self.page.is_connected(placeholder) {
            self.page.replace_with(placeholder, element)
        } else {
            // The placeholder's subtree left the document; fall back to the body.
            self.page.remove(placeholder);
            self.page.append_to_body(element)
        };
        if let Err(e) = restored {
            log::warn!("Could not reinsert {element:?}: {e}");
        }
        log::debug!("Dropped {element:?}");

        self.refresh_animation_mode();
        if reschedule {
            let delay = self.tuning.action_after_drop.sample(&mut self.rng);
            self.schedule_next_action(now, Some(delay));
        }
    }

    /// The host removed the carried element: release everything without
    /// putting it back.
    pub(crate) fn abandon_carry(&mut self) {
        let Some(carrying) = self.state.carrying.take() else {
            return;
        };
        self.timers.cancel(TimerKind::CarryDrop);
        self.claims.release(carrying.element);
        if let Err(e) = self
            .page
            .set_style_attribute(carrying.element, carrying.original_style.as_deref())
        {
            log::warn!("Could not restore style of {:?}: {e}", carrying.element);
        }
        self.page.remove(carrying.placeholder);
        log::debug!("Carried {:?} was removed by the page", carrying.element);
        self.refresh_animation_mode();
    }
}
