use glam::Vec2;

use crate::character::Activity;
use crate::controller::Controller;
use crate::geometry::{clamp_to_viewport, max_origin, Rect};
use crate::page::Page;

/// Fraction of the sprite height lifted above a point of interest, so the
/// sprite's head (not its feet) lines up with it.
const HEAD_RATIO: f32 = 0.9;

/// Outcome of target selection for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetDecision {
    /// Hold the current position.
    Freeze,
    /// Walk toward a pending grab's element.
    Approach(Vec2),
    /// Chase the pointer.
    Chase(Vec2),
    /// Keep the existing target.
    Keep,
    /// No target yet: draw a random wander point.
    Wander,
}

/// Facts gathered before deciding the target.
#[derive(Debug, Clone, Copy)]
pub struct TargetContext {
    pub active: bool,
    pub transitioning: bool,
    /// Rectangle of a validated, visible pending-grab element.
    pub pending_rect: Option<Rect>,
    pub hunting: bool,
    pub has_target: bool,
    pub pointer: Vec2,
    pub size: Vec2,
    pub viewport: Vec2,
}

/// Choose the movement goal for the current activity. First match wins.
pub fn select(ctx: &TargetContext) -> TargetDecision {
    if !ctx.active && !ctx.transitioning {
        return TargetDecision::Freeze;
    }
    if let Some(rect) = ctx.pending_rect {
        return TargetDecision::Approach(grab_approach_point(rect, ctx.size, ctx.viewport));
    }
    if ctx.hunting {
        return TargetDecision::Chase(pointer_chase_point(ctx.pointer, ctx.size, ctx.viewport));
    }
    if ctx.has_target {
        TargetDecision::Keep
    } else {
        TargetDecision::Wander
    }
}

/// Stand under the element, centered, with the hands near its bottom edge.
pub fn grab_approach_point(rect: Rect, size: Vec2, viewport: Vec2) -> Vec2 {
    let point = Vec2::new(
        rect.left + rect.width * 0.5 - size.x * 0.5,
        rect.bottom() - size.y * HEAD_RATIO,
    );
    clamp_to_viewport(point, viewport, size)
}

/// Align the sprite's head with the pointer.
pub fn pointer_chase_point(pointer: Vec2, size: Vec2, viewport: Vec2) -> Vec2 {
    let point = Vec2::new(pointer.x - size.x * 0.5, pointer.y - size.y * HEAD_RATIO);
    clamp_to_viewport(point, viewport, size)
}

fn random_between(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    min + rng.f32() * (max - min)
}

/// Random wander goal kept `padding` pixels away from the viewport edges.
pub fn random_wander_point(
    rng: &mut fastrand::Rng,
    size: Vec2,
    viewport: Vec2,
    padding: f32,
) -> Vec2 {
    let max = (viewport - size - Vec2::splat(padding)).max(Vec2::splat(padding));
    let point = Vec2::new(
        random_between(rng, padding, max.x),
        random_between(rng, padding, max.y),
    );
    clamp_to_viewport(point, viewport, size)
}

/// Uniform point anywhere the sprite fits.
pub fn random_viewport_point(rng: &mut fastrand::Rng, size: Vec2, viewport: Vec2) -> Vec2 {
    let max = max_origin(viewport, size);
    clamp_to_viewport(
        Vec2::new(rng.f32() * max.x, rng.f32() * max.y),
        viewport,
        size,
    )
}

/// Distance rules a teleport destination has to satisfy.
#[derive(Debug, Clone, Copy)]
pub struct TeleportRules {
    pub min_distance: f32,
    pub cursor_distance: f32,
    pub attempts: u32,
}

/// Relocation point far from both `current` and the pointer-chase point.
/// Resamples up to `rules.attempts` times and keeps the last draw if none
/// qualifies (e.g. a viewport too small to satisfy the distances).
pub fn teleport_point(
    rng: &mut fastrand::Rng,
    current: Vec2,
    chase: Vec2,
    size: Vec2,
    viewport: Vec2,
    rules: TeleportRules,
) -> Vec2 {
    let far_enough = |p: Vec2| {
        p.distance(current) > rules.min_distance && p.distance(chase) > rules.cursor_distance
    };
    let mut candidate = random_viewport_point(rng, size, viewport);
    for _ in 0..rules.attempts {
        if far_enough(candidate) {
            break;
        }
        candidate = random_viewport_point(rng, size, viewport);
    }
    candidate
}

impl<P: Page> Controller<P> {
    /// Fresh wander goal for the current sprite size and viewport.
    pub(crate) fn pick_wander_target(&mut self) -> Vec2 {
        random_wander_point(
            &mut self.rng,
            self.state.size,
            self.state.viewport,
            self.tuning.wander_padding,
        )
    }
}

/// Decide where the character heads this frame.
pub fn update<P: Page>(ctl: &mut Controller<P>) {
    let live = ctl.state.active || ctl.state.transitioning();
    let pending_rect = if live { ctl.refresh_pending_rect() } else { None };

    let s = &ctl.state;
    let decision = select(&TargetContext {
        active: s.active,
        transitioning: s.transitioning(),
        pending_rect,
        hunting: s.activity == Activity::Hunt,
        has_target: s.target.is_some(),
        pointer: s.pointer,
        size: s.size,
        viewport: s.viewport,
    });

    match decision {
        TargetDecision::Freeze => ctl.state.target = Some(ctl.state.position),
        TargetDecision::Approach(point) => {
            if let Some(pending) = ctl.state.pending_grab.as_mut() {
                pending.target = point;
            }
            ctl.state.target = Some(point);
        }
        TargetDecision::Chase(point) => ctl.state.target = Some(point),
        TargetDecision::Keep => {}
        TargetDecision::Wander => {
            let point = ctl.pick_wander_target();
            ctl.state.target = Some(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Vec2 = Vec2::new(96.0, 160.0);
    const VIEWPORT: Vec2 = Vec2::new(1280.0, 800.0);

    fn ctx() -> TargetContext {
        TargetContext {
            active: true,
            transitioning: false,
            pending_rect: None,
            hunting: false,
            has_target: true,
            pointer: Vec2::new(400.0, 400.0),
            size: SIZE,
            viewport: VIEWPORT,
        }
    }

    #[test]
    fn inactive_freezes_unless_transitioning() {
        assert_eq!(select(&TargetContext { active: false, ..ctx() }), TargetDecision::Freeze);
        assert_eq!(
            select(&TargetContext { active: false, transitioning: true, ..ctx() }),
            TargetDecision::Keep
        );
    }

    #[test]
    fn pending_grab_beats_hunt() {
        let rect = Rect::new(300.0, 300.0, 100.0, 40.0);
        let decision = select(&TargetContext {
            pending_rect: Some(rect),
            hunting: true,
            ..ctx()
        });
        assert_eq!(decision, TargetDecision::Approach(grab_approach_point(rect, SIZE, VIEWPORT)));
    }

    #[test]
    fn hunt_then_keep_then_wander() {
        assert!(matches!(select(&TargetContext { hunting: true, ..ctx() }), TargetDecision::Chase(_)));
        assert_eq!(select(&ctx()), TargetDecision::Keep);
        assert_eq!(select(&TargetContext { has_target: false, ..ctx() }), TargetDecision::Wander);
    }

    #[test]
    fn approach_point_is_centered_under_element() {
        let rect = Rect::new(300.0, 400.0, 100.0, 40.0);
        let p = grab_approach_point(rect, SIZE, VIEWPORT);
        assert_eq!(p.x, 350.0 - 48.0);
        assert!((p.y - (440.0 - 144.0)).abs() < 1e-3);
    }

    #[test]
    fn chase_point_is_clamped() {
        let p = pointer_chase_point(Vec2::new(5.0, 5.0), SIZE, VIEWPORT);
        assert_eq!(p, Vec2::ZERO);
    }

    #[test]
    fn wander_points_respect_padding() {
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..200 {
            let p = random_wander_point(&mut rng, SIZE, VIEWPORT, 20.0);
            assert!(p.x >= 20.0 && p.x <= VIEWPORT.x - SIZE.x - 20.0);
            assert!(p.y >= 20.0 && p.y <= VIEWPORT.y - SIZE.y - 20.0);
        }
    }

    #[test]
    fn teleport_lands_far_away() {
        let mut rng = fastrand::Rng::with_seed(5);
        let rules = TeleportRules {
            min_distance: 160.0,
            cursor_distance: 220.0,
            attempts: 12,
        };
        let current = Vec2::new(600.0, 300.0);
        let chase = Vec2::new(600.0, 300.0);
        for _ in 0..50 {
            let p = teleport_point(&mut rng, current, chase, SIZE, VIEWPORT, rules);
            assert!(p.distance(current) > 160.0);
            assert!(p.distance(chase) > 220.0);
        }
    }
}
