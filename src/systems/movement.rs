use glam::Vec2;

use crate::character::{Activity, Facing};
use crate::controller::Controller;
use crate::geometry::clamp_to_viewport;
use crate::page::Page;

/// Per-tick movement parameters.
#[derive(Debug, Clone, Copy)]
pub struct Stride {
    /// Pixels per tick, already scaled for hunting.
    pub speed: f32,
    pub arrive_distance: f32,
    pub facing_deadband: f32,
    pub size: Vec2,
    pub viewport: Vec2,
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Already within the arrive distance; nothing moved.
    Arrived,
    Moved {
        position: Vec2,
        /// New facing if the horizontal delta cleared the deadband.
        facing: Option<Facing>,
    },
}

/// Straight-line seek toward `target`, never overshooting, then clamped.
pub fn integrate(position: Vec2, target: Vec2, stride: Stride) -> Motion {
    let delta = target - position;
    let distance = delta.length();
    if distance < stride.arrive_distance {
        return Motion::Arrived;
    }

    let facing = (delta.x.abs() > stride.facing_deadband).then(|| {
        if delta.x >= 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    });

    let step = stride.speed.min(distance);
    let next = position + delta / distance * step;
    Motion::Moved {
        position: clamp_to_viewport(next, stride.viewport, stride.size),
        facing,
    }
}

/// Seek the current target. Arriving ends a hunt in a teleport and a
/// wander leg in a fresh target.
pub fn update<P: Page>(ctl: &mut Controller<P>, now: f64) {
    if !ctl.state.active || ctl.state.transitioning() {
        return;
    }
    let Some(target) = ctl.state.target else {
        return;
    };

    let hunting = ctl.state.activity == Activity::Hunt;
    let multiplier = if hunting {
        ctl.tuning.hunt_speed_multiplier
    } else {
        1.0
    };
    let stride = Stride {
        speed: ctl.tuning.speed.get(ctl.state.mood) * multiplier,
        arrive_distance: ctl.tuning.arrive_distance,
        facing_deadband: ctl.tuning.facing_deadband,
        size: ctl.state.size,
        viewport: ctl.state.viewport,
    };

    match integrate(ctl.state.position, target, stride) {
        Motion::Arrived => {
            if hunting {
                ctl.teleport_after_hunt(now);
            } else if ctl.state.pending_grab.is_none() {
                let next = ctl.pick_wander_target();
                ctl.state.target = Some(next);
            }
            // Pending grab: hold position until the approach completes.
        }
        Motion::Moved { position, facing } => {
            if let Some(facing) = facing {
                ctl.set_facing(facing);
            }
            ctl.state.position = position;
            ctl.sync_position();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stride() -> Stride {
        Stride {
            speed: 2.5,
            arrive_distance: 2.0,
            facing_deadband: 1.2,
            size: Vec2::new(96.0, 160.0),
            viewport: Vec2::new(1280.0, 800.0),
        }
    }

    #[test]
    fn steps_at_speed_toward_target() {
        let motion = integrate(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0), stride());
        assert_eq!(
            motion,
            Motion::Moved {
                position: Vec2::new(102.5, 100.0),
                facing: Some(Facing::Right)
            }
        );
    }

    #[test]
    fn never_overshoots() {
        let motion = integrate(Vec2::new(100.0, 100.0), Vec2::new(100.0, 102.1), stride());
        let Motion::Moved { position, facing } = motion else {
            panic!("expected movement");
        };
        assert!((position.y - 102.1).abs() < 1e-4);
        assert_eq!(facing, None);
    }

    #[test]
    fn arrival_is_stable() {
        let target = Vec2::new(300.0, 300.0);
        let position = Vec2::new(301.0, 300.5);
        assert_eq!(integrate(position, target, stride()), Motion::Arrived);
        assert_eq!(integrate(position, target, stride()), Motion::Arrived);
    }

    #[test]
    fn result_is_clamped() {
        let motion = integrate(Vec2::new(1183.0, 10.0), Vec2::new(5000.0, 10.0), stride());
        let Motion::Moved { position, .. } = motion else {
            panic!("expected movement");
        };
        assert_eq!(position.x, 1184.0);
    }
}
