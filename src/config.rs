use glam::Vec2;
use serde::Deserialize;

use crate::character::{Facing, Mood};

/// Configuration errors. Tuning is data, so these only come from overrides.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid tuning json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("range `{name}` is inverted ({min} > {max})")]
    InvertedRange { name: &'static str, min: f64, max: f64 },
    #[error("probability `{name}` = {value} is outside [0, 1]")]
    Probability { name: &'static str, value: f64 },
    #[error("`{name}` must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
}

/// Uniform range in milliseconds (or whatever unit the field documents).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        self.min + rng.f64() * (self.max - self.min)
    }

    /// Timer spans must be ordered and strictly positive.
    fn check(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min <= 0.0 {
            return Err(ConfigError::NotPositive {
                name,
                value: self.min,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// A value that differs between calm and angry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MoodTable<T> {
    pub calm: T,
    pub angry: T,
}

impl<T: Copy> MoodTable<T> {
    pub const fn new(calm: T, angry: T) -> Self {
        Self { calm, angry }
    }

    pub fn get(&self, mood: Mood) -> T {
        match mood {
            Mood::Calm => self.calm,
            Mood::Angry => self.angry,
        }
    }
}

/// Where the carried element's center sits, as a fraction of the sprite box.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HandAnchor {
    pub right: [f32; 2],
    pub left: [f32; 2],
    /// Pixels added to the anchor's y after scaling.
    pub vertical_offset: f32,
}

impl HandAnchor {
    pub fn fraction(&self, facing: Facing) -> Vec2 {
        match facing {
            Facing::Right => Vec2::from(self.right),
            Facing::Left => Vec2::from(self.left),
        }
    }
}

/// Size window for elements worth grabbing.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GrabLimits {
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub max_area: f32,
    /// Containers with more children than this...
    pub crowded_children: usize,
    /// ...and wider than this are skipped.
    pub crowded_width: f32,
}

/// Every tuning knob of the character. Timings are milliseconds, speeds are
/// pixels per tick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub sprite_scale: f32,
    pub default_size: [f32; 2],

    pub speed: MoodTable<f32>,
    pub hunt_speed_multiplier: f32,
    /// Below this distance the target counts as reached.
    pub arrive_distance: f32,
    /// Below this distance the walk cycle gives way to idle frames.
    pub idle_distance: f32,
    pub facing_deadband: f32,
    pub wander_padding: f32,

    pub action_delay: MoodTable<Span>,
    /// Re-arm delay when the next action is skipped.
    pub action_retry_delay: Span,
    /// First action after spawning in or teleporting.
    pub action_after_spawn: Span,
    /// First action after the page becomes visible again.
    pub action_after_resume: Span,
    /// Cooldown after a voluntary drop.
    pub action_after_drop: Span,
    /// Next-action delay right after a mood flip, keyed by the new mood.
    pub mood_burst_delay: MoodTable<Span>,

    pub hunt_chance: MoodTable<f64>,
    pub hunt_duration: MoodTable<Span>,
    pub mood_duration: MoodTable<Span>,
    /// Chance that a calm mood-shift actually flips to angry.
    pub angry_trigger_chance: f64,

    /// Chance to try a grab once the hunt roll fails.
    pub grab_roll_chance: f64,
    /// Chance a grab attempt proceeds to candidate discovery.
    pub grab_chance: f64,
    pub grab_approach_distance: f32,
    pub grab_approach_cap: f32,
    pub grab_approach_factor: f32,
    pub grab_limits: GrabLimits,
    pub drop_delay: MoodTable<Span>,
    pub hand: MoodTable<HandAnchor>,
    /// Duration of the carried element's transform transition.
    pub carry_transition_ms: f64,
    pub carry_z_index: i64,

    pub teleport_min_distance: f32,
    pub teleport_cursor_distance: f32,
    pub teleport_attempts: u32,
    pub spawn_extra_delay: f64,

    pub appearance_interval: f64,
    pub initial_appearance_delay: f64,
    pub appearance_duration: Span,
}

impl Default for Tuning {
    fn default() -> Self {
        let hand = HandAnchor {
            right: [0.64, 0.62],
            left: [0.36, 0.62],
            vertical_offset: -12.0,
        };
        Self {
            sprite_scale: 3.0,
            default_size: [96.0, 160.0],

            speed: MoodTable::new(1.3, 2.5),
            hunt_speed_multiplier: 1.1,
            arrive_distance: 2.0,
            idle_distance: 4.0,
            facing_deadband: 1.2,
            wander_padding: 20.0,

            action_delay: MoodTable::new(Span::new(24_000.0, 42_000.0), Span::new(12_000.0, 22_000.0)),
            action_retry_delay: Span::new(8_000.0, 14_000.0),
            action_after_spawn: Span::new(8_000.0, 14_000.0),
            action_after_resume: Span::new(9_000.0, 15_000.0),
            action_after_drop: Span::new(12_000.0, 18_000.0),
            mood_burst_delay: MoodTable::new(Span::new(16_000.0, 22_000.0), Span::new(9_000.0, 14_000.0)),

            hunt_chance: MoodTable::new(0.08, 0.22),
            hunt_duration: MoodTable::new(Span::new(3_800.0, 6_400.0), Span::new(3_100.0, 5_200.0)),
            mood_duration: MoodTable::new(Span::new(48_000.0, 72_000.0), Span::new(5_000.0, 9_000.0)),
            angry_trigger_chance: 0.2,

            grab_roll_chance: 0.45,
            grab_chance: 0.55,
            grab_approach_distance: 36.0,
            grab_approach_cap: 96.0,
            grab_approach_factor: 0.75,
            grab_limits: GrabLimits {
                min_width: 32.0,
                min_height: 20.0,
                max_width: 260.0,
                max_height: 200.0,
                max_area: 46_000.0,
                crowded_children: 6,
                crowded_width: 180.0,
            },
            drop_delay: MoodTable::new(Span::new(3_600.0, 6_400.0), Span::new(2_200.0, 4_200.0)),
            hand: MoodTable::new(hand, hand),
            carry_transition_ms: 120.0,
            carry_z_index: 2_147_483_646,

            teleport_min_distance: 160.0,
            teleport_cursor_distance: 220.0,
            teleport_attempts: 12,
            spawn_extra_delay: 120.0,

            appearance_interval: 60.0 * 60.0 * 1000.0,
            initial_appearance_delay: 6_000.0,
            appearance_duration: Span::new(60_000.0, 180_000.0),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn default_size(&self) -> Vec2 {
        Vec2::from(self.default_size)
    }

    /// Approach threshold for an element of the given size.
    pub fn approach_threshold(&self, width: f32, height: f32) -> f32 {
        let scaled = width.max(height) * self.grab_approach_factor;
        self.grab_approach_distance.max(scaled.min(self.grab_approach_cap))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let spans = [
            ("action_delay.calm", self.action_delay.calm),
            ("action_delay.angry", self.action_delay.angry),
            ("action_retry_delay", self.action_retry_delay),
            ("action_after_spawn", self.action_after_spawn),
            ("action_after_resume", self.action_after_resume),
            ("action_after_drop", self.action_after_drop),
            ("mood_burst_delay.calm", self.mood_burst_delay.calm),
            ("mood_burst_delay.angry", self.mood_burst_delay.angry),
            ("hunt_duration.calm", self.hunt_duration.calm),
            ("hunt_duration.angry", self.hunt_duration.angry),
            ("mood_duration.calm", self.mood_duration.calm),
            ("mood_duration.angry", self.mood_duration.angry),
            ("drop_delay.calm", self.drop_delay.calm),
            ("drop_delay.angry", self.drop_delay.angry),
            ("appearance_duration", self.appearance_duration),
        ];
        for (name, span) in spans {
            span.check(name)?;
        }

        let probabilities = [
            ("hunt_chance.calm", self.hunt_chance.calm),
            ("hunt_chance.angry", self.hunt_chance.angry),
            ("angry_trigger_chance", self.angry_trigger_chance),
            ("grab_roll_chance", self.grab_roll_chance),
            ("grab_chance", self.grab_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }

        let positives = [
            ("sprite_scale", self.sprite_scale as f64),
            ("speed.calm", self.speed.calm as f64),
            ("speed.angry", self.speed.angry as f64),
            ("appearance_interval", self.appearance_interval),
            ("spawn_extra_delay", self.spawn_extra_delay),
        ];
        for (name, value) in positives {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Tuning::default().validate().unwrap();
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let tuning = Tuning::from_json(r#"{ "grab_chance": 1.0, "speed": { "calm": 2.0, "angry": 4.0 } }"#)
            .unwrap();
        assert_eq!(tuning.grab_chance, 1.0);
        assert_eq!(tuning.speed.get(Mood::Angry), 4.0);
        assert_eq!(tuning.teleport_attempts, 12);
    }

    #[test]
    fn rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "angry_trigger_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Probability { name: "angry_trigger_chance", .. }));
    }

    #[test]
    fn rejects_inverted_span() {
        let err = Tuning::from_json(r#"{ "action_retry_delay": { "min": 10.0, "max": 1.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvertedRange { .. }));
    }

    #[test]
    fn rejects_zero_span() {
        let err = Tuning::from_json(r#"{ "action_retry_delay": { "min": 0.0, "max": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { name: "action_retry_delay", .. }));

        let err = Tuning::from_json(r#"{ "mood_duration": { "calm": { "min": -5.0, "max": 10.0 }, "angry": { "min": 1.0, "max": 2.0 } } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { name: "mood_duration.calm", .. }));
    }

    #[test]
    fn approach_threshold_is_floored_and_capped() {
        let tuning = Tuning::default();
        assert_eq!(tuning.approach_threshold(20.0, 20.0), 36.0);
        assert_eq!(tuning.approach_threshold(100.0, 40.0), 75.0);
        assert_eq!(tuning.approach_threshold(250.0, 40.0), 96.0);
    }

    #[test]
    fn span_samples_inside_range() {
        let mut rng = fastrand::Rng::with_seed(3);
        let span = Span::new(100.0, 200.0);
        for _ in 0..100 {
            let v = span.sample(&mut rng);
            assert!((100.0..=200.0).contains(&v));
        }
    }
}
