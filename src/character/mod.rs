pub mod animation;

use glam::Vec2;

use crate::geometry::Rect;
use animation::AnimationState;

/// Coarse disposition. Affects speed, timer ranges and frame sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Calm,
    Angry,
}

impl Mood {
    pub fn flipped(self) -> Self {
        match self {
            Mood::Calm => Mood::Angry,
            Mood::Angry => Mood::Calm,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Calm => "calm",
            Mood::Angry => "angry",
        }
    }
}

/// High-level behavior driving target selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    Idle,
    Wander,
    Hunt,
    Spawn,
}

/// Horizontal facing of the sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

/// Presentational markers toggled on the sprite root for external styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteFlags {
    pub angry: bool,
    pub hunting: bool,
}

/// Which continuation runs when the spawn animation timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnStep {
    /// Appearance began; start wandering afterwards.
    Arrive,
    /// Appearance ended; hide afterwards.
    Depart,
    /// First half of a teleport; relocate afterwards.
    Vanish,
    /// Second half of a teleport; resume wandering afterwards.
    Reappear,
}

/// Approach toward a claimed element that is not carried yet.
#[derive(Debug, Clone, Copy)]
pub struct PendingGrab<E> {
    pub element: E,
    pub threshold: f32,
    pub last_rect: Rect,
    pub target: Vec2,
}

/// An element lifted out of the layout and following the hand anchor.
#[derive(Debug, Clone)]
pub struct Carrying<E> {
    pub element: E,
    pub placeholder: E,
    /// Inline style attribute before the grab (`None` = no attribute).
    pub original_style: Option<String>,
    pub width: f32,
    pub height: f32,
}

/// The single mutable state record of the character.
///
/// Owned by the controller; every subsystem receives it explicitly.
#[derive(Debug, Clone)]
pub struct Character<E> {
    pub position: Vec2,
    pub size: Vec2,
    pub target: Option<Vec2>,
    pub mood: Mood,
    pub activity: Activity,
    pub facing: Facing,
    pub animation: AnimationState,
    pub pending_grab: Option<PendingGrab<E>>,
    pub carrying: Option<Carrying<E>>,
    pub spawn_step: Option<SpawnStep>,
    pub spawning: bool,
    pub teleporting: bool,
    /// Sprite hidden flag as last pushed to the render surface.
    pub hidden: bool,
    /// Inside an appearance window.
    pub active: bool,
    /// Last observed pointer position.
    pub pointer: Vec2,
    pub viewport: Vec2,
    /// Host document visibility.
    pub page_hidden: bool,
}

impl<E> Character<E> {
    pub fn new(viewport: Vec2, size: Vec2) -> Self {
        Self {
            position: Vec2::new(20.0, 120.0),
            size,
            target: None,
            mood: Mood::Calm,
            activity: Activity::Wander,
            facing: Facing::Left,
            animation: AnimationState::resolve(Mood::Calm, animation::AnimationMode::Idle),
            pending_grab: None,
            carrying: None,
            spawn_step: None,
            spawning: false,
            teleporting: false,
            hidden: true,
            active: false,
            pointer: viewport * 0.5,
            viewport,
            page_hidden: false,
        }
    }

    /// Mid spawn or teleport animation.
    pub fn transitioning(&self) -> bool {
        self.spawning || self.teleporting
    }

    /// Holding or approaching an element.
    pub fn busy_with_element(&self) -> bool {
        self.carrying.is_some() || self.pending_grab.is_some()
    }

    pub fn distance_to_target(&self) -> Option<f32> {
        self.target.map(|t| t.distance(self.position))
    }

    pub fn flags(&self) -> SpriteFlags {
        SpriteFlags {
            angry: self.mood == Mood::Angry && self.active,
            hunting: self.activity == Activity::Hunt,
        }
    }
}
