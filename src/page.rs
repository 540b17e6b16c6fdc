//! Interface to the host document and the sprite's render surface.
//!
//! The controller never touches a real DOM. Everything it reads or mutates on
//! the page goes through [`Page`], so a browser binding, a test double and the
//! in-memory [`crate::sim::SimPage`] are interchangeable.

use std::fmt;
use std::hash::Hash;

use glam::Vec2;

use crate::character::{Facing, SpriteFlags};
use crate::geometry::Rect;

/// Failures of page mutations. The controller swallows these and cancels
/// whatever interaction needed the mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("element is not connected to the document")]
    Detached,
    #[error("element has no parent node")]
    NoParent,
    #[error("unknown element")]
    Unknown,
}

/// Where an element sits relative to nodes the character created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lineage {
    /// Ordinary host content.
    Host,
    /// The sprite root, inside it, or an ancestor of it.
    Sprite,
    /// A placeholder or inside one.
    Placeholder,
}

/// Snapshot of the facts candidate discovery needs about one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInfo {
    /// Upper-case tag name.
    pub tag: String,
    pub lineage: Lineage,
    /// Generates a layout box (has an offset parent).
    pub laid_out: bool,
    /// Computed `position: fixed`.
    pub fixed: bool,
    /// Hosts or lives in a shadow tree.
    pub shadow: bool,
    pub child_count: usize,
    /// Computed display is `block`.
    pub display_block: bool,
    /// Computed margin shorthand.
    pub margin: String,
}

/// Same-size layout stand-in inserted where a grabbed element used to be.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSpec {
    pub width: f32,
    pub height: f32,
    pub display_block: bool,
    pub margin: String,
}

/// Inline overlay positioning applied to a carried element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub width: f32,
    pub height: f32,
    /// Top-left of the element in viewport pixels.
    pub offset: Vec2,
    pub z_index: i64,
    pub transition_ms: f64,
}

/// Host page as seen by the controller.
pub trait Page {
    type Element: Copy + Eq + Hash + fmt::Debug;

    // --- sprite render surface ---

    /// Create the sprite root and its visual child.
    fn mount_sprite(&mut self);
    fn set_sprite_hidden(&mut self, hidden: bool);
    /// Translate the sprite root to `position`.
    fn set_sprite_position(&mut self, position: Vec2);
    fn set_sprite_size(&mut self, size: Vec2);
    fn set_sprite_facing(&mut self, facing: Facing);
    fn set_sprite_flags(&mut self, flags: SpriteFlags);
    /// Swap the visual element's background image.
    fn set_sprite_frame(&mut self, url: &str);
    /// Map a logical frame file name to a loadable URL.
    fn asset_url(&self, frame: &str) -> String;

    // --- document reads ---

    /// Every element in document order.
    fn elements(&self) -> Vec<Self::Element>;
    fn inspect(&self, element: Self::Element) -> Option<ElementInfo>;
    fn is_connected(&self, element: Self::Element) -> bool;
    fn bounding_rect(&self, element: Self::Element) -> Option<Rect>;
    /// Raw inline `style` attribute, `None` if absent.
    fn style_attribute(&self, element: Self::Element) -> Option<String>;

    // --- document writes ---

    /// Replace the inline style attribute, removing it for `None`.
    fn set_style_attribute(
        &mut self,
        element: Self::Element,
        style: Option<&str>,
    ) -> Result<(), PageError>;
    /// Switch the element to fixed overlay positioning.
    fn apply_overlay_style(
        &mut self,
        element: Self::Element,
        style: &OverlayStyle,
    ) -> Result<(), PageError>;
    /// Move an overlay-positioned element.
    fn set_overlay_offset(&mut self, element: Self::Element, offset: Vec2) -> Result<(), PageError>;
    fn create_placeholder(&mut self, spec: &PlaceholderSpec) -> Result<Self::Element, PageError>;
    /// Insert `node` as the next sibling of `reference`.
    fn insert_after(&mut self, reference: Self::Element, node: Self::Element) -> Result<(), PageError>;
    /// Append to the end of the document body (the top overlay layer).
    fn append_to_body(&mut self, element: Self::Element) -> Result<(), PageError>;
    /// Put `replacement` where `old` is and detach `old`.
    fn replace_with(
        &mut self,
        old: Self::Element,
        replacement: Self::Element,
    ) -> Result<(), PageError>;
    /// Detach and discard a node. No-op for unknown nodes.
    fn remove(&mut self, element: Self::Element);
}

/// Current rectangle of `element` if it is still attached and on screen.
pub fn visible_rect<P: Page>(page: &P, element: P::Element, viewport: Vec2) -> Option<Rect> {
    if !page.is_connected(element) {
        return None;
    }
    page.bounding_rect(element)
        .filter(|rect| rect.is_visible_in(viewport))
}
