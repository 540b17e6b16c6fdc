//! In-memory document for the demo and the tests.
//!
//! Elements are `hecs` entities carrying a tag, a parent link, an ordered
//! child list, a static layout box and a raw inline style attribute. Layout
//! never reflows; an element lifted into overlay positioning reports its
//! overlay box instead of its layout box.

pub mod style;

use glam::Vec2;
use hecs::{Entity, World};

use crate::character::{Facing, SpriteFlags};
use crate::geometry::Rect;
use crate::page::{ElementInfo, Lineage, OverlayStyle, Page, PageError, PlaceholderSpec};
use style::Declarations;

const ASSET_BASE: &str = "sim://enderwalk/frames";

struct Tag(String);

struct Parent(Entity);

struct Children(Vec<Entity>);

/// Static layout facts of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub rect: Rect,
    pub laid_out: bool,
    pub fixed: bool,
    pub display_block: bool,
    pub margin: String,
}

impl Layout {
    pub fn block(rect: Rect) -> Self {
        Self {
            rect,
            laid_out: true,
            fixed: false,
            display_block: true,
            margin: "0px".to_string(),
        }
    }

    fn unrendered() -> Self {
        Self {
            laid_out: false,
            ..Self::block(Rect::new(0.0, 0.0, 0.0, 0.0))
        }
    }
}

/// Raw `style` attribute; `None` when the attribute is absent.
struct StyleAttr(Option<String>);

/// Fixed overlay box of a lifted element.
struct Overlay {
    offset: Vec2,
    width: f32,
    height: f32,
}

struct SpriteMark;

struct PlaceholderMark;

struct ShadowMark;

/// Everything the controller pushed to the sprite's render surface.
#[derive(Debug, Clone, Default)]
pub struct SpriteView {
    pub mounted: bool,
    pub position: Vec2,
    pub size: Vec2,
    pub hidden: bool,
    pub facing: Option<Facing>,
    pub flags: SpriteFlags,
    pub frame: Option<String>,
    /// Number of background-image swaps.
    pub frame_draws: usize,
    /// Every hidden-flag write, in order.
    pub hidden_history: Vec<bool>,
}

pub struct SimPage {
    world: World,
    root: Entity,
    body: Entity,
    sprite_root: Option<Entity>,
    pub sprite: SpriteView,
}

impl SimPage {
    /// Empty `<html><head></head><body></body></html>` document.
    pub fn new(viewport: Vec2) -> Self {
        let mut world = World::new();
        let page_rect = Rect::new(0.0, 0.0, viewport.x, viewport.y);
        let root = world.spawn((
            Tag("HTML".to_string()),
            Children(Vec::new()),
            Layout::block(page_rect),
            StyleAttr(None),
        ));
        let mut page = Self {
            world,
            root,
            body: root,
            sprite_root: None,
            sprite: SpriteView::default(),
        };
        let head = page.spawn_node("HEAD", Layout::unrendered());
        page.attach(root, head, None);
        let body = page.spawn_node("BODY", Layout::block(page_rect));
        page.attach(root, body, None);
        page.body = body;
        page
    }

    /// Synthetic article: header, paragraphs, a card grid, buttons and some
    /// content that must never be picked up.
    pub fn article(viewport: Vec2, rng: &mut fastrand::Rng) -> Self {
        let mut page = Self::new(viewport);
        let body = page.body;
        let width = (viewport.x - 80.0).max(200.0);

        let header = page.add_element(body, "HEADER", Rect::new(40.0, 20.0, width, 90.0));
        page.add_element(header, "H1", Rect::new(60.0, 40.0, 240.0, 48.0));
        page.add_element(header, "BUTTON", Rect::new(viewport.x - 180.0, 45.0, 110.0, 36.0));

        let main = page.add_element(body, "MAIN", Rect::new(40.0, 130.0, width, viewport.y));
        let mut y = 140.0;
        for _ in 0..6 {
            let h = 40.0 + rng.f32() * 60.0;
            page.add_element(main, "P", Rect::new(60.0, y, (width - 40.0).min(620.0), h));
            y += h + 16.0;
        }

        let grid = page.add_element(main, "UL", Rect::new(60.0, 160.0, 420.0, 180.0));
        for i in 0..8 {
            let x = 60.0 + (i % 4) as f32 * 104.0;
            let y = 160.0 + (i / 4) as f32 * 90.0;
            let card = page.add_element(grid, "LI", Rect::new(x, y, 96.0, 82.0));
            if i % 3 == 0 {
                page.set_inline_style(card, Some("color: teal; border-radius: 4px"));
            }
        }

        for i in 0..4 {
            let x = 700.0_f32.min(viewport.x - 160.0) + rng.f32() * 40.0;
            let button = page.add_element(main, "BUTTON", Rect::new(x, 200.0 + i as f32 * 70.0, 120.0, 40.0));
            if i == 1 {
                page.set_layout(button, |l| l.display_block = false);
            }
        }

        page.add_element(main, "SCRIPT", Rect::new(0.0, 0.0, 0.0, 0.0));
        page.add_element(main, "VIDEO", Rect::new(60.0, 520.0, 240.0, 135.0));
        let widget = page.add_element(main, "DIV", Rect::new(320.0, 520.0, 120.0, 60.0));
        page.mark_shadow(widget);
        let toast = page.add_element(body, "ASIDE", Rect::new(viewport.x - 260.0, viewport.y - 90.0, 220.0, 60.0));
        page.set_layout(toast, |l| {
            l.laid_out = false;
            l.fixed = true;
        });
        page
    }

    pub fn body(&self) -> Entity {
        self.body
    }

    pub fn sprite_root(&self) -> Option<Entity> {
        self.sprite_root
    }

    /// Append a new laid-out element under `parent`.
    pub fn add_element(&mut self, parent: Entity, tag: &str, rect: Rect) -> Entity {
        let el = self.spawn_node(tag, Layout::block(rect));
        self.attach(parent, el, None);
        el
    }

    pub fn set_layout(&mut self, el: Entity, edit: impl FnOnce(&mut Layout)) {
        if let Ok(mut layout) = self.world.get::<&mut Layout>(el) {
            edit(&mut layout);
        }
    }

    pub fn layout(&self, el: Entity) -> Option<Layout> {
        self.world.get::<&Layout>(el).ok().map(|l| (*l).clone())
    }

    pub fn mark_shadow(&mut self, el: Entity) {
        let _ = self.world.insert_one(el, ShadowMark);
    }

    pub fn set_inline_style(&mut self, el: Entity, style: Option<&str>) {
        if let Ok(mut attr) = self.world.get::<&mut StyleAttr>(el) {
            attr.0 = style.map(str::to_string);
        }
    }

    /// Host-side removal: the element leaves the document but stays alive.
    pub fn detach(&mut self, el: Entity) {
        self.detach_node(el);
    }

    pub fn parent_of(&self, el: Entity) -> Option<Entity> {
        self.world.get::<&Parent>(el).ok().map(|p| p.0)
    }

    pub fn children_of(&self, el: Entity) -> Vec<Entity> {
        self.world
            .get::<&Children>(el)
            .map(|c| c.0.clone())
            .unwrap_or_default()
    }

    pub fn exists(&self, el: Entity) -> bool {
        self.world.contains(el)
    }

    pub fn is_placeholder(&self, el: Entity) -> bool {
        self.world.get::<&PlaceholderMark>(el).is_ok()
    }

    /// Live placeholders anywhere in the world.
    pub fn placeholder_count(&self) -> usize {
        self.world.query::<&PlaceholderMark>().iter().count()
    }

    // -----------------------------------------------------------------------
    // Tree plumbing
    // -----------------------------------------------------------------------

    fn spawn_node(&mut self, tag: &str, layout: Layout) -> Entity {
        self.world.spawn((
            Tag(tag.to_ascii_uppercase()),
            Children(Vec::new()),
            layout,
            StyleAttr(None),
        ))
    }

    fn attach(&mut self, parent: Entity, child: Entity, index: Option<usize>) {
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            let at = index.unwrap_or(children.0.len()).min(children.0.len());
            children.0.insert(at, child);
        } else {
            return;
        }
        let _ = self.world.insert_one(child, Parent(parent));
    }

    /// Unlink `el` from its parent. Returns the old parent and index.
    fn detach_node(&mut self, el: Entity) -> Option<(Entity, usize)> {
        let parent = self.world.remove_one::<Parent>(el).ok()?.0;
        let mut children = self.world.get::<&mut Children>(parent).ok()?;
        let index = children.0.iter().position(|&c| c == el)?;
        children.0.remove(index);
        Some((parent, index))
    }

    fn index_in_parent(&self, el: Entity) -> Result<(Entity, usize), PageError> {
        let parent = self.parent_of(el).ok_or(PageError::NoParent)?;
        let children = self.world.get::<&Children>(parent).map_err(|_| PageError::Unknown)?;
        let index = children
            .0
            .iter()
            .position(|&c| c == el)
            .ok_or(PageError::NoParent)?;
        Ok((parent, index))
    }

    fn ancestors_or_self(&self, el: Entity) -> impl Iterator<Item = Entity> + '_ {
        std::iter::successors(Some(el), move |&e| self.parent_of(e))
    }

    fn lineage(&self, el: Entity) -> Lineage {
        for e in self.ancestors_or_self(el) {
            if self.world.get::<&SpriteMark>(e).is_ok() {
                return Lineage::Sprite;
            }
            if self.world.get::<&PlaceholderMark>(e).is_ok() {
                return Lineage::Placeholder;
            }
        }
        if let Some(sprite) = self.sprite_root {
            if self.ancestors_or_self(sprite).any(|e| e == el) {
                return Lineage::Sprite;
            }
        }
        Lineage::Host
    }

    fn require(&self, el: Entity) -> Result<(), PageError> {
        if self.world.contains(el) {
            Ok(())
        } else {
            Err(PageError::Unknown)
        }
    }

    fn subtree(&self, el: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut stack = vec![el];
        while let Some(e) = stack.pop() {
            out.push(e);
            let children = self.children_of(e);
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

impl Page for SimPage {
    type Element = Entity;

    fn mount_sprite(&mut self) {
        if self.sprite_root.is_some() {
            return;
        }
        let root = self.spawn_node(
            "DIV",
            Layout {
                fixed: true,
                ..Layout::unrendered()
            },
        );
        let _ = self.world.insert_one(root, SpriteMark);
        let body = self.body;
        self.attach(body, root, None);
        let visual = self.spawn_node("DIV", Layout::unrendered());
        self.attach(root, visual, None);
        self.sprite_root = Some(root);
        self.sprite.mounted = true;
    }

    fn set_sprite_hidden(&mut self, hidden: bool) {
        self.sprite.hidden = hidden;
        self.sprite.hidden_history.push(hidden);
    }

    fn set_sprite_position(&mut self, position: Vec2) {
        self.sprite.position = position;
    }

    fn set_sprite_size(&mut self, size: Vec2) {
        self.sprite.size = size;
    }

    fn set_sprite_facing(&mut self, facing: Facing) {
        self.sprite.facing = Some(facing);
    }

    fn set_sprite_flags(&mut self, flags: SpriteFlags) {
        self.sprite.flags = flags;
    }

    fn set_sprite_frame(&mut self, url: &str) {
        self.sprite.frame = Some(url.to_string());
        self.sprite.frame_draws += 1;
    }

    fn asset_url(&self, frame: &str) -> String {
        format!("{ASSET_BASE}/{frame}")
    }

    fn elements(&self) -> Vec<Entity> {
        self.subtree(self.root)
    }

    fn inspect(&self, el: Entity) -> Option<ElementInfo> {
        let tag = self.world.get::<&Tag>(el).ok()?.0.clone();
        let layout = self.layout(el)?;
        Some(ElementInfo {
            tag,
            lineage: self.lineage(el),
            laid_out: layout.laid_out,
            fixed: layout.fixed,
            shadow: self.world.get::<&ShadowMark>(el).is_ok(),
            child_count: self.children_of(el).len(),
            display_block: layout.display_block,
            margin: layout.margin,
        })
    }

    fn is_connected(&self, el: Entity) -> bool {
        self.world.contains(el) && self.ancestors_or_self(el).any(|e| e == self.root)
    }

    fn bounding_rect(&self, el: Entity) -> Option<Rect> {
        if !self.world.contains(el) {
            return None;
        }
        if !self.is_connected(el) {
            return Some(Rect::new(0.0, 0.0, 0.0, 0.0));
        }
        if let Ok(overlay) = self.world.get::<&Overlay>(el) {
            return Some(Rect::new(
                overlay.offset.x,
                overlay.offset.y,
                overlay.width,
                overlay.height,
            ));
        }
        let layout = self.layout(el)?;
        if layout.laid_out || layout.fixed {
            Some(layout.rect)
        } else {
            Some(Rect::new(0.0, 0.0, 0.0, 0.0))
        }
    }

    fn style_attribute(&self, el: Entity) -> Option<String> {
        self.world.get::<&StyleAttr>(el).ok()?.0.clone()
    }

    fn set_style_attribute(&mut self, el: Entity, style: Option<&str>) -> Result<(), PageError> {
        self.require(el)?;
        self.set_inline_style(el, style);
        let _ = self.world.remove_one::<Overlay>(el);
        Ok(())
    }

    fn apply_overlay_style(&mut self, el: Entity, style: &OverlayStyle) -> Result<(), PageError> {
        self.require(el)?;
        let mut decls = Declarations::parse(self.style_attribute(el).as_deref().unwrap_or(""));
        decls.set("position", "fixed");
        decls.set("left", "0px");
        decls.set("top", "0px");
        decls.set("margin", "0");
        decls.set("width", format!("{}px", style.width));
        decls.set("height", format!("{}px", style.height));
        decls.set("transform", translate(style.offset));
        decls.set("z-index", style.z_index.to_string());
        decls.set(
            "transition",
            format!("transform {}s linear", style.transition_ms / 1000.0),
        );
        self.set_inline_style(el, Some(&decls.serialize()));
        let _ = self.world.insert_one(
            el,
            Overlay {
                offset: style.offset,
                width: style.width,
                height: style.height,
            },
        );
        Ok(())
    }

    fn set_overlay_offset(&mut self, el: Entity, offset: Vec2) -> Result<(), PageError> {
        self.require(el)?;
        match self.world.get::<&mut Overlay>(el) {
            Ok(mut overlay) => overlay.offset = offset,
            Err(_) => return Err(PageError::Unknown),
        }
        let mut decls = Declarations::parse(self.style_attribute(el).as_deref().unwrap_or(""));
        decls.set("transform", translate(offset));
        self.set_inline_style(el, Some(&decls.serialize()));
        Ok(())
    }

    fn create_placeholder(&mut self, spec: &PlaceholderSpec) -> Result<Entity, PageError> {
        let layout = Layout {
            rect: Rect::new(0.0, 0.0, spec.width, spec.height),
            laid_out: true,
            fixed: false,
            display_block: spec.display_block,
            margin: spec.margin.clone(),
        };
        let el = self.spawn_node("DIV", layout);
        let _ = self.world.insert_one(el, PlaceholderMark);
        let display = if spec.display_block { "block" } else { "inline-block" };
        let style = format!(
            "width: {}px; height: {}px; display: {display}; margin: {};",
            spec.width, spec.height, spec.margin
        );
        self.set_inline_style(el, Some(&style));
        Ok(el)
    }

    fn insert_after(&mut self, reference: Entity, node: Entity) -> Result<(), PageError> {
        self.require(reference)?;
        self.require(node)?;
        self.detach_node(node);
        let (parent, index) = self.index_in_parent(reference)?;
        self.attach(parent, node, Some(index + 1));
        // A placeholder occupies the slot of the element it follows.
        if self.is_placeholder(node) {
            if let Some(origin) = self.layout(reference).map(|l| l.rect) {
                self.set_layout(node, |l| {
                    l.rect.left = origin.left;
                    l.rect.top = origin.top;
                });
            }
        }
        Ok(())
    }

    fn append_to_body(&mut self, el: Entity) -> Result<(), PageError> {
        self.require(el)?;
        self.detach_node(el);
        let body = self.body;
        self.attach(body, el, None);
        Ok(())
    }

    fn replace_with(&mut self, old: Entity, replacement: Entity) -> Result<(), PageError> {
        self.require(old)?;
        self.require(replacement)?;
        self.detach_node(replacement);
        let (parent, index) = self.index_in_parent(old)?;
        self.detach_node(old);
        self.attach(parent, replacement, Some(index));
        Ok(())
    }

    fn remove(&mut self, el: Entity) {
        if !self.world.contains(el) {
            return;
        }
        self.detach_node(el);
        for e in self.subtree(el) {
            let _ = self.world.despawn(e);
        }
        if self.sprite_root == Some(el) {
            self.sprite_root = None;
        }
    }
}

fn translate(offset: Vec2) -> String {
    format!("translate3d({}px, {}px, 0)", offset.x, offset.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 800.0);

    #[test]
    fn document_order_and_connectivity() {
        let mut page = SimPage::new(VIEWPORT);
        let body = page.body();
        let a = page.add_element(body, "DIV", Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = page.add_element(a, "SPAN", Rect::new(0.0, 0.0, 40.0, 20.0));
        let c = page.add_element(body, "P", Rect::new(0.0, 60.0, 50.0, 50.0));
        let order = page.elements();
        let pos = |e| order.iter().position(|&x| x == e).unwrap();
        assert!(pos(a) < pos(b) && pos(b) < pos(c));

        page.detach(a);
        assert!(!page.is_connected(a));
        assert!(!page.is_connected(b));
        assert!(page.is_connected(c));
        assert!(!page.elements().contains(&b));
    }

    #[test]
    fn placeholder_swap_keeps_position() {
        let mut page = SimPage::new(VIEWPORT);
        let body = page.body();
        let first = page.add_element(body, "P", Rect::new(0.0, 0.0, 50.0, 50.0));
        let target = page.add_element(body, "P", Rect::new(0.0, 60.0, 80.0, 30.0));
        let last = page.add_element(body, "P", Rect::new(0.0, 100.0, 50.0, 50.0));

        let spec = PlaceholderSpec {
            width: 80.0,
            height: 30.0,
            display_block: true,
            margin: "0px".into(),
        };
        let ph = page.create_placeholder(&spec).unwrap();
        page.insert_after(target, ph).unwrap();
        page.append_to_body(target).unwrap();
        assert_eq!(page.children_of(body), vec![first, ph, last, target]);
        assert_eq!(page.bounding_rect(ph), Some(Rect::new(0.0, 60.0, 80.0, 30.0)));

        page.replace_with(ph, target).unwrap();
        assert_eq!(page.children_of(body), vec![first, target, last]);
        assert!(!page.is_connected(ph));
    }

    #[test]
    fn overlay_box_overrides_layout_until_style_reset() {
        let mut page = SimPage::new(VIEWPORT);
        let body = page.body();
        let el = page.add_element(body, "BUTTON", Rect::new(10.0, 10.0, 100.0, 40.0));
        let overlay = OverlayStyle {
            width: 100.0,
            height: 40.0,
            offset: Vec2::new(300.0, 200.0),
            z_index: 5,
            transition_ms: 120.0,
        };
        page.apply_overlay_style(el, &overlay).unwrap();
        page.set_overlay_offset(el, Vec2::new(310.0, 205.0)).unwrap();
        assert_eq!(page.bounding_rect(el), Some(Rect::new(310.0, 205.0, 100.0, 40.0)));
        let attr = page.style_attribute(el).unwrap();
        assert!(attr.contains("position: fixed;"));
        assert!(attr.contains("transform: translate3d(310px, 205px, 0);"));

        page.set_style_attribute(el, None).unwrap();
        assert_eq!(page.style_attribute(el), None);
        assert_eq!(page.bounding_rect(el), Some(Rect::new(10.0, 10.0, 100.0, 40.0)));
    }

    #[test]
    fn sprite_nodes_report_sprite_lineage() {
        let mut page = SimPage::new(VIEWPORT);
        page.mount_sprite();
        let root = page.sprite_root().unwrap();
        let visual = page.children_of(root)[0];
        assert_eq!(page.inspect(root).unwrap().lineage, Lineage::Sprite);
        assert_eq!(page.inspect(visual).unwrap().lineage, Lineage::Sprite);
        // The body contains the sprite root.
        assert_eq!(page.inspect(page.body()).unwrap().lineage, Lineage::Sprite);
    }
}
