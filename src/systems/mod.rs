pub mod animate;
pub mod appearance;
pub mod behavior;
pub mod interaction;
pub mod movement;
pub mod target;

use crate::controller::Controller;
use crate::page::Page;

/// Run every per-frame system once. Inactive characters fall through each
/// step without effect.
pub fn tick<P: Page>(ctl: &mut Controller<P>, now: f64) {
    // 1. Decide where to go this frame
    target::update(ctl);

    // 2. Straight-line seek (may trigger the post-hunt teleport)
    movement::update(ctl, now);

    // 3. Promote a close-enough pending grab, keep the carry in hand
    interaction::update(ctl, now);

    // 4. Frame selection and advance
    animate::update(ctl, now);
}
