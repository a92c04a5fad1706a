//! Initial placement of note windows.

use stickynotes_protocol::Bounds;
use stickynotes_protocol::constants::{CASCADE_MARGIN, CASCADE_STEP};
use stickynotes_protocol::settings::Size;

/// Places the next note window.
///
/// Each existing window shifts the origin down-right by one step so new
/// notes never land exactly on top of each other. The result stays inside
/// `work_area`, keeping a margin from its right and bottom edges.
pub fn cascade(existing: usize, size: Size, work_area: Option<Bounds>) -> Bounds {
    let offset = CASCADE_STEP.saturating_mul(existing.min(i32::MAX as usize) as i32);
    let mut x = CASCADE_MARGIN.saturating_add(offset);
    let mut y = CASCADE_MARGIN.saturating_add(offset);

    if let Some(area) = work_area {
        let max_x = area.x + area.width as i32 - size.width as i32 - CASCADE_MARGIN;
        let max_y = area.y + area.height as i32 - size.height as i32 - CASCADE_MARGIN;
        x = x.min(max_x).max(area.x);
        y = y.min(max_y).max(area.y);
    }

    Bounds {
        x,
        y,
        width: size.width,
        height: size.height,
    }
}

/// Moves `bounds` back inside `work_area` when it was saved on a display
/// that is no longer attached. Size is kept.
pub fn clamp_to(bounds: Bounds, work_area: Option<Bounds>) -> Bounds {
    let Some(area) = work_area else {
        return bounds;
    };
    let max_x = area.x + area.width as i32 - bounds.width.min(area.width) as i32;
    let max_y = area.y + area.height as i32 - bounds.height.min(area.height) as i32;
    Bounds {
        x: bounds.x.clamp(area.x, max_x.max(area.x)),
        y: bounds.y.clamp(area.y, max_y.max(area.y)),
        ..bounds
    }
}
