//! Horizontal width arithmetic for table rows.

use ratatui::layout::Rect;

use crate::column::{SizeKind, SizePolicy};

/// One column's sizing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub size: SizePolicy,
    /// Width of the cell's content, used by [`SizeKind::Pack`].
    pub content_width: u16,
}

impl Slot {
    #[must_use]
    pub const fn new(size: SizePolicy, content_width: u16) -> Self {
        Self {
            size,
            content_width,
        }
    }
}

/// Split `max_width` between columns separated by `divider` blank cells.
///
/// Fixed and packed columns take their width first and weighted columns take
/// `min_width`. Columns that no longer fit are dropped from the right, so the
/// result can be shorter than `slots` (the first column is always kept).
/// Whatever space is left is shared out between weighted columns in
/// proportion to their weight, lightest first, never going below
/// `min_width`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn column_widths(max_width: u16, slots: &[Slot], divider: u16, min_width: u16) -> Vec<u16> {
    let divider = i32::from(divider);
    let min_width = i32::from(min_width);
    let mut shared = i32::from(max_width) + divider;
    let mut widths: Vec<i32> = Vec::with_capacity(slots.len());
    let mut weighted: Vec<(u16, usize)> = Vec::new();

    for (i, slot) in slots.iter().enumerate() {
        let static_width = match slot.size.kind {
            SizeKind::Given => i32::from(slot.size.amount),
            SizeKind::Pack => i32::from(slot.content_width),
            SizeKind::Weight => min_width,
        };
        if i > 0 && shared < static_width + divider {
            break;
        }
        widths.push(static_width);
        shared -= static_width + divider;
        if slot.size.kind == SizeKind::Weight {
            weighted.push((slot.size.amount, i));
        }
    }

    if shared != 0 && !weighted.is_empty() {
        weighted.sort_unstable();
        let mut total: i32 = weighted.iter().map(|(w, _)| i32::from(*w)).sum();
        let count = i32::try_from(weighted.len()).unwrap_or(i32::MAX);
        let mut grow = shared + count * min_width;
        for (weight, i) in weighted {
            let weight = i32::from(weight);
            let width = if total > 0 {
                (f64::from(grow) * f64::from(weight) / f64::from(total) + 0.5).trunc() as i32
            } else {
                0
            };
            let width = width.max(min_width);
            widths[i] = width;
            grow -= width;
            total -= weight;
        }
    }

    widths
        .into_iter()
        .map(|w| u16::try_from(w.max(0)).unwrap_or(u16::MAX))
        .collect()
}

/// Lay out cells of the given widths left to right inside `area`.
///
/// Cells that would start past the right edge are omitted; the last visible
/// one is clipped to the area.
#[must_use]
pub fn cell_areas(area: Rect, widths: &[u16], divider: u16) -> Vec<Rect> {
    let mut areas = Vec::with_capacity(widths.len());
    let mut x = area.x;
    let right = area.right();
    for &width in widths {
        if x >= right {
            break;
        }
        let width = width.min(right - x);
        areas.push(Rect::new(x, area.y, width, area.height));
        x = x.saturating_add(width).saturating_add(divider);
    }
    areas
}
