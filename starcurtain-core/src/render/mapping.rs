//! Logical to physical pixel mapping
//!
//! Each panel is wired column by column. Inside a panel a column of `height`
//! LEDs is contiguous; with serpentine wiring every odd column runs in the
//! opposite direction. Panels follow one another in the transport's flat
//! index space.

use crate::config::PanelLayout;

/// Index of `(col, row)` within one panel
pub fn local_index(layout: &PanelLayout, col: usize, row: usize) -> usize {
    if layout.serpentine && col % 2 == 1 {
        col * layout.height + (layout.height - 1 - row)
    } else {
        col * layout.height + row
    }
}

/// Flat transport index of a panel-local index
pub fn physical_index(layout: &PanelLayout, panel: usize, local: usize) -> usize {
    panel * layout.pixels_per_panel() + local
}

/// Map a global column and row to a physical index
///
/// Returns `None` when the column or row is outside the display; nothing is
/// wrapped.
pub fn map_pixel(layout: &PanelLayout, gx: i32, row: usize) -> Option<usize> {
    if gx < 0 || row >= layout.height {
        return None;
    }
    let gx = gx as usize;
    if gx >= layout.total_width() {
        return None;
    }

    let panel = gx / layout.width;
    let col = gx % layout.width;
    let row = if layout.is_inverted(panel) {
        layout.height - 1 - row
    } else {
        row
    };

    Some(physical_index(layout, panel, local_index(layout, col, row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PanelLayout {
        PanelLayout::new(3, 4, 5)
    }

    #[test]
    fn test_local_index_plain() {
        let layout = layout();
        assert_eq!(local_index(&layout, 0, 0), 0);
        assert_eq!(local_index(&layout, 0, 4), 4);
        assert_eq!(local_index(&layout, 1, 0), 5);
        assert_eq!(local_index(&layout, 3, 2), 17);
    }

    #[test]
    fn test_local_index_serpentine() {
        let mut layout = layout();
        layout.serpentine = true;
        assert_eq!(local_index(&layout, 0, 0), 0);
        // Odd column runs backwards
        assert_eq!(local_index(&layout, 1, 0), 9);
        assert_eq!(local_index(&layout, 1, 4), 5);
        assert_eq!(local_index(&layout, 2, 0), 10);
    }

    #[test]
    fn test_map_pixel_across_panels() {
        let layout = layout();
        assert_eq!(map_pixel(&layout, 0, 0), Some(0));
        // First column of the second panel
        assert_eq!(map_pixel(&layout, 4, 0), Some(20));
        assert_eq!(map_pixel(&layout, 11, 4), Some(2 * 20 + 3 * 5 + 4));
    }

    #[test]
    fn test_map_pixel_inverted_panel() {
        let mut layout = layout();
        layout.invert[1] = true;
        assert_eq!(map_pixel(&layout, 4, 0), Some(20 + 4));
        assert_eq!(map_pixel(&layout, 4, 4), Some(20));
        // Other panels untouched
        assert_eq!(map_pixel(&layout, 0, 0), Some(0));
    }

    #[test]
    fn test_map_pixel_rejects_out_of_range() {
        let layout = layout();
        assert_eq!(map_pixel(&layout, -1, 0), None);
        assert_eq!(map_pixel(&layout, 12, 0), None);
        assert_eq!(map_pixel(&layout, 0, 5), None);
    }

    #[test]
    fn test_every_pixel_maps_uniquely() {
        let mut layout = layout();
        layout.serpentine = true;
        layout.invert[2] = true;

        let mut seen = [false; 60];
        for gx in 0..layout.total_width() as i32 {
            for row in 0..layout.height {
                let idx = map_pixel(&layout, gx, row).unwrap();
                assert!(!seen[idx]);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
