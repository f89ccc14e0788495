//! Panel layout
//!
//! The display is a row of identical panels tiled left to right. Each panel
//! is `width` columns by `height` rows; the global grid is
//! `panels * width` columns by `height` rows.

/// Default number of panels
pub const DEFAULT_PANELS: usize = 5;

/// Default columns per panel
pub const DEFAULT_PANEL_WIDTH: usize = 20;

/// Default rows per panel
pub const DEFAULT_PANEL_HEIGHT: usize = 26;

/// Pixel count of the default layout
pub const DEFAULT_PIXELS: usize = DEFAULT_PANELS * DEFAULT_PANEL_WIDTH * DEFAULT_PANEL_HEIGHT;

/// Maximum number of panels a layout can describe
pub const MAX_PANELS: usize = 8;

/// Hard cap on the star pool
pub const MAX_STARS: usize = 500;

/// Layout validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Zero panels
    NoPanels,
    /// More than [`MAX_PANELS`]
    TooManyPanels,
    /// Zero width or height
    EmptyPanel,
    /// Layout pixel count differs from the frame buffer size
    PixelCountMismatch,
}

/// Physical arrangement of the panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelLayout {
    /// Number of panels
    pub panels: usize,
    /// Columns per panel
    pub width: usize,
    /// Rows per panel
    pub height: usize,
    /// Odd columns are wired bottom-to-top
    pub serpentine: bool,
    /// Per-panel row inversion
    pub invert: [bool; MAX_PANELS],
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::new(DEFAULT_PANELS, DEFAULT_PANEL_WIDTH, DEFAULT_PANEL_HEIGHT)
    }
}

impl PanelLayout {
    /// Create a non-serpentine, non-inverted layout
    pub const fn new(panels: usize, width: usize, height: usize) -> Self {
        Self {
            panels,
            width,
            height,
            serpentine: false,
            invert: [false; MAX_PANELS],
        }
    }

    /// Global width in columns
    pub const fn total_width(&self) -> usize {
        self.panels * self.width
    }

    /// LEDs on one panel
    pub const fn pixels_per_panel(&self) -> usize {
        self.width * self.height
    }

    /// LEDs on the whole display
    pub const fn pixel_count(&self) -> usize {
        self.panels * self.pixels_per_panel()
    }

    /// Whether rows on `panel` are inverted
    pub fn is_inverted(&self, panel: usize) -> bool {
        self.invert.get(panel).copied().unwrap_or(false)
    }

    /// Check the layout is usable with a frame buffer of `pixels` LEDs
    pub fn validate(&self, pixels: usize) -> Result<(), LayoutError> {
        if self.panels == 0 {
            return Err(LayoutError::NoPanels);
        }
        if self.panels > MAX_PANELS {
            return Err(LayoutError::TooManyPanels);
        }
        if self.width == 0 || self.height == 0 {
            return Err(LayoutError::EmptyPanel);
        }
        if self.pixel_count() != pixels {
            return Err(LayoutError::PixelCountMismatch);
        }
        Ok(())
    }
}
