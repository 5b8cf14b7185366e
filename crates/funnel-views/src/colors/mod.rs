//! Color assignment for legend categories

use egui::Color32;
use funnel_data::config::PaletteKind;
use indexmap::IndexMap;
use tracing::warn;

/// Color used when a palette has no entries
pub const FALLBACK_COLOR: Color32 = Color32::from_rgb(0xcc, 0xcc, 0xcc);

/// The 20-color ordinal scheme
const CATEGORY20: [Color32; 20] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xae, 0xc7, 0xe8),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0xff, 0xbb, 0x78),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0x98, 0xdf, 0x8a),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0xff, 0x98, 0x96),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0xc5, 0xb0, 0xd5),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xc4, 0x9c, 0x94),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0xf7, 0xb6, 0xd2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xc7, 0xc7, 0xc7),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0xdb, 0xdb, 0x8d),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
    Color32::from_rgb(0x9e, 0xda, 0xe5),
];

/// Ordered colors of a palette policy. `Custom` has no ordinal palette.
pub fn palette(kind: PaletteKind) -> Vec<Color32> {
    match kind {
        PaletteKind::Default | PaletteKind::Category10 => colorous::CATEGORY10
            .iter()
            .map(|c| Color32::from_rgb(c.r, c.g, c.b))
            .collect(),
        PaletteKind::Category20 => CATEGORY20.to_vec(),
        PaletteKind::Custom => Vec::new(),
    }
}

/// Legend key to color
pub type ColorMap = IndexMap<String, Color32>;

/// Caller-owned color assigner.
///
/// Keys take palette slots in the order they are first asked for and keep
/// them until [`ColorAssigner::clear`]. Build one per dataset.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    colors: Vec<Color32>,
    /// Every key maps to this color when set
    uniform: Option<Color32>,
    assigned: ColorMap,
    next_index: usize,
}

impl ColorAssigner {
    /// Assigner for a palette policy; `custom` is the uniform color used by
    /// [`PaletteKind::Custom`]
    pub fn new(kind: PaletteKind, custom: Color32) -> Self {
        let uniform = (kind == PaletteKind::Custom).then_some(custom);
        Self {
            colors: palette(kind),
            uniform,
            assigned: IndexMap::new(),
            next_index: 0,
        }
    }

    /// Assigner over an explicit list of colors
    pub fn from_colors(colors: Vec<Color32>) -> Self {
        Self {
            colors,
            uniform: None,
            assigned: IndexMap::new(),
            next_index: 0,
        }
    }

    /// Color for a key, taking the next palette slot on first use
    pub fn color_for(&mut self, key: &str) -> Color32 {
        if let Some(color) = self.uniform {
            return color;
        }
        if let Some(color) = self.assigned.get(key) {
            return *color;
        }
        if self.colors.is_empty() {
            warn!("Color palette is empty; using fallback for '{}'", key);
            return FALLBACK_COLOR;
        }

        let color = self.colors[self.next_index];
        self.next_index = (self.next_index + 1) % self.colors.len();
        self.assigned.insert(key.to_string(), color);
        color
    }

    /// Colors for every legend category, in category order
    pub fn assign(&mut self, categories: &[String]) -> ColorMap {
        categories
            .iter()
            .map(|category| (category.clone(), self.color_for(category)))
            .collect()
    }

    /// Rewind the slot cursor; cached keys keep their colors
    pub fn reset(&mut self) -> &mut Self {
        self.next_index = 0;
        self
    }

    /// Forget cached keys
    pub fn clear(&mut self) {
        self.assigned.clear();
    }
}
