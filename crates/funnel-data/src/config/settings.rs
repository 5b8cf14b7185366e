//! Funnel settings snapshot and its static option schema
//!
//! Settings are loaded once per update into an immutable [`FunnelSettings`]
//! value. [`SETTINGS_SCHEMA`] declares every option with its default and its
//! allowed range or enumeration; [`FunnelSettings::clamped`] enforces it.

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::DataError;

/// Palette policy for legend categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    #[default]
    Default,
    Category10,
    Category20,
    Custom,
}

/// Where the legend is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl LegendPosition {
    /// Top and bottom legends take a horizontal band, left and right a column
    pub fn is_horizontal(self) -> bool {
        matches!(self, LegendPosition::Top | LegendPosition::Bottom)
    }
}

/// Order of segments inside a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentOrder {
    /// First-seen source order
    #[default]
    Insertion,
    /// Largest value first; ties keep source order
    Descending,
}

/// Data colors card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataPointSettings {
    pub palette: PaletteKind,
    /// Uniform color used by the custom palette
    pub fill: String,
    pub segment_order: SegmentOrder,
}

impl Default for DataPointSettings {
    fn default() -> Self {
        Self {
            palette: PaletteKind::Default,
            fill: "#01B8AA".to_string(),
            segment_order: SegmentOrder::Insertion,
        }
    }
}

/// Labels card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelSettings {
    /// Show value labels inside segments
    pub show: bool,
    /// Stage label color
    pub color: String,
    /// Value label color
    pub value_color: String,
    pub font_size: f32,
    pub stage_font_size: f32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            show: true,
            color: "#000000".to_string(),
            value_color: "#ffffff".to_string(),
            font_size: 12.0,
            stage_font_size: 14.0,
        }
    }
}

/// Legend card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendSettings {
    pub show: bool,
    pub position: LegendPosition,
    pub height: f32,
    pub font_size: f32,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            show: true,
            position: LegendPosition::Top,
            height: 30.0,
            font_size: 12.0,
        }
    }
}

/// Bar geometry card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSettings {
    pub bar_gap: f32,
    pub min_gap: f32,
    pub min_bar_height: f32,
    pub corner_radius: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            bar_gap: 10.0,
            min_gap: 2.0,
            min_bar_height: 18.0,
            corner_radius: 0.0,
        }
    }
}

/// Rates card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateSettings {
    /// Decimal places kept by conversion and drop-off percentages
    pub decimals: u32,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

/// Immutable settings snapshot for one update cycle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunnelSettings {
    pub data_point: DataPointSettings,
    pub labels: LabelSettings,
    pub legend: LegendSettings,
    pub layout: LayoutSettings,
    pub rates: RateSettings,
}

/// Kind, default and constraints of one option
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionKind {
    Toggle { default: bool },
    Number { default: f32, min: f32, max: f32 },
    Color { default: &'static str },
    Choice { default: &'static str, items: &'static [&'static str] },
}

/// One named option of the settings schema
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionSpec {
    pub card: &'static str,
    pub name: &'static str,
    pub display_name: &'static str,
    pub kind: OptionKind,
}

const fn number(card: &'static str, name: &'static str, display_name: &'static str, default: f32, min: f32, max: f32) -> OptionSpec {
    OptionSpec { card, name, display_name, kind: OptionKind::Number { default, min, max } }
}

/// Every option a host property pane can expose
pub static SETTINGS_SCHEMA: &[OptionSpec] = &[
    OptionSpec {
        card: "dataPoint",
        name: "palette",
        display_name: "Palette",
        kind: OptionKind::Choice { default: "default", items: &["default", "category10", "category20", "custom"] },
    },
    OptionSpec { card: "dataPoint", name: "fill", display_name: "Color", kind: OptionKind::Color { default: "#01B8AA" } },
    OptionSpec {
        card: "dataPoint",
        name: "segmentOrder",
        display_name: "Segment order",
        kind: OptionKind::Choice { default: "insertion", items: &["insertion", "descending"] },
    },
    OptionSpec { card: "labels", name: "show", display_name: "Show", kind: OptionKind::Toggle { default: true } },
    OptionSpec { card: "labels", name: "color", display_name: "Color", kind: OptionKind::Color { default: "#000000" } },
    OptionSpec { card: "labels", name: "valueColor", display_name: "Value color", kind: OptionKind::Color { default: "#ffffff" } },
    number("labels", "fontSize", "Text Size", 12.0, 8.0, 40.0),
    number("labels", "stageFontSize", "Stage text size", 14.0, 8.0, 40.0),
    OptionSpec { card: "legend", name: "show", display_name: "Show", kind: OptionKind::Toggle { default: true } },
    OptionSpec {
        card: "legend",
        name: "position",
        display_name: "Position",
        kind: OptionKind::Choice { default: "top", items: &["top", "bottom", "left", "right"] },
    },
    number("legend", "height", "Height", 30.0, 20.0, 120.0),
    number("legend", "fontSize", "Text Size", 12.0, 8.0, 40.0),
    number("layout", "barGap", "Bar gap", 10.0, 0.0, 100.0),
    number("layout", "minGap", "Minimum gap", 2.0, 0.0, 20.0),
    number("layout", "minBarHeight", "Minimum bar height", 18.0, 4.0, 200.0),
    number("layout", "cornerRadius", "Corner radius", 0.0, 0.0, 20.0),
    number("rates", "decimals", "Decimal places", 2.0, 0.0, 6.0),
];

/// Look up an option of the schema
pub fn option_spec(card: &str, name: &str) -> Option<&'static OptionSpec> {
    SETTINGS_SCHEMA.iter().find(|spec| spec.card == card && spec.name == name)
}

fn clamp_to_schema(card: &str, name: &str, value: f32) -> f32 {
    match option_spec(card, name).map(|spec| spec.kind) {
        Some(OptionKind::Number { default, min, max }) => {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                default
            }
        }
        _ => value,
    }
}

/// Parse `#rgb` or `#rrggbb`
pub fn parse_hex_color(text: &str) -> Option<Color32> {
    let hex = text.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Color32::from_rgb(digits.next()??, digits.next()??, digits.next()??))
        }
        6 => Some(Color32::from_rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

fn color_or_default(value: &str, card: &str, name: &str) -> Color32 {
    parse_hex_color(value)
        .or_else(|| match option_spec(card, name).map(|spec| spec.kind) {
            Some(OptionKind::Color { default }) => parse_hex_color(default),
            _ => None,
        })
        .unwrap_or(Color32::GRAY)
}

impl FunnelSettings {
    /// Parse a JSON settings document. Missing cards and options take their
    /// defaults; numbers are clamped into their declared ranges.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let settings: FunnelSettings = serde_json::from_str(json)?;
        Ok(settings.clamped())
    }

    /// Copy with every numeric option forced into its declared range
    pub fn clamped(mut self) -> Self {
        let labels = &mut self.labels;
        labels.font_size = clamp_to_schema("labels", "fontSize", labels.font_size);
        labels.stage_font_size = clamp_to_schema("labels", "stageFontSize", labels.stage_font_size);

        let legend = &mut self.legend;
        legend.height = clamp_to_schema("legend", "height", legend.height);
        legend.font_size = clamp_to_schema("legend", "fontSize", legend.font_size);

        let layout = &mut self.layout;
        layout.bar_gap = clamp_to_schema("layout", "barGap", layout.bar_gap);
        layout.min_gap = clamp_to_schema("layout", "minGap", layout.min_gap);
        layout.min_bar_height = clamp_to_schema("layout", "minBarHeight", layout.min_bar_height);
        layout.corner_radius = clamp_to_schema("layout", "cornerRadius", layout.corner_radius);

        self.rates.decimals = clamp_to_schema("rates", "decimals", self.rates.decimals as f32) as u32;
        self
    }

    pub fn fill_color(&self) -> Color32 {
        color_or_default(&self.data_point.fill, "dataPoint", "fill")
    }

    pub fn stage_label_color(&self) -> Color32 {
        color_or_default(&self.labels.color, "labels", "color")
    }

    pub fn value_label_color(&self) -> Color32 {
        color_or_default(&self.labels.value_color, "labels", "valueColor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_schema() {
        let settings = FunnelSettings::default();
        for spec in SETTINGS_SCHEMA {
            if let OptionKind::Number { default, min, max } = spec.kind {
                assert!(default >= min && default <= max, "{}.{}", spec.card, spec.name);
            }
        }
        assert_eq!(settings.layout.bar_gap, 10.0);
        assert_eq!(settings.layout.min_bar_height, 18.0);
        assert_eq!(settings.rates.decimals, 2);
        assert!(settings.legend.show);
    }

    #[test]
    fn test_partial_json() {
        let settings = FunnelSettings::from_json(
            r#"{"dataPoint": {"palette": "custom"}, "legend": {"position": "bottom"}}"#,
        )
        .unwrap();
        assert_eq!(settings.data_point.palette, PaletteKind::Custom);
        assert_eq!(settings.legend.position, LegendPosition::Bottom);
        assert_eq!(settings.labels, LabelSettings::default());
    }

    #[test]
    fn test_clamping() {
        let settings = FunnelSettings::from_json(
            r#"{"layout": {"barGap": 500, "minBarHeight": -3}, "rates": {"decimals": 9}}"#,
        )
        .unwrap();
        assert_eq!(settings.layout.bar_gap, 100.0);
        assert_eq!(settings.layout.min_bar_height, 4.0);
        assert_eq!(settings.rates.decimals, 6);
    }

    #[test]
    fn test_choice_values_match_serde_names() {
        for spec in SETTINGS_SCHEMA {
            if let OptionKind::Choice { default, items } = spec.kind {
                assert!(items.contains(&default), "{}.{}", spec.card, spec.name);
            }
        }
        let Some(OptionKind::Choice { items, .. }) = option_spec("legend", "position").map(|s| s.kind) else {
            panic!("legend.position is not a choice");
        };
        for item in items {
            let position: LegendPosition = serde_json::from_str(&format!("\"{}\"", item)).unwrap();
            assert_eq!(serde_json::to_string(&position).unwrap(), format!("\"{}\"", item));
        }
        assert!(FunnelSettings::from_json(r#"{"legend": {"position": "Top"}}"#).is_err());
    }

    #[test]
    fn test_data_point_card_has_no_font_size() {
        assert!(option_spec("dataPoint", "fontSize").is_none());
        let json = serde_json::to_value(FunnelSettings::default()).unwrap();
        assert!(json["dataPoint"].get("fontSize").is_none());
        assert!(json["labels"].get("fontSize").is_some());
    }

    #[test]
    fn test_unknown_palette_rejected() {
        let result = FunnelSettings::from_json(r#"{"dataPoint": {"palette": "rainbow"}}"#);
        assert!(matches!(result, Err(DataError::Settings(_))));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_hex_color("#01B8AA"), Some(Color32::from_rgb(0x01, 0xb8, 0xaa)));
        assert_eq!(parse_hex_color("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_hex_color("teal"), None);

        let mut settings = FunnelSettings::default();
        settings.data_point.fill = "not a color".to_string();
        assert_eq!(settings.fill_color(), Color32::from_rgb(0x01, 0xb8, 0xaa));
    }
}
