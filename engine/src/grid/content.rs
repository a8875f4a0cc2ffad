//! View content definitions.
//!
//! A view is an ordered list of content items anchored on the lattice. Items
//! are a closed set of kinds matched exhaustively wherever spans or rasters
//! are computed. Content anchors count rows from the *top* of the grid while
//! lattice y grows upward, so every span test applies the single flip
//! `count_y - anchor_y - 1` here and nowhere else.

use serde::{Deserialize, Serialize};

use super::GridConfig;

/// One content item of a view.
///
/// Serialized form matches the page-definition data:
/// `{"type": "TEXT", "x": 1, "y": 2, "value": "hello", "link": "about"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentItem {
    /// A run of text occupying one cell per character, drawn as one string.
    #[serde(rename = "TEXT")]
    Text {
        x: u32,
        y: u32,
        value: String,
        #[serde(default)]
        padding_left: f32,
        #[serde(default)]
        link: Option<String>,
        #[serde(default)]
        text_color: Option<[f32; 3]>,
    },
    /// Text laid out glyph-by-glyph, one centered character per cell.
    #[serde(rename = "TEXT_SPLIT")]
    SplitText {
        x: u32,
        y: u32,
        value: String,
        #[serde(default)]
        link: Option<String>,
        #[serde(default)]
        text_color: Option<[f32; 3]>,
    },
    /// An image covering a rectangular block of cells.
    #[serde(rename = "IMAGE")]
    Image {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        value: String,
    },
}

impl ContentItem {
    /// Content-space anchor (top-referenced row).
    pub fn anchor(&self) -> (u32, u32) {
        match *self {
            ContentItem::Text { x, y, .. }
            | ContentItem::SplitText { x, y, .. }
            | ContentItem::Image { x, y, .. } => (x, y),
        }
    }

    /// Number of cells the item spans along X.
    pub fn span_x(&self) -> u32 {
        match self {
            ContentItem::Text { value, .. } | ContentItem::SplitText { value, .. } => {
                value.chars().count() as u32
            }
            ContentItem::Image { width, .. } => *width,
        }
    }

    /// Number of cells the item spans along Y (rows, counted downward from
    /// the anchor).
    pub fn span_y(&self) -> u32 {
        match self {
            ContentItem::Text { .. } | ContentItem::SplitText { .. } => 1,
            ContentItem::Image { height, .. } => *height,
        }
    }

    /// Navigation target, if the item is a link.
    pub fn link(&self) -> Option<&str> {
        match self {
            ContentItem::Text { link, .. } | ContentItem::SplitText { link, .. } => {
                link.as_deref()
            }
            ContentItem::Image { .. } => None,
        }
    }

    /// Per-cell tint for text items, if one was declared.
    pub fn text_color(&self) -> Option<[f32; 3]> {
        match self {
            ContentItem::Text { text_color, .. } | ContentItem::SplitText { text_color, .. } => {
                *text_color
            }
            ContentItem::Image { .. } => None,
        }
    }

    /// Whether the lattice cell `(x, y)` falls inside this item's span.
    ///
    /// This is where the top-anchored content row is flipped into lattice y.
    pub fn contains_cell(&self, grid: &GridConfig, x: u32, y: u32) -> bool {
        let (ax, ay) = self.anchor();
        if x < ax || x >= ax + self.span_x() {
            return false;
        }
        // Item rows run downward from the anchor: content rows
        // ay..ay+span_y map to lattice rows (count_y-1-ay) down to
        // (count_y - ay - span_y).
        let top = match (grid.count_y).checked_sub(ay + 1) {
            Some(t) => t,
            None => return false, // anchored below the grid
        };
        let bottom = top + 1 - self.span_y().min(top + 1);
        (bottom..=top).contains(&y)
    }
}

/// An immutable, named list of content items — one full page of grid
/// content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub name: String,
    pub items: Vec<ContentItem>,
}

impl ViewDefinition {
    pub fn new(name: impl Into<String>, items: Vec<ContentItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// First item whose span contains the lattice cell `(x, y)`.
    pub fn item_at(&self, grid: &GridConfig, x: u32, y: u32) -> Option<&ContentItem> {
        self.items
            .iter()
            .find(|item| item.contains_cell(grid, x, y))
    }

    /// First image item of the view, if any.
    pub fn image(&self) -> Option<&ContentItem> {
        self.items
            .iter()
            .find(|item| matches!(item, ContentItem::Image { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(x: u32, y: u32, value: &str, link: Option<&str>) -> ContentItem {
        ContentItem::Text {
            x,
            y,
            value: value.to_string(),
            padding_left: 0.0,
            link: link.map(String::from),
            text_color: None,
        }
    }

    #[test]
    fn test_span_of_text_is_char_count() {
        let item = text(2, 0, "hello", None);
        assert_eq!(item.span_x(), 5);
        assert_eq!(item.span_y(), 1);
    }

    #[test]
    fn test_contains_cell_applies_row_flip() {
        let grid = GridConfig::new(3, 3, 3.0, 3.0);
        // Content row 1 of a 3-row grid is lattice row 1 (3 - 1 - 1)
        let item = text(1, 1, "A", Some("about"));
        assert!(item.contains_cell(&grid, 1, 1));
        assert!(!item.contains_cell(&grid, 1, 0));
        assert!(!item.contains_cell(&grid, 1, 2));
        assert!(!item.contains_cell(&grid, 0, 1));
        assert!(!item.contains_cell(&grid, 2, 1));
    }

    #[test]
    fn test_image_block_span() {
        let grid = GridConfig::new(10, 10, 10.0, 10.0);
        let image = ContentItem::Image {
            x: 2,
            y: 1,
            width: 3,
            height: 2,
            value: "shot.png".to_string(),
        };
        // Content rows 1..3 map to lattice rows 8 and 7
        assert!(image.contains_cell(&grid, 2, 8));
        assert!(image.contains_cell(&grid, 4, 7));
        assert!(!image.contains_cell(&grid, 5, 8));
        assert!(!image.contains_cell(&grid, 2, 6));
        assert!(!image.contains_cell(&grid, 2, 9));
    }

    #[test]
    fn test_item_at_returns_first_match() {
        let grid = GridConfig::new(5, 5, 5.0, 5.0);
        let view = ViewDefinition::new(
            "home",
            vec![text(0, 0, "ab", Some("first")), text(1, 0, "bc", Some("second"))],
        );
        let hit = view.item_at(&grid, 1, 4).unwrap();
        assert_eq!(hit.link(), Some("first"));
    }

    #[test]
    fn test_serde_round_trip() {
        let view = ViewDefinition::new(
            "projects",
            vec![
                text(1, 2, "work", Some("work")),
                ContentItem::Image {
                    x: 0,
                    y: 4,
                    width: 4,
                    height: 3,
                    value: "assets/shot.png".to_string(),
                },
            ],
        );
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"TEXT\""));
        assert!(json.contains("\"IMAGE\""));
        let back: ViewDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }
}
