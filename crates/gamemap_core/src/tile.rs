//! Tile definitions, shared tile metadata and preview descriptors

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a tile definition. This is the value stored in grid cells.
pub type TileId = u32;

/// Identifier of an auto-tile group
pub type GroupId = u32;

/// Simple RGBA color used for tile previews (no renderer dependency)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// What a placed tile means to the runtime. The core never interprets this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileKind {
    Start,
    End,
    Key,
    Coin,
    Block,
    #[default]
    Floor,
    Platform,
    Npc,
    Trap,
    Text,
}

impl TileKind {
    /// Get the display name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            TileKind::Start => "Start",
            TileKind::End => "End",
            TileKind::Key => "Key",
            TileKind::Coin => "Coin",
            TileKind::Block => "Block",
            TileKind::Floor => "Floor",
            TileKind::Platform => "Platform",
            TileKind::Npc => "NPC",
            TileKind::Trap => "Trap",
            TileKind::Text => "Text",
        }
    }
}

/// Metadata shared by all variants of an auto-tile group.
///
/// Variant 0 of a group owns these values; every other variant holds a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TileProperties {
    /// What the runtime should instantiate for this tile
    #[serde(default)]
    pub kind: TileKind,
    /// Kind-dependent option, e.g. which NPC prefab to spawn
    #[serde(default)]
    pub option: i32,
    /// Preview color
    #[serde(default)]
    pub color: Color,
    /// Preview text (ignored when empty)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// Custom user-defined properties
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom: HashMap<String, serde_json::Value>,
}

impl TileProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: TileKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_option(mut self, option: i32) -> Self {
        self.option = option;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set a custom property
    pub fn with_custom(mut self, key: String, value: serde_json::Value) -> Self {
        self.custom.insert(key, value);
        self
    }

    /// Get a custom property
    pub fn get_custom(&self, key: &str) -> Option<&serde_json::Value> {
        self.custom.get(key)
    }
}

/// A tile definition. Grid cells store the `id` of one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: TileId,
    /// Auto-tile group this tile is a variant of (None for plain tiles)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    /// Visual asset reference. Each auto-tile variant keeps its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(default)]
    pub properties: TileProperties,
}

impl TileDefinition {
    /// Create a plain tile
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            group: None,
            sprite: None,
            properties: TileProperties::default(),
        }
    }

    /// Create a tile tagged as a variant of `group`
    pub fn new_variant(id: TileId, group: GroupId) -> Self {
        Self {
            group: Some(group),
            ..Self::new(id)
        }
    }

    /// Check if this tile is part of an auto-tile group
    pub fn is_auto_tile(&self) -> bool {
        self.group.is_some()
    }

    /// Check if this tile belongs to `group`
    pub fn belongs_to(&self, group: GroupId) -> bool {
        self.group == Some(group)
    }

    /// Preview using the default descriptor
    pub fn preview(&self) -> TilePreview<'_> {
        DefaultPreview.preview(self)
    }
}

/// How a tile should be shown in a palette or canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TilePreview<'a> {
    Sprite(&'a str),
    Color(Color),
    Text(&'a str),
    Empty,
}

/// Maps a tile definition to the visual a host should draw for it
pub trait PreviewDescriptor {
    fn preview<'a>(&self, tile: &'a TileDefinition) -> TilePreview<'a>;
}

/// Sprite first, then a non-empty label, then the color
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPreview;

impl PreviewDescriptor for DefaultPreview {
    fn preview<'a>(&self, tile: &'a TileDefinition) -> TilePreview<'a> {
        if let Some(sprite) = tile.sprite.as_deref() {
            TilePreview::Sprite(sprite)
        } else if !tile.properties.label.is_empty() {
            TilePreview::Text(&tile.properties.label)
        } else {
            TilePreview::Color(tile.properties.color)
        }
    }
}

impl<F> PreviewDescriptor for F
where
    F: for<'a> Fn(&'a TileDefinition) -> TilePreview<'a>,
{
    fn preview<'a>(&self, tile: &'a TileDefinition) -> TilePreview<'a> {
        self(tile)
    }
}
