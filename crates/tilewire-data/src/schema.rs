//! Serde data file structs for building definitions.
//!
//! These structs define the on-disk format. They are deserialized from RON,
//! JSON, or TOML data files and then resolved into registry types by the
//! loader.

use serde::Deserialize;
use tilewire_core::attachment::ComponentConfig;
use tilewire_core::progression::Availability;
use tilewire_core::registry::BuildingKind;
use tilewire_core::variant::Layer;

fn default_true() -> bool {
    true
}

// ===========================================================================
// Buildings
// ===========================================================================

/// A building type and its variants, in build-menu order.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingData {
    pub name: String,
    pub kind: BuildingKind,
    #[serde(default = "default_true")]
    pub can_pipette: bool,
    pub variants: Vec<VariantData>,
}

/// One variant of a building.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantData {
    #[serde(default = "default_variant_id")]
    pub id: String,
    /// Silhouette color as `#rrggbb`.
    pub color: String,
    #[serde(default)]
    pub dimensions: DimensionsData,
    #[serde(default = "default_true")]
    pub rotatable: bool,
    #[serde(default = "default_true")]
    pub removable: bool,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub layer_preview: Option<Layer>,
    #[serde(default)]
    pub unlock: UnlockData,
    #[serde(default)]
    pub overlay: OverlayData,
    #[serde(default)]
    pub render_pins: bool,
    #[serde(default)]
    pub components: ComponentsData,
}

fn default_variant_id() -> String {
    "default".to_string()
}

/// Unrotated footprint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DimensionsData {
    pub width: u32,
    pub height: u32,
}

impl Default for DimensionsData {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }
}

/// When a variant shows up in the build menu.
pub type UnlockData = Availability;

/// Preview overlay as flat row-major 3x3 cell lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayData {
    #[default]
    None,
    Static(Vec<u8>),
    PerShape {
        straight: Vec<u8>,
        corner: Vec<u8>,
        tee: Vec<u8>,
        cross: Vec<u8>,
    },
}

/// Component declarations use the registry's own configuration format.
pub type ComponentsData = ComponentConfig;

// ===========================================================================
// TOML wrapper (TOML does not support top-level arrays)
// ===========================================================================

/// Wrapper for a list of buildings in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlBuildings {
    pub buildings: Vec<BuildingData>,
}

// ===========================================================================
// Tests
// ===========================================================================
