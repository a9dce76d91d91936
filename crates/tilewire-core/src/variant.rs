//! Per-variant building descriptors.

use crate::attachment::ComponentConfig;
use crate::autotile::TileShape;
use crate::components::Entity;
use crate::geometry::Dimensions;
use crate::id::VariantId;
use crate::matrix::OverlayRotations;
use crate::progression::Availability;
use crate::registry::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation layer an entity occupies. Collision and adjacency are
/// evaluated per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    #[default]
    Regular,
    Wires,
}

/// 24-bit RGB silhouette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Source of the placement-preview overlay for a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayProvider {
    /// No overlay.
    None,
    /// One pattern regardless of entity state.
    Static(OverlayRotations),
    /// One pattern per wire shape, indexed like [`TileShape::ROTATION_VARIANTS`].
    PerShape([OverlayRotations; 4]),
}

impl OverlayProvider {
    /// Pick the rotation table for an entity snapshot. Per-shape overlays
    /// follow the entity's wire shape when it has one, otherwise the
    /// requested rotation variant, which must then name a shape.
    pub fn evaluate(
        &self,
        entity: Option<&Entity>,
        rotation_variant: usize,
    ) -> Result<Option<&OverlayRotations>, RegistryError> {
        match self {
            OverlayProvider::None => Ok(None),
            OverlayProvider::Static(rotations) => Ok(Some(rotations)),
            OverlayProvider::PerShape(by_shape) => {
                let shape = match entity.and_then(|e| e.components.wire.as_ref()) {
                    Some(wire) => wire.shape,
                    None => TileShape::from_rotation_variant(rotation_variant)
                        .ok_or(RegistryError::InvalidRotationVariant(rotation_variant))?,
                };
                Ok(Some(&by_shape[shape.rotation_variant()]))
            }
        }
    }
}

/// Everything the placement layer needs to know about one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub id: VariantId,
    pub dimensions: Dimensions,
    pub silhouette_color: Color,
    pub rotatable: bool,
    pub removable: bool,
    pub layer: Layer,
    pub layer_preview: Option<Layer>,
    pub availability: Availability,
    pub overlay: OverlayProvider,
    pub render_pins: bool,
    pub components: ComponentConfig,
}

impl VariantDescriptor {
    /// A 1x1, rotatable, removable, always available regular-layer variant
    /// with no components. Callers fill in the rest.
    pub fn new(id: impl Into<VariantId>, silhouette_color: Color) -> Self {
        Self {
            id: id.into(),
            dimensions: Dimensions::single(),
            silhouette_color,
            rotatable: true,
            removable: true,
            layer: Layer::Regular,
            layer_preview: None,
            availability: Availability::Always,
            overlay: OverlayProvider::None,
            render_pins: false,
            components: ComponentConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Wire;
    use crate::geometry::Rotation;
    use crate::matrix::{OverlayMatrix, generate_matrix_rotations};

    fn rotations(rows: [[u8; 3]; 3]) -> OverlayRotations {
        generate_matrix_rotations(OverlayMatrix::from_rows(rows))
    }

    #[test]
    fn color_hex_round_trip() {
        let c = Color::from_hex("#823cab").unwrap();
        assert_eq!(c, Color(0x823cab));
        assert_eq!(c.to_string(), "#823cab");
        assert_eq!(Color(0x0000ff).to_string(), "#0000ff");
    }

    #[test]
    fn color_rejects_malformed() {
        assert_eq!(Color::from_hex("823cab"), None);
        assert_eq!(Color::from_hex("#823ca"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::from_hex("#+12345"), None);
    }

    #[test]
    fn static_overlay_ignores_entity() {
        let table = rotations([[0, 1, 0], [1, 1, 0], [0, 1, 0]]);
        let provider = OverlayProvider::Static(table);
        assert_eq!(provider.evaluate(None, 3).unwrap(), Some(&table));
        assert_eq!(OverlayProvider::None.evaluate(None, 0).unwrap(), None);
        assert_eq!(OverlayProvider::None.evaluate(None, 9).unwrap(), None);
    }

    #[test]
    fn per_shape_overlay_prefers_entity_shape() {
        let straight = rotations([[0, 1, 0], [0, 1, 0], [0, 1, 0]]);
        let corner = rotations([[0, 0, 0], [0, 1, 1], [0, 1, 0]]);
        let tee = rotations([[0, 0, 0], [1, 1, 1], [0, 1, 0]]);
        let cross = rotations([[0, 1, 0], [1, 1, 1], [0, 1, 0]]);
        let provider = OverlayProvider::PerShape([straight, corner, tee, cross]);

        assert_eq!(provider.evaluate(None, 1).unwrap(), Some(&corner));
        assert!(matches!(
            provider.evaluate(None, 9),
            Err(RegistryError::InvalidRotationVariant(9))
        ));

        let mut entity = Entity::new();
        entity.components.wire = Some(Wire {
            shape: TileShape::Cross,
            ..Default::default()
        });
        let picked = provider.evaluate(Some(&entity), 0).unwrap().unwrap();
        assert_eq!(picked, &cross);
        assert_eq!(picked.get(Rotation::Cw90), cross.get(Rotation::Cw90));
        // The entity's shape wins, so the index is not consulted.
        assert!(provider.evaluate(Some(&entity), 9).is_ok());
    }
}
