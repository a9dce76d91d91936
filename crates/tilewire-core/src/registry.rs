use crate::attachment::{AttachmentError, verify_setup_matches_update};
use crate::components::Entity;
use crate::geometry::{Dimensions, Rotation, TileOffset};
use crate::id::{BuildingTypeId, VariantId};
use crate::matrix::OverlayMatrix;
use crate::progression::Progression;
use crate::variant::{Color, Layer, VariantDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Building families. Wires are the only autotiled kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Wire,
    Transistor,
    Lever,
    Stacker,
    Hub,
}

impl BuildingKind {
    /// Shape and rotation come from neighbor connectivity, not the player.
    pub fn is_autotiled(self) -> bool {
        matches!(self, BuildingKind::Wire)
    }
}

/// A building type and its variants, in build-menu order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingDef {
    pub name: String,
    pub kind: BuildingKind,
    /// Whether the pipette tool may copy this building.
    pub can_pipette: bool,
    pub variants: Vec<VariantDescriptor>,
}

impl BuildingDef {
    pub fn new(name: &str, kind: BuildingKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            can_pipette: true,
            variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant: VariantDescriptor) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn variant(&self, id: &VariantId) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|v| &v.id == id)
    }

    pub fn default_variant(&self) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|v| v.id.is_default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown building id {0:?}")]
    UnknownBuilding(BuildingTypeId),
    #[error("building '{building}' has no variant '{variant}'")]
    UnknownVariant { building: String, variant: VariantId },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("building '{0}' registered twice")]
    DuplicateBuilding(String),
    #[error("building '{building}' declares variant '{variant}' twice")]
    DuplicateVariant { building: String, variant: VariantId },
    #[error("building '{0}' has no variants")]
    NoVariants(String),
    #[error("building '{0}' has no default variant")]
    MissingDefaultVariant(String),
    #[error("variant '{building}/{variant}' has invalid dimensions {width}x{height}")]
    InvalidDimensions {
        building: String,
        variant: VariantId,
        width: u32,
        height: u32,
    },
    #[error("variant '{building}/{variant}' has a slot outside its footprint at {pos:?}")]
    SlotOutOfBounds {
        building: String,
        variant: VariantId,
        pos: TileOffset,
    },
    #[error("variant '{building}/{variant}' declares different components than the default variant")]
    ComponentLayoutMismatch { building: String, variant: VariantId },
    #[error("building '{building}' setup and update paths diverge")]
    ConfigurationMismatch {
        building: String,
        #[source]
        source: AttachmentError,
    },
    #[error("rotation {0} is not a multiple of 90 degrees")]
    InvalidRotation(i32),
    #[error("rotation variant {0} does not name a wire shape")]
    InvalidRotationVariant(usize),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// Builder for an immutable [`Registry`]. Buildings are registered at
/// process start, optionally mutated, then validated by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    buildings: Vec<BuildingDef>,
    name_to_id: HashMap<String, BuildingTypeId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a building type. Returns its ID.
    pub fn register_building(&mut self, def: BuildingDef) -> Result<BuildingTypeId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateBuilding(def.name));
        }
        let id = BuildingTypeId(self.buildings.len() as u32);
        tracing::debug!(building = %def.name, variants = def.variants.len(), "registered building");
        self.name_to_id.insert(def.name.clone(), id);
        self.buildings.push(def);
        Ok(id)
    }

    /// Mutate a registered building by name.
    pub fn mutate_building<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut BuildingDef),
    {
        let id = self
            .name_to_id
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        f(&mut self.buildings[id.0 as usize]);
        Ok(())
    }

    pub fn building_id(&self, name: &str) -> Option<BuildingTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Validate every building and freeze the registry. Content errors are
    /// reported here rather than at lookup time.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for def in &self.buildings {
            if let Err(err) = validate_building(def) {
                tracing::warn!(building = %def.name, error = %err, "rejected building definition");
                return Err(err);
            }
        }
        tracing::info!(buildings = self.buildings.len(), "building registry finalized");
        Ok(Registry {
            buildings: self.buildings,
            name_to_id: self.name_to_id,
        })
    }
}

fn validate_building(def: &BuildingDef) -> Result<(), RegistryError> {
    let Some(default) = def.default_variant() else {
        return Err(if def.variants.is_empty() {
            RegistryError::NoVariants(def.name.clone())
        } else {
            RegistryError::MissingDefaultVariant(def.name.clone())
        });
    };

    let mut seen = HashSet::new();
    let default_layout = default.components.declared();
    for variant in &def.variants {
        if !seen.insert(&variant.id) {
            return Err(RegistryError::DuplicateVariant {
                building: def.name.clone(),
                variant: variant.id.clone(),
            });
        }
        if !variant.dimensions.is_valid() {
            return Err(RegistryError::InvalidDimensions {
                building: def.name.clone(),
                variant: variant.id.clone(),
                width: variant.dimensions.width,
                height: variant.dimensions.height,
            });
        }
        if let Some(pos) = variant.components.slot_outside(variant.dimensions) {
            return Err(RegistryError::SlotOutOfBounds {
                building: def.name.clone(),
                variant: variant.id.clone(),
                pos,
            });
        }
        // Components are created once for the default variant; every other
        // variant must find the same set when it is applied.
        if variant.components.declared() != default_layout {
            return Err(RegistryError::ComponentLayoutMismatch {
                building: def.name.clone(),
                variant: variant.id.clone(),
            });
        }
    }

    verify_setup_matches_update(&default.components, 0).map_err(|source| {
        RegistryError::ConfigurationMismatch {
            building: def.name.clone(),
            source,
        }
    })
}

/// Immutable building registry. Frozen after build; share by reference.
#[derive(Debug)]
pub struct Registry {
    buildings: Vec<BuildingDef>,
    name_to_id: HashMap<String, BuildingTypeId>,
}

impl Registry {
    pub fn get_building(&self, id: BuildingTypeId) -> Option<&BuildingDef> {
        self.buildings.get(id.0 as usize)
    }

    pub fn building_id(&self, name: &str) -> Option<BuildingTypeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn buildings(&self) -> impl Iterator<Item = (BuildingTypeId, &BuildingDef)> {
        self.buildings
            .iter()
            .enumerate()
            .map(|(i, def)| (BuildingTypeId(i as u32), def))
    }

    fn building(&self, id: BuildingTypeId) -> Result<&BuildingDef, RegistryError> {
        self.get_building(id).ok_or(RegistryError::UnknownBuilding(id))
    }

    /// Descriptor for one variant. Unknown ids are errors, never defaulted.
    pub fn variant(
        &self,
        building: BuildingTypeId,
        variant: &VariantId,
    ) -> Result<&VariantDescriptor, RegistryError> {
        let def = self.building(building)?;
        def.variant(variant)
            .ok_or_else(|| RegistryError::UnknownVariant {
                building: def.name.clone(),
                variant: variant.clone(),
            })
    }

    pub fn is_autotiled(&self, building: BuildingTypeId) -> Result<bool, RegistryError> {
        Ok(self.building(building)?.kind.is_autotiled())
    }

    // -- Per-variant lookups --

    pub fn dimensions(
        &self,
        building: BuildingTypeId,
        variant: &VariantId,
    ) -> Result<Dimensions, RegistryError> {
        Ok(self.variant(building, variant)?.dimensions)
    }

    pub fn silhouette_color(
        &self,
        building: BuildingTypeId,
        variant: &VariantId,
    ) -> Result<Color, RegistryError> {
        Ok(self.variant(building, variant)?.silhouette_color)
    }

    pub fn is_rotatable(
        &self,
        building: BuildingTypeId,
        variant: &VariantId,
    ) -> Result<bool, RegistryError> {
        Ok(self.variant(building, variant)?.rotatable)
    }

    pub fn is_removable(
        &self,
        building: BuildingTypeId,
        variant: &VariantId,
    ) -> Result<bool, RegistryError> {
        Ok(self.variant(building, variant)?.removable)
    }

    /// Layer the variant occupies. Takes the progression snapshot like the
    /// other build-menu queries; no built-in variant changes layer with it.
    pub fn layer(
        &self,
        building: BuildingTypeId,
        variant: &VariantId,
        _progression: &dyn Progression,
    ) -> Result<Layer, RegistryError> {
        Ok(self.variant(building, variant)?.layer)
    }

    /// Layer to ghost-preview while placing, if any.
    pub fn show_layer_preview(
        &self,
        building: BuildingTypeId,
        variant: &VariantId,
    ) -> Result<Option<Layer>, RegistryError> {
        Ok(self.variant(building, variant)?.layer_preview)
    }

    pub fn render_pins(
        &self,
        building: BuildingTypeId,
        variant: &VariantId,
    ) -> Result<bool, RegistryError> {
        Ok(self.variant(building, variant)?.render_pins)
    }

    /// Variants selectable under `progression`, in declaration order.
    pub fn available_variants(
        &self,
        building: BuildingTypeId,
        progression: &dyn Progression,
    ) -> Result<Vec<&VariantId>, RegistryError> {
        Ok(self
            .building(building)?
            .variants
            .iter()
            .filter(|v| v.availability.evaluate(progression))
            .map(|v| &v.id)
            .collect())
    }

    /// Overlay highlight for a variant at the given angle. `None` only when
    /// the variant has no overlay.
    pub fn overlay_render_matrix(
        &self,
        building: BuildingTypeId,
        rotation_degrees: i32,
        rotation_variant: usize,
        variant: &VariantId,
        entity: Option<&Entity>,
    ) -> Result<Option<OverlayMatrix>, RegistryError> {
        let descriptor = self.variant(building, variant)?;
        let rotation = Rotation::from_degrees(rotation_degrees)
            .ok_or(RegistryError::InvalidRotation(rotation_degrees))?;
        Ok(descriptor
            .overlay
            .evaluate(entity, rotation_variant)?
            .map(|table| *table.get(rotation)))
    }

    // -- Component attachment --

    /// Attach the default variant's components to a freshly created entity.
    pub fn setup_entity_components(
        &self,
        building: BuildingTypeId,
        entity: &mut Entity,
    ) -> Result<(), RegistryError> {
        let def = self.building(building)?;
        let default = def
            .default_variant()
            .ok_or_else(|| RegistryError::MissingDefaultVariant(def.name.clone()))?;
        default.components.attach(entity, 0)?;
        Ok(())
    }

    /// Reconfigure an entity's components for `variant` and `rotation_variant`.
    pub fn update_variants(
        &self,
        building: BuildingTypeId,
        entity: &mut Entity,
        rotation_variant: usize,
        variant: &VariantId,
    ) -> Result<(), RegistryError> {
        self.variant(building, variant)?
            .components
            .apply(entity, rotation_variant)?;
        Ok(())
    }
}
