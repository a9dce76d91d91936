//! Placement layer for building variants on a layered tile grid.
//!
//! [`TileMap`] owns every placed entity, keeps a per-layer occupancy index,
//! and answers the edge-connectivity query the wire resolver needs. Placing,
//! removing, rotating, or re-varianting anything re-resolves the wires on the
//! four tiles around each affected footprint tile. Changes do not ripple
//! further than that.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};
use tilewire_core::attachment::AttachmentError;
use tilewire_core::autotile::{self, ConductiveClass, EdgeConnectivity, ResolvedTileShape};
use tilewire_core::components::Entity;
use tilewire_core::geometry::{Dimensions, Direction, GridPosition, Rotation, TileOffset};
use tilewire_core::id::{BuildingTypeId, EntityId, VariantId};
use tilewire_core::registry::{Registry, RegistryError};
use tilewire_core::variant::Layer;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Errors from placement operations. A failed operation leaves the map as it
/// was.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("tile ({}, {}) on the {:?} layer is occupied", .pos.x, .pos.y, .layer)]
    Occupied { layer: Layer, pos: GridPosition },
    #[error("entity is not placed on the map")]
    UnknownEntity,
    #[error("building {0} cannot be removed")]
    NotRemovable(String),
    #[error("building {0} cannot be rotated")]
    NotRotatable(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// What to place and where. Autotiled buildings ignore `rotation`; their
/// rotation comes from their neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub building: BuildingTypeId,
    pub variant: VariantId,
    pub origin: GridPosition,
    #[serde(default)]
    pub rotation: Rotation,
}

impl PlacementRequest {
    pub fn new(building: BuildingTypeId, variant: impl Into<VariantId>, origin: GridPosition) -> Self {
        Self {
            building,
            variant: variant.into(),
            origin,
            rotation: Rotation::None,
        }
    }

    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// A building instance on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedEntity {
    pub building: BuildingTypeId,
    pub variant: VariantId,
    pub origin: GridPosition,
    pub rotation: Rotation,
    pub rotation_variant: usize,
    pub layer: Layer,
    /// Unrotated footprint of the current variant.
    pub dimensions: Dimensions,
    pub entity: Entity,
}

impl PlacedEntity {
    /// Tiles covered on the entity's layer.
    pub fn tiles(&self) -> impl Iterator<Item = GridPosition> + use<> {
        self.dimensions.tiles(self.origin, self.rotation)
    }

    /// Absolute tile of a local slot offset.
    pub fn world_tile(&self, offset: TileOffset) -> GridPosition {
        self.origin
            .offset_by(self.dimensions.rotate_offset(offset, self.rotation))
    }

    /// Whether a wired pin sits at `pos` facing `direction` once rotated.
    pub fn exposes_pin(&self, pos: GridPosition, direction: Direction) -> bool {
        let Some(pins) = &self.entity.components.wired_pins else {
            return false;
        };
        pins.slots.iter().any(|slot| {
            self.world_tile(slot.pos) == pos && slot.direction.rotated(self.rotation) == direction
        })
    }

    /// Conductive class when this entity is a wire.
    pub fn wire_class(&self) -> Option<ConductiveClass> {
        self.entity.components.wire.as_ref().map(|w| w.class)
    }
}

type PendingUpdates = Vec<(EntityId, PlacedEntity)>;

// ---------------------------------------------------------------------------
// TileMap
// ---------------------------------------------------------------------------

/// Placed entities plus an occupancy index keyed by `(layer, tile)`.
#[derive(Debug, Default)]
pub struct TileMap {
    entities: SlotMap<EntityId, PlacedEntity>,
    tiles: BTreeMap<(Layer, GridPosition), EntityId>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Placement --

    /// Place a building. Runs component setup, then the variant update with
    /// the resolved rotation variant, then re-resolves neighboring wires.
    pub fn place(
        &mut self,
        registry: &Registry,
        request: PlacementRequest,
    ) -> Result<EntityId, PlacementError> {
        let descriptor = registry.variant(request.building, &request.variant)?;
        if !descriptor.rotatable && request.rotation != Rotation::None {
            return Err(PlacementError::NotRotatable(building_name(
                registry,
                request.building,
            )));
        }

        let layer = descriptor.layer;
        let (rotation, rotation_variant) = match descriptor.components.wire {
            Some(class) if registry.is_autotiled(request.building)? => {
                let resolved = autotile::resolve_at(&*self, request.origin, class);
                (resolved.rotation(), resolved.rotation_variant())
            }
            _ => (request.rotation, 0),
        };
        let footprint: Vec<GridPosition> = descriptor
            .dimensions
            .tiles(request.origin, rotation)
            .collect();
        self.check_free(layer, &footprint, None)?;

        let mut entity = Entity::new();
        registry.setup_entity_components(request.building, &mut entity)?;
        registry.update_variants(request.building, &mut entity, rotation_variant, &request.variant)?;

        let placed = PlacedEntity {
            building: request.building,
            variant: request.variant,
            origin: request.origin,
            rotation,
            rotation_variant,
            layer,
            dimensions: descriptor.dimensions,
            entity,
        };
        let id = self.entities.insert(placed);
        self.index(id);

        match self.plan_cascade(registry, &footprint, id) {
            Ok(updates) => self.commit(updates),
            Err(e) => {
                self.unindex(id);
                self.entities.remove(id);
                return Err(e);
            }
        }

        tracing::debug!(
            building = request.building.0,
            x = request.origin.x,
            y = request.origin.y,
            "placed entity"
        );
        Ok(id)
    }

    /// Remove an entity and re-resolve the wires around it.
    pub fn remove(
        &mut self,
        registry: &Registry,
        id: EntityId,
    ) -> Result<PlacedEntity, PlacementError> {
        let placed = self.entities.get(id).ok_or(PlacementError::UnknownEntity)?;
        if !registry.is_removable(placed.building, &placed.variant)? {
            return Err(PlacementError::NotRemovable(building_name(
                registry,
                placed.building,
            )));
        }
        let footprint: Vec<GridPosition> = placed.tiles().collect();

        // Hide from the index first so neighbors no longer see it.
        self.unindex(id);
        match self.plan_cascade(registry, &footprint, id) {
            Ok(updates) => self.commit(updates),
            Err(e) => {
                self.index(id);
                return Err(e);
            }
        }

        let removed = self.entities.remove(id).ok_or(PlacementError::UnknownEntity)?;
        tracing::debug!(building = removed.building.0, "removed entity");
        Ok(removed)
    }

    /// Turn a placed entity. Autotiled entities keep their resolved rotation.
    pub fn rotate(
        &mut self,
        registry: &Registry,
        id: EntityId,
        rotation: Rotation,
    ) -> Result<(), PlacementError> {
        let current = self.entities.get(id).ok_or(PlacementError::UnknownEntity)?;
        if !registry.is_rotatable(current.building, &current.variant)? {
            return Err(PlacementError::NotRotatable(building_name(
                registry,
                current.building,
            )));
        }
        if registry.is_autotiled(current.building)? {
            return Ok(());
        }

        let mut next = current.clone();
        next.rotation = rotation;
        self.replace_and_cascade(registry, id, next)
    }

    /// Switch a placed entity to another variant of its building.
    pub fn set_variant(
        &mut self,
        registry: &Registry,
        id: EntityId,
        variant: &VariantId,
    ) -> Result<(), PlacementError> {
        let current = self.entities.get(id).ok_or(PlacementError::UnknownEntity)?;
        let descriptor = registry.variant(current.building, variant)?;

        let mut next = current.clone();
        next.variant = variant.clone();
        next.layer = descriptor.layer;
        next.dimensions = descriptor.dimensions;
        if let Some(class) = descriptor.components.wire
            && registry.is_autotiled(current.building)?
        {
            let resolved = autotile::resolve_at(&*self, current.origin, class);
            next.rotation = resolved.rotation();
            next.rotation_variant = resolved.rotation_variant();
        }
        descriptor
            .components
            .apply(&mut next.entity, next.rotation_variant)?;
        self.replace_and_cascade(registry, id, next)
    }

    // -- Queries --

    pub fn get(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.entities.get(id)
    }

    /// Entity covering `pos` on `layer`.
    pub fn entity_at(&self, layer: Layer, pos: GridPosition) -> Option<EntityId> {
        self.tiles.get(&(layer, pos)).copied()
    }

    pub fn placed_at(&self, layer: Layer, pos: GridPosition) -> Option<&PlacedEntity> {
        self.entity_at(layer, pos).and_then(|id| self.entities.get(id))
    }

    pub fn is_occupied(&self, layer: Layer, pos: GridPosition) -> bool {
        self.tiles.contains_key(&(layer, pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &PlacedEntity)> {
        self.entities.iter()
    }

    /// Number of placed entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Total occupied tiles across all layers.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    // -- Internals --

    fn check_free(
        &self,
        layer: Layer,
        footprint: &[GridPosition],
        ignore: Option<EntityId>,
    ) -> Result<(), PlacementError> {
        for pos in footprint {
            if let Some(occupant) = self.entity_at(layer, *pos)
                && Some(occupant) != ignore
            {
                return Err(PlacementError::Occupied { layer, pos: *pos });
            }
        }
        Ok(())
    }

    fn index(&mut self, id: EntityId) {
        if let Some(placed) = self.entities.get(id) {
            let layer = placed.layer;
            for pos in placed.tiles() {
                self.tiles.insert((layer, pos), id);
            }
        }
    }

    fn unindex(&mut self, id: EntityId) {
        if let Some(placed) = self.entities.get(id) {
            let layer = placed.layer;
            for pos in placed.tiles() {
                if self.tiles.get(&(layer, pos)) == Some(&id) {
                    self.tiles.remove(&(layer, pos));
                }
            }
        }
    }

    /// Swap in a new state for `id`, re-resolve around both footprints, and
    /// restore the old state on failure.
    fn replace_and_cascade(
        &mut self,
        registry: &Registry,
        id: EntityId,
        next: PlacedEntity,
    ) -> Result<(), PlacementError> {
        let next_footprint: Vec<GridPosition> = next.tiles().collect();
        self.check_free(next.layer, &next_footprint, Some(id))?;

        self.unindex(id);
        let Some(slot) = self.entities.get_mut(id) else {
            return Err(PlacementError::UnknownEntity);
        };
        let previous = std::mem::replace(slot, next);
        self.index(id);

        let mut around: Vec<GridPosition> = previous.tiles().collect();
        around.extend(next_footprint);
        match self.plan_cascade(registry, &around, id) {
            Ok(updates) => {
                self.commit(updates);
                Ok(())
            }
            Err(e) => {
                self.unindex(id);
                if let Some(slot) = self.entities.get_mut(id) {
                    *slot = previous;
                }
                self.index(id);
                Err(e)
            }
        }
    }

    /// Re-resolve every wire adjacent to `footprint`, except `changed`.
    /// Works on clones; nothing is written until [`Self::commit`].
    fn plan_cascade(
        &self,
        registry: &Registry,
        footprint: &[GridPosition],
        changed: EntityId,
    ) -> Result<PendingUpdates, PlacementError> {
        let mut seen = BTreeSet::new();
        let mut updates = Vec::new();

        for pos in footprint {
            for direction in Direction::all() {
                let Some(neighbor) = self.entity_at(Layer::Wires, pos.neighbor(direction)) else {
                    continue;
                };
                if neighbor == changed || !seen.insert(neighbor) {
                    continue;
                }
                let Some(placed) = self.entities.get(neighbor) else {
                    continue;
                };
                let Some(class) = placed.wire_class() else {
                    continue;
                };
                if !registry.is_autotiled(placed.building)? {
                    continue;
                }

                let resolved = autotile::resolve_at(self, placed.origin, class);
                if is_current(placed, resolved) {
                    continue;
                }

                let mut next = placed.clone();
                next.rotation = resolved.rotation();
                next.rotation_variant = resolved.rotation_variant();
                registry
                    .variant(next.building, &next.variant)?
                    .components
                    .apply(&mut next.entity, next.rotation_variant)?;
                tracing::trace!(
                    x = placed.origin.x,
                    y = placed.origin.y,
                    shape = ?resolved.shape,
                    rotation = resolved.rotation_degrees,
                    "re-resolved neighbor wire"
                );
                updates.push((neighbor, next));
            }
        }
        Ok(updates)
    }

    fn commit(&mut self, updates: PendingUpdates) {
        for (id, next) in updates {
            if let Some(slot) = self.entities.get_mut(id) {
                *slot = next;
            }
        }
    }
}

fn is_current(placed: &PlacedEntity, resolved: ResolvedTileShape) -> bool {
    placed.rotation == resolved.rotation() && placed.rotation_variant == resolved.rotation_variant()
}

fn building_name(registry: &Registry, building: BuildingTypeId) -> String {
    registry
        .get_building(building)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| format!("#{}", building.0))
}

/// A wire edge connects when the tile across it holds a wire of the same
/// class, or any entity there has a wired pin facing back across the edge.
impl EdgeConnectivity for TileMap {
    fn compute_edge_connectivity(
        &self,
        tile: GridPosition,
        class: ConductiveClass,
        edge: Direction,
    ) -> bool {
        let across = tile.neighbor(edge);
        if self
            .placed_at(Layer::Wires, across)
            .and_then(PlacedEntity::wire_class)
            == Some(class)
        {
            return true;
        }
        [Layer::Regular, Layer::Wires]
            .into_iter()
            .filter_map(|layer| self.placed_at(layer, across))
            .any(|placed| placed.exposes_pin(across, edge.opposite()))
    }
}
