//! Tilewire Core -- building variants and wire autotiling for grid factory games.
//!
//! Every placeable building is described as data: footprint, rotation rules,
//! unlock gating, preview overlays, and the components it attaches to a
//! placed entity. Wires additionally pick their tile shape from which of
//! their four neighbors they connect to.
//!
//! # Placement Flow
//!
//! 1. The build menu asks [`registry::Registry::available_variants`] what the
//!    player may pick under the current [`progression::Progression`].
//! 2. Placement reads footprint, layer and rotatability from the registry.
//! 3. For wires, [`autotile::resolve_at`] turns the neighbor query into a
//!    shape and rotation.
//! 4. [`registry::Registry::setup_entity_components`] attaches components,
//!    then [`registry::Registry::update_variants`] applies the chosen
//!    variant and rotation variant. Later variant or neighbor changes only
//!    call `update_variants`.
//!
//! ```rust,ignore
//! let registry = catalog::standard_registry()?;
//! let wire = registry.building_id(catalog::WIRE).unwrap();
//! let resolved = autotile::resolve_at(&grid, tile, ConductiveClass::First);
//! let mut entity = Entity::new();
//! registry.setup_entity_components(wire, &mut entity)?;
//! registry.update_variants(wire, &mut entity, resolved.rotation_variant(), &variant)?;
//! ```
//!
//! # Key Types
//!
//! - [`registry::Registry`] -- Immutable registry of building types (frozen
//!   at startup, validated on build).
//! - [`variant::VariantDescriptor`] -- Geometry, gating, overlay and
//!   component configuration of one variant.
//! - [`attachment::ComponentConfig`] -- The single declarative component
//!   configuration used for both creation and update.
//! - [`autotile::compute_optimal_shape_and_rotation`] -- Sixteen-case
//!   connectivity table.
//! - [`matrix::OverlayRotations`] -- Precomputed overlay rotations.

pub mod attachment;
pub mod autotile;
pub mod catalog;
pub mod components;
pub mod geometry;
pub mod id;
pub mod matrix;
pub mod progression;
pub mod registry;
pub mod variant;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
