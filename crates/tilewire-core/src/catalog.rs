//! Built-in building definitions.
//!
//! Games that load content from data files use `tilewire-data` instead; the
//! bundled data file there describes the same buildings.

use crate::attachment::{ComponentConfig, ProcessorConfig};
use crate::autotile::ConductiveClass;
use crate::components::{
    AcceptorSlot, EjectorSlot, ItemKind, LogicGateKind, PinSlot, PinSlotKind, ProcessorKind,
};
use crate::geometry::{Dimensions, Direction, TileOffset};
use crate::matrix::{OverlayMatrix, generate_matrix_rotations};
use crate::progression::{Availability, Reward};
use crate::registry::{BuildingDef, BuildingKind, Registry, RegistryBuilder, RegistryError};
use crate::variant::{Color, Layer, OverlayProvider, VariantDescriptor};

pub const WIRE: &str = "wire";
pub const TRANSISTOR: &str = "transistor";
pub const LEVER: &str = "lever";
pub const STACKER: &str = "stacker";
pub const HUB: &str = "hub";

/// Variant id of the second wire class.
pub const WIRE_SECOND: &str = "second";
/// Variant id of the transistor with its side input on the right.
pub const TRANSISTOR_MIRRORED: &str = "mirrored";

const WIRE_STRAIGHT: OverlayMatrix = OverlayMatrix::from_rows([[0, 1, 0], [0, 1, 0], [0, 1, 0]]);
const WIRE_CORNER: OverlayMatrix = OverlayMatrix::from_rows([[0, 0, 0], [0, 1, 1], [0, 1, 0]]);
const WIRE_TEE: OverlayMatrix = OverlayMatrix::from_rows([[0, 0, 0], [1, 1, 1], [0, 1, 0]]);
const WIRE_CROSS: OverlayMatrix = OverlayMatrix::from_rows([[0, 1, 0], [1, 1, 1], [0, 1, 0]]);

const TRANSISTOR_LEFT: OverlayMatrix = OverlayMatrix::from_rows([[0, 1, 0], [1, 1, 0], [0, 1, 0]]);
const TRANSISTOR_RIGHT: OverlayMatrix = OverlayMatrix::from_rows([[0, 1, 0], [0, 1, 1], [0, 1, 0]]);

fn wire_variant(id: &str, class: ConductiveClass) -> VariantDescriptor {
    let mut v = VariantDescriptor::new(id, Color(0x61ef6f));
    v.layer = Layer::Wires;
    v.availability = Availability::Reward(Reward::WiresPaintersAndLevers);
    v.overlay = OverlayProvider::PerShape([
        generate_matrix_rotations(WIRE_STRAIGHT),
        generate_matrix_rotations(WIRE_CORNER),
        generate_matrix_rotations(WIRE_TEE),
        generate_matrix_rotations(WIRE_CROSS),
    ]);
    v.components = ComponentConfig {
        wire: Some(class),
        ..Default::default()
    };
    v
}

pub fn wire() -> BuildingDef {
    BuildingDef::new(WIRE, BuildingKind::Wire)
        .with_variant(wire_variant("default", ConductiveClass::First))
        .with_variant(wire_variant(WIRE_SECOND, ConductiveClass::Second))
}

fn transistor_variant(id: &str, side_input: Direction, overlay: OverlayMatrix) -> VariantDescriptor {
    let mut v = VariantDescriptor::new(id, Color(0x823cab));
    v.layer = Layer::Wires;
    v.layer_preview = Some(Layer::Wires);
    v.availability = Availability::Reward(Reward::LogicGates);
    v.overlay = OverlayProvider::Static(generate_matrix_rotations(overlay));
    v.components = ComponentConfig {
        wired_pins: Some(vec![
            PinSlot::new(TileOffset::ORIGIN, Direction::Top, PinSlotKind::LogicalEjector),
            PinSlot::new(TileOffset::ORIGIN, side_input, PinSlotKind::LogicalAcceptor),
            PinSlot::new(TileOffset::ORIGIN, Direction::Bottom, PinSlotKind::LogicalAcceptor),
        ]),
        logic_gate: Some(LogicGateKind::Transistor),
        ..Default::default()
    };
    v
}

pub fn transistor() -> BuildingDef {
    BuildingDef::new(TRANSISTOR, BuildingKind::Transistor)
        .with_variant(transistor_variant("default", Direction::Left, TRANSISTOR_LEFT))
        .with_variant(transistor_variant(
            TRANSISTOR_MIRRORED,
            Direction::Right,
            TRANSISTOR_RIGHT,
        ))
}

pub fn lever() -> BuildingDef {
    let mut v = VariantDescriptor::new("default", Color(0x1a678b));
    v.layer_preview = Some(Layer::Wires);
    v.availability = Availability::Reward(Reward::WiresPaintersAndLevers);
    v.render_pins = true;
    v.components = ComponentConfig {
        wired_pins: Some(vec![PinSlot::new(
            TileOffset::ORIGIN,
            Direction::Top,
            PinSlotKind::LogicalEjector,
        )]),
        lever: true,
        ..Default::default()
    };
    BuildingDef::new(LEVER, BuildingKind::Lever).with_variant(v)
}

pub fn stacker() -> BuildingDef {
    let mut v = VariantDescriptor::new("default", Color(0x9fcd7d));
    v.dimensions = Dimensions::new(2, 1);
    v.availability = Availability::Reward(Reward::Stacker);
    v.components = ComponentConfig {
        item_processor: Some(ProcessorConfig {
            kind: ProcessorKind::Stacker,
            inputs_per_charge: 2,
        }),
        item_ejector: Some(vec![EjectorSlot::new(TileOffset::ORIGIN, Direction::Top)]),
        item_acceptor: Some(vec![
            AcceptorSlot::new(TileOffset::new(0, 0), vec![Direction::Bottom], Some(ItemKind::Shape)),
            AcceptorSlot::new(TileOffset::new(1, 0), vec![Direction::Bottom], Some(ItemKind::Shape)),
        ]),
        ..Default::default()
    };
    BuildingDef::new(STACKER, BuildingKind::Stacker).with_variant(v)
}

fn hub_acceptors() -> Vec<AcceptorSlot> {
    use Direction::*;
    let slot = |x, y, directions: &[Direction]| {
        AcceptorSlot::new(TileOffset::new(x, y), directions.to_vec(), Some(ItemKind::Shape))
    };
    vec![
        slot(0, 0, &[Top, Left]),
        slot(1, 0, &[Top]),
        slot(2, 0, &[Top]),
        slot(3, 0, &[Top, Right]),
        slot(0, 3, &[Bottom, Left]),
        slot(1, 3, &[Bottom]),
        slot(2, 3, &[Bottom]),
        slot(3, 3, &[Bottom, Right]),
        slot(0, 1, &[Left]),
        slot(0, 2, &[Left]),
        slot(0, 3, &[Left]),
        slot(3, 1, &[Right]),
        slot(3, 2, &[Right]),
        slot(3, 3, &[Right]),
    ]
}

pub fn hub() -> BuildingDef {
    let mut v = VariantDescriptor::new("default", Color(0xeb5555));
    v.dimensions = Dimensions::new(4, 4);
    v.rotatable = false;
    v.removable = false;
    v.availability = Availability::Never;
    v.components = ComponentConfig {
        wired_pins: Some(vec![PinSlot::new(
            TileOffset::new(0, 2),
            Direction::Left,
            PinSlotKind::LogicalEjector,
        )]),
        item_processor: Some(ProcessorConfig {
            kind: ProcessorKind::Hub,
            inputs_per_charge: 1,
        }),
        item_acceptor: Some(hub_acceptors()),
        hub: true,
        ..Default::default()
    };
    let mut def = BuildingDef::new(HUB, BuildingKind::Hub).with_variant(v);
    def.can_pipette = false;
    def
}

/// Every built-in building, in registration order.
pub fn standard_buildings() -> Vec<BuildingDef> {
    vec![wire(), transistor(), lever(), stacker(), hub()]
}

/// Registry holding the built-in buildings.
pub fn standard_registry() -> Result<Registry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    for def in standard_buildings() {
        builder.register_building(def)?;
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::verify_setup_matches_update;
    use crate::autotile::TileShape;
    use crate::components::{ComponentKind, Entity};
    use crate::geometry::Rotation;
    use crate::id::VariantId;
    use crate::progression::UnlockedRewards;
    use crate::test_utils::AllUnlocked;

    fn default() -> VariantId {
        VariantId::default_variant()
    }

    #[test]
    fn standard_registry_builds() {
        let reg = standard_registry().unwrap();
        assert_eq!(reg.building_count(), 5);
        for name in [WIRE, TRANSISTOR, LEVER, STACKER, HUB] {
            assert!(reg.building_id(name).is_some(), "{name}");
        }
    }

    #[test]
    fn setup_matches_update_for_every_building_and_variant() {
        for def in standard_buildings() {
            for variant in &def.variants {
                verify_setup_matches_update(&variant.components, 0)
                    .unwrap_or_else(|e| panic!("{}/{}: {e}", def.name, variant.id));
            }
        }
    }

    #[test]
    fn setup_equals_update_on_default_variant() {
        let reg = standard_registry().unwrap();
        for (id, def) in reg.buildings() {
            let mut created = Entity::new();
            reg.setup_entity_components(id, &mut created).unwrap();
            let mut updated = created.clone();
            reg.update_variants(id, &mut updated, 0, &default()).unwrap();
            assert_eq!(created, updated, "{}", def.name);
        }
    }

    #[test]
    fn transistor_mirrored_flips_side_pin() {
        let reg = standard_registry().unwrap();
        let id = reg.building_id(TRANSISTOR).unwrap();
        let mut entity = Entity::new();
        reg.setup_entity_components(id, &mut entity).unwrap();
        reg.update_variants(id, &mut entity, 0, &VariantId::from(TRANSISTOR_MIRRORED))
            .unwrap();
        let slots = &entity.components.wired_pins.as_ref().unwrap().slots;
        assert_eq!(slots[0].direction, Direction::Top);
        assert_eq!(slots[1].direction, Direction::Right);
        assert_eq!(slots[2].direction, Direction::Bottom);

        reg.update_variants(id, &mut entity, 0, &default()).unwrap();
        let slots = &entity.components.wired_pins.as_ref().unwrap().slots;
        assert_eq!(slots[1].direction, Direction::Left);
    }

    #[test]
    fn transistor_overlay_rotates() {
        let reg = standard_registry().unwrap();
        let id = reg.building_id(TRANSISTOR).unwrap();
        let m = reg
            .overlay_render_matrix(id, 90, 0, &default(), None)
            .unwrap()
            .unwrap();
        assert_eq!(m, OverlayMatrix::from_rows([[0, 1, 0], [1, 1, 1], [0, 0, 0]]));
        let m0 = reg
            .overlay_render_matrix(id, 0, 0, &VariantId::from(TRANSISTOR_MIRRORED), None)
            .unwrap()
            .unwrap();
        assert_eq!(m0, TRANSISTOR_RIGHT);
    }

    #[test]
    fn wire_overlay_follows_rotation_variant() {
        let reg = standard_registry().unwrap();
        let id = reg.building_id(WIRE).unwrap();
        let corner = reg
            .overlay_render_matrix(id, 0, TileShape::Corner.rotation_variant(), &default(), None)
            .unwrap();
        assert_eq!(corner, Some(WIRE_CORNER));
        let straight_turned = reg
            .overlay_render_matrix(id, 270, 0, &default(), None)
            .unwrap()
            .unwrap();
        assert_eq!(straight_turned, WIRE_STRAIGHT.rotated_cw().rotated_cw().rotated_cw());
        assert_eq!(
            straight_turned,
            OverlayMatrix::from_rows([[0, 0, 0], [1, 1, 1], [0, 0, 0]])
        );
    }

    #[test]
    fn wire_component_carries_class_and_shape() {
        let reg = standard_registry().unwrap();
        let id = reg.building_id(WIRE).unwrap();
        let mut entity = Entity::new();
        reg.setup_entity_components(id, &mut entity).unwrap();
        reg.update_variants(id, &mut entity, 3, &VariantId::from(WIRE_SECOND))
            .unwrap();
        let wire = entity.components.wire.as_ref().unwrap();
        assert_eq!(wire.class, ConductiveClass::Second);
        assert_eq!(wire.shape, TileShape::Cross);
        assert!(reg.is_autotiled(id).unwrap());
    }

    #[test]
    fn hub_is_fixed() {
        let reg = standard_registry().unwrap();
        let id = reg.building_id(HUB).unwrap();
        assert!(!reg.is_rotatable(id, &default()).unwrap());
        assert!(!reg.is_removable(id, &default()).unwrap());
        assert_eq!(reg.dimensions(id, &default()).unwrap(), Dimensions::new(4, 4));
        assert!(reg.available_variants(id, &AllUnlocked).unwrap().is_empty());
        assert!(!reg.get_building(id).unwrap().can_pipette);

        let mut entity = Entity::new();
        reg.setup_entity_components(id, &mut entity).unwrap();
        assert_eq!(
            entity.components.kinds(),
            vec![
                ComponentKind::WiredPins,
                ComponentKind::ItemProcessor,
                ComponentKind::ItemAcceptor,
                ComponentKind::Hub,
            ]
        );
        assert_eq!(entity.components.item_acceptor.as_ref().unwrap().slots.len(), 14);
        let processor = entity.components.item_processor.as_ref().unwrap();
        assert_eq!(processor.kind, ProcessorKind::Hub);
        assert_eq!(processor.inputs_per_charge, 1);
    }

    #[test]
    fn stacker_setup() {
        let reg = standard_registry().unwrap();
        let id = reg.building_id(STACKER).unwrap();
        let mut entity = Entity::new();
        reg.setup_entity_components(id, &mut entity).unwrap();
        let processor = entity.components.item_processor.as_ref().unwrap();
        assert_eq!(processor.kind, ProcessorKind::Stacker);
        assert_eq!(processor.inputs_per_charge, 2);
        let acceptors = &entity.components.item_acceptor.as_ref().unwrap().slots;
        assert_eq!(acceptors[1].pos, TileOffset::new(1, 0));
        assert_eq!(acceptors[1].filter, Some(ItemKind::Shape));
        assert_eq!(reg.show_layer_preview(id, &default()).unwrap(), None);
        assert_eq!(
            reg.overlay_render_matrix(id, 180, 0, &default(), None).unwrap(),
            None
        );
    }

    #[test]
    fn lever_preview_and_pins() {
        let reg = standard_registry().unwrap();
        let id = reg.building_id(LEVER).unwrap();
        assert_eq!(reg.layer(id, &default(), &AllUnlocked).unwrap(), Layer::Regular);
        assert_eq!(
            reg.show_layer_preview(id, &default()).unwrap(),
            Some(Layer::Wires)
        );
        assert!(reg.render_pins(id, &default()).unwrap());
        assert_eq!(reg.silhouette_color(id, &default()).unwrap().to_string(), "#1a678b");
    }

    #[test]
    fn availability_follows_rewards() {
        let reg = standard_registry().unwrap();
        let transistor = reg.building_id(TRANSISTOR).unwrap();
        let lever = reg.building_id(LEVER).unwrap();

        let state: UnlockedRewards = [Reward::LogicGates].into_iter().collect();
        let variants: Vec<&str> = reg
            .available_variants(transistor, &state)
            .unwrap()
            .into_iter()
            .map(VariantId::as_str)
            .collect();
        assert_eq!(variants, vec!["default", TRANSISTOR_MIRRORED]);
        assert!(reg.available_variants(lever, &state).unwrap().is_empty());
    }

    #[test]
    fn footprint_rotation_of_stacker() {
        let reg = standard_registry().unwrap();
        let id = reg.building_id(STACKER).unwrap();
        let dims = reg.dimensions(id, &default()).unwrap();
        assert_eq!(dims.rotated(Rotation::Cw90), Dimensions::new(1, 2));
    }
}
