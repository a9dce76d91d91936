//! Component attachment: one declarative configuration per variant.
//!
//! Creating an entity and switching its variant go through the same
//! [`ComponentConfig::apply`]. [`ComponentConfig::attach`] only inserts blank
//! components for every declared kind and then applies.
//! [`verify_setup_matches_update`] checks both paths against
//! [`expected_components`], which reads the configuration directly.

use crate::autotile::{ConductiveClass, TileShape};
use crate::components::{
    AcceptorSlot, ComponentKind, Components, EjectorSlot, Entity, Hub, ItemAcceptor, ItemEjector,
    ItemProcessor, Lever, LogicGate, LogicGateKind, PinSlot, ProcessorKind, Wire, WiredPins,
};
use crate::geometry::{Dimensions, TileOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("component {0} is already attached")]
    AlreadyAttached(ComponentKind),
    #[error("component {0} is not attached")]
    MissingComponent(ComponentKind),
    #[error("rotation variant {0} does not name a wire shape")]
    InvalidRotationVariant(usize),
    #[error("setup and update paths disagree on component {0}")]
    ConfigurationMismatch(ComponentKind),
}

/// Item processor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessorConfig {
    pub kind: ProcessorKind,
    pub inputs_per_charge: u32,
}

/// Everything a variant attaches to an entity. `None`/`false` means the
/// variant does not declare that component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentConfig {
    #[serde(default)]
    pub wired_pins: Option<Vec<PinSlot>>,
    #[serde(default)]
    pub logic_gate: Option<LogicGateKind>,
    #[serde(default)]
    pub item_processor: Option<ProcessorConfig>,
    #[serde(default)]
    pub item_ejector: Option<Vec<EjectorSlot>>,
    #[serde(default)]
    pub item_acceptor: Option<Vec<AcceptorSlot>>,
    #[serde(default)]
    pub hub: bool,
    #[serde(default)]
    pub lever: bool,
    /// Wires take their shape from the rotation variant.
    #[serde(default)]
    pub wire: Option<ConductiveClass>,
}

impl ComponentConfig {
    /// Declared component kinds in attachment order.
    pub fn declared(&self) -> Vec<ComponentKind> {
        let mut kinds = Vec::new();
        if self.wired_pins.is_some() {
            kinds.push(ComponentKind::WiredPins);
        }
        if self.logic_gate.is_some() {
            kinds.push(ComponentKind::LogicGate);
        }
        if self.item_processor.is_some() {
            kinds.push(ComponentKind::ItemProcessor);
        }
        if self.item_ejector.is_some() {
            kinds.push(ComponentKind::ItemEjector);
        }
        if self.item_acceptor.is_some() {
            kinds.push(ComponentKind::ItemAcceptor);
        }
        if self.hub {
            kinds.push(ComponentKind::Hub);
        }
        if self.lever {
            kinds.push(ComponentKind::Lever);
        }
        if self.wire.is_some() {
            kinds.push(ComponentKind::Wire);
        }
        kinds
    }

    /// Every slot position of every declared slot list.
    pub fn slot_positions(&self) -> impl Iterator<Item = TileOffset> + '_ {
        let pins = self.wired_pins.iter().flatten().map(|s| s.pos);
        let ejectors = self.item_ejector.iter().flatten().map(|s| s.pos);
        let acceptors = self.item_acceptor.iter().flatten().map(|s| s.pos);
        pins.chain(ejectors).chain(acceptors)
    }

    /// First slot position outside `dimensions`, if any.
    pub fn slot_outside(&self, dimensions: Dimensions) -> Option<TileOffset> {
        self.slot_positions().find(|pos| !dimensions.contains(*pos))
    }

    /// Wire shape for `rotation_variant`, or `None` when no wire is declared.
    fn wire_shape(&self, rotation_variant: usize) -> Result<Option<TileShape>, AttachmentError> {
        if self.wire.is_none() {
            return Ok(None);
        }
        TileShape::from_rotation_variant(rotation_variant)
            .map(Some)
            .ok_or(AttachmentError::InvalidRotationVariant(rotation_variant))
    }

    /// Create every declared component on a fresh entity and configure it.
    /// Fails without touching the entity if any declared kind is present.
    pub fn attach(&self, entity: &mut Entity, rotation_variant: usize) -> Result<(), AttachmentError> {
        let declared = self.declared();
        if let Some(kind) = declared.iter().find(|k| entity.components.has(**k)) {
            return Err(AttachmentError::AlreadyAttached(*kind));
        }
        self.wire_shape(rotation_variant)?;
        for kind in declared {
            entity.components.insert_blank(kind);
        }
        self.apply(entity, rotation_variant)
    }

    /// Reconfigure existing components in place. Fails without touching the
    /// entity if any declared kind is missing. Applying the same
    /// configuration twice is the same as applying it once.
    pub fn apply(&self, entity: &mut Entity, rotation_variant: usize) -> Result<(), AttachmentError> {
        if let Some(kind) = self.declared().into_iter().find(|k| !entity.components.has(*k)) {
            return Err(AttachmentError::MissingComponent(kind));
        }
        let shape = self.wire_shape(rotation_variant)?;

        let c = &mut entity.components;
        if let (Some(slots), Some(pins)) = (&self.wired_pins, c.wired_pins.as_mut()) {
            pins.set_slots(slots);
        }
        if let (Some(kind), Some(gate)) = (self.logic_gate, c.logic_gate.as_mut()) {
            gate.kind = kind;
        }
        if let (Some(config), Some(processor)) = (self.item_processor, c.item_processor.as_mut()) {
            processor.kind = config.kind;
            processor.inputs_per_charge = config.inputs_per_charge;
        }
        if let (Some(slots), Some(ejector)) = (&self.item_ejector, c.item_ejector.as_mut()) {
            ejector.set_slots(slots);
        }
        if let (Some(slots), Some(acceptor)) = (&self.item_acceptor, c.item_acceptor.as_mut()) {
            acceptor.set_slots(slots);
        }
        if let (Some(class), Some(shape), Some(wire)) = (self.wire, shape, c.wire.as_mut()) {
            wire.class = class;
            wire.shape = shape;
        }
        Ok(())
    }
}

/// Component state `config` describes, built field by field without going
/// through [`ComponentConfig::apply`].
pub fn expected_components(
    config: &ComponentConfig,
    rotation_variant: usize,
) -> Result<Components, AttachmentError> {
    let wire = match (config.wire, config.wire_shape(rotation_variant)?) {
        (Some(class), Some(shape)) => Some(Wire { class, shape }),
        _ => None,
    };
    Ok(Components {
        wired_pins: config.wired_pins.as_ref().map(|slots| WiredPins {
            slots: slots.clone(),
        }),
        logic_gate: config.logic_gate.map(|kind| LogicGate { kind }),
        item_processor: config.item_processor.map(|p| ItemProcessor {
            kind: p.kind,
            inputs_per_charge: p.inputs_per_charge,
        }),
        item_ejector: config.item_ejector.as_ref().map(|slots| ItemEjector {
            slots: slots.clone(),
        }),
        item_acceptor: config.item_acceptor.as_ref().map(|slots| ItemAcceptor {
            slots: slots.clone(),
        }),
        hub: config.hub.then_some(Hub),
        lever: config.lever.then(Lever::default),
        wire,
    })
}

/// First component kind whose state differs between `a` and `b`.
pub fn first_mismatch(a: &Components, b: &Components) -> Option<ComponentKind> {
    [
        (ComponentKind::WiredPins, a.wired_pins != b.wired_pins),
        (ComponentKind::LogicGate, a.logic_gate != b.logic_gate),
        (ComponentKind::ItemProcessor, a.item_processor != b.item_processor),
        (ComponentKind::ItemEjector, a.item_ejector != b.item_ejector),
        (ComponentKind::ItemAcceptor, a.item_acceptor != b.item_acceptor),
        (ComponentKind::Hub, a.hub != b.hub),
        (ComponentKind::Lever, a.lever != b.lever),
        (ComponentKind::Wire, a.wire != b.wire),
    ]
    .into_iter()
    .find_map(|(kind, differs)| differs.then_some(kind))
}

/// Check that both the creation path ([`ComponentConfig::attach`]) and the
/// update path (re-applying to an attached entity) land on the state
/// [`expected_components`] describes.
pub fn verify_setup_matches_update(
    config: &ComponentConfig,
    rotation_variant: usize,
) -> Result<(), AttachmentError> {
    let expected = expected_components(config, rotation_variant)?;

    let mut created = Entity::new();
    config.attach(&mut created, rotation_variant)?;
    if let Some(kind) = first_mismatch(&created.components, &expected) {
        return Err(AttachmentError::ConfigurationMismatch(kind));
    }

    let mut updated = created;
    config.apply(&mut updated, rotation_variant)?;
    if let Some(kind) = first_mismatch(&updated.components, &expected) {
        return Err(AttachmentError::ConfigurationMismatch(kind));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ItemKind, PinSlotKind};
    use crate::geometry::Direction;

    fn transistor_config(acceptor_side: Direction) -> ComponentConfig {
        ComponentConfig {
            wired_pins: Some(vec![
                PinSlot::new(TileOffset::ORIGIN, Direction::Top, PinSlotKind::LogicalEjector),
                PinSlot::new(TileOffset::ORIGIN, acceptor_side, PinSlotKind::LogicalAcceptor),
                PinSlot::new(TileOffset::ORIGIN, Direction::Bottom, PinSlotKind::LogicalAcceptor),
            ]),
            logic_gate: Some(LogicGateKind::Transistor),
            ..Default::default()
        }
    }

    #[test]
    fn attach_creates_declared_components() {
        let config = transistor_config(Direction::Left);
        let mut entity = Entity::new();
        config.attach(&mut entity, 0).unwrap();
        assert_eq!(
            entity.components.kinds(),
            vec![ComponentKind::WiredPins, ComponentKind::LogicGate]
        );
        let pins = entity.components.wired_pins.as_ref().unwrap();
        assert_eq!(pins.slots[1].direction, Direction::Left);
        assert_eq!(
            entity.components.logic_gate.as_ref().unwrap().kind,
            LogicGateKind::Transistor
        );
    }

    #[test]
    fn apply_switches_variant_in_place() {
        let mut entity = Entity::new();
        transistor_config(Direction::Left).attach(&mut entity, 0).unwrap();
        transistor_config(Direction::Right).apply(&mut entity, 0).unwrap();
        let pins = entity.components.wired_pins.as_ref().unwrap();
        assert_eq!(pins.slots.len(), 3);
        assert_eq!(pins.slots[1].direction, Direction::Right);
        assert_eq!(pins.slots[0].direction, Direction::Top);
    }

    #[test]
    fn apply_is_idempotent() {
        let config = transistor_config(Direction::Right);
        let mut once = Entity::new();
        config.attach(&mut once, 0).unwrap();
        let mut twice = once.clone();
        config.apply(&mut twice, 0).unwrap();
        config.apply(&mut twice, 0).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn attach_twice_fails_without_mutation() {
        let config = transistor_config(Direction::Left);
        let mut entity = Entity::new();
        config.attach(&mut entity, 0).unwrap();
        let before = entity.clone();
        assert_eq!(
            config.attach(&mut entity, 0),
            Err(AttachmentError::AlreadyAttached(ComponentKind::WiredPins))
        );
        assert_eq!(entity, before);
    }

    #[test]
    fn apply_missing_component_fails_without_mutation() {
        let mut entity = Entity::new();
        entity.components.insert_blank(ComponentKind::WiredPins);
        let before = entity.clone();
        let err = transistor_config(Direction::Left)
            .apply(&mut entity, 0)
            .unwrap_err();
        assert_eq!(err, AttachmentError::MissingComponent(ComponentKind::LogicGate));
        assert_eq!(entity, before);
    }

    #[test]
    fn apply_keeps_runtime_lever_state() {
        let config = ComponentConfig {
            wired_pins: Some(vec![PinSlot::new(
                TileOffset::ORIGIN,
                Direction::Top,
                PinSlotKind::LogicalEjector,
            )]),
            lever: true,
            ..Default::default()
        };
        let mut entity = Entity::new();
        config.attach(&mut entity, 0).unwrap();
        entity.components.lever = Some(Lever { toggled: true });
        config.apply(&mut entity, 0).unwrap();
        assert_eq!(entity.components.lever, Some(Lever { toggled: true }));
    }

    #[test]
    fn wire_shape_follows_rotation_variant() {
        let config = ComponentConfig {
            wire: Some(ConductiveClass::Second),
            ..Default::default()
        };
        let mut entity = Entity::new();
        config.attach(&mut entity, 0).unwrap();
        config.apply(&mut entity, 2).unwrap();
        let wire = entity.components.wire.as_ref().unwrap();
        assert_eq!(wire.shape, TileShape::Tee);
        assert_eq!(wire.class, ConductiveClass::Second);
    }

    #[test]
    fn setup_matches_update() {
        let config = ComponentConfig {
            item_processor: Some(ProcessorConfig {
                kind: ProcessorKind::Stacker,
                inputs_per_charge: 2,
            }),
            item_ejector: Some(vec![EjectorSlot::new(TileOffset::ORIGIN, Direction::Top)]),
            item_acceptor: Some(vec![AcceptorSlot::new(
                TileOffset::new(1, 0),
                vec![Direction::Bottom],
                Some(ItemKind::Shape),
            )]),
            ..Default::default()
        };
        verify_setup_matches_update(&config, 0).unwrap();
        verify_setup_matches_update(&transistor_config(Direction::Left), 0).unwrap();
    }

    #[test]
    fn invalid_rotation_variant_rejected_without_mutation() {
        let config = ComponentConfig {
            wire: Some(ConductiveClass::First),
            ..Default::default()
        };
        let mut fresh = Entity::new();
        assert_eq!(
            config.attach(&mut fresh, 7),
            Err(AttachmentError::InvalidRotationVariant(7))
        );
        assert_eq!(fresh, Entity::new());

        let mut entity = Entity::new();
        config.attach(&mut entity, 1).unwrap();
        let before = entity.clone();
        assert_eq!(
            config.apply(&mut entity, 4),
            Err(AttachmentError::InvalidRotationVariant(4))
        );
        assert_eq!(entity, before);
        assert_eq!(entity.components.wire.as_ref().unwrap().shape, TileShape::Corner);
    }

    #[test]
    fn rotation_variant_ignored_without_wire() {
        let mut entity = Entity::new();
        transistor_config(Direction::Left).attach(&mut entity, 9).unwrap();
        assert!(entity.components.wire.is_none());
    }

    #[test]
    fn expected_components_match_attach() {
        let config = ComponentConfig {
            wired_pins: Some(vec![PinSlot::new(
                TileOffset::ORIGIN,
                Direction::Top,
                PinSlotKind::LogicalEjector,
            )]),
            lever: true,
            wire: Some(ConductiveClass::Second),
            ..Default::default()
        };
        let expected = expected_components(&config, 3).unwrap();
        assert_eq!(expected.wire.as_ref().unwrap().shape, TileShape::Cross);
        assert_eq!(expected.lever, Some(Lever { toggled: false }));

        let mut entity = Entity::new();
        config.attach(&mut entity, 3).unwrap();
        assert_eq!(first_mismatch(&entity.components, &expected), None);
    }

    #[test]
    fn first_mismatch_names_differing_component() {
        let config = transistor_config(Direction::Left);
        let expected = expected_components(&config, 0).unwrap();
        let mut entity = Entity::new();
        config.attach(&mut entity, 0).unwrap();
        entity.components.logic_gate = Some(LogicGate {
            kind: LogicGateKind::Xor,
        });
        assert_eq!(
            first_mismatch(&entity.components, &expected),
            Some(ComponentKind::LogicGate)
        );
    }

    #[test]
    fn verify_reports_invalid_rotation_variant() {
        let config = ComponentConfig {
            wire: Some(ConductiveClass::First),
            ..Default::default()
        };
        assert_eq!(
            verify_setup_matches_update(&config, 5),
            Err(AttachmentError::InvalidRotationVariant(5))
        );
    }

    #[test]
    fn slot_outside_footprint_detected() {
        let config = ComponentConfig {
            item_ejector: Some(vec![EjectorSlot::new(TileOffset::new(1, 0), Direction::Top)]),
            ..Default::default()
        };
        assert_eq!(config.slot_outside(Dimensions::new(2, 1)), None);
        assert_eq!(
            config.slot_outside(Dimensions::single()),
            Some(TileOffset::new(1, 0))
        );
    }
}
