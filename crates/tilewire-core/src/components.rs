//! Typed components attached to placed entities.
//!
//! An entity owns a fixed set of optional component slots rather than a
//! name-keyed map, so presence checks and field access are typed.

use crate::autotile::{ConductiveClass, TileShape};
use crate::geometry::{Direction, TileOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Slot descriptors
// ---------------------------------------------------------------------------

/// Whether a logic pin emits or reads a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinSlotKind {
    #[default]
    LogicalEjector,
    LogicalAcceptor,
}

/// A logic pin on the wires layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinSlot {
    pub pos: TileOffset,
    pub direction: Direction,
    pub kind: PinSlotKind,
}

impl PinSlot {
    pub const fn new(pos: TileOffset, direction: Direction, kind: PinSlotKind) -> Self {
        Self {
            pos,
            direction,
            kind,
        }
    }
}

/// Class of item an acceptor slot lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Shape,
    Color,
    Boolean,
}

/// Item input on the regular layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcceptorSlot {
    pub pos: TileOffset,
    pub directions: Vec<Direction>,
    #[serde(default)]
    pub filter: Option<ItemKind>,
}

impl AcceptorSlot {
    pub fn new(pos: TileOffset, directions: Vec<Direction>, filter: Option<ItemKind>) -> Self {
        Self {
            pos,
            directions,
            filter,
        }
    }
}

/// Item output on the regular layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EjectorSlot {
    pub pos: TileOffset,
    pub direction: Direction,
}

impl EjectorSlot {
    pub const fn new(pos: TileOffset, direction: Direction) -> Self {
        Self { pos, direction }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicGateKind {
    #[default]
    And,
    Not,
    Xor,
    Or,
    Transistor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorKind {
    #[default]
    Balancer,
    Stacker,
    Hub,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WiredPins {
    pub slots: Vec<PinSlot>,
}

impl WiredPins {
    /// Replace the slot list, keeping the component instance.
    pub fn set_slots(&mut self, slots: &[PinSlot]) {
        self.slots.clear();
        self.slots.extend_from_slice(slots);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogicGate {
    pub kind: LogicGateKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemProcessor {
    pub kind: ProcessorKind,
    pub inputs_per_charge: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemEjector {
    pub slots: Vec<EjectorSlot>,
}

impl ItemEjector {
    pub fn set_slots(&mut self, slots: &[EjectorSlot]) {
        self.slots.clear();
        self.slots.extend_from_slice(slots);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemAcceptor {
    pub slots: Vec<AcceptorSlot>,
}

impl ItemAcceptor {
    pub fn set_slots(&mut self, slots: &[AcceptorSlot]) {
        self.slots.clear();
        self.slots.extend_from_slice(slots);
    }
}

/// Marker for the central delivery building.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hub;

/// A player-toggled signal source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lever {
    pub toggled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Wire {
    pub class: ConductiveClass,
    pub shape: TileShape,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Names a component slot, for attachment order and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    WiredPins,
    LogicGate,
    ItemProcessor,
    ItemEjector,
    ItemAcceptor,
    Hub,
    Lever,
    Wire,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::WiredPins => "WiredPins",
            ComponentKind::LogicGate => "LogicGate",
            ComponentKind::ItemProcessor => "ItemProcessor",
            ComponentKind::ItemEjector => "ItemEjector",
            ComponentKind::ItemAcceptor => "ItemAcceptor",
            ComponentKind::Hub => "Hub",
            ComponentKind::Lever => "Lever",
            ComponentKind::Wire => "Wire",
        };
        f.write_str(name)
    }
}

/// Optional component slots of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Components {
    pub wired_pins: Option<WiredPins>,
    pub logic_gate: Option<LogicGate>,
    pub item_processor: Option<ItemProcessor>,
    pub item_ejector: Option<ItemEjector>,
    pub item_acceptor: Option<ItemAcceptor>,
    pub hub: Option<Hub>,
    pub lever: Option<Lever>,
    pub wire: Option<Wire>,
}

impl Components {
    pub fn has(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::WiredPins => self.wired_pins.is_some(),
            ComponentKind::LogicGate => self.logic_gate.is_some(),
            ComponentKind::ItemProcessor => self.item_processor.is_some(),
            ComponentKind::ItemEjector => self.item_ejector.is_some(),
            ComponentKind::ItemAcceptor => self.item_acceptor.is_some(),
            ComponentKind::Hub => self.hub.is_some(),
            ComponentKind::Lever => self.lever.is_some(),
            ComponentKind::Wire => self.wire.is_some(),
        }
    }

    /// Insert a default-valued instance of `kind`.
    pub(crate) fn insert_blank(&mut self, kind: ComponentKind) {
        match kind {
            ComponentKind::WiredPins => self.wired_pins = Some(WiredPins::default()),
            ComponentKind::LogicGate => self.logic_gate = Some(LogicGate::default()),
            ComponentKind::ItemProcessor => self.item_processor = Some(ItemProcessor::default()),
            ComponentKind::ItemEjector => self.item_ejector = Some(ItemEjector::default()),
            ComponentKind::ItemAcceptor => self.item_acceptor = Some(ItemAcceptor::default()),
            ComponentKind::Hub => self.hub = Some(Hub),
            ComponentKind::Lever => self.lever = Some(Lever::default()),
            ComponentKind::Wire => self.wire = Some(Wire::default()),
        }
    }

    /// Kinds currently attached, in attachment order.
    pub fn kinds(&self) -> Vec<ComponentKind> {
        [
            ComponentKind::WiredPins,
            ComponentKind::LogicGate,
            ComponentKind::ItemProcessor,
            ComponentKind::ItemEjector,
            ComponentKind::ItemAcceptor,
            ComponentKind::Hub,
            ComponentKind::Lever,
            ComponentKind::Wire,
        ]
        .into_iter()
        .filter(|k| self.has(*k))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

/// A placed building's component record. Lifecycle is owned by the
/// placement layer; this crate only configures it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entity {
    pub components: Components,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_entity_has_no_components() {
        let entity = Entity::new();
        assert!(entity.components.is_empty());
        assert!(!entity.components.has(ComponentKind::Wire));
    }

    #[test]
    fn insert_blank_attaches_default() {
        let mut components = Components::default();
        components.insert_blank(ComponentKind::Lever);
        components.insert_blank(ComponentKind::WiredPins);
        assert_eq!(components.lever, Some(Lever { toggled: false }));
        assert_eq!(
            components.kinds(),
            vec![ComponentKind::WiredPins, ComponentKind::Lever]
        );
    }

    #[test]
    fn set_slots_keeps_instance_and_replaces_contents() {
        let mut pins = WiredPins {
            slots: vec![PinSlot::new(
                TileOffset::ORIGIN,
                Direction::Top,
                PinSlotKind::LogicalEjector,
            )],
        };
        let replacement = [
            PinSlot::new(TileOffset::ORIGIN, Direction::Left, PinSlotKind::LogicalAcceptor),
            PinSlot::new(TileOffset::ORIGIN, Direction::Right, PinSlotKind::LogicalAcceptor),
        ];
        pins.set_slots(&replacement);
        assert_eq!(pins.slots, replacement.to_vec());
    }

    #[test]
    fn component_kind_display() {
        assert_eq!(ComponentKind::ItemAcceptor.to_string(), "ItemAcceptor");
    }
}
