//! Event data handed to the execution pipeline.
//!
//! [`EventData`] is a closed set of five execution kinds. Each variant carries
//! the [`StatusData`] computed for one attribute plus the entities playing a
//! role in the event; the variant decides which entity is the *subject* seen
//! by execution listeners.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::status::StatusData;

/// Opaque identifier of an entity owned by the host game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Execution kind an attribute is dispatched for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum StatusType {
    /// Outgoing hit; subject is the attacker.
    Attack,
    /// Periodic stat refresh; subject is the executor.
    Update,
    /// Incoming hit; subject is the victim.
    Defense,
    /// Plugin-defined trigger; subject is the executor.
    Custom,
    /// Scheduled runtime effect; subject is the executor.
    Runtime,
}

/// Per-attribute execution payload.
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    Attack {
        attacker: EntityId,
        victim: EntityId,
        status: StatusData,
    },
    Update {
        executor: EntityId,
        status: StatusData,
    },
    Defense {
        victim: EntityId,
        status: StatusData,
    },
    Custom {
        executor: EntityId,
        status: StatusData,
    },
    Runtime {
        executor: EntityId,
        status: StatusData,
    },
}

impl EventData {
    pub fn kind(&self) -> StatusType {
        match self {
            EventData::Attack { .. } => StatusType::Attack,
            EventData::Update { .. } => StatusType::Update,
            EventData::Defense { .. } => StatusType::Defense,
            EventData::Custom { .. } => StatusType::Custom,
            EventData::Runtime { .. } => StatusType::Runtime,
        }
    }

    /// Entity the event is about, as seen by execution listeners.
    pub fn subject(&self) -> EntityId {
        match self {
            EventData::Attack { attacker, .. } => *attacker,
            EventData::Defense { victim, .. } => *victim,
            EventData::Update { executor, .. }
            | EventData::Custom { executor, .. }
            | EventData::Runtime { executor, .. } => *executor,
        }
    }

    pub fn status(&self) -> &StatusData {
        match self {
            EventData::Attack { status, .. }
            | EventData::Update { status, .. }
            | EventData::Defense { status, .. }
            | EventData::Custom { status, .. }
            | EventData::Runtime { status, .. } => status,
        }
    }

    pub fn status_mut(&mut self) -> &mut StatusData {
        match self {
            EventData::Attack { status, .. }
            | EventData::Update { status, .. }
            | EventData::Defense { status, .. }
            | EventData::Custom { status, .. }
            | EventData::Runtime { status, .. } => status,
        }
    }

    /// The roles of this event without its status.
    pub fn context(&self) -> EventContext {
        match *self {
            EventData::Attack {
                attacker, victim, ..
            } => EventContext::Attack { attacker, victim },
            EventData::Update { executor, .. } => EventContext::Update { executor },
            EventData::Defense { victim, .. } => EventContext::Defense { victim },
            EventData::Custom { executor, .. } => EventContext::Custom { executor },
            EventData::Runtime { executor, .. } => EventContext::Runtime { executor },
        }
    }
}

/// Roles of an event before any attribute value is attached.
///
/// The runtime dispatches one context to every matching attribute, building a
/// fresh [`EventData`] per attribute with [`EventContext::into_event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventContext {
    Attack { attacker: EntityId, victim: EntityId },
    Update { executor: EntityId },
    Defense { victim: EntityId },
    Custom { executor: EntityId },
    Runtime { executor: EntityId },
}

impl EventContext {
    pub fn kind(&self) -> StatusType {
        match self {
            EventContext::Attack { .. } => StatusType::Attack,
            EventContext::Update { .. } => StatusType::Update,
            EventContext::Defense { .. } => StatusType::Defense,
            EventContext::Custom { .. } => StatusType::Custom,
            EventContext::Runtime { .. } => StatusType::Runtime,
        }
    }

    /// Entity whose items feed the attribute value.
    pub fn subject(&self) -> EntityId {
        match *self {
            EventContext::Attack { attacker, .. } => attacker,
            EventContext::Defense { victim } => victim,
            EventContext::Update { executor }
            | EventContext::Custom { executor }
            | EventContext::Runtime { executor } => executor,
        }
    }

    pub fn into_event(self, status: StatusData) -> EventData {
        match self {
            EventContext::Attack { attacker, victim } => EventData::Attack {
                attacker,
                victim,
                status,
            },
            EventContext::Update { executor } => EventData::Update { executor, status },
            EventContext::Defense { victim } => EventData::Defense { victim, status },
            EventContext::Custom { executor } => EventData::Custom { executor, status },
            EventContext::Runtime { executor } => EventData::Runtime { executor, status },
        }
    }
}
