//! Buildings and the rooms inside them.

use serde::{Deserialize, Serialize};

use crate::id::{BuildingId, PersonId, RoomId};

/// A building with exactly one responsible attendant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub address: String,
    /// Expected to reference a person with role Attendant; the store does
    /// not check this.
    pub attendant_id: PersonId,
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub building_id: BuildingId,
}
