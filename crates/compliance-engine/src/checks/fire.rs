//! Required fire-resistance ratings (informational, never pass/fail)

use crate::tables::RuleTableSet;
use shared_types::{ConstructionType, FireResistance};

pub fn lookup_fire_resistance(
    construction: ConstructionType,
    tables: &RuleTableSet,
) -> FireResistance {
    let elements = tables.fire_resistance(construction);
    FireResistance {
        construction_type: construction,
        structural_frame: elements.structural_frame,
        bearing_wall_exterior: elements.bearing_wall_exterior,
        bearing_wall_interior: elements.bearing_wall_interior,
        floor: elements.floor,
        roof: elements.roof,
    }
}
