//! Versioned building code rule tables
//!
//! A [`RuleTableSet`] is parsed and validated in one step when an edition is
//! loaded, so a malformed document fails at load time instead of in the
//! middle of an evaluation. After that it is read-only.

mod schema;
pub mod store;

use crate::error::DataError;
use crate::keys::{COMMON_PATH_GROUP_B_F_S, COMMON_PATH_GROUP_I1_R};
use schema::{RawCell, RawDocument, RawFireElements, RawRow};
use shared_types::{ConstructionType, FireRating, OccupancyCategory};
use std::collections::BTreeMap;

pub use store::{DirectorySource, EmbeddedSource, TableSource, TableStore};

/// Edition used when a design does not name one
pub const LATEST_EDITION: &str = "IBC-2021";

/// Occupant load factor (sqft per occupant) for categories missing from the table
pub const DEFAULT_OCCUPANT_LOAD_FACTOR: f64 = 150.0;

/// Travel distance row used when the occupancy key has no row of its own
pub const TRAVEL_DISTANCE_FALLBACK_KEY: &str = "B";

/// Fire rating sentinel for heavy timber members
const HEAVY_TIMBER_SENTINEL: &str = "HT";

/// One allowable-value cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    /// A zero in the table: the combination is not allowed at all
    NotPermitted,
    /// The table's unlimited sentinel: no comparison applies
    Unlimited,
    Limited(f64),
}

/// Allowable values for one occupancy across all nine construction types
#[derive(Debug, Clone, PartialEq)]
pub struct LimitRow {
    cells: [Limit; 9],
}

impl LimitRow {
    pub fn get(&self, construction: ConstructionType) -> Limit {
        self.cells[construction as usize]
    }
}

/// Required hour ratings by building element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireElements {
    pub structural_frame: FireRating,
    pub bearing_wall_exterior: FireRating,
    pub bearing_wall_interior: FireRating,
    pub floor: FireRating,
    pub roof: FireRating,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SprinklerIncrease {
    pub height_ft: f64,
    pub stories: u32,
    pub area_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontageIncrease {
    pub max_increase_percent: f64,
    pub min_frontage_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct TravelDistanceLimits {
    by_key: BTreeMap<String, f64>,
    fallback_ft: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CommonPathLimits {
    business_factory_storage: f64,
    residential: f64,
    default: f64,
}

/// Egress parameters; widths in inches, distances in feet
#[derive(Debug, Clone, PartialEq)]
pub struct EgressTables {
    pub stairway_width_per_occupant_in: f64,
    pub other_width_per_occupant_in: f64,
    pub minimum_exit_width_in: f64,
    pub low_occupancy_corridor_width_in: f64,
    pub standard_corridor_width_in: f64,
    pub low_occupancy_threshold: u32,
    travel_distance: [TravelDistanceLimits; 2],
    common_path: [CommonPathLimits; 2],
    /// Upper occupant load bound and required exits, ascending
    exit_bands: Vec<(u32, u32)>,
    /// Exits required above the last bounded band
    open_band_exits: u32,
}

/// Index into per-sprinkler-status tables
fn sprinkler_slot(sprinklered: bool) -> usize {
    if sprinklered {
        0
    } else {
        1
    }
}

impl EgressTables {
    /// Maximum exit access travel distance (ft) and the row it came from
    pub fn max_travel_distance_ft(&self, sprinklered: bool, key: &str) -> (f64, String) {
        let limits = &self.travel_distance[sprinkler_slot(sprinklered)];
        match limits.by_key.get(key) {
            Some(ft) => (*ft, key.to_string()),
            None => {
                tracing::warn!(
                    key,
                    fallback = TRAVEL_DISTANCE_FALLBACK_KEY,
                    "no travel distance row for occupancy key, using fallback row"
                );
                (limits.fallback_ft, TRAVEL_DISTANCE_FALLBACK_KEY.to_string())
            }
        }
    }

    /// Maximum common path of egress travel (ft) for a common path group
    pub fn max_common_path_ft(&self, sprinklered: bool, group: &str) -> f64 {
        let limits = &self.common_path[sprinkler_slot(sprinklered)];
        match group {
            COMMON_PATH_GROUP_B_F_S => limits.business_factory_storage,
            COMMON_PATH_GROUP_I1_R => limits.residential,
            _ => limits.default,
        }
    }

    /// Minimum number of exits for an occupant load
    pub fn required_exits(&self, occupant_load: u32) -> u32 {
        self.exit_bands
            .iter()
            .find(|(max_load, _)| occupant_load <= *max_load)
            .map(|(_, exits)| *exits)
            .unwrap_or(self.open_band_exits)
    }
}

/// A validated, immutable set of code tables for one edition
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTableSet {
    edition: String,
    height_ft: BTreeMap<String, LimitRow>,
    stories: BTreeMap<String, LimitRow>,
    area_sqft: BTreeMap<String, LimitRow>,
    fire_resistance: [FireElements; 9],
    occupant_load_factors: BTreeMap<OccupancyCategory, f64>,
    pub egress: EgressTables,
    pub sprinkler: SprinklerIncrease,
    pub frontage: FrontageIncrease,
}

impl RuleTableSet {
    /// Parse and validate a JSON document expected to hold `edition`
    pub fn from_json(edition: &str, json: &str) -> Result<Self, DataError> {
        let raw: RawDocument = serde_json::from_str(json).map_err(|e| DataError::Parse {
            edition: edition.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_document(edition, raw)
    }

    fn from_document(edition: &str, raw: RawDocument) -> Result<Self, DataError> {
        if raw.edition != edition {
            return Err(DataError::schema(
                edition,
                format!("document declares edition '{}'", raw.edition),
            ));
        }
        if raw.units != "imperial" {
            return Err(DataError::schema(
                edition,
                format!("unsupported table units '{}'", raw.units),
            ));
        }

        let sentinel = raw.unlimited_sentinel.as_str();
        let height_ft = convert_table(
            edition,
            "allowable_height_ft",
            &raw.allowable_height_ft,
            sentinel,
            false,
        )?;
        let stories = convert_table(
            edition,
            "allowable_stories",
            &raw.allowable_stories,
            sentinel,
            true,
        )?;
        let area_sqft = convert_table(
            edition,
            "allowable_area_sqft",
            &raw.allowable_area_sqft,
            sentinel,
            false,
        )?;

        if !height_ft.keys().eq(stories.keys()) || !height_ft.keys().eq(area_sqft.keys()) {
            return Err(DataError::schema(
                edition,
                "height, stories and area tables must list the same occupancy groups",
            ));
        }

        let mut fire_resistance = Vec::with_capacity(9);
        for ct in ConstructionType::ALL {
            let elements = raw.fire_resistance_hours.get(&ct).ok_or_else(|| {
                DataError::schema(edition, format!("fire_resistance_hours is missing {}", ct))
            })?;
            fire_resistance.push(convert_fire_elements(edition, ct, elements)?);
        }
        let fire_resistance: [FireElements; 9] = fire_resistance
            .try_into()
            .map_err(|_| DataError::schema(edition, "fire_resistance_hours is incomplete"))?;

        for (category, factor) in &raw.occupant_load_factors {
            require_positive(edition, &format!("occupant_load_factors.{}", category), *factor)?;
        }

        let egress = convert_egress(edition, &raw.egress)?;

        let sprinkler = SprinklerIncrease {
            height_ft: raw.sprinkler_increase.height_ft,
            stories: raw.sprinkler_increase.stories,
            area_multiplier: raw.sprinkler_increase.area_multiplier,
        };
        if !sprinkler.height_ft.is_finite() || sprinkler.height_ft < 0.0 {
            return Err(DataError::schema(edition, "sprinkler_increase.height_ft must be >= 0"));
        }
        if !sprinkler.area_multiplier.is_finite() || sprinkler.area_multiplier < 1.0 {
            return Err(DataError::schema(
                edition,
                "sprinkler_increase.area_multiplier must be >= 1",
            ));
        }

        // Story limits are counted in u32 once the sprinkler increase is added
        let max_stories = f64::from(u32::MAX - sprinkler.stories);
        for (occupancy, row) in &stories {
            for ct in ConstructionType::ALL {
                if let Limit::Limited(n) = row.get(ct) {
                    if n > max_stories {
                        return Err(DataError::schema(
                            edition,
                            format!(
                                "allowable_stories.{}.{} must be at most {} stories, found {}",
                                occupancy, ct, max_stories, n
                            ),
                        ));
                    }
                }
            }
        }

        let frontage = FrontageIncrease {
            max_increase_percent: raw.frontage_increase.max_increase_percent,
            min_frontage_ratio: raw.frontage_increase.min_frontage_ratio,
        };
        if !frontage.max_increase_percent.is_finite() || frontage.max_increase_percent < 0.0 {
            return Err(DataError::schema(
                edition,
                "frontage_increase.max_increase_percent must be >= 0",
            ));
        }
        if !(frontage.min_frontage_ratio > 0.0 && frontage.min_frontage_ratio <= 1.0) {
            return Err(DataError::schema(
                edition,
                "frontage_increase.min_frontage_ratio must be within (0, 1]",
            ));
        }

        Ok(Self {
            edition: edition.to_string(),
            height_ft,
            stories,
            area_sqft,
            fire_resistance,
            occupant_load_factors: raw.occupant_load_factors,
            egress,
            sprinkler,
            frontage,
        })
    }

    pub fn edition(&self) -> &str {
        &self.edition
    }

    /// Whether the occupancy group has a row in the allowable tables
    pub fn has_occupancy(&self, occupancy: &str) -> bool {
        self.height_ft.contains_key(occupancy)
    }

    /// Occupancy groups covered by the allowable tables
    pub fn occupancies(&self) -> impl Iterator<Item = &str> {
        self.height_ft.keys().map(String::as_str)
    }

    pub fn height_limit_ft(&self, occupancy: &str, ct: ConstructionType) -> Option<Limit> {
        self.height_ft.get(occupancy).map(|row| row.get(ct))
    }

    pub fn stories_limit(&self, occupancy: &str, ct: ConstructionType) -> Option<Limit> {
        self.stories.get(occupancy).map(|row| row.get(ct))
    }

    pub fn area_limit_sqft(&self, occupancy: &str, ct: ConstructionType) -> Option<Limit> {
        self.area_sqft.get(occupancy).map(|row| row.get(ct))
    }

    pub fn fire_resistance(&self, ct: ConstructionType) -> &FireElements {
        &self.fire_resistance[ct as usize]
    }

    /// Square feet per occupant for a category
    pub fn occupant_load_factor(&self, category: OccupancyCategory) -> f64 {
        match self.occupant_load_factors.get(&category) {
            Some(factor) => *factor,
            None => {
                tracing::warn!(
                    %category,
                    default = DEFAULT_OCCUPANT_LOAD_FACTOR,
                    "no occupant load factor for category, using default"
                );
                DEFAULT_OCCUPANT_LOAD_FACTOR
            }
        }
    }
}

fn convert_table(
    edition: &str,
    table: &str,
    rows: &BTreeMap<String, RawRow>,
    sentinel: &str,
    whole_numbers: bool,
) -> Result<BTreeMap<String, LimitRow>, DataError> {
    if rows.is_empty() {
        return Err(DataError::schema(edition, format!("{} has no rows", table)));
    }

    let mut converted = BTreeMap::new();
    for (occupancy, row) in rows {
        if occupancy.trim().is_empty() || *occupancy != occupancy.trim().to_uppercase() {
            return Err(DataError::schema(
                edition,
                format!("{} row '{}' must be a trimmed uppercase occupancy", table, occupancy),
            ));
        }

        let mut cells = [Limit::NotPermitted; 9];
        for ct in ConstructionType::ALL {
            let at = format!("{}.{}.{}", table, occupancy, ct);
            let cell = row
                .get(&ct)
                .ok_or_else(|| DataError::schema(edition, format!("{} is missing", at)))?;
            let limit = convert_limit(edition, &at, cell, sentinel)?;
            if let Limit::Limited(value) = limit {
                if whole_numbers && value.fract() != 0.0 {
                    return Err(DataError::schema(
                        edition,
                        format!("{} must be a whole number, found {}", at, value),
                    ));
                }
            }
            cells[ct as usize] = limit;
        }
        converted.insert(occupancy.clone(), LimitRow { cells });
    }
    Ok(converted)
}

fn convert_limit(
    edition: &str,
    at: &str,
    cell: &RawCell,
    sentinel: &str,
) -> Result<Limit, DataError> {
    match cell {
        RawCell::Text(text) if text == sentinel => Ok(Limit::Unlimited),
        RawCell::Text(text) => Err(DataError::schema(
            edition,
            format!("{} has unknown value '{}'", at, text),
        )),
        RawCell::Number(n) if !n.is_finite() || *n < 0.0 => Err(DataError::schema(
            edition,
            format!("{} must be a non-negative number, found {}", at, n),
        )),
        RawCell::Number(n) if *n == 0.0 => Ok(Limit::NotPermitted),
        RawCell::Number(n) => Ok(Limit::Limited(*n)),
    }
}

fn convert_rating(edition: &str, at: &str, cell: &RawCell) -> Result<FireRating, DataError> {
    match cell {
        RawCell::Text(text) if text == HEAVY_TIMBER_SENTINEL => Ok(FireRating::HeavyTimber),
        RawCell::Number(h) if h.is_finite() && *h >= 0.0 => Ok(FireRating::Hours(*h)),
        RawCell::Text(text) => Err(DataError::schema(
            edition,
            format!("{} has unknown rating '{}'", at, text),
        )),
        RawCell::Number(h) => Err(DataError::schema(
            edition,
            format!("{} must be a non-negative hour rating, found {}", at, h),
        )),
    }
}

fn convert_fire_elements(
    edition: &str,
    ct: ConstructionType,
    raw: &RawFireElements,
) -> Result<FireElements, DataError> {
    let at = |element: &str| format!("fire_resistance_hours.{}.{}", ct, element);
    Ok(FireElements {
        structural_frame: convert_rating(edition, &at("structural_frame"), &raw.structural_frame)?,
        bearing_wall_exterior: convert_rating(
            edition,
            &at("bearing_wall_exterior"),
            &raw.bearing_wall_exterior,
        )?,
        bearing_wall_interior: convert_rating(
            edition,
            &at("bearing_wall_interior"),
            &raw.bearing_wall_interior,
        )?,
        floor: convert_rating(edition, &at("floor"), &raw.floor)?,
        roof: convert_rating(edition, &at("roof"), &raw.roof)?,
    })
}

fn require_positive(edition: &str, at: &str, value: f64) -> Result<(), DataError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DataError::schema(
            edition,
            format!("{} must be a positive number, found {}", at, value),
        ))
    }
}

fn convert_travel_distance(
    edition: &str,
    status: &str,
    by_key: &BTreeMap<String, f64>,
) -> Result<TravelDistanceLimits, DataError> {
    for (key, ft) in by_key {
        let at = format!("egress.max_travel_distance_ft.{}.{}", status, key);
        require_positive(edition, &at, *ft)?;
    }
    let fallback_ft = by_key.get(TRAVEL_DISTANCE_FALLBACK_KEY).copied().ok_or_else(|| {
        DataError::schema(
            edition,
            format!(
                "egress.max_travel_distance_ft.{} must have a '{}' row",
                status, TRAVEL_DISTANCE_FALLBACK_KEY
            ),
        )
    })?;
    Ok(TravelDistanceLimits {
        by_key: by_key.clone(),
        fallback_ft,
    })
}

fn convert_common_path(
    edition: &str,
    status: &str,
    raw: &schema::RawCommonPathGroups,
) -> Result<CommonPathLimits, DataError> {
    let at = |group: &str| format!("egress.max_common_path_ft.{}.{}", status, group);
    require_positive(edition, &at("B_F_S"), raw.business_factory_storage)?;
    require_positive(edition, &at("I-1_R"), raw.residential)?;
    require_positive(edition, &at("default"), raw.default)?;
    Ok(CommonPathLimits {
        business_factory_storage: raw.business_factory_storage,
        residential: raw.residential,
        default: raw.default,
    })
}

fn convert_egress(edition: &str, raw: &schema::RawEgress) -> Result<EgressTables, DataError> {
    let widths = &raw.exit_width_per_occupant_in;
    require_positive(edition, "egress.exit_width_per_occupant_in.stairway", widths.stairway)?;
    require_positive(edition, "egress.exit_width_per_occupant_in.other", widths.other)?;
    require_positive(edition, "egress.minimum_exit_width_in", raw.minimum_exit_width_in)?;
    let corridors = &raw.minimum_corridor_width_in;
    require_positive(
        edition,
        "egress.minimum_corridor_width_in.low_occupancy",
        corridors.low_occupancy,
    )?;
    require_positive(
        edition,
        "egress.minimum_corridor_width_in.standard",
        corridors.standard,
    )?;

    let distances = &raw.max_travel_distance_ft;
    let travel_distance = [
        convert_travel_distance(edition, "sprinklered", &distances.sprinklered)?,
        convert_travel_distance(edition, "unsprinklered", &distances.unsprinklered)?,
    ];
    let common_path = [
        convert_common_path(edition, "sprinklered", &raw.max_common_path_ft.sprinklered)?,
        convert_common_path(edition, "unsprinklered", &raw.max_common_path_ft.unsprinklered)?,
    ];

    let (open, bounded) = raw
        .exit_count_bands
        .split_last()
        .ok_or_else(|| DataError::schema(edition, "egress.exit_count_bands is empty"))?;
    if open.max_occupant_load.is_some() {
        return Err(DataError::schema(
            edition,
            "the last exit count band must have no max_occupant_load",
        ));
    }
    let mut exit_bands: Vec<(u32, u32)> = Vec::with_capacity(bounded.len());
    for band in bounded {
        let max_load = band.max_occupant_load.ok_or_else(|| {
            DataError::schema(edition, "only the last exit count band may be open-ended")
        })?;
        if let Some((previous, _)) = exit_bands.last() {
            if max_load <= *previous {
                return Err(DataError::schema(
                    edition,
                    "exit count bands must be in ascending order of max_occupant_load",
                ));
            }
        }
        exit_bands.push((max_load, band.exits));
    }
    if raw.exit_count_bands.iter().any(|band| band.exits == 0) {
        return Err(DataError::schema(
            edition,
            "exit count bands must require at least one exit",
        ));
    }

    Ok(EgressTables {
        stairway_width_per_occupant_in: widths.stairway,
        other_width_per_occupant_in: widths.other,
        minimum_exit_width_in: raw.minimum_exit_width_in,
        low_occupancy_corridor_width_in: corridors.low_occupancy,
        standard_corridor_width_in: corridors.standard,
        low_occupancy_threshold: raw.low_occupancy_threshold,
        travel_distance,
        common_path,
        exit_bands,
        open_band_exits: open.exits,
    })
}
