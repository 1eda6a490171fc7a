pub mod audit;
pub mod classification;
pub mod types;

pub use classification::{ConstructionType, OccupancyCategory};
pub use types::{
    Allowance, AreaCheck, BuildingData, CheckKind, CheckStatus, ComplianceReport,
    CommonPathCheck, CorridorCheck, DesignInput, EgressInput, EgressReport, EgressStatus,
    ExitCountCheck, ExitWidthCheck, FireRating, FireResistance, HeightCheck, Issue, Measure,
    MeasuredEntry, OccupantLoad, OccupantLoadSource, ResolvedKeys, StoryLimit,
    TravelDistanceCheck,
};
