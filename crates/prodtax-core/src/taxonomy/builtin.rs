//! Compiled-in domain vocabulary.
//!
//! Changing anything here changes classifier output, so the tables are
//! versioned together with the classifier and covered by its tests.

use crate::error::Result;
use crate::models::ProductCategory;

use super::{CategorySpec, Taxonomy, TaxonomyBuilder};

/// Robot model tokens: `TM-850`, `RLM-1200`, `DR-500`.
pub const ROBOT_PATTERN: &str = r"(?:TM|RLM|DR)-?[0-9]{3,4}[A-Z]{0,2}";
pub const ROBOT_SERIES: &[&str] = &["TM", "RLM", "DR"];

/// OPE model tokens: `DCS-5000`, `DTT-2100`, `DHCAS-2600HD`, `LBP-560`, `CS-3510`.
///
/// `DR-500` matches this pattern as well as [`ROBOT_PATTERN`]; taxonomy order
/// resolves it to robot.
pub const OPE_PATTERN: &str = r"(?:D[A-Z]{0,4}|LBP|LCJQ|CS|SRM|PB|HCA)-[0-9]{3,4}[A-Z]{0,3}";
pub const OPE_SERIES: &[&str] = &["D", "LBP", "LCJQ", "CS", "SRM", "PB", "HCA"];

/// ERCO model tokens: `ER-250`, `EH-40`, `EV-1800X`.
pub const ERCO_PATTERN: &str = r"(?:ER|EH|EV)-[0-9]{2,4}[A-Z]{0,2}";
pub const ERCO_SERIES: &[&str] = &["ER", "EH", "EV"];

pub const ROBOT_PATH_MARKERS: &[&str] = &["robot", "/robot-", "\\robot-"];
pub const OPE_PATH_MARKERS: &[&str] = &["ope-", "/ope-", "\\ope-"];
pub const ERCO_PATH_MARKERS: &[&str] = &["erco-", "/erco-", "\\erco-"];

pub const ROBOT_QUERY_KEYWORDS: &[&str] = &[
    "robot",
    "robots",
    "robotic",
    "roboter",
    "mähroboter",
    "robot mower",
];

pub const OPE_QUERY_KEYWORDS: &[&str] = &[
    "ope",
    "outdoor power equipment",
    "chainsaw",
    "chainsaws",
    "kettensäge",
    "trimmer",
    "hedge trimmer",
    "heckenschere",
    "blower",
    "leaf blower",
    "laubbläser",
];

pub const ERCO_QUERY_KEYWORDS: &[&str] = &["erco"];

/// OPE series that only ship battery-powered.
pub const BATTERY_SERIES_OVERRIDES: &[&str] = &["D", "LBP", "LCJQ"];

pub const BATTERY_KEYWORDS: &[&str] = &[
    "battery",
    "batteries",
    "akku",
    "accu",
    "li-ion",
    "lithium",
    "cordless",
    "rechargeable",
    "charger",
    "charging",
    "ladegerät",
];

pub const FUEL_KEYWORDS: &[&str] = &[
    "fuel",
    "petrol",
    "gasoline",
    "benzin",
    "kraftstoff",
    "2-stroke",
    "two-stroke",
    "4-stroke",
    "four-stroke",
    "spark plug",
    "zündkerze",
    "carburetor",
    "vergaser",
    "engine oil",
];

/// Filename fragments that mark a document as general knowledge.
pub const GENERAL_FILENAME_MARKERS: &[&str] = &["general", "overview"];

/// Build the compiled-in taxonomy.
pub fn taxonomy() -> Result<Taxonomy> {
    TaxonomyBuilder::new()
        .category(
            CategorySpec::new(ProductCategory::Robot, ROBOT_PATTERN)
                .with_series(ROBOT_SERIES.iter().copied())
                .with_path_markers(ROBOT_PATH_MARKERS.iter().copied())
                .with_query_keywords(ROBOT_QUERY_KEYWORDS.iter().copied()),
        )
        .category(
            CategorySpec::new(ProductCategory::Ope, OPE_PATTERN)
                .with_series(OPE_SERIES.iter().copied())
                .with_path_markers(OPE_PATH_MARKERS.iter().copied())
                .with_query_keywords(OPE_QUERY_KEYWORDS.iter().copied()),
        )
        .category(
            CategorySpec::new(ProductCategory::Erco, ERCO_PATTERN)
                .with_series(ERCO_SERIES.iter().copied())
                .with_path_markers(ERCO_PATH_MARKERS.iter().copied())
                .with_query_keywords(ERCO_QUERY_KEYWORDS.iter().copied()),
        )
        .battery_series_overrides(BATTERY_SERIES_OVERRIDES.iter().copied())
        .battery_keywords(BATTERY_KEYWORDS.iter().copied())
        .fuel_keywords(FUEL_KEYWORDS.iter().copied())
        .general_filename_markers(GENERAL_FILENAME_MARKERS.iter().copied())
        .build()
}
