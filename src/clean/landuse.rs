use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Closed set of building/land-use categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandUse {
    Church,
    Residential,
    Parking,
    Commercial,
    Education,
    Industrial,
    Agriculture,
    Service,
    Other,
}

impl LandUse {
    pub const ALL: [LandUse; 9] = [
        LandUse::Church,
        LandUse::Residential,
        LandUse::Parking,
        LandUse::Commercial,
        LandUse::Education,
        LandUse::Industrial,
        LandUse::Agriculture,
        LandUse::Service,
        LandUse::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandUse::Church => "church",
            LandUse::Residential => "residential",
            LandUse::Parking => "parking",
            LandUse::Commercial => "commercial",
            LandUse::Education => "education",
            LandUse::Industrial => "industrial",
            LandUse::Agriculture => "agriculture",
            LandUse::Service => "service",
            LandUse::Other => "other",
        }
    }
}

impl fmt::Display for LandUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn default_land_use_table() -> BTreeMap<String, LandUse> {
    use LandUse::*;

    [
        ("chapel", Church),
        ("condominium", Residential),
        ("dormitory", Residential),
        ("garage", Parking),
        ("garages", Parking),
        ("store", Commercial),
        ("house", Residential),
        ("motel", Commercial),
        ("hotel", Commercial),
        ("restaurant", Commercial),
        ("shopping_center", Commercial),
        ("retail", Commercial),
        ("kindergarten", Education),
        ("school", Education),
        ("college", Education),
        ("university", Education),
        ("warehouse", Industrial),
        ("silo", Industrial),
        ("storage_tank", Industrial),
        ("manufacture", Industrial),
        ("supermarket", Commercial),
        ("pumping_station", Commercial),
        ("greenhouse", Agriculture),
        ("farm", Agriculture),
        ("train_station", Service),
        ("Middle_School", Education),
        ("athletic_club", Commercial),
        ("hospital", Service),
        ("apartments", Residential),
    ]
    .into_iter()
    .map(|(value, category)| (value.to_string(), category))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandUseTable {
    categories: BTreeMap<String, LandUse>,
}

impl Default for LandUseTable {
    fn default() -> Self {
        LandUseTable::new(default_land_use_table())
    }
}

impl LandUseTable {
    pub fn new(categories: BTreeMap<String, LandUse>) -> Self {
        LandUseTable { categories }
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.categories.contains_key(raw)
    }

    /// Exact, case-sensitive lookup; unlisted values become [`LandUse::Other`].
    pub fn normalize(&self, raw: &str) -> LandUse {
        self.categories.get(raw).copied().unwrap_or(LandUse::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_listed_values() {
        let table = LandUseTable::default();
        assert_eq!(table.normalize("dormitory"), LandUse::Residential);
        assert_eq!(table.normalize("chapel"), LandUse::Church);
        assert_eq!(table.normalize("Middle_School"), LandUse::Education);
        assert_eq!(table.normalize("greenhouse").to_string(), "agriculture");
    }

    #[test]
    fn unlisted_values_are_other() {
        let table = LandUseTable::default();
        for raw in ["spaceship", "yes", "", "House", "middle_school"] {
            assert!(!table.contains(raw));
            assert_eq!(table.normalize(raw), LandUse::Other);
        }
    }

    #[test]
    fn categories_deserialize_from_lowercase_names() {
        let parsed: BTreeMap<String, LandUse> =
            serde_json::from_str(r#"{"barn": "agriculture", "shed": "other"}"#).unwrap();
        assert_eq!(parsed["barn"], LandUse::Agriculture);
        assert!(serde_json::from_str::<LandUse>(r#""spaceport""#).is_err());
        for category in LandUse::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{category}\""));
        }
    }
}
