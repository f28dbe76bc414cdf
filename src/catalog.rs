//! The fixed catalog of supported shipping containers.
//!
//! Exactly three standard dry containers are offered: 20GP, 40GP and 40HQ.
//! Each entry carries inner dimensions in cm, the physical payload rating in
//! kg and the declared (published) volume in m³. The declared volume is the
//! industry figure and differs slightly from the product of the inner
//! dimensions; utilization percentages are reported against the declared
//! figure while the packing volume cap works on the geometric one.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::Dimensions;

/// Identifier for a catalog container size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ContainerType {
    #[serde(rename = "20GP")]
    Gp20,
    #[serde(rename = "40GP")]
    Gp40,
    #[serde(rename = "40HQ")]
    Hq40,
}

impl ContainerType {
    /// All catalog entries, in display order.
    pub const ALL: [ContainerType; 3] = [ContainerType::Gp20, ContainerType::Gp40, ContainerType::Hq40];

    /// Short wire code, matching the JSON representation.
    pub fn code(&self) -> &'static str {
        match self {
            ContainerType::Gp20 => "20GP",
            ContainerType::Gp40 => "40GP",
            ContainerType::Hq40 => "40HQ",
        }
    }
}

impl std::fmt::Display for ContainerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One catalog container with its limits.
///
/// # Fields
/// * `id` - Catalog identifier
/// * `name` - Display name (Chinese with the size code in parentheses)
/// * `inner` - Inner dimensions in cm
/// * `max_weight` - Physical payload rating in kg
/// * `volume` - Declared volume in m³
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct ContainerSpec {
    pub id: ContainerType,
    #[schema(value_type = String, example = "40尺平柜 (40GP)")]
    pub name: &'static str,
    pub inner: Dimensions,
    pub max_weight: f64,
    pub volume: f64,
}

impl ContainerSpec {
    /// The physical weight rating expressed in tons.
    pub fn max_weight_tons(&self) -> f64 {
        self.max_weight / 1000.0
    }
}

static CATALOG: [ContainerSpec; 3] = [
    ContainerSpec {
        id: ContainerType::Gp20,
        name: "20尺平柜 (20GP)",
        inner: Dimensions {
            length: 589.0,
            width: 235.0,
            height: 239.0,
        },
        max_weight: 28_000.0,
        volume: 33.1,
    },
    ContainerSpec {
        id: ContainerType::Gp40,
        name: "40尺平柜 (40GP)",
        inner: Dimensions {
            length: 1203.0,
            width: 235.0,
            height: 239.0,
        },
        max_weight: 26_000.0,
        volume: 67.5,
    },
    ContainerSpec {
        id: ContainerType::Hq40,
        name: "40尺高柜 (40HQ)",
        inner: Dimensions {
            length: 1203.0,
            width: 235.0,
            height: 269.0,
        },
        max_weight: 26_000.0,
        volume: 76.1,
    },
];

/// Looks up the catalog entry for a container type.
pub fn spec(id: ContainerType) -> &'static ContainerSpec {
    match id {
        ContainerType::Gp20 => &CATALOG[0],
        ContainerType::Gp40 => &CATALOG[1],
        ContainerType::Hq40 => &CATALOG[2],
    }
}

/// The complete catalog, in display order.
pub fn all() -> &'static [ContainerSpec] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_three_entries_in_display_order() {
        let entries = all();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id, ContainerType::Gp20);
        assert_eq!(entries[1].id, ContainerType::Gp40);
        assert_eq!(entries[2].id, ContainerType::Hq40);
    }

    #[test]
    fn lookup_returns_the_matching_entry() {
        for id in ContainerType::ALL {
            assert_eq!(spec(id).id, id);
        }
    }

    #[test]
    fn high_cube_differs_from_standard_only_in_height() {
        let gp = spec(ContainerType::Gp40);
        let hq = spec(ContainerType::Hq40);
        assert_eq!(gp.inner.length, hq.inner.length);
        assert_eq!(gp.inner.width, hq.inner.width);
        assert_eq!(gp.inner.height, 239.0);
        assert_eq!(hq.inner.height, 269.0);
        assert_eq!(gp.max_weight, hq.max_weight);
    }

    #[test]
    fn twenty_foot_carries_the_highest_weight_rating() {
        assert_eq!(spec(ContainerType::Gp20).max_weight, 28_000.0);
        assert_eq!(spec(ContainerType::Gp20).max_weight_tons(), 28.0);
        assert_eq!(spec(ContainerType::Gp40).max_weight_tons(), 26.0);
    }

    #[test]
    fn declared_volume_is_not_the_geometric_volume() {
        // 40GP: 1203 × 235 × 239 cm ≈ 67.57 m³, declared 67.5 m³. Both
        // figures are load-bearing and must not be conflated.
        let gp40 = spec(ContainerType::Gp40);
        let geometric_m3 = gp40.inner.volume_cm3() / 1_000_000.0;
        assert!(geometric_m3 > gp40.volume);
        assert!((geometric_m3 - gp40.volume).abs() < 0.1);
    }

    #[test]
    fn wire_codes_round_trip_through_json() {
        for id in ContainerType::ALL {
            let encoded = serde_json::to_string(&id).unwrap();
            assert_eq!(encoded, format!("\"{}\"", id.code()));
            let decoded: ContainerType = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, id);
        }
    }
}
