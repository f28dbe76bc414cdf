//! Packing estimation for homogeneous cargo in a single container.
//!
//! This module implements a deterministic grid estimator: one box type,
//! axis-aligned placement, no stacking heuristics. It answers the
//! forwarding question "how many of these cartons go into that container"
//! while producing renderable placements:
//! - two horizontal orientations are tried and the fuller one wins
//! - per-axis counts come from independent floor divisions
//! - a volume cap (percentage of geometric inner volume) and a weight cap
//!   (user tonnage) bound the count
//! - every placement carries center position, Euler rotation and raw size
//!   in meters for the 3D view
//!
//! Arithmetic stays in centimeters until a placement is emitted; each
//! coordinate is divided by 100 exactly once.

use std::f64::consts::FRAC_PI_2;

use crate::catalog::ContainerSpec;
use crate::model::{CalculationResult, CalculationSettings, CargoSpec, PackedItem};

const CM_PER_M: f64 = 100.0;
const KG_PER_TON: f64 = 1000.0;
const CM3_PER_M3: f64 = 1_000_000.0;

/// Which cargo axis runs along the container's length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Orientation {
    /// Cargo length along container length (unrotated).
    LengthAligned,
    /// Cargo width along container length (90° about the vertical axis).
    WidthAligned,
}

impl Orientation {
    /// Effective footprint (along length, across width) in cm.
    fn footprint(self, cargo: &CargoSpec) -> (f64, f64) {
        match self {
            Orientation::LengthAligned => (cargo.dimensions.length, cargo.dimensions.width),
            Orientation::WidthAligned => (cargo.dimensions.width, cargo.dimensions.length),
        }
    }

    /// Rotation about the vertical axis handed to the renderer.
    fn yaw(self) -> f64 {
        match self {
            Orientation::LengthAligned => 0.0,
            Orientation::WidthAligned => FRAC_PI_2,
        }
    }
}

/// Runs one packing estimation.
///
/// Both orientations are packed in full and the one with more boxes is kept;
/// on a tie the unrotated arrangement wins, so a square footprint never
/// reports a spurious rotation.
///
/// The function is pure: no clamping, no validation, no shared state. Inputs
/// must already be validated (`CargoSpec::new`) and normalized
/// (`CalculationSettings::clamped_for`).
///
/// # Parameters
/// * `container` - Catalog entry to load
/// * `cargo` - The box type being loaded
/// * `settings` - Volume and weight caps, already normalized
///
/// # Returns
/// The counts, utilization figures and placement list for the fuller
/// orientation.
pub fn compute(
    container: &ContainerSpec,
    cargo: &CargoSpec,
    settings: &CalculationSettings,
) -> CalculationResult {
    let pack_a = pack_grid(container, cargo, settings, Orientation::LengthAligned);
    let pack_b = pack_grid(container, cargo, settings, Orientation::WidthAligned);

    let packed_items = if pack_b.len() > pack_a.len() {
        pack_b
    } else {
        pack_a
    };

    let total_count = packed_items.len();
    let total_weight = total_count as f64 * cargo.weight;
    let total_volume = total_count as f64 * cargo.volume_cm3() / CM3_PER_M3;
    let allowed_weight = settings.max_weight_limit * KG_PER_TON;

    // Within one unit weight of the cap means another box would have been
    // placed if weight allowed it: the weight cap was the binding constraint.
    let fit_by_weight = total_weight >= allowed_weight - cargo.weight;

    CalculationResult {
        total_count,
        total_weight,
        total_volume,
        weight_utilization_percent: total_weight / container.max_weight * 100.0,
        volume_utilization_percent: total_volume / container.volume * 100.0,
        packed_items,
        container: *container,
        fit_by_weight,
        fit_by_volume: !fit_by_weight,
    }
}

/// Packs one orientation and returns the placements in scan order.
///
/// The grid is walked height-major: layers bottom to top, rows across the
/// width within a layer, cells along the length within a row. A cell whose
/// placement would break a cap is skipped, not a loop exit; with one cargo
/// type the caps depend only on the running count, so a tripped cap skips
/// every later cell and the result is a prefix of the scan order.
fn pack_grid(
    container: &ContainerSpec,
    cargo: &CargoSpec,
    settings: &CalculationSettings,
    orientation: Orientation,
) -> Vec<PackedItem> {
    let inner = container.inner;
    let (step_l, step_w) = orientation.footprint(cargo);
    let step_h = cargo.dimensions.height;

    let count_l = grid_count(inner.length, step_l);
    let count_w = grid_count(inner.width, step_w);
    let count_h = grid_count(inner.height, step_h);

    let unit_volume = cargo.volume_cm3();
    let volume_cap = inner.volume_cm3() * f64::from(settings.space_utilization) / 100.0;
    let weight_cap = settings.max_weight_limit * KG_PER_TON;

    // Container centered on the horizontal plane, floor at height zero.
    let origin_l = -inner.length / 2.0;
    let origin_w = -inner.width / 2.0;

    // The reported size is always the raw extent; the yaw angle alone
    // conveys a reoriented footprint.
    let size = (
        cargo.dimensions.length / CM_PER_M,
        cargo.dimensions.height / CM_PER_M,
        cargo.dimensions.width / CM_PER_M,
    );
    let yaw = orientation.yaw();

    let mut items = Vec::new();
    for layer in 0..count_h {
        for row in 0..count_w {
            for cell in 0..count_l {
                let next = (items.len() + 1) as f64;
                if next * unit_volume > volume_cap {
                    continue;
                }
                if next * cargo.weight > weight_cap {
                    continue;
                }

                let center_l = origin_l + cell as f64 * step_l + step_l / 2.0;
                let center_h = layer as f64 * step_h + step_h / 2.0;
                let center_w = origin_w + row as f64 * step_w + step_w / 2.0;

                items.push(PackedItem {
                    position: (
                        center_l / CM_PER_M,
                        center_h / CM_PER_M,
                        center_w / CM_PER_M,
                    ),
                    rotation: (0.0, yaw, 0.0),
                    size,
                });
            }
        }
    }

    items
}

/// How many whole steps of `step` fit into `extent`.
fn grid_count(extent: f64, step: f64) -> usize {
    (extent / step).floor() as usize
}
