//! Data model for the container loading estimator.
//!
//! This module defines the core data structures shared by the estimator and
//! the REST API:
//! - `Dimensions`: a cargo or container extent in centimeters
//! - `CargoSpec`: the single homogeneous box type being loaded
//! - `CalculationSettings`: the two user-tunable caps
//! - `PackedItem` / `CalculationResult`: the estimator's output
//! - `LoadSummary`: the figures handed to the advisory-text service
//!
//! Validation lives here, at the boundary; the estimator itself assumes
//! positive, finite inputs (see `estimator`).

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::catalog::ContainerSpec;

/// Validation error for cargo data supplied by a caller.
#[derive(Debug, Clone)]
pub enum ValidationError {
    InvalidDimension(String),
    InvalidWeight(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
            ValidationError::InvalidWeight(msg) => write!(f, "Invalid weight: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Helper function to validate a single dimension (DRY principle).
fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

/// Helper function to validate a per-unit weight (DRY principle).
fn validate_weight_value(value: f64) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidWeight(format!(
            "Weight must be positive, got: {}",
            value
        )));
    }
    Ok(())
}

/// An extent in 3D space, in centimeters.
///
/// There is no ordering invariant between the axes; callers may present any
/// axis as "length". The estimator decides the horizontal orientation itself.
///
/// # Fields
/// * `length` - Extent along the container's long axis (cm)
/// * `width` - Extent across the container (cm)
/// * `height` - Vertical extent (cm)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Calculates the volume of the extent.
    ///
    /// # Returns
    /// The volume in cubic centimeters
    pub fn volume_cm3(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// The single box type being loaded (homogeneous cargo).
///
/// # Fields
/// * `dimensions` - Box dimensions in cm
/// * `weight` - Weight per unit in kg
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CargoSpec {
    pub dimensions: Dimensions,
    pub weight: f64,
}

impl CargoSpec {
    /// Creates a new cargo spec with validation.
    ///
    /// # Parameters
    /// * `dimensions` - Box dimensions in cm
    /// * `weight` - Weight per unit in kg
    ///
    /// # Returns
    /// `Ok(CargoSpec)` for positive, finite values, otherwise
    /// `Err(ValidationError)`. The estimator is undefined on non-positive
    /// inputs, so every caller must go through this constructor.
    pub fn new(dimensions: Dimensions, weight: f64) -> Result<Self, ValidationError> {
        validate_dimension(dimensions.length, "Length")?;
        validate_dimension(dimensions.width, "Width")?;
        validate_dimension(dimensions.height, "Height")?;
        validate_weight_value(weight)?;
        Ok(Self { dimensions, weight })
    }

    /// Volume of one unit in cubic centimeters.
    pub fn volume_cm3(&self) -> f64 {
        self.dimensions.volume_cm3()
    }
}

/// The two user-tunable caps applied during packing.
///
/// # Fields
/// * `space_utilization` - Soft volume cap as an integer percentage of the
///   container's geometric inner volume, in [50, 100]
/// * `max_weight_limit` - Weight ceiling in tons, at or below the container's
///   physical rating
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalculationSettings {
    pub space_utilization: u8,
    pub max_weight_limit: f64,
}

impl CalculationSettings {
    pub const DEFAULT_SPACE_UTILIZATION: u8 = 95;
    pub const MIN_SPACE_UTILIZATION: u8 = 50;
    pub const MAX_SPACE_UTILIZATION: u8 = 100;

    /// Default settings for a container: 95% utilization and the container's
    /// full weight allowance. Switching the container type resets the weight
    /// cap through this function.
    pub fn for_container(container: &ContainerSpec) -> Self {
        Self {
            space_utilization: Self::DEFAULT_SPACE_UTILIZATION,
            max_weight_limit: container.max_weight_tons(),
        }
    }

    /// Normalizes the settings against a container: utilization into
    /// [50, 100], weight cap into [0, container max tons].
    pub fn clamped_for(self, container: &ContainerSpec) -> Self {
        Self {
            space_utilization: self
                .space_utilization
                .clamp(Self::MIN_SPACE_UTILIZATION, Self::MAX_SPACE_UTILIZATION),
            max_weight_limit: self.max_weight_limit.clamp(0.0, container.max_weight_tons()),
        }
    }
}

/// One placed box instance, in the renderer's coordinate frame.
///
/// The frame is container-local: the container is centered on the horizontal
/// plane, the floor sits at height zero, X runs along the container length,
/// Y points up and Z runs across the width. All components are meters.
///
/// `size` is always the box's raw length/height/width; a 90° rotation about
/// the vertical axis (the second Euler angle) conveys a reoriented footprint,
/// never a dimension swap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct PackedItem {
    #[schema(value_type = [f64; 3], example = json!([-5.515, 0.5, -0.675]))]
    pub position: (f64, f64, f64),
    #[schema(value_type = [f64; 3], example = json!([0.0, 0.0, 0.0]))]
    pub rotation: (f64, f64, f64),
    #[schema(value_type = [f64; 3], example = json!([1.0, 1.0, 1.0]))]
    pub size: (f64, f64, f64),
}

/// Result of one packing estimation, recomputed from scratch per request.
///
/// # Fields
/// * `total_count` - Number of boxes placed
/// * `total_weight` - Packed weight in kg (count × unit weight)
/// * `total_volume` - Packed volume in m³ (count × unit volume)
/// * `weight_utilization_percent` - Against the container's *physical* weight
///   rating, not the user's cap; never clamped
/// * `volume_utilization_percent` - Against the container's *declared* volume,
///   not its geometric inner volume; may exceed 100 and is never clamped
/// * `packed_items` - Placement order, stable for deterministic rendering
/// * `container` - The input container, carried through for display
/// * `fit_by_weight` - True when the packed weight is within one unit weight
///   of the user's weight cap, i.e. the cap was the binding constraint
/// * `fit_by_volume` - Defined as the negation of `fit_by_weight`
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CalculationResult {
    pub total_count: usize,
    pub total_weight: f64,
    pub total_volume: f64,
    pub weight_utilization_percent: f64,
    pub volume_utilization_percent: f64,
    pub packed_items: Vec<PackedItem>,
    pub container: ContainerSpec,
    pub fit_by_weight: bool,
    pub fit_by_volume: bool,
}

impl CalculationResult {
    /// Summary figures for the advisory-text service.
    pub fn summary(&self) -> LoadSummary {
        LoadSummary::from(self)
    }
}

/// The figures handed to the advisory-text service.
///
/// This is the entire contract of that boundary: the service sees aggregate
/// numbers only, never the item list.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "container_name": "40尺高柜 (40HQ)",
        "total_count": 63,
        "total_weight": 18900.0,
        "max_weight": 26000.0,
        "total_volume": 60.48,
        "max_volume": 76.1,
        "weight_utilization_percent": 72.7,
        "volume_utilization_percent": 79.5
    })
)]
pub struct LoadSummary {
    pub container_name: String,
    pub total_count: usize,
    pub total_weight: f64,
    pub max_weight: f64,
    pub total_volume: f64,
    pub max_volume: f64,
    pub weight_utilization_percent: f64,
    pub volume_utilization_percent: f64,
}

impl From<&CalculationResult> for LoadSummary {
    fn from(result: &CalculationResult) -> Self {
        Self {
            container_name: result.container.name.to_string(),
            total_count: result.total_count,
            total_weight: result.total_weight,
            max_weight: result.container.max_weight,
            total_volume: result.total_volume,
            max_volume: result.container.volume,
            weight_utilization_percent: result.weight_utilization_percent,
            volume_utilization_percent: result.volume_utilization_percent,
        }
    }
}
