//! Common types and traits for carton geometry.
//!
//! This module defines the three-axis dimension type shared by items and
//! box templates, plus the small numeric helpers the optimizer relies on.

use serde::Serialize;
use utoipa::ToSchema;

/// Global numerical tolerance for floating-point comparisons.
///
/// Used for dimension and weight comparisons during catalog search.
pub const EPSILON_GENERAL: f64 = 1e-9;

/// Number of decimal places reported in results.
pub const RESULT_DECIMALS: i32 = 2;

/// Represents the length, width and height of an item or carton in inches.
///
/// # Examples
/// ```
/// use carton_pack::types::Dims;
///
/// let dims = Dims::new(10.0, 8.0, 4.0);
/// assert_eq!(dims.volume(), 320.0);
/// assert_eq!(dims.length_plus_girth(), 34.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct Dims {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dims {
    /// Creates a new dimension triple.
    #[inline]
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Creates a zero-sized dimension triple.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Creates a cube with the given side.
    #[inline]
    pub const fn cube(side: f64) -> Self {
        Self::new(side, side, side)
    }

    /// Calculates the volume (product of all components).
    #[inline]
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Largest of the three components.
    #[inline]
    pub fn largest(&self) -> f64 {
        self.length.max(self.width).max(self.height)
    }

    /// Returns the components sorted in descending order.
    ///
    /// Orientation is irrelevant for fit and girth checks, so both compare
    /// sorted triples.
    #[inline]
    pub fn sorted_desc(&self) -> [f64; 3] {
        let mut dims = [self.length, self.width, self.height];
        dims.sort_by(|a, b| b.total_cmp(a));
        dims
    }

    /// Carrier "length plus girth": longest side plus twice the other two.
    #[inline]
    pub fn length_plus_girth(&self) -> f64 {
        let [l, w, h] = self.sorted_desc();
        l + 2.0 * (w + h)
    }

    /// Checks whether `self` fits inside `container` in some axis permutation.
    ///
    /// # Parameters
    /// * `container` - The outer dimensions (e.g. a box template)
    /// * `tolerance` - Numerical tolerance for the comparison
    #[inline]
    pub fn fits_rotated_within(&self, container: &Self, tolerance: f64) -> bool {
        let inner = self.sorted_desc();
        let outer = container.sorted_desc();
        inner
            .iter()
            .zip(outer.iter())
            .all(|(i, o)| *i <= *o + tolerance)
    }

    /// Per-axis maximum of two triples.
    #[inline]
    pub fn max_per_axis(&self, other: &Self) -> Self {
        Self::new(
            self.length.max(other.length),
            self.width.max(other.width),
            self.height.max(other.height),
        )
    }

    /// Applies result rounding to every component.
    #[inline]
    pub fn rounded(&self) -> Self {
        Self::new(
            round2(self.length),
            round2(self.width),
            round2(self.height),
        )
    }
}

/// Trait for objects with three-axis dimensions.
pub trait Dimensional {
    /// Returns the dimensions of the object.
    fn dimensions(&self) -> Dims;

    /// Calculates the volume.
    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }

    /// Carrier length plus girth, independent of orientation.
    fn length_plus_girth(&self) -> f64 {
        self.dimensions().length_plus_girth()
    }
}

/// Trait for objects with a weight in pounds.
pub trait Weighted {
    fn weight(&self) -> f64;
}

/// Rounds a value to [`RESULT_DECIMALS`] decimal places.
///
/// ```
/// use carton_pack::types::round2;
///
/// assert_eq!(round2(133.3333), 133.33);
/// assert_eq!(round2(2.005_000_1), 2.01);
/// ```
#[inline]
pub fn round2(value: f64) -> f64 {
    let factor = 10f64.powi(RESULT_DECIMALS);
    (value * factor).round() / factor
}

/// Validation functions shared by request parsing.
pub mod validation {
    use crate::model::ValidationError;

    /// Validates a quantity that may be zero but must be finite and non-negative.
    ///
    /// # Parameters
    /// * `value` - The value to validate
    /// * `name` - Name of the field for error messages
    pub fn validate_non_negative(value: f64, name: &str) -> Result<(), ValidationError> {
        if value.is_nan() {
            return Err(ValidationError::InvalidDimension(format!(
                "{} must not be NaN",
                name
            )));
        }
        if value.is_infinite() {
            return Err(ValidationError::InvalidDimension(format!(
                "{} must not be infinite",
                name
            )));
        }
        if value < 0.0 {
            return Err(ValidationError::InvalidDimension(format!(
                "{} must not be negative, got: {}",
                name, value
            )));
        }
        Ok(())
    }

    /// Validates a weight value in pounds.
    pub fn validate_weight(value: f64) -> Result<(), ValidationError> {
        validate_non_negative(value, "Weight")
            .map_err(|err| ValidationError::InvalidWeight(err.detail().to_string()))
    }

    /// Validates a limit that must be strictly positive (config overrides).
    pub fn validate_positive_limit(value: f64, name: &str) -> Result<(), ValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::InvalidConfiguration(format!(
                "{} must be a positive number, got: {}",
                name, value
            )));
        }
        Ok(())
    }
}
