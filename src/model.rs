//! Data models for carton selection.
//!
//! This module defines the fundamental data structures:
//! - `Item`: A shipment line with quantity, unit weight and optional unit dimensions
//! - `BoxTemplate`: A standard carton from the static catalog
//! - `SizeClass`: The size family a template belongs to
//!
//! Items are caller-owned input; templates are immutable catalog data.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Dimensional, Dims, Weighted, validation};

/// Validation error for request data.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ValidationError {
    /// Message without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            ValidationError::InvalidDimension(msg)
            | ValidationError::InvalidWeight(msg)
            | ValidationError::InvalidConfiguration(msg) => msg,
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// A shippable line item.
///
/// Dimensions are per unit and only count toward volume when all three are
/// present and positive. Weight is per unit.
///
/// # Fields
/// * `quantity` - Number of identical units (default 1)
/// * `weight_lbs` - Weight per unit in lb (default 0)
/// * `length`, `width`, `height` - Optional unit dimensions in inches
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "quantity": 2,
    "weightLbs": 5.0,
    "length": 10.0,
    "width": 8.0,
    "height": 4.0
}))]
pub struct Item {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, alias = "weight_lbs")]
    pub weight_lbs: f64,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            quantity: default_quantity(),
            weight_lbs: 0.0,
            length: None,
            width: None,
            height: None,
        }
    }
}

impl Item {
    /// Creates an item with full unit dimensions.
    ///
    /// # Examples
    /// ```
    /// use carton_pack::model::Item;
    ///
    /// let item = Item::new(3, 2.5, (10.0, 8.0, 4.0));
    /// assert_eq!(item.total_weight(), 7.5);
    /// assert_eq!(item.total_volume(), 960.0);
    /// ```
    pub fn new(quantity: u32, weight_lbs: f64, dims: (f64, f64, f64)) -> Self {
        Self {
            quantity,
            weight_lbs,
            length: Some(dims.0),
            width: Some(dims.1),
            height: Some(dims.2),
        }
    }

    /// Creates an item that carries weight only.
    pub fn weight_only(quantity: u32, weight_lbs: f64) -> Self {
        Self {
            quantity,
            weight_lbs,
            ..Self::default()
        }
    }

    /// Unit dimensions, only when all three are present and positive.
    pub fn unit_dims(&self) -> Option<Dims> {
        match (self.length, self.width, self.height) {
            (Some(l), Some(w), Some(h)) if l > 0.0 && w > 0.0 && h > 0.0 => {
                Some(Dims::new(l, w, h))
            }
            _ => None,
        }
    }

    /// Known unit dimensions per axis; missing axes count as zero.
    ///
    /// Used for the single-largest-item envelope, which takes whatever axes
    /// the caller supplied.
    pub fn known_dims(&self) -> Dims {
        Dims::new(
            self.length.unwrap_or(0.0),
            self.width.unwrap_or(0.0),
            self.height.unwrap_or(0.0),
        )
    }

    /// Weight of all units in lb.
    pub fn total_weight(&self) -> f64 {
        self.weight_lbs * f64::from(self.quantity)
    }

    /// Volume of all units, zero when any dimension is missing.
    pub fn total_volume(&self) -> f64 {
        self.unit_dims()
            .map(|dims| dims.volume() * f64::from(self.quantity))
            .unwrap_or(0.0)
    }

    /// Rejects negative, NaN or infinite numbers.
    ///
    /// The packer itself never validates; this runs at the HTTP boundary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_weight(self.weight_lbs)?;
        for (value, name) in [
            (self.length, "Length"),
            (self.width, "Width"),
            (self.height, "Height"),
        ] {
            if let Some(value) = value {
                validation::validate_non_negative(value, name)?;
            }
        }
        Ok(())
    }
}

impl Weighted for Item {
    fn weight(&self) -> f64 {
        self.total_weight()
    }
}

/// Size family of a catalog template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    #[serde(rename = "XL")]
    ExtraLarge,
    #[serde(rename = "XXL")]
    DoubleExtraLarge,
}

/// Standard carton template.
///
/// # Fields
/// * `code` - Unique identifier (e.g. `M2`)
/// * `name` - Display name
/// * `class` - Size family
/// * `dims` - Inside dimensions in inches
/// * `max_weight` - Weight capacity in lb
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoxTemplate {
    #[schema(value_type = String, example = "M2")]
    pub code: &'static str,
    #[schema(value_type = String)]
    pub name: &'static str,
    pub class: SizeClass,
    pub dims: Dims,
    pub max_weight: f64,
}

impl BoxTemplate {
    pub const fn new(
        code: &'static str,
        name: &'static str,
        class: SizeClass,
        dims: (f64, f64, f64),
        max_weight: f64,
    ) -> Self {
        Self {
            code,
            name,
            class,
            dims: Dims::new(dims.0, dims.1, dims.2),
            max_weight,
        }
    }

    /// Checks whether an item envelope fits in any orientation.
    pub fn fits_item(&self, item_dims: &Dims) -> bool {
        item_dims.fits_rotated_within(&self.dims, crate::types::EPSILON_GENERAL)
    }
}

impl Dimensional for BoxTemplate {
    fn dimensions(&self) -> Dims {
        self.dims
    }
}
