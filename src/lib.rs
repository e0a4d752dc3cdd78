//! Carton selection for shipping-rate quotes.
//!
//! Given shipment lines with quantity, weight and optional dimensions, the
//! optimizer picks a standard carton and a box count that respect carrier
//! weight and length-plus-girth limits, and reports per-box weight and
//! dimensions for rate requests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod model;
pub mod optimizer;
pub mod types;

pub use model::Item;
pub use optimizer::{PackingConfig, PackingResult, Strategy, pack};
