//! Static catalog of standard shipping cartons.
//!
//! Templates are declared in ascending size order. The order matters: it is
//! the iteration order of every catalog search in the optimizer.

use crate::model::{BoxTemplate, SizeClass};
use crate::types::Dimensional;

/// Weight ceiling shared by every catalog carton, in lb.
pub const CATALOG_MAX_WEIGHT: f64 = 150.0;

/// All standard cartons, smallest first.
pub static BOX_CATALOG: [BoxTemplate; 12] = [
    carton("S1", "Small 8x6x4", SizeClass::Small, (8.0, 6.0, 4.0)),
    carton("S2", "Small 10x8x6", SizeClass::Small, (10.0, 8.0, 6.0)),
    carton("S3", "Small 12x10x8", SizeClass::Small, (12.0, 10.0, 8.0)),
    carton("M1", "Medium 14x12x10", SizeClass::Medium, (14.0, 12.0, 10.0)),
    carton("M2", "Medium 16x12x12", SizeClass::Medium, (16.0, 12.0, 12.0)),
    carton("M3", "Medium 18x14x12", SizeClass::Medium, (18.0, 14.0, 12.0)),
    carton("M4", "Medium 20x16x14", SizeClass::Medium, (20.0, 16.0, 14.0)),
    carton("L1", "Large 22x18x16", SizeClass::Large, (22.0, 18.0, 16.0)),
    carton("L2", "Large 24x20x18", SizeClass::Large, (24.0, 20.0, 18.0)),
    carton("XL1", "XL 30x24x24", SizeClass::ExtraLarge, (30.0, 24.0, 24.0)),
    carton("XL2", "XL 36x30x24", SizeClass::ExtraLarge, (36.0, 30.0, 24.0)),
    carton("XXL1", "XXL 40x36x36", SizeClass::DoubleExtraLarge, (40.0, 36.0, 36.0)),
];

const fn carton(
    code: &'static str,
    name: &'static str,
    class: SizeClass,
    dims: (f64, f64, f64),
) -> BoxTemplate {
    BoxTemplate::new(code, name, class, dims, CATALOG_MAX_WEIGHT)
}

/// Codes searched first by the balanced strategy.
pub const MID_SIZE_CODES: [&str; 6] = ["M1", "M2", "M3", "M4", "L1", "L2"];

/// Returns the full catalog.
pub fn all() -> &'static [BoxTemplate] {
    &BOX_CATALOG
}

/// Iterates the mid-size templates in catalog order.
pub fn mid_size() -> impl Iterator<Item = &'static BoxTemplate> + Clone {
    BOX_CATALOG.iter().filter(|tpl| is_mid_size(tpl))
}

/// Checks whether a template belongs to the mid-size set.
pub fn is_mid_size(template: &BoxTemplate) -> bool {
    MID_SIZE_CODES.contains(&template.code)
}

/// Looks up a template by its code.
pub fn find(code: &str) -> Option<&'static BoxTemplate> {
    BOX_CATALOG.iter().find(|tpl| tpl.code == code)
}

/// Inside volume of a template in cubic inches.
#[inline]
pub fn volume(template: &BoxTemplate) -> f64 {
    template.volume()
}

/// Length plus girth of a template, measured along its longest side.
#[inline]
pub fn length_plus_girth(template: &BoxTemplate) -> f64 {
    template.length_plus_girth()
}
