//! Carton selection for multi-box shipments.
//!
//! The shipment is treated as one pool of weight and volume that is split
//! across N identical cartons. There is no item placement. Stages run in
//! order:
//! - Aggregation of item totals and the single-largest-item envelope
//! - Catalog search under weight, volume, girth and fit constraints
//! - A geometric estimate when no catalog carton can be proven sufficient
//! - Result assembly with two-decimal rounding

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::catalog;
use crate::model::{BoxTemplate, Item};
use crate::types::{Dims, EPSILON_GENERAL, Weighted, round2};

/// Multiplier applied to the shipment volume to allow for void space.
pub const VOLUME_SLACK_FACTOR: f64 = 1.1;

/// How many box counts above the weight minimum the balanced search tries.
///
/// Shipments that need more boxes than `min_boxes_by_weight + MAX_SEARCH_WINDOW`
/// to fit by volume are reported through the estimate, even if a larger
/// count would work. Widening this also widens the range over which the
/// fixed volume slack is trusted.
pub const MAX_SEARCH_WINDOW: u32 = 20;

/// Carton selection policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Prefer mid-size cartons, smallest sufficient box at the lowest count.
    #[default]
    Balanced,
    /// Largest carton that fits the biggest item, as few boxes as possible.
    MinBoxes,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::MinBoxes => "min_boxes",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown strategy '{0}', expected 'balanced' or 'min_boxes'")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(Strategy::Balanced),
            "min_boxes" | "min-boxes" | "minboxes" => Ok(Strategy::MinBoxes),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

/// Limits and policy for a packing run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PackingConfig {
    /// Weight limit per carton in lb, applied on top of the template capacity
    pub max_weight_per_box: f64,
    /// Carrier length plus girth limit in inches
    pub max_length_plus_girth: f64,
    /// Selection policy
    pub strategy: Strategy,
}

impl PackingConfig {
    /// Deliberately 5 lb below the catalog ceiling to leave room for dunnage.
    pub const DEFAULT_MAX_WEIGHT_PER_BOX: f64 = 145.0;
    pub const DEFAULT_MAX_LENGTH_PLUS_GIRTH: f64 = 165.0;
    pub const DEFAULT_STRATEGY: Strategy = Strategy::Balanced;

    /// Creates a builder for custom configuration.
    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::default()
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            max_weight_per_box: Self::DEFAULT_MAX_WEIGHT_PER_BOX,
            max_length_plus_girth: Self::DEFAULT_MAX_LENGTH_PLUS_GIRTH,
            strategy: Self::DEFAULT_STRATEGY,
        }
    }
}

/// Builder for PackingConfig.
#[derive(Clone, Debug, Default)]
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    pub fn max_weight_per_box(mut self, limit: f64) -> Self {
        self.config.max_weight_per_box = limit;
        self
    }

    pub fn max_length_plus_girth(mut self, limit: f64) -> Self {
        self.config.max_length_plus_girth = limit;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Aggregated shipment figures.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Totals {
    /// Σ unit weight × quantity
    pub total_weight: f64,
    /// Σ unit volume × quantity, over fully dimensioned items only
    pub total_volume: f64,
    /// Per-axis maxima across items, not multiplied by quantity
    pub largest_item: Dims,
}

impl Totals {
    /// Largest single-axis dimension of any item.
    pub fn largest_dim(&self) -> f64 {
        self.largest_item.largest()
    }
}

/// Reduces the item list to shipment totals.
///
/// Never fails; an empty list yields all-zero totals.
pub fn aggregate(items: &[Item]) -> Totals {
    items.iter().fold(
        Totals {
            total_weight: 0.0,
            total_volume: 0.0,
            largest_item: Dims::zero(),
        },
        |acc, item| Totals {
            total_weight: acc.total_weight + item.weight(),
            total_volume: acc.total_volume + item.total_volume(),
            largest_item: acc.largest_item.max_per_axis(&item.known_dims()),
        },
    )
}

/// Minimum number of cartons needed to stay under a weight limit, at least 1.
pub fn boxes_needed(total: f64, limit_per_box: f64) -> u32 {
    // `as` saturates and maps NaN to 0, so degenerate limits still yield a count.
    ((total / limit_per_box).ceil() as u32).max(1)
}

/// How the reported carton was obtained.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BoxSource {
    /// A catalog template satisfied every constraint.
    Catalog,
    /// No item carried full dimensions; the box is a cube of the largest known side.
    NoVolume,
    /// No template fit; the box is a volume-consistent estimate and may not be bookable.
    Estimated,
}

/// Per-box figures for a carrier rate request.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoxInfo {
    pub box_count: u32,
    pub weight_per_box: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub largest_dimension: f64,
    pub template_code: Option<String>,
    pub source: BoxSource,
}

impl BoxInfo {
    /// Whether the result is a bookable catalog carton.
    pub fn is_catalog_match(&self) -> bool {
        self.source == BoxSource::Catalog
    }
}

/// Result of a packing run.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackingResult {
    pub total_weight: f64,
    pub total_volume: f64,
    pub strategy: Strategy,
    #[serde(rename = "box")]
    pub box_info: BoxInfo,
}

impl PackingResult {
    pub fn box_count(&self) -> u32 {
        self.box_info.box_count
    }
}

/// Which part of the catalog a search pass covers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchPass {
    MidSize,
    FullCatalog,
    LargestFit,
}

/// Why the estimate was used instead of a catalog carton.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoVolume,
    NoFeasibleTemplate,
}

/// Events emitted while packing, for live visualisation and auditing.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum PackEvent {
    /// Items were reduced to totals.
    Aggregated {
        total_weight: f64,
        total_volume: f64,
        largest_dim: f64,
        min_boxes_by_weight: u32,
    },
    /// A catalog search pass begins.
    SearchStarted { pass: SearchPass },
    /// A pass found a carton.
    CandidateFound {
        pass: SearchPass,
        box_count: u32,
        code: String,
    },
    /// The estimate is used.
    FallbackUsed { reason: FallbackReason },
    /// Packing finished.
    Finished { box_count: u32 },
}

#[derive(Copy, Clone, Debug)]
struct Selection {
    template: &'static BoxTemplate,
    box_count: u32,
}

/// Computes the carton count and per-box figures for a shipment.
///
/// # Parameters
/// * `items` - Shipment lines
/// * `config` - Limits and strategy
///
/// # Returns
/// Always a usable result; degenerate input is handled by the fallback paths.
///
/// # Examples
/// ```
/// use carton_pack::model::Item;
/// use carton_pack::optimizer::{PackingConfig, pack};
///
/// let result = pack(&[Item::new(1, 5.0, (10.0, 8.0, 4.0))], PackingConfig::default());
/// assert_eq!(result.box_count(), 1);
/// assert_eq!(result.box_info.weight_per_box, 5.0);
/// ```
pub fn pack(items: &[Item], config: PackingConfig) -> PackingResult {
    pack_with_progress(items, config, |_| {})
}

/// Like `pack`, reporting each stage to `on_event`.
pub fn pack_with_progress(
    items: &[Item],
    config: PackingConfig,
    mut on_event: impl FnMut(&PackEvent),
) -> PackingResult {
    let totals = aggregate(items);
    let min_boxes_by_weight = boxes_needed(totals.total_weight, config.max_weight_per_box);

    on_event(&PackEvent::Aggregated {
        total_weight: totals.total_weight,
        total_volume: totals.total_volume,
        largest_dim: totals.largest_dim(),
        min_boxes_by_weight,
    });

    let (box_count, dims, template_code, source) = if totals.total_volume <= 0.0 {
        tracing::debug!(
            total_weight = totals.total_weight,
            box_count = min_boxes_by_weight,
            "no dimensioned items, using cube of largest known side"
        );
        on_event(&PackEvent::FallbackUsed {
            reason: FallbackReason::NoVolume,
        });
        (
            min_boxes_by_weight,
            Dims::cube(totals.largest_dim()),
            None,
            BoxSource::NoVolume,
        )
    } else {
        let selection = match config.strategy {
            Strategy::MinBoxes => select_min_boxes(&totals, &config, &mut on_event),
            Strategy::Balanced => {
                select_balanced(&totals, &config, min_boxes_by_weight, &mut on_event)
            }
        };

        match selection {
            Some(Selection {
                template,
                box_count,
            }) => {
                tracing::debug!(
                    strategy = %config.strategy,
                    code = template.code,
                    box_count,
                    "catalog carton selected"
                );
                (
                    box_count,
                    template.dims,
                    Some(template.code.to_string()),
                    BoxSource::Catalog,
                )
            }
            None => {
                tracing::warn!(
                    strategy = %config.strategy,
                    total_volume = totals.total_volume,
                    largest_dim = totals.largest_dim(),
                    "no catalog carton fits, estimating box dimensions"
                );
                on_event(&PackEvent::FallbackUsed {
                    reason: FallbackReason::NoFeasibleTemplate,
                });
                (
                    min_boxes_by_weight,
                    estimate_dims(&totals, min_boxes_by_weight),
                    None,
                    BoxSource::Estimated,
                )
            }
        }
    };

    on_event(&PackEvent::Finished { box_count });
    assemble(&totals, config.strategy, box_count, dims, template_code, source)
}

/// Largest carton that fits the biggest item, then the fewest boxes of it.
fn select_min_boxes(
    totals: &Totals,
    config: &PackingConfig,
    on_event: &mut impl FnMut(&PackEvent),
) -> Option<Selection> {
    on_event(&PackEvent::SearchStarted {
        pass: SearchPass::LargestFit,
    });

    // Ties resolve to the later catalog entry.
    let template = catalog::all()
        .iter()
        .filter(|tpl| tpl.fits_item(&totals.largest_item))
        .filter(|tpl| within_girth(tpl, config))
        .max_by(|a, b| catalog::volume(a).total_cmp(&catalog::volume(b)))?;

    let weight_limit = config.max_weight_per_box.min(template.max_weight);
    let by_weight = boxes_needed(totals.total_weight, weight_limit);
    // Same boundary tolerance as the balanced volume check.
    let by_volume = boxes_needed(
        totals.total_volume * VOLUME_SLACK_FACTOR - EPSILON_GENERAL,
        catalog::volume(template),
    );
    let box_count = by_weight.max(by_volume);

    on_event(&PackEvent::CandidateFound {
        pass: SearchPass::LargestFit,
        box_count,
        code: template.code.to_string(),
    });
    Some(Selection {
        template,
        box_count,
    })
}

/// Mid-size cartons first, then the full catalog.
fn select_balanced(
    totals: &Totals,
    config: &PackingConfig,
    min_boxes_by_weight: u32,
    on_event: &mut impl FnMut(&PackEvent),
) -> Option<Selection> {
    [SearchPass::MidSize, SearchPass::FullCatalog]
        .into_iter()
        .find_map(|pass| {
            on_event(&PackEvent::SearchStarted { pass });
            let selection = match pass {
                SearchPass::MidSize => {
                    search_by_count(catalog::mid_size(), totals, config, min_boxes_by_weight)
                }
                _ => search_by_count(catalog::all().iter(), totals, config, min_boxes_by_weight),
            };
            if let Some(found) = selection {
                on_event(&PackEvent::CandidateFound {
                    pass,
                    box_count: found.box_count,
                    code: found.template.code.to_string(),
                });
            }
            selection
        })
}

/// Smallest box count in the search window with a sufficient template,
/// choosing the smallest such template.
fn search_by_count(
    templates: impl Iterator<Item = &'static BoxTemplate> + Clone,
    totals: &Totals,
    config: &PackingConfig,
    min_boxes_by_weight: u32,
) -> Option<Selection> {
    let last = min_boxes_by_weight.saturating_add(MAX_SEARCH_WINDOW);
    (min_boxes_by_weight..=last).find_map(|box_count| {
        let volume_per_box = totals.total_volume / f64::from(box_count);
        let weight_per_box = totals.total_weight / f64::from(box_count);
        let required_volume = volume_per_box * VOLUME_SLACK_FACTOR;

        templates
            .clone()
            .filter(|tpl| catalog::volume(tpl) + EPSILON_GENERAL >= required_volume)
            .filter(|tpl| {
                weight_per_box <= config.max_weight_per_box.min(tpl.max_weight) + EPSILON_GENERAL
            })
            .filter(|tpl| within_girth(tpl, config))
            .filter(|tpl| tpl.fits_item(&totals.largest_item))
            .min_by(|a, b| catalog::volume(a).total_cmp(&catalog::volume(b)))
            .map(|template| Selection {
                template,
                box_count,
            })
    })
}

fn within_girth(template: &BoxTemplate, config: &PackingConfig) -> bool {
    catalog::length_plus_girth(template) <= config.max_length_plus_girth + EPSILON_GENERAL
}

/// Volume-consistent box for `box_count` boxes when no template fits.
///
/// Length is the largest item side when known, otherwise the cube root of
/// the per-box volume; width and height split the remaining cross-section
/// evenly.
fn estimate_dims(totals: &Totals, box_count: u32) -> Dims {
    let volume_per_box = totals.total_volume / f64::from(box_count);
    let largest = totals.largest_dim();
    let length = if largest > 0.0 {
        largest
    } else {
        volume_per_box.cbrt()
    };
    if length <= 0.0 {
        return Dims::zero();
    }
    let side = (volume_per_box / length).sqrt();
    Dims::new(length, side, side)
}

fn assemble(
    totals: &Totals,
    strategy: Strategy,
    box_count: u32,
    dims: Dims,
    template_code: Option<String>,
    source: BoxSource,
) -> PackingResult {
    let rounded = dims.rounded();
    PackingResult {
        total_weight: totals.total_weight,
        total_volume: totals.total_volume,
        strategy,
        box_info: BoxInfo {
            box_count,
            weight_per_box: round2(totals.total_weight / f64::from(box_count)),
            length: rounded.length,
            width: rounded.width,
            height: rounded.height,
            largest_dimension: rounded.largest(),
            template_code,
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced() -> PackingConfig {
        PackingConfig::default()
    }

    fn min_boxes() -> PackingConfig {
        PackingConfig::builder().strategy(Strategy::MinBoxes).build()
    }

    fn box_dims(info: &BoxInfo) -> Dims {
        Dims::new(info.length, info.width, info.height)
    }

    /// Weight recovered from the rounded per-box figure.
    fn reconstructed_weight(result: &PackingResult) -> f64 {
        result.box_info.weight_per_box * f64::from(result.box_count())
    }

    fn assert_weight_conserved(result: &PackingResult) {
        let tolerance = 0.005 * f64::from(result.box_count()) + 1e-6;
        let diff = (reconstructed_weight(result) - result.total_weight).abs();
        assert!(
            diff <= tolerance,
            "{} boxes × {} lb = {} differs from {} lb",
            result.box_count(),
            result.box_info.weight_per_box,
            reconstructed_weight(result),
            result.total_weight
        );
    }

    fn assert_fits_largest_item(result: &PackingResult, items: &[Item]) {
        let envelope = aggregate(items).largest_item;
        assert!(
            envelope.fits_rotated_within(&box_dims(&result.box_info), EPSILON_GENERAL),
            "{:?} does not fit inside {:?}",
            envelope,
            box_dims(&result.box_info)
        );
    }

    fn assert_within_girth(result: &PackingResult, config: &PackingConfig) {
        let girth = box_dims(&result.box_info).length_plus_girth();
        assert!(
            girth <= config.max_length_plus_girth + EPSILON_GENERAL,
            "length plus girth {} exceeds {}",
            girth,
            config.max_length_plus_girth
        );
    }

    fn sample_shipments() -> Vec<Vec<Item>> {
        vec![
            vec![Item::new(1, 5.0, (10.0, 8.0, 4.0))],
            vec![Item::new(200, 2.0, (6.0, 6.0, 6.0))],
            vec![Item::new(5, 20.0, (12.0, 10.0, 8.0))],
            vec![
                Item::new(2, 40.0, (18.0, 6.0, 6.0)),
                Item::new(10, 1.5, (4.0, 4.0, 2.0)),
                Item::weight_only(3, 12.0),
            ],
            vec![Item::new(1, 30.0, (30.0, 20.0, 20.0))],
            vec![Item::new(40, 9.0, (9.0, 7.0, 5.0))],
        ]
    }

    #[test]
    fn aggregate_sums_weight_and_volume() {
        let items = vec![
            Item::new(2, 3.0, (10.0, 5.0, 2.0)),
            Item::weight_only(4, 1.5),
            Item::new(1, 0.5, (1.0, 20.0, 1.0)),
        ];
        let totals = aggregate(&items);
        assert!((totals.total_weight - 12.5).abs() < EPSILON_GENERAL);
        assert!((totals.total_volume - 220.0).abs() < EPSILON_GENERAL);
        assert_eq!(totals.largest_item, Dims::new(10.0, 20.0, 2.0));
        assert_eq!(totals.largest_dim(), 20.0);
        assert_eq!(totals.largest_item.sorted_desc(), [20.0, 10.0, 2.0]);
    }

    #[test]
    fn aggregate_empty_is_zero() {
        let totals = aggregate(&[]);
        assert_eq!(totals.total_weight, 0.0);
        assert_eq!(totals.total_volume, 0.0);
        assert_eq!(totals.largest_item, Dims::zero());
    }

    #[test]
    fn boxes_needed_is_at_least_one() {
        assert_eq!(boxes_needed(0.0, 145.0), 1);
        assert_eq!(boxes_needed(145.0, 145.0), 1);
        assert_eq!(boxes_needed(145.01, 145.0), 2);
        assert_eq!(boxes_needed(400.0, 145.0), 3);
        assert_eq!(boxes_needed(f64::NAN, 145.0), 1);
    }

    #[test]
    fn strategy_parses_aliases() {
        assert_eq!("balanced".parse::<Strategy>().unwrap(), Strategy::Balanced);
        assert_eq!(" MIN_BOXES ".parse::<Strategy>().unwrap(), Strategy::MinBoxes);
        assert_eq!("min-boxes".parse::<Strategy>().unwrap(), Strategy::MinBoxes);
        assert!("cheapest".parse::<Strategy>().is_err());
    }

    #[test]
    fn single_small_item_fits_one_mid_size_box() {
        let items = vec![Item::new(1, 5.0, (10.0, 8.0, 4.0))];
        let config = balanced();
        let result = pack(&items, config);

        assert_eq!(result.box_count(), 1);
        assert_eq!(result.box_info.weight_per_box, 5.0);
        assert_eq!(result.box_info.template_code.as_deref(), Some("M1"));
        assert_eq!(result.box_info.source, BoxSource::Catalog);
        assert_eq!(result.box_info.largest_dimension, 14.0);
        assert_within_girth(&result, &config);
        assert_fits_largest_item(&result, &items);
    }

    #[test]
    fn heavy_shipment_needs_at_least_weight_minimum() {
        let items: Vec<Item> = (0..200).map(|_| Item::new(1, 2.0, (6.0, 6.0, 6.0))).collect();
        let result = pack(&items, balanced());

        assert!((result.total_weight - 400.0).abs() < EPSILON_GENERAL);
        assert!((result.total_volume - 43_200.0).abs() < EPSILON_GENERAL);
        assert!(result.box_count() >= 3);
        // 43200 × 1.1 / 8640 needs six L2 cartons; no mid-size box works at fewer.
        assert_eq!(result.box_count(), 6);
        assert_eq!(result.box_info.template_code.as_deref(), Some("L2"));
        assert_eq!(result.box_info.weight_per_box, 66.67);
        assert_weight_conserved(&result);
    }

    #[test]
    fn weight_only_items_use_no_volume_path() {
        let items = vec![Item::weight_only(3, 100.0)];
        for config in [balanced(), min_boxes()] {
            let result = pack(&items, config);
            assert_eq!(result.total_volume, 0.0);
            assert_eq!(result.box_count(), 3);
            assert_eq!(result.box_info.source, BoxSource::NoVolume);
            assert_eq!(box_dims(&result.box_info), Dims::zero());
            assert_eq!(result.box_info.weight_per_box, 100.0);
            assert!(result.box_info.template_code.is_none());
        }
    }

    #[test]
    fn no_volume_cube_uses_largest_known_side() {
        let items = vec![
            Item {
                quantity: 1,
                weight_lbs: 10.0,
                length: Some(18.0),
                width: Some(4.0),
                height: None,
            },
            Item::weight_only(1, 5.0),
        ];
        for config in [balanced(), min_boxes()] {
            let result = pack(&items, config);
            assert_eq!(result.box_info.source, BoxSource::NoVolume);
            assert_eq!(box_dims(&result.box_info), Dims::cube(18.0));
            assert_eq!(result.box_info.largest_dimension, 18.0);
        }
    }

    #[test]
    fn empty_shipment_yields_one_empty_box() {
        let result = pack(&[], balanced());
        assert_eq!(result.box_count(), 1);
        assert_eq!(result.box_info.weight_per_box, 0.0);
        assert_eq!(box_dims(&result.box_info), Dims::zero());
        assert_eq!(result.box_info.largest_dimension, 0.0);
    }

    #[test]
    fn strategies_may_differ_but_both_are_valid() {
        let items = vec![Item::new(5, 20.0, (12.0, 10.0, 8.0))];

        let by_balance = pack(&items, balanced());
        let by_count = pack(&items, min_boxes());

        for (result, config) in [(&by_balance, balanced()), (&by_count, min_boxes())] {
            assert!(result.box_info.is_catalog_match());
            assert_weight_conserved(result);
            assert_fits_largest_item(result, &items);
            assert_within_girth(result, &config);
        }
        assert_eq!(by_balance.strategy, Strategy::Balanced);
        assert_eq!(by_count.strategy, Strategy::MinBoxes);
    }

    #[test]
    fn balanced_picks_smallest_sufficient_mid_size_box() {
        let items = vec![Item::new(5, 20.0, (12.0, 10.0, 8.0))];
        let result = pack(&items, balanced());
        // 4800 × 1.1 = 5280 rules out M4 (4480); L1 (6336) is next.
        assert_eq!(result.box_info.template_code.as_deref(), Some("L1"));
        assert_eq!(result.box_count(), 1);
    }

    #[test]
    fn min_boxes_picks_largest_feasible_template() {
        let items = vec![Item::new(5, 20.0, (12.0, 10.0, 8.0))];
        let result = pack(&items, min_boxes());
        // XXL1 exceeds the default girth limit.
        assert_eq!(result.box_info.template_code.as_deref(), Some("XL2"));
        assert_eq!(result.box_count(), 1);
    }

    #[test]
    fn min_boxes_respects_custom_girth_limit() {
        let items = vec![Item::new(3, 10.0, (8.0, 8.0, 8.0))];
        let config = PackingConfig::builder()
            .strategy(Strategy::MinBoxes)
            .max_length_plus_girth(100.0)
            .build();
        let result = pack(&items, config);
        assert_eq!(result.box_info.template_code.as_deref(), Some("L2"));
        assert_within_girth(&result, &config);
    }

    #[test]
    fn exact_volume_fit_needs_one_box_under_both_strategies() {
        // 5760 × 1.1 equals the L1 volume; a 95 in girth limit rules out L2 and up.
        let items = vec![Item::new(1, 10.0, (20.0, 18.0, 16.0))];
        for strategy in [Strategy::Balanced, Strategy::MinBoxes] {
            let config = PackingConfig::builder()
                .strategy(strategy)
                .max_length_plus_girth(95.0)
                .build();
            let result = pack(&items, config);
            assert_eq!(result.box_info.template_code.as_deref(), Some("L1"), "{}", strategy);
            assert_eq!(result.box_count(), 1, "{} strategy", strategy);
        }
    }

    #[test]
    fn min_boxes_uses_stricter_of_weight_and_volume() {
        // 400 lb over 145 lb per box → 3; volume fits in one XL2.
        let items = vec![Item::new(200, 2.0, (6.0, 6.0, 6.0))];
        let result = pack(&items, min_boxes());
        assert_eq!(result.box_count(), 3);
        assert_eq!(result.box_info.template_code.as_deref(), Some("XL2"));
        assert_weight_conserved(&result);
    }

    #[test]
    fn balanced_falls_back_to_full_catalog() {
        let items = vec![Item::new(1, 30.0, (30.0, 20.0, 20.0))];
        let mut events = Vec::new();
        let result = pack_with_progress(&items, balanced(), |evt| events.push(evt.clone()));

        assert_eq!(result.box_info.template_code.as_deref(), Some("XL1"));
        assert!(events.contains(&PackEvent::SearchStarted {
            pass: SearchPass::FullCatalog
        }));
        assert!(events.contains(&PackEvent::CandidateFound {
            pass: SearchPass::FullCatalog,
            box_count: 1,
            code: "XL1".to_string(),
        }));
    }

    #[test]
    fn oversized_item_uses_estimate() {
        let items = vec![Item::new(1, 20.0, (50.0, 50.0, 50.0))];
        for config in [balanced(), min_boxes()] {
            let result = pack(&items, config);
            assert_eq!(result.box_info.source, BoxSource::Estimated);
            assert!(result.box_info.template_code.is_none());
            assert_eq!(result.box_count(), 1);
            assert!((result.box_info.length - 50.0).abs() < 0.01);
            assert!((result.box_info.width - 50.0).abs() < 0.01);
            assert!((result.box_info.height - 50.0).abs() < 0.01);
            assert_weight_conserved(&result);
        }
    }

    #[test]
    fn estimate_is_volume_consistent() {
        let items = vec![Item::new(2, 100.0, (60.0, 10.0, 10.0))];
        let result = pack(&items, balanced());
        assert_eq!(result.box_info.source, BoxSource::Estimated);
        assert_eq!(result.box_count(), 2);
        let per_box = result.total_volume / 2.0;
        let estimated = box_dims(&result.box_info).volume();
        assert!(
            (estimated - per_box).abs() / per_box < 0.01,
            "estimated volume {} vs {}",
            estimated,
            per_box
        );
        assert_eq!(result.box_info.length, 60.0);
    }

    #[test]
    fn estimate_without_known_side_is_a_cube() {
        let totals = Totals {
            total_weight: 0.0,
            total_volume: 8000.0,
            largest_item: Dims::zero(),
        };
        assert_eq!(estimate_dims(&totals, 1).rounded(), Dims::cube(20.0));
    }

    #[test]
    fn balanced_search_stops_at_window() {
        // Needs ~43 XL2 cartons by volume but only one by weight.
        let items = vec![Item::new(1000, 0.01, (10.0, 10.0, 10.0))];

        let result = pack(&items, balanced());
        assert_eq!(result.box_info.source, BoxSource::Estimated);
        assert_eq!(result.box_count(), 1);

        let result = pack(&items, min_boxes());
        assert_eq!(result.box_info.template_code.as_deref(), Some("XL2"));
        assert_eq!(result.box_count(), 43);
    }

    #[test]
    fn weight_is_conserved_across_samples() {
        for items in sample_shipments() {
            for config in [balanced(), min_boxes()] {
                assert_weight_conserved(&pack(&items, config));
            }
        }
    }

    #[test]
    fn catalog_matches_fit_largest_item_and_girth() {
        for items in sample_shipments() {
            for config in [balanced(), min_boxes()] {
                let result = pack(&items, config);
                if result.box_info.is_catalog_match() {
                    assert_fits_largest_item(&result, &items);
                    assert_within_girth(&result, &config);
                }
            }
        }
    }

    #[test]
    fn box_count_never_decreases_with_weight() {
        for config in [balanced(), min_boxes()] {
            let mut previous = 0;
            for step in 0..=60 {
                let weight = f64::from(step) * 25.0;
                let items = vec![
                    Item::new(1, weight, (14.0, 10.0, 8.0)),
                    Item::new(6, 4.0, (9.0, 7.0, 5.0)),
                ];
                let count = pack(&items, config).box_count();
                assert!(
                    count >= previous,
                    "{} strategy: {} boxes at {} lb after {}",
                    config.strategy,
                    count,
                    weight,
                    previous
                );
                previous = count;
            }
        }
    }

    #[test]
    fn degenerate_limits_do_not_panic() {
        let items = vec![Item::new(1, 10.0, (10.0, 10.0, 10.0))];
        let config = PackingConfig::builder().max_weight_per_box(0.0).build();
        let result = pack(&items, config);
        assert!(result.box_count() >= 1);
    }

    #[test]
    fn events_follow_stage_order() {
        let items = vec![Item::new(1, 5.0, (10.0, 8.0, 4.0))];
        let mut events = Vec::new();
        let result = pack_with_progress(&items, balanced(), |evt| events.push(evt.clone()));

        assert!(matches!(events.first(), Some(PackEvent::Aggregated { .. })));
        assert_eq!(
            events.get(1),
            Some(&PackEvent::SearchStarted {
                pass: SearchPass::MidSize
            })
        );
        assert_eq!(
            events.last(),
            Some(&PackEvent::Finished {
                box_count: result.box_count()
            })
        );
        assert!(!events.iter().any(|evt| matches!(evt, PackEvent::FallbackUsed { .. })));
    }

    #[test]
    fn events_report_no_volume_fallback() {
        let mut events = Vec::new();
        pack_with_progress(&[Item::weight_only(1, 3.0)], min_boxes(), |evt| {
            events.push(evt.clone())
        });
        assert!(events.contains(&PackEvent::FallbackUsed {
            reason: FallbackReason::NoVolume
        }));
        assert!(!events.iter().any(|evt| matches!(evt, PackEvent::SearchStarted { .. })));
    }
}
