//! Variant availability and option resolution
//!
//! Pure, synchronous decision logic over an in-memory [`Product`] and the
//! shopper's current [`Selection`]: which option values are still
//! purchasable, which variant a complete selection pins down, and which
//! images to display. Re-run on every interaction, so everything here is
//! deterministic and allocation-only; malformed catalog data degrades to
//! "no match"/"unavailable"/empty rather than panicking.

use std::collections::BTreeMap;

use crate::catalog::{InventoryPolicy, Product, ProductImage, ProductVariant};

/// The shopper's current (possibly partial) choice of option values,
/// keyed by lowercase option name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    values: BTreeMap<String, String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut selection = Self::new();
        for (name, value) in pairs {
            selection.set(name, value);
        }
        selection
    }

    /// Set the chosen value for an option. The option name is normalized
    /// to lowercase; the value keeps its display casing.
    pub fn set(&mut self, option_name: &str, value: impl Into<String>) {
        self.values.insert(option_name.to_lowercase(), value.into());
    }

    pub fn get(&self, option_name: &str) -> Option<&str> {
        self.values
            .get(&option_name.to_lowercase())
            .map(String::as_str)
    }

    pub fn remove(&mut self, option_name: &str) {
        self.values.remove(&option_name.to_lowercase());
    }

    /// Copy of this selection with one option overridden, for "what if
    /// the shopper picked this value" checks.
    pub fn with(&self, option_name: &str, value: impl Into<String>) -> Self {
        let mut hypothetical = self.clone();
        hypothetical.set(option_name, value);
        hypothetical
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Computed availability record for one variant: fixed metadata plus an
/// explicit option-value map keyed by lowercase option name, instead of
/// a loose bag where option names could collide with metadata fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combination {
    pub variant_id: String,
    pub available_for_sale: bool,
    pub inventory_quantity: Option<i64>,
    pub inventory_policy: Option<InventoryPolicy>,
    pub option_values: BTreeMap<String, String>,
}

/// Produce one [`Combination`] per variant, in variant order.
pub fn compute_availability(product: &Product) -> Vec<Combination> {
    product
        .variants
        .iter()
        .map(|variant| Combination {
            variant_id: variant.id.clone(),
            available_for_sale: variant_purchasable(product, variant),
            inventory_quantity: variant.inventory_quantity,
            inventory_policy: variant.inventory_policy,
            option_values: variant
                .selected_options
                .iter()
                .map(|option| (option.name.to_lowercase(), option.value.clone()))
                .collect(),
        })
        .collect()
}

/// Availability decision, first match wins:
/// 1. explicit opt-out at product or variant level beats everything;
/// 2. CONTINUE permits overselling, stock is ignored;
/// 3. DENY without a known count is unsafe to sell;
/// 4. DENY with a count sells while count > 0;
/// 5. no policy, or an unrecognized one, is unavailable only when a
///    count is present and non-positive.
fn variant_purchasable(product: &Product, variant: &ProductVariant) -> bool {
    if !product.available_for_sale || !variant.available_for_sale {
        return false;
    }
    match (variant.inventory_policy, variant.inventory_quantity) {
        (Some(InventoryPolicy::Continue), _) => true,
        (Some(InventoryPolicy::Deny), None) => false,
        (Some(InventoryPolicy::Deny), Some(quantity)) => quantity > 0,
        (None, None) | (Some(InventoryPolicy::Unknown), None) => true,
        (None, Some(quantity)) | (Some(InventoryPolicy::Unknown), Some(quantity)) => quantity > 0,
    }
}

/// Would choosing `candidate_value` for `option_name`, on top of the
/// current selection, still match at least one sellable combination?
///
/// Selection keys that don't correspond to a real option/value on this
/// product are ignored (stale query state). Partial match: a combination
/// qualifies when it agrees on every filtered key; options not yet
/// chosen are wildcards, and the first matching combination in variant
/// order decides.
pub fn is_value_available(
    product: &Product,
    combinations: &[Combination],
    selection: &Selection,
    option_name: &str,
    candidate_value: &str,
) -> bool {
    let hypothetical = selection.with(option_name, candidate_value);
    let filtered: Vec<(&str, String)> = hypothetical
        .iter()
        .filter(|(key, value)| {
            product.options.iter().any(|option| {
                option.name.to_lowercase() == *key
                    && option
                        .values
                        .iter()
                        .any(|v| v.name.to_lowercase() == value.to_lowercase())
            })
        })
        .map(|(key, value)| (key, value.to_lowercase()))
        .collect();

    combinations
        .iter()
        .find(|combination| {
            filtered.iter().all(|(key, value)| {
                combination
                    .option_values
                    .get(*key)
                    .map_or(false, |have| have.to_lowercase() == *value)
            })
        })
        .map_or(false, |combination| combination.available_for_sale)
}

/// Strict full-selection match: the selection must name a value for
/// every product option and a variant must agree on all of them.
/// Incomplete selections, products without options, and variants with
/// gaps in their `selected_options` all yield `None`.
pub fn resolve_exact_variant<'p>(
    product: &'p Product,
    selection: &Selection,
) -> Option<&'p ProductVariant> {
    if product.options.is_empty() {
        return None;
    }
    if product
        .options
        .iter()
        .any(|option| selection.get(&option.name).is_none())
    {
        return None;
    }
    product.variants.iter().find(|variant| {
        product.options.iter().all(|option| {
            let chosen = match selection.get(&option.name) {
                Some(value) => value.to_lowercase(),
                None => return false,
            };
            variant.selected_options.iter().any(|selected| {
                selected.name.to_lowercase() == option.name.to_lowercase()
                    && selected.value.to_lowercase() == chosen
            })
        })
    })
}

/// Ordered images to display for the current selection.
///
/// Priority chain, first non-empty level wins:
/// 1. images whose structured `selected_options` cover every chosen key;
/// 2. images whose alt text mentions any chosen value (heuristic for
///    catalogs that only tag images via free text);
/// 3. untagged images;
/// 4. the featured image;
/// 5. the first image;
/// 6. nothing.
pub fn resolve_images<'p>(product: &'p Product, selection: &Selection) -> Vec<&'p ProductImage> {
    let tagged: Vec<&ProductImage> = product
        .images
        .iter()
        .filter(|image| {
            selection.iter().all(|(key, value)| {
                image.selected_options.as_ref().map_or(false, |options| {
                    options.iter().any(|option| {
                        option.name.to_lowercase() == key
                            && option.value.to_lowercase() == value.to_lowercase()
                    })
                })
            })
        })
        .collect();
    if !tagged.is_empty() {
        return tagged;
    }

    if !selection.is_empty() {
        let wanted: Vec<String> = selection.iter().map(|(_, v)| v.to_lowercase()).collect();
        let by_alt: Vec<&ProductImage> = product
            .images
            .iter()
            .filter(|image| {
                image.alt_text.as_ref().map_or(false, |alt| {
                    let alt = alt.to_lowercase();
                    wanted.iter().any(|value| alt.contains(value.as_str()))
                })
            })
            .collect();
        if !by_alt.is_empty() {
            return by_alt;
        }
    }

    let untagged: Vec<&ProductImage> = product
        .images
        .iter()
        .filter(|image| image.selected_options.is_none())
        .collect();
    if !untagged.is_empty() {
        return untagged;
    }

    if let Some(featured) = product.featured_image.as_ref() {
        return vec![featured];
    }
    product.images.first().map(|first| vec![first]).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{OptionValue, ProductOption, SelectedOption};

    fn option(name: &str, values: &[&str]) -> ProductOption {
        ProductOption {
            id: format!("opt-{}", name.to_lowercase()),
            name: name.into(),
            values: values
                .iter()
                .map(|v| OptionValue {
                    id: v.to_lowercase(),
                    name: (*v).into(),
                })
                .collect(),
        }
    }

    fn variant(
        id: &str,
        pairs: &[(&str, &str)],
        policy: Option<InventoryPolicy>,
        quantity: Option<i64>,
    ) -> ProductVariant {
        ProductVariant {
            id: id.into(),
            title: pairs
                .iter()
                .map(|(_, v)| *v)
                .collect::<Vec<_>>()
                .join(" / "),
            available_for_sale: true,
            inventory_policy: policy,
            inventory_quantity: quantity,
            price: None,
            selected_options: pairs
                .iter()
                .map(|(name, value)| SelectedOption {
                    name: (*name).into(),
                    value: (*value).into(),
                })
                .collect(),
        }
    }

    fn image(url: &str, alt: Option<&str>, tags: Option<&[(&str, &str)]>) -> ProductImage {
        ProductImage {
            url: url.into(),
            alt_text: alt.map(Into::into),
            width: None,
            height: None,
            selected_options: tags.map(|pairs| {
                pairs
                    .iter()
                    .map(|(name, value)| SelectedOption {
                        name: (*name).into(),
                        value: (*value).into(),
                    })
                    .collect()
            }),
        }
    }

    fn product(options: Vec<ProductOption>, variants: Vec<ProductVariant>) -> Product {
        Product {
            id: "p1".into(),
            handle: "shirt".into(),
            title: "Shirt".into(),
            description: String::new(),
            tags: vec![],
            available_for_sale: true,
            options,
            variants,
            images: vec![],
            featured_image: None,
            price_range: None,
        }
    }

    /// Color × Size grid with one sold-out cell (Red/M).
    fn color_size_product() -> Product {
        product(
            vec![option("Color", &["Red", "Blue"]), option("Size", &["S", "M"])],
            vec![
                variant(
                    "red-s",
                    &[("Color", "Red"), ("Size", "S")],
                    Some(InventoryPolicy::Deny),
                    Some(3),
                ),
                variant(
                    "red-m",
                    &[("Color", "Red"), ("Size", "M")],
                    Some(InventoryPolicy::Deny),
                    Some(0),
                ),
                variant(
                    "blue-s",
                    &[("Color", "Blue"), ("Size", "S")],
                    Some(InventoryPolicy::Deny),
                    Some(1),
                ),
                variant(
                    "blue-m",
                    &[("Color", "Blue"), ("Size", "M")],
                    Some(InventoryPolicy::Deny),
                    Some(2),
                ),
            ],
        )
    }

    #[test]
    fn test_determinism() {
        let product = color_size_product();
        let selection = Selection::from_pairs([("color", "Red")]);
        let first = compute_availability(&product);
        let second = compute_availability(&product);
        assert_eq!(first, second);
        assert_eq!(
            resolve_images(&product, &selection),
            resolve_images(&product, &selection)
        );
        assert_eq!(
            resolve_exact_variant(&product, &selection),
            resolve_exact_variant(&product, &selection)
        );
    }

    #[test]
    fn test_product_opt_out_dominates() {
        let mut product = color_size_product();
        product.available_for_sale = false;
        assert!(compute_availability(&product)
            .iter()
            .all(|c| !c.available_for_sale));
    }

    #[test]
    fn test_variant_opt_out_dominates() {
        let mut product = color_size_product();
        product.variants[0].available_for_sale = false;
        product.variants[0].inventory_policy = Some(InventoryPolicy::Continue);
        let combinations = compute_availability(&product);
        assert!(!combinations[0].available_for_sale);
        assert!(combinations[1..].iter().any(|c| c.available_for_sale));
    }

    #[test]
    fn test_continue_overrides_stock() {
        let product = product(
            vec![option("Color", &["Red"])],
            vec![variant(
                "v1",
                &[("Color", "Red")],
                Some(InventoryPolicy::Continue),
                Some(0),
            )],
        );
        assert!(compute_availability(&product)[0].available_for_sale);
    }

    #[test]
    fn test_deny_without_quantity_is_unsafe() {
        let product = product(
            vec![option("Color", &["Red"])],
            vec![variant("v1", &[("Color", "Red")], Some(InventoryPolicy::Deny), None)],
        );
        assert!(!compute_availability(&product)[0].available_for_sale);
    }

    #[test]
    fn test_legacy_untracked_inventory() {
        let product = product(
            vec![option("Color", &["Red", "Blue", "Green"])],
            vec![
                variant("v1", &[("Color", "Red")], None, None),
                variant("v2", &[("Color", "Blue")], None, Some(0)),
                variant("v3", &[("Color", "Green")], None, Some(4)),
            ],
        );
        let combinations = compute_availability(&product);
        assert!(combinations[0].available_for_sale); // untracked defaults available
        assert!(!combinations[1].available_for_sale);
        assert!(combinations[2].available_for_sale);
    }

    #[test]
    fn test_unknown_policy_fails_safe() {
        let product = product(
            vec![option("Color", &["Red", "Blue"])],
            vec![
                variant("v1", &[("Color", "Red")], Some(InventoryPolicy::Unknown), None),
                variant("v2", &[("Color", "Blue")], Some(InventoryPolicy::Unknown), Some(0)),
            ],
        );
        let combinations = compute_availability(&product);
        assert!(combinations[0].available_for_sale);
        assert!(!combinations[1].available_for_sale);
    }

    #[test]
    fn test_sold_out_size_reported_unavailable() {
        let product = color_size_product();
        let combinations = compute_availability(&product);
        let selection = Selection::from_pairs([("color", "Red")]);
        assert!(!is_value_available(&product, &combinations, &selection, "size", "M"));
        assert!(is_value_available(&product, &combinations, &selection, "size", "S"));
    }

    #[test]
    fn test_stale_selection_keys_are_ignored() {
        let product = color_size_product();
        let combinations = compute_availability(&product);
        let mut selection = Selection::from_pairs([("color", "Red")]);
        selection.set("material", "Linen"); // not an option on this product
        selection.set("size", "XXL"); // not a value on this product
        assert!(is_value_available(&product, &combinations, &selection, "color", "Red"));
    }

    #[test]
    fn test_no_matching_combination_is_unavailable() {
        let product = product(
            vec![option("Color", &["Red", "Blue"])],
            vec![variant("v1", &[("Color", "Red")], None, Some(5))],
        );
        let combinations = compute_availability(&product);
        let selection = Selection::new();
        // Blue is a declared value but no variant carries it.
        assert!(!is_value_available(&product, &combinations, &selection, "color", "Blue"));
    }

    #[test]
    fn test_partial_match_uses_first_variant_order() {
        // Two variants could satisfy color=Red; the first one decides.
        let product = product(
            vec![option("Color", &["Red"]), option("Size", &["S", "M"])],
            vec![
                variant("red-s", &[("Color", "Red"), ("Size", "S")], Some(InventoryPolicy::Deny), Some(0)),
                variant("red-m", &[("Color", "Red"), ("Size", "M")], Some(InventoryPolicy::Deny), Some(9)),
            ],
        );
        let combinations = compute_availability(&product);
        let selection = Selection::new();
        assert!(!is_value_available(&product, &combinations, &selection, "color", "Red"));
    }

    #[test]
    fn test_exact_match_requires_complete_selection() {
        let product = product(
            vec![option("Color", &["Red"]), option("Size", &["S"])],
            vec![variant("only", &[("Color", "Red"), ("Size", "S")], None, Some(1))],
        );
        let partial = Selection::from_pairs([("color", "Red")]);
        assert!(resolve_exact_variant(&product, &partial).is_none());
        let complete = Selection::from_pairs([("color", "Red"), ("size", "S")]);
        assert_eq!(resolve_exact_variant(&product, &complete).map(|v| v.id.as_str()), Some("only"));
    }

    #[test]
    fn test_exact_match_on_empty_option_set() {
        // Products with zero options have nothing to match against; the
        // caller treats the product itself as the sole variant.
        let product = product(vec![], vec![]);
        assert!(resolve_exact_variant(&product, &Selection::new()).is_none());
    }

    #[test]
    fn test_exact_match_tolerates_incomplete_variant() {
        let product = product(
            vec![option("Color", &["Red"]), option("Size", &["S"])],
            vec![variant("gap", &[("Color", "Red")], None, Some(1))],
        );
        let selection = Selection::from_pairs([("color", "Red"), ("size", "S")]);
        assert!(resolve_exact_variant(&product, &selection).is_none());
    }

    #[test]
    fn test_case_insensitive_matching() {
        let product = color_size_product();
        let combinations = compute_availability(&product);
        let selection = Selection::from_pairs([("COLOR", "red")]);
        assert!(is_value_available(&product, &combinations, &selection, "SIZE", "s"));
        let complete = Selection::from_pairs([("Color", "RED"), ("size", "s")]);
        assert_eq!(
            resolve_exact_variant(&product, &complete).map(|v| v.id.as_str()),
            Some("red-s")
        );
    }

    #[test]
    fn test_structured_image_tag_beats_alt_text() {
        // The structured match wins even though it appears second in
        // the list.
        let mut product = product(vec![option("Color", &["Red", "Blue"])], vec![]);
        product.images = vec![
            image("a", Some("Red Shirt"), None),
            image("b", None, Some(&[("color", "Blue")])),
        ];
        let selection = Selection::from_pairs([("color", "Blue")]);
        let images = resolve_images(&product, &selection);
        assert_eq!(images.iter().map(|i| i.url.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_alt_text_fallback() {
        let mut product = product(vec![option("Color", &["Red", "Blue"])], vec![]);
        product.images = vec![
            image("generic", None, None),
            image("red-front", Some("Red Shirt front"), None),
            image("red-back", Some("Back of the red shirt"), None),
        ];
        let selection = Selection::from_pairs([("color", "Red")]);
        let urls: Vec<&str> = resolve_images(&product, &selection)
            .iter()
            .map(|i| i.url.as_str())
            .collect();
        assert_eq!(urls, vec!["red-front", "red-back"]);
    }

    #[test]
    fn test_untagged_fallback_when_nothing_matches() {
        let mut product = product(vec![option("Color", &["Red", "Blue"])], vec![]);
        product.images = vec![
            image("generic", Some("Studio shot"), None),
            image("blue-only", None, Some(&[("color", "Blue")])),
        ];
        let selection = Selection::from_pairs([("color", "Red")]);
        let urls: Vec<&str> = resolve_images(&product, &selection)
            .iter()
            .map(|i| i.url.as_str())
            .collect();
        assert_eq!(urls, vec!["generic"]);
    }

    #[test]
    fn test_featured_image_fallback() {
        let mut product = product(vec![option("Color", &["Red"])], vec![]);
        product.images = vec![image("tagged", None, Some(&[("color", "Blue")]))];
        product.featured_image = Some(image("featured", None, None));
        let selection = Selection::from_pairs([("color", "Red")]);
        let urls: Vec<&str> = resolve_images(&product, &selection)
            .iter()
            .map(|i| i.url.as_str())
            .collect();
        assert_eq!(urls, vec!["featured"]);
    }

    #[test]
    fn test_no_images_at_all() {
        let product = product(vec![option("Color", &["Red"])], vec![]);
        let selection = Selection::from_pairs([("color", "Red")]);
        assert!(resolve_images(&product, &selection).is_empty());
    }

    #[test]
    fn test_empty_selection_shows_all_images() {
        let mut product = product(vec![option("Color", &["Red", "Blue"])], vec![]);
        product.images = vec![
            image("a", None, None),
            image("b", None, Some(&[("color", "Blue")])),
        ];
        let images = resolve_images(&product, &Selection::new());
        assert_eq!(images.len(), 2);
    }
}
