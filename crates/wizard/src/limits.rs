//! Field limits used by the validation gate.

use serde::{Deserialize, Serialize};

use cleanorder_core::Quantity;

/// Tunable bounds for draft fields. Defaults follow the reception desk rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub item_name_min: usize,
    pub item_name_max: usize,
    pub color_min: usize,
    pub color_max: usize,
    pub notes_max: usize,
    /// Whole pieces.
    pub quantity_min: u32,
    pub quantity_max: u32,
    /// Kilograms, in milli-units.
    pub weight_min: Quantity,
    pub weight_max: Quantity,
    pub max_photos: usize,
    pub max_photo_bytes: u64,
    pub photo_content_types: Vec<String>,
    pub receipt_number_max: usize,
    pub unique_label_max: usize,
    pub max_items: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            item_name_min: 2,
            item_name_max: 100,
            color_min: 2,
            color_max: 30,
            notes_max: 300,
            quantity_min: 1,
            quantity_max: 100,
            weight_min: Quantity::from_milli(100),
            weight_max: Quantity::whole(50),
            max_photos: 5,
            max_photo_bytes: 5 * 1024 * 1024,
            photo_content_types: ["image/jpeg", "image/jpg", "image/png", "image/webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            receipt_number_max: 20,
            unique_label_max: 50,
            max_items: 100,
        }
    }
}
