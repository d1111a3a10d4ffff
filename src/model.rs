//! Data model: the untrusted extraction and the normalized report.
//!
//! [`RawExtraction`] mirrors the JSON the model is asked to produce, but
//! every leaf is a [`serde_json::Value`] so a string where a number was
//! expected (or a `null`, or nothing at all) still deserializes. Type
//! discipline is applied afterwards by [`crate::pipeline::normalize`],
//! which produces a [`NormalizedReport`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The two production units a report always covers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Lantabur,
    Taqwa,
}

impl Entity {
    /// Both entities in the fixed order they are presented.
    pub const ALL: [Entity; 2] = [Entity::Lantabur, Entity::Taqwa];

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Entity::Lantabur => "Lantabur",
            Entity::Taqwa => "Taqwa",
        }
    }

    /// JSON key used in the extraction schema.
    pub fn key(self) -> &'static str {
        match self {
            Entity::Lantabur => "lantabur",
            Entity::Taqwa => "taqwa",
        }
    }
}

// ── Raw (model output) ───────────────────────────────────────────────────

/// Loosely-typed extraction as returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawExtraction {
    pub date: Value,
    pub lantabur: Option<RawEntity>,
    pub taqwa: Option<RawEntity>,
    pub overall_grand_total: Value,
}

impl RawExtraction {
    pub fn entity(&self, entity: Entity) -> Option<&RawEntity> {
        match entity {
            Entity::Lantabur => self.lantabur.as_ref(),
            Entity::Taqwa => self.taqwa.as_ref(),
        }
    }
}

/// One entity's block inside a [`RawExtraction`].
///
/// `in_house` / `sub_contract` are expected as `{ "value": n }` objects;
/// `loading_capacity` as an array of `{ "name": s, "value": n }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEntity {
    pub daily_production_total: Value,
    pub loading_capacity: Value,
    pub in_house: Value,
    pub sub_contract: Value,
    pub lab_rft: Value,
    pub total_this_month: Value,
}

// ── Normalized ───────────────────────────────────────────────────────────

/// A named line of the loading-capacity breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub value: f64,
    /// `value / dailyProductionTotal * 100`, rounded to 2 places; 0 when the
    /// total is 0.
    pub percentage: f64,
}

/// A value together with its share of the entity's daily total.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Share {
    pub value: f64,
    pub percentage: f64,
}

/// One entity's normalized production figures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReport {
    pub daily_production_total: f64,
    pub loading_capacity: Vec<LineItem>,
    pub in_house: Share,
    pub sub_contract: Share,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_rft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_this_month: Option<f64>,
    /// Present exactly when `total_this_month` is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_per_day: Option<f64>,
}

/// The report held by the dashboard after a successful extraction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReport {
    pub date: String,
    pub lantabur: EntityReport,
    pub taqwa: EntityReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_grand_total: Option<f64>,
}

impl NormalizedReport {
    pub fn entity(&self, entity: Entity) -> &EntityReport {
        match entity {
            Entity::Lantabur => &self.lantabur,
            Entity::Taqwa => &self.taqwa,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_extraction_accepts_wrong_primitive_types() {
        let raw: RawExtraction = serde_json::from_value(json!({
            "date": 20250602,
            "lantabur": {
                "dailyProductionTotal": "13,266.2",
                "loadingCapacity": "not an array",
                "inHouse": null
            }
        }))
        .unwrap();
        assert_eq!(raw.date, json!(20250602));
        let lantabur = raw.lantabur.unwrap();
        assert_eq!(lantabur.daily_production_total, json!("13,266.2"));
        assert_eq!(lantabur.in_house, Value::Null);
        assert_eq!(lantabur.total_this_month, Value::Null);
        assert!(raw.taqwa.is_none());
    }

    #[test]
    fn entity_order_and_names() {
        assert_eq!(Entity::ALL, [Entity::Lantabur, Entity::Taqwa]);
        assert_eq!(Entity::Taqwa.display_name(), "Taqwa");
        assert_eq!(Entity::Lantabur.key(), "lantabur");
    }

    #[test]
    fn normalized_report_omits_absent_optionals() {
        let report = NormalizedReport::default();
        let v = serde_json::to_value(&report).unwrap();
        assert!(v.get("overallGrandTotal").is_none());
        assert!(v["lantabur"].get("averagePerDay").is_none());
        assert_eq!(v["taqwa"]["dailyProductionTotal"], json!(0.0));
    }
}
