use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tracked land unit under cultivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub id: Uuid,
    pub name: String,
    /// Square meters, two decimal places.
    #[sqlx(rename = "area_m2")]
    #[serde(with = "rust_decimal::serde::float")]
    pub area: Decimal,
    pub planting_start: Option<NaiveDate>,
}

/// Total harvested weight of one plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotSummary {
    pub plot_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_kg: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_serializes_total_as_number() {
        let id = Uuid::new_v4();
        let summary = PlotSummary { plot_id: id, total_kg: Decimal::new(1250, 2) };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value, json!({ "plotId": id, "totalKg": 12.5 }));
    }

    #[test]
    fn zero_total_is_numeric_zero() {
        let summary = PlotSummary { plot_id: Uuid::nil(), total_kg: Decimal::ZERO };
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value["totalKg"].is_number());
        assert_eq!(value["totalKg"].as_f64(), Some(0.0));
    }

    #[test]
    fn plot_uses_camel_case_wire_names() {
        let plot = Plot {
            id: Uuid::nil(),
            name: "Bed A".to_string(),
            area: Decimal::new(255, 1),
            planting_start: NaiveDate::from_ymd_opt(2025, 9, 1),
        };
        let value = serde_json::to_value(&plot).unwrap();
        assert_eq!(value["plantingStart"], "2025-09-01");
        assert_eq!(value["area"], 25.5);
    }
}
