//! Chart-ready data derived from a [`NormalizedReport`].
//!
//! These shapes carry no new information: they regroup the report's numbers
//! into labelled series that a renderer can plot and that
//! [`crate::extract::describe_chart`] can serialize for the model.

use crate::model::{Entity, NormalizedReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chart kind, rendered as the label the description prompt expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Line => "Line Chart",
        };
        f.write_str(label)
    }
}

/// One labelled value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// A titled series ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    /// Payload sent with the chart-description request.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.points).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Loading-capacity breakdown for one entity, items in report order.
pub fn loading_capacity_chart(report: &NormalizedReport, entity: Entity) -> ChartData {
    let data = report.entity(entity);
    ChartData {
        kind: ChartKind::Bar,
        title: format!("{} Loading Capacity", entity.display_name()),
        points: data
            .loading_capacity
            .iter()
            .map(|item| ChartPoint {
                label: item.name.clone(),
                value: item.value,
                percentage: Some(item.percentage),
            })
            .collect(),
    }
}

/// In-house vs sub-contract split for one entity.
pub fn in_house_sub_contract_chart(report: &NormalizedReport, entity: Entity) -> ChartData {
    let data = report.entity(entity);
    ChartData {
        kind: ChartKind::Pie,
        title: format!("{} In-House vs Sub-Contract", entity.display_name()),
        points: vec![
            ChartPoint {
                label: "In-House".into(),
                value: data.in_house.value,
                percentage: Some(data.in_house.percentage),
            },
            ChartPoint {
                label: "Sub-Contract".into(),
                value: data.sub_contract.value,
                percentage: Some(data.sub_contract.percentage),
            },
        ],
    }
}

/// Month-to-date totals across the entities as a line series; entities
/// without one are left out.
pub fn monthly_comparison_chart(report: &NormalizedReport) -> ChartData {
    ChartData {
        kind: ChartKind::Line,
        title: "Production This Month".into(),
        points: Entity::ALL
            .iter()
            .filter_map(|entity| {
                report
                    .entity(*entity)
                    .total_this_month
                    .map(|value| ChartPoint {
                        label: entity.display_name().to_string(),
                        value,
                        percentage: None,
                    })
            })
            .collect(),
    }
}

/// Every chart the dashboard shows, in display order. Empty series are
/// dropped.
pub fn all_charts(report: &NormalizedReport) -> Vec<ChartData> {
    let mut charts = Vec::new();
    for entity in Entity::ALL {
        charts.push(loading_capacity_chart(report, entity));
        charts.push(in_house_sub_contract_chart(report, entity));
    }
    charts.push(monthly_comparison_chart(report));
    charts.retain(|c| !c.is_empty());
    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityReport, LineItem, Share};

    fn report() -> NormalizedReport {
        NormalizedReport {
            date: "02 Jun 2025".into(),
            lantabur: EntityReport {
                daily_production_total: 100.0,
                loading_capacity: vec![
                    LineItem { name: "Black".into(), value: 60.0, percentage: 60.0 },
                    LineItem { name: "White".into(), value: 40.0, percentage: 40.0 },
                ],
                in_house: Share { value: 90.0, percentage: 90.0 },
                sub_contract: Share { value: 10.0, percentage: 10.0 },
                total_this_month: Some(3000.0),
                average_per_day: Some(100.0),
                lab_rft: None,
            },
            taqwa: EntityReport::default(),
            overall_grand_total: None,
        }
    }

    #[test]
    fn loading_capacity_keeps_order() {
        let c = loading_capacity_chart(&report(), Entity::Lantabur);
        assert_eq!(c.kind, ChartKind::Bar);
        assert_eq!(c.title, "Lantabur Loading Capacity");
        let labels: Vec<&str> = c.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Black", "White"]);
    }

    #[test]
    fn pie_has_two_slices() {
        let c = in_house_sub_contract_chart(&report(), Entity::Taqwa);
        assert_eq!(c.kind, ChartKind::Pie);
        assert_eq!(c.points.len(), 2);
        assert_eq!(c.points[0].value, 0.0);
    }

    #[test]
    fn monthly_skips_missing_totals() {
        let c = monthly_comparison_chart(&report());
        assert_eq!(c.kind, ChartKind::Line);
        assert_eq!(c.kind.to_string(), "Line Chart");
        assert_eq!(c.points.len(), 1);
        assert_eq!(c.points[0].label, "Lantabur");
        assert!(c.points[0].percentage.is_none());
    }

    #[test]
    fn all_charts_drops_empty_series() {
        let charts = all_charts(&report());
        // Taqwa has no loading capacity items.
        assert_eq!(charts.len(), 4);
        assert!(charts.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn kind_labels_and_json_payload() {
        assert_eq!(ChartKind::Pie.to_string(), "Pie Chart");
        let json = in_house_sub_contract_chart(&report(), Entity::Lantabur).to_json();
        assert!(json.starts_with('['));
        assert!(json.contains("\"In-House\""));
    }
}
