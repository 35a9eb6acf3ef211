//! Statistics payload and period comparisons.
//!
//! Numbers from the backend may be missing, `null`, or strings, so every
//! numeric field goes through [`coerce_number`] while deserializing.

use crate::percent::{PercentChange, coerce_number};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Caption for the comparison column, e.g. "vs last month".
    #[must_use]
    pub const fn comparison_caption(self) -> &'static str {
        match self {
            Self::Week => "vs last week",
            Self::Month => "vs last month",
            Self::Year => "vs last year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0.0, coerce_number))
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodFigures {
    #[serde(default, deserialize_with = "lenient_number")]
    pub current: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub previous: f64,
}

impl PeriodFigures {
    #[must_use]
    pub fn change(&self) -> PercentChange {
        PercentChange::between(self.current, self.previous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFigures {
    #[serde(default, deserialize_with = "lenient_number")]
    pub in_stock: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub low_stock: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub out_of_stock: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub units_sold: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub revenue: f64,
}

/// Body of the backend's statistics endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsPayload {
    #[serde(default)]
    pub sales: PeriodFigures,
    #[serde(default)]
    pub purchase: PeriodFigures,
    #[serde(default)]
    pub orders: PeriodFigures,
    #[serde(default)]
    pub products: PeriodFigures,
    #[serde(default)]
    pub inventory: InventoryFigures,
    #[serde(default, alias = "top_products")]
    pub top_products: Vec<TopProduct>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Sales,
    Purchase,
    Orders,
    Products,
}

impl Metric {
    pub const ALL: [Self; 4] = [Self::Sales, Self::Purchase, Self::Orders, Self::Products];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Purchase => "Purchase",
            Self::Orders => "Orders",
            Self::Products => "Products",
        }
    }

    /// Whether the metric is a money amount rather than a count.
    #[must_use]
    pub const fn is_amount(self) -> bool {
        matches!(self, Self::Sales | Self::Purchase)
    }
}

impl StatisticsPayload {
    #[must_use]
    pub const fn figures(&self, metric: Metric) -> PeriodFigures {
        match metric {
            Metric::Sales => self.sales,
            Metric::Purchase => self.purchase,
            Metric::Orders => self.orders,
            Metric::Products => self.products,
        }
    }

    /// Sales minus purchases for both periods.
    #[must_use]
    pub fn profit(&self) -> PeriodFigures {
        PeriodFigures {
            current: self.sales.current - self.purchase.current,
            previous: self.sales.previous - self.purchase.previous,
        }
    }

    /// Top products ordered by units sold, highest first.
    #[must_use]
    pub fn ranked_products(&self, limit: usize) -> Vec<&TopProduct> {
        let mut ranked: Vec<&TopProduct> = self.top_products.iter().collect();
        ranked.sort_by(|a, b| {
            b.units_sold
                .total_cmp(&a.units_sold)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked.truncate(limit);
        ranked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub metric: Metric,
    pub period: Period,
    pub current: f64,
    pub previous: f64,
    pub change: String,
    #[serde(skip)]
    pub percent: PercentChange,
}

#[must_use]
pub fn build_comparisons(payload: &StatisticsPayload, period: Period) -> Vec<ComparisonRecord> {
    Metric::ALL
        .into_iter()
        .map(|metric| {
            let figures = payload.figures(metric);
            let percent = figures.change();
            ComparisonRecord {
                metric,
                period,
                current: figures.current,
                previous: figures.previous,
                change: percent.to_string(),
                percent,
            }
        })
        .collect()
}
