use crate::domain::payroll::LocationResult;

/// Commission and wages of one location as shares of its revenue.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRevenueStats {
    pub location_id: String,
    pub title: String,
    pub revenue: f64,
    pub percent_amount: f64,
    pub wage_amount: f64,
    pub percent_share: Option<f64>,
    pub wage_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevenueStats {
    pub locations: Vec<LocationRevenueStats>,
    pub revenue: f64,
    pub percent_amount: f64,
    pub wage_amount: f64,
    pub percent_share: Option<f64>,
    pub wage_share: Option<f64>,
}

pub fn revenue_stats(results: &[LocationResult]) -> RevenueStats {
    let locations: Vec<LocationRevenueStats> = results
        .iter()
        .map(|result| LocationRevenueStats {
            location_id: result.location_id.clone(),
            title: result.location_title.clone(),
            revenue: result.revenue_total,
            percent_amount: result.totals.percent,
            wage_amount: result.totals.total,
            percent_share: share(result.totals.percent, result.revenue_total),
            wage_share: share(result.totals.total, result.revenue_total),
        })
        .collect();

    let revenue: f64 = locations.iter().map(|stat| stat.revenue).sum();
    let percent_amount: f64 = locations.iter().map(|stat| stat.percent_amount).sum();
    let wage_amount: f64 = locations.iter().map(|stat| stat.wage_amount).sum();

    RevenueStats {
        percent_share: share(percent_amount, revenue),
        wage_share: share(wage_amount, revenue),
        locations,
        revenue,
        percent_amount,
        wage_amount,
    }
}

/// `part` as a percentage of `whole`; `None` when `whole` is zero or not finite.
pub fn share(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 || !whole.is_finite() {
        return None;
    }
    Some(part / whole * 100.0)
}

pub fn format_share(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.1}%"),
        None => "n/a".to_string(),
    }
}
