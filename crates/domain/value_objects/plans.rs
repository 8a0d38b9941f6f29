use serde::Serialize;

pub const PLAN_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PlanDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub monthly_price_minor: i64,
    pub max_listings: Option<u32>,
}

pub const PLANS: [PlanDefinition; 2] = [
    PlanDefinition {
        id: "starter",
        name: "Starter",
        monthly_price_minor: 49_900,
        max_listings: Some(3),
    },
    PlanDefinition {
        id: "professional",
        name: "Professional",
        monthly_price_minor: 99_900,
        max_listings: None,
    },
];

/// Supported durations in months with their discount percentage.
pub const DURATION_DISCOUNTS: [(i32, i64); 4] = [(1, 0), (3, 5), (6, 10), (12, 20)];

pub fn find_plan(plan_id: &str) -> Option<&'static PlanDefinition> {
    PLANS.iter().find(|plan| plan.id == plan_id)
}

pub fn discount_percent(duration_months: i32) -> Option<i64> {
    DURATION_DISCOUNTS
        .iter()
        .find(|(months, _)| *months == duration_months)
        .map(|(_, percent)| *percent)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PlanQuote {
    pub original_amount_minor: i64,
    pub discount_amount_minor: i64,
    pub final_amount_minor: i64,
}

/// Prices a plan for a duration; `None` when the duration is not offered.
pub fn quote(plan: &PlanDefinition, duration_months: i32) -> Option<PlanQuote> {
    let percent = discount_percent(duration_months)?;
    let original_amount_minor = plan.monthly_price_minor * i64::from(duration_months);
    let discount_amount_minor = (original_amount_minor * percent + 50) / 100;

    Some(PlanQuote {
        original_amount_minor,
        discount_amount_minor,
        final_amount_minor: original_amount_minor - discount_amount_minor,
    })
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanOptionDto {
    pub duration_months: i32,
    pub discount_percent: i64,
    #[serde(flatten)]
    pub quote: PlanQuote,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanDto {
    pub id: &'static str,
    pub name: &'static str,
    pub currency: &'static str,
    pub monthly_price_minor: i64,
    pub max_listings: Option<u32>,
    pub options: Vec<PlanOptionDto>,
}

impl From<&PlanDefinition> for PlanDto {
    fn from(plan: &PlanDefinition) -> Self {
        let options = DURATION_DISCOUNTS
            .iter()
            .filter_map(|(months, percent)| {
                quote(plan, *months).map(|quote| PlanOptionDto {
                    duration_months: *months,
                    discount_percent: *percent,
                    quote,
                })
            })
            .collect();

        Self {
            id: plan.id,
            name: plan.name,
            currency: PLAN_CURRENCY,
            monthly_price_minor: plan.monthly_price_minor,
            max_listings: plan.max_listings,
            options,
        }
    }
}
