use super::query_table;
use crate::error::ReportError;
use crate::storage::{Storage, DATE_FORMAT};
use chrono::NaiveDate;
use common::model::report::ReportTable;
use rusqlite::params_from_iter;
use std::str::FromStr;

/// The fixed catalogue of aggregate tables offered to dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insight {
    DonationsByProvider,
    ProviderTypes,
    FrequentFoods,
    DemandByLocation,
    ClaimStatus,
    AverageQuantityByFoodType,
    NearExpiry,
    Unclaimed,
    ReceiverActivity,
    DailyClaims,
    WastageRisk,
    ProviderCities,
    ClaimRatioByLocation,
    DemandVsSupply,
    MealTypesByLocation,
}

impl Insight {
    pub const ALL: [Insight; 15] = [
        Insight::DonationsByProvider,
        Insight::ProviderTypes,
        Insight::FrequentFoods,
        Insight::DemandByLocation,
        Insight::ClaimStatus,
        Insight::AverageQuantityByFoodType,
        Insight::NearExpiry,
        Insight::Unclaimed,
        Insight::ReceiverActivity,
        Insight::DailyClaims,
        Insight::WastageRisk,
        Insight::ProviderCities,
        Insight::ClaimRatioByLocation,
        Insight::DemandVsSupply,
        Insight::MealTypesByLocation,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Insight::DonationsByProvider => "donations-by-provider",
            Insight::ProviderTypes => "provider-types",
            Insight::FrequentFoods => "frequent-foods",
            Insight::DemandByLocation => "demand-by-location",
            Insight::ClaimStatus => "claim-status",
            Insight::AverageQuantityByFoodType => "average-quantity-by-food-type",
            Insight::NearExpiry => "near-expiry",
            Insight::Unclaimed => "unclaimed",
            Insight::ReceiverActivity => "receiver-activity",
            Insight::DailyClaims => "daily-claims",
            Insight::WastageRisk => "wastage-risk",
            Insight::ProviderCities => "provider-cities",
            Insight::ClaimRatioByLocation => "claim-ratio-by-location",
            Insight::DemandVsSupply => "demand-vs-supply",
            Insight::MealTypesByLocation => "meal-types-by-location",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Insight::DonationsByProvider => "Total donations by provider",
            Insight::ProviderTypes => "Provider types by total quantity",
            Insight::FrequentFoods => "Most frequent food items",
            Insight::DemandByLocation => "Highest demand locations",
            Insight::ClaimStatus => "Claim status distribution",
            Insight::AverageQuantityByFoodType => "Average quantity per food type",
            Insight::NearExpiry => "Near-expiry items",
            Insight::Unclaimed => "Unclaimed items",
            Insight::ReceiverActivity => "Claims per receiver",
            Insight::DailyClaims => "Daily claims trend",
            Insight::WastageRisk => "Expired items still present",
            Insight::ProviderCities => "Provider cities with most donations",
            Insight::ClaimRatioByLocation => "Claim-to-listing ratio per location",
            Insight::DemandVsSupply => "Demand vs supply by food type",
            Insight::MealTypesByLocation => "Meal type distribution by location",
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Insight::DonationsByProvider => {
                "SELECT p.Provider_ID, p.Name AS Provider, COUNT(l.Food_ID) AS Listings,
                        COALESCE(SUM(l.Quantity), 0) AS Total_Quantity
                 FROM providers p
                 LEFT JOIN food_listings l ON l.Provider_ID = p.Provider_ID
                 GROUP BY p.Provider_ID, p.Name
                 ORDER BY Total_Quantity DESC, p.Provider_ID"
            }
            Insight::ProviderTypes => {
                "SELECT p.Type AS Provider_Type, COALESCE(SUM(l.Quantity), 0) AS Total_Quantity,
                        COUNT(l.Food_ID) AS Listings
                 FROM providers p
                 LEFT JOIN food_listings l ON l.Provider_ID = p.Provider_ID
                 GROUP BY p.Type
                 ORDER BY Total_Quantity DESC"
            }
            Insight::FrequentFoods => {
                "SELECT Food_Name, COUNT(*) AS Appearances, COALESCE(SUM(Quantity), 0) AS Total_Quantity
                 FROM food_listings
                 GROUP BY Food_Name
                 ORDER BY Appearances DESC, Food_Name"
            }
            Insight::DemandByLocation => {
                "SELECT l.Location, COUNT(c.Claim_ID) AS Claims
                 FROM claims c
                 JOIN food_listings l ON l.Food_ID = c.Food_ID
                 GROUP BY l.Location
                 ORDER BY Claims DESC, l.Location"
            }
            Insight::ClaimStatus => {
                "SELECT Status, COUNT(*) AS Count FROM claims GROUP BY Status ORDER BY Status"
            }
            Insight::AverageQuantityByFoodType => {
                "SELECT Food_Type, ROUND(AVG(Quantity), 2) AS Avg_Quantity
                 FROM food_listings
                 GROUP BY Food_Type
                 ORDER BY Avg_Quantity DESC"
            }
            Insight::NearExpiry => {
                "SELECT Food_ID, Food_Name, Quantity, Expiry_Date, Location
                 FROM food_listings
                 WHERE date(Expiry_Date) BETWEEN date(?1) AND date(?1, ?2)
                 ORDER BY date(Expiry_Date), Food_ID"
            }
            Insight::Unclaimed => {
                "SELECT l.Food_ID, l.Food_Name, l.Location, l.Quantity
                 FROM food_listings l
                 LEFT JOIN claims c ON c.Food_ID = l.Food_ID
                 WHERE c.Food_ID IS NULL
                 ORDER BY l.Food_ID"
            }
            Insight::ReceiverActivity => {
                "SELECT r.Receiver_ID, r.Name AS Receiver, COUNT(c.Claim_ID) AS Claims
                 FROM receivers r
                 LEFT JOIN claims c ON c.Receiver_ID = r.Receiver_ID
                 GROUP BY r.Receiver_ID, r.Name
                 ORDER BY Claims DESC, r.Receiver_ID"
            }
            Insight::DailyClaims => {
                "SELECT substr(Timestamp, 1, 10) AS Day, COUNT(*) AS Claims
                 FROM claims
                 GROUP BY substr(Timestamp, 1, 10)
                 ORDER BY Day"
            }
            Insight::WastageRisk => {
                "SELECT Food_ID, Food_Name, Location, Expiry_Date
                 FROM food_listings
                 WHERE date(Expiry_Date) < date(?1)
                 ORDER BY date(Expiry_Date), Food_ID"
            }
            Insight::ProviderCities => {
                "SELECT p.City, COUNT(l.Food_ID) AS Listings, COALESCE(SUM(l.Quantity), 0) AS Total_Quantity
                 FROM providers p
                 LEFT JOIN food_listings l ON l.Provider_ID = p.Provider_ID
                 GROUP BY p.City
                 ORDER BY Total_Quantity DESC"
            }
            Insight::ClaimRatioByLocation => {
                "WITH listings AS (
                     SELECT Location, COUNT(*) AS L FROM food_listings GROUP BY Location
                 ), claims_per_location AS (
                     SELECT l.Location AS Location, COUNT(c.Claim_ID) AS C
                     FROM claims c JOIN food_listings l ON l.Food_ID = c.Food_ID
                     GROUP BY l.Location
                 )
                 SELECT listings.Location, L AS Listings, COALESCE(C, 0) AS Claims,
                        ROUND(CAST(COALESCE(C, 0) AS REAL) / NULLIF(L, 0), 2) AS Claim_to_Listings_Ratio
                 FROM listings LEFT JOIN claims_per_location USING (Location)
                 ORDER BY Claim_to_Listings_Ratio DESC"
            }
            Insight::DemandVsSupply => {
                "WITH supply AS (
                     SELECT Food_Type, SUM(Quantity) AS Supply_Qty FROM food_listings GROUP BY Food_Type
                 ), demand AS (
                     SELECT l.Food_Type, COUNT(c.Claim_ID) AS Demand_Claims
                     FROM claims c JOIN food_listings l ON l.Food_ID = c.Food_ID
                     GROUP BY l.Food_Type
                 )
                 SELECT s.Food_Type, s.Supply_Qty, COALESCE(d.Demand_Claims, 0) AS Demand_Claims
                 FROM supply s LEFT JOIN demand d ON d.Food_Type = s.Food_Type
                 ORDER BY Demand_Claims DESC"
            }
            Insight::MealTypesByLocation => {
                "SELECT Location, Meal_Type, COUNT(*) AS Listings
                 FROM food_listings
                 GROUP BY Location, Meal_Type
                 ORDER BY Listings DESC"
            }
        }
    }

    fn params(&self, today: NaiveDate, near_expiry_days: u32) -> Vec<String> {
        let today = today.format(DATE_FORMAT).to_string();
        match self {
            Insight::NearExpiry => vec![today, format!("+{near_expiry_days} day")],
            Insight::WastageRisk => vec![today],
            _ => Vec::new(),
        }
    }
}

impl FromStr for Insight {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Insight::ALL
            .into_iter()
            .find(|insight| insight.slug() == s)
            .ok_or_else(|| ReportError::UnknownInsight(s.to_string()))
    }
}

/// Runs one insight. Date based insights are evaluated relative to `today`.
pub fn run_insight(
    storage: &Storage,
    insight: Insight,
    today: NaiveDate,
    near_expiry_days: u32,
) -> Result<ReportTable, ReportError> {
    let params = params_from_iter(insight.params(today, near_expiry_days));
    Ok(query_table(storage, insight.title(), insight.sql(), params)?)
}
