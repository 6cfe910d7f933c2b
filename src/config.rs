use std::collections::HashMap;
use std::env;

use chrono::NaiveTime;

use crate::models::Currency;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub admin_email: String,
    pub company_name: String,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub payment_webhook_secret: String,
    pub pricing: PricingConfig,
    pub hours: WorkingHours,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "slotbook.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_default(),
            company_name: env::var("COMPANY_NAME")
                .unwrap_or_else(|_| "Slotbook Consulting".to_string()),
            mail_api_url: env::var("MAIL_API_URL").unwrap_or_default(),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM").unwrap_or_default(),
            payment_webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET").unwrap_or_default(),
            pricing: PricingConfig::from_env(),
            hours: WorkingHours::from_env(),
        }
    }
}

/// Consultation prices in integer cents, keyed by duration in minutes.
/// Overridable per currency via `PRICING_CAD` / `PRICING_MAD`, formatted
/// like "30:5000,60:9000,90:13000".
#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub cad: HashMap<i32, i64>,
    pub mad: HashMap<i32, i64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cad: HashMap::from([(30, 5_000), (60, 9_000), (90, 13_000)]),
            mad: HashMap::from([(30, 50_000), (60, 90_000), (90, 130_000)]),
        }
    }
}

impl PricingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cad: env::var("PRICING_CAD")
                .ok()
                .and_then(|v| parse_price_table(&v))
                .unwrap_or(defaults.cad),
            mad: env::var("PRICING_MAD")
                .ok()
                .and_then(|v| parse_price_table(&v))
                .unwrap_or(defaults.mad),
        }
    }

    pub fn amount_cents(&self, currency: Currency, duration_minutes: i32) -> Option<i64> {
        let table = match currency {
            Currency::Cad => &self.cad,
            Currency::Mad => &self.mad,
        };
        table.get(&duration_minutes).copied()
    }
}

fn parse_price_table(raw: &str) -> Option<HashMap<i32, i64>> {
    let mut table = HashMap::new();
    for entry in raw.split(',') {
        let (duration, cents) = entry.split_once(':')?;
        let duration: i32 = duration.trim().parse().ok()?;
        let cents: i64 = cents.trim().parse().ok()?;
        table.insert(duration, cents);
    }
    if table.is_empty() {
        None
    } else {
        Some(table)
    }
}

/// The two daily working bands the legacy slot grid is generated from.
/// Overridable via `WORK_MORNING` / `WORK_AFTERNOON` ("09:00-12:00").
#[derive(Clone, Debug)]
pub struct WorkingHours {
    pub morning_start: NaiveTime,
    pub morning_end: NaiveTime,
    pub afternoon_start: NaiveTime,
    pub afternoon_end: NaiveTime,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            morning_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            morning_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            afternoon_start: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            afternoon_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }
}

impl WorkingHours {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let morning = env::var("WORK_MORNING").ok().and_then(|v| parse_band(&v));
        let afternoon = env::var("WORK_AFTERNOON").ok().and_then(|v| parse_band(&v));
        Self {
            morning_start: morning.map(|b| b.0).unwrap_or(defaults.morning_start),
            morning_end: morning.map(|b| b.1).unwrap_or(defaults.morning_end),
            afternoon_start: afternoon.map(|b| b.0).unwrap_or(defaults.afternoon_start),
            afternoon_end: afternoon.map(|b| b.1).unwrap_or(defaults.afternoon_end),
        }
    }

    pub fn bands(&self) -> [(NaiveTime, NaiveTime); 2] {
        [
            (self.morning_start, self.morning_end),
            (self.afternoon_start, self.afternoon_end),
        ]
    }
}

fn parse_band(raw: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = raw.split_once('-')?;
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").ok()?;
    if start < end {
        Some((start, end))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pricing_matches_rate_card() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.amount_cents(Currency::Cad, 30), Some(5_000));
        assert_eq!(pricing.amount_cents(Currency::Cad, 60), Some(9_000));
        assert_eq!(pricing.amount_cents(Currency::Cad, 90), Some(13_000));
        assert_eq!(pricing.amount_cents(Currency::Mad, 60), Some(90_000));
        assert_eq!(pricing.amount_cents(Currency::Cad, 45), None);
    }

    #[test]
    fn price_table_parses_and_rejects_garbage() {
        let table = parse_price_table("30:5000, 60:9000").unwrap();
        assert_eq!(table[&30], 5_000);
        assert_eq!(table[&60], 9_000);
        assert!(parse_price_table("30-5000").is_none());
        assert!(parse_price_table("").is_none());
    }

    #[test]
    fn band_parse_requires_ordered_times() {
        let (start, end) = parse_band("09:00-12:00").unwrap();
        assert_eq!(start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert!(parse_band("12:00-09:00").is_none());
        assert!(parse_band("nonsense").is_none());
    }
}
