//! Configuration loading and representation.

use core::str::FromStr;

use stockledger_inventory::ForecastPolicy;

/// How a consumption that cannot be fully covered is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsumptionMode {
    /// Check sufficiency first; a short request mutates nothing.
    #[default]
    Atomic,
    /// Decrement batch by batch; a short request leaves its draws applied.
    PartialApply,
}

impl FromStr for ConsumptionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(ConsumptionMode::Atomic),
            "partial" | "partial_apply" => Ok(ConsumptionMode::PartialApply),
            other => Err(format!("unknown consumption mode '{other}' (expected atomic or partial)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    pub consumption_mode: ConsumptionMode,
    pub forecast: ForecastPolicy,
    /// Default horizon of the expiring-stock report.
    pub expiring_within_days: i64,
    /// Default lookback of the audit trail.
    pub audit_days: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            consumption_mode: ConsumptionMode::default(),
            forecast: ForecastPolicy::default(),
            expiring_within_days: 30,
            audit_days: 30,
        }
    }
}

impl LedgerConfig {
    /// Read `STOCKLEDGER_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            consumption_mode: parse_or(
                &lookup,
                "STOCKLEDGER_CONSUMPTION_MODE",
                defaults.consumption_mode,
            ),
            forecast: ForecastPolicy {
                window_days: days_or(
                    &lookup,
                    "STOCKLEDGER_FORECAST_WINDOW_DAYS",
                    defaults.forecast.window_days,
                ),
                critical_days: days_or(
                    &lookup,
                    "STOCKLEDGER_CRITICAL_DAYS",
                    defaults.forecast.critical_days,
                ),
                warning_days: days_or(
                    &lookup,
                    "STOCKLEDGER_WARNING_DAYS",
                    defaults.forecast.warning_days,
                ),
            },
            expiring_within_days: days_or(
                &lookup,
                "STOCKLEDGER_EXPIRING_WITHIN_DAYS",
                defaults.expiring_within_days,
            ),
            audit_days: days_or(&lookup, "STOCKLEDGER_AUDIT_DAYS", defaults.audit_days),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(name) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!("{name}={raw:?} is invalid ({e}); using default");
            default
        }),
    }
}

/// Upper bound for day-count settings (100 years).
pub const MAX_CONFIG_DAYS: i64 = 36_500;

fn days_or(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: i64) -> i64 {
    let days: i64 = parse_or(lookup, name, default);
    if days < 0 {
        tracing::warn!("{name}={days} is negative; using default");
        return default;
    }
    if days > MAX_CONFIG_DAYS {
        tracing::warn!("{name}={days} exceeds {MAX_CONFIG_DAYS} days; using default");
        return default;
    }
    days
}
