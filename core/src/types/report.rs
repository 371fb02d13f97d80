use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Period of a KPiR (revenue and expense ledger) PDF report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum KpirPeriod {
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
    Year { year: i32 },
}

impl KpirPeriod {
    pub fn validate(&self) -> Result<(), ApiError> {
        match *self {
            KpirPeriod::Month { month, .. } if !(1..=12).contains(&month) => Err(
                ApiError::InvalidInput(format!("month must be within 1..=12, got {month}")),
            ),
            KpirPeriod::Quarter { quarter, .. } if !(1..=4).contains(&quarter) => Err(
                ApiError::InvalidInput(format!("quarter must be within 1..=4, got {quarter}")),
            ),
            _ => Ok(()),
        }
    }

    /// Name used when the server does not suggest one.
    pub fn fallback_filename(&self) -> String {
        match *self {
            KpirPeriod::Month { year, month } => format!("kpir-{year}-{month:02}.pdf"),
            KpirPeriod::Quarter { year, quarter } => format!("kpir-{year}-Q{quarter}.pdf"),
            KpirPeriod::Year { year } => format!("kpir-{year}.pdf"),
        }
    }
}

/// Parameters of the per-contractor XLSX turnover report.
///
/// Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorReportParams {
    pub date_from: String,
    pub date_to: String,
    pub include_income: bool,
    pub include_cost: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor_id: Option<u64>,
}

impl ContractorReportParams {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.date_from.trim().is_empty() || self.date_to.trim().is_empty() {
            return Err(ApiError::InvalidInput("both report dates are required".to_string()));
        }
        // ISO dates compare correctly as strings.
        if self.date_from > self.date_to {
            return Err(ApiError::InvalidInput(format!(
                "dateFrom {} is after dateTo {}",
                self.date_from, self.date_to
            )));
        }
        if !self.include_income && !self.include_cost {
            return Err(ApiError::InvalidInput(
                "select income, cost or both".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fallback_filename(&self) -> String {
        format!("raport-kontrahenci-{}_{}.xlsx", self.date_from, self.date_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_names() {
        assert_eq!(
            KpirPeriod::Month { year: 2024, month: 3 }.fallback_filename(),
            "kpir-2024-03.pdf"
        );
        assert_eq!(
            KpirPeriod::Quarter { year: 2024, quarter: 2 }.fallback_filename(),
            "kpir-2024-Q2.pdf"
        );
        assert_eq!(KpirPeriod::Year { year: 2023 }.fallback_filename(), "kpir-2023.pdf");
    }

    #[test]
    fn period_wire_shape() {
        let v = serde_json::to_value(KpirPeriod::Month { year: 2024, month: 3 }).unwrap();
        assert_eq!(v, serde_json::json!({"mode": "month", "year": 2024, "month": 3}));
        let v = serde_json::to_value(KpirPeriod::Year { year: 2024 }).unwrap();
        assert_eq!(v, serde_json::json!({"mode": "year", "year": 2024}));
    }

    #[test]
    fn period_ranges() {
        assert!(KpirPeriod::Month { year: 2024, month: 0 }.validate().is_err());
        assert!(KpirPeriod::Month { year: 2024, month: 13 }.validate().is_err());
        assert!(KpirPeriod::Quarter { year: 2024, quarter: 5 }.validate().is_err());
        assert!(KpirPeriod::Quarter { year: 2024, quarter: 4 }.validate().is_ok());
    }

    #[test]
    fn contractor_report_params() {
        let params = ContractorReportParams {
            date_from: "2024-01-01".to_string(),
            date_to: "2024-03-31".to_string(),
            include_income: true,
            include_cost: false,
            contractor_id: None,
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.fallback_filename(), "raport-kontrahenci-2024-01-01_2024-03-31.xlsx");
        let v = serde_json::to_value(&params).unwrap();
        assert_eq!(v["dateFrom"], "2024-01-01");
        assert_eq!(v["includeCost"], false);
        assert!(v.get("contractorId").is_none());

        let reversed = ContractorReportParams {
            date_from: "2024-04-01".to_string(),
            ..params.clone()
        };
        assert!(reversed.validate().is_err());
        let nothing = ContractorReportParams {
            include_income: false,
            ..params
        };
        assert!(nothing.validate().is_err());
    }
}
