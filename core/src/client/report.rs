use super::LedgerClient;
use crate::download::{parse_blob_response, Report};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ContractorReportParams, KpirPeriod};

impl LedgerClient {
    /// Rejects out-of-range months and quarters before anything is sent.
    pub fn build_kpir_report(&self, period: &KpirPeriod) -> Result<HttpRequest, ApiError> {
        period.validate()?;
        self.json_request(HttpMethod::Post, "/api/reports/kpir", period)
    }

    pub fn parse_kpir_report(
        &self,
        period: &KpirPeriod,
        response: HttpResponse,
    ) -> Result<Report, ApiError> {
        Ok(parse_blob_response(response)?.into_report(period.fallback_filename()))
    }

    pub fn build_contractors_report(
        &self,
        params: &ContractorReportParams,
    ) -> Result<HttpRequest, ApiError> {
        params.validate()?;
        self.json_request(HttpMethod::Post, "/api/reports/contractors-xlsx", params)
    }

    pub fn parse_contractors_report(
        &self,
        params: &ContractorReportParams,
        response: HttpResponse,
    ) -> Result<Report, ApiError> {
        Ok(parse_blob_response(response)?.into_report(params.fallback_filename()))
    }
}
