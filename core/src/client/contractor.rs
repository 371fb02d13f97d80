use super::LedgerClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::{parse_json, parse_unit};
use crate::types::{Contractor, ContractorCreate, ContractorUpdate, IdResponse};

const CONTRACTORS: &str = "/api/contractors";

impl LedgerClient {
    pub fn build_list_contractors(&self) -> HttpRequest {
        self.request(HttpMethod::Get, CONTRACTORS)
    }

    pub fn parse_list_contractors(&self, response: HttpResponse) -> Result<Vec<Contractor>, ApiError> {
        self.parse_list(response)
    }

    pub fn build_create_contractor(&self, input: &ContractorCreate) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, CONTRACTORS, input)
    }

    pub fn parse_create_contractor(&self, response: HttpResponse) -> Result<IdResponse, ApiError> {
        parse_json(response)
    }

    pub fn build_update_contractor(
        &self,
        id: u64,
        input: &ContractorUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, &format!("{CONTRACTORS}/{id}"), input)
    }

    pub fn parse_update_contractor(&self, response: HttpResponse) -> Result<IdResponse, ApiError> {
        parse_json(response)
    }

    pub fn build_delete_contractor(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("{CONTRACTORS}/{id}"))
    }

    pub fn parse_delete_contractor(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_unit(response)
    }
}
