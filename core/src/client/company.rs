use super::LedgerClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::{parse_json, parse_unit};
use crate::types::{Company, CompanyCreate, CompanyListParams, CompanyUpdate, CompanyUser};

const COMPANIES: &str = "/api/admin/companies";

impl LedgerClient {
    pub fn build_list_companies(&self, params: &CompanyListParams) -> HttpRequest {
        let route = format!("{COMPANIES}{}", params.query().render());
        self.request(HttpMethod::Get, &route)
    }

    /// The admin endpoint answers with a paginator envelope; `meta` and
    /// `links` are dropped.
    pub fn parse_list_companies(&self, response: HttpResponse) -> Result<Vec<Company>, ApiError> {
        self.parse_list(response)
    }

    pub fn build_get_company(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("{COMPANIES}/{id}"))
    }

    pub fn parse_get_company(&self, response: HttpResponse) -> Result<Company, ApiError> {
        parse_json(response)
    }

    pub fn build_create_company(&self, input: &CompanyCreate) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, COMPANIES, input)
    }

    pub fn parse_create_company(&self, response: HttpResponse) -> Result<Company, ApiError> {
        parse_json(response)
    }

    pub fn build_update_company(
        &self,
        id: u64,
        input: &CompanyUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, &format!("{COMPANIES}/{id}"), input)
    }

    pub fn parse_update_company(&self, response: HttpResponse) -> Result<Company, ApiError> {
        parse_json(response)
    }

    pub fn build_delete_company(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("{COMPANIES}/{id}"))
    }

    pub fn parse_delete_company(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_unit(response)
    }

    pub fn build_list_company_users(&self, company_id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("{COMPANIES}/{company_id}/users"))
    }

    pub fn parse_list_company_users(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<CompanyUser>, ApiError> {
        self.parse_list(response)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{empty_response, json_response};
    use super::*;
    use crate::types::{CompanySort, SortDir};

    fn client() -> LedgerClient {
        LedgerClient::new("http://localhost:8000")
    }

    #[test]
    fn list_without_filters() {
        let req = client().build_list_companies(&CompanyListParams::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/api/admin/companies");
    }

    #[test]
    fn list_with_filters() {
        let req = client().build_list_companies(&CompanyListParams {
            q: Some("biuro".to_string()),
            active: Some(false),
            sort: Some(CompanySort::Name),
            dir: Some(SortDir::Asc),
        });
        assert_eq!(
            req.path,
            "http://localhost:8000/api/admin/companies?q=biuro&active=false&sort=name&dir=asc"
        );
    }

    #[test]
    fn parse_paginated_list() {
        let companies = client()
            .parse_list_companies(json_response(
                200,
                r#"{"data":[{"id":1,"name":"Acme","taxId":"123","active":true}],"meta":{"total":1},"links":{}}"#,
            ))
            .unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, "Acme");
    }

    #[test]
    fn update_is_a_patch() {
        let req = client()
            .build_update_company(
                4,
                &CompanyUpdate {
                    name: Some("Nowa".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:8000/api/admin/companies/4");
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"Nowa"}"#));
    }

    #[test]
    fn delete_and_parse() {
        let req = client().build_delete_company(9);
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
        client().parse_delete_company(empty_response(204)).unwrap();
    }

    #[test]
    fn get_missing_company() {
        let err = client()
            .parse_get_company(json_response(404, r#"{"message":"Not found"}"#))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn users_route() {
        let req = client().build_list_company_users(3);
        assert_eq!(req.path, "http://localhost:8000/api/admin/companies/3/users");
    }
}
