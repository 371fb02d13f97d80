use super::LedgerClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::parse_json;
use crate::types::{
    Document, DocumentBookResponse, DocumentCreate, DocumentCreateResponse, DocumentListQuery,
    DocumentType, LedgerRow,
};

const DOCUMENTS: &str = "/api/documents";

impl LedgerClient {
    pub fn build_list_documents(&self, query: &DocumentListQuery) -> HttpRequest {
        let route = format!("{DOCUMENTS}{}", query.query().render());
        self.request(HttpMethod::Get, &route)
    }

    pub fn parse_list_documents(&self, response: HttpResponse) -> Result<Vec<Document>, ApiError> {
        self.parse_list(response)
    }

    pub fn build_create_document(&self, input: &DocumentCreate) -> Result<HttpRequest, ApiError> {
        if let DocumentType::Other(other) = &input.doc_type {
            return Err(ApiError::InvalidInput(format!("unknown document type {other:?}")));
        }
        self.json_request(HttpMethod::Post, DOCUMENTS, input)
    }

    pub fn parse_create_document(
        &self,
        response: HttpResponse,
    ) -> Result<DocumentCreateResponse, ApiError> {
        parse_json(response)
    }

    /// Moves a buffered document into the ledger.
    pub fn build_book_document(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Post, &format!("{DOCUMENTS}/{id}/book"))
    }

    pub fn parse_book_document(
        &self,
        response: HttpResponse,
    ) -> Result<DocumentBookResponse, ApiError> {
        parse_json(response)
    }

    pub fn build_list_ledger(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/ledger")
    }

    pub fn parse_list_ledger(&self, response: HttpResponse) -> Result<Vec<LedgerRow>, ApiError> {
        self.parse_list(response)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::json_response;
    use super::*;
    use crate::types::DocumentStatus;

    fn client() -> LedgerClient {
        LedgerClient::new("http://localhost:8000")
    }

    #[test]
    fn list_buffer_documents() {
        let req = client().build_list_documents(&DocumentListQuery {
            doc_type: None,
            status: Some(DocumentStatus::Buffer),
        });
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/api/documents?status=BUFFER");
    }

    #[test]
    fn list_all_documents() {
        let req = client().build_list_documents(&DocumentListQuery::default());
        assert_eq!(req.path, "http://localhost:8000/api/documents");
    }

    #[test]
    fn parse_documents_in_data_envelope() {
        let docs = client()
            .parse_list_documents(json_response(
                200,
                r#"{"data":[{"id":1,"type":"COST","status":"BUF","description":"Paliwo","gross_amount":"123.00"}]}"#,
            ))
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].status, DocumentStatus::Buffer);
        assert_eq!(docs[0].doc_type, DocumentType::Cost);
        assert_eq!(docs[0].gross_amount, Some(123.0));
    }

    #[test]
    fn unknown_type_does_not_fail_the_list() {
        let docs = client()
            .parse_list_documents(json_response(
                200,
                r#"{"data":[{"id":1,"type":"COST","status":"BUFFER"},{"id":2,"type":"CORRECTION","status":"BOOKED"}]}"#,
            ))
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].doc_type, DocumentType::Other("CORRECTION".to_string()));
    }

    #[test]
    fn record_with_both_key_spellings_is_listed() {
        let docs = client()
            .parse_list_documents(json_response(
                200,
                r#"{"data":[{"id":1,"type":"COST","status":"BUFFER","issueDate":"2024-03-01","issue_date":"2024-03-01","netAmount":"1","net_amount":"1"}]}"#,
            ))
            .unwrap();
        assert_eq!(docs[0].issue_date.as_deref(), Some("2024-03-01"));
        assert_eq!(docs[0].net_amount, Some(1.0));
    }

    #[test]
    fn create_with_unknown_type_is_refused() {
        let input = DocumentCreate {
            doc_type: DocumentType::Other("CORRECTION".to_string()),
            number: None,
            description: None,
            issue_date: "2024-03-01".to_string(),
            contractor_id: None,
            net_amount: 1.0,
            vat_amount: 0.0,
        };
        let err = client().build_create_document(&input).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn book_request() {
        let req = client().build_book_document(42);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/api/documents/42/book");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_book_conflict() {
        let err = client()
            .parse_book_document(json_response(409, r#"{"message":"Document already booked."}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "API error 409: Document already booked.");
    }

    #[test]
    fn parse_ledger_rows_envelope() {
        let rows = client()
            .parse_list_ledger(json_response(
                200,
                r#"{"rows":[{"id":1,"lp":1,"document_id":4,"entry_date":"2024-03-01","income":"1000.50","cost":null}]}"#,
            ))
            .unwrap();
        assert_eq!(rows[0].document_id, Some(4));
        assert_eq!(rows[0].income, Some(1000.5));
        assert!(rows[0].cost.is_none());
    }
}
