use chrono::NaiveDate;
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type LoanId = String;

/// Format of `loanDate`
pub const LOAN_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Active loan of a book to a member
pub struct LoanRecord {
    #[serde(rename = "loanID")]
    pub loan_id: LoanId,
    pub member_name: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    pub title: String,
    #[serde(rename = "bookID")]
    pub book_id: String,
    pub loan_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct NewLoanRequest {
    pub member_name: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    /// Date in YYYY-MM-DD format
    pub loan_date: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidLoanRequest {
    #[error("Field {0} must not be empty")]
    EmptyField(&'static str),

    #[error("loanDate {0} is not a YYYY-MM-DD date")]
    InvalidDate(String),
}

impl NewLoanRequest {
    pub fn validate(&self) -> Result<(), InvalidLoanRequest> {
        if self.member_name.trim().is_empty() {
            return Err(InvalidLoanRequest::EmptyField("memberName"));
        }
        if self.isbn.trim().is_empty() {
            return Err(InvalidLoanRequest::EmptyField("ISBN"));
        }
        NaiveDate::parse_from_str(&self.loan_date, LOAN_DATE_FORMAT)
            .map_err(|_| InvalidLoanRequest::InvalidDate(self.loan_date.clone()))?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
/// Query of GET /loans, every given field has to match
pub struct LoanFilter {
    #[serde(rename = "loanID", skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(rename = "ISBN", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "bookID", skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_date: Option<String>,
}

impl LoanFilter {
    pub fn matches(&self, loan: &LoanRecord) -> bool {
        fn field_matches(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().map_or(true, |expected| expected == actual)
        }

        field_matches(&self.loan_id, &loan.loan_id)
            && field_matches(&self.member_name, &loan.member_name)
            && field_matches(&self.isbn, &loan.isbn)
            && field_matches(&self.title, &loan.title)
            && field_matches(&self.book_id, &loan.book_id)
            && field_matches(&self.loan_date, &loan.loan_date)
    }

    /// JSON document contained in every matching loan document
    pub fn containment_document(&self) -> serde_json::Value {
        json!(self)
    }
}

#[cfg(test)]
mod api_tests {
    use super::*;

    fn request(loan_date: &str) -> NewLoanRequest {
        NewLoanRequest {
            member_name: "Ada".to_string(),
            isbn: "9780553294385".to_string(),
            loan_date: loan_date.to_string(),
        }
    }

    #[test]
    fn test_loan_uses_wire_field_names() {
        let loan = LoanRecord {
            loan_id: "l1".to_string(),
            member_name: "Ada".to_string(),
            isbn: "9780553294385".to_string(),
            title: "I, Robot".to_string(),
            book_id: "9780553294385".to_string(),
            loan_date: "2024-03-01".to_string(),
        };
        assert_eq!(
            json!(loan),
            json!({
                "loanID": "l1",
                "memberName": "Ada",
                "ISBN": "9780553294385",
                "title": "I, Robot",
                "bookID": "9780553294385",
                "loanDate": "2024-03-01"
            })
        );
    }

    #[test]
    fn test_request_validation() {
        assert_eq!(request("2024-02-29").validate(), Ok(()));
        assert_eq!(
            request("2023-02-29").validate(),
            Err(InvalidLoanRequest::InvalidDate("2023-02-29".to_string()))
        );
        assert_eq!(
            request("01/03/2024").validate(),
            Err(InvalidLoanRequest::InvalidDate("01/03/2024".to_string()))
        );
        assert_eq!(
            NewLoanRequest {
                member_name: "".to_string(),
                ..request("2024-03-01")
            }
            .validate(),
            Err(InvalidLoanRequest::EmptyField("memberName"))
        );
    }

    #[test]
    fn test_filter() {
        let filter: LoanFilter =
            serde_json::from_value(json!({ "memberName": "Ada", "ISBN": "1" })).unwrap();
        assert_eq!(
            filter.containment_document(),
            json!({ "memberName": "Ada", "ISBN": "1" })
        );
        assert!(serde_json::from_value::<LoanFilter>(json!({ "member": "Ada" })).is_err());

        let loan = LoanRecord {
            loan_id: "l1".to_string(),
            member_name: "Ada".to_string(),
            isbn: "1".to_string(),
            title: "t".to_string(),
            book_id: "1".to_string(),
            loan_date: "2024-03-01".to_string(),
        };
        assert!(filter.matches(&loan));
        assert!(!filter.matches(&LoanRecord {
            member_name: "Grace".to_string(),
            ..loan.clone()
        }));
        assert!(LoanFilter::default().matches(&loan));
    }
}
