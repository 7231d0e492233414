use crate::api::LoanRecord;

pub const MAX_ACTIVE_LOANS_PER_MEMBER: usize = 2;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionRejection {
    #[error("Book with ISBN {0} is already on loan")]
    IsbnAlreadyLoaned(String),

    #[error("Member {0} already has the maximum number of active loans")]
    MemberLoanLimitReached(String),
}

/// What the active loans say about a new request
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLoans {
    pub isbn_loaned: bool,
    pub member_loans: usize,
}

impl ActiveLoans {
    pub fn of<'a>(
        loans: impl IntoIterator<Item = &'a LoanRecord>,
        member_name: &str,
        isbn: &str,
    ) -> Self {
        loans
            .into_iter()
            .fold(Self::default(), |mut active, loan| {
                active.isbn_loaned |= loan.isbn == isbn;
                if loan.member_name == member_name {
                    active.member_loans += 1;
                }
                active
            })
    }
}

/// A loaned ISBN is reported before the member limit
pub fn check_admission(
    active: ActiveLoans,
    member_name: &str,
    isbn: &str,
) -> Result<(), AdmissionRejection> {
    if active.isbn_loaned {
        Err(AdmissionRejection::IsbnAlreadyLoaned(isbn.to_string()))
    } else if active.member_loans >= MAX_ACTIVE_LOANS_PER_MEMBER {
        Err(AdmissionRejection::MemberLoanLimitReached(
            member_name.to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod admission_tests {
    use super::*;

    fn loan(member_name: &str, isbn: &str) -> LoanRecord {
        LoanRecord {
            loan_id: format!("{member_name}-{isbn}"),
            member_name: member_name.to_string(),
            isbn: isbn.to_string(),
            title: "title".to_string(),
            book_id: isbn.to_string(),
            loan_date: "2024-03-01".to_string(),
        }
    }

    #[test]
    fn test_free_isbn_is_admitted() {
        let loans = vec![loan("Ada", "1"), loan("Grace", "2")];
        let active = ActiveLoans::of(&loans, "Ada", "3");
        assert_eq!(
            active,
            ActiveLoans {
                isbn_loaned: false,
                member_loans: 1
            }
        );
        assert_eq!(check_admission(active, "Ada", "3"), Ok(()));
    }

    #[test]
    /// Whoever asks, a loaned ISBN is rejected
    fn test_loaned_isbn_is_rejected() {
        let loans = vec![loan("Grace", "1")];
        for member in ["Ada", "Grace"] {
            assert_eq!(
                check_admission(ActiveLoans::of(&loans, member, "1"), member, "1"),
                Err(AdmissionRejection::IsbnAlreadyLoaned("1".to_string()))
            );
        }
    }

    #[test]
    fn test_third_loan_is_rejected() {
        let loans = vec![loan("Ada", "1"), loan("Ada", "2")];
        assert_eq!(
            check_admission(ActiveLoans::of(&loans, "Ada", "3"), "Ada", "3"),
            Err(AdmissionRejection::MemberLoanLimitReached("Ada".to_string()))
        );
        assert_eq!(
            check_admission(ActiveLoans::of(&loans, "Grace", "3"), "Grace", "3"),
            Ok(())
        );
        assert_eq!(
            check_admission(ActiveLoans::of(&loans[1..], "Ada", "3"), "Ada", "3"),
            Ok(())
        );
    }

    #[test]
    fn test_loaned_isbn_reported_before_limit() {
        let loans = vec![loan("Ada", "1"), loan("Ada", "2")];
        assert_eq!(
            check_admission(ActiveLoans::of(&loans, "Ada", "2"), "Ada", "2"),
            Err(AdmissionRejection::IsbnAlreadyLoaned("2".to_string()))
        );
    }
}
