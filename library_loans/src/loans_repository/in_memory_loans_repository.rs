use std::collections::HashMap;

use crate::admission::{check_admission, ActiveLoans};
use crate::api::{LoanFilter, LoanId, LoanRecord};
use crate::loans_repository::{LoansRepository, LoansRepositoryError};

#[derive(Default)]
pub struct InMemoryLoansRepository {
    loans: parking_lot::RwLock<HashMap<LoanId, LoanRecord>>,
}

#[async_trait::async_trait]
impl LoansRepository for InMemoryLoansRepository {
    async fn create_loan(&self, loan: LoanRecord) -> Result<LoanRecord, LoansRepositoryError> {
        let mut locked_loans = self.loans.write();
        let active = ActiveLoans::of(locked_loans.values(), &loan.member_name, &loan.isbn);
        check_admission(active, &loan.member_name, &loan.isbn)?;
        if locked_loans.contains_key(&loan.loan_id) {
            return Err(LoansRepositoryError::Other(format!(
                "Loan id {} already used",
                loan.loan_id
            )));
        }
        locked_loans.insert(loan.loan_id.clone(), loan.clone());
        Ok(loan)
    }

    async fn delete_loan(&self, loan_id: LoanId) -> Result<bool, LoansRepositoryError> {
        Ok(self.loans.write().remove(&loan_id).is_some())
    }

    async fn list_loans(
        &self,
        filter: &LoanFilter,
    ) -> Result<Vec<LoanRecord>, LoansRepositoryError> {
        let mut loans: Vec<LoanRecord> = self
            .loans
            .read()
            .values()
            .filter(|loan| filter.matches(loan))
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.loan_id.cmp(&b.loan_id));
        Ok(loans)
    }
}
