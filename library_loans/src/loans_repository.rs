pub use in_memory_loans_repository::InMemoryLoansRepository;
pub use postgres_loans_repository::PostgresLoansRepository;

use crate::admission::AdmissionRejection;
use crate::api::{LoanFilter, LoanId, LoanRecord};

mod in_memory_loans_repository;
mod postgres_loans_repository;

#[derive(Debug, thiserror::Error)]
pub enum LoansRepositoryError {
    #[error("Loan {0} not found")]
    NotFound(LoanId),

    #[error(transparent)]
    Rejected(#[from] AdmissionRejection),

    #[error("Failed to deserialize loan: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait LoansRepository: Send + Sync {
    /// Stores the loan if the admission check passes, check and insert happen atomically
    async fn create_loan(&self, loan: LoanRecord) -> Result<LoanRecord, LoansRepositoryError>;

    /// Returns false if there was no such loan
    async fn delete_loan(&self, loan_id: LoanId) -> Result<bool, LoansRepositoryError>;

    async fn list_loans(&self, filter: &LoanFilter)
        -> Result<Vec<LoanRecord>, LoansRepositoryError>;
}
