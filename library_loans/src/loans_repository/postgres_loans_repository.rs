use library_common::postgres::{connect, is_check_violation, is_unique_violation, PostgresConfig};
use serde_json::json;
use tokio_postgres::{Client, Statement};

use crate::admission::{check_admission, ActiveLoans, MAX_ACTIVE_LOANS_PER_MEMBER};
use crate::api::{LoanFilter, LoanId, LoanRecord};
use crate::loans_repository::{LoansRepository, LoansRepositoryError};

const LOANS_SCHEMA: &str = "
        CREATE TABLE IF NOT EXISTS loans (
            loan_id         TEXT PRIMARY KEY,
            isbn            TEXT NOT NULL UNIQUE,
            member_name     TEXT NOT NULL,
            params          JSONB NOT NULL
            )
        ";

/// Counter row per member, the check constraint enforces the loan limit
fn member_loans_schema() -> String {
    format!(
        "
        CREATE TABLE IF NOT EXISTS member_loans (
            member_name     TEXT PRIMARY KEY,
            active          INTEGER NOT NULL CHECK (active <= {MAX_ACTIVE_LOANS_PER_MEMBER})
            )
        "
    )
}

pub struct PostgresLoansRepository {
    client: Client,
}

impl PostgresLoansRepository {
    pub async fn init(config: PostgresConfig) -> anyhow::Result<Self> {
        let client = connect(&config, &[LOANS_SCHEMA, member_loans_schema().as_str()]).await?;
        Ok(Self { client })
    }

    /// Tells why an admission write was refused
    async fn rejection_reason(
        &self,
        loan: &LoanRecord,
        err: tokio_postgres::Error,
    ) -> LoansRepositoryError {
        let active = match self.active_loans(loan).await {
            Ok(active) => active,
            Err(lookup_err) => return lookup_err,
        };
        match check_admission(active, &loan.member_name, &loan.isbn) {
            Err(rejection) => rejection.into(),
            // The conflicting loan was returned in the meantime
            Ok(()) => err.into(),
        }
    }

    async fn active_loans(&self, loan: &LoanRecord) -> Result<ActiveLoans, LoansRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT EXISTS(SELECT 1 FROM loans WHERE isbn = $1), \
                 (SELECT COUNT(*) FROM loans WHERE member_name = $2)",
            )
            .await?;
        let rows = self
            .client
            .query(&stmt, &[&loan.isbn, &loan.member_name])
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| LoansRepositoryError::Other("Counts not returned".to_string()))?;
        let member_loans: i64 = row.try_get(1)?;
        Ok(ActiveLoans {
            isbn_loaned: row.try_get(0)?,
            member_loans: member_loans as usize,
        })
    }
}

#[async_trait::async_trait]
impl LoansRepository for PostgresLoansRepository {
    async fn create_loan(&self, loan: LoanRecord) -> Result<LoanRecord, LoansRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "
        WITH member AS (
            INSERT INTO member_loans (member_name, active) VALUES ($3::TEXT, 1)
            ON CONFLICT (member_name) DO UPDATE SET active = member_loans.active + 1
            RETURNING active
        )
        INSERT INTO loans (loan_id, isbn, member_name, params)
        SELECT $1::TEXT, $2::TEXT, $3::TEXT, $4::JSONB FROM member
        RETURNING loan_id
        ",
            )
            .await?;

        let rows = self
            .client
            .query(
                &stmt,
                &[&loan.loan_id, &loan.isbn, &loan.member_name, &json!(loan)],
            )
            .await;

        match rows {
            Ok(rows) if rows.is_empty() => Err(LoansRepositoryError::Other(
                "Loan id not returned".to_string(),
            )),
            Ok(_) => Ok(loan),
            Err(err) if is_unique_violation(&err) || is_check_violation(&err) => {
                Err(self.rejection_reason(&loan, err).await)
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn delete_loan(&self, loan_id: LoanId) -> Result<bool, LoansRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "
        WITH removed AS (
            DELETE FROM loans WHERE loan_id = $1 RETURNING member_name
        )
        UPDATE member_loans SET active = member_loans.active - 1
        FROM removed WHERE member_loans.member_name = removed.member_name
        RETURNING member_loans.member_name
        ",
            )
            .await?;

        let rows = self.client.query(&stmt, &[&loan_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn list_loans(
        &self,
        filter: &LoanFilter,
    ) -> Result<Vec<LoanRecord>, LoansRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM loans WHERE params @> ($1)::JSONB ORDER BY loan_id")
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&filter.containment_document()])
            .await?;

        rows.iter()
            .map(|row| {
                let loan: serde_json::Value = row.try_get(0)?;
                Ok(serde_json::from_value(loan)?)
            })
            .collect()
    }
}

#[cfg(all(test, feature = "postgres_tests"))]
mod postgres_loans_repository_tests {
    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use super::*;
    use crate::admission::AdmissionRejection;

    async fn start_postgres_container_and_init_repo(
    ) -> (ContainerAsync<GenericImage>, PostgresLoansRepository) {
        let pg_container = GenericImage::new("postgres", "latest")
            .with_mapped_port(5432, 5432.tcp())
            .with_env_var("POSTGRES_USER", "postgres")
            .with_env_var("POSTGRES_PASSWORD", "postgres")
            .start()
            .await
            .expect("Failed to start postgres");

        for _ in 0..10 {
            if let Ok(repo) = PostgresLoansRepository::init(PostgresConfig {
                hostname: "127.0.0.1".to_string(),
                username: "postgres".to_string(),
                password: "postgres".to_string(),
            })
            .await
            {
                return (pg_container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    fn loan(loan_id: &str, member_name: &str, isbn: &str) -> LoanRecord {
        LoanRecord {
            loan_id: loan_id.to_string(),
            member_name: member_name.to_string(),
            isbn: isbn.to_string(),
            title: format!("Title {isbn}"),
            book_id: isbn.to_string(),
            loan_date: "2024-03-01".to_string(),
        }
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// for the sake of not starting container multiple times it tests everything in one testcase
    async fn test_loan_lifecycle() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        assert!(!repo.delete_loan("l1".to_string()).await.unwrap());
        repo.create_loan(loan("l1", "Ada", "1")).await.unwrap();
        assert!(matches!(
            repo.create_loan(loan("l2", "Grace", "1")).await,
            Err(LoansRepositoryError::Rejected(
                AdmissionRejection::IsbnAlreadyLoaned(..)
            ))
        ));

        repo.create_loan(loan("l3", "Ada", "2")).await.unwrap();
        assert!(matches!(
            repo.create_loan(loan("l4", "Ada", "3")).await,
            Err(LoansRepositoryError::Rejected(
                AdmissionRejection::MemberLoanLimitReached(..)
            ))
        ));
        assert!(matches!(
            repo.create_loan(loan("l5", "Ada", "2")).await,
            Err(LoansRepositoryError::Rejected(
                AdmissionRejection::IsbnAlreadyLoaned(..)
            ))
        ));

        assert!(repo.delete_loan("l1".to_string()).await.unwrap());
        repo.create_loan(loan("l6", "Ada", "3")).await.unwrap();
        repo.create_loan(loan("l7", "Grace", "1")).await.unwrap();

        let ada = LoanFilter {
            member_name: Some("Ada".to_string()),
            ..LoanFilter::default()
        };
        assert_eq!(
            repo.list_loans(&ada).await.unwrap(),
            vec![loan("l3", "Ada", "2"), loan("l6", "Ada", "3")]
        );
        assert_eq!(
            repo.list_loans(&LoanFilter::default()).await.unwrap().len(),
            3
        );
    }
}
