//! Loan management service

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanListEntry, LoanQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get loan by ID
    pub async fn get(&self, id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(id).await
    }

    /// Search loans
    pub async fn search(&self, query: &LoanQuery) -> AppResult<(Vec<LoanListEntry>, i64)> {
        self.repository.loans.search(query).await
    }

    /// Return a loan; the copy goes back to AVAILABLE
    pub async fn return_loan(&self, id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.return_loan(id).await?;
        tracing::info!(loan_id = id, book_item_id = loan.book_item_id, "loan returned");
        Ok(loan)
    }

    /// Mark borrowed loans past their due date as overdue
    pub async fn overdue_sweep(&self) -> AppResult<u64> {
        let marked = self.repository.loans.overdue_sweep().await?;
        if marked > 0 {
            tracing::info!(marked, "marked loans overdue");
        }
        Ok(marked)
    }
}
