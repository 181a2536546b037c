//! Borrow request lifecycle service.
//!
//! Approval is all-or-nothing: every requested unit must be matched by an
//! AVAILABLE copy or the whole transaction rolls back and the request
//! stays PENDING.

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow_request::{
            BorrowRequest, BorrowRequestListEntry, BorrowRequestQuery, CreateBorrowRequest,
        },
        enums::RequestStatus,
    },
    repository::Repository,
    services::notifications::NotificationsService,
};

/// Result of an approval: the refreshed request and the loans spawned
pub struct ApprovalOutcome {
    pub request: BorrowRequest,
    pub loans_created: usize,
}

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    notifications: NotificationsService,
}

impl BorrowsService {
    pub fn new(repository: Repository, notifications: NotificationsService) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    /// Submit a new borrow request
    pub async fn submit(&self, user_id: i32, req: CreateBorrowRequest) -> AppResult<BorrowRequest> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if req.requested_from > req.requested_to {
            return Err(AppError::Validation(
                "requested_from must not be after requested_to".to_string(),
            ));
        }
        let today = Utc::now().date_naive();
        if req.requested_from < today {
            return Err(AppError::Validation(
                "requested_from must not be in the past".to_string(),
            ));
        }

        for item in &req.items {
            self.repository.books.get_by_id(item.book_id).await?;
        }

        let request = self.repository.borrow_requests.create(user_id, &req).await?;
        tracing::info!(request_id = request.id, user_id, "borrow request submitted");
        Ok(request)
    }

    /// Get a request with its items
    pub async fn get(&self, id: i32) -> AppResult<BorrowRequest> {
        self.repository.borrow_requests.get_by_id(id).await
    }

    /// Search requests
    pub async fn search(
        &self,
        query: &BorrowRequestQuery,
    ) -> AppResult<(Vec<BorrowRequestListEntry>, i64)> {
        self.repository.borrow_requests.search(query).await
    }

    /// Approve a pending request: allocate one AVAILABLE copy per requested
    /// unit and spawn a loan for each, all in one transaction.
    pub async fn approve(&self, request_id: i32, admin_id: i32) -> AppResult<ApprovalOutcome> {
        let mut tx = self.repository.pool.begin().await?;

        let status: RequestStatus = self
            .repository
            .borrow_requests
            .lock_status(&mut tx, request_id)
            .await?
            .parse()
            .map_err(AppError::Internal)?;

        if status != RequestStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Borrow request {} is {}, only pending requests can be approved",
                request_id, status
            )));
        }

        let request = self.repository.borrow_requests.get_by_id(request_id).await?;
        let items = &request.items;

        let mut loans_created = 0usize;
        for item in items {
            let copy_ids = self
                .repository
                .book_items
                .lock_available(&mut tx, item.book_id, item.quantity as i64)
                .await?;

            if (copy_ids.len() as i32) < item.quantity {
                // Dropping the transaction rolls everything back.
                return Err(AppError::BusinessRule(format!(
                    "Only {} of {} copies of '{}' are available",
                    copy_ids.len(),
                    item.quantity,
                    item.book_title
                )));
            }

            self.repository
                .book_items
                .mark_loaned(&mut tx, &copy_ids)
                .await?;

            for copy_id in copy_ids {
                self.repository
                    .loans
                    .create(
                        &mut tx,
                        request_id,
                        item.id,
                        copy_id,
                        request.requested_from,
                        request.requested_to,
                    )
                    .await?;
                loans_created += 1;
            }
        }

        self.repository
            .borrow_requests
            .mark_approved(&mut tx, request_id, admin_id)
            .await?;

        tx.commit().await?;

        tracing::info!(request_id, admin_id, loans_created, "borrow request approved");

        let request = self.repository.borrow_requests.get_by_id(request_id).await?;
        if let Err(e) = self.notifications.notify_decision(&request, None).await {
            tracing::warn!(request_id, "failed to enqueue approval mail: {}", e);
        }

        Ok(ApprovalOutcome {
            request,
            loans_created,
        })
    }

    /// Reject a pending request; the reason is mandatory
    pub async fn reject(
        &self,
        request_id: i32,
        admin_id: i32,
        reason: &str,
    ) -> AppResult<BorrowRequest> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }

        self.repository.borrow_requests.get_by_id(request_id).await?;
        self.repository
            .borrow_requests
            .mark_rejected(request_id, admin_id, reason)
            .await?;

        tracing::info!(request_id, admin_id, "borrow request rejected");

        let request = self.repository.borrow_requests.get_by_id(request_id).await?;
        if let Err(e) = self
            .notifications
            .notify_decision(&request, Some(reason))
            .await
        {
            tracing::warn!(request_id, "failed to enqueue rejection mail: {}", e);
        }

        Ok(request)
    }

    /// Cancel a member's own pending request
    pub async fn cancel(&self, request_id: i32, user_id: i32) -> AppResult<BorrowRequest> {
        self.repository
            .borrow_requests
            .mark_cancelled(request_id, user_id)
            .await?;
        self.repository.borrow_requests.get_by_id(request_id).await
    }

    /// Expire one pending request past its end date
    pub async fn expire(&self, request_id: i32) -> AppResult<BorrowRequest> {
        self.repository.borrow_requests.get_by_id(request_id).await?;
        self.repository.borrow_requests.mark_expired(request_id).await?;
        self.repository.borrow_requests.get_by_id(request_id).await
    }

    /// Expire every pending request past its end date
    pub async fn expire_sweep(&self) -> AppResult<u64> {
        let expired = self.repository.borrow_requests.expire_sweep().await?;
        if expired > 0 {
            tracing::info!(expired, "expired pending borrow requests");
        }
        Ok(expired)
    }
}
