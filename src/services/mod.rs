//! Business logic services

pub mod borrows;
pub mod catalog;
pub mod exports;
pub mod loans;
pub mod notifications;
pub mod stats;
pub mod users;

use crate::{
    config::{AuthConfig, EmailConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowsService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
    pub exports: exports::ExportsService,
    pub notifications: notifications::NotificationsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, email_config: EmailConfig) -> Self {
        let notifications =
            notifications::NotificationsService::new(repository.clone(), email_config);
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository.clone(), notifications.clone()),
            loans: loans::LoansService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            exports: exports::ExportsService::new(repository),
            notifications,
        }
    }
}
