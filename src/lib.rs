pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    assignment_service::AssignmentService,
    executor_service::{CodeExecutor, HttpExecutor},
    grading_service::GradingService,
    submission_service::SubmissionService,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub assignment_service: AssignmentService,
    pub submission_service: SubmissionService,
    pub grading_service: GradingService,
    pub executor: Arc<dyn CodeExecutor>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let executor: Arc<dyn CodeExecutor> = Arc::new(HttpExecutor::new(
            config.executor_url.clone(),
            Duration::from_secs(config.executor_timeout_secs),
        ));

        let assignment_service = AssignmentService::new(pool.clone());
        let submission_service = SubmissionService::new(pool.clone());
        let grading_service = GradingService::new(executor.clone(), config.executor_concurrency);

        Self {
            pool,
            assignment_service,
            submission_service,
            grading_service,
            executor,
        }
    }
}
