//! 分页相关的数据结构

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl PaginationParams {
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self { page, per_page }
    }

    pub fn get_page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn get_per_page(&self) -> u64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn get_offset(&self) -> u64 {
        (self.get_page() - 1) * self.get_per_page()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationInfo {
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationInfo {
    pub fn new(params: &PaginationParams, total: u64) -> Self {
        let per_page = params.get_per_page();
        let total_pages = if total == 0 {
            1
        } else {
            total.div_ceil(per_page)
        };

        Self {
            current_page: params.get_page(),
            per_page,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        Self {
            items,
            pagination: PaginationInfo::new(params, total),
        }
    }
}
