use std::collections::HashSet;

use serde::Serialize;

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Highest page a listing will serve; keeps `(page - 1) * per_page` in range.
pub const MAX_PAGE: u64 = 100_000;

/// Clamp raw `page` / `per_page` query values to sane bounds.
pub fn page_params(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    (
        page.unwrap_or(1).clamp(1, MAX_PAGE),
        per_page.unwrap_or(20).clamp(1, 100),
    )
}

/// Ordering for question and problem set listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSort {
    Newest,
    /// Net votes (upvotes minus downvotes), highest first.
    Popular,
    Upvotes,
}

impl ContentSort {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.unwrap_or("newest") {
            "newest" => Ok(Self::Newest),
            "popular" => Ok(Self::Popular),
            "upvotes" => Ok(Self::Upvotes),
            _ => Err(AppError::Validation(
                "sort must be one of: newest, popular, upvotes".into(),
            )),
        }
    }
}

/// Validate a trimmed title (1-255 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(AppError::Validation(
            "Title must be 1-255 characters".into(),
        ));
    }
    Ok(())
}

/// Validate an ID list (no duplicates, max length). Empty is allowed.
pub fn validate_unique_ids(ids: &[i32], name: &str, max: usize) -> Result<(), AppError> {
    if ids.len() > max {
        return Err(AppError::Validation(format!("Too many {name}: max {max}")));
    }
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("Duplicate {name} ID: {id}")));
        }
    }
    Ok(())
}
