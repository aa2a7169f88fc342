//! Offset pagination over page numbers.
//!
//! Pages are 1-indexed. The engine is pure arithmetic: callers issue the count
//! query and the bounded select themselves and feed both results through
//! [`Page::assemble`].
//!
//! A page whose `next_page` equals its `current_page` is the last one. The
//! serialized contract keeps that convention; [`Page::has_next`] exposes it as a
//! boolean for Rust callers.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 15;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be greater than or equal to 1")]
    InvalidPage,
    #[error("page size must be between 1 and {max}")]
    InvalidPageSize { max: u32 },
}

/// Number of rows to skip before the first row of `page`.
///
/// `page` is expected to be at least 1; a zero page is treated as the first one
/// rather than wrapping.
pub fn offset(page: u32, page_size: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(page_size)
}

pub fn previous_page(page: u32) -> u32 {
    page.saturating_sub(1).max(1)
}

/// `page + 1` when rows remain past this page, otherwise `page` itself.
pub fn next_page(page: u32, page_size: u32, total_count: u64) -> u32 {
    let consumed = u64::from(page_size) * u64::from(page);
    if total_count <= consumed {
        page
    } else {
        page.saturating_add(1)
    }
}

/// Default and maximum page sizes accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub current_page: u32,
    pub page_size: u32,
    pub owner: Option<Uuid>,
}

impl PageRequest {
    /// Build a request from optional caller input, applying defaults and bounds.
    pub fn resolve(
        page: Option<u32>,
        page_size: Option<u32>,
        owner: Option<Uuid>,
        limits: PageLimits,
    ) -> Result<Self, PaginationError> {
        let current_page = page.unwrap_or(DEFAULT_PAGE);
        if current_page < 1 {
            return Err(PaginationError::InvalidPage);
        }

        let page_size = page_size.unwrap_or(limits.default_page_size);
        if page_size < 1 || page_size > limits.max_page_size {
            return Err(PaginationError::InvalidPageSize {
                max: limits.max_page_size,
            });
        }

        Ok(Self {
            current_page,
            page_size,
            owner,
        })
    }

    pub fn offset(&self) -> u64 {
        offset(self.current_page, self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub previous_page: u32,
    pub current_page: u32,
    pub next_page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn assemble(request: &PageRequest, total_count: u64, items: Vec<T>) -> Self {
        Self {
            items,
            total_count,
            previous_page: previous_page(request.current_page),
            current_page: request.current_page,
            next_page: next_page(request.current_page, request.page_size, total_count),
            page_size: request.page_size,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next_page != self.current_page
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            previous_page: self.previous_page,
            current_page: self.current_page,
            next_page: self.next_page,
            page_size: self.page_size,
        }
    }
}
