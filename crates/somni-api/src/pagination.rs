//! Pagination plumbing shared by every collection endpoint.
//!
//! Query parameters map onto [`somni_core::page::PageRequest`]; responses
//! wrap a page as `{ "data": [...], "meta": { ..., "pagination": {...} } }`
//! with per-endpoint meta fields flattened alongside the pagination block.

use serde::{Deserialize, Serialize};
use somni_core::page::{Page, PageInfo, PageRequest};

/// `?page=` and `?per_page=` query parameters. Both optional; normalisation
/// (defaults and the per-page cap) happens in [`PageRequest::new`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
  pub page:     Option<u32>,
  pub per_page: Option<u32>,
}

impl PageParams {
  pub fn request(self) -> PageRequest { PageRequest::new(self.page, self.per_page) }
}

/// Endpoint meta plus the pagination block.
#[derive(Debug, Serialize)]
pub struct Meta<M: Serialize> {
  #[serde(flatten)]
  pub extra:      M,
  pub pagination: PageInfo,
}

/// A paginated response body.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize, M: Serialize> {
  pub data: Vec<T>,
  pub meta: Meta<M>,
}

impl<T: Serialize, M: Serialize> Paginated<T, M> {
  pub fn new(page: Page<T>, extra: M) -> Self {
    Self {
      data: page.items,
      meta: Meta {
        extra,
        pagination: page.info,
      },
    }
  }
}

/// Meta for endpoints with no fields beyond pagination.
#[derive(Debug, Serialize)]
pub struct NoMeta {}
