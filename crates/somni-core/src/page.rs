//! Pagination primitives.
//!
//! Given a fully-resolved sequence and a page request, produce a bounded
//! slice plus the metadata the API renders alongside every collection.
//! `per_page` is clamped to [`MAX_PER_PAGE`] to prevent abuse.

use serde::Serialize;

pub const DEFAULT_PER_PAGE: u32 = 25;
pub const MAX_PER_PAGE: u32 = 100;

/// A normalised page request. Construct with [`PageRequest::new`] — the
/// clamping there is what keeps `per_page` bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page:     u32,
  per_page: u32,
}

impl PageRequest {
  /// Normalise raw parameters: absent or zero page becomes 1, absent or
  /// zero `per_page` becomes the default, anything above the cap is clamped.
  pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
    let page = page.filter(|p| *p >= 1).unwrap_or(1);
    let per_page = match per_page {
      None | Some(0) => DEFAULT_PER_PAGE,
      Some(p) => p.min(MAX_PER_PAGE),
    };
    Self { page, per_page }
  }

  pub fn page(&self) -> u32 { self.page }

  pub fn per_page(&self) -> u32 { self.per_page }
}

impl Default for PageRequest {
  fn default() -> Self { Self::new(None, None) }
}

/// Collection metadata rendered next to every paginated response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageInfo {
  pub current_page: u32,
  pub prev_page:    Option<u32>,
  pub next_page:    Option<u32>,
  pub total_items:  u64,
  pub total_pages:  u32,
}

/// One page of a sequence.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub info:  PageInfo,
}

/// Slice `items` down to the requested page.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
  let total_items = items.len() as u64;
  let per_page = u64::from(request.per_page);
  let total_pages = total_items.div_ceil(per_page) as u32;

  let offset = (request.page - 1) as usize * request.per_page as usize;
  let items: Vec<T> = items
    .into_iter()
    .skip(offset)
    .take(request.per_page as usize)
    .collect();

  let prev_page = (request.page > 1).then(|| request.page - 1);
  let next_page = (request.page < total_pages).then(|| request.page + 1);

  Page {
    items,
    info: PageInfo {
      current_page: request.page,
      prev_page,
      next_page,
      total_items,
      total_pages,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_and_clamping() {
    assert_eq!(PageRequest::new(None, None), PageRequest::new(Some(1), Some(25)));
    assert_eq!(PageRequest::new(Some(0), Some(0)).page(), 1);
    assert_eq!(PageRequest::new(Some(0), Some(0)).per_page(), DEFAULT_PER_PAGE);
    assert_eq!(PageRequest::new(None, Some(500)).per_page(), MAX_PER_PAGE);
  }

  #[test]
  fn slices_the_requested_page() {
    let items: Vec<u32> = (1..=7).collect();
    let page = paginate(items, PageRequest::new(Some(2), Some(3)));

    assert_eq!(page.items, [4, 5, 6]);
    assert_eq!(page.info.current_page, 2);
    assert_eq!(page.info.prev_page, Some(1));
    assert_eq!(page.info.next_page, Some(3));
    assert_eq!(page.info.total_items, 7);
    assert_eq!(page.info.total_pages, 3);
  }

  #[test]
  fn last_page_has_no_next() {
    let items: Vec<u32> = (1..=7).collect();
    let page = paginate(items, PageRequest::new(Some(3), Some(3)));
    assert_eq!(page.items, [7]);
    assert_eq!(page.info.next_page, None);
  }

  #[test]
  fn empty_sequence_yields_zero_pages() {
    let page = paginate(Vec::<u32>::new(), PageRequest::default());
    assert!(page.items.is_empty());
    assert_eq!(page.info.total_items, 0);
    assert_eq!(page.info.total_pages, 0);
    assert_eq!(page.info.prev_page, None);
    assert_eq!(page.info.next_page, None);
  }

  #[test]
  fn page_beyond_the_end_is_empty_not_an_error() {
    let items: Vec<u32> = (1..=4).collect();
    let page = paginate(items, PageRequest::new(Some(9), Some(2)));
    assert!(page.items.is_empty());
    assert_eq!(page.info.current_page, 9);
    assert_eq!(page.info.prev_page, Some(8));
    assert_eq!(page.info.next_page, None);
  }
}
