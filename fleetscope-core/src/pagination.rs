//! Page-by-page draining of a row source.
//!
//! A [`PageSource`] is either a fetcher that still needs page arguments or
//! a list that is already resolved; the [`Paginator`] handles both the same
//! way and hands back pages.

use crate::error::{FleetError, Result};

/// Which page to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page number
    pub number: usize,
    pub size: usize,
}

/// One fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total items the source reports across all pages
    pub total_items: usize,
}

/// Fetches one page for a request
pub type PageFetcher<'a, T> = Box<dyn FnMut(PageRequest) -> Result<Page<T>> + Send + 'a>;

/// Where pages come from.
pub enum PageSource<'a, T> {
    /// Must be called with page arguments
    NeedsArguments(PageFetcher<'a, T>),
    /// Already available in full
    Resolved(Vec<T>),
}

impl<'a, T: Clone + Send + Sync + 'a> PageSource<'a, T> {
    /// Fetcher serving pages out of a borrowed slice
    pub fn from_slice(items: &'a [T]) -> Self {
        Self::NeedsArguments(Box::new(move |request: PageRequest| {
            let start = request.number.saturating_mul(request.size).min(items.len());
            let end = start.saturating_add(request.size).min(items.len());
            Ok(Page {
                items: items[start..end].to_vec(),
                total_items: items.len(),
            })
        }))
    }
}

/// Drains a [`PageSource`].
///
/// Fetching stops once the reported total is reached, an empty page
/// arrives, or the page limit is hit.
pub struct Paginator<'a, T> {
    source: PageSource<'a, T>,
    page_size: usize,
    max_pages: Option<usize>,
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(source: PageSource<'a, T>, page_size: usize) -> Self {
        Self {
            source,
            page_size,
            max_pages: None,
        }
    }

    /// Stops after `max_pages` pages
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Returns every page in order.
    ///
    /// # Errors
    /// Returns `FleetError::Configuration` for a zero page size, or the
    /// fetcher's own error.
    pub fn pages(self) -> Result<Vec<Vec<T>>> {
        if self.page_size == 0 {
            return Err(FleetError::configuration("page size must be at least 1"));
        }
        let limit = self.max_pages.unwrap_or(usize::MAX);

        match self.source {
            PageSource::Resolved(items) => {
                let mut pages = Vec::new();
                let mut items = items.into_iter().peekable();
                while pages.len() < limit && items.peek().is_some() {
                    pages.push(items.by_ref().take(self.page_size).collect());
                }
                Ok(pages)
            }
            PageSource::NeedsArguments(mut fetch) => {
                let mut pages = Vec::new();
                let mut fetched = 0_usize;
                while pages.len() < limit {
                    let page = fetch(PageRequest {
                        number: pages.len(),
                        size: self.page_size,
                    })?;
                    if page.items.is_empty() {
                        break;
                    }
                    fetched = fetched.saturating_add(page.items.len());
                    tracing::debug!("Fetched page {} ({} of {})", pages.len(), fetched, page.total_items);
                    pages.push(page.items);
                    if fetched >= page.total_items {
                        break;
                    }
                }
                Ok(pages)
            }
        }
    }

    /// Returns every item across all pages.
    ///
    /// # Errors
    /// See [`pages`](Self::pages).
    pub fn collect_all(self) -> Result<Vec<T>> {
        Ok(self.pages()?.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_source_is_chunked() {
        let pages = Paginator::new(PageSource::Resolved((1..=7).collect()), 3)
            .pages()
            .unwrap();
        assert_eq!(pages, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
    }

    #[test]
    fn test_fetcher_stops_at_reported_total() {
        let mut calls = 0;
        let fetcher: PageFetcher<'_, u32> = Box::new(|request| {
            calls += 1;
            let start = u32::try_from(request.number * request.size).unwrap();
            let items = (start..start + 2).filter(|i| *i < 5).collect();
            Ok(Page {
                items,
                total_items: 5,
            })
        });
        let items = Paginator::new(PageSource::NeedsArguments(fetcher), 2)
            .collect_all()
            .unwrap();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_fetcher_stops_on_empty_page() {
        let fetcher: PageFetcher<'_, u8> = Box::new(|request| {
            Ok(Page {
                items: if request.number == 0 { vec![1] } else { vec![] },
                total_items: 100,
            })
        });
        let pages = Paginator::new(PageSource::NeedsArguments(fetcher), 10)
            .pages()
            .unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_max_pages_limits_both_kinds() {
        let rows: Vec<u16> = (0..50).collect();
        let borrowed = Paginator::new(PageSource::from_slice(&rows), 10)
            .with_max_pages(2)
            .collect_all()
            .unwrap();
        assert_eq!(borrowed.len(), 20);

        let resolved = Paginator::new(PageSource::Resolved(rows.clone()), 10)
            .with_max_pages(1)
            .pages()
            .unwrap();
        assert_eq!(resolved, vec![(0..10).collect::<Vec<_>>()]);
    }

    #[test]
    fn test_fetch_error_propagates() {
        let fetcher: PageFetcher<'_, u8> =
            Box::new(|_| Err(FleetError::configuration("upstream unavailable")));
        assert!(
            Paginator::new(PageSource::NeedsArguments(fetcher), 1)
                .pages()
                .is_err()
        );
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = Paginator::new(PageSource::Resolved(vec![1]), 0).pages();
        assert!(matches!(result, Err(FleetError::Configuration { .. })));
    }
}
