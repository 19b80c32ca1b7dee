//! Offset pagination with an optional count-query shortcut.

use crate::error::{DbError, DbResult};
use serde::Serialize;
use std::future::Future;

/// A zero-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: i64,
    size: i64,
}

impl PageRequest {
    /// Page `page` (zero-based) of `size` rows.
    pub fn of(page: i64, size: i64) -> DbResult<Self> {
        if page < 0 {
            return Err(DbError::validation(format!("page index must be >= 0, got {page}")));
        }
        if size < 1 {
            return Err(DbError::validation(format!("page size must be >= 1, got {size}")));
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// Rows skipped before this page.
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    /// The request for the following page.
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
        }
    }
}

/// One page of results together with the total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub request: PageRequest,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            content,
            request,
            total,
        }
    }

    /// Build a page, running `count` only when the total cannot be derived from `content`.
    ///
    /// The total is known without a count query when the first page comes back short, or when
    /// a later page comes back non-empty but short. An empty later page still needs the count,
    /// since the request may have skipped past the end.
    pub async fn with_lazy_total<F, Fut>(
        content: Vec<T>,
        request: PageRequest,
        count: F,
    ) -> DbResult<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DbResult<i64>>,
    {
        let len = content.len() as i64;
        let short = len < request.size();

        let total = if request.is_first() && short {
            len
        } else if !request.is_first() && len > 0 && short {
            request.offset().saturating_add(len)
        } else {
            tracing::debug!(target: "pgfilter.sql", page = request.page(), "running count query");
            count().await?
        };

        Ok(Self::new(content, request, total))
    }

    pub fn total_pages(&self) -> i64 {
        let total = self.total.max(0);
        let size = self.request.size();
        total / size + i64::from(total % size != 0)
    }

    pub fn has_next(&self) -> bool {
        self.request.page().saturating_add(1) < self.total_pages()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Transform the content, keeping paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_page_request_validation() {
        assert!(PageRequest::of(0, 0).is_err());
        assert!(PageRequest::of(-1, 10).is_err());
        let r = PageRequest::of(2, 3).unwrap();
        assert_eq!(r.offset(), 6);
        assert_eq!(r.next().offset(), 9);
    }

    #[test]
    fn test_page_arithmetic() {
        let p = Page::new(vec![1, 2, 3], PageRequest::of(0, 3).unwrap(), 4);
        assert_eq!(p.total_pages(), 2);
        assert!(p.has_next());

        let last = Page::new(vec![4], PageRequest::of(1, 3).unwrap(), 4);
        assert!(last.is_last());

        let empty: Page<i32> = Page::new(vec![], PageRequest::of(0, 3).unwrap(), 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(empty.is_last());
    }

    #[test]
    fn test_extreme_page_and_size_do_not_overflow() {
        let huge = PageRequest::of(0, i64::MAX).unwrap();
        let p = Page::new(vec![1, 2], huge, 2);
        assert_eq!(p.total_pages(), 1);
        assert!(p.is_last());

        let full = Page::new(vec![1], PageRequest::of(0, i64::MAX).unwrap(), i64::MAX);
        assert_eq!(full.total_pages(), 1);

        let last = PageRequest::of(i64::MAX, i64::MAX).unwrap();
        assert_eq!(last.offset(), i64::MAX);
        assert_eq!(last.next().page(), i64::MAX);
        let tail = Page::new(vec![1], last, i64::MAX);
        assert!(tail.is_last());
    }

    #[tokio::test]
    async fn test_lazy_total_saturates_on_far_page() {
        assert_eq!(lazy(vec![1], i64::MAX, 3, 0).await, (i64::MAX, false));
    }

    async fn lazy(content: Vec<i32>, page: i64, size: i64, total: i64) -> (i64, bool) {
        let flag = Cell::new(false);
        let called = &flag;
        let p = Page::with_lazy_total(content, PageRequest::of(page, size).unwrap(), || async move {
            called.set(true);
            Ok(total)
        })
        .await
        .unwrap();
        (p.total, flag.get())
    }

    #[tokio::test]
    async fn test_lazy_total_skips_count_when_derivable() {
        // short first page
        assert_eq!(lazy(vec![1, 2], 0, 3, 99).await, (2, false));
        // short later page
        assert_eq!(lazy(vec![4], 1, 3, 99).await, (4, false));
    }

    #[tokio::test]
    async fn test_lazy_total_counts_when_needed() {
        // full first page
        assert_eq!(lazy(vec![1, 2, 3], 0, 3, 4).await, (4, true));
        // empty page past the end
        assert_eq!(lazy(vec![], 5, 3, 4).await, (4, true));
    }

    #[tokio::test]
    async fn test_lazy_total_propagates_count_error() {
        let r = Page::with_lazy_total(vec![1, 2, 3], PageRequest::of(0, 3).unwrap(), || async {
            Err(DbError::Other("boom".into()))
        })
        .await;
        assert!(r.is_err());
    }
}
