use std::future::Future;

use crate::spotify::{ApiError, PageRequest, PageSize, Paged};

/// Drives a paged listing to its end.
///
/// The fetch closure receives the request for the page to load: the first
/// one without continuation, every later one resuming from the marker of
/// the page before. Collection stops when the provider answers
/// [`Paged::Exhausted`] or hands back a page without a marker.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    size: PageSize,
}

impl Paginator {
    pub fn new(size: PageSize) -> Self {
        Self { size }
    }

    /// Collects every item of the listing in provider order.
    ///
    /// The first error ends the run; items gathered up to that point are
    /// dropped.
    pub async fn collect<T, F, Fut>(&self, mut fetch: F) -> Result<Vec<T>, ApiError>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<Paged<T>, ApiError>>,
    {
        let mut items = Vec::new();
        let mut request = PageRequest::first(self.size);
        let mut pages = 0usize;

        loop {
            let page = match fetch(request.clone()).await? {
                Paged::Page(page) => page,
                Paged::Exhausted => break,
            };
            pages += 1;
            items.extend(page.items);

            match page.next {
                Some(next) => request = request.resume(next),
                None => break,
            }
        }

        tracing::trace!(pages, items = items.len(), "listing exhausted");
        Ok(items)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}
