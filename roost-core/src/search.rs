//! Offset paging over relevance-ordered search results.
//!
//! `total` is recounted on every page fetch and may drift between pages of
//! the same search if content changes in between. There is no explicit
//! end flag; a page shorter than the page size is the last one.

use serde::Serialize;

use roost_types::{SearchHit, SearchScope};

/// Results per search page.
pub const SEARCH_PAGE_SIZE: usize = 100;

/// One page of a search, carrying what is needed to fetch the next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    /// The query, kept for the next page.
    pub scope: SearchScope,
    /// Offset of the first result on this page.
    pub offset: usize,
    /// Total matches at the time this page was fetched.
    pub total: usize,
    /// Results on this page.
    pub count: usize,
    /// The results, most relevant first.
    pub results: Vec<SearchHit>,
}

impl SearchResults {
    /// Assemble a page fetched at `offset`.
    pub fn new(scope: SearchScope, offset: usize, total: usize, results: Vec<SearchHit>) -> Self {
        Self {
            scope,
            offset,
            total,
            count: results.len(),
            results,
        }
    }

    /// Offset of the page after this one.
    pub fn next_offset(&self, page_size: usize) -> usize {
        self.offset + page_size
    }

    /// Whether this page came back short.
    pub fn is_last_page(&self, page_size: usize) -> bool {
        self.count < page_size
    }

    /// The `index`th result on this page.
    pub fn result(&self, index: usize) -> Option<&SearchHit> {
        self.results.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_types::{GroupId, ItemId, SearchHitKind};

    fn scope() -> SearchScope {
        SearchScope {
            group_id: GroupId::new(),
            term: "lawn".into(),
            highlight_start: "<b>".into(),
            highlight_end: "</b>".into(),
        }
    }

    fn hit(scope: &SearchScope) -> SearchHit {
        SearchHit {
            entity_id: ItemId::new(),
            group_id: scope.group_id,
            topic_id: ItemId::new(),
            topic_name: "home".into(),
            kind: SearchHitKind::Todo,
            text: "mow the <b>lawn</b>".into(),
        }
    }

    #[test]
    fn count_follows_results() {
        let scope = scope();
        let hits = vec![hit(&scope), hit(&scope)];
        let page = SearchResults::new(scope, 0, 250, hits);
        assert_eq!(page.count, 2);
        assert_eq!(page.total, 250);
        assert!(page.result(1).is_some());
        assert!(page.result(2).is_none());
    }

    #[test]
    fn next_offset_advances_by_page_size() {
        let page = SearchResults::new(scope(), 100, 0, Vec::new());
        assert_eq!(page.next_offset(SEARCH_PAGE_SIZE), 200);
    }

    #[test]
    fn short_page_is_last() {
        let scope = scope();
        let full: Vec<SearchHit> = (0..3).map(|_| hit(&scope)).collect();
        let page = SearchResults::new(scope, 0, 3, full);
        assert!(!page.is_last_page(3));
        assert!(page.is_last_page(4));
    }
}
