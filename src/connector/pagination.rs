//! Continuation-link driver for collection queries.

use std::future::Future;

use crate::odata::PagedResult;

/// Fetches `initial` and every page reachable through `@odata.nextLink`,
/// concatenating the records in server order.
///
/// Stops when a page has no (or an empty) continuation link. The first
/// failing page aborts the drain and the records gathered so far are
/// dropped. Links are followed as given; a server that loops will loop here.
///
/// # Errors
///
/// Returns the first error produced by `fetch`.
pub async fn drain_pages<T, E, F, Fut>(initial: String, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<PagedResult<T>, E>>,
{
    let mut entities = Vec::new();
    let mut next = Some(initial);

    while let Some(path) = next.take() {
        let (mut page, next_link) = fetch(path).await?.into_parts();
        entities.append(&mut page);
        next = next_link;
    }

    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn page(entities: &[&str], next_link: Option<&str>) -> PagedResult<String> {
        PagedResult {
            entities: entities.iter().map(|e| (*e).to_string()).collect(),
            next_link: next_link.map(str::to_string),
        }
    }

    #[test]
    fn test_drains_pages_in_server_order() {
        let mut pages = HashMap::new();
        pages.insert("accounts", page(&["A", "B"], Some("p2")));
        pages.insert("p2", page(&["C"], None));

        let mut requested = Vec::new();
        let result: Result<Vec<String>, String> =
            tokio_test::block_on(drain_pages("accounts".to_string(), |path| {
                requested.push(path.clone());
                let page = pages.remove(path.as_str());
                async move { page.ok_or(format!("unexpected {path}")) }
            }));

        assert_eq!(result.unwrap(), vec!["A", "B", "C"]);
        assert_eq!(requested, vec!["accounts", "p2"]);
    }

    #[test]
    fn test_empty_next_link_ends_the_drain() {
        let mut calls = 0;
        let result: Result<Vec<String>, String> =
            tokio_test::block_on(drain_pages("accounts".to_string(), |_| {
                calls += 1;
                async { Ok(page(&["A"], Some(""))) }
            }));

        assert_eq!(result.unwrap(), vec!["A"]);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_failing_page_aborts_everything() {
        let mut pages = HashMap::new();
        pages.insert("accounts", page(&["A", "B"], Some("p2")));

        let result: Result<Vec<String>, String> =
            tokio_test::block_on(drain_pages("accounts".to_string(), |path| {
                let page = pages.remove(path.as_str());
                async move { page.ok_or_else(|| "page 2 failed".to_string()) }
            }));

        assert_eq!(result.unwrap_err(), "page 2 failed");
    }
}
