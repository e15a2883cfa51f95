//! Page traversal: walks the paginated index and collects detail-page links.

use reqwest::Url;
use scraper::Html;

use crate::error::{Result, ScrapeError};
use crate::html::selector;
use crate::source::PageSource;

/// One catalog entry on an index page.
const ENTRY_SELECTOR: &str = "li.col-xs-6.col-sm-4.col-md-3.col-lg-3";

/// URL of index page `page` (1-based).
pub fn index_url(base: &Url, page: u32) -> Result<Url> {
    base.join(&format!("page-{}.html", page))
        .map_err(|e| ScrapeError::Config(format!("cannot build index URL for page {}: {}", page, e)))
}

/// Detail-page links listed on one index page, in listing order.
///
/// A page without any catalog entry yields no links. An entry without an
/// anchor is a structural mismatch.
pub fn parse_index_page(url: &str, html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let entries = selector(ENTRY_SELECTOR)?;
    let anchor = selector("a")?;

    document
        .select(&entries)
        .map(|entry| {
            entry
                .select(&anchor)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string)
                .ok_or_else(|| ScrapeError::Markup {
                    url: url.to_string(),
                    element: "a[href] inside catalog entry",
                })
        })
        .collect()
}

/// Fetch index pages `1..=pages` one after the other and collect their links.
pub async fn collect_links<S>(source: &S, base: &Url, pages: u32) -> Result<Vec<String>>
where
    S: PageSource + ?Sized,
{
    if pages == 0 {
        return Err(ScrapeError::Config(
            "page count must be at least 1".to_string(),
        ));
    }

    let mut links = Vec::new();
    for page in 1..=pages {
        let url = index_url(base, page)?;
        tracing::info!(page, url = %url, "fetching index page");

        let html = source.fetch(&url).await?;
        let found = parse_index_page(url.as_str(), &html)?;
        if found.is_empty() {
            tracing::warn!(page, "index page listed no catalog entries");
        }
        links.extend(found);
    }

    tracing::info!(links = links.len(), pages, "collected detail links");
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryPageSource;

    const BASE: &str = "https://books.example/catalogue/";

    fn index_html(links: &[&str]) -> String {
        let items: String = links
            .iter()
            .map(|link| {
                format!(
                    r#"<li class="col-xs-6 col-sm-4 col-md-3 col-lg-3">
                         <article class="product_pod">
                           <div class="image_container"><a href="{link}"><img src="x.jpg"></a></div>
                           <h3><a href="{link}" title="t">t</a></h3>
                         </article>
                       </li>"#
                )
            })
            .collect();
        format!(
            r#"<html><body><ol class="row">{items}</ol>
               <ul class="pager"><li class="next"><a href="page-2.html">next</a></li></ul>
               </body></html>"#
        )
    }

    #[test]
    fn index_url_is_relative_to_catalogue_root() {
        let base = Url::parse(BASE).unwrap();
        assert_eq!(
            index_url(&base, 7).unwrap().as_str(),
            "https://books.example/catalogue/page-7.html"
        );
    }

    #[test]
    fn parse_index_page_keeps_listing_order() {
        let html = index_html(&["b_2/index.html", "a_1/index.html"]);
        let links = parse_index_page("page-1.html", &html).unwrap();
        assert_eq!(links, vec!["b_2/index.html", "a_1/index.html"]);
    }

    #[test]
    fn unexpected_layout_yields_no_links() {
        let html = r#"<html><body><ul><li class="col-xs-12"><a href="x">x</a></li></ul></body></html>"#;
        assert!(parse_index_page("page-1.html", html).unwrap().is_empty());
    }

    #[test]
    fn entry_without_anchor_is_a_markup_error() {
        let html = r#"<li class="col-xs-6 col-sm-4 col-md-3 col-lg-3"><span>no link</span></li>"#;
        assert!(matches!(
            parse_index_page("page-1.html", html),
            Err(ScrapeError::Markup { .. })
        ));
    }

    #[tokio::test]
    async fn collects_pages_times_items_links_in_order() {
        let base = Url::parse(BASE).unwrap();
        let mut source = MemoryPageSource::new();
        for page in 1..=3 {
            let links: Vec<String> = (1..=4).map(|i| format!("p{page}-b{i}/index.html")).collect();
            let refs: Vec<&str> = links.iter().map(String::as_str).collect();
            source.insert(format!("{BASE}page-{page}.html"), index_html(&refs));
        }

        let links = collect_links(&source, &base, 3).await.unwrap();

        assert_eq!(links.len(), 12);
        assert_eq!(links[0], "p1-b1/index.html");
        assert_eq!(links[4], "p2-b1/index.html");
        assert_eq!(links[11], "p3-b4/index.html");
        assert_eq!(source.requests().len(), 3);
    }

    #[tokio::test]
    async fn not_found_index_page_yields_no_links() {
        let base = Url::parse(BASE).unwrap();
        let source = MemoryPageSource::new()
            .with_page(format!("{BASE}page-1.html"), index_html(&["a/index.html"]))
            .with_page(
                format!("{BASE}page-2.html"),
                "<html><head><title>404 Not Found</title></head><body><h1>Not Found</h1></body></html>",
            );

        let links = collect_links(&source, &base, 2).await.unwrap();

        assert_eq!(links, vec!["a/index.html"]);
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn unreachable_index_page_aborts_traversal() {
        let base = Url::parse(BASE).unwrap();
        let source =
            MemoryPageSource::new().with_page(format!("{BASE}page-1.html"), index_html(&["a/index.html"]));

        let result = collect_links(&source, &base, 3).await;

        assert!(matches!(result, Err(ScrapeError::Unreachable { .. })));
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn zero_pages_is_rejected_before_fetching() {
        let base = Url::parse(BASE).unwrap();
        let source = MemoryPageSource::new();
        assert!(matches!(
            collect_links(&source, &base, 0).await,
            Err(ScrapeError::Config(_))
        ));
        assert!(source.requests().is_empty());
    }
}
