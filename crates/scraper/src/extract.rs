//! Detail extraction: one fetched page becomes one raw field/value mapping.

use reqwest::Url;
use scraper::Html;

use crate::error::{Result, ScrapeError};
use crate::html::{selector, text_of};
use crate::source::PageSource;

/// Field/value pairs scraped from one detail page, before normalization.
///
/// Keys are `title`, `stars`, `category`, `image` followed by the product
/// table's row labels exactly as printed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBook {
    pub url: String,
    pub fields: Vec<(String, String)>,
}

impl RawBook {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn markup(url: &str, element: &'static str) -> ScrapeError {
    ScrapeError::Markup {
        url: url.to_string(),
        element,
    }
}

/// Extract the raw fields of one detail page.
pub fn parse_detail_page(url: &str, html: &str) -> Result<RawBook> {
    let document = Html::parse_document(html);
    let mut fields = Vec::new();

    let title = document
        .select(&selector("title")?)
        .next()
        .ok_or_else(|| markup(url, "title"))?;
    fields.push(("title".to_string(), text_of(title).trim().to_string()));

    // The rating is encoded as the second class token: `star-rating Three`.
    let stars = document
        .select(&selector("p.star-rating")?)
        .next()
        .and_then(|p| p.value().attr("class"))
        .and_then(|class| class.split_whitespace().nth(1))
        .ok_or_else(|| markup(url, "p.star-rating rating class"))?;
    fields.push(("stars".to_string(), stars.to_string()));

    let anchor = selector("a")?;
    let crumbs: Vec<_> = document.select(&selector("ul.breadcrumb > li")?).collect();
    let category = crumbs
        .len()
        .checked_sub(2)
        .and_then(|idx| crumbs[idx].select(&anchor).next())
        .ok_or_else(|| markup(url, "ul.breadcrumb category link"))?;
    fields.push(("category".to_string(), text_of(category)));

    let image = document
        .select(&selector("img")?)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or_else(|| markup(url, "img[src]"))?;
    fields.push(("image".to_string(), image.to_string()));

    let table = document
        .select(&selector("table.table-striped")?)
        .next()
        .ok_or_else(|| markup(url, "table.table-striped"))?;
    let row_sel = selector("tr")?;
    let th = selector("th")?;
    let td = selector("td")?;
    for row in table.select(&row_sel) {
        let key = row
            .select(&th)
            .next()
            .ok_or_else(|| markup(url, "product table th"))?;
        let value = row
            .select(&td)
            .next()
            .ok_or_else(|| markup(url, "product table td"))?;
        fields.push((text_of(key), text_of(value)));
    }

    Ok(RawBook {
        url: url.to_string(),
        fields,
    })
}

/// Fetch and extract every link in order, one request at a time.
///
/// The first failure aborts the whole batch.
pub async fn extract_all<S>(source: &S, base: &Url, links: &[String]) -> Result<Vec<RawBook>>
where
    S: PageSource + ?Sized,
{
    let mut books = Vec::with_capacity(links.len());

    for (idx, link) in links.iter().enumerate() {
        let url = base
            .join(link)
            .map_err(|e| ScrapeError::Config(format!("cannot resolve link '{}': {}", link, e)))?;
        tracing::debug!(item = idx + 1, total = links.len(), url = %url, "fetching detail page");

        let html = source.fetch(&url).await?;
        books.push(parse_detail_page(url.as_str(), &html)?);
    }

    tracing::info!(books = books.len(), "extracted detail pages");
    Ok(books)
}
