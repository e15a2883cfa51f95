use scraper::{ElementRef, Selector};

use crate::error::{Result, ScrapeError};

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}
