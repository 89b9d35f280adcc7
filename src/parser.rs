//! Page-structure knowledge for the fiction catalog.
//!
//! Everything that depends on the site's markup lives here, one function per
//! block of the page, so a layout change stays local to this file. None of
//! these functions fail: markup that doesn't match yields empty values, a
//! skipped row, or `None`.

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

use crate::data_models::{BookResult, Mirror, Pagination, SearchResponse};

// Column positions inside a listing row.
const AUTHORS_COL: usize = 0;
const SERIES_COL: usize = 1;
const TITLE_COL: usize = 2;
const LANGUAGE_COL: usize = 3;
const FILE_COL: usize = 4;
const MIRRORS_COL: usize = 5;

struct Selectors {
    rows: Selector,
    cells: Selector,
    author_links: Selector,
    anchor: Selector,
    image: Selector,
    mirror_links: Selector,
    paginator: Selector,
    download_link: Selector,
}

static SELECTORS: OnceLock<Selectors> = OnceLock::new();

fn selectors() -> &'static Selectors {
    SELECTORS.get_or_init(|| Selectors {
        rows: css("table.catalog tbody tr"),
        cells: css("td"),
        author_links: css("ul.catalog_authors li a"),
        anchor: css("a[href]"),
        image: css("img[src]"),
        mirror_links: css("ul.record_mirrors_compact li a[href]"),
        paginator: css("div.catalog_paginator"),
        download_link: css("#download h2 a[href]"),
    })
}

fn css(selector: &'static str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("bad selector {selector:?}: {e}"))
}

/// Size, unit and format shown in the "File" column, e.g. `EPUB / 348 Kb`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub format: String,
    pub size: f64,
    pub unit: String,
}

/// Parses one page of search results. `page` is the 1-based page number the
/// listing was requested with.
pub fn parse_search_page(html: &str, page_url: &Url, page: u32) -> SearchResponse {
    let document = Html::parse_document(html);
    let sel = selectors();

    let results: Vec<BookResult> = document
        .select(&sel.rows)
        .filter_map(|row| parse_row(row, page_url))
        .collect();

    let pagination = document
        .select(&sel.paginator)
        .find_map(|div| parse_paginator(&element_text(div), page));

    log::debug!(
        "parsed {} results from {page_url} (page {page})",
        results.len()
    );
    SearchResponse::new(results, pagination)
}

/// Parses a listing row. Rows without a detail link carry no md5 and are
/// skipped.
pub fn parse_row(row: ElementRef, page_url: &Url) -> Option<BookResult> {
    let sel = selectors();
    let cells: Vec<ElementRef> = row.select(&sel.cells).collect();

    let title_cell = cells.get(TITLE_COL)?;
    let title_link = title_cell.select(&sel.anchor).next()?;
    let md5 = title_link.value().attr("href").and_then(md5_from_href)?;

    let file = cells
        .get(FILE_COL)
        .map(|cell| parse_file_info(&element_text(*cell)))
        .unwrap_or_else(|| FileInfo {
            format: String::new(),
            size: 0.0,
            unit: String::new(),
        });

    let mirrors = cells
        .get(MIRRORS_COL)
        .map(|cell| parse_mirrors(*cell, page_url, &file))
        .unwrap_or_default();

    let image_url = row
        .select(&sel.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| resolve(page_url, src))
        .unwrap_or_default();

    Some(BookResult {
        title: element_text(title_link),
        authors: cells
            .get(AUTHORS_COL)
            .map(|cell| parse_authors(*cell))
            .unwrap_or_default(),
        series: cells
            .get(SERIES_COL)
            .map(|cell| element_text(*cell))
            .unwrap_or_default(),
        language: cells
            .get(LANGUAGE_COL)
            .map(|cell| element_text(*cell))
            .unwrap_or_default(),
        image_url,
        md5,
        mirrors,
    })
}

fn parse_authors(cell: ElementRef) -> String {
    let names: Vec<String> = cell
        .select(&selectors().author_links)
        .map(element_text)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        element_text(cell)
    } else {
        names.join(", ")
    }
}

fn parse_mirrors(cell: ElementRef, page_url: &Url, file: &FileInfo) -> Vec<Mirror> {
    cell.select(&selectors().mirror_links)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| resolve(page_url, href))
        .map(|url| Mirror {
            url,
            size: file.size,
            unit: file.unit.clone(),
            format: file.format.clone(),
        })
        .collect()
}

/// Splits `EPUB / 1,024.5 Kb` into its parts. Unparsable sizes come back as
/// zero with an empty unit.
pub fn parse_file_info(text: &str) -> FileInfo {
    let (format, size_part) = match text.split_once('/') {
        Some((format, rest)) => (format.trim(), rest.trim()),
        None => (text.trim(), ""),
    };

    let mut parts = size_part.split_whitespace();
    let size = parts
        .next()
        .and_then(|n| n.replace(',', "").parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s >= 0.0);
    let unit = parts.next().map(str::to_uppercase);

    match (size, unit) {
        (Some(size), Some(unit)) => FileInfo {
            format: format.to_lowercase(),
            size,
            unit,
        },
        _ => FileInfo {
            format: format.to_lowercase(),
            size: 0.0,
            unit: String::new(),
        },
    }
}

/// Extracts the md5 from a catalog link such as `/fiction/9F5C...`.
pub fn md5_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next()?;
    let (_, tail) = path.split_once("fiction/")?;
    let md5 = tail.trim_matches('/');
    is_md5(md5).then(|| md5.to_string())
}

/// Non-empty and ASCII hex only.
pub fn is_md5(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_hexdigit())
}

/// Reads `1,234 files found | showing results from 26 to 50`.
pub fn parse_paginator(text: &str, page: u32) -> Option<Pagination> {
    let (count, rest) = text.split_once("files found")?;
    let total_results = parse_number(count.split_whitespace().last()?)?;

    let (first, last) = match rest.split_once("from") {
        Some((_, range)) => {
            let mut words = range.split_whitespace();
            let first = words.next().and_then(parse_number);
            let last = words.nth(1).and_then(parse_number);
            (first.unwrap_or(0), last.unwrap_or(0))
        }
        None => (0, 0),
    };

    Some(Pagination {
        total_results,
        first,
        last,
        page,
        has_next_page: last > 0 && last < total_results,
    })
}

fn parse_number(word: &str) -> Option<u64> {
    word.trim_matches(|c: char| !c.is_ascii_digit())
        .replace(',', "")
        .parse()
        .ok()
}

/// Finds the direct download link on a book's download page.
pub fn parse_download_page(html: &str, page_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = selectors();

    let href = document
        .select(&sel.download_link)
        .next()
        .or_else(|| {
            document
                .select(&sel.anchor)
                .find(|a| element_text(*a).eq_ignore_ascii_case("GET"))
        })?
        .value()
        .attr("href")?;

    resolve(page_url, href)
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// Element text with runs of whitespace collapsed.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
