//! Page selection strings such as `1-3,5,7-9`.

use std::collections::BTreeSet;

use crate::error::{Result, ToolError};

fn invalid(spec: &str, reason: impl Into<String>) -> ToolError {
    ToolError::InvalidPageRange {
        spec: spec.to_string(),
        reason: reason.into(),
    }
}

fn parse_page(spec: &str, item: &str) -> Result<u32> {
    let page: u32 = item
        .trim()
        .parse()
        .map_err(|_| invalid(spec, format!("'{}' is not a page number", item.trim())))?;
    if page == 0 {
        return Err(invalid(spec, "page numbers start at 1"));
    }
    Ok(page)
}

/// Parse a page selection into sorted, de-duplicated 1-based page numbers.
///
/// Range ends past `total` are clipped; single pages past `total` are
/// ignored. An empty result is an error.
pub fn parse_page_ranges(spec: &str, total: u32) -> Result<Vec<u32>> {
    let pages = select_pages(spec, total)?;
    if pages.is_empty() {
        return Err(invalid(
            spec,
            format!("no page of the selection exists (document has {total} pages)"),
        ));
    }
    Ok(pages)
}

/// Like [`parse_page_ranges`], but a well-formed selection that matches no
/// page of the document yields an empty list instead of an error.
pub fn select_pages(spec: &str, total: u32) -> Result<Vec<u32>> {
    if spec.trim().is_empty() {
        return Err(invalid(spec, "no pages given"));
    }

    let mut pages = BTreeSet::new();
    for item in spec.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        match item.split_once('-') {
            Some((start, end)) => {
                let start = parse_page(spec, start)?;
                let end = parse_page(spec, end)?;
                if end < start {
                    return Err(invalid(spec, format!("range {start}-{end} is reversed")));
                }
                pages.extend(start..=end.min(total));
            }
            None => {
                let page = parse_page(spec, item)?;
                if page <= total {
                    pages.insert(page);
                }
            }
        }
    }

    Ok(pages.into_iter().collect())
}

/// Collapse sorted page numbers into runs of consecutive pages.
pub fn group_consecutive(pages: &[u32]) -> Vec<(u32, u32)> {
    let mut groups: Vec<(u32, u32)> = Vec::new();
    for &page in pages {
        match groups.last_mut() {
            Some((_, end)) if *end + 1 == page => *end = page,
            _ => groups.push((page, page)),
        }
    }
    groups
}

/// Cut `total` pages into chunks of `per_file` pages.
pub fn chunk_ranges(total: u32, per_file: u32) -> Result<Vec<(u32, u32)>> {
    if per_file == 0 {
        return Err(ToolError::InvalidInput(
            "pages per file must be greater than 0".to_string(),
        ));
    }
    let mut ranges = Vec::new();
    let mut start = 1u32;
    while start <= total {
        let end = start.saturating_add(per_file - 1).min(total);
        ranges.push((start, end));
        start = end + 1;
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_selection() {
        assert_eq!(parse_page_ranges("1-3,5,7-9", 10).unwrap(), vec![1, 2, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn clips_and_deduplicates() {
        assert_eq!(parse_page_ranges("4-20, 2, 4, 12", 6).unwrap(), vec![2, 4, 5, 6]);
    }

    #[test]
    fn rejects_page_zero_and_garbage() {
        assert!(parse_page_ranges("0-2", 5).is_err());
        assert!(parse_page_ranges("a-b", 5).is_err());
        assert!(parse_page_ranges("3-1", 5).is_err());
        assert!(parse_page_ranges("  ", 5).is_err());
    }

    #[test]
    fn selection_outside_document_is_an_error() {
        let err = parse_page_ranges("8,9", 5).unwrap_err();
        assert!(matches!(err, ToolError::InvalidPageRange { .. }));
        assert_eq!(select_pages("8,9-12", 5).unwrap(), Vec::<u32>::new());
        assert!(select_pages("0", 5).is_err());
    }

    #[test]
    fn groups_runs() {
        assert_eq!(group_consecutive(&[1, 2, 3, 5, 7, 8]), vec![(1, 3), (5, 5), (7, 8)]);
        assert!(group_consecutive(&[]).is_empty());
    }

    #[test]
    fn chunks_with_short_tail() {
        assert_eq!(chunk_ranges(7, 3).unwrap(), vec![(1, 3), (4, 6), (7, 7)]);
        assert_eq!(chunk_ranges(2, 1).unwrap(), vec![(1, 1), (2, 2)]);
        assert!(chunk_ranges(3, 0).is_err());
    }
}
