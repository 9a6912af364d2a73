//! Merge selected pages of several PDFs into one document.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{info, warn};

use super::load_document;
use super::ranges::select_pages;
use crate::error::{Result, ToolError};
use crate::report::Report;

/// One input of a merge: a file and an optional page selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSource {
    pub path: PathBuf,
    /// Page selection such as `1-3,5`; `None` means every page
    pub pages: Option<String>,
}

impl FromStr for MergeSource {
    type Err = String;

    /// Parses `path` or `path:pages`. A trailing `:selection` is only split
    /// off when it looks like a page selection, so Windows drive letters
    /// keep working.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("empty input".to_string());
        }
        if let Some((path, pages)) = s.rsplit_once(':') {
            let looks_like_pages = !pages.is_empty()
                && pages
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, ',' | '-' | ' '));
            if looks_like_pages && !path.is_empty() {
                return Ok(Self {
                    path: PathBuf::from(path),
                    pages: Some(pages.to_string()),
                });
            }
        }
        Ok(Self {
            path: PathBuf::from(s),
            pages: None,
        })
    }
}

fn type_name(object: &Object) -> Option<&[u8]> {
    object
        .as_dict()
        .ok()
        .and_then(|d| d.get(b"Type").ok())
        .and_then(|t| t.as_name().ok())
}

/// Merge the selected pages of `sources`, in order, into `output`.
pub fn merge_pdfs(sources: &[MergeSource], output: &Path) -> Result<Report> {
    if sources.is_empty() {
        return Err(ToolError::InvalidInput("no input files given".to_string()));
    }

    let mut report = Report::new("pdf-merge");
    let mut seen = HashSet::new();
    let mut max_id = 1;
    let mut page_order: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut files_used = 0usize;

    for source in sources {
        if !seen.insert(source.path.clone()) {
            warn!("{} given more than once, ignoring repeat", source.path.display());
            continue;
        }

        let mut doc = load_document(&source.path)?;
        let total = doc.get_pages().len() as u32;
        let selected: Vec<u32> = match &source.pages {
            Some(spec) => select_pages(spec, total)?,
            None => (1..=total).collect(),
        };

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages = doc.get_pages();
        let mut kept = 0;
        for number in &selected {
            if let Some(&page_id) = pages.get(number) {
                super::materialize_inherited(&mut doc, page_id)?;
                page_order.push(page_id);
                kept += 1;
            }
        }
        if kept == 0 {
            warn!("{} contributes no pages, skipping", source.path.display());
            continue;
        }

        info!("Taking {} of {} pages from {}", kept, total, source.path.display());
        files_used += 1;
        objects.extend(doc.objects);
    }

    if page_order.is_empty() {
        return Err(ToolError::InvalidInput("no pages selected".to_string()));
    }

    let mut merged = Document::with_version("1.5");
    for (id, object) in objects {
        // Each source's page tree and catalog are replaced by the new ones.
        match type_name(&object) {
            Some(b"Catalog") | Some(b"Pages") | Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                merged.objects.insert(id, object);
            }
        }
    }
    merged.max_id = max_id;

    let pages_id = merged.new_object_id();
    for page_id in &page_order {
        merged
            .get_dictionary_mut(*page_id)?
            .set("Parent", Object::Reference(pages_id));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set(
        "Kids",
        Object::Array(page_order.iter().map(|id| Object::Reference(*id)).collect()),
    );
    pages_dict.set("Count", Object::Integer(page_order.len() as i64));
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = merged.add_object(catalog);
    merged.trailer.set("Root", Object::Reference(catalog_id));

    // Unselected pages are no longer reachable from the new tree.
    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    merged.save(output)?;

    report.push_output(output);
    Ok(report.with_summary(format!(
        "merged {} pages from {} files",
        page_order.len(),
        files_used
    )))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_document;
    use super::*;

    #[test]
    fn parses_source_with_selection() {
        let source: MergeSource = "docs/a.pdf:1-3,5".parse().unwrap();
        assert_eq!(source.path, PathBuf::from("docs/a.pdf"));
        assert_eq!(source.pages.as_deref(), Some("1-3,5"));

        let plain: MergeSource = "C:\\docs\\b.pdf".parse().unwrap();
        assert_eq!(plain.path, PathBuf::from("C:\\docs\\b.pdf"));
        assert_eq!(plain.pages, None);
    }

    #[test]
    fn merges_selected_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        sample_document(3).save(&a).unwrap();
        sample_document(4).save(&b).unwrap();

        let out = dir.path().join("merged.pdf");
        let sources = vec![
            MergeSource { path: a.clone(), pages: Some("3,1".into()) },
            MergeSource { path: b, pages: None },
            MergeSource { path: a, pages: None },
        ];
        let report = merge_pdfs(&sources, &out).unwrap();
        assert_eq!(report.summary, "merged 6 pages from 2 files");

        let merged = Document::load(&out).unwrap();
        assert_eq!(merged.get_pages().len(), 6);
        let first = *merged.get_pages().get(&1).unwrap();
        let text = merged.extract_text(&[1]).unwrap();
        assert!(text.contains("Page 1"), "unexpected text: {text}");
        assert!(merged.get_dictionary(first).unwrap().has(b"MediaBox"));
    }

    #[test]
    fn source_without_matching_pages_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        sample_document(2).save(&a).unwrap();
        sample_document(3).save(&b).unwrap();

        let out = dir.path().join("merged.pdf");
        let sources = vec![
            MergeSource { path: a, pages: Some("9".into()) },
            MergeSource { path: b, pages: None },
        ];
        let report = merge_pdfs(&sources, &out).unwrap();
        assert_eq!(report.summary, "merged 3 pages from 1 files");
        assert_eq!(Document::load(&out).unwrap().get_pages().len(), 3);
    }

    #[test]
    fn malformed_selection_still_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        sample_document(2).save(&a).unwrap();
        let sources = vec![MergeSource { path: a, pages: Some("0-1".into()) }];
        assert!(matches!(
            merge_pdfs(&sources, &dir.path().join("m.pdf")),
            Err(ToolError::InvalidPageRange { .. })
        ));
    }

    #[test]
    fn selection_outside_every_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        sample_document(2).save(&a).unwrap();
        let sources = vec![MergeSource { path: a, pages: Some("9".into()) }];
        assert!(merge_pdfs(&sources, &dir.path().join("m.pdf")).is_err());
    }
}
