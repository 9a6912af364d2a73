//! Split one PDF into several smaller ones.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::{debug, info};

use super::ranges::{chunk_ranges, group_consecutive, parse_page_ranges};
use super::{load_document, output_stem};
use crate::error::Result;
use crate::report::Report;

/// How the source pages are distributed over the output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// Fixed number of pages per output file.
    Every(u32),
    /// Only the selected pages, one file per run of consecutive pages.
    Ranges(String),
}

/// Write pages `start..=end` of `doc` to `out`.
pub(crate) fn write_page_range(doc: &Document, start: u32, end: u32, out: &Path) -> Result<()> {
    let total = doc.get_pages().len() as u32;
    let to_delete: Vec<u32> = (1..=total).filter(|&p| p < start || p > end).collect();

    let mut part = doc.clone();
    part.delete_pages(&to_delete);
    part.prune_objects();
    part.renumber_objects();
    part.compress();
    part.save(out)?;
    Ok(())
}

/// Split `input` into files under `output_dir` according to `mode`.
pub fn split_pdf(input: &Path, output_dir: &Path, mode: &SplitMode) -> Result<Report> {
    let doc = load_document(input)?;
    let total = doc.get_pages().len() as u32;
    let stem = output_stem(input);
    fs::create_dir_all(output_dir)?;

    let mut report = Report::new("pdf-split");
    let (parts, summary): (Vec<(PathBuf, u32, u32)>, String) = match mode {
        SplitMode::Every(per_file) => {
            let chunks = chunk_ranges(total, *per_file)?;
            let summary = format!("split {} pages into {} files", total, chunks.len());
            let parts = chunks
                .into_iter()
                .map(|(s, e)| (output_dir.join(format!("{stem}_p{s}-{e}.pdf")), s, e))
                .collect();
            (parts, summary)
        }
        SplitMode::Ranges(spec) => {
            let pages = parse_page_ranges(spec, total)?;
            let groups = group_consecutive(&pages);
            let summary = format!("extracted {} pages into {} files", pages.len(), groups.len());
            let parts = groups
                .into_iter()
                .map(|(s, e)| (output_dir.join(format!("{stem}_range_{s}-{e}.pdf")), s, e))
                .collect();
            (parts, summary)
        }
    };

    info!("Splitting {} ({} pages) into {} parts", input.display(), total, parts.len());
    for (path, start, end) in parts {
        debug!("Writing pages {}-{} to {}", start, end, path.display());
        write_page_range(&doc, start, end, &path)?;
        report.push_output(&path);
    }

    Ok(report.with_summary(summary))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_document;
    use super::*;

    #[test]
    fn every_n_names_files_by_page_span() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.pdf");
        sample_document(5).save(&input).unwrap();

        let report = split_pdf(&input, &dir.path().join("out"), &SplitMode::Every(2)).unwrap();
        let names: Vec<String> = report
            .outputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["book_p1-2.pdf", "book_p3-4.pdf", "book_p5-5.pdf"]);
        assert_eq!(report.summary, "split 5 pages into 3 files");

        let last = Document::load(&report.outputs[2]).unwrap();
        assert_eq!(last.get_pages().len(), 1);
    }

    #[test]
    fn ranges_write_one_file_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.pdf");
        sample_document(9).save(&input).unwrap();

        let mode = SplitMode::Ranges("1-3,5,7-20".to_string());
        let report = split_pdf(&input, dir.path(), &mode).unwrap();
        assert_eq!(report.outputs.len(), 3);
        assert!(report.outputs[2].ends_with("book_range_7-9.pdf"));
        assert_eq!(report.summary, "extracted 7 pages into 3 files");

        let first = Document::load(&report.outputs[0]).unwrap();
        assert_eq!(first.get_pages().len(), 3);
    }
}
