//! PDF tools built on `lopdf`.
//!
//! Every tool loads the source document once, validates that it has pages,
//! edits a clone, and saves the result next to the other outputs.

pub mod docx;
pub mod from_images;
pub mod merge;
pub mod ranges;
pub mod render;
pub mod split;
pub mod watermark;

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Result, ToolError};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when a page carries no MediaBox at all.
const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Load a PDF from disk after checking that it exists, looks like a PDF,
/// and contains at least one page.
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.is_file() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ToolError::InvalidInput(format!(
            "not a PDF file: {}",
            path.display()
        )));
    }

    let doc = Document::load(path)?;
    if doc.get_pages().is_empty() {
        return Err(ToolError::EmptyDocument(path.to_path_buf()));
    }
    Ok(doc)
}

/// File stem used as the base name of derived outputs.
pub fn output_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}

/// Follow a reference to the object it points at; other objects pass through.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Look up an attribute on a page, walking up the `Parent` chain for the
/// attributes PDF allows pages to inherit.
pub(crate) fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>> {
    let mut current = doc.get_dictionary(page_id)?;
    // Page trees are shallow; the bound only guards against cyclic Parent links.
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Ok(Some(value.clone()));
        }
        match current.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = doc.get_dictionary(parent)?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Copy inherited attributes onto the page dictionary itself so that the
/// page survives being moved into a different page tree.
pub(crate) fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut missing = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE {
            if !page.has(key) {
                missing.push(key);
            }
        }
    }

    for key in missing {
        if let Some(value) = inherited_attribute(doc, page_id, key)? {
            doc.get_dictionary_mut(page_id)?.set(key, value);
        }
    }
    Ok(())
}

/// The page's MediaBox as `[llx, lly, urx, ury]`.
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4]> {
    let Some(value) = inherited_attribute(doc, page_id, b"MediaBox")? else {
        return Ok(FALLBACK_MEDIA_BOX);
    };
    let array = resolve(doc, &value)?.as_array()?;
    if array.len() != 4 {
        return Ok(FALLBACK_MEDIA_BOX);
    }

    let mut rect = [0.0f32; 4];
    for (slot, item) in rect.iter_mut().zip(array) {
        *slot = resolve(doc, item)?.as_float()?;
    }
    Ok(rect)
}

/// Get the page's own resource dictionary, creating or un-sharing it as
/// needed so that additions do not leak into other pages.
pub(crate) fn page_resources_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    materialize_inherited(doc, page_id)?;

    let current = doc.get_dictionary(page_id)?.get(b"Resources").ok().cloned();
    let owned = match current {
        Some(Object::Reference(id)) => doc.get_dictionary(id)?.clone(),
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };
    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Resources", Object::Dictionary(owned));
    Ok(page.get_mut(b"Resources")?.as_dict_mut()?)
}

/// Insert `value` into the sub-dictionary `category` (Font, ExtGState,
/// XObject) of a resource dictionary, resolving an indirect sub-dictionary.
pub(crate) fn add_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    name: &str,
    value: Object,
) -> Result<()> {
    let indirect = page_resources_mut(doc, page_id)?
        .get(category)
        .ok()
        .and_then(|o| o.as_reference().ok());
    let mut sub = match indirect {
        Some(id) => doc.get_dictionary(id)?.clone(),
        None => Dictionary::new(),
    };

    let resources = page_resources_mut(doc, page_id)?;
    if indirect.is_none()
        && let Ok(existing) = resources.get(category).and_then(Object::as_dict)
    {
        sub = existing.clone();
    }
    sub.set(name, value);
    resources.set(category, Object::Dictionary(sub));
    Ok(())
}

/// Draw `content` on top of the page. The existing content is wrapped in
/// `q`/`Q` so that graphics state it leaves behind cannot shift the overlay.
pub(crate) fn append_page_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> Result<()> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned() {
        Some(Object::Array(items)) => items,
        Some(Object::Reference(id)) => match doc.get_object(id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(id)],
        },
        _ => Vec::new(),
    };

    let mut overlay = b"Q\n".to_vec();
    overlay.extend_from_slice(&content);
    let open_id = doc.add_object(lopdf::Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_id = doc.add_object(lopdf::Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_document;
    use super::*;

    #[test]
    fn media_box_is_inherited_from_page_tree() {
        let doc = sample_document(2);
        let first = *doc.get_pages().get(&1).unwrap();
        assert_eq!(media_box(&doc, first).unwrap(), [0.0, 0.0, 612.0, 792.0]);
    }

    #[test]
    fn materialize_copies_resources_onto_page() {
        let mut doc = sample_document(1);
        let page = *doc.get_pages().get(&1).unwrap();
        assert!(!doc.get_dictionary(page).unwrap().has(b"Resources"));

        materialize_inherited(&mut doc, page).unwrap();
        let dict = doc.get_dictionary(page).unwrap();
        assert!(dict.has(b"Resources"));
        assert!(dict.has(b"MediaBox"));
    }

    #[test]
    fn add_resource_does_not_touch_shared_dictionary() {
        let mut doc = sample_document(2);
        let pages = doc.get_pages();
        let first = pages[&1];
        let second = pages[&2];

        add_resource(&mut doc, first, b"ExtGState", "GSx", Object::Dictionary(Dictionary::new())).unwrap();

        let first_res = doc.get_dictionary(first).unwrap().get(b"Resources").unwrap().as_dict().unwrap();
        assert!(first_res.get(b"ExtGState").unwrap().as_dict().unwrap().has(b"GSx"));
        // Fonts from the shared dictionary are still visible on the edited page.
        assert!(first_res.get(b"Font").unwrap().as_dict().unwrap().has(b"F1"));
        // The other page still inherits the untouched shared dictionary.
        assert!(!doc.get_dictionary(second).unwrap().has(b"Resources"));
    }

    #[test]
    fn output_stem_falls_back_for_odd_names() {
        assert_eq!(output_stem(Path::new("/tmp/report.pdf")), "report");
        assert_eq!(output_stem(Path::new("/")), "document");
    }
}
