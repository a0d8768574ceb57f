//! Per-note choice of output representation.
//!
//! The title's extension decides the format when it names one. Otherwise the
//! note is tried as plain text and falls back to the original HTML when its
//! structure is too rich for text.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use export_logging::{export_debug, export_warn};
use kuchikikiki::traits::TendrilSink;
use kuchikikiki::{Doctype, NodeRef};

use crate::config::ExportConfig;
use crate::content::{ContentDocument, ElementNode};
use crate::convert::{convert_body, ConversionPolicy, UnsupportedStructureError, RESOURCE_PREFIX};
use crate::resources::{resource_dir_name, resource_link_dir};
use crate::ExportFormat;

/// Format implied by a note title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    Markdown,
    Text,
    SourceCode,
    Unrecognized,
}

pub fn classify_title(title: &str, config: &ExportConfig) -> TitleKind {
    let ext = Path::new(title)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "md" => TitleKind::Markdown,
        "txt" => TitleKind::Text,
        "" => TitleKind::Unrecognized,
        other if config.is_source_code_extension(other) => TitleKind::SourceCode,
        _ => TitleKind::Unrecognized,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    Text(String),
    Html(String),
}

impl RenderedBody {
    pub fn as_str(&self) -> &str {
        match self {
            RenderedBody::Text(text) | RenderedBody::Html(text) => text,
        }
    }
}

/// A note rendered into its final format, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub format: ExportFormat,
    pub output_file: PathBuf,
    pub body: RenderedBody,
    pub has_images: bool,
}

/// Renders `document` for the output path `title_path` (the mirrored,
/// sanitized title without any added extension).
pub fn render_document(
    document: &ContentDocument,
    title: &str,
    title_path: &Path,
    config: &ExportConfig,
) -> Result<RenderedDocument, UnsupportedStructureError> {
    match classify_title(title, config) {
        TitleKind::Markdown => render_text(
            document,
            title_path,
            ExportFormat::Markdown,
            true,
            title_path.to_path_buf(),
        ),
        TitleKind::Text => render_text(
            document,
            title_path,
            ExportFormat::Text,
            true,
            title_path.with_extension("md"),
        ),
        TitleKind::SourceCode => render_text(
            document,
            title_path,
            ExportFormat::SourceCode,
            true,
            title_path.to_path_buf(),
        ),
        TitleKind::Unrecognized => {
            let text_file = append_extension(title_path, "txt");
            match render_text(
                document,
                &text_file,
                ExportFormat::Text,
                false,
                append_extension(title_path, "md"),
            ) {
                Ok(rendered) => Ok(rendered),
                Err(err) => {
                    export_debug!("Falling back to HTML: {}", err);
                    Ok(render_html(document, title, title_path))
                }
            }
        }
    }
}

/// Runs the converter; a text result that contains images is reclassified as
/// Markdown and moved to `image_output`.
fn render_text(
    document: &ContentDocument,
    output_file: &Path,
    format: ExportFormat,
    force_text: bool,
    image_output: PathBuf,
) -> Result<RenderedDocument, UnsupportedStructureError> {
    let image_format = format.with_images();
    let image_dir = resource_link_dir(&image_output, image_format);
    let output_label = output_file.to_string_lossy();
    let policy = ConversionPolicy {
        force_text,
        format,
        image_dir: &image_dir,
        output_label: &output_label,
    };

    let conversion = match document.body() {
        Some(body) => convert_body(body, &policy)?,
        None => convert_body(&ElementNode::new("body"), &policy)?,
    };

    let (format, output_file) = if conversion.has_images {
        (image_format, image_output)
    } else {
        (format, output_file.to_path_buf())
    };
    Ok(RenderedDocument {
        format,
        output_file,
        body: RenderedBody::Text(conversion.text),
        has_images: conversion.has_images,
    })
}

fn render_html(document: &ContentDocument, title: &str, title_path: &Path) -> RenderedDocument {
    let output_file = append_extension(title_path, "html");
    let resource_dir = resource_dir_name(&output_file, ExportFormat::Html);
    let html = prepare_html_document(document, title, &resource_dir);
    RenderedDocument {
        format: ExportFormat::Html,
        output_file,
        body: RenderedBody::Html(html),
        has_images: false,
    }
}

/// Serializes `document` titled `title`, with embedded images pointing into
/// `resource_dir`. Everything else in the markup is carried over as parsed.
pub fn prepare_html_document(
    document: &ContentDocument,
    title: &str,
    resource_dir: &str,
) -> String {
    let dom = kuchikikiki::parse_html().one(document.source());
    rewrite_image_sources(&dom, resource_dir);
    match dom.select_first("head") {
        Ok(head) => set_title(head.as_node(), title),
        Err(()) => export_warn!("Cannot find <head> while titling \"{}\"", title),
    }
    serialize_document(&dom)
}

fn set_title(head: &NodeRef, title: &str) {
    let existing = head.children().find(|child| {
        child
            .as_element()
            .is_some_and(|element| &*element.name.local == "title")
    });
    let title_node = match existing {
        Some(node) => {
            while let Some(child) = node.first_child() {
                child.detach();
            }
            node
        }
        None => {
            let Some(head_element) = head.as_element() else {
                return;
            };
            let mut name = head_element.name.clone();
            name.local = "title".into();
            let node = NodeRef::new_element(name, std::iter::empty());
            head.append(node.clone());
            node
        }
    };
    title_node.append(NodeRef::new_text(title));
}

fn rewrite_image_sources(dom: &NodeRef, resource_dir: &str) {
    let Ok(images) = dom.select("img") else {
        return;
    };
    for image in images {
        let mut attributes = image.attributes.borrow_mut();
        let rewritten = attributes
            .get("src")
            .and_then(|src| src.strip_prefix(RESOURCE_PREFIX))
            .map(|relative| format!("{resource_dir}/{relative}"));
        if let Some(src) = rewritten {
            attributes.insert("src", src);
        }
    }
}

/// The DOM serializer writes only the doctype name, so a doctype carrying
/// public or system identifiers is written out here to keep the rendering mode.
fn serialize_document(dom: &NodeRef) -> String {
    let mut out = String::new();
    for child in dom.children() {
        match child.as_doctype() {
            Some(doctype) => out.push_str(&doctype_declaration(doctype)),
            None => out.push_str(&child.to_string()),
        }
    }
    out
}

fn doctype_declaration(doctype: &Doctype) -> String {
    let mut declaration = format!("<!DOCTYPE {}", doctype.name);
    if !doctype.public_id.is_empty() {
        declaration.push_str(&format!(" PUBLIC \"{}\"", doctype.public_id));
        if !doctype.system_id.is_empty() {
            declaration.push_str(&format!(" \"{}\"", doctype.system_id));
        }
    } else if !doctype.system_id.is_empty() {
        declaration.push_str(&format!(" SYSTEM \"{}\"", doctype.system_id));
    }
    declaration.push('>');
    declaration
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_classified_by_extension() {
        let config = ExportConfig::default();
        assert_eq!(classify_title("Notes.MD", &config), TitleKind::Markdown);
        assert_eq!(classify_title("todo.txt", &config), TitleKind::Text);
        assert_eq!(classify_title("build.sh", &config), TitleKind::SourceCode);
        assert_eq!(classify_title("Plan", &config), TitleKind::Unrecognized);
        assert_eq!(classify_title("v1.2 release", &config), TitleKind::Unrecognized);
    }

    #[test]
    fn extensions_are_appended_not_replaced() {
        assert_eq!(append_extension(Path::new("out/v1.2"), "txt"), Path::new("out/v1.2.txt"));
    }

    #[test]
    fn prepared_html_retitles_and_relinks_images() {
        let doc = ContentDocument::parse(concat!(
            "<html><head><title>old</title></head>",
            "<body><img src=\"index_files/a.png\"></body></html>",
        ));
        let html = prepare_html_document(&doc, "new", "Plan_files");
        assert!(html.contains("<title>new</title>"));
        assert!(!html.contains("old"));
        assert!(html.contains("src=\"Plan_files/a.png\""));
        assert!(doc.source().contains("<title>old</title>"));
    }

    #[test]
    fn missing_title_is_added_to_head() {
        let doc = ContentDocument::parse(concat!(
            "<html><head><meta charset=\"utf-8\"></head>",
            "<body></body></html>",
        ));
        let html = prepare_html_document(&doc, "Fresh", "Fresh_files");
        assert!(html.contains("<title>Fresh</title></head>"));
    }

    #[test]
    fn doctype_identifiers_and_namespaced_attributes_survive() {
        let doc = ContentDocument::parse(concat!(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" ",
            "\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">",
            "<html><head><title>t</title></head><body>",
            "<svg xmlns:xlink=\"http://www.w3.org/1999/xlink\"><use xlink:href=\"#a\"/></svg>",
            "</body></html>",
        ));
        let html = prepare_html_document(&doc, "t", "t_files");
        assert!(html.starts_with(concat!(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" ",
            "\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">",
        )));
        assert!(html.contains("xlink:href=\"#a\""));
    }

    #[test]
    fn system_only_doctype_is_written_with_system_keyword() {
        let doctype = Doctype {
            name: "html".into(),
            public_id: String::new(),
            system_id: "about:legacy-compat".into(),
        };
        assert_eq!(
            doctype_declaration(&doctype),
            "<!DOCTYPE html SYSTEM \"about:legacy-compat\">"
        );
    }
}
