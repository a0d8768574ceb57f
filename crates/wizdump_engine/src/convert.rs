//! Tree-walking conversion of a note body into plain text or Markdown.
//!
//! Every tag the walk accepts is listed explicitly; anything else is reported
//! as [`UnsupportedStructureError`] so the caller can fall back to HTML.

use std::ops::ControlFlow;
use std::path::Path;

use url::Url;

use crate::content::{ContentNode, ElementNode};
use crate::ExportFormat;

/// Line ending used in every emitted text or Markdown file.
pub const LINE_ENDING: &str = "\r\n";

/// Archive folder holding embedded resources; image sources inside it are local.
pub const RESOURCE_PREFIX: &str = "index_files/";

const CHECKBOX_ATTR: &str = "data-wiz-check";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unexpected tag \"{tag}\" for text file \"{output}\"")]
pub struct UnsupportedStructureError {
    pub tag: String,
    pub output: String,
}

/// What the walk is allowed to accept and where image links point.
#[derive(Debug, Clone, Copy)]
pub struct ConversionPolicy<'a> {
    /// Accept heading/emphasis-like tags because the format was chosen explicitly.
    pub force_text: bool,
    pub format: ExportFormat,
    /// Resource directory as it appears inside image links.
    pub image_dir: &'a str,
    /// Output path named in error messages.
    pub output_label: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub text: String,
    pub has_images: bool,
}

/// Converts the children of `body` under `policy`.
pub fn convert_body(
    body: &ElementNode,
    policy: &ConversionPolicy<'_>,
) -> Result<Conversion, UnsupportedStructureError> {
    let mut ctx = ConversionContext::new(policy);
    // A lite Markdown note stops the walk early; either way the buffer is finished below.
    let _ = ctx.visit_children(&body.children)?;
    Ok(ctx.finish())
}

struct ConversionContext<'p, 'a> {
    policy: &'p ConversionPolicy<'a>,
    buffer: String,
    has_images: bool,
}

type Walk = Result<ControlFlow<()>, UnsupportedStructureError>;

impl<'p, 'a> ConversionContext<'p, 'a> {
    fn new(policy: &'p ConversionPolicy<'a>) -> Self {
        Self {
            policy,
            buffer: String::new(),
            has_images: false,
        }
    }

    fn finish(mut self) -> Conversion {
        let kept = self
            .buffer
            .trim_end_matches(&[' ', '\t', '\r', '\n'][..])
            .len();
        self.buffer.truncate(kept);
        if !self.buffer.is_empty() {
            self.buffer.push_str(LINE_ENDING);
        }
        Conversion {
            text: self.buffer,
            has_images: self.has_images,
        }
    }

    fn visit_children(&mut self, children: &[ContentNode]) -> Walk {
        for child in children {
            if let ControlFlow::Break(()) = self.visit_node(child)? {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn visit_node(&mut self, node: &ContentNode) -> Walk {
        match node {
            ContentNode::Text(text) => {
                self.buffer.push_str(&normalize_text(text, false));
                Ok(ControlFlow::Continue(()))
            }
            ContentNode::Comment(_) | ContentNode::Doctype(_) => Ok(ControlFlow::Continue(())),
            ContentNode::Element(element) => self.visit_element(element),
        }
    }

    fn visit_element(&mut self, element: &ElementNode) -> Walk {
        match element.name.as_str() {
            "pre" => {
                let literal = normalize_text(&element.text_content(), true);
                if self.policy.format == ExportFormat::Markdown {
                    // Lite Markdown notes keep the whole document in a single <pre>.
                    self.buffer.clear();
                    self.buffer.push_str(&literal);
                    return Ok(ControlFlow::Break(()));
                }
                self.buffer.push_str(&literal);
            }
            "br" => self.trim_and_terminate(),
            "img" => self.handle_image(element)?,
            "span" | "a" | "font" => return self.visit_children(&element.children),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "label" | "b" | "strong"
            | "u" | "header" | "figure" | "small" | "code" => {
                if !self.policy.force_text {
                    return Err(self.unsupported(&element.name));
                }
                return self.visit_children(&element.children);
            }
            "div" | "p" => {
                self.ensure_line_start();
                if let ControlFlow::Break(()) = self.visit_children(&element.children)? {
                    return Ok(ControlFlow::Break(()));
                }
                self.ensure_line_start();
            }
            "wiz_tmp_caret" | "style" | "meta" | "title" => {}
            other => return Err(self.unsupported(other)),
        }
        Ok(ControlFlow::Continue(()))
    }

    fn handle_image(&mut self, element: &ElementNode) -> Result<(), UnsupportedStructureError> {
        let src = element
            .attr("src")
            .ok_or_else(|| self.unsupported(&element.name))?;

        if let Some(relative) = src.strip_prefix(RESOURCE_PREFIX) {
            let label = file_stem(relative);
            self.buffer.push_str(&format!(
                "![{label}]({dir}/{relative})",
                dir = self.policy.image_dir
            ));
        } else {
            match element.attr(CHECKBOX_ATTR) {
                Some("checked") => self.buffer.push_str("- [x] "),
                Some("unchecked") => self.buffer.push_str("- [ ] "),
                Some(_) => {}
                None => {
                    let label = external_label(src);
                    self.buffer.push_str(&format!("![{label}]({src})"));
                }
            }
        }

        self.has_images = true;
        Ok(())
    }

    /// Drops trailing spaces, then ends the line unless the buffer is empty.
    fn trim_and_terminate(&mut self) {
        let kept = self.buffer.trim_end_matches(' ').len();
        self.buffer.truncate(kept);
        if !self.buffer.is_empty() {
            self.buffer.push_str(LINE_ENDING);
        }
    }

    fn ensure_line_start(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.trim_and_terminate();
        }
    }

    fn unsupported(&self, tag: &str) -> UnsupportedStructureError {
        UnsupportedStructureError {
            tag: tag.to_string(),
            output: self.policy.output_label.to_string(),
        }
    }
}

/// Text as it should appear in the output: non-breaking spaces become plain
/// spaces; line endings are dropped, or canonicalized when `keep_line_endings`.
fn normalize_text(text: &str, keep_line_endings: bool) -> String {
    let text = text.replace('\u{a0}', " ");
    if keep_line_endings {
        text.replace("\r\n", "\n").replace('\n', LINE_ENDING)
    } else {
        text.replace(&['\r', '\n'][..], "")
    }
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn external_label(src: &str) -> String {
    let last_segment = Url::parse(src)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.last().map(str::to_owned))
        })
        .unwrap_or_else(|| src.rsplit(&['/', '\\'][..]).next().unwrap_or(src).to_owned());
    file_stem(&last_segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_or_canonicalizes_line_endings() {
        assert_eq!(normalize_text("a\r\nb\nc\u{a0}d", false), "abc d");
        assert_eq!(normalize_text("a\r\nb\nc", true), "a\r\nb\r\nc");
    }

    #[test]
    fn external_labels_use_the_last_path_segment() {
        assert_eq!(external_label("https://example.com/img/cat.png?x=1"), "cat");
        assert_eq!(external_label("relative/dir/dog.jpeg"), "dog");
        assert_eq!(external_label("plain"), "plain");
    }
}
