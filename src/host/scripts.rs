// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Script discovery for loaded documents

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::Result;

/// A `<script>` element found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRef {
    /// Inline source text
    Inline(String),
    /// Value of the `src` attribute, unresolved
    External(String),
    /// `type="module"`, which the page host does not run. Carries `src`
    /// when present.
    Module(Option<String>),
}

/// A script ready to run in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageScript {
    /// Label console output is tagged with (URL or `inline-N`)
    pub label: String,
    pub code: String,
}

/// Classic script types; anything else (modules, JSON, templates) is skipped
fn is_classic_script(script_type: Option<&str>) -> bool {
    match script_type.map(|t| t.trim().to_ascii_lowercase()) {
        None => true,
        Some(t) => matches!(
            t.as_str(),
            "" | "text/javascript" | "application/javascript" | "application/x-javascript"
        ),
    }
}

/// Collect classic and module scripts from `html` in document order
pub fn discover_scripts(html: &str) -> Result<Vec<ScriptRef>> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;

    let mut scripts = Vec::new();
    walk(&dom.document, &mut scripts);
    Ok(scripts)
}

fn walk(handle: &Handle, scripts: &mut Vec<ScriptRef>) {
    if let NodeData::Element {
        ref name,
        ref attrs,
        ..
    } = handle.data
    {
        if name.local.to_string() == "script" {
            let mut src = None;
            let mut script_type = None;
            for attr in attrs.borrow().iter() {
                match attr.name.local.to_string().as_str() {
                    "src" => src = Some(attr.value.to_string()),
                    "type" => script_type = Some(attr.value.to_string()),
                    _ => {}
                }
            }

            if script_type
                .as_deref()
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("module"))
            {
                scripts.push(ScriptRef::Module(src.map(|s| s.trim().to_string())));
                return;
            }

            if !is_classic_script(script_type.as_deref()) {
                tracing::debug!(script_type = ?script_type, "Skipping non-classic script");
                return;
            }

            match src {
                Some(src) if !src.trim().is_empty() => {
                    scripts.push(ScriptRef::External(src.trim().to_string()))
                }
                _ => {
                    let text = text_content(handle);
                    if !text.trim().is_empty() {
                        scripts.push(ScriptRef::Inline(text));
                    }
                }
            }
            return;
        }
    }

    for child in handle.children.borrow().iter() {
        walk(child, scripts);
    }
}

fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    for child in handle.children.borrow().iter() {
        if let NodeData::Text { ref contents } = child.data {
            text.push_str(&contents.borrow());
        }
    }
    text
}
