// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTML serialization of the bundled DOM.

use std::io::{self, Write};

use crate::rcdom::{Handle, NodeData};
use crate::tag::TagId;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum TraversalScope {
    IncludeNode,
    ChildrenOnly,
}

#[derive(Copy, Clone)]
pub struct SerializeOpts {
    pub traversal_scope: TraversalScope,
}

impl Default for SerializeOpts {
    fn default() -> SerializeOpts {
        SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly,
        }
    }
}

/// Elements serialized with a start tag only.
fn is_void(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::Area
            | TagId::Base
            | TagId::Basefont
            | TagId::Bgsound
            | TagId::Br
            | TagId::Col
            | TagId::Embed
            | TagId::Frame
            | TagId::Hr
            | TagId::Img
            | TagId::Input
            | TagId::Keygen
            | TagId::Link
            | TagId::Meta
            | TagId::Param
            | TagId::Source
            | TagId::Track
            | TagId::Wbr
    )
}

/// Elements whose text children are written without escaping.
fn is_raw_text(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::Iframe
            | TagId::Noembed
            | TagId::Noframes
            | TagId::Noscript
            | TagId::Plaintext
            | TagId::Script
            | TagId::Style
            | TagId::Xmp
    )
}

fn write_escaped<Wr: Write>(writer: &mut Wr, text: &str, attr_mode: bool) -> io::Result<()> {
    for c in text.chars() {
        match c {
            '&' => writer.write_all(b"&amp;")?,
            '\u{a0}' => writer.write_all(b"&nbsp;")?,
            '"' if attr_mode => writer.write_all(b"&quot;")?,
            '<' if !attr_mode => writer.write_all(b"&lt;")?,
            '>' if !attr_mode => writer.write_all(b"&gt;")?,
            c => writer.write_all(c.to_string().as_bytes())?,
        }
    }
    Ok(())
}

fn serialize_node<Wr: Write>(
    writer: &mut Wr,
    node: &Handle,
    include_node: bool,
    parent_is_raw: bool,
) -> io::Result<()> {
    match node.data {
        NodeData::Element {
            ref name,
            ref attrs,
            ref template_contents,
            ..
        } => {
            if include_node {
                writer.write_all(b"<")?;
                writer.write_all(name.local.as_bytes())?;
                for attr in attrs.borrow().iter() {
                    writer.write_all(b" ")?;
                    if let Some(prefix) = attr.name.prefix {
                        writer.write_all(prefix.as_str().as_bytes())?;
                        writer.write_all(b":")?;
                    }
                    writer.write_all(attr.name.local.as_bytes())?;
                    writer.write_all(b"=\"")?;
                    write_escaped(writer, &attr.value, true)?;
                    writer.write_all(b"\"")?;
                }
                writer.write_all(b">")?;

                if name.is_html() && is_void(name.tag) {
                    return Ok(());
                }
            }

            let raw = name.is_html() && is_raw_text(name.tag);
            if let Some(contents) = &*template_contents.borrow() {
                for child in contents.children.borrow().iter() {
                    serialize_node(writer, child, true, raw)?;
                }
            } else {
                for child in node.children.borrow().iter() {
                    serialize_node(writer, child, true, raw)?;
                }
            }

            if include_node {
                writer.write_all(b"</")?;
                writer.write_all(name.local.as_bytes())?;
                writer.write_all(b">")?;
            }
            Ok(())
        },

        NodeData::Document => {
            for child in node.children.borrow().iter() {
                serialize_node(writer, child, true, false)?;
            }
            Ok(())
        },

        NodeData::Doctype { ref name, .. } => {
            writer.write_all(b"<!DOCTYPE ")?;
            writer.write_all(name.as_bytes())?;
            writer.write_all(b">")
        },

        NodeData::Text { ref contents } => {
            if parent_is_raw {
                writer.write_all(contents.borrow().as_bytes())
            } else {
                write_escaped(writer, &contents.borrow(), false)
            }
        },

        NodeData::Comment { ref contents } => {
            writer.write_all(b"<!--")?;
            writer.write_all(contents.as_bytes())?;
            writer.write_all(b"-->")
        },
    }
}

/// Serialize a node from the bundled DOM as HTML.
pub fn serialize<Wr: Write>(writer: &mut Wr, node: &Handle, opts: SerializeOpts) -> io::Result<()> {
    match opts.traversal_scope {
        TraversalScope::IncludeNode => serialize_node(writer, node, true, false),
        TraversalScope::ChildrenOnly => serialize_node(writer, node, false, false),
    }
}
