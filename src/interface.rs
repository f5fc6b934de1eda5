// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Types for communicating between the parser and the embedder's tree
//! representation.

use std::borrow::Cow;
use std::fmt;

use tendril::StrTendril;

use crate::tag::TagId;

pub use self::QuirksMode::{LimitedQuirks, NoQuirks, Quirks};

/// The namespace of an element.
///
/// The tree builder only ever creates elements in these three namespaces;
/// everything under `<math>` is MathML and everything under `<svg>` is SVG
/// until an HTML integration point is reached.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Debug)]
pub enum Namespace {
    Html,
    MathMl,
    Svg,
}

impl Namespace {
    pub fn url(self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
            Namespace::Svg => "http://www.w3.org/2000/svg",
        }
    }
}

/// Attribute name prefixes recognized by the foreign-content attribute
/// adjustment (`xlink:href` and friends).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Debug)]
pub enum Prefix {
    Xlink,
    Xml,
    Xmlns,
}

impl Prefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Prefix::Xlink => "xlink",
            Prefix::Xml => "xml",
            Prefix::Xmlns => "xmlns",
        }
    }
}

/// An attribute name.
///
/// The tokenizer creates all attributes without a prefix; the tree builder
/// splits off a recognized prefix inside foreign elements (MathML, SVG).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct AttrName {
    pub prefix: Option<Prefix>,
    pub local: StrTendril,
}

impl AttrName {
    pub fn new(local: StrTendril) -> AttrName {
        AttrName {
            prefix: None,
            local,
        }
    }

    pub fn prefixed(prefix: Prefix, local: &str) -> AttrName {
        AttrName {
            prefix: Some(prefix),
            local: StrTendril::from_slice(local),
        }
    }
}

impl fmt::Display for AttrName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix.as_str(), self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// A tag attribute.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub struct Attribute {
    pub name: AttrName,
    pub value: StrTendril,
}

/// The identity of an element: its namespace, catalog tag id, and local
/// name. Elements whose name is not in the catalog (foreign content and
/// unknown HTML tags) carry `TagId::Undef` and are identified by `local`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ElemName {
    pub ns: Namespace,
    pub tag: TagId,
    pub local: StrTendril,
}

impl ElemName {
    pub fn new(ns: Namespace, tag: TagId, local: StrTendril) -> ElemName {
        ElemName { ns, tag, local }
    }

    /// An HTML element with a catalog name.
    pub fn html(tag: TagId) -> ElemName {
        ElemName {
            ns: Namespace::Html,
            tag,
            local: StrTendril::from_slice(tag.local_name()),
        }
    }

    #[inline]
    pub fn is_html(&self) -> bool {
        self.ns == Namespace::Html
    }
}

/// A document's quirks mode, set by DOCTYPE analysis.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
pub enum QuirksMode {
    Quirks,
    LimitedQuirks,
    NoQuirks,
}

/// Something which can be inserted into the DOM.
///
/// Adjacent sibling text nodes are merged into a single node, so when the
/// parser inserts a character run it provides the text itself and the sink
/// decides whether to make a new node or extend an existing one.
pub enum NodeOrText<Handle> {
    AppendNode(Handle),
    AppendText(StrTendril),
}

/// Types which can process the tree modifications requested by the tree
/// builder: the node interface the embedder supplies.
pub trait TreeSink {
    /// `Handle` is a reference to a DOM node. The tree builder requires
    /// that a `Handle` implements `Clone` to get another reference to
    /// the same node.
    type Handle: Clone;

    /// The overall result of parsing.
    type Output;

    /// Consume this sink and return the overall result of parsing.
    fn finish(self) -> Self::Output;

    /// Signal a parse error.
    fn parse_error(&self, msg: Cow<'static, str>);

    /// Get a handle to the `Document` node.
    fn get_document(&self) -> Self::Handle;

    /// What is the name of the given element?
    ///
    /// Should never be called on a non-element node; feel free to
    /// `panic!`.
    fn elem_name(&self, target: &Self::Handle) -> ElemName;

    /// Create an element.
    fn create_element(&self, name: ElemName, attrs: Vec<Attribute>) -> Self::Handle;

    /// Create a comment node.
    fn create_comment(&self, text: StrTendril) -> Self::Handle;

    /// Append a node as the last child of the given node. If this would
    /// produce adjacent sibling text nodes, it should concatenate the text
    /// instead.
    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>);

    /// Append a node as the sibling immediately before the given node.
    ///
    /// The tree builder promises that `sibling` is not a text node.
    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>);

    /// When the insertion point is decided by the existence of a parent
    /// node of the element, we consider both possibilities and send the
    /// element which will be used if a parent node exists, along with the
    /// element to be used if there isn't one.
    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    );

    /// Append a `DOCTYPE` element to the `Document` node.
    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    );

    /// Add each attribute to the given element, if no attribute with that
    /// name already exists.
    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>);

    /// Detach the given node from its parent.
    fn remove_from_parent(&self, target: &Self::Handle);

    /// Remove all the children from node and append them to new_parent.
    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle);

    /// Get a handle to a template's template contents. The tree builder
    /// promises this will never be called with something else than
    /// a template element.
    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle;

    /// Do two handles refer to the same node?
    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool;

    /// Set the document's quirks mode.
    fn set_quirks_mode(&self, mode: QuirksMode);

    /// Mark a HTML `<script>` as "already started".
    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    /// Indicate that a node was popped off the stack of open elements.
    fn pop(&self, _node: &Self::Handle) {}

    /// Returns true if the adjusted current node is an HTML integration
    /// point and the token is a start tag.
    fn is_mathml_annotation_xml_integration_point(&self, _handle: &Self::Handle) -> bool {
        false
    }

    /// Called whenever the line number changes.
    fn set_current_line(&self, _line_number: u64) {}
}
