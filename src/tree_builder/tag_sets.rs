// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Named element sets consulted by the tree builder.
//!
//! The HTML-namespace sets are driven by the category masks in the tag
//! catalog; the MathML/SVG integration points are identified by local name
//! because foreign element names are not catalog entries.

use crate::interface::{ElemName, Namespace};
use crate::tag::category::*;
use crate::tag::TagId;

#[inline]
fn html_mask(name: &ElemName, mask: u32) -> bool {
    name.ns == Namespace::Html && name.tag.category() & mask != 0
}

pub(crate) fn mathml_text_integration_point(name: &ElemName) -> bool {
    name.ns == Namespace::MathMl && matches!(&*name.local, "mi" | "mo" | "mn" | "ms" | "mtext")
}

pub(crate) fn svg_html_integration_point(name: &ElemName) -> bool {
    name.ns == Namespace::Svg && matches!(&*name.local, "foreignObject" | "desc" | "title")
}

fn foreign_scope_boundary(name: &ElemName) -> bool {
    mathml_text_integration_point(name)
        || svg_html_integration_point(name)
        || (name.ns == Namespace::MathMl && &*name.local == "annotation-xml")
}

pub(crate) fn default_scope(name: &ElemName) -> bool {
    html_mask(name, SCOPE) || foreign_scope_boundary(name)
}

pub(crate) fn list_item_scope(name: &ElemName) -> bool {
    default_scope(name) || html_mask(name, SCOPE_LIST_ITEM)
}

pub(crate) fn button_scope(name: &ElemName) -> bool {
    default_scope(name) || html_mask(name, SCOPE_BUTTON)
}

pub(crate) fn table_scope(name: &ElemName) -> bool {
    html_mask(name, SCOPE_TABLE)
}

/// Select scope is inverted: every element terminates it except the ones
/// carrying `SCOPE_SELECT`.
pub(crate) fn select_scope(name: &ElemName) -> bool {
    !html_mask(name, SCOPE_SELECT)
}

pub(crate) fn table_body_context(name: &ElemName) -> bool {
    name.is_html()
        && matches!(
            name.tag,
            TagId::Tbody | TagId::Tfoot | TagId::Thead | TagId::Template | TagId::Html
        )
}

pub(crate) fn table_row_context(name: &ElemName) -> bool {
    name.is_html() && matches!(name.tag, TagId::Tr | TagId::Template | TagId::Html)
}

pub(crate) fn td_th(name: &ElemName) -> bool {
    name.is_html() && matches!(name.tag, TagId::Td | TagId::Th)
}

pub(crate) fn cursory_implied_end(name: &ElemName) -> bool {
    name.is_html()
        && matches!(
            name.tag,
            TagId::Dd
                | TagId::Dt
                | TagId::Li
                | TagId::Option
                | TagId::Optgroup
                | TagId::P
                | TagId::Rb
                | TagId::Rp
                | TagId::Rt
                | TagId::Rtc
        )
}

pub(crate) fn thorough_implied_end(name: &ElemName) -> bool {
    cursory_implied_end(name)
        || (name.is_html()
            && matches!(
                name.tag,
                TagId::Caption
                    | TagId::Colgroup
                    | TagId::Tbody
                    | TagId::Td
                    | TagId::Tfoot
                    | TagId::Th
                    | TagId::Thead
                    | TagId::Tr
            ))
}

pub(crate) fn heading_tag(name: &ElemName) -> bool {
    name.is_html()
        && matches!(
            name.tag,
            TagId::H1 | TagId::H2 | TagId::H3 | TagId::H4 | TagId::H5 | TagId::H6
        )
}

/// The "special" category, which blocks generic end-tag matching and the
/// `li`/`dd`/`dt` auto-close walk.
pub(crate) fn special_tag(name: &ElemName) -> bool {
    html_mask(name, SPECIAL) || foreign_scope_boundary(name)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::interface::ElemName;
    use crate::tag::TagId;
    use tendril::StrTendril;

    fn svg(local: &str) -> ElemName {
        ElemName::new(Namespace::Svg, TagId::Undef, StrTendril::from_slice(local))
    }

    #[test]
    fn scopes() {
        assert!(default_scope(&ElemName::html(TagId::Table)));
        assert!(!default_scope(&ElemName::html(TagId::Div)));
        assert!(button_scope(&ElemName::html(TagId::Button)));
        assert!(!table_scope(&ElemName::html(TagId::Td)));
        assert!(select_scope(&ElemName::html(TagId::Div)));
        assert!(!select_scope(&ElemName::html(TagId::Option)));
        assert!(default_scope(&svg("foreignObject")));
        assert!(!default_scope(&svg("g")));
    }

    #[test]
    fn special() {
        assert!(special_tag(&ElemName::html(TagId::P)));
        assert!(special_tag(&ElemName::html(TagId::Archetype)));
        assert!(!special_tag(&ElemName::html(TagId::Span)));
        assert!(!special_tag(&ElemName::html(TagId::B)));
    }
}
