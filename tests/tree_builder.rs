// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tree construction tests: byte-level inputs against the serialization
//! of the tree they must produce.

use hvml5ever::driver::{parse_document, parse_fragment, ParseOpts};
use hvml5ever::interface::ElemName;
use hvml5ever::rcdom::RcDom;
use hvml5ever::serialize::{serialize, SerializeOpts};
use hvml5ever::tendril::StrTendril;
use hvml5ever::{QuirksMode, TagId};

fn parse(input: &str) -> RcDom {
    let parser = parse_document(RcDom::default(), ParseOpts::default());
    parser.feed(StrTendril::from_slice(input));
    parser.finish()
}

fn parse_chunked(input: &str, chunk_size: usize) -> RcDom {
    let parser = parse_document(RcDom::default(), ParseOpts::default());
    let bytes = input.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let mut end = usize::min(start + chunk_size, bytes.len());
        while !input.is_char_boundary(end) {
            end += 1;
        }
        parser.feed(StrTendril::from_slice(&input[start..end]));
        start = end;
    }
    parser.finish()
}

fn to_html(dom: &RcDom) -> String {
    let mut buf = Vec::new();
    serialize(&mut buf, &dom.document, SerializeOpts::default()).unwrap();
    String::from_utf8(buf).unwrap()
}

fn assert_parses_to(input: &str, expected: &str) {
    let dom = parse(input);
    assert_eq!(to_html(&dom), expected, "for input {input:?}");
}

#[test]
fn empty_input_produces_skeleton() {
    assert_parses_to("", "<html><head></head><body></body></html>");
}

#[test]
fn whitespace_only_input_is_like_empty() {
    assert_parses_to(" \n\t ", "<html><head></head><body></body></html>");
}

#[test]
fn head_and_body_are_implied() {
    assert_parses_to(
        "<p>x</p>",
        "<html><head></head><body><p>x</p></body></html>",
    );
}

#[test]
fn adoption_agency_reorders_misnested_formatting() {
    assert_parses_to(
        "<!DOCTYPE html><p>a<b>b<i>c</b>d</i>e",
        "<!DOCTYPE html><html><head></head><body>\
         <p>a<b>b<i>c</i></b><i>d</i>e</p></body></html>",
    );
}

#[test]
fn tbody_is_synthesized() {
    assert_parses_to(
        "<table><tr><td>x</td></tr></table>",
        "<html><head></head><body>\
         <table><tbody><tr><td>x</td></tr></tbody></table></body></html>",
    );
}

#[test]
fn nonspace_table_text_is_foster_parented() {
    assert_parses_to(
        "<!DOCTYPE html><p>1<table>2</table>",
        "<!DOCTYPE html><html><head></head><body>\
         <p>1</p>2<table></table></body></html>",
    );
}

#[test]
fn whitespace_table_text_stays_in_table() {
    assert_parses_to(
        "<!DOCTYPE html><table> </table>",
        "<!DOCTYPE html><html><head></head><body><table> </table></body></html>",
    );
}

#[test]
fn script_content_is_raw_text() {
    assert_parses_to(
        "<script>x<y</script>z",
        "<html><head><script>x<y</script></head><body>z</body></html>",
    );
}

#[test]
fn title_content_is_rcdata() {
    // RCDATA keeps markup-significant characters as text; the serializer
    // re-escapes them.
    assert_parses_to(
        "<title>a<b>&amp;</title>",
        "<html><head><title>a&lt;b&gt;&amp;</title></head><body></body></html>",
    );
}

#[test]
fn svg_subtree_with_html_island() {
    assert_parses_to(
        "<!DOCTYPE html><body><div><svg><g></g>\
         <foreignObject><p>x</p></foreignObject></svg></div></body>",
        "<!DOCTYPE html><html><head></head><body><div><svg><g></g>\
         <foreignObject><p>x</p></foreignObject></svg></div></body></html>",
    );
}

#[test]
fn html_breakout_tag_leaves_foreign_content() {
    assert_parses_to(
        "<!DOCTYPE html><svg><circle/><p>x",
        "<!DOCTYPE html><html><head></head><body>\
         <svg><circle></circle></svg><p>x</p></body></html>",
    );
}

#[test]
fn character_references_are_decoded() {
    assert_parses_to(
        "<!DOCTYPE html><p>&amp; &notin; &ampx &#x41;&#65;</p>",
        "<!DOCTYPE html><html><head></head><body>\
         <p>&amp; \u{2209} &amp;x AA</p></body></html>",
    );
}

#[test]
fn bare_ampersand_in_attribute_is_kept() {
    assert_parses_to(
        "<!DOCTYPE html><a href=\"?a&b=c\">x</a>",
        "<!DOCTYPE html><html><head></head><body>\
         <a href=\"?a&amp;b=c\">x</a></body></html>",
    );
}

#[test]
fn unclosed_tags_are_closed_at_eof() {
    let dom = parse("<!DOCTYPE html><div><p>x");
    assert_eq!(
        to_html(&dom),
        "<!DOCTYPE html><html><head></head><body><div><p>x</p></div></body></html>"
    );
    // <div> left open at EOF is a parse error; <p> is allowed.
    assert!(!dom.errors.borrow().is_empty());
}

#[test]
fn li_auto_closes_previous_li() {
    assert_parses_to(
        "<!DOCTYPE html><ul><li>a<li>b</ul>",
        "<!DOCTYPE html><html><head></head><body>\
         <ul><li>a</li><li>b</li></ul></body></html>",
    );
}

#[test]
fn nested_table_closes_outer_cell_content() {
    assert_parses_to(
        "<!DOCTYPE html><table><td>a<table><td>b</table></table>",
        "<!DOCTYPE html><html><head></head><body>\
         <table><tbody><tr><td>a<table><tbody><tr><td>b</td></tr></tbody>\
         </table></td></tr></tbody></table></body></html>",
    );
}

#[test]
fn caption_returns_to_in_table() {
    assert_parses_to(
        "<!DOCTYPE html><table><caption>c</caption><tr><td>x</table>",
        "<!DOCTYPE html><html><head></head><body><table><caption>c</caption>\
         <tbody><tr><td>x</td></tr></tbody></table></body></html>",
    );
}

#[test]
fn template_contents_live_outside_the_document_tree() {
    assert_parses_to(
        "<!DOCTYPE html><template><td>x</td></template>",
        "<!DOCTYPE html><html><head><template><td>x</td></template></head>\
         <body></body></html>",
    );
}

#[test]
fn select_in_table_escapes_on_table_tags() {
    assert_parses_to(
        "<!DOCTYPE html><table><tr><td><select><option>a<tr><td>b",
        "<!DOCTYPE html><html><head></head><body><table><tbody>\
         <tr><td><select><option>a</option></select></td></tr>\
         <tr><td>b</td></tr></tbody></table></body></html>",
    );
}

#[test]
fn plaintext_consumes_everything() {
    assert_parses_to(
        "<!DOCTYPE html><plaintext></plaintext><p>",
        "<!DOCTYPE html><html><head></head><body>\
         <plaintext></plaintext><p></plaintext></body></html>",
    );
}

#[test]
fn textarea_skips_leading_newline() {
    assert_parses_to(
        "<!DOCTYPE html><textarea>\nx</textarea>",
        "<!DOCTYPE html><html><head></head><body>\
         <textarea>x</textarea></body></html>",
    );
}

#[test]
fn pre_skips_leading_newline() {
    assert_parses_to(
        "<!DOCTYPE html><pre>\nx</pre>",
        "<!DOCTYPE html><html><head></head><body><pre>x</pre></body></html>",
    );
}

#[test]
fn hvml_tags_parse_as_ordinary_elements() {
    assert_parses_to(
        "<!DOCTYPE html><init as=\"users\"><iterate on=\"$users\">x</iterate></init>",
        "<!DOCTYPE html><html><head></head><body>\
         <init as=\"users\"><iterate on=\"$users\">x</iterate></init></body></html>",
    );
}

#[test]
fn cdata_is_text_only_in_foreign_content() {
    assert_parses_to(
        "<!DOCTYPE html><svg><![CDATA[x<y]]></svg>",
        "<!DOCTYPE html><html><head></head><body><svg>x&lt;y</svg></body></html>",
    );
    // In HTML content a CDATA section is a bogus comment.
    assert_parses_to(
        "<!DOCTYPE html><p><![CDATA[x]]></p>",
        "<!DOCTYPE html><html><head></head><body>\
         <p><!--[CDATA[x]]--></p></body></html>",
    );
}

#[test]
fn frameset_document() {
    assert_parses_to(
        "<!DOCTYPE html><frameset><frame></frameset><noframes>x</noframes>",
        "<!DOCTYPE html><html><head></head><frameset><frame></frameset>\
         <noframes>x</noframes></html>",
    );
}

#[test]
fn noscript_in_head_falls_back_on_stray_content() {
    assert_parses_to(
        "<head><noscript><style>s</style>x</noscript></head>",
        "<html><head><noscript><style>s</style></noscript></head>\
         <body>x</body></html>",
    );
}

#[test]
fn stray_content_after_body_reenters_in_body() {
    assert_parses_to(
        "<!DOCTYPE html><body>a</body>b",
        "<!DOCTYPE html><html><head></head><body>ab</body></html>",
    );
}

#[test]
fn comments_go_where_they_fall() {
    assert_parses_to(
        "<!--pre--><!DOCTYPE html><p>x</p><!--post-->",
        "<!--pre--><!DOCTYPE html><html><head></head><body>\
         <p>x</p><!--post--></body></html>",
    );
}

#[test]
fn duplicate_attributes_are_dropped_with_error() {
    let dom = parse("<!DOCTYPE html><p id=\"a\" id=\"b\">x</p>");
    assert_eq!(
        to_html(&dom),
        "<!DOCTYPE html><html><head></head><body><p id=\"a\">x</p></body></html>"
    );
    assert!(dom
        .errors
        .borrow()
        .iter()
        .any(|e| e.contains("Duplicate attribute")));
}

#[test]
fn missing_doctype_sets_quirks_mode() {
    let dom = parse("<p>x</p>");
    assert_eq!(dom.quirks_mode.get(), QuirksMode::Quirks);
    assert_eq!(parse("<!DOCTYPE html>").quirks_mode.get(), QuirksMode::NoQuirks);
}

#[test]
fn legacy_doctype_quirks_selection() {
    let html401 = "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\">";
    assert_eq!(parse(html401).quirks_mode.get(), QuirksMode::NoQuirks);

    let frameset = "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Frameset//EN\">";
    assert_eq!(parse(frameset).quirks_mode.get(), QuirksMode::Quirks);

    let frameset_sys = "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Frameset//EN\" \
                        \"http://www.w3.org/TR/html4/frameset.dtd\">";
    assert_eq!(
        parse(frameset_sys).quirks_mode.get(),
        QuirksMode::LimitedQuirks
    );
}

#[test]
fn chunking_does_not_change_the_tree() {
    let inputs = [
        "<!DOCTYPE html><p>a<b>b<i>c</b>d</i>e",
        "<table><tr><td>x</td></tr></table>",
        "<!DOCTYPE html><p>&amp; &notin; &#x41;</p>",
        "<script>x<y</script>z",
        "<!DOCTYPE html><svg><foreignObject><p>x</p></foreignObject></svg>",
    ];
    for input in inputs {
        let whole = to_html(&parse(input));
        for chunk_size in [1, 2, 3, 7] {
            let chunked = to_html(&parse_chunked(input, chunk_size));
            assert_eq!(whole, chunked, "chunk size {chunk_size} for {input:?}");
        }
    }
}

#[test]
fn serialization_round_trips() {
    let inputs = [
        "<!DOCTYPE html><p>a<b>b<i>c</b>d</i>e",
        "<!DOCTYPE html><table><tr><td>x</td></tr></table>",
        "<!DOCTYPE html><ul><li>a<li>b</ul>",
    ];
    for input in inputs {
        let first = to_html(&parse(input));
        let second = to_html(&parse(&first));
        assert_eq!(first, second, "for input {input:?}");
    }
}

fn parse_fragment_with_context(input: &str, context: TagId) -> RcDom {
    let parser = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        ElemName::html(context),
        vec![],
    );
    parser.feed(StrTendril::from_slice(input));
    parser.finish()
}

fn fragment_to_html(dom: &RcDom) -> String {
    // The children of the artificial root are the fragment's result.
    let document = dom.document.children.borrow();
    let root = document.first().expect("no root element");
    let mut buf = Vec::new();
    serialize(&mut buf, root, SerializeOpts::default()).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn fragment_in_div_context() {
    let dom = parse_fragment_with_context("<p>a</p>b", TagId::Div);
    assert_eq!(fragment_to_html(&dom), "<p>a</p>b");
}

#[test]
fn fragment_in_table_context_synthesizes_sections() {
    let dom = parse_fragment_with_context("<td>x", TagId::Table);
    assert_eq!(fragment_to_html(&dom), "<tbody><tr><td>x</td></tr></tbody>");
}

#[test]
fn fragment_in_template_context() {
    let dom = parse_fragment_with_context("<p>x", TagId::Template);
    assert_eq!(fragment_to_html(&dom), "<p>x</p>");
}

#[test]
fn fragment_chunking_equivalence() {
    let input = "<td>a</td><td>b";
    let whole = fragment_to_html(&parse_fragment_with_context(input, TagId::Tr));
    for chunk_size in [1, 2, 5] {
        let parser = parse_fragment(
            RcDom::default(),
            ParseOpts::default(),
            ElemName::html(TagId::Tr),
            vec![],
        );
        for chunk in input.as_bytes().chunks(chunk_size) {
            parser.feed(StrTendril::from_slice(std::str::from_utf8(chunk).unwrap()));
        }
        let dom = parser.finish();
        assert_eq!(whole, fragment_to_html(&dom), "chunk size {chunk_size}");
    }
}
