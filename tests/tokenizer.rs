// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tokenizer tests, using a sink that records a flat description of every
//! token.

use std::cell::RefCell;

use hvml5ever::tendril::StrTendril;
use hvml5ever::tokenizer::{
    CharacterTokens, CommentToken, DoctypeToken, EOFToken, EndTag, NullCharacterToken, ParseError,
    StartTag, TagToken, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use hvml5ever::BufferQueue;
use hvml5ever::TagId;

#[derive(Clone, PartialEq, Eq, Debug)]
enum Described {
    Chars(String),
    Start(TagId, String, Vec<(String, String)>, bool),
    End(TagId, String),
    Comment(String),
    Doctype(Option<String>, Option<String>, Option<String>, bool),
    Null,
    Eof,
}

struct Collector {
    tokens: RefCell<Vec<Described>>,
    text: RefCell<String>,
}

impl Collector {
    fn new() -> Collector {
        Collector {
            tokens: RefCell::new(vec![]),
            text: RefCell::new(String::new()),
        }
    }

    fn flush_text(&self) {
        let mut text = self.text.borrow_mut();
        if !text.is_empty() {
            self.tokens
                .borrow_mut()
                .push(Described::Chars(std::mem::take(&mut text)));
        }
    }

    fn push(&self, token: Described) {
        self.flush_text();
        self.tokens.borrow_mut().push(token);
    }
}

impl TokenSink for Collector {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            CharacterTokens(text) => self.text.borrow_mut().push_str(&text),
            NullCharacterToken => self.push(Described::Null),
            TagToken(tag) => {
                let attrs = tag
                    .attrs
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                let name = tag.name.to_string();
                self.push(match tag.kind {
                    StartTag => Described::Start(tag.id, name, attrs, tag.self_closing),
                    EndTag => Described::End(tag.id, name),
                });
            },
            CommentToken(text) => self.push(Described::Comment(text.to_string())),
            DoctypeToken(dt) => self.push(Described::Doctype(
                dt.name.as_ref().map(|t| t.to_string()),
                dt.public_id.as_ref().map(|t| t.to_string()),
                dt.system_id.as_ref().map(|t| t.to_string()),
                dt.force_quirks,
            )),
            EOFToken => self.push(Described::Eof),
            ParseError(_) => (),
        }
        TokenSinkResult::Continue
    }
}

fn tokenize_chunks(chunks: &[&str]) -> Vec<Described> {
    let tok = Tokenizer::new(Collector::new(), TokenizerOpts::default());
    let input = BufferQueue::default();
    for chunk in chunks {
        input.push_back(StrTendril::from_slice(chunk));
        let _ = tok.feed(&input);
    }
    tok.end();
    let collector = &tok.sink;
    collector.flush_text();
    collector.tokens.take()
}

fn tokenize(input: &str) -> Vec<Described> {
    tokenize_chunks(&[input])
}

fn start(id: TagId, name: &str) -> Described {
    Described::Start(id, name.to_string(), vec![], false)
}

fn end(id: TagId, name: &str) -> Described {
    Described::End(id, name.to_string())
}

fn chars(text: &str) -> Described {
    Described::Chars(text.to_string())
}

#[test]
fn plain_text_and_tags() {
    assert_eq!(
        tokenize("a<p>b</p>c"),
        vec![
            chars("a"),
            start(TagId::P, "p"),
            chars("b"),
            end(TagId::P, "p"),
            chars("c"),
            Described::Eof,
        ]
    );
}

#[test]
fn attributes_are_collected() {
    assert_eq!(
        tokenize("<a href='x' b=c d>"),
        vec![
            Described::Start(
                TagId::A,
                "a".to_string(),
                vec![
                    ("href".to_string(), "x".to_string()),
                    ("b".to_string(), "c".to_string()),
                    ("d".to_string(), String::new()),
                ],
                false,
            ),
            Described::Eof,
        ]
    );
}

#[test]
fn self_closing_flag() {
    assert_eq!(
        tokenize("<br/>"),
        vec![
            Described::Start(TagId::Br, "br".to_string(), vec![], true),
            Described::Eof,
        ]
    );
}

#[test]
fn unknown_tags_keep_their_name() {
    assert_eq!(
        tokenize("<widget></widget>"),
        vec![
            start(TagId::Undef, "widget"),
            end(TagId::Undef, "widget"),
            Described::Eof,
        ]
    );
}

#[test]
fn tag_names_are_lowercased() {
    assert_eq!(
        tokenize("<DIV></Div>"),
        vec![start(TagId::Div, "div"), end(TagId::Div, "div"), Described::Eof]
    );
}

#[test]
fn comments() {
    assert_eq!(
        tokenize("<!--a-b--><!---->"),
        vec![
            Described::Comment("a-b".to_string()),
            Described::Comment(String::new()),
            Described::Eof,
        ]
    );
}

#[test]
fn comment_end_bang_recovery() {
    assert_eq!(
        tokenize("<!--a--!>b"),
        vec![
            Described::Comment("a".to_string()),
            chars("b"),
            Described::Eof,
        ]
    );
}

#[test]
fn doctype_with_identifiers() {
    assert_eq!(
        tokenize("<!DOCTYPE html PUBLIC \"pub\" \"sys\">"),
        vec![
            Described::Doctype(
                Some("html".to_string()),
                Some("pub".to_string()),
                Some("sys".to_string()),
                false,
            ),
            Described::Eof,
        ]
    );
}

#[test]
fn eof_in_doctype_forces_quirks() {
    assert_eq!(
        tokenize("<!DOCTYPE html"),
        vec![
            Described::Doctype(Some("html".to_string()), None, None, true),
            Described::Eof,
        ]
    );
}

#[test]
fn null_byte_is_reported() {
    assert_eq!(
        tokenize("a\0b"),
        vec![chars("a"), Described::Null, chars("b"), Described::Eof]
    );
}

#[test]
fn named_references_with_and_without_semicolon() {
    assert_eq!(tokenize("&amp;&amp x"), vec![chars("&& x"), Described::Eof]);
    assert_eq!(tokenize("&notin;"), vec![chars("\u{2209}"), Described::Eof]);
    // &not is a match even while &notin; would be longer.
    assert_eq!(tokenize("&notit;"), vec![chars("\u{ac}it;"), Described::Eof]);
    // Unknown names are left undecoded.
    assert_eq!(tokenize("&bogus;x"), vec![chars("&bogus;x"), Described::Eof]);
}

#[test]
fn numeric_references() {
    assert_eq!(tokenize("&#65;&#x42;"), vec![chars("AB"), Described::Eof]);
    // Out-of-range and C1 controls are remapped.
    assert_eq!(
        tokenize("&#x110000;&#x80;"),
        vec![chars("\u{fffd}\u{20ac}"), Described::Eof]
    );
}

#[test]
fn legacy_reference_in_attribute_value() {
    // &copy followed by an alphanumeric must not be decoded in attributes.
    assert_eq!(
        tokenize("<a href=\"a&copyb\">"),
        vec![
            Described::Start(
                TagId::A,
                "a".to_string(),
                vec![("href".to_string(), "a&copyb".to_string())],
                false,
            ),
            Described::Eof,
        ]
    );
    // With a semicolon it always decodes.
    assert_eq!(
        tokenize("<a href=\"a&copy;b\">"),
        vec![
            Described::Start(
                TagId::A,
                "a".to_string(),
                vec![("href".to_string(), "a\u{a9}b".to_string())],
                false,
            ),
            Described::Eof,
        ]
    );
}

#[test]
fn cr_and_crlf_normalize_to_lf() {
    assert_eq!(tokenize("a\r\nb\rc"), vec![chars("a\nb\nc"), Described::Eof]);
}

#[test]
fn bom_is_discarded() {
    assert_eq!(tokenize("\u{feff}a"), vec![chars("a"), Described::Eof]);
}

#[test]
fn stray_lt_is_text() {
    assert_eq!(
        tokenize("a < b"),
        vec![chars("a < b"), Described::Eof]
    );
}

#[test]
fn single_byte_chunks_match_whole_input() {
    let inputs = [
        "a<p class='x'>b</p>&notin;&amp c<!--d--!>e",
        "<!DOCTYPE html PUBLIC \"p\" \"s\"><hvml><init a=b/>&#x41;",
        "x\r\n<pre>\ny</pre>&copy=",
    ];
    for input in inputs {
        let whole = tokenize(input);
        let bytes: Vec<&str> = (0..input.len())
            .filter(|&i| input.is_char_boundary(i))
            .map(|i| {
                let mut end = i + 1;
                while !input.is_char_boundary(end) {
                    end += 1;
                }
                &input[i..end]
            })
            .collect();
        assert_eq!(whole, tokenize_chunks(&bytes), "for input {input:?}");
    }
}
