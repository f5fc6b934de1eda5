// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tree builder rules: one dispatcher over the insertion modes.
//!
//! Each mode first distinguishes the token kind, then branches on the tag
//! identity; anything not named falls to the mode's `*_anything_else`
//! path, which either reports an error or reprocesses under another mode.

use crate::interface::{ElemName, Namespace, Quirks};
use crate::tag::TagId;
use crate::tokenizer::states::{Rawtext, Rcdata, ScriptData};
use crate::tokenizer::Tag;
use crate::tokenizer::TagKind::{EndTag, StartTag};
use crate::tree_builder::tag_sets::*;
use crate::tree_builder::types::*;
use crate::tree_builder::{html_elem, AppendNode, TreeBuilder, TreeSink};
use std::borrow::Cow::Borrowed;

use tendril::StrTendril;

fn any_not_whitespace(x: &StrTendril) -> bool {
    x.chars().any(|c| !c.is_ascii_whitespace())
}

fn current_node<Handle>(open_elems: &[Handle]) -> &Handle {
    open_elems.last().expect("no current element")
}

#[doc(hidden)]
impl<Handle, Sink> TreeBuilder<Handle, Sink>
where
    Handle: Clone,
    Sink: TreeSink<Handle = Handle>,
{
    pub(crate) fn step(&self, mode: InsertionMode, token: Token) -> ProcessResult<Handle> {
        self.debug_step(mode, &token);

        match mode {
            //§ the-initial-insertion-mode
            InsertionMode::Initial => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, _) => ProcessResult::Done,
                Token::Comment(text) => self.append_comment_to_doc(text),
                token => {
                    if !self.opts.iframe_srcdoc {
                        self.unexpected(&token);
                        self.set_quirks_mode(Quirks);
                    }
                    ProcessResult::Reprocess(InsertionMode::BeforeHtml, token)
                },
            },

            //§ the-before-html-insertion-mode
            InsertionMode::BeforeHtml => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, _) => ProcessResult::Done,
                Token::Comment(text) => self.append_comment_to_doc(text),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => {
                        self.create_root(tag.attrs);
                        self.mode.set(InsertionMode::BeforeHead);
                        ProcessResult::Done
                    },

                    (EndTag, TagId::Head | TagId::Body | TagId::Html | TagId::Br) => {
                        self.before_html_anything_else(Token::Tag(tag))
                    },
                    (EndTag, _) => self.unexpected(&tag),

                    _ => self.before_html_anything_else(Token::Tag(tag)),
                },

                token => self.before_html_anything_else(token),
            },

            //§ the-before-head-insertion-mode
            InsertionMode::BeforeHead => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, _) => ProcessResult::Done,
                Token::Comment(text) => self.append_comment(text),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, TagId::Head) => {
                        *self.head_elem.borrow_mut() = Some(self.insert_element_for(tag));
                        self.mode.set(InsertionMode::InHead);
                        ProcessResult::Done
                    },

                    (EndTag, TagId::Head | TagId::Body | TagId::Html | TagId::Br) => {
                        self.before_head_anything_else(Token::Tag(tag))
                    },
                    (EndTag, _) => self.unexpected(&tag),

                    _ => self.before_head_anything_else(Token::Tag(tag)),
                },

                token => self.before_head_anything_else(token),
            },

            //§ parsing-main-inhead
            InsertionMode::InHead => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (
                        StartTag,
                        TagId::Base | TagId::Basefont | TagId::Bgsound | TagId::Link | TagId::Meta,
                    ) => {
                        // FIXME: handle <meta charset=...> and <meta http-equiv="Content-Type">
                        self.insert_and_pop_element_for(tag);
                        ProcessResult::DoneAckSelfClosing
                    },

                    (StartTag, TagId::Title) => self.parse_raw_data(tag, Rcdata),

                    (StartTag, TagId::Noframes | TagId::Style | TagId::Noscript) => {
                        if (!self.opts.scripting_enabled) && (tag.id == TagId::Noscript) {
                            self.insert_element_for(tag);
                            self.mode.set(InsertionMode::InHeadNoscript);
                            ProcessResult::Done
                        } else {
                            self.parse_raw_data(tag, Rawtext)
                        }
                    },

                    (StartTag, TagId::Script) => {
                        let Tag { name, mut attrs, .. } = tag;
                        self.dedup_attributes(&mut attrs);
                        let elem = self.sink.create_element(
                            ElemName::new(Namespace::Html, TagId::Script, name),
                            attrs,
                        );
                        if self.is_fragment() {
                            self.sink.mark_script_already_started(&elem);
                        }
                        self.insert_appropriately(AppendNode(elem.clone()), None);
                        self.open_elems.borrow_mut().push(elem);
                        self.to_raw_text_mode(ScriptData)
                    },

                    (EndTag, TagId::Head) => {
                        self.pop();
                        self.mode.set(InsertionMode::AfterHead);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Template) => {
                        self.active_formatting
                            .borrow_mut()
                            .push(FormatEntry::Marker);
                        self.frameset_ok.set(false);
                        self.mode.set(InsertionMode::InTemplate);
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InTemplate);
                        self.insert_element_for(tag);
                        ProcessResult::Done
                    },

                    (EndTag, TagId::Template) => {
                        if !self.in_html_elem_named(TagId::Template) {
                            self.unexpected(&tag);
                        } else {
                            self.generate_implied_end_tags(thorough_implied_end);
                            self.expect_to_close(TagId::Template);
                            self.clear_active_formatting_to_marker();
                            self.template_modes.borrow_mut().pop();
                            self.mode.set(self.reset_insertion_mode());
                        }
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Head) => self.unexpected(&tag),

                    (EndTag, TagId::Body | TagId::Html | TagId::Br) => {
                        self.in_head_anything_else(Token::Tag(tag))
                    },
                    (EndTag, _) => self.unexpected(&tag),

                    _ => self.in_head_anything_else(Token::Tag(tag)),
                },

                token => self.in_head_anything_else(token),
            },

            //§ parsing-main-inheadnoscript
            InsertionMode::InHeadNoscript => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                tok @ Token::Characters(SplitStatus::Whitespace, _) => {
                    self.step(InsertionMode::InHead, tok)
                },
                tok @ Token::Comment(_) => self.step(InsertionMode::InHead, tok),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (EndTag, TagId::Noscript) => {
                        self.pop();
                        self.mode.set(InsertionMode::InHead);
                        ProcessResult::Done
                    },

                    (
                        StartTag,
                        TagId::Basefont
                        | TagId::Bgsound
                        | TagId::Link
                        | TagId::Meta
                        | TagId::Noframes
                        | TagId::Style,
                    ) => self.step(InsertionMode::InHead, Token::Tag(tag)),

                    (StartTag, TagId::Head | TagId::Noscript) => self.unexpected(&tag),

                    (EndTag, TagId::Br) => self.in_head_noscript_anything_else(Token::Tag(tag)),
                    (EndTag, _) => self.unexpected(&tag),

                    _ => self.in_head_noscript_anything_else(Token::Tag(tag)),
                },

                token => self.in_head_noscript_anything_else(token),
            },

            //§ the-after-head-insertion-mode
            InsertionMode::AfterHead => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, TagId::Body) => {
                        self.insert_element_for(tag);
                        self.frameset_ok.set(false);
                        self.mode.set(InsertionMode::InBody);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Frameset) => {
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InFrameset);
                        ProcessResult::Done
                    },

                    (
                        StartTag,
                        TagId::Base
                        | TagId::Basefont
                        | TagId::Bgsound
                        | TagId::Link
                        | TagId::Meta
                        | TagId::Noframes
                        | TagId::Script
                        | TagId::Style
                        | TagId::Template
                        | TagId::Title,
                    ) => {
                        self.unexpected(&tag);
                        let head = self
                            .head_elem
                            .borrow()
                            .as_ref()
                            .expect("no head element")
                            .clone();
                        self.push(&head);
                        let result = self.step(InsertionMode::InHead, Token::Tag(tag));
                        self.remove_from_stack(&head);
                        result
                    },

                    (EndTag, TagId::Template) => self.step(InsertionMode::InHead, Token::Tag(tag)),

                    (StartTag, TagId::Head) => self.unexpected(&tag),

                    (EndTag, TagId::Body | TagId::Html | TagId::Br) => {
                        self.after_head_anything_else(Token::Tag(tag))
                    },
                    (EndTag, _) => self.unexpected(&tag),

                    _ => self.after_head_anything_else(Token::Tag(tag)),
                },

                token => self.after_head_anything_else(token),
            },

            //§ parsing-main-inbody
            InsertionMode::InBody => match token {
                Token::NullCharacter => self.unexpected(&token),

                Token::Characters(_, text) => {
                    self.reconstruct_active_formatting_elements();
                    if any_not_whitespace(&text) {
                        self.frameset_ok.set(false);
                    }
                    self.append_text(text)
                },

                Token::Comment(text) => self.append_comment(text),

                Token::Eof => {
                    if !self.template_modes.borrow().is_empty() {
                        self.step(InsertionMode::InTemplate, Token::Eof)
                    } else {
                        self.check_body_end();
                        self.stop_parsing()
                    }
                },

                Token::Tag(tag) => self.step_in_body_tag(tag),
            },

            //§ parsing-main-incdata
            InsertionMode::Text => match token {
                Token::Characters(_, text) => self.append_text(text),

                Token::Eof => {
                    self.unexpected(&Token::Eof);
                    if self.current_node_named(TagId::Script) {
                        let open_elems = self.open_elems.borrow();
                        let current = current_node(&open_elems);
                        self.sink.mark_script_already_started(current);
                    }
                    self.pop();
                    ProcessResult::Reprocess(self.orig_mode.take().unwrap(), Token::Eof)
                },

                Token::Tag(tag) if tag.kind == EndTag => {
                    let node = self.pop();
                    self.mode.set(self.orig_mode.take().unwrap());
                    if tag.id == TagId::Script {
                        return ProcessResult::Script(node);
                    }
                    ProcessResult::Done
                },

                // The tokenizer only sends text and the matching end tag
                // while in a raw-data state.
                _ => panic!("impossible case in Text mode"),
            },

            //§ parsing-main-intable
            InsertionMode::InTable => match token {
                tok @ (Token::NullCharacter | Token::Characters(..)) => {
                    self.process_chars_in_table(tok)
                },

                Token::Comment(text) => self.append_comment(text),

                Token::Eof => self.step(InsertionMode::InBody, Token::Eof),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Caption) => {
                        self.pop_until_current(table_scope);
                        self.active_formatting
                            .borrow_mut()
                            .push(FormatEntry::Marker);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InCaption);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Colgroup) => {
                        self.pop_until_current(table_scope);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InColumnGroup);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Col) => {
                        self.pop_until_current(table_scope);
                        self.insert_phantom(TagId::Colgroup);
                        ProcessResult::Reprocess(InsertionMode::InColumnGroup, Token::Tag(tag))
                    },

                    (StartTag, TagId::Tbody | TagId::Tfoot | TagId::Thead) => {
                        self.pop_until_current(table_scope);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InTableBody);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Td | TagId::Th | TagId::Tr) => {
                        self.pop_until_current(table_scope);
                        self.insert_phantom(TagId::Tbody);
                        ProcessResult::Reprocess(InsertionMode::InTableBody, Token::Tag(tag))
                    },

                    (StartTag, TagId::Table) => {
                        self.unexpected(&tag);
                        if self.in_scope_named(table_scope, TagId::Table) {
                            self.pop_until_named(TagId::Table);
                            ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
                        } else {
                            ProcessResult::Done
                        }
                    },

                    (EndTag, TagId::Table) => {
                        if self.in_scope_named(table_scope, TagId::Table) {
                            self.pop_until_named(TagId::Table);
                            self.mode.set(self.reset_insertion_mode());
                        } else {
                            self.unexpected(&tag);
                        }
                        ProcessResult::Done
                    },

                    (
                        EndTag,
                        TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                    ) => self.unexpected(&tag),

                    (StartTag, TagId::Style | TagId::Script | TagId::Template)
                    | (EndTag, TagId::Template) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    (StartTag, TagId::Input) => {
                        self.unexpected(&tag);
                        if self.is_type_hidden(&tag) {
                            self.insert_and_pop_element_for(tag);
                            ProcessResult::DoneAckSelfClosing
                        } else {
                            self.foster_parent_in_body(Token::Tag(tag))
                        }
                    },

                    (StartTag, TagId::Form) => {
                        self.unexpected(&tag);
                        if !self.in_html_elem_named(TagId::Template)
                            && self.form_elem.borrow().is_none()
                        {
                            *self.form_elem.borrow_mut() =
                                Some(self.insert_and_pop_element_for(tag));
                        }
                        ProcessResult::Done
                    },

                    _ => {
                        self.unexpected(&tag);
                        self.foster_parent_in_body(Token::Tag(tag))
                    },
                },
            },

            //§ parsing-main-intabletext
            InsertionMode::InTableText => match token {
                Token::NullCharacter => self.unexpected(&token),

                Token::Characters(split, text) => {
                    self.pending_table_text.borrow_mut().push((split, text));
                    ProcessResult::Done
                },

                token => {
                    let pending = self.pending_table_text.take();
                    let contains_nonspace = pending.iter().any(|&(split, ref text)| match split {
                        SplitStatus::Whitespace => false,
                        SplitStatus::NotWhitespace => true,
                        SplitStatus::NotSplit => any_not_whitespace(text),
                    });

                    if contains_nonspace {
                        self.sink.parse_error(Borrowed("Non-space table text"));
                        for (split, text) in pending.into_iter() {
                            match self.foster_parent_in_body(Token::Characters(split, text)) {
                                ProcessResult::Done => (),
                                _ => panic!("not prepared to handle this!"),
                            }
                        }
                    } else {
                        for (_, text) in pending.into_iter() {
                            self.append_text(text);
                        }
                    }

                    ProcessResult::Reprocess(self.orig_mode.take().unwrap(), token)
                },
            },

            //§ parsing-main-incaption
            InsertionMode::InCaption => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (
                        StartTag,
                        TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                    )
                    | (EndTag, TagId::Table | TagId::Caption) => {
                        if self.in_scope_named(table_scope, TagId::Caption) {
                            self.generate_implied_end_tags(cursory_implied_end);
                            self.expect_to_close(TagId::Caption);
                            self.clear_active_formatting_to_marker();
                            match (tag.kind, tag.id) {
                                (EndTag, TagId::Caption) => {
                                    self.mode.set(InsertionMode::InTable);
                                    ProcessResult::Done
                                },
                                _ => ProcessResult::Reprocess(
                                    InsertionMode::InTable,
                                    Token::Tag(tag),
                                ),
                            }
                        } else {
                            self.unexpected(&tag);
                            ProcessResult::Done
                        }
                    },

                    (
                        EndTag,
                        TagId::Body
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                    ) => self.unexpected(&tag),

                    _ => self.step(InsertionMode::InBody, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InBody, token),
            },

            //§ parsing-main-incolgroup
            InsertionMode::InColumnGroup => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Eof => self.step(InsertionMode::InBody, Token::Eof),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, TagId::Col) => {
                        self.insert_and_pop_element_for(tag);
                        ProcessResult::DoneAckSelfClosing
                    },

                    (EndTag, TagId::Colgroup) => {
                        if self.current_node_named(TagId::Colgroup) {
                            self.pop();
                            self.mode.set(InsertionMode::InTable);
                        } else {
                            self.unexpected(&tag);
                        }
                        ProcessResult::Done
                    },

                    (EndTag, TagId::Col) => self.unexpected(&tag),

                    (StartTag, TagId::Template) | (EndTag, TagId::Template) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    _ => self.in_column_group_anything_else(Token::Tag(tag)),
                },

                token => self.in_column_group_anything_else(token),
            },

            //§ parsing-main-intbody
            InsertionMode::InTableBody => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Tr) => {
                        self.pop_until_current(table_body_context);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InRow);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Th | TagId::Td) => {
                        self.unexpected(&tag);
                        self.pop_until_current(table_body_context);
                        self.insert_phantom(TagId::Tr);
                        ProcessResult::Reprocess(InsertionMode::InRow, Token::Tag(tag))
                    },

                    (EndTag, TagId::Tbody | TagId::Tfoot | TagId::Thead) => {
                        if self.in_scope_named(table_scope, tag.id) {
                            self.pop_until_current(table_body_context);
                            self.pop();
                            self.mode.set(InsertionMode::InTable);
                        } else {
                            self.unexpected(&tag);
                        }
                        ProcessResult::Done
                    },

                    (
                        StartTag,
                        TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Tbody
                        | TagId::Tfoot
                        | TagId::Thead,
                    )
                    | (EndTag, TagId::Table) => {
                        fn table_outer(name: &ElemName) -> bool {
                            name.is_html()
                                && matches!(name.tag, TagId::Table | TagId::Tbody | TagId::Tfoot)
                        }
                        if self.in_scope(table_scope, |e| self.elem_in(&e, table_outer)) {
                            self.pop_until_current(table_body_context);
                            self.pop();
                            ProcessResult::Reprocess(InsertionMode::InTable, Token::Tag(tag))
                        } else {
                            self.unexpected(&tag)
                        }
                    },

                    (
                        EndTag,
                        TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Td
                        | TagId::Th
                        | TagId::Tr,
                    ) => self.unexpected(&tag),

                    _ => self.step(InsertionMode::InTable, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InTable, token),
            },

            //§ parsing-main-intr
            InsertionMode::InRow => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Th | TagId::Td) => {
                        self.pop_until_current(table_row_context);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InCell);
                        self.active_formatting
                            .borrow_mut()
                            .push(FormatEntry::Marker);
                        ProcessResult::Done
                    },

                    (EndTag, TagId::Tr) => {
                        if self.in_scope_named(table_scope, TagId::Tr) {
                            self.pop_until_current(table_row_context);
                            let node = self.pop();
                            self.assert_named(&node, TagId::Tr);
                            self.mode.set(InsertionMode::InTableBody);
                        } else {
                            self.unexpected(&tag);
                        }
                        ProcessResult::Done
                    },

                    (
                        StartTag,
                        TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Tbody
                        | TagId::Tfoot
                        | TagId::Thead
                        | TagId::Tr,
                    )
                    | (EndTag, TagId::Table) => {
                        if self.in_scope_named(table_scope, TagId::Tr) {
                            self.pop_until_current(table_row_context);
                            let node = self.pop();
                            self.assert_named(&node, TagId::Tr);
                            ProcessResult::Reprocess(InsertionMode::InTableBody, Token::Tag(tag))
                        } else {
                            self.unexpected(&tag)
                        }
                    },

                    (EndTag, TagId::Tbody | TagId::Tfoot | TagId::Thead) => {
                        if self.in_scope_named(table_scope, tag.id) {
                            if self.in_scope_named(table_scope, TagId::Tr) {
                                self.pop_until_current(table_row_context);
                                let node = self.pop();
                                self.assert_named(&node, TagId::Tr);
                                ProcessResult::Reprocess(
                                    InsertionMode::InTableBody,
                                    Token::Tag(tag),
                                )
                            } else {
                                ProcessResult::Done
                            }
                        } else {
                            self.unexpected(&tag)
                        }
                    },

                    (
                        EndTag,
                        TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Td
                        | TagId::Th,
                    ) => self.unexpected(&tag),

                    _ => self.step(InsertionMode::InTable, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InTable, token),
            },

            //§ parsing-main-intd
            InsertionMode::InCell => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (EndTag, TagId::Td | TagId::Th) => {
                        if self.in_scope_named(table_scope, tag.id) {
                            self.generate_implied_end_tags(cursory_implied_end);
                            self.expect_to_close(tag.id);
                            self.clear_active_formatting_to_marker();
                            self.mode.set(InsertionMode::InRow);
                        } else {
                            self.unexpected(&tag);
                        }
                        ProcessResult::Done
                    },

                    (
                        StartTag,
                        TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                    ) => {
                        if self.in_scope(table_scope, |n| self.elem_in(&n, td_th)) {
                            self.close_the_cell();
                            ProcessResult::Reprocess(InsertionMode::InRow, Token::Tag(tag))
                        } else {
                            self.unexpected(&tag)
                        }
                    },

                    (EndTag, TagId::Body | TagId::Caption | TagId::Col | TagId::Colgroup
                        | TagId::Html) => self.unexpected(&tag),

                    (EndTag, TagId::Table | TagId::Tbody | TagId::Tfoot | TagId::Thead
                        | TagId::Tr) => {
                        if self.in_scope_named(table_scope, tag.id) {
                            self.close_the_cell();
                            ProcessResult::Reprocess(InsertionMode::InRow, Token::Tag(tag))
                        } else {
                            self.unexpected(&tag)
                        }
                    },

                    _ => self.step(InsertionMode::InBody, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InBody, token),
            },

            //§ parsing-main-inselect
            InsertionMode::InSelect => match token {
                Token::NullCharacter => self.unexpected(&token),
                Token::Characters(_, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Eof => self.step(InsertionMode::InBody, Token::Eof),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, TagId::Option) => {
                        if self.current_node_named(TagId::Option) {
                            self.pop();
                        }
                        self.insert_element_for(tag);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Optgroup) => {
                        if self.current_node_named(TagId::Option) {
                            self.pop();
                        }
                        if self.current_node_named(TagId::Optgroup) {
                            self.pop();
                        }
                        self.insert_element_for(tag);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Hr) => {
                        if self.current_node_named(TagId::Option) {
                            self.pop();
                        }
                        if self.current_node_named(TagId::Optgroup) {
                            self.pop();
                        }
                        self.insert_element_for(tag);
                        self.pop();
                        ProcessResult::DoneAckSelfClosing
                    },

                    (EndTag, TagId::Optgroup) => {
                        if self.open_elems.borrow().len() >= 2
                            && self.current_node_named(TagId::Option)
                            && self.html_elem_named(
                                &self.open_elems.borrow()[self.open_elems.borrow().len() - 2],
                                TagId::Optgroup,
                            )
                        {
                            self.pop();
                        }
                        if self.current_node_named(TagId::Optgroup) {
                            self.pop();
                        } else {
                            self.unexpected(&tag);
                        }
                        ProcessResult::Done
                    },

                    (EndTag, TagId::Option) => {
                        if self.current_node_named(TagId::Option) {
                            self.pop();
                        } else {
                            self.unexpected(&tag);
                        }
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Select) | (EndTag, TagId::Select) => {
                        let in_scope = self.in_scope_named(select_scope, TagId::Select);

                        if !in_scope || tag.kind == StartTag {
                            self.unexpected(&tag);
                        }

                        if in_scope {
                            self.pop_until_named(TagId::Select);
                            self.mode.set(self.reset_insertion_mode());
                        }
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Input | TagId::Keygen | TagId::Textarea) => {
                        self.unexpected(&tag);
                        if self.in_scope_named(select_scope, TagId::Select) {
                            self.pop_until_named(TagId::Select);
                            ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
                        } else {
                            ProcessResult::Done
                        }
                    },

                    (StartTag, TagId::Script | TagId::Template) | (EndTag, TagId::Template) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    _ => self.unexpected(&tag),
                },
            },

            //§ parsing-main-inselectintable
            InsertionMode::InSelectInTable => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (
                        StartTag,
                        TagId::Caption
                        | TagId::Table
                        | TagId::Tbody
                        | TagId::Tfoot
                        | TagId::Thead
                        | TagId::Tr
                        | TagId::Td
                        | TagId::Th,
                    ) => {
                        self.unexpected(&tag);
                        self.pop_until_named(TagId::Select);
                        ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
                    },

                    (
                        EndTag,
                        TagId::Caption
                        | TagId::Table
                        | TagId::Tbody
                        | TagId::Tfoot
                        | TagId::Thead
                        | TagId::Tr
                        | TagId::Td
                        | TagId::Th,
                    ) => {
                        self.unexpected(&tag);
                        if self.in_scope_named(table_scope, tag.id) {
                            self.pop_until_named(TagId::Select);
                            ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
                        } else {
                            ProcessResult::Done
                        }
                    },

                    _ => self.step(InsertionMode::InSelect, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InSelect, token),
            },

            //§ parsing-main-intemplate
            InsertionMode::InTemplate => match token {
                tok @ Token::Characters(..) => self.step(InsertionMode::InBody, tok),
                tok @ Token::Comment(_) => self.step(InsertionMode::InBody, tok),

                Token::Eof => {
                    if !self.in_html_elem_named(TagId::Template) {
                        self.stop_parsing()
                    } else {
                        self.unexpected(&Token::Eof);
                        self.pop_until_named(TagId::Template);
                        self.clear_active_formatting_to_marker();
                        self.template_modes.borrow_mut().pop();
                        self.mode.set(self.reset_insertion_mode());
                        ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Eof)
                    }
                },

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (
                        StartTag,
                        TagId::Base
                        | TagId::Basefont
                        | TagId::Bgsound
                        | TagId::Link
                        | TagId::Meta
                        | TagId::Noframes
                        | TagId::Script
                        | TagId::Style
                        | TagId::Template
                        | TagId::Title,
                    )
                    | (EndTag, TagId::Template) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    (
                        StartTag,
                        TagId::Caption | TagId::Colgroup | TagId::Tbody | TagId::Tfoot
                        | TagId::Thead,
                    ) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InTable);
                        ProcessResult::Reprocess(InsertionMode::InTable, Token::Tag(tag))
                    },

                    (StartTag, TagId::Col) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InColumnGroup);
                        ProcessResult::Reprocess(InsertionMode::InColumnGroup, Token::Tag(tag))
                    },

                    (StartTag, TagId::Tr) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InTableBody);
                        ProcessResult::Reprocess(InsertionMode::InTableBody, Token::Tag(tag))
                    },

                    (StartTag, TagId::Td | TagId::Th) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes.borrow_mut().push(InsertionMode::InRow);
                        ProcessResult::Reprocess(InsertionMode::InRow, Token::Tag(tag))
                    },

                    (StartTag, _) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InBody);
                        ProcessResult::Reprocess(InsertionMode::InBody, Token::Tag(tag))
                    },

                    (EndTag, _) => self.unexpected(&tag),
                },

                token => self.unexpected(&token),
            },

            //§ parsing-main-afterbody
            InsertionMode::AfterBody => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                tok @ Token::Characters(SplitStatus::Whitespace, _) => {
                    self.step(InsertionMode::InBody, tok)
                },
                Token::Comment(text) => self.append_comment_to_html(text),

                Token::Eof => self.stop_parsing(),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (EndTag, TagId::Html) => {
                        if self.is_fragment() {
                            self.unexpected(&tag);
                        } else {
                            self.mode.set(InsertionMode::AfterAfterBody);
                        }
                        ProcessResult::Done
                    },

                    _ => {
                        self.unexpected(&tag);
                        ProcessResult::Reprocess(InsertionMode::InBody, Token::Tag(tag))
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Reprocess(InsertionMode::InBody, token)
                },
            },

            //§ parsing-main-inframeset
            InsertionMode::InFrameset => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Eof => {
                    if self.open_elems.borrow().len() != 1 {
                        self.unexpected(&Token::Eof);
                    }
                    self.stop_parsing()
                },

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, TagId::Frameset) => {
                        self.insert_element_for(tag);
                        ProcessResult::Done
                    },

                    (EndTag, TagId::Frameset) => {
                        if self.open_elems.borrow().len() == 1 {
                            self.unexpected(&tag);
                        } else {
                            self.pop();
                            if !self.is_fragment() && !self.current_node_named(TagId::Frameset) {
                                self.mode.set(InsertionMode::AfterFrameset);
                            }
                        }
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Frame) => {
                        self.insert_and_pop_element_for(tag);
                        ProcessResult::DoneAckSelfClosing
                    },

                    (StartTag, TagId::Noframes) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    _ => self.unexpected(&tag),
                },

                token => self.unexpected(&token),
            },

            //§ parsing-main-afterframeset
            InsertionMode::AfterFrameset => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Eof => self.stop_parsing(),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (EndTag, TagId::Html) => {
                        self.mode.set(InsertionMode::AfterAfterFrameset);
                        ProcessResult::Done
                    },

                    (StartTag, TagId::Noframes) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    _ => self.unexpected(&tag),
                },

                token => self.unexpected(&token),
            },

            //§ the-after-after-body-insertion-mode
            InsertionMode::AfterAfterBody => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                tok @ Token::Characters(SplitStatus::Whitespace, _) => {
                    self.step(InsertionMode::InBody, tok)
                },
                Token::Comment(text) => self.append_comment_to_doc(text),

                Token::Eof => self.stop_parsing(),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    _ => {
                        self.unexpected(&tag);
                        ProcessResult::Reprocess(InsertionMode::InBody, Token::Tag(tag))
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Reprocess(InsertionMode::InBody, token)
                },
            },

            //§ the-after-after-frameset-insertion-mode
            InsertionMode::AfterAfterFrameset => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                tok @ Token::Characters(SplitStatus::Whitespace, _) => {
                    self.step(InsertionMode::InBody, tok)
                },
                Token::Comment(text) => self.append_comment_to_doc(text),

                Token::Eof => self.stop_parsing(),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, TagId::Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, TagId::Noframes) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    _ => self.unexpected(&tag),
                },

                token => self.unexpected(&token),
            },
            //§ END
        }
    }

    fn before_html_anything_else(&self, token: Token) -> ProcessResult<Handle> {
        self.create_root(vec![]);
        ProcessResult::Reprocess(InsertionMode::BeforeHead, token)
    }

    fn before_head_anything_else(&self, token: Token) -> ProcessResult<Handle> {
        *self.head_elem.borrow_mut() = Some(self.insert_phantom(TagId::Head));
        ProcessResult::Reprocess(InsertionMode::InHead, token)
    }

    fn in_head_anything_else(&self, token: Token) -> ProcessResult<Handle> {
        self.pop();
        ProcessResult::Reprocess(InsertionMode::AfterHead, token)
    }

    fn in_head_noscript_anything_else(&self, token: Token) -> ProcessResult<Handle> {
        self.unexpected(&token);
        self.pop();
        ProcessResult::Reprocess(InsertionMode::InHead, token)
    }

    fn after_head_anything_else(&self, token: Token) -> ProcessResult<Handle> {
        self.insert_phantom(TagId::Body);
        ProcessResult::Reprocess(InsertionMode::InBody, token)
    }

    fn in_column_group_anything_else(&self, token: Token) -> ProcessResult<Handle> {
        if self.current_node_named(TagId::Colgroup) {
            self.pop();
            ProcessResult::Reprocess(InsertionMode::InTable, token)
        } else {
            self.unexpected(&token)
        }
    }

    /// The tag rules of the "in body" mode, by far the largest dispatch.
    fn step_in_body_tag(&self, tag: Tag) -> ProcessResult<Handle> {
        match (tag.kind, tag.id) {
            (StartTag, TagId::Html) => {
                self.unexpected(&tag);
                if !self.in_html_elem_named(TagId::Template) {
                    let open_elems = self.open_elems.borrow();
                    let top = html_elem(&open_elems);
                    self.sink.add_attrs_if_missing(top, tag.attrs);
                }
                ProcessResult::Done
            },

            (
                StartTag,
                TagId::Base
                | TagId::Basefont
                | TagId::Bgsound
                | TagId::Link
                | TagId::Meta
                | TagId::Noframes
                | TagId::Script
                | TagId::Style
                | TagId::Template
                | TagId::Title,
            )
            | (EndTag, TagId::Template) => self.step(InsertionMode::InHead, Token::Tag(tag)),

            (StartTag, TagId::Body) => {
                self.unexpected(&tag);
                let body_elem = self.body_elem().as_deref().cloned();
                match body_elem {
                    Some(ref node)
                        if self.open_elems.borrow().len() != 1
                            && !self.in_html_elem_named(TagId::Template) =>
                    {
                        self.frameset_ok.set(false);
                        self.sink.add_attrs_if_missing(node, tag.attrs)
                    },
                    _ => {},
                }
                ProcessResult::Done
            },

            (StartTag, TagId::Frameset) => {
                self.unexpected(&tag);
                if !self.frameset_ok.get() {
                    return ProcessResult::Done;
                }

                let Some(body) = self.body_elem().map(|b| b.clone()) else {
                    return ProcessResult::Done;
                };
                self.sink.remove_from_parent(&body);

                // FIXME: can we get here in the fragment case?
                // What to do with the first element then?
                self.open_elems.borrow_mut().truncate(1);
                self.insert_element_for(tag);
                self.mode.set(InsertionMode::InFrameset);
                ProcessResult::Done
            },

            (EndTag, TagId::Body) => {
                if self.in_scope_named(default_scope, TagId::Body) {
                    self.check_body_end();
                    self.mode.set(InsertionMode::AfterBody);
                } else {
                    self.sink
                        .parse_error(Borrowed("</body> with no <body> in scope"));
                }
                ProcessResult::Done
            },

            (EndTag, TagId::Html) => {
                if self.in_scope_named(default_scope, TagId::Body) {
                    self.check_body_end();
                    ProcessResult::Reprocess(InsertionMode::AfterBody, Token::Tag(tag))
                } else {
                    self.sink
                        .parse_error(Borrowed("</html> with no <body> in scope"));
                    ProcessResult::Done
                }
            },

            (
                StartTag,
                TagId::Address
                | TagId::Article
                | TagId::Aside
                | TagId::Blockquote
                | TagId::Center
                | TagId::Details
                | TagId::Dialog
                | TagId::Dir
                | TagId::Div
                | TagId::Dl
                | TagId::Fieldset
                | TagId::Figcaption
                | TagId::Figure
                | TagId::Footer
                | TagId::Header
                | TagId::Hgroup
                | TagId::Main
                | TagId::Menu
                | TagId::Nav
                | TagId::Ol
                | TagId::P
                | TagId::Search
                | TagId::Section
                | TagId::Summary
                | TagId::Ul,
            ) => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, TagId::H1 | TagId::H2 | TagId::H3 | TagId::H4 | TagId::H5 | TagId::H6) => {
                self.close_p_element_in_button_scope();
                if self.current_node_in(heading_tag) {
                    self.sink.parse_error(Borrowed("nested heading tags"));
                    self.pop();
                }
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, TagId::Pre | TagId::Listing) => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(tag);
                self.ignore_lf.set(true);
                self.frameset_ok.set(false);
                ProcessResult::Done
            },

            (StartTag, TagId::Form) => {
                if self.form_elem.borrow().is_some() && !self.in_html_elem_named(TagId::Template) {
                    self.sink.parse_error(Borrowed("nested forms"));
                } else {
                    self.close_p_element_in_button_scope();
                    let elem = self.insert_element_for(tag);
                    if !self.in_html_elem_named(TagId::Template) {
                        *self.form_elem.borrow_mut() = Some(elem);
                    }
                }
                ProcessResult::Done
            },

            (StartTag, TagId::Li | TagId::Dd | TagId::Dt) => {
                fn close_list(name: &ElemName) -> bool {
                    name.is_html() && name.tag == TagId::Li
                }
                fn close_defn(name: &ElemName) -> bool {
                    name.is_html() && matches!(name.tag, TagId::Dd | TagId::Dt)
                }
                fn extra_special(name: &ElemName) -> bool {
                    special_tag(name)
                        && !(name.is_html()
                            && matches!(name.tag, TagId::Address | TagId::Div | TagId::P))
                }
                let list = tag.id == TagId::Li;

                self.frameset_ok.set(false);

                let mut to_close = None;
                for node in self.open_elems.borrow().iter().rev() {
                    let name = self.sink.elem_name(node);
                    let can_close = if list {
                        close_list(&name)
                    } else {
                        close_defn(&name)
                    };
                    if can_close {
                        to_close = Some(name.tag);
                        break;
                    }
                    if extra_special(&name) {
                        break;
                    }
                }

                if let Some(id) = to_close {
                    self.generate_implied_end_except(id);
                    self.expect_to_close(id);
                }

                self.close_p_element_in_button_scope();
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, TagId::Plaintext) => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(tag);
                ProcessResult::ToPlaintext
            },

            (StartTag, TagId::Button) => {
                if self.in_scope_named(default_scope, TagId::Button) {
                    self.sink.parse_error(Borrowed("nested buttons"));
                    self.generate_implied_end_tags(cursory_implied_end);
                    self.pop_until_named(TagId::Button);
                }
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                self.frameset_ok.set(false);
                ProcessResult::Done
            },

            (
                EndTag,
                TagId::Address
                | TagId::Article
                | TagId::Aside
                | TagId::Blockquote
                | TagId::Button
                | TagId::Center
                | TagId::Details
                | TagId::Dialog
                | TagId::Dir
                | TagId::Div
                | TagId::Dl
                | TagId::Fieldset
                | TagId::Figcaption
                | TagId::Figure
                | TagId::Footer
                | TagId::Header
                | TagId::Hgroup
                | TagId::Listing
                | TagId::Main
                | TagId::Menu
                | TagId::Nav
                | TagId::Ol
                | TagId::Pre
                | TagId::Search
                | TagId::Section
                | TagId::Summary
                | TagId::Ul,
            ) => {
                if !self.in_scope_named(default_scope, tag.id) {
                    self.unexpected(&tag);
                } else {
                    self.generate_implied_end_tags(cursory_implied_end);
                    self.expect_to_close(tag.id);
                }
                ProcessResult::Done
            },

            (EndTag, TagId::Form) => {
                if !self.in_html_elem_named(TagId::Template) {
                    let Some(node) = self.form_elem.take() else {
                        self.sink
                            .parse_error(Borrowed("Null form element pointer on </form>"));
                        return ProcessResult::Done;
                    };
                    if !self.in_scope(default_scope, |n| self.sink.same_node(&node, &n)) {
                        self.sink
                            .parse_error(Borrowed("Form element not in scope on </form>"));
                        return ProcessResult::Done;
                    }
                    self.generate_implied_end_tags(cursory_implied_end);
                    let current = self.current_node().clone();
                    self.remove_from_stack(&node);
                    if !self.sink.same_node(&current, &node) {
                        self.sink
                            .parse_error(Borrowed("Bad open element on </form>"));
                    }
                } else {
                    if !self.in_scope_named(default_scope, TagId::Form) {
                        self.sink
                            .parse_error(Borrowed("Form element not in scope on </form>"));
                        return ProcessResult::Done;
                    }
                    self.generate_implied_end_tags(cursory_implied_end);
                    if !self.current_node_named(TagId::Form) {
                        self.sink
                            .parse_error(Borrowed("Bad open element on </form>"));
                    }
                    self.pop_until_named(TagId::Form);
                }
                ProcessResult::Done
            },

            (EndTag, TagId::P) => {
                if !self.in_scope_named(button_scope, TagId::P) {
                    self.sink.parse_error(Borrowed("No <p> tag to close"));
                    self.insert_phantom(TagId::P);
                }
                self.close_p_element();
                ProcessResult::Done
            },

            (EndTag, TagId::Li | TagId::Dd | TagId::Dt) => {
                let in_scope = if tag.id == TagId::Li {
                    self.in_scope_named(list_item_scope, TagId::Li)
                } else {
                    self.in_scope_named(default_scope, tag.id)
                };
                if in_scope {
                    self.generate_implied_end_except(tag.id);
                    self.expect_to_close(tag.id);
                } else {
                    self.sink.parse_error(Borrowed("No matching tag to close"));
                }
                ProcessResult::Done
            },

            (EndTag, TagId::H1 | TagId::H2 | TagId::H3 | TagId::H4 | TagId::H5 | TagId::H6) => {
                if self.in_scope(default_scope, |n| self.elem_in(&n, heading_tag)) {
                    self.generate_implied_end_tags(cursory_implied_end);
                    if !self.current_node_named(tag.id) {
                        self.sink
                            .parse_error(Borrowed("Closing wrong heading tag"));
                    }
                    self.pop_until(heading_tag);
                } else {
                    self.sink.parse_error(Borrowed("No heading tag to close"));
                }
                ProcessResult::Done
            },

            (StartTag, TagId::A) => {
                self.handle_misnested_a_tags(&tag);
                self.reconstruct_active_formatting_elements();
                self.create_formatting_element_for(tag);
                ProcessResult::Done
            },

            (
                StartTag,
                TagId::B
                | TagId::Big
                | TagId::Code
                | TagId::Em
                | TagId::Font
                | TagId::I
                | TagId::S
                | TagId::Small
                | TagId::Strike
                | TagId::Strong
                | TagId::Tt
                | TagId::U,
            ) => {
                self.reconstruct_active_formatting_elements();
                self.create_formatting_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, TagId::Nobr) => {
                self.reconstruct_active_formatting_elements();
                if self.in_scope_named(default_scope, TagId::Nobr) {
                    self.sink.parse_error(Borrowed("Nested <nobr>"));
                    self.adoption_agency(TagId::Nobr);
                    self.reconstruct_active_formatting_elements();
                }
                self.create_formatting_element_for(tag);
                ProcessResult::Done
            },

            (
                EndTag,
                TagId::A
                | TagId::B
                | TagId::Big
                | TagId::Code
                | TagId::Em
                | TagId::Font
                | TagId::I
                | TagId::Nobr
                | TagId::S
                | TagId::Small
                | TagId::Strike
                | TagId::Strong
                | TagId::Tt
                | TagId::U,
            ) => {
                self.adoption_agency(tag.id);
                ProcessResult::Done
            },

            (StartTag, TagId::Applet | TagId::Marquee | TagId::Object) => {
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                self.active_formatting
                    .borrow_mut()
                    .push(FormatEntry::Marker);
                self.frameset_ok.set(false);
                ProcessResult::Done
            },

            (EndTag, TagId::Applet | TagId::Marquee | TagId::Object) => {
                if !self.in_scope_named(default_scope, tag.id) {
                    self.unexpected(&tag);
                } else {
                    self.generate_implied_end_tags(cursory_implied_end);
                    self.expect_to_close(tag.id);
                    self.clear_active_formatting_to_marker();
                }
                ProcessResult::Done
            },

            (StartTag, TagId::Table) => {
                if self.quirks_mode.get() != Quirks {
                    self.close_p_element_in_button_scope();
                }
                self.insert_element_for(tag);
                self.frameset_ok.set(false);
                self.mode.set(InsertionMode::InTable);
                ProcessResult::Done
            },

            (EndTag, TagId::Br) => {
                self.unexpected(&tag);
                self.step(
                    InsertionMode::InBody,
                    Token::Tag(Tag {
                        kind: StartTag,
                        attrs: vec![],
                        ..tag
                    }),
                )
            },

            (
                StartTag,
                TagId::Area
                | TagId::Br
                | TagId::Embed
                | TagId::Img
                | TagId::Keygen
                | TagId::Wbr
                | TagId::Input,
            ) => {
                let keep_frameset_ok = match tag.id {
                    TagId::Input => self.is_type_hidden(&tag),
                    _ => false,
                };
                self.reconstruct_active_formatting_elements();
                self.insert_and_pop_element_for(tag);
                if !keep_frameset_ok {
                    self.frameset_ok.set(false);
                }
                ProcessResult::DoneAckSelfClosing
            },

            (StartTag, TagId::Param | TagId::Source | TagId::Track) => {
                self.insert_and_pop_element_for(tag);
                ProcessResult::DoneAckSelfClosing
            },

            (StartTag, TagId::Hr) => {
                self.close_p_element_in_button_scope();
                self.insert_and_pop_element_for(tag);
                self.frameset_ok.set(false);
                ProcessResult::DoneAckSelfClosing
            },

            (StartTag, TagId::Image) => {
                self.unexpected(&tag);
                self.step(
                    InsertionMode::InBody,
                    Token::Tag(Tag {
                        id: TagId::Img,
                        name: StrTendril::from_slice("img"),
                        ..tag
                    }),
                )
            },

            (StartTag, TagId::Textarea) => {
                self.ignore_lf.set(true);
                self.frameset_ok.set(false);
                self.parse_raw_data(tag, Rcdata)
            },

            (StartTag, TagId::Xmp) => {
                self.close_p_element_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok.set(false);
                self.parse_raw_data(tag, Rawtext)
            },

            (StartTag, TagId::Iframe) => {
                self.frameset_ok.set(false);
                self.parse_raw_data(tag, Rawtext)
            },

            (StartTag, TagId::Noembed) => self.parse_raw_data(tag, Rawtext),

            (StartTag, TagId::Noscript) => {
                if self.opts.scripting_enabled {
                    self.parse_raw_data(tag, Rawtext)
                } else {
                    self.reconstruct_active_formatting_elements();
                    self.insert_element_for(tag);
                    ProcessResult::Done
                }
            },

            (StartTag, TagId::Select) => {
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                self.frameset_ok.set(false);
                // NB: mode == InBody but possibly self.mode != mode, if
                // we're processing "as in the rules for InBody".
                self.mode.set(match self.mode.get() {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                });
                ProcessResult::Done
            },

            (StartTag, TagId::Optgroup | TagId::Option) => {
                if self.current_node_named(TagId::Option) {
                    self.pop();
                }
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, TagId::Rb | TagId::Rtc) => {
                if self.in_scope_named(default_scope, TagId::Ruby) {
                    self.generate_implied_end_tags(cursory_implied_end);
                }
                if !self.current_node_named(TagId::Ruby) {
                    self.unexpected(&tag);
                }
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, TagId::Rp | TagId::Rt) => {
                if self.in_scope_named(default_scope, TagId::Ruby) {
                    self.generate_implied_end_except(TagId::Rtc);
                }
                if !self.current_node_named(TagId::Rtc) && !self.current_node_named(TagId::Ruby) {
                    self.unexpected(&tag);
                }
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, TagId::Math) => self.enter_foreign(tag, Namespace::MathMl),

            (StartTag, TagId::Svg) => self.enter_foreign(tag, Namespace::Svg),

            (
                StartTag,
                TagId::Caption
                | TagId::Col
                | TagId::Colgroup
                | TagId::Frame
                | TagId::Head
                | TagId::Tbody
                | TagId::Td
                | TagId::Tfoot
                | TagId::Th
                | TagId::Thead
                | TagId::Tr,
            ) => {
                self.unexpected(&tag);
                ProcessResult::Done
            },

            (StartTag, _) => {
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (EndTag, _) => {
                self.process_end_tag_in_body(tag);
                ProcessResult::Done
            },
        }
    }

    //§ parsing-main-inforeign
    pub(crate) fn step_foreign(&self, token: Token) -> ProcessResult<Handle> {
        match token {
            Token::NullCharacter => {
                self.unexpected(&token);
                self.append_text(StrTendril::from_slice("\u{fffd}"))
            },

            Token::Characters(_, text) => {
                if any_not_whitespace(&text) {
                    self.frameset_ok.set(false);
                }
                self.append_text(text)
            },

            Token::Comment(text) => self.append_comment(text),

            Token::Tag(tag) => match (tag.kind, tag.id) {
                (
                    StartTag,
                    TagId::B
                    | TagId::Big
                    | TagId::Blockquote
                    | TagId::Body
                    | TagId::Br
                    | TagId::Center
                    | TagId::Code
                    | TagId::Dd
                    | TagId::Div
                    | TagId::Dl
                    | TagId::Dt
                    | TagId::Em
                    | TagId::Embed
                    | TagId::H1
                    | TagId::H2
                    | TagId::H3
                    | TagId::H4
                    | TagId::H5
                    | TagId::H6
                    | TagId::Head
                    | TagId::Hr
                    | TagId::I
                    | TagId::Img
                    | TagId::Li
                    | TagId::Listing
                    | TagId::Menu
                    | TagId::Meta
                    | TagId::Nobr
                    | TagId::Ol
                    | TagId::P
                    | TagId::Pre
                    | TagId::Ruby
                    | TagId::S
                    | TagId::Small
                    | TagId::Span
                    | TagId::Strong
                    | TagId::Strike
                    | TagId::Sub
                    | TagId::Sup
                    | TagId::Table
                    | TagId::Tt
                    | TagId::U
                    | TagId::Ul
                    | TagId::Var,
                )
                | (EndTag, TagId::Br | TagId::P) => {
                    self.unexpected_start_tag_in_foreign_content(tag)
                },

                (StartTag, TagId::Font) => {
                    let unexpected = tag.attrs.iter().any(|attr| {
                        attr.name.prefix.is_none()
                            && matches!(&*attr.name.local, "color" | "face" | "size")
                    });
                    if unexpected {
                        self.unexpected_start_tag_in_foreign_content(tag)
                    } else {
                        self.foreign_start_tag(tag)
                    }
                },

                (StartTag, _) => self.foreign_start_tag(tag),

                (EndTag, _) => {
                    let mut first = true;
                    let mut stack_idx = self.open_elems.borrow().len() - 1;
                    loop {
                        if stack_idx == 0 {
                            return ProcessResult::Done;
                        }

                        let html;
                        let eq;
                        {
                            let open_elems = self.open_elems.borrow();
                            let node_name = self.sink.elem_name(&open_elems[stack_idx]);
                            html = node_name.is_html();
                            eq = node_name.local.eq_ignore_ascii_case(&tag.name);
                        }
                        if !first && html {
                            let mode = self.mode.get();
                            return self.step(mode, Token::Tag(tag));
                        }

                        if eq {
                            self.open_elems.borrow_mut().truncate(stack_idx);
                            return ProcessResult::Done;
                        }

                        if first {
                            self.unexpected(&tag);
                            first = false;
                        }
                        stack_idx -= 1;
                    }
                },
            },

            Token::Eof => panic!("impossible case in foreign content"),
        }
    }
    //§ END
}
