// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! High-level interface to the parser: glue between the tokenizer and the
//! tree builder.

use crate::interface::{Attribute, ElemName, TreeSink};
use crate::tokenizer::{Tokenizer, TokenizerOpts, TokenizerResult};
use crate::tree_builder::{TreeBuilder, TreeBuilderOpts};
use crate::util::buffer_queue::BufferQueue;

use tendril::StrTendril;

/// All-encompassing options struct for the parser.
#[derive(Clone, Default)]
pub struct ParseOpts {
    /// Tokenizer options.
    pub tokenizer: TokenizerOpts,

    /// Tree builder options.
    pub tree_builder: TreeBuilderOpts,
}

/// Parse an HVML/HTML document.
///
/// The returned `Parser` accepts input chunks through `feed`, in any
/// granularity; `finish` runs end-of-file handling and hands back the
/// sink's output.
pub fn parse_document<Sink: TreeSink>(sink: Sink, opts: ParseOpts) -> Parser<Sink> {
    let tb = TreeBuilder::new(sink, opts.tree_builder);
    let tok = Tokenizer::new(tb, opts.tokenizer);
    Parser {
        tokenizer: tok,
        input_buffer: BufferQueue::default(),
    }
}

/// Parse a fragment: the input is treated as the children of a context
/// element with the given name.
pub fn parse_fragment<Sink: TreeSink>(
    sink: Sink,
    opts: ParseOpts,
    context_name: ElemName,
    context_attrs: Vec<Attribute>,
) -> Parser<Sink> {
    let context_elem = sink.create_element(context_name, context_attrs);
    parse_fragment_for_element(sink, opts, context_elem, None)
}

/// Like `parse_fragment`, but with an existing context element and
/// optionally a form element to associate reparented form controls with.
pub fn parse_fragment_for_element<Sink: TreeSink>(
    sink: Sink,
    opts: ParseOpts,
    context_element: Sink::Handle,
    form_element: Option<Sink::Handle>,
) -> Parser<Sink> {
    let tb = TreeBuilder::new_for_fragment(sink, context_element, form_element, opts.tree_builder);
    let tok_opts = TokenizerOpts {
        initial_state: Some(tb.tokenizer_state_for_context_elem()),
        ..opts.tokenizer
    };
    let tok = Tokenizer::new(tb, tok_opts);
    Parser {
        tokenizer: tok,
        input_buffer: BufferQueue::default(),
    }
}

/// An HVML/HTML parser, ready to receive input.
pub struct Parser<Sink: TreeSink> {
    pub tokenizer: Tokenizer<TreeBuilder<Sink::Handle, Sink>>,
    pub input_buffer: BufferQueue,
}

impl<Sink: TreeSink> Parser<Sink> {
    /// Feed a chunk of input.
    ///
    /// Raw spans handed out by the tokenizer reference these chunks; they
    /// are released once the last token referencing them has been
    /// processed.
    pub fn feed(&self, input: StrTendril) {
        self.input_buffer.push_back(input);
        // Since scripting is not supported, a finished `<script>` element
        // has no side effects; resume tokenizing immediately.
        while let TokenizerResult::Script(_) = self.tokenizer.feed(&self.input_buffer) {}
    }

    /// Signal the end of input and extract the output from the sink.
    pub fn finish(self) -> Sink::Output {
        while let TokenizerResult::Script(_) = self.tokenizer.feed(&self.input_buffer) {}
        assert!(self.input_buffer.is_empty());
        self.tokenizer.end();
        self.tokenizer.sink.sink.finish()
    }
}

/// Parse a complete document from a single string.
pub fn parse_document_str<Sink: TreeSink>(sink: Sink, opts: ParseOpts, input: &str) -> Sink::Output {
    let parser = parse_document(sink, opts);
    parser.feed(StrTendril::from_slice(input));
    parser.finish()
}
