// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![crate_name = "hvml5ever"]
#![cfg_attr(test, deny(warnings))]
#![allow(unused_parens)]

pub use crate::driver::{parse_document, parse_fragment, ParseOpts, Parser};
pub use crate::interface::{Attribute, AttrName, ElemName, Namespace, Prefix};
pub use crate::interface::{LimitedQuirks, NoQuirks, Quirks, QuirksMode};
pub use crate::tag::TagId;
pub use crate::util::buffer_queue::BufferQueue;
pub use crate::util::smallcharset::SmallCharSet;

pub use crate::serialize::serialize;

mod macros;

mod data;

pub mod util {
    pub mod buffer_queue;
    pub mod smallcharset;
    pub mod str;
}

pub mod driver;
pub mod interface;
pub mod rcdom;
pub mod serialize;
pub mod tag;
pub mod tokenizer;
pub mod tree_builder;

/// Re-export the tendril crate.
pub use tendril;
