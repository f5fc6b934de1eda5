// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tag catalog: a fixed enumeration over every tag the tree builder
//! dispatches on, covering HTML5 plus the HVML additions, with a
//! perfect-hash lookup from tag name and a per-tag category mask.
//!
//! Names not in the catalog map to [`TagId::Undef`]; such tags keep their
//! name on the token and are treated as ordinary elements. The remaining
//! sentinels reserve identifier space for non-element token kinds and for
//! foreign (non-HTML-namespace) element names.

/// A tag identifier.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Debug)]
pub enum TagId {
    /// A name with no catalog entry.
    Undef,
    Text,
    Comment,
    Doctype,
    /// An element identified by its local name in a non-HTML namespace.
    Foreign,
    EndOfFile,
    A, Abbr, Address, Applet, Archedata, Archetype, Area, Article, Aside,
    Audio, B, Back, Base, Basefont, Bdi, Bdo, Bgsound, Big, Blockquote,
    Body, Br, Button, Call, Canvas, Caption, Catch, Center, Cite, Close,
    Code, Col, Colgroup, Data, Datalist, Dd, Define, Del, Details, Dfn,
    Dialog, Dir, Div, Dl, Dt, Em, Embed, Empty, Error, Except, Fieldset,
    Figcaption, Figure, Font, Footer, Form, Frame, Frameset, H1, H2, H3,
    H4, H5, H6, Head, Header, Hgroup, Hr, Html, Hvml, I, Iframe, Image,
    Img, Include, Init, Input, Ins, Iterate, Kbd, Keygen, Label, Legend,
    Li, Link, Listen, Listing, Load, Main, Map, Mark, Marquee, Match, Math,
    Menu, Menuitem, Meta, Meter, Nav, Nobr, Noembed, Noframes, Noscript,
    Object, Observe, Ol, Optgroup, Option, Output, P, Param, Picture,
    Plaintext, Pre, Progress, Q, Rawtext, Rb, Reduce, Remove, Request,
    Return, Rp, Rt, Rtc, Ruby, S, Samp, Script, Search, Section, Select,
    Set, Slot, Small, Source, Span, Strike, Strong, Style, Sub, Summary,
    Sup, Svg, Table, Tbody, Td, Template, Test, Textarea, Tfoot, Th, Thead,
    Time, Title, Tr, Track, Tt, U, Ul, Update, Var, Video, Wbr, Xmp,
}

/// Category masks attached to each tag id. The scope bits say which scope
/// walks an element terminates; `SCOPE` covers default scope and therefore
/// also list-item and button scope, which are supersets.
pub mod category {
    pub const ORDINARY: u32 = 0;
    pub const SPECIAL: u32 = 1 << 0;
    pub const FORMATTING: u32 = 1 << 1;
    pub const SCOPE: u32 = 1 << 2;
    pub const SCOPE_LIST_ITEM: u32 = 1 << 3;
    pub const SCOPE_BUTTON: u32 = 1 << 4;
    pub const SCOPE_TABLE: u32 = 1 << 5;
    /// Inverted sense: carried by the elements that do *not* terminate
    /// select scope.
    pub const SCOPE_SELECT: u32 = 1 << 6;
}

static BY_NAME: phf::Map<&'static str, TagId> = phf::phf_map! {
    "a" => TagId::A,
    "abbr" => TagId::Abbr,
    "address" => TagId::Address,
    "applet" => TagId::Applet,
    "archedata" => TagId::Archedata,
    "archetype" => TagId::Archetype,
    "area" => TagId::Area,
    "article" => TagId::Article,
    "aside" => TagId::Aside,
    "audio" => TagId::Audio,
    "b" => TagId::B,
    "back" => TagId::Back,
    "base" => TagId::Base,
    "basefont" => TagId::Basefont,
    "bdi" => TagId::Bdi,
    "bdo" => TagId::Bdo,
    "bgsound" => TagId::Bgsound,
    "big" => TagId::Big,
    "blockquote" => TagId::Blockquote,
    "body" => TagId::Body,
    "br" => TagId::Br,
    "button" => TagId::Button,
    "call" => TagId::Call,
    "canvas" => TagId::Canvas,
    "caption" => TagId::Caption,
    "catch" => TagId::Catch,
    "center" => TagId::Center,
    "cite" => TagId::Cite,
    "close" => TagId::Close,
    "code" => TagId::Code,
    "col" => TagId::Col,
    "colgroup" => TagId::Colgroup,
    "data" => TagId::Data,
    "datalist" => TagId::Datalist,
    "dd" => TagId::Dd,
    "define" => TagId::Define,
    "del" => TagId::Del,
    "details" => TagId::Details,
    "dfn" => TagId::Dfn,
    "dialog" => TagId::Dialog,
    "dir" => TagId::Dir,
    "div" => TagId::Div,
    "dl" => TagId::Dl,
    "dt" => TagId::Dt,
    "em" => TagId::Em,
    "embed" => TagId::Embed,
    "empty" => TagId::Empty,
    "error" => TagId::Error,
    "except" => TagId::Except,
    "fieldset" => TagId::Fieldset,
    "figcaption" => TagId::Figcaption,
    "figure" => TagId::Figure,
    "font" => TagId::Font,
    "footer" => TagId::Footer,
    "form" => TagId::Form,
    "frame" => TagId::Frame,
    "frameset" => TagId::Frameset,
    "h1" => TagId::H1,
    "h2" => TagId::H2,
    "h3" => TagId::H3,
    "h4" => TagId::H4,
    "h5" => TagId::H5,
    "h6" => TagId::H6,
    "head" => TagId::Head,
    "header" => TagId::Header,
    "hgroup" => TagId::Hgroup,
    "hr" => TagId::Hr,
    "html" => TagId::Html,
    "hvml" => TagId::Hvml,
    "i" => TagId::I,
    "iframe" => TagId::Iframe,
    "image" => TagId::Image,
    "img" => TagId::Img,
    "include" => TagId::Include,
    "init" => TagId::Init,
    "input" => TagId::Input,
    "ins" => TagId::Ins,
    "iterate" => TagId::Iterate,
    "kbd" => TagId::Kbd,
    "keygen" => TagId::Keygen,
    "label" => TagId::Label,
    "legend" => TagId::Legend,
    "li" => TagId::Li,
    "link" => TagId::Link,
    "listen" => TagId::Listen,
    "listing" => TagId::Listing,
    "load" => TagId::Load,
    "main" => TagId::Main,
    "map" => TagId::Map,
    "mark" => TagId::Mark,
    "marquee" => TagId::Marquee,
    "match" => TagId::Match,
    "math" => TagId::Math,
    "menu" => TagId::Menu,
    "menuitem" => TagId::Menuitem,
    "meta" => TagId::Meta,
    "meter" => TagId::Meter,
    "nav" => TagId::Nav,
    "nobr" => TagId::Nobr,
    "noembed" => TagId::Noembed,
    "noframes" => TagId::Noframes,
    "noscript" => TagId::Noscript,
    "object" => TagId::Object,
    "observe" => TagId::Observe,
    "ol" => TagId::Ol,
    "optgroup" => TagId::Optgroup,
    "option" => TagId::Option,
    "output" => TagId::Output,
    "p" => TagId::P,
    "param" => TagId::Param,
    "picture" => TagId::Picture,
    "plaintext" => TagId::Plaintext,
    "pre" => TagId::Pre,
    "progress" => TagId::Progress,
    "q" => TagId::Q,
    "rawtext" => TagId::Rawtext,
    "rb" => TagId::Rb,
    "reduce" => TagId::Reduce,
    "remove" => TagId::Remove,
    "request" => TagId::Request,
    "return" => TagId::Return,
    "rp" => TagId::Rp,
    "rt" => TagId::Rt,
    "rtc" => TagId::Rtc,
    "ruby" => TagId::Ruby,
    "s" => TagId::S,
    "samp" => TagId::Samp,
    "script" => TagId::Script,
    "search" => TagId::Search,
    "section" => TagId::Section,
    "select" => TagId::Select,
    "set" => TagId::Set,
    "slot" => TagId::Slot,
    "small" => TagId::Small,
    "source" => TagId::Source,
    "span" => TagId::Span,
    "strike" => TagId::Strike,
    "strong" => TagId::Strong,
    "style" => TagId::Style,
    "sub" => TagId::Sub,
    "summary" => TagId::Summary,
    "sup" => TagId::Sup,
    "svg" => TagId::Svg,
    "table" => TagId::Table,
    "tbody" => TagId::Tbody,
    "td" => TagId::Td,
    "template" => TagId::Template,
    "test" => TagId::Test,
    "textarea" => TagId::Textarea,
    "tfoot" => TagId::Tfoot,
    "th" => TagId::Th,
    "thead" => TagId::Thead,
    "time" => TagId::Time,
    "title" => TagId::Title,
    "tr" => TagId::Tr,
    "track" => TagId::Track,
    "tt" => TagId::Tt,
    "u" => TagId::U,
    "ul" => TagId::Ul,
    "update" => TagId::Update,
    "var" => TagId::Var,
    "video" => TagId::Video,
    "wbr" => TagId::Wbr,
    "xmp" => TagId::Xmp,
};

impl TagId {
    /// Perfect-hash catalog lookup. The tokenizer lowercases tag names
    /// while accumulating them, so `name` is already ASCII-lowercase.
    pub fn lookup(name: &str) -> TagId {
        BY_NAME.get(name).copied().unwrap_or(TagId::Undef)
    }

    /// The canonical (lowercase) name of this tag.
    pub fn local_name(self) -> &'static str {
        match self {
            TagId::Undef => "-undef",
            TagId::Text => "-text",
            TagId::Comment => "-comment",
            TagId::Doctype => "-doctype",
            TagId::Foreign => "-foreign",
            TagId::EndOfFile => "-end-of-file",
            TagId::A => "a",
            TagId::Abbr => "abbr",
            TagId::Address => "address",
            TagId::Applet => "applet",
            TagId::Archedata => "archedata",
            TagId::Archetype => "archetype",
            TagId::Area => "area",
            TagId::Article => "article",
            TagId::Aside => "aside",
            TagId::Audio => "audio",
            TagId::B => "b",
            TagId::Back => "back",
            TagId::Base => "base",
            TagId::Basefont => "basefont",
            TagId::Bdi => "bdi",
            TagId::Bdo => "bdo",
            TagId::Bgsound => "bgsound",
            TagId::Big => "big",
            TagId::Blockquote => "blockquote",
            TagId::Body => "body",
            TagId::Br => "br",
            TagId::Button => "button",
            TagId::Call => "call",
            TagId::Canvas => "canvas",
            TagId::Caption => "caption",
            TagId::Catch => "catch",
            TagId::Center => "center",
            TagId::Cite => "cite",
            TagId::Close => "close",
            TagId::Code => "code",
            TagId::Col => "col",
            TagId::Colgroup => "colgroup",
            TagId::Data => "data",
            TagId::Datalist => "datalist",
            TagId::Dd => "dd",
            TagId::Define => "define",
            TagId::Del => "del",
            TagId::Details => "details",
            TagId::Dfn => "dfn",
            TagId::Dialog => "dialog",
            TagId::Dir => "dir",
            TagId::Div => "div",
            TagId::Dl => "dl",
            TagId::Dt => "dt",
            TagId::Em => "em",
            TagId::Embed => "embed",
            TagId::Empty => "empty",
            TagId::Error => "error",
            TagId::Except => "except",
            TagId::Fieldset => "fieldset",
            TagId::Figcaption => "figcaption",
            TagId::Figure => "figure",
            TagId::Font => "font",
            TagId::Footer => "footer",
            TagId::Form => "form",
            TagId::Frame => "frame",
            TagId::Frameset => "frameset",
            TagId::H1 => "h1",
            TagId::H2 => "h2",
            TagId::H3 => "h3",
            TagId::H4 => "h4",
            TagId::H5 => "h5",
            TagId::H6 => "h6",
            TagId::Head => "head",
            TagId::Header => "header",
            TagId::Hgroup => "hgroup",
            TagId::Hr => "hr",
            TagId::Html => "html",
            TagId::Hvml => "hvml",
            TagId::I => "i",
            TagId::Iframe => "iframe",
            TagId::Image => "image",
            TagId::Img => "img",
            TagId::Include => "include",
            TagId::Init => "init",
            TagId::Input => "input",
            TagId::Ins => "ins",
            TagId::Iterate => "iterate",
            TagId::Kbd => "kbd",
            TagId::Keygen => "keygen",
            TagId::Label => "label",
            TagId::Legend => "legend",
            TagId::Li => "li",
            TagId::Link => "link",
            TagId::Listen => "listen",
            TagId::Listing => "listing",
            TagId::Load => "load",
            TagId::Main => "main",
            TagId::Map => "map",
            TagId::Mark => "mark",
            TagId::Marquee => "marquee",
            TagId::Match => "match",
            TagId::Math => "math",
            TagId::Menu => "menu",
            TagId::Menuitem => "menuitem",
            TagId::Meta => "meta",
            TagId::Meter => "meter",
            TagId::Nav => "nav",
            TagId::Nobr => "nobr",
            TagId::Noembed => "noembed",
            TagId::Noframes => "noframes",
            TagId::Noscript => "noscript",
            TagId::Object => "object",
            TagId::Observe => "observe",
            TagId::Ol => "ol",
            TagId::Optgroup => "optgroup",
            TagId::Option => "option",
            TagId::Output => "output",
            TagId::P => "p",
            TagId::Param => "param",
            TagId::Picture => "picture",
            TagId::Plaintext => "plaintext",
            TagId::Pre => "pre",
            TagId::Progress => "progress",
            TagId::Q => "q",
            TagId::Rawtext => "rawtext",
            TagId::Rb => "rb",
            TagId::Reduce => "reduce",
            TagId::Remove => "remove",
            TagId::Request => "request",
            TagId::Return => "return",
            TagId::Rp => "rp",
            TagId::Rt => "rt",
            TagId::Rtc => "rtc",
            TagId::Ruby => "ruby",
            TagId::S => "s",
            TagId::Samp => "samp",
            TagId::Script => "script",
            TagId::Search => "search",
            TagId::Section => "section",
            TagId::Select => "select",
            TagId::Set => "set",
            TagId::Slot => "slot",
            TagId::Small => "small",
            TagId::Source => "source",
            TagId::Span => "span",
            TagId::Strike => "strike",
            TagId::Strong => "strong",
            TagId::Style => "style",
            TagId::Sub => "sub",
            TagId::Summary => "summary",
            TagId::Sup => "sup",
            TagId::Svg => "svg",
            TagId::Table => "table",
            TagId::Tbody => "tbody",
            TagId::Td => "td",
            TagId::Template => "template",
            TagId::Test => "test",
            TagId::Textarea => "textarea",
            TagId::Tfoot => "tfoot",
            TagId::Th => "th",
            TagId::Thead => "thead",
            TagId::Time => "time",
            TagId::Title => "title",
            TagId::Tr => "tr",
            TagId::Track => "track",
            TagId::Tt => "tt",
            TagId::U => "u",
            TagId::Ul => "ul",
            TagId::Update => "update",
            TagId::Var => "var",
            TagId::Video => "video",
            TagId::Wbr => "wbr",
            TagId::Xmp => "xmp",
        }
    }

    /// The category mask for this tag, as an HTML-namespace element.
    pub fn category(self) -> u32 {
        use self::category::*;
        use self::TagId::*;
        match self {
            A | B | Big | Code | Em | Font | I | Nobr | S | Small | Strike | Strong | Tt | U => FORMATTING,
            Optgroup | Option => SCOPE_SELECT,
            Address | Archedata | Area | Article | Aside | Base | Basefont | Bgsound |
            Blockquote | Body | Br | Center | Col | Colgroup | Dd | Details | Dir | Div | Dl |
            Dt | Embed | Error | Except | Fieldset | Figcaption | Figure | Footer | Form |
            Frame | Frameset | H1 | H2 | H3 | H4 | H5 | H6 | Head | Header | Hgroup | Hr |
            Hvml | Iframe | Img | Include | Init | Input | Keygen | Li | Link | Listing |
            Main | Menu | Meta | Nav | Noembed | Noframes | Noscript | P | Param | Plaintext |
            Pre | Rawtext | Script | Search | Section | Select | Source | Style | Summary |
            Tbody | Textarea | Tfoot | Thead | Title | Tr | Track | Wbr | Xmp => SPECIAL,
            Applet | Archetype | Caption | Marquee | Object | Td | Th => SPECIAL | SCOPE,
            Html | Table | Template => SPECIAL | SCOPE | SCOPE_TABLE,
            Button => SPECIAL | SCOPE_BUTTON,
            Ol | Ul => SPECIAL | SCOPE_LIST_ITEM,
            _ => ORDINARY,
        }
    }
}

#[cfg(test)]
mod test {
    use super::category::*;
    use super::TagId;

    #[test]
    fn lookup_round_trips() {
        for name in ["a", "blockquote", "table", "hvml", "archetype", "update"] {
            let id = TagId::lookup(name);
            assert_ne!(id, TagId::Undef, "{name} missing from catalog");
            assert_eq!(id.local_name(), name);
        }
    }

    #[test]
    fn unknown_names_are_undef() {
        assert_eq!(TagId::lookup("bogotag"), TagId::Undef);
        assert_eq!(TagId::lookup(""), TagId::Undef);
        // Foreign element names are not catalog entries.
        assert_eq!(TagId::lookup("foreignobject"), TagId::Undef);
    }

    #[test]
    fn category_masks() {
        assert_eq!(TagId::Div.category(), SPECIAL);
        assert_eq!(TagId::B.category(), FORMATTING);
        assert_eq!(TagId::Table.category(), SPECIAL | SCOPE | SCOPE_TABLE);
        assert_eq!(TagId::Button.category(), SPECIAL | SCOPE_BUTTON);
        assert_eq!(TagId::Archetype.category(), SPECIAL | SCOPE);
        assert_eq!(TagId::Span.category(), ORDINARY);
        assert_eq!(TagId::Option.category(), SCOPE_SELECT);
    }
}
