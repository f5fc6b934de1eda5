// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! DOCTYPE analysis: the legacy public/system identifier tables that
//! select quirks, limited-quirks or no-quirks mode.

use crate::interface::QuirksMode::{self, LimitedQuirks, NoQuirks, Quirks};
use crate::tokenizer::Doctype;
use tendril::StrTendril;

// These lists are from the HTML5 spec §13.2.6.4.1, "the initial insertion
// mode".  All comparisons are ASCII case-insensitive, so the entries are
// stored lowercased.

static QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

static QUIRKY_PUBLIC_MATCHES: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

static QUIRKY_SYSTEM_MATCHES: &[&str] =
    &["http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"];

static LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

// Quirky with no system id, limited-quirky with one.
static HTML4_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

pub(crate) fn doctype_error_and_quirks(
    doctype: &Doctype,
    iframe_srcdoc: bool,
) -> (bool, QuirksMode) {
    fn opt_as_slice(x: &Option<StrTendril>) -> Option<&str> {
        x.as_ref().map(|t| &t[..])
    }

    fn opt_to_ascii_lowercase(x: Option<&str>) -> Option<String> {
        x.map(|y| y.to_ascii_lowercase())
    }

    let name = opt_as_slice(&doctype.name);
    let public = opt_as_slice(&doctype.public_id);
    let system = opt_as_slice(&doctype.system_id);

    let err = match (name, public, system) {
        (Some("html"), None, None) | (Some("html"), None, Some("about:legacy-compat")) => false,
        _ => true,
    };

    let public = opt_to_ascii_lowercase(public);
    let system = opt_to_ascii_lowercase(system);

    fn contains_pfx(haystack: &[&str], needle: &str) -> bool {
        haystack.iter().any(|&x| needle.starts_with(x))
    }

    let quirk = match (public.as_deref(), system.as_deref()) {
        _ if doctype.force_quirks => Quirks,
        _ if name != Some("html") => Quirks,

        _ if iframe_srcdoc => NoQuirks,

        (Some(p), _) if QUIRKY_PUBLIC_MATCHES.contains(&p) => Quirks,
        (_, Some(s)) if QUIRKY_SYSTEM_MATCHES.contains(&s) => Quirks,

        (Some(p), _) if contains_pfx(QUIRKY_PUBLIC_PREFIXES, p) => Quirks,

        (Some(p), None) if contains_pfx(HTML4_PUBLIC_PREFIXES, p) => Quirks,
        (Some(p), Some(_)) if contains_pfx(HTML4_PUBLIC_PREFIXES, p) => LimitedQuirks,

        (Some(p), _) if contains_pfx(LIMITED_QUIRKY_PUBLIC_PREFIXES, p) => LimitedQuirks,

        _ => NoQuirks,
    };

    (err, quirk)
}

#[cfg(test)]
mod test {
    use super::doctype_error_and_quirks;
    use crate::interface::QuirksMode::{LimitedQuirks, NoQuirks, Quirks};
    use crate::tokenizer::Doctype;
    use tendril::StrTendril;

    fn doctype(name: &str, public: Option<&str>, system: Option<&str>) -> Doctype {
        Doctype {
            name: Some(StrTendril::from_slice(name)),
            public_id: public.map(StrTendril::from_slice),
            system_id: system.map(StrTendril::from_slice),
            force_quirks: false,
        }
    }

    #[test]
    fn modern_doctype_is_fine() {
        let (err, quirk) = doctype_error_and_quirks(&doctype("html", None, None), false);
        assert!(!err);
        assert_eq!(quirk, NoQuirks);
    }

    #[test]
    fn html_4_01_strict_is_not_quirky() {
        let dt = doctype("html", Some("-//W3C//DTD HTML 4.01//EN"), None);
        let (err, quirk) = doctype_error_and_quirks(&dt, false);
        assert!(err);
        assert_eq!(quirk, NoQuirks);
    }

    #[test]
    fn html_4_01_frameset_depends_on_system_id() {
        let dt = doctype("html", Some("-//W3C//DTD HTML 4.01 Frameset//EN"), None);
        assert_eq!(doctype_error_and_quirks(&dt, false).1, Quirks);

        let dt = doctype(
            "html",
            Some("-//W3C//DTD HTML 4.01 Frameset//EN"),
            Some("http://www.w3.org/TR/html4/frameset.dtd"),
        );
        assert_eq!(doctype_error_and_quirks(&dt, false).1, LimitedQuirks);
    }

    #[test]
    fn prefix_matching_is_case_insensitive() {
        let dt = doctype("html", Some("-//IETF//DTD HTML 2.0//EN"), None);
        assert_eq!(doctype_error_and_quirks(&dt, false).1, Quirks);
    }

    #[test]
    fn missing_name_is_quirky() {
        let dt = Doctype::default();
        assert_eq!(doctype_error_and_quirks(&dt, false).1, Quirks);
    }
}
