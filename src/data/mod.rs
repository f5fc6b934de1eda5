// Copyright The hvml5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Data tables consumed by the character-reference decoder.

mod entities;

use self::entities::NAMED_ENTITIES;

/// The spec replaces most characters in the ISO-2022 C1 control code range
/// (U+0080 through U+009F) with these characters.
pub(crate) static C1_REPLACEMENTS: [Option<char>; 32] = [
    Some('\u{20ac}'),
    None,
    Some('\u{201a}'),
    Some('\u{0192}'),
    Some('\u{201e}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02c6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017d}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201c}'),
    Some('\u{201d}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02dc}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203a}'),
    Some('\u{0153}'),
    None,
    Some('\u{017e}'),
    Some('\u{0178}'),
];

/// Look up a complete named character reference. `name` does not include
/// the `&`; names ending in `;` are distinct entries from the legacy
/// semicolon-less forms.
pub(crate) fn named_entity(name: &str) -> Option<[u32; 2]> {
    NAMED_ENTITIES
        .binary_search_by_key(&name, |&(n, _)| n)
        .ok()
        .map(|i| NAMED_ENTITIES[i].1)
}

/// Is `name` a proper prefix of at least one named character reference?
///
/// Entries sharing a prefix are contiguous in the sorted table, and every
/// proper extension of `name` sorts immediately after `name` itself, so it
/// suffices to look at the first entry greater than `name`.
pub(crate) fn named_entity_prefix(name: &str) -> bool {
    let i = NAMED_ENTITIES.partition_point(|&(n, _)| n <= name);
    i < NAMED_ENTITIES.len() && NAMED_ENTITIES[i].0.starts_with(name)
}

#[cfg(test)]
mod test {
    use super::entities::NAMED_ENTITIES;
    use super::{named_entity, named_entity_prefix};

    #[test]
    fn table_is_sorted() {
        assert!(NAMED_ENTITIES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn exact_lookups() {
        assert_eq!(named_entity("amp;"), Some([0x26, 0]));
        assert_eq!(named_entity("amp"), Some([0x26, 0]));
        assert_eq!(named_entity("notin;"), Some([0x2209, 0]));
        // Two-character expansion.
        assert_eq!(named_entity("NotEqualTilde;"), Some([0x2242, 0x338]));
        assert_eq!(named_entity("bogus;"), None);
    }

    #[test]
    fn prefix_probes() {
        assert!(named_entity_prefix("no"));
        assert!(named_entity_prefix("not"));
        assert!(named_entity_prefix("noti"));
        assert!(!named_entity_prefix("notin;"));
        assert!(!named_entity_prefix("xyzzy"));
    }

    #[test]
    fn legacy_forms_present() {
        // The semicolon-optional legacy set must be present in both forms.
        for name in ["lt", "gt", "amp", "quot", "nbsp", "copy", "eacute"] {
            assert!(named_entity(name).is_some(), "&{name} missing");
            let with_semi = format!("{name};");
            assert!(named_entity(&with_semi).is_some(), "&{name}; missing");
        }
        // But most references require the semicolon.
        assert!(named_entity("lambda").is_none());
        assert!(named_entity("lambda;").is_some());
    }
}
