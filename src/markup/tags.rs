//! # Tag Registry
//!
//! The markup vocabulary is fixed. Each tag maps to one style override bundle:
//!
//! | Tag | Overrides |
//! |-----|-----------|
//! | `<h1>` | width 3, height 3 |
//! | `<h2>` | width 2, height 2 |
//! | `<center>` | align center |
//! | `<right>` | align right |
//! | `<b>` | bold |
//! | `<u1>` | underline 1 |
//! | `<u2>` | underline 2 |
//! | `<invert>` | invert |
//! | `<flip>` | upside down |
//! | `<code>` | font B |

use crate::style::{Align, Font, StyleOverrides};

/// A registered markup tag.
#[derive(Debug, PartialEq, Eq)]
pub struct TagSpec {
    /// Lower-case tag name without angle brackets.
    pub name: &'static str,
    /// Style changes applied to the tag's children.
    pub overrides: StyleOverrides,
}

/// Every tag the parser recognises.
pub static TAGS: &[TagSpec] = &[
    TagSpec {
        name: "h1",
        overrides: StyleOverrides {
            width: Some(3),
            height: Some(3),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "h2",
        overrides: StyleOverrides {
            width: Some(2),
            height: Some(2),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "center",
        overrides: StyleOverrides {
            align: Some(Align::Center),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "right",
        overrides: StyleOverrides {
            align: Some(Align::Right),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "b",
        overrides: StyleOverrides {
            bold: Some(true),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "u1",
        overrides: StyleOverrides {
            underline: Some(1),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "u2",
        overrides: StyleOverrides {
            underline: Some(2),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "invert",
        overrides: StyleOverrides {
            invert: Some(true),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "flip",
        overrides: StyleOverrides {
            flip: Some(true),
            ..StyleOverrides::NONE
        },
    },
    TagSpec {
        name: "code",
        overrides: StyleOverrides {
            font: Some(Font::B),
            ..StyleOverrides::NONE
        },
    },
];

/// Look up a tag by its normalised (lower-case) name.
pub fn lookup(name: &str) -> Option<&'static TagSpec> {
    TAGS.iter().find(|tag| tag.name == name)
}

/// List all registered tag names.
pub fn list_tags() -> Vec<&'static str> {
    TAGS.iter().map(|tag| tag.name).collect()
}
