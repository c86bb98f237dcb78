//! Version declaration forms recognised in source files.
//!
//! Every form is one row of a table: a regex with `prefix`, `version` and
//! optional `suffix` groups, plus the separator the version is written with.
//! Locating and rewriting both iterate the same table.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// A recognised way of declaring a four-part version in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// `[assembly: AssemblyVersion("1.2.3.4")]`
    AssemblyVersion,
    /// `[assembly: AssemblyFileVersion("1.2.3.4")]`
    AssemblyFileVersion,
    /// `[assembly: AssemblyInformationalVersion("1.2.3.4")]`
    AssemblyInformationalVersion,
    /// `VALUE "FileVersion", "1.2.3.4"` in a resource script
    FileVersionValue,
    /// `VALUE "ProductVersion", "1.2.3.4"` in a resource script
    ProductVersionValue,
    /// `FILEVERSION 1,2,3,4` in a resource script
    FileVersionDirective,
    /// `PRODUCTVERSION 1,2,3,4` in a resource script
    ProductVersionDirective,
}

/// How the four components are joined in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Dot,
    Comma,
}

impl DeclarationKind {
    /// Every kind, in the order rewrites are applied.
    pub const ALL: [DeclarationKind; 7] = [
        DeclarationKind::AssemblyVersion,
        DeclarationKind::AssemblyFileVersion,
        DeclarationKind::AssemblyInformationalVersion,
        DeclarationKind::FileVersionValue,
        DeclarationKind::ProductVersionValue,
        DeclarationKind::FileVersionDirective,
        DeclarationKind::ProductVersionDirective,
    ];

    /// Kinds consulted when reading the current version, highest priority first.
    pub const LOCATOR_PRIORITY: [DeclarationKind; 4] = [
        DeclarationKind::AssemblyVersion,
        DeclarationKind::AssemblyFileVersion,
        DeclarationKind::AssemblyInformationalVersion,
        DeclarationKind::FileVersionValue,
    ];

    fn pattern_source(self) -> &'static str {
        match self {
            DeclarationKind::AssemblyVersion => {
                r#"(?P<prefix>\bAssemblyVersion(?:Attribute)?\s*\(\s*")(?P<version>\d+\.\d+\.\d+\.\d+)(?P<suffix>")"#
            }
            DeclarationKind::AssemblyFileVersion => {
                r#"(?P<prefix>\bAssemblyFileVersion(?:Attribute)?\s*\(\s*")(?P<version>\d+\.\d+\.\d+\.\d+)(?P<suffix>")"#
            }
            DeclarationKind::AssemblyInformationalVersion => {
                r#"(?P<prefix>\bAssemblyInformationalVersion(?:Attribute)?\s*\(\s*")(?P<version>\d+\.\d+\.\d+\.\d+)(?P<suffix>")"#
            }
            DeclarationKind::FileVersionValue => {
                r#"(?P<prefix>"FileVersion"\s*,\s*")(?P<version>\d+\.\d+\.\d+\.\d+)(?P<suffix>[^0-9.])"#
            }
            DeclarationKind::ProductVersionValue => {
                r#"(?P<prefix>"ProductVersion"\s*,\s*")(?P<version>\d+\.\d+\.\d+\.\d+)(?P<suffix>[^0-9.])"#
            }
            DeclarationKind::FileVersionDirective => {
                r"(?P<prefix>\bFILEVERSION[ \t]+)(?P<version>\d+[ \t]*,[ \t]*\d+[ \t]*,[ \t]*\d+[ \t]*,[ \t]*\d+)"
            }
            DeclarationKind::ProductVersionDirective => {
                r"(?P<prefix>\bPRODUCTVERSION[ \t]+)(?P<version>\d+[ \t]*,[ \t]*\d+[ \t]*,[ \t]*\d+[ \t]*,[ \t]*\d+)"
            }
        }
    }

    /// Separator used between components for this kind.
    pub fn separator(self) -> Separator {
        match self {
            DeclarationKind::FileVersionDirective | DeclarationKind::ProductVersionDirective => {
                Separator::Comma
            }
            _ => Separator::Dot,
        }
    }

    /// Compiled regex for this kind.
    pub fn regex(self) -> &'static Regex {
        static TABLE: OnceLock<[Regex; 7]> = OnceLock::new();
        // ALL lists the variants in declaration order, so `self as usize` indexes it.
        let table = TABLE.get_or_init(|| {
            DeclarationKind::ALL.map(|kind| {
                Regex::new(kind.pattern_source())
                    .unwrap_or_else(|e| panic!("invalid pattern for {:?}: {}", kind, e))
            })
        });
        &table[self as usize]
    }

    /// Returns the dotted version declared by the first match of this kind.
    pub fn extract(self, text: &str) -> Option<String> {
        let caps = self.regex().captures(text)?;
        let raw = caps.name("version")?.as_str();
        Some(normalise(raw))
    }

    /// True when `text` contains at least one declaration of this kind.
    pub fn is_present(self, text: &str) -> bool {
        self.regex().is_match(text)
    }

    /// Replaces every declaration of this kind with `new_version`.
    ///
    /// `new_version` is always given dotted; comma kinds convert it.
    pub fn render<'t>(self, text: &'t str, new_version: &str) -> Cow<'t, str> {
        let rendered = match self.separator() {
            Separator::Dot => new_version.to_string(),
            Separator::Comma => new_version.replace('.', ","),
        };

        self.regex().replace_all(text, |caps: &Captures| {
            format!(
                "{}{}{}",
                &caps["prefix"],
                rendered,
                caps.name("suffix").map_or("", |m| m.as_str())
            )
        })
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclarationKind::AssemblyVersion => "AssemblyVersion",
            DeclarationKind::AssemblyFileVersion => "AssemblyFileVersion",
            DeclarationKind::AssemblyInformationalVersion => "AssemblyInformationalVersion",
            DeclarationKind::FileVersionValue => "\"FileVersion\" value",
            DeclarationKind::ProductVersionValue => "\"ProductVersion\" value",
            DeclarationKind::FileVersionDirective => "FILEVERSION",
            DeclarationKind::ProductVersionDirective => "PRODUCTVERSION",
        };
        f.write_str(name)
    }
}

fn normalise(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Finds the current version using the locator priority order.
pub fn extract_first(text: &str) -> Option<(DeclarationKind, String)> {
    DeclarationKind::LOCATOR_PRIORITY
        .iter()
        .find_map(|kind| kind.extract(text).map(|version| (*kind, version)))
}

/// True when `text` carries any recognised declaration.
pub fn contains_any(text: &str) -> bool {
    DeclarationKind::ALL.iter().any(|kind| kind.is_present(text))
}

/// Rewrites every recognised declaration in `text` to `new_version`.
pub fn rewrite_all(text: &str, new_version: &str) -> String {
    DeclarationKind::ALL
        .iter()
        .fold(text.to_string(), |acc, kind| {
            kind.render(&acc, new_version).into_owned()
        })
}
