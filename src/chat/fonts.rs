//! Cosmetic font transform for outgoing chat lines
//!
//! Maps ASCII letters and digits into a Unicode style alphabet while leaving
//! links and @mentions untouched, so URLs stay clickable and mentions still
//! ping. Purely presentational; applied at the transport boundary.

use serde::Deserialize;

/// Supported style alphabets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Plain,
    Bold,
    Italic,
    Monospace,
}

impl FontStyle {
    /// Parse a style name; unknown names fall back to plain.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "bold" => FontStyle::Bold,
            "italic" => FontStyle::Italic,
            "monospace" | "mono" => FontStyle::Monospace,
            _ => FontStyle::Plain,
        }
    }

    fn map_char(self, c: char) -> char {
        let mapped = match self {
            FontStyle::Plain => return c,
            // Mathematical sans-serif bold
            FontStyle::Bold => match c {
                'a'..='z' => 0x1D5EE + (c as u32 - 'a' as u32),
                'A'..='Z' => 0x1D5D4 + (c as u32 - 'A' as u32),
                '0'..='9' => 0x1D7EC + (c as u32 - '0' as u32),
                _ => return c,
            },
            // Mathematical sans-serif italic (no digit variants exist)
            FontStyle::Italic => match c {
                'a'..='z' => 0x1D622 + (c as u32 - 'a' as u32),
                'A'..='Z' => 0x1D608 + (c as u32 - 'A' as u32),
                _ => return c,
            },
            FontStyle::Monospace => match c {
                'a'..='z' => 0x1D68A + (c as u32 - 'a' as u32),
                'A'..='Z' => 0x1D670 + (c as u32 - 'A' as u32),
                '0'..='9' => 0x1D7F6 + (c as u32 - '0' as u32),
                _ => return c,
            },
        };

        char::from_u32(mapped).unwrap_or(c)
    }
}

/// Apply a style to a message, skipping `https://` links and `@mentions`.
///
/// A link or mention runs until the next whitespace; everything inside it is
/// passed through verbatim.
pub fn apply_style(text: &str, style: FontStyle) -> String {
    if style == FontStyle::Plain {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut in_link = false;
    let mut in_tag = false;

    for (index, &c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            in_link = false;
            in_tag = false;
            result.push(c);
            continue;
        }

        if !in_link && starts_with_at(&chars, index, "https://") {
            in_link = true;
        }
        if !in_link && c == '@' {
            in_tag = true;
        }

        if in_link || in_tag {
            result.push(c);
        } else {
            result.push(style.map_char(c));
        }
    }

    result
}

fn starts_with_at(chars: &[char], index: usize, needle: &str) -> bool {
    chars[index..]
        .iter()
        .zip(needle.chars())
        .filter(|(a, b)| **a == *b)
        .count()
        == needle.chars().count()
}
