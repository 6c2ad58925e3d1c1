//! Character reference helpers for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)

use super::core::{HTMLTokenizer, TokenizerState};

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// Replacements for code points 0x80..=0x9F; the index is `code - 0x80`.
/// Entries that are `None` keep the original code point.
const C1_REPLACEMENTS: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl HTMLTokenizer {
    /// Returns true if the return state is an attribute value state.
    /// Per spec: "consumed as part of an attribute"
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                TokenizerState::AttributeValueDoubleQuoted
                    | TokenizerState::AttributeValueSingleQuoted
                    | TokenizerState::AttributeValueUnquoted
            )
        )
    }

    /// Append to the current attribute value or emit as text, depending on
    /// where the reference started.
    pub(super) fn append_or_emit(&mut self, c: char) {
        if self.is_consumed_as_part_of_attribute() {
            if let Some(ref mut token) = self.current_token {
                token.append_to_current_attribute_value(c);
            }
        } else {
            self.emit_character_token(c);
        }
    }

    /// "Flush code points consumed as a character reference"
    ///
    /// "If the character reference was consumed as part of an attribute,
    /// then append each character to the current attribute's value. Otherwise,
    /// emit each character as a character token."
    pub(super) fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        for c in buffer.chars() {
            self.append_or_emit(c);
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// Maps the accumulated character reference code to the character that
    /// gets flushed, logging the parse errors the mapping implies.
    pub(super) fn finish_numeric_character_reference(&mut self) {
        let code = self.character_reference_code;
        let replacement = match code {
            0 => {
                self.log_parse_error("null-character-reference");
                '\u{FFFD}'
            }
            0x11_0000..=u32::MAX => {
                self.log_parse_error("character-reference-outside-unicode-range");
                '\u{FFFD}'
            }
            0xD800..=0xDFFF => {
                self.log_parse_error("surrogate-character-reference");
                '\u{FFFD}'
            }
            0x80..=0x9F => {
                self.log_parse_error("control-character-reference");
                let index = usize::try_from(code - 0x80).unwrap_or_default();
                C1_REPLACEMENTS[index]
                    .or_else(|| char::from_u32(code))
                    .unwrap_or('\u{FFFD}')
            }
            _ => char::from_u32(code).unwrap_or('\u{FFFD}'),
        };
        self.temporary_buffer.clear();
        self.temporary_buffer.push(replacement);
        self.flush_code_points_consumed_as_character_reference();
    }
}
