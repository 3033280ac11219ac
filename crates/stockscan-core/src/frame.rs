//! # Frame Codec
//!
//! Decodes the text of one scanned code into a [`Frame`], and encodes item
//! lists back into frame texts.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1/2|Rice~Grains~50|Beans~Grains~30                                     │
//! │  ─┬─ ─────────┬──── ────────┬──────                                     │
//! │   │           │             └── item: name ~ category ~ quantity        │
//! │   │           └──────────────── item                                    │
//! │   └──────────────────────────── header: index / total (1-based)         │
//! │                                                                         │
//! │  • '|' separates the header from items and items from each other        │
//! │  • '~' separates fields inside an item                                  │
//! │  • whitespace around any field is ignored                               │
//! │  • empty item segments ("||") are skipped                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding is all-or-nothing: a defect anywhere in the text yields
//! [`ScanError::MalformedFrame`] and no partial frame.

use crate::error::{FrameDefect, ScanError, ScanResult};
use crate::types::{Frame, RawItem};
use crate::validation::{
    parse_frame_number, parse_quantity, validate_category_name, validate_encodable,
    validate_item_name, ValidationResult,
};
use crate::{FIELD_SEPARATOR, HEADER_SEPARATOR, ITEM_SEPARATOR};

// =============================================================================
// Decoding
// =============================================================================

/// Decodes one frame from raw scanned text.
///
/// ## Example
/// ```rust
/// use stockscan_core::frame::decode_frame;
///
/// let frame = decode_frame("1/2|Rice~Grains~50|Beans~Grains~30").unwrap();
/// assert_eq!(frame.index, 1);
/// assert_eq!(frame.total, 2);
/// assert_eq!(frame.items.len(), 2);
///
/// assert!(decode_frame("abc").is_err());
/// ```
pub fn decode_frame(text: &str) -> ScanResult<Frame> {
    decode_parts(text).map_err(|defect| ScanError::malformed(text, defect))
}

fn decode_parts(text: &str) -> Result<Frame, FrameDefect> {
    // Bytes the camera could not read as UTF-8 arrive as U+FFFD.
    if text.contains(char::REPLACEMENT_CHARACTER) {
        return Err(FrameDefect::NotText);
    }

    let mut segments = text.split(ITEM_SEPARATOR);

    // split() always yields at least one segment
    let header = segments.next().unwrap_or_default();
    let (index, total) = decode_header(header)?;

    let mut items = Vec::new();
    for segment in segments {
        if segment.trim().is_empty() {
            continue;
        }
        let position = items.len() + 1;
        items.push(decode_item(segment, position)?);
    }

    Ok(Frame::new(index, total, items))
}

fn decode_header(header: &str) -> Result<(u32, u32), FrameDefect> {
    let (index, total) = header
        .split_once(HEADER_SEPARATOR)
        .ok_or(FrameDefect::BadHeader)?;

    let index = parse_frame_number(index).ok_or(FrameDefect::BadHeader)?;
    let total = parse_frame_number(total).ok_or(FrameDefect::BadHeader)?;

    if total < 1 {
        return Err(FrameDefect::ZeroTotal);
    }

    if index < 1 || index > total {
        return Err(FrameDefect::IndexOutOfRange { index, total });
    }

    Ok((index, total))
}

fn decode_item(segment: &str, position: usize) -> Result<RawItem, FrameDefect> {
    let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();

    // Extra fields after quantity are ignored.
    let [name, category, quantity, ..] = fields.as_slice() else {
        return Err(FrameDefect::MissingFields {
            position,
            found: fields.len(),
        });
    };

    let invalid = |source| FrameDefect::InvalidField { position, source };

    validate_item_name(name).map_err(invalid)?;
    validate_category_name(category).map_err(invalid)?;
    let quantity = parse_quantity(quantity).map_err(invalid)?;

    Ok(RawItem::new(name.trim(), category.trim(), quantity))
}

// =============================================================================
// Encoding
// =============================================================================

/// Encodes a frame into its wire text.
///
/// Fields are written as-is; use [`encode_frames`] to validate them first.
pub fn encode_frame(frame: &Frame) -> String {
    let mut text = format!("{}{HEADER_SEPARATOR}{}", frame.index, frame.total);
    for item in &frame.items {
        text.push(ITEM_SEPARATOR);
        text.push_str(&format!(
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            item.name.trim(),
            item.category.trim(),
            item.quantity
        ));
    }
    text
}

/// Splits `items` into frames of at most `per_frame` items and encodes each.
///
/// An empty item list still produces one frame (`"1/1"`), so a printout
/// always has at least one code. `per_frame` of 0 is treated as 1.
///
/// ## Example
/// ```rust
/// use stockscan_core::frame::encode_frames;
/// use stockscan_core::RawItem;
///
/// let items = vec![
///     RawItem::new("Rice", "Grains", 50),
///     RawItem::new("Beans", "Grains", 30),
///     RawItem::new("Oil", "Pantry", 12),
/// ];
/// let texts = encode_frames(&items, 2).unwrap();
/// assert_eq!(texts, vec![
///     "1/2|Rice~Grains~50|Beans~Grains~30".to_string(),
///     "2/2|Oil~Pantry~12".to_string(),
/// ]);
/// ```
pub fn encode_frames(items: &[RawItem], per_frame: usize) -> ValidationResult<Vec<String>> {
    for item in items {
        validate_encodable("name", &item.name)?;
        validate_encodable("category", &item.category)?;
        if item.quantity < 0 {
            return Err(crate::ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
    }

    let per_frame = per_frame.max(1);
    let chunks: Vec<&[RawItem]> = if items.is_empty() {
        vec![items]
    } else {
        items.chunks(per_frame).collect()
    };

    let total = chunks.len() as u32;
    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| encode_frame(&Frame::new(i as u32 + 1, total, chunk.to_vec())))
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn defect(text: &str) -> FrameDefect {
        match decode_frame(text) {
            Err(ScanError::MalformedFrame { defect, text: t }) => {
                assert_eq!(t, text, "error must carry the literal text");
                defect
            }
            other => panic!("expected MalformedFrame for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_two_items() {
        let frame = decode_frame("1/2|Rice~Grains~50|Beans~Grains~30").unwrap();
        assert_eq!(frame.index, 1);
        assert_eq!(frame.total, 2);
        assert_eq!(
            frame.items,
            vec![
                RawItem::new("Rice", "Grains", 50),
                RawItem::new("Beans", "Grains", 30),
            ]
        );
    }

    #[test]
    fn test_decode_trims_whitespace_everywhere() {
        let frame = decode_frame(" 2 / 3 |  Olive Oil ~ Pantry ~ 12  ").unwrap();
        assert_eq!(frame.index, 2);
        assert_eq!(frame.total, 3);
        assert_eq!(frame.items, vec![RawItem::new("Olive Oil", "Pantry", 12)]);
    }

    #[test]
    fn test_decode_skips_empty_segments() {
        let frame = decode_frame("1/1||Rice~Grains~5|  |Oil~Pantry~1|").unwrap();
        assert_eq!(frame.items.len(), 2);
        assert_eq!(frame.items[1].name, "Oil");
    }

    #[test]
    fn test_decode_header_only() {
        let frame = decode_frame("1/1").unwrap();
        assert!(frame.items.is_empty());
    }

    #[test]
    fn test_decode_keeps_duplicate_names_in_order() {
        let frame = decode_frame("1/1|Rice~Grains~5|rice~Grains~9").unwrap();
        assert_eq!(frame.items[0].quantity, 5);
        assert_eq!(frame.items[1].quantity, 9);
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let frame = decode_frame("1/1|Rice~Grains~5~note").unwrap();
        assert_eq!(frame.items, vec![RawItem::new("Rice", "Grains", 5)]);
    }

    #[test]
    fn test_bad_headers() {
        assert_eq!(defect("abc"), FrameDefect::BadHeader);
        assert_eq!(defect(""), FrameDefect::BadHeader);
        assert_eq!(defect("1-2|Rice~Grains~5"), FrameDefect::BadHeader);
        assert_eq!(defect("a/2"), FrameDefect::BadHeader);
        assert_eq!(defect("1/"), FrameDefect::BadHeader);
        assert_eq!(defect("-1/2"), FrameDefect::BadHeader);
        assert_eq!(defect("1/2/3"), FrameDefect::BadHeader);
    }

    #[test]
    fn test_header_bounds() {
        assert_eq!(defect("0/0"), FrameDefect::ZeroTotal);
        assert_eq!(
            defect("0/2"),
            FrameDefect::IndexOutOfRange { index: 0, total: 2 }
        );
        assert_eq!(
            defect("3/2|X~Y~1"),
            FrameDefect::IndexOutOfRange { index: 3, total: 2 }
        );
    }

    #[test]
    fn test_item_defects() {
        assert_eq!(
            defect("1/1|Rice~Grains"),
            FrameDefect::MissingFields {
                position: 1,
                found: 2
            }
        );
        assert!(matches!(
            defect("1/1|Rice~Grains~5|Oil~Pantry~-2"),
            FrameDefect::InvalidField { position: 2, .. }
        ));
        assert!(matches!(
            defect("1/1|Rice~Grains~lots"),
            FrameDefect::InvalidField { position: 1, .. }
        ));
        assert!(matches!(
            defect("1/1| ~Grains~5"),
            FrameDefect::InvalidField { position: 1, .. }
        ));
        assert!(matches!(
            defect("1/1|Rice~ ~5"),
            FrameDefect::InvalidField { position: 1, .. }
        ));
    }

    #[test]
    fn test_encode_frames_round_trips_through_decoder() {
        let items = vec![
            RawItem::new("Rice", "Grains", 50),
            RawItem::new("Beans", "Grains", 30),
            RawItem::new("Oil", "Pantry", 12),
        ];
        let texts = encode_frames(&items, 2).unwrap();
        assert_eq!(texts.len(), 2);

        let decoded: Vec<RawItem> = texts
            .iter()
            .flat_map(|t| decode_frame(t).unwrap().items)
            .collect();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_encode_empty_and_zero_chunk() {
        assert_eq!(encode_frames(&[], 5).unwrap(), vec!["1/1".to_string()]);

        let items = vec![RawItem::new("A", "B", 1), RawItem::new("C", "D", 2)];
        assert_eq!(encode_frames(&items, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_encode_rejects_delimiters() {
        let items = vec![RawItem::new("Rice|Beans", "Grains", 1)];
        assert!(encode_frames(&items, 1).is_err());
    }

    #[test]
    fn test_unreadable_bytes_rejected() {
        let text = String::from_utf8_lossy(b"1/1|Ri\xffce~Grains~5").into_owned();
        assert_eq!(defect(&text), FrameDefect::NotText);
    }

    fn item_strategy() -> impl Strategy<Value = RawItem> {
        (
            "[A-Za-z0-9]([A-Za-z0-9 .-]{0,20}[A-Za-z0-9])?",
            "[A-Za-z]([A-Za-z ]{0,12}[A-Za-z])?",
            0i64..1_000_000,
        )
            .prop_map(|(name, category, quantity)| RawItem::new(name, category, quantity))
    }

    proptest! {
        #[test]
        fn test_any_text_fails_only_as_malformed(
            text in prop_oneof![
                "\\PC{0,64}",
                "[0-9]{1,2}/[0-9]{1,2}(\\|[A-Za-z0-9 ~|-]{0,12}){0,4}",
            ]
        ) {
            match decode_frame(&text) {
                Ok(frame) => prop_assert!(frame.index >= 1 && frame.index <= frame.total),
                Err(err) => prop_assert!(
                    matches!(&err, ScanError::MalformedFrame { text: t, .. } if *t == text),
                    "unexpected error {:?}", err
                ),
            }
        }

        #[test]
        fn test_encoded_items_decode_back(
            items in prop::collection::vec(item_strategy(), 0..30),
            per_frame in 1usize..10,
        ) {
            let texts = encode_frames(&items, per_frame).unwrap();
            let total = texts.len() as u32;

            let mut decoded = Vec::new();
            for (i, text) in texts.iter().enumerate() {
                let frame = decode_frame(text).unwrap();
                prop_assert_eq!(frame.index, i as u32 + 1);
                prop_assert_eq!(frame.total, total);
                decoded.extend(frame.items);
            }
            prop_assert_eq!(decoded, items);
        }
    }
}
