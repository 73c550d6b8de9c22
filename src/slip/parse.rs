//! Text-to-record parsing.
//!
//! Slip text is loosely structured: `Label: value` lines for the header
//! fields and `- Sub Label: value, Sub Label: value` lines for products.
//! Nothing here fails; unrecognized or malformed lines are dropped.

use super::{ItemField, LineItem, SlipField, SlipRecord};

/// Marker that turns a `-` line into a line item.
const ITEM_MARKER: &str = "Product Name:";

/// Parse slip text into a record.
///
/// Values are stored as trimmed text without any shape validation. A value
/// ends at the next colon, and item values end at the next comma.
pub fn parse(text: &str) -> SlipRecord {
    let mut record = SlipRecord::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('-') {
            continue;
        }
        if let Some((key, value)) = split_pair(line)
            && let Some(field) = SlipField::from_label(key)
        {
            record.set(field, value);
        }
    }

    record.items = text
        .lines()
        .filter(|line| is_item_line(line))
        .map(parse_item)
        .collect();

    record
}

fn is_item_line(line: &str) -> bool {
    line.trim_start().starts_with('-') && line.contains(ITEM_MARKER)
}

fn parse_item(line: &str) -> LineItem {
    let body = line.trim();
    let body = body.strip_prefix('-').unwrap_or(body);

    let mut item = LineItem::default();
    for segment in body.split(',') {
        if let Some((key, value)) = split_pair(segment.trim())
            && let Some(field) = ItemField::from_label(key)
        {
            item.set(field, value);
        }
    }
    item
}

/// Split `key: value` at the first colon. The value stops at a second colon.
fn split_pair(s: &str) -> Option<(&str, &str)> {
    let (key, rest) = s.split_once(':')?;
    let value = rest.split_once(':').map_or(rest, |(head, _)| head);
    Some((key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_fields() {
        let record = parse("Company: Acme\nOrder Number: ORD-1");
        assert_eq!(
            record,
            SlipRecord {
                company_name: Some("Acme".into()),
                order_number: Some("ORD-1".into()),
                ..Default::default()
            }
        );
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_item_line() {
        let record =
            parse("- Product Code: A1, Product Name: Widget, Quantity: 2, Location: L1, Note: n");
        assert_eq!(
            record.items,
            vec![LineItem {
                code: Some("A1".into()),
                name: Some("Widget".into()),
                quantity: Some("2".into()),
                location: Some("L1".into()),
                note: Some("n".into()),
            }]
        );
        // Item lines never feed the header pass
        assert_eq!(record.company_name, None);
    }

    #[test]
    fn test_all_recognized_labels() {
        let record = parse(
            "Company: C\nAddress: A\nPhone: P\nOrder Number: O\n\
             Customer Name: N\nPicker: K\nInspector: I",
        );
        assert_eq!(record.company_name.as_deref(), Some("C"));
        assert_eq!(record.company_address.as_deref(), Some("A"));
        assert_eq!(record.company_phone.as_deref(), Some("P"));
        assert_eq!(record.order_number.as_deref(), Some("O"));
        assert_eq!(record.customer_name.as_deref(), Some("N"));
        assert_eq!(record.picker.as_deref(), Some("K"));
        assert_eq!(record.inspector.as_deref(), Some("I"));
    }

    #[test]
    fn test_unrecognized_labels_dropped() {
        let record = parse("Warehouse: East\nOrder Date: 1/2/2026\nShipment Time: 3pm\nCompany Name: X");
        assert_eq!(record, SlipRecord::default());
    }

    #[test]
    fn test_blank_and_colonless_lines_ignored() {
        let record = parse("\n   \nJust a note\n  Picker :  Kim  \n");
        assert_eq!(record.picker.as_deref(), Some("Kim"));
        assert_eq!(record.company_name, None);
    }

    #[test]
    fn test_value_truncated_at_second_colon() {
        let record = parse("Company: Acme: West Branch");
        assert_eq!(record.company_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_empty_value_kept_as_empty() {
        let record = parse("Picker:");
        assert_eq!(record.picker.as_deref(), Some(""));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let record = parse("Picker: A\nPicker: B");
        assert_eq!(record.picker.as_deref(), Some("B"));
    }

    #[test]
    fn test_dash_lines_without_product_name_skipped() {
        let record = parse("- Product Code: A1, Quantity: 2\n- a note");
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_comma_in_item_value_misparses() {
        let record = parse("- Product Name: Bolt, M6, Quantity: 4");
        let item = &record.items[0];
        assert_eq!(item.name.as_deref(), Some("Bolt"));
        assert_eq!(item.quantity.as_deref(), Some("4"));
    }

    #[test]
    fn test_unknown_item_segments_dropped() {
        let record = parse("  - Product Name: Widget, Color: red, Note: fragile");
        assert_eq!(
            record.items,
            vec![LineItem {
                name: Some("Widget".into()),
                note: Some("fragile".into()),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn test_items_keep_order_and_windows_newlines() {
        let record = parse("- Product Name: A\r\n- Product Name: B\r\nPicker: K\r\n");
        let names: Vec<_> = record.items.iter().map(|i| i.name.as_deref()).collect();
        assert_eq!(names, vec![Some("A"), Some("B")]);
        assert_eq!(record.picker.as_deref(), Some("K"));
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("a: b"), Some(("a", "b")));
        assert_eq!(split_pair("a: b: c"), Some(("a", "b")));
        assert_eq!(split_pair("no colon"), None);
    }
}
