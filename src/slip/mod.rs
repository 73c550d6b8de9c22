//! # Picking Slip Records
//!
//! The document record of the text pipeline: a flat set of named slip
//! fields plus an ordered list of line items. Records are produced by
//! [`parse`] and consumed by the code generator and the PDF renderer.
//!
//! ```
//! use pickslip::slip::{self, SlipField};
//!
//! let record = slip::parse("Company: Acme\nOrder Number: ORD-1");
//! assert_eq!(record.value(SlipField::CompanyName), Some("Acme"));
//! assert!(record.items.is_empty());
//! ```
//!
//! Records serialize with the camelCase names the generated JavaScript
//! reads from its `data` argument (`companyName`, `orderNumber`, ...).

mod parse;

pub use parse::parse;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Title used when a record carries none.
pub const DEFAULT_TITLE: &str = "Picking Slip";

/// A named top-level slip field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlipField {
    CompanyName,
    CompanyAddress,
    CompanyPhone,
    OrderNumber,
    OrderDate,
    CustomerName,
    Picker,
    Inspector,
    ShipmentTime,
}

impl SlipField {
    /// All fields, in document order.
    pub const ALL: [SlipField; 9] = [
        SlipField::CompanyName,
        SlipField::CompanyAddress,
        SlipField::CompanyPhone,
        SlipField::OrderNumber,
        SlipField::OrderDate,
        SlipField::CustomerName,
        SlipField::Picker,
        SlipField::Inspector,
        SlipField::ShipmentTime,
    ];

    /// Label as it appears in slip text and on the rendered page.
    pub fn label(self) -> &'static str {
        match self {
            SlipField::CompanyName => "Company",
            SlipField::CompanyAddress => "Address",
            SlipField::CompanyPhone => "Phone",
            SlipField::OrderNumber => "Order Number",
            SlipField::OrderDate => "Order Date",
            SlipField::CustomerName => "Customer Name",
            SlipField::Picker => "Picker",
            SlipField::Inspector => "Inspector",
            SlipField::ShipmentTime => "Shipment Time",
        }
    }

    /// Property name in the JSON record and in generated `data.*` reads.
    pub fn js_name(self) -> &'static str {
        match self {
            SlipField::CompanyName => "companyName",
            SlipField::CompanyAddress => "companyAddress",
            SlipField::CompanyPhone => "companyPhone",
            SlipField::OrderNumber => "orderNumber",
            SlipField::OrderDate => "orderDate",
            SlipField::CustomerName => "customerName",
            SlipField::Picker => "picker",
            SlipField::Inspector => "inspector",
            SlipField::ShipmentTime => "shipmentTime",
        }
    }

    /// Whether the text parser recognizes this field's label.
    ///
    /// Order date and shipment time only reach a record when callers build
    /// it directly.
    pub fn is_parsed(self) -> bool {
        !matches!(self, SlipField::OrderDate | SlipField::ShipmentTime)
    }

    /// Look up a parser-recognized field by its exact label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.is_parsed() && f.label() == label)
    }
}

/// A named line-item field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    Code,
    Name,
    Quantity,
    Location,
    Note,
}

impl ItemField {
    /// All item fields, in table column order.
    pub const ALL: [ItemField; 5] = [
        ItemField::Code,
        ItemField::Name,
        ItemField::Quantity,
        ItemField::Location,
        ItemField::Note,
    ];

    /// Sub-label inside an item line, also the table column header.
    pub fn label(self) -> &'static str {
        match self {
            ItemField::Code => "Product Code",
            ItemField::Name => "Product Name",
            ItemField::Quantity => "Quantity",
            ItemField::Location => "Location",
            ItemField::Note => "Note",
        }
    }

    pub fn js_name(self) -> &'static str {
        match self {
            ItemField::Code => "code",
            ItemField::Name => "name",
            ItemField::Quantity => "quantity",
            ItemField::Location => "location",
            ItemField::Note => "note",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.label() == label)
    }
}

/// One row of the product table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LineItem {
    pub fn get(&self, field: ItemField) -> Option<&str> {
        match field {
            ItemField::Code => self.code.as_deref(),
            ItemField::Name => self.name.as_deref(),
            ItemField::Quantity => self.quantity.as_deref(),
            ItemField::Location => self.location.as_deref(),
            ItemField::Note => self.note.as_deref(),
        }
    }

    pub fn set(&mut self, field: ItemField, value: impl Into<String>) {
        let slot = match field {
            ItemField::Code => &mut self.code,
            ItemField::Name => &mut self.name,
            ItemField::Quantity => &mut self.quantity,
            ItemField::Location => &mut self.location,
            ItemField::Note => &mut self.note,
        };
        *slot = Some(value.into());
    }

    /// Table cells in column order, absent fields as empty strings.
    pub fn cells(&self) -> [&str; 5] {
        ItemField::ALL.map(|f| self.get(f).unwrap_or(""))
    }

    /// Serialize as an item line (`- Product Code: ..., Product Name: ...`).
    ///
    /// The product name segment is always written since it is what marks a
    /// line as an item line.
    pub fn to_line(&self) -> String {
        let segments: Vec<String> = ItemField::ALL
            .into_iter()
            .filter_map(|f| match (f, self.get(f)) {
                (_, Some(v)) => Some(format!("{}: {}", f.label(), v)),
                (ItemField::Name, None) => Some(format!("{}:", f.label())),
                _ => None,
            })
            .collect();
        format!("- {}", segments.join(", "))
    }
}

/// Parsed key/value representation of one picking slip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipRecord {
    /// Document title; generators fall back to [`DEFAULT_TITLE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_time: Option<String>,
    /// Line items; empty unless at least one item line was present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,
}

impl SlipRecord {
    fn slot(&self, field: SlipField) -> &Option<String> {
        match field {
            SlipField::CompanyName => &self.company_name,
            SlipField::CompanyAddress => &self.company_address,
            SlipField::CompanyPhone => &self.company_phone,
            SlipField::OrderNumber => &self.order_number,
            SlipField::OrderDate => &self.order_date,
            SlipField::CustomerName => &self.customer_name,
            SlipField::Picker => &self.picker,
            SlipField::Inspector => &self.inspector,
            SlipField::ShipmentTime => &self.shipment_time,
        }
    }

    fn slot_mut(&mut self, field: SlipField) -> &mut Option<String> {
        match field {
            SlipField::CompanyName => &mut self.company_name,
            SlipField::CompanyAddress => &mut self.company_address,
            SlipField::CompanyPhone => &mut self.company_phone,
            SlipField::OrderNumber => &mut self.order_number,
            SlipField::OrderDate => &mut self.order_date,
            SlipField::CustomerName => &mut self.customer_name,
            SlipField::Picker => &mut self.picker,
            SlipField::Inspector => &mut self.inspector,
            SlipField::ShipmentTime => &mut self.shipment_time,
        }
    }

    /// Raw stored value, including empty strings.
    pub fn get(&self, field: SlipField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Stored value if non-empty. Empty values count as absent everywhere
    /// a slip is drawn or generated.
    pub fn value(&self, field: SlipField) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, field: SlipField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn has_company_info(&self) -> bool {
        [
            SlipField::CompanyName,
            SlipField::CompanyAddress,
            SlipField::CompanyPhone,
        ]
        .into_iter()
        .any(|f| self.value(f).is_some())
    }

    /// Re-serialize the parser-recognized fields and the items as slip text.
    ///
    /// `parse(&record.to_text())` reproduces any record that `parse` produced.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = SlipField::ALL
            .into_iter()
            .filter(|f| f.is_parsed())
            .filter_map(|f| self.get(f).map(|v| format!("{}: {}", f.label(), v)))
            .collect();

        if !self.items.is_empty() {
            lines.push(String::new());
            lines.push("Product List:".to_string());
            lines.extend(self.items.iter().map(LineItem::to_line));
        }

        lines.join("\n")
    }
}

/// Starter slip text with the order number and dates taken from `now`.
pub fn sample_text(now: DateTime<Local>) -> String {
    format!(
        "Company: Line Friends Co., Ltd.
Address: 123 Teheran-ro, Gangnam-gu, Seoul, South Korea
Phone: +82-2-1234-5678

Order Number: ORD-{millis}
Order Date: {date}
Customer Name: John Smith

Product List:
- Product Code: LF001, Product Name: Brown Bear (Large), Quantity: 2, Location: A-01-01, Note: Selected
- Product Code: LF002, Product Name: Cony Rabbit (Medium), Quantity: 1, Location: A-02-03, Note: Selected
- Product Code: LF003, Product Name: Sally Chicken (Small), Quantity: 3, Location: B-01-02, Note: Pending

Picker: Kim Picker
Inspector: Lee Inspector
Shipment Time: {time}",
        millis = now.timestamp_millis(),
        date = us_date(now),
        time = us_datetime(now),
    )
}

/// Date in US short form, e.g. `10/19/2026`.
pub fn us_date(now: DateTime<Local>) -> String {
    now.format("%-m/%-d/%Y").to_string()
}

/// Date and time in US form, e.g. `10/19/2026, 3:04:05 PM`.
pub fn us_datetime(now: DateTime<Local>) -> String {
    now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_serializes_camel_case_without_absent_fields() {
        let mut record = SlipRecord::default();
        record.set(SlipField::CompanyName, "Acme");
        record.set(SlipField::OrderNumber, "ORD-1");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"companyName": "Acme", "orderNumber": "ORD-1"})
        );
    }

    #[test]
    fn test_value_treats_empty_as_absent() {
        let mut record = SlipRecord::default();
        record.set(SlipField::Picker, "");
        assert_eq!(record.get(SlipField::Picker), Some(""));
        assert_eq!(record.value(SlipField::Picker), None);
        assert!(!record.has_company_info());
    }

    #[test]
    fn test_title_falls_back() {
        let mut record = SlipRecord::default();
        assert_eq!(record.title(), "Picking Slip");
        record.title = Some("Packing List".into());
        assert_eq!(record.title(), "Packing List");
    }

    #[test]
    fn test_from_label_skips_unparsed_fields() {
        assert_eq!(SlipField::from_label("Phone"), Some(SlipField::CompanyPhone));
        assert_eq!(SlipField::from_label("Order Date"), None);
        assert_eq!(SlipField::from_label("Shipment Time"), None);
        assert_eq!(SlipField::from_label("phone"), None);
    }

    #[test]
    fn test_item_line_format() {
        let item = LineItem {
            code: Some("A1".into()),
            name: Some("Widget".into()),
            quantity: Some("2".into()),
            ..Default::default()
        };
        assert_eq!(
            item.to_line(),
            "- Product Code: A1, Product Name: Widget, Quantity: 2"
        );
        assert_eq!(item.cells(), ["A1", "Widget", "2", "", ""]);
    }

    #[test]
    fn test_to_text_skips_unparsed_fields() {
        let mut record = SlipRecord::default();
        record.set(SlipField::Inspector, "Lee");
        record.set(SlipField::ShipmentTime, "noon");
        assert_eq!(record.to_text(), "Inspector: Lee");
    }

    #[test]
    fn test_sample_text_parses_fully() {
        let record = parse(&sample_text(Local::now()));
        assert_eq!(record.value(SlipField::CompanyName), Some("Line Friends Co., Ltd."));
        assert_eq!(record.value(SlipField::Picker), Some("Kim Picker"));
        assert_eq!(record.items.len(), 3);
        assert_eq!(record.items[2].note.as_deref(), Some("Pending"));
    }

    fn value() -> impl Strategy<Value = Option<String>> {
        prop::option::of("[A-Za-z0-9]([A-Za-z0-9 .()+-]{0,12}[A-Za-z0-9])?")
    }

    fn item() -> impl Strategy<Value = LineItem> {
        (value(), value(), value(), value(), value()).prop_map(
            |(code, name, quantity, location, note)| LineItem {
                code,
                // Item lines always carry a product name
                name: Some(name.unwrap_or_default()),
                quantity,
                location,
                note,
            },
        )
    }

    fn record() -> impl Strategy<Value = SlipRecord> {
        (
            prop::collection::vec(value(), 7),
            prop::collection::vec(item(), 0..4),
        )
            .prop_map(|(values, items)| {
                let mut record = SlipRecord::default();
                let parsed = SlipField::ALL.into_iter().filter(|f| f.is_parsed());
                for (field, v) in parsed.zip(values) {
                    if let Some(v) = v {
                        record.set(field, v);
                    }
                }
                record.items = items;
                record
            })
    }

    proptest! {
        #[test]
        fn prop_reparse_of_text_is_identity(record in record()) {
            let reparsed = parse(&record.to_text());
            prop_assert_eq!(reparsed, record);
        }
    }
}
