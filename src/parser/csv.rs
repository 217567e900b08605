use std::borrow::Cow;
use std::fmt::Write;

use crate::parser::orders::OrderRecord;

pub const CSV_HEADER: &str =
    "Order ID,Customer name,Customer Number,Address,Products,Price,Status,Delivery date,Comments";

/// Renders the header plus one row per record, every line ending in `\n`.
pub fn encode_csv(records: &[OrderRecord]) -> String {
    let mut csv = String::with_capacity(CSV_HEADER.len() + 1 + records.len() * 96);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for record in records {
        // writing into a String cannot fail
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{}",
            escape_field(&record.order_id),
            escape_field(&record.customer_name),
            escape_field(&record.customer_number),
            escape_field(&record.address),
            escape_field(&record.products),
            record.price,
            escape_field(&record.status),
            escape_field(record.delivery_date.as_deref().unwrap_or_default()),
            escape_field(record.comments.as_deref().unwrap_or_default()),
        );
    }
    csv
}

/// Quotes a field iff it holds a comma, quote or line break; inner quotes are doubled.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn record() -> OrderRecord {
        OrderRecord {
            order_id: "BX-1".into(),
            customer_name: "Chanda Mulenga".into(),
            customer_number: "+260970000000".into(),
            address: "Lusaka".into(),
            products: "Shoes (x3)".into(),
            price: Decimal::from(150),
            status: "Delivered".into(),
            delivery_date: Some("2024-01-01".into()),
            comments: None,
        }
    }

    #[test]
    fn escapes_only_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field(""), "");
        assert_eq!(escape_field("Smith, \"Jr.\""), "\"Smith, \"\"Jr.\"\"\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_field("a\r\nb"), "\"a\r\nb\"");
    }

    #[test]
    fn header_only_for_no_records() {
        assert_eq!(encode_csv(&[]), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn renders_rows_in_column_order() {
        let mut second = record();
        second.customer_name = "Smith, \"Jr.\"".into();
        second.price = Decimal::new(995, 1);
        second.delivery_date = None;
        second.comments = Some("Reason: (Unknown). Cancelled at: (2024-02-02)".into());

        let csv = encode_csv(&[record(), second]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "BX-1,Chanda Mulenga,+260970000000,Lusaka,Shoes (x3),150,Delivered,2024-01-01,");
        assert_eq!(
            lines[2],
            "BX-1,\"Smith, \"\"Jr.\"\"\",+260970000000,Lusaka,Shoes (x3),99.5,Delivered,,Reason: (Unknown). Cancelled at: (2024-02-02)"
        );
        assert!(csv.ends_with('\n'));
    }
}
