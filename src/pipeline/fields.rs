//! Canonical field resolution for extracted data.
//!
//! Extraction agents name the same field inconsistently across document
//! types ("Vendor Name" on invoices, "Merchant Name" on receipts). Displays
//! and exports read the canonical keys only, so resolution happens once,
//! before persistence.

use serde_json::{Map, Value};

/// One canonical field with the agent-side spellings that feed it.
struct FieldSpec {
    canonical: &'static str,
    aliases: &'static [&'static str],
    sentinel: &'static str,
}

const CANONICAL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        canonical: "vendor",
        aliases: &[
            "Vendor Name",
            "vendor_name",
            "Merchant Name",
            "merchant_name",
            "vendor",
        ],
        sentinel: "Unknown",
    },
    FieldSpec {
        canonical: "total_amount",
        aliases: &["Total Amount", "total_amount", "amount"],
        sentinel: "N/A",
    },
    FieldSpec {
        canonical: "date",
        aliases: &["Invoice Date", "date", "invoice_date"],
        sentinel: "N/A",
    },
    FieldSpec {
        canonical: "invoice_number",
        aliases: &["Invoice Number", "invoice_number"],
        sentinel: "N/A",
    },
];

fn present_value(map: &Map<String, Value>, key: &str) -> Option<Value> {
    match map.get(key) {
        Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v.clone()),
        None => None,
    }
}

/// Rewrites raw extracted fields under canonical keys.
///
/// For each canonical field the first present alias wins; absent fields get
/// their sentinel so every document carries the full canonical set. Keys not
/// consumed as aliases pass through unchanged.
pub fn resolve_fields(raw: &Map<String, Value>) -> Map<String, Value> {
    let mut resolved = Map::new();
    let mut consumed: Vec<&str> = Vec::new();

    for spec in CANONICAL_FIELDS {
        let mut value = None;
        for alias in spec.aliases {
            if let Some(found) = present_value(raw, alias) {
                value = Some(found);
                break;
            }
        }
        consumed.extend(spec.aliases);
        resolved.insert(
            spec.canonical.to_string(),
            value.unwrap_or_else(|| Value::String(spec.sentinel.to_string())),
        );
    }

    for (key, value) in raw {
        if !consumed.contains(&key.as_str()) {
            resolved.insert(key.clone(), value.clone());
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn canonicalizes_invoice_spellings() {
        let raw = map(&[
            ("Vendor Name", "Acme Corp"),
            ("Total Amount", "$500.00"),
            ("Invoice Date", "2024-01-15"),
            ("Invoice Number", "INV-1001"),
        ]);
        let resolved = resolve_fields(&raw);
        assert_eq!(resolved["vendor"], "Acme Corp");
        assert_eq!(resolved["total_amount"], "$500.00");
        assert_eq!(resolved["date"], "2024-01-15");
        assert_eq!(resolved["invoice_number"], "INV-1001");
    }

    #[test]
    fn merchant_name_feeds_vendor() {
        let raw = map(&[("merchant_name", "Corner Cafe"), ("amount", "$12.40")]);
        let resolved = resolve_fields(&raw);
        assert_eq!(resolved["vendor"], "Corner Cafe");
        assert_eq!(resolved["total_amount"], "$12.40");
    }

    #[test]
    fn first_present_alias_wins() {
        let raw = map(&[("Vendor Name", "Acme Corp"), ("merchant_name", "Wrong")]);
        let resolved = resolve_fields(&raw);
        assert_eq!(resolved["vendor"], "Acme Corp");
    }

    #[test]
    fn absent_fields_get_sentinels() {
        let resolved = resolve_fields(&Map::new());
        assert_eq!(resolved["vendor"], "Unknown");
        assert_eq!(resolved["total_amount"], "N/A");
        assert_eq!(resolved["date"], "N/A");
        assert_eq!(resolved["invoice_number"], "N/A");
    }

    #[test]
    fn empty_and_null_values_count_as_absent() {
        let mut raw = map(&[("Vendor Name", "   ")]);
        raw.insert("Total Amount".into(), Value::Null);
        let resolved = resolve_fields(&raw);
        assert_eq!(resolved["vendor"], "Unknown");
        assert_eq!(resolved["total_amount"], "N/A");
    }

    #[test]
    fn unconsumed_keys_pass_through() {
        let raw = map(&[("Vendor Name", "Acme Corp"), ("PO Number", "PO-77")]);
        let resolved = resolve_fields(&raw);
        assert_eq!(resolved["PO Number"], "PO-77");
    }
}
