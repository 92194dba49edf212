//! BSON → JSON value conversion for raw records

use mongodb::bson::{Bson, Document};
use serde_json::{Map, Number, Value};

use pubdb_core::RawRecord;

/// Convert one document, keeping field order.
pub fn document_to_record(doc: Document) -> RawRecord {
    doc.into_iter().map(|(k, v)| (k, bson_to_json(v))).collect()
}

/// Plain JSON for a BSON value (no extended-JSON `$` wrappers).
///
/// ObjectIds become hex strings, datetimes RFC 3339 strings; anything
/// without a JSON counterpart falls back to its display text.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::from(n),
        Bson::Int64(n) => Value::from(n),
        Bson::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(k, v)| (k, bson_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(rfc3339(dt.timestamp_millis())),
        other => Value::String(other.to_string()),
    }
}

fn rfc3339(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn scalars() {
        assert_eq!(bson_to_json(Bson::Int32(7)), json!(7));
        assert_eq!(bson_to_json(Bson::Int64(31452104)), json!(31452104));
        assert_eq!(bson_to_json(Bson::Double(2.5)), json!(2.5));
        assert_eq!(bson_to_json(Bson::Double(f64::NAN)), Value::Null);
        assert_eq!(bson_to_json(Bson::Boolean(true)), json!(true));
        assert_eq!(bson_to_json(Bson::Null), Value::Null);
    }

    #[test]
    fn object_id_as_hex() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(
            bson_to_json(Bson::ObjectId(oid)),
            json!("507f1f77bcf86cd799439011")
        );
    }

    #[test]
    fn datetime_rfc3339() {
        let dt = mongodb::bson::DateTime::from_millis(0);
        assert_eq!(
            bson_to_json(Bson::DateTime(dt)),
            json!("1970-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn document_keeps_order_and_nesting() {
        let rec = document_to_record(doc! {
            "pmid": "1",
            "authors": ["A", "B"],
            "journal": { "name": "Nature", "issn": "0028-0836" },
            "year": 2020,
        });
        assert_eq!(
            rec.keys().collect::<Vec<_>>(),
            vec!["pmid", "authors", "journal", "year"]
        );
        assert_eq!(rec["authors"], json!(["A", "B"]));
        assert_eq!(rec["journal"]["issn"], json!("0028-0836"));
    }
}
