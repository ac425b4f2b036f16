// docmongo-core/src/document.rs
//! Document codec helpers
//!
//! Two document shapes are used throughout the crate:
//! - ordered: [`Document`] (insertion ordered, what the driver sends)
//! - unordered: [`DocMap`] (plain field → value map, iterated in key order)

use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{DocMongoError, Result};

/// Unordered field → value mapping.
///
/// Keyed by a `BTreeMap`, so every ordered document built from one (through
/// [`ordered_from_map`] or [`to_ordered_document`]) comes out sorted by key.
pub type DocMap = BTreeMap<String, Bson>;

/// Encode a record as an ordered document.
///
/// Goes through the generic BSON encoder, so only fields serde would emit
/// survive (skipped fields, `#[serde(rename)]` etc. apply). Field order
/// follows the record's serialization order; a [`DocMap`] serializes in
/// key order.
pub fn to_ordered_document<T>(record: &T) -> Result<Document>
where
    T: Serialize + ?Sized,
{
    match bson::to_bson(record)? {
        Bson::Document(doc) => Ok(doc),
        other => Err(DocMongoError::Serialization(format!(
            "expected a document-shaped record, got {:?}",
            other.element_type()
        ))),
    }
}

/// Encode a record as an unordered field map
pub fn to_unordered_document<T>(record: &T) -> Result<DocMap>
where
    T: Serialize + ?Sized,
{
    Ok(to_ordered_document(record)?.into_iter().collect())
}

/// Ordered document from a map, keys sorted ascending
pub fn ordered_from_map(map: &DocMap) -> Document {
    map.iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Keep only the listed fields that exist in `data`
///
/// ```
/// use docmongo_core::document::{filter_fields, DocMap};
/// use mongodb::bson::Bson;
///
/// let mut data = DocMap::new();
/// data.insert("name".into(), Bson::String("John".into()));
/// data.insert("age".into(), Bson::Int32(30));
///
/// let kept = filter_fields(&data, &["name", "phone"]);
/// assert_eq!(kept.len(), 1);
/// assert!(kept.contains_key("name"));
/// ```
pub fn filter_fields<S: AsRef<str>>(data: &DocMap, keep_fields: &[S]) -> DocMap {
    let mut filtered = DocMap::new();
    for key in keep_fields {
        let key = key.as_ref();
        if let Some(value) = data.get(key) {
            filtered.insert(key.to_string(), value.clone());
        }
    }
    filtered
}

/// Recursive copy of a value; documents and arrays are rebuilt element by element
pub fn deep_copy(value: &Bson) -> Bson {
    match value {
        Bson::Document(doc) => {
            let mut copy = Document::new();
            for (key, inner) in doc {
                copy.insert(key.clone(), deep_copy(inner));
            }
            Bson::Document(copy)
        }
        Bson::Array(items) => Bson::Array(items.iter().map(deep_copy).collect()),
        leaf => leaf.clone(),
    }
}

pub fn deep_copy_map(map: &DocMap) -> DocMap {
    map.iter()
        .map(|(key, value)| (key.clone(), deep_copy(value)))
        .collect()
}

/// Whether `key` is present. An absent map has no keys.
pub fn has_key(map: Option<&DocMap>, key: &str) -> bool {
    map.map_or(false, |m| m.contains_key(key))
}

pub fn object_id_from_hex(hex: &str) -> Result<ObjectId> {
    ObjectId::parse_str(hex).map_err(|_| DocMongoError::InvalidObjectId(hex.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct TestStruct {
        field1: String,
        field2: i32,
    }

    #[derive(Serialize)]
    struct WithSkipped {
        #[serde(rename = "_id")]
        id: i32,
        #[serde(skip)]
        #[allow(dead_code)]
        scratch: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    }

    fn sample() -> DocMap {
        let mut data = DocMap::new();
        data.insert("name".into(), Bson::String("John Doe".into()));
        data.insert("age".into(), Bson::Int32(30));
        data.insert("email".into(), Bson::String("john@example.com".into()));
        data.insert("address".into(), Bson::String("123 Main St".into()));
        data
    }

    #[test]
    fn test_struct_to_ordered_document() {
        let record = TestStruct {
            field1: "value1".to_string(),
            field2: 123,
        };
        let doc = to_ordered_document(&record).unwrap();
        assert_eq!(doc, doc! { "field1": "value1", "field2": 123 });
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["field1", "field2"]);
    }

    #[test]
    fn test_struct_conversion_is_lossy_normalization() {
        let record = WithSkipped {
            id: 7,
            scratch: "dropped".to_string(),
            note: None,
        };
        let doc = to_ordered_document(&record).unwrap();
        assert_eq!(doc, doc! { "_id": 7 });
    }

    #[test]
    fn test_non_document_records_rejected() {
        let none: Option<TestStruct> = None;
        assert!(matches!(
            to_ordered_document(&none),
            Err(DocMongoError::Serialization(_))
        ));
        assert!(to_unordered_document(&42).is_err());
    }

    #[test]
    fn test_struct_to_unordered_document() {
        let record = TestStruct {
            field1: "value1".to_string(),
            field2: 123,
        };
        let map = to_unordered_document(&record).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("field1"), Some(&Bson::String("value1".into())));
        assert_eq!(map.get("field2"), Some(&Bson::Int32(123)));
    }

    #[test]
    fn test_ordered_from_map_sorts_keys() {
        let mut map = DocMap::new();
        map.insert("age".into(), Bson::Int32(25));
        map.insert("name".into(), Bson::String("Alice".into()));
        map.insert("active".into(), Bson::Boolean(true));

        let doc = ordered_from_map(&map);
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["active", "age", "name"]);
        assert_eq!(doc.get_bool("active").unwrap(), true);
    }

    #[test]
    fn test_map_record_to_ordered_document_is_sorted() {
        let mut map = DocMap::new();
        for (i, key) in ["age", "name", "active", "zeta", "beta", "email"]
            .into_iter()
            .enumerate()
        {
            map.insert(key.into(), Bson::Int32(i as i32));
        }

        let doc = to_ordered_document(&map).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["active", "age", "beta", "email", "name", "zeta"]);
        assert_eq!(doc, ordered_from_map(&map));
    }

    #[test]
    fn test_filter_fields() {
        let data = sample();

        let filtered = filter_fields(&data, &["name", "email"]);
        let mut expected = DocMap::new();
        expected.insert("name".into(), Bson::String("John Doe".into()));
        expected.insert("email".into(), Bson::String("john@example.com".into()));
        assert_eq!(filtered, expected);

        let empty: [&str; 0] = [];
        assert!(filter_fields(&data, &empty).is_empty());

        let filtered = filter_fields(&data, &["name", "phone"]);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("name"));
        assert!(!filtered.contains_key("phone"));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let original = Bson::Document(doc! {
            "level1": {
                "level2": {
                    "level3": [1, { "tag": "a" }, [2, 3]],
                },
                "list": ["x", "y"],
            },
            "flat": 5,
        });

        let mut copy = deep_copy(&original);
        assert_eq!(copy, original);

        if let Bson::Document(root) = &mut copy {
            let level3 = root
                .get_document_mut("level1")
                .unwrap()
                .get_document_mut("level2")
                .unwrap()
                .get_array_mut("level3")
                .unwrap();
            if let Bson::Document(tagged) = &mut level3[1] {
                tagged.insert("tag", "changed");
            }
            level3.push(Bson::Int32(99));
        }

        assert_ne!(copy, original);
        let level3 = original
            .as_document()
            .unwrap()
            .get_document("level1")
            .unwrap()
            .get_document("level2")
            .unwrap()
            .get_array("level3")
            .unwrap();
        assert_eq!(level3.len(), 3);
        assert_eq!(level3[1], Bson::Document(doc! { "tag": "a" }));
    }

    #[test]
    fn test_deep_copy_map() {
        let mut map = sample();
        map.insert("tags".into(), Bson::Array(vec![Bson::Document(doc! { "k": 1 })]));

        let mut copy = deep_copy_map(&map);
        assert_eq!(copy, map);

        if let Some(Bson::Array(tags)) = copy.get_mut("tags") {
            tags.clear();
        }
        assert_eq!(
            map.get("tags"),
            Some(&Bson::Array(vec![Bson::Document(doc! { "k": 1 })]))
        );
    }

    #[test]
    fn test_has_key() {
        let data = sample();
        assert!(has_key(Some(&data), "name"));
        assert!(!has_key(Some(&data), "phone"));
        assert!(!has_key(Some(&DocMap::new()), "name"));
        assert!(!has_key(Some(&DocMap::new()), ""));
        assert!(!has_key(None, "name"));
    }

    #[test]
    fn test_object_id_from_hex() {
        let oid = object_id_from_hex("65f1a2b3c4d5e6f708192a3b").unwrap();
        assert_eq!(oid.to_hex(), "65f1a2b3c4d5e6f708192a3b");

        let err = object_id_from_hex("not-an-id").unwrap_err();
        assert!(matches!(err, DocMongoError::InvalidObjectId(_)));
    }

    proptest! {
        #[test]
        fn prop_filter_fields_is_intersection(
            source in prop::collection::hash_map("[a-e]{1,2}", any::<i32>(), 0..8),
            keep in prop::collection::vec("[a-e]{1,2}", 0..8),
        ) {
            let data: DocMap = source
                .iter()
                .map(|(k, v)| (k.clone(), Bson::Int32(*v)))
                .collect();
            let filtered = filter_fields(&data, &keep);

            for (key, value) in &filtered {
                prop_assert!(keep.contains(key));
                prop_assert_eq!(data.get(key), Some(value));
            }
            for key in &keep {
                prop_assert_eq!(filtered.contains_key(key), data.contains_key(key));
            }
        }

        #[test]
        fn prop_ordered_from_map_is_sorted(
            source in prop::collection::hash_map("[a-z]{1,6}", any::<i64>(), 0..16),
        ) {
            let map: DocMap = source
                .iter()
                .map(|(k, v)| (k.clone(), Bson::Int64(*v)))
                .collect();
            let doc = ordered_from_map(&map);
            let keys: Vec<&String> = doc.keys().collect();

            prop_assert_eq!(keys.len(), map.len());
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
