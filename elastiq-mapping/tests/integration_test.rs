//! Integration tests for elastiq-mapping

use elastiq_mapping::prelude::*;
use serde_json::{Value, json};

fn object_keys(value: &Value) -> Vec<String> {
    value.as_object().unwrap().keys().cloned().collect()
}

#[test]
fn test_setters_write_only_what_was_set() {
    let mut mapping = Mapping::new("t");
    mapping.text("title").analyzer("english");
    mapping.keyword("sku").doc_values(false);
    mapping.long("views");
    mapping.date("published_at").format("strict_date_optional_time");
    mapping.geo_point("location").ignore_malformed(true);
    mapping.dense_vector("embedding", 8);

    let properties = mapping.get_properties();
    assert_eq!(properties["title"], json!({ "type": "text", "analyzer": "english" }));
    assert_eq!(properties["sku"], json!({ "type": "keyword", "doc_values": false }));
    assert_eq!(properties["views"], json!({ "type": "long" }));
    assert_eq!(
        properties["published_at"],
        json!({ "type": "date", "format": "strict_date_optional_time" })
    );
    assert_eq!(
        properties["location"],
        json!({ "type": "geo_point", "ignore_malformed": true })
    );
    assert_eq!(properties["embedding"], json!({ "type": "dense_vector", "dims": 8 }));
}

#[test]
fn test_no_option_is_ever_null() {
    fn assert_no_nulls(value: &Value) {
        match value {
            Value::Null => panic!("null in mapping payload"),
            Value::Object(map) => map.values().for_each(assert_no_nulls),
            Value::Array(items) => items.iter().for_each(assert_no_nulls),
            _ => {}
        }
    }

    let mut mapping = Mapping::new("all");
    for field_type in FieldType::ALL {
        if mapping.add_field(field_type.as_str(), field_type.as_str()).is_err() {
            // Types with required constructor parameters.
            assert!(matches!(
                field_type,
                FieldType::ScaledFloat
                    | FieldType::DenseVector
                    | FieldType::Alias
                    | FieldType::TokenCount
            ));
        }
    }
    mapping.scaled_float("scaled_float", 10.0);
    mapping.dense_vector("dense_vector", 4);
    mapping.alias("alias", "text");
    mapping.token_count("token_count", "standard");

    assert_eq!(mapping.properties().len(), FieldType::ALL.len());
    assert_no_nulls(&mapping.body());

    for field in mapping.properties() {
        assert_eq!(
            field.to_json()["type"],
            Value::String(field.name().to_string())
        );
    }
}

#[test]
fn test_composite_properties_key_presence() {
    let mut mapping = Mapping::new("people");
    mapping.object("empty_object");
    mapping.nested("empty_nested");
    let address = mapping.object("address");
    address.keyword("city");
    address.keyword("zip");
    address.geo_point("location");

    let properties = mapping.get_properties();
    assert_eq!(properties["empty_object"], json!({ "type": "object" }));
    assert_eq!(properties["empty_nested"], json!({ "type": "nested" }));
    assert_eq!(
        object_keys(&properties["address"]["properties"]),
        vec!["city", "zip", "location"]
    );
}

#[test]
fn test_deeply_nested_tree() {
    let mut mapping = Mapping::new("orders");
    let items = mapping.nested("items");
    items.keyword("sku");
    let options = items.nested("options");
    options.keyword("name");
    options.object("value").text("label").analyzer("simple");

    assert_eq!(
        mapping.get_properties(),
        json!({
            "items": {
                "type": "nested",
                "properties": {
                    "sku": { "type": "keyword" },
                    "options": {
                        "type": "nested",
                        "properties": {
                            "name": { "type": "keyword" },
                            "value": {
                                "type": "object",
                                "properties": {
                                    "label": { "type": "text", "analyzer": "simple" }
                                }
                            }
                        }
                    }
                }
            }
        })
    );
}

#[test]
fn test_create_and_update_payloads() {
    let mut mapping = Mapping::new("articles");
    mapping
        .shards(2)
        .replicas(1)
        .analysis(json!({ "analyzer": { "folded": { "type": "custom", "tokenizer": "standard", "filter": ["asciifolding"] } } }));
    mapping.text("body").analyzer("folded");
    mapping
        .keyword("tag")
        .fields()
        .text("search")
        .analyzer("standard");

    let body = mapping.body();
    assert_eq!(body["index"], "articles");
    assert_eq!(body["body"]["settings"]["number_of_shards"], 2);
    assert_eq!(body["body"]["mappings"]["dynamic"], "strict");
    assert_eq!(
        body["body"]["mappings"]["properties"]["tag"],
        json!({
            "type": "keyword",
            "fields": { "search": { "type": "text", "analyzer": "standard" } }
        })
    );

    let update = mapping.update_body();
    assert_eq!(object_keys(&update), vec!["index", "body"]);
    assert_eq!(object_keys(&update["body"]), vec!["properties"]);
    assert_eq!(
        update["body"]["properties"],
        body["body"]["mappings"]["properties"]
    );
}

#[test]
fn test_read_back_from_store_format() {
    let stored = json!({
        "title": { "type": "text", "analyzer": "english", "fields": { "raw": { "type": "keyword" } } },
        "price": { "type": "scaled_float", "scaling_factor": 100.0 },
        "author": {
            "properties": {
                "name": { "type": "keyword" }
            }
        }
    });

    let properties = Properties::from_json(&stored).unwrap();
    assert_eq!(properties.len(), 3);
    assert_eq!(properties.get("author").unwrap().field_type(), FieldType::Object);

    let mut expected = stored.clone();
    expected["author"]["type"] = json!("object");
    let reserialized = properties.to_json();
    assert_eq!(reserialized["title"], expected["title"]);
    assert_eq!(reserialized["price"], expected["price"]);
    assert_eq!(
        reserialized["author"]["properties"],
        expected["author"]["properties"]
    );
}

#[test]
fn test_invalid_options_rejected_per_type() {
    let mut mapping = Mapping::new("t");
    let mut options = serde_json::Map::new();
    options.insert("analyzer".to_string(), json!("english"));

    assert!(
        mapping
            .property("count", FieldType::Integer, options.clone())
            .is_err()
    );
    assert!(mapping.property("title", FieldType::Text, options).is_ok());
    assert_eq!(mapping.properties().len(), 1);
}
