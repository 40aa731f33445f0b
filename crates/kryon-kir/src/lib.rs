//! The `.kir` JSON serialization of a built [`kryon_ir::Ir`] (§4.9): a
//! stable, versioned on-disk shape for tooling, diffing, and inter-compiler
//! exchange, independent of the binary KRB format.

mod document;
mod error;
mod metadata;

pub use document::{from_document, to_document, KirDocument, RootNode, CURRENT_MAJOR, CURRENT_MINOR, FORMAT_TAG};
pub use error::KirError;
pub use metadata::{Metadata, Statistics};

use kryon_ir::Ir;

/// Serializes `ir` to pretty-printed `.kir` JSON.
pub fn to_json(ir: &Ir, metadata: Metadata) -> Result<String, KirError> {
    let doc = to_document(ir, metadata);
    serde_json::to_string_pretty(&doc).map_err(KirError::Serialize)
}

/// Parses a `.kir` JSON document back into an [`Ir`].
pub fn from_json(json: &str) -> Result<Ir, KirError> {
    let doc: KirDocument = serde_json::from_str(json).map_err(KirError::Deserialize)?;
    from_document(doc)
}

#[cfg(test)]
mod tests {
    use kryon_ir::{Element, Value};

    use super::*;

    fn sample_ir() -> Ir {
        let mut ir = Ir::empty();
        let button = ir.strings.intern("Button");
        let label = ir.strings.intern("label");
        let mut el = Element::new(ir.next_node_id(), button);
        el.properties.insert(label, kryon_ir::Expression::Literal(Value::String(ir.strings.intern("Go"))));
        ir.root.push(el);
        ir
    }

    #[test]
    fn round_trips_through_json() {
        let ir = sample_ir();
        let json = to_json(&ir, Metadata { compiler: "kryon-compiler".to_string(), ..Metadata::default() }).unwrap();
        assert!(json.contains("\"format\": \"kir-json\""));
        assert!(json.contains("\"type\": \"ROOT\""));

        let decoded = from_json(&json).unwrap();
        assert_eq!(decoded.root.len(), 1);
        assert_eq!(decoded.strings.get(decoded.root[0].element_type_index), Some("Button"));
    }

    #[test]
    fn empty_document_has_one_root_node_and_no_children() {
        let ir = Ir::empty();
        let json = to_json(&ir, Metadata::default()).unwrap();
        let decoded = from_json(&json).unwrap();
        assert!(decoded.root.is_empty());
    }

    #[test]
    fn wrong_format_tag_is_rejected() {
        let ir = Ir::empty();
        let doc = to_document(&ir, Metadata::default());
        let mut json: serde_json::Value = serde_json::to_value(&doc).unwrap();
        json["format"] = serde_json::Value::String("not-kir".to_string());
        let err = from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, KirError::WrongFormat(_)));
    }

    #[test]
    fn unsupported_major_version_is_rejected() {
        let ir = Ir::empty();
        let doc = to_document(&ir, Metadata::default());
        let mut json: serde_json::Value = serde_json::to_value(&doc).unwrap();
        json["version"] = serde_json::Value::String("99.0".to_string());
        let err = from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, KirError::UnsupportedMajorVersion { found: 99, .. }));
    }

    #[test]
    fn mismatched_minor_version_is_tolerated() {
        let ir = sample_ir();
        let doc = to_document(&ir, Metadata::default());
        let mut json: serde_json::Value = serde_json::to_value(&doc).unwrap();
        json["version"] = serde_json::Value::String(format!("{CURRENT_MAJOR}.999"));
        let decoded = from_json(&json.to_string()).unwrap();
        assert_eq!(decoded.root.len(), 1);
    }

    #[test]
    fn unknown_fields_are_ignored_rather_than_rejected() {
        let ir = sample_ir();
        let doc = to_document(&ir, Metadata::default());
        let mut json: serde_json::Value = serde_json::to_value(&doc).unwrap();
        json["totallyNewField"] = serde_json::Value::Bool(true);
        assert!(from_json(&json.to_string()).is_ok());
    }
}
