//! Integration tests for self-link derivation.

use hyper_schema_defs::{
    derive_artifacts, derive_with_defaults, ArtifactKind, CompileError, Context, DefInput,
    Derivation, DeriveError, DeriveOptions, DiagnosticCode, JsonSchemaCompiler,
    KeywordIntrospector, ValidationCheck,
};
use serde_json::{json, Value};

fn derive(root: &Value) -> (Derivation, Context) {
    let mut context = Context::new("Widget");
    let derivation = derive_artifacts(
        root,
        &JsonSchemaCompiler::new(),
        &KeywordIntrospector,
        &mut context,
    )
    .unwrap();
    (derivation, context)
}

fn widget() -> Value {
    json!({
        "title": "Widget",
        "type": "object",
        "links": [{
            "rel": "self",
            "href": "/widgets/{id}",
            "hrefSchema": {
                "type": "object",
                "properties": { "id": { "type": "integer", "minimum": 1 } },
                "required": ["id"]
            },
            "headerSchema": { "X-Key": { "type": "string" } },
            "submissionSchema": {
                "type": "object",
                "properties": { "name": { "type": "string" } },
                "required": ["name"],
                "examples": [{ "name": "sprocket" }]
            },
            "targetHints": { "X-Status": ["ok", "error"] },
            "targetSchema": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer" },
                    "name": { "type": "string" }
                },
                "default": { "id": 1, "name": "sprocket" }
            }
        }]
    })
}

// === Link Selection ===

mod selection {
    use super::*;

    #[test]
    fn no_links_yield_nothing() {
        let (derivation, context) = derive(&json!({ "type": "object" }));
        assert!(derivation.records.is_empty());
        assert!(derivation.diagnostics.is_empty());
        assert!(context.warnings().is_empty());
    }

    #[test]
    fn empty_links_yield_nothing() {
        let (derivation, _) = derive(&json!({ "links": [] }));
        assert!(derivation.records.is_empty());
        assert!(derivation.diagnostics.is_empty());
    }

    #[test]
    fn several_self_links_yield_nothing_with_one_diagnostic() {
        let (derivation, context) = derive(&json!({ "links": [
            { "rel": "self", "href": "/widgets/{id}" },
            { "rel": "self", "href": "/gadgets/{id}" },
            { "rel": "collection", "href": "/widgets" }
        ]}));
        assert!(derivation.records.is_empty());
        assert_eq!(derivation.diagnostics.len(), 1);
        assert_eq!(
            derivation.diagnostics[0].code,
            DiagnosticCode::AmbiguousSelfLink
        );
        assert!(derivation.diagnostics[0].message.contains(r#"rel="self""#));
        assert_eq!(context.warnings().len(), 1);
        assert!(context.imports().is_empty());
    }

    #[test]
    fn mixed_relations_match_single_self_link() {
        let mut mixed = widget();
        mixed["links"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "rel": "collection", "href": "/widgets" }));

        let (alone, _) = derive(&widget());
        let (with_others, _) = derive(&mixed);

        assert_eq!(with_others.records, alone.records);
        assert!(alone.diagnostics.is_empty());
        assert_eq!(with_others.diagnostics.len(), 1);
        assert_eq!(
            with_others.diagnostics[0].code,
            DiagnosticCode::UnsupportedRelation
        );
    }

    #[test]
    fn malformed_links_abort() {
        let mut context = Context::new("Widget");
        let err = derive_artifacts(
            &json!({ "links": "self" }),
            &JsonSchemaCompiler::new(),
            &KeywordIntrospector,
            &mut context,
        )
        .unwrap_err();
        assert!(matches!(err, DeriveError::InvalidLinks { .. }));
    }
}

// === Records ===

mod records {
    use super::*;

    #[test]
    fn six_records_in_fixed_order() {
        let (derivation, _) = derive(&widget());
        let kinds: Vec<ArtifactKind> = derivation.records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, ArtifactKind::ALL);

        let names: Vec<&str> = derivation.records.iter().map(|r| r.export_name()).collect();
        assert_eq!(
            names,
            [
                "Widget_HrefTemplate",
                "Widget_HrefVariables",
                "Widget_RequestHeaders",
                "Widget_RequestBody",
                "Widget_ResponseHeaders",
                "Widget_ResponseBody",
            ]
        );
        assert!(derivation.records.iter().all(|r| r.dec.exported));
    }

    #[test]
    fn titles_and_descriptions() {
        let (derivation, _) = derive(&widget());
        let titles: Vec<&str> = derivation
            .records
            .iter()
            .map(|r| r.meta.title.as_str())
            .collect();
        assert_eq!(
            titles,
            [
                "Href Template",
                "Href Variables",
                "Request Headers",
                "Request Body",
                "Response Headers",
                "Response Body",
            ]
        );
        assert_eq!(
            derivation.records[3].meta.description,
            "Request body format as described by hyper schema submissionSchema."
        );
    }

    #[test]
    fn examples_and_defaults_come_from_fragments() {
        let (derivation, _) = derive(&widget());
        let template = derivation.get(ArtifactKind::HrefTemplate).unwrap();
        assert_eq!(template.meta.examples, vec![json!("/widgets/{id}")]);
        assert_eq!(template.meta.default_value, Some(json!("/widgets/{id}")));

        let body = derivation.get(ArtifactKind::RequestBody).unwrap();
        assert_eq!(body.meta.examples, vec![json!({ "name": "sprocket" })]);
        assert_eq!(body.meta.default_value, None);

        let response = derivation.get(ArtifactKind::ResponseBody).unwrap();
        assert_eq!(
            response.meta.default_value,
            Some(json!({ "id": 1, "name": "sprocket" }))
        );
    }

    #[test]
    fn import_declared_once() {
        let (_, context) = derive(&widget());
        assert_eq!(context.imports(), ["use jsonschema::Validator;"]);
    }

    #[test]
    fn idempotent_with_fresh_context() {
        let (first, _) = derive(&widget());
        let (second, _) = derive(&widget());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn input_not_mutated() {
        let root = widget();
        let before = root.clone();
        derive(&root);
        assert_eq!(root, before);
    }
}

// === Run-time Checks ===

mod checks {
    use super::*;

    #[test]
    fn href_template_accepts_only_the_template() {
        let (derivation, _) = derive(&widget());
        let check = &derivation.get(ArtifactKind::HrefTemplate).unwrap().dec.check;
        assert!(check.is_valid(&json!("/widgets/{id}")));
        assert!(!check.is_valid(&json!("/widgets/7")));
        assert!(!check.is_valid(&json!("")));
    }

    #[test]
    fn request_headers_all_required_extra_allowed() {
        let (derivation, _) = derive(&widget());
        let record = derivation.get(ArtifactKind::RequestHeaders).unwrap();
        assert_eq!(record.fragment()["required"], json!(["X-Key"]));

        let check = &record.dec.check;
        assert!(!check.is_valid(&json!({})));
        assert!(!check.is_valid(&json!({ "Accept": "text/plain" })));
        assert!(check.is_valid(&json!({ "X-Key": "abc", "X-Extra": "1" })));
    }

    #[test]
    fn response_headers_enforce_hints() {
        let (derivation, _) = derive(&widget());
        let check = &derivation
            .get(ArtifactKind::ResponseHeaders)
            .unwrap()
            .dec
            .check;
        assert!(check.is_valid(&json!({ "X-Status": "ok" })));
        assert!(check.is_valid(&json!({ "X-Status": "error", "Date": "today" })));
        assert!(!check.is_valid(&json!({ "X-Status": "unknown" })));
        assert!(!check.is_valid(&json!({})));
    }

    #[test]
    fn verbatim_fragments_validate_as_written() {
        let (derivation, _) = derive(&widget());
        let vars = &derivation.get(ArtifactKind::HrefVariables).unwrap().dec.check;
        assert!(vars.is_valid(&json!({ "id": 3 })));
        assert!(!vars.is_valid(&json!({ "id": 0 })));

        let body = &derivation.get(ArtifactKind::RequestBody).unwrap().dec.check;
        assert!(body.validate(&json!({ "name": "sprocket" })).is_ok());
        assert!(body.validate(&json!({})).is_err());
    }

    #[test]
    fn declared_types_are_branded() {
        let (derivation, _) = derive(&widget());
        let headers = derivation.get(ArtifactKind::ResponseHeaders).unwrap();
        assert_eq!(
            headers.dec.declared_type.to_string(),
            r#"Brand<{ "X-Status": "ok" | "error"; [key: string]: unknown; }, "Widget_ResponseHeaders">"#
        );
    }

    #[test]
    fn bare_self_link_produces_permissive_checks() {
        let (derivation, _) = derive(&json!({ "links": [{ "rel": "self", "href": "/" }] }));
        assert_eq!(derivation.records.len(), 6);
        for kind in [
            ArtifactKind::HrefVariables,
            ArtifactKind::RequestHeaders,
            ArtifactKind::RequestBody,
            ArtifactKind::ResponseHeaders,
            ArtifactKind::ResponseBody,
        ] {
            let check = &derivation.get(kind).unwrap().dec.check;
            assert!(check.is_valid(&json!({})), "{kind} should accept an empty object");
        }
    }

    #[test]
    fn unsupported_fragment_aborts_run() {
        let root = json!({ "links": [{
            "rel": "self",
            "href": "/",
            "submissionSchema": { "type": "date" }
        }]});
        let mut context = Context::new("Widget");
        let err = derive_artifacts(
            &root,
            &JsonSchemaCompiler::new(),
            &KeywordIntrospector,
            &mut context,
        )
        .unwrap_err();
        match err {
            DeriveError::Compile(CompileError::Unsupported { export_name, .. }) => {
                assert_eq!(export_name, "Widget_RequestBody");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_reference_checks_against_document() {
        let root = json!({
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "integer" } },
            "links": [{ "rel": "self", "href": "/widgets/{id}", "targetSchema": { "$ref": "#" } }]
        });
        let (derivation, _) = derive_with_defaults(&root, &DeriveOptions::new("Widget")).unwrap();
        let body = derivation.get(ArtifactKind::ResponseBody).unwrap();

        assert_eq!(body.fragment(), &json!({ "$ref": "#" }));
        assert_eq!(
            body.dec.declared_type.to_string(),
            r#"Brand<Widget, "Widget_ResponseBody">"#
        );
        assert!(body.dec.check.is_valid(&json!({ "id": 7 })));
        assert!(!body.dec.check.is_valid(&json!({})));
        assert!(!body.dec.check.is_valid(&json!({ "id": "seven" })));
    }

    #[test]
    fn definition_reference_checks_against_document() {
        let root = json!({
            "definitions": {
                "Widget": {
                    "type": "object",
                    "properties": { "name": { "type": "string" } },
                    "required": ["name"]
                }
            },
            "links": [{
                "rel": "self",
                "href": "/widgets",
                "submissionSchema": { "$ref": "#/definitions/Widget" }
            }]
        });
        let (derivation, _) = derive_with_defaults(&root, &DeriveOptions::new("Widget")).unwrap();
        let body = derivation.get(ArtifactKind::RequestBody).unwrap();

        assert!(body.dec.check.is_valid(&json!({ "name": "sprocket" })));
        assert!(!body.dec.check.is_valid(&json!({ "name": 1 })));
    }

    #[test]
    fn local_reference_needs_a_document() {
        let root = json!({
            "required": ["id"],
            "links": [{ "rel": "self", "href": "/", "targetSchema": { "$ref": "#" } }]
        });
        let mut context = Context::new("Widget");
        let err = derive_artifacts(
            &root,
            &JsonSchemaCompiler::new(),
            &KeywordIntrospector,
            &mut context,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DeriveError::Compile(CompileError::Unsupported { .. })
        ));
    }
}

// === Threading ===

#[test]
fn pipeline_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Derivation>();
    assert_send_sync::<DefInput>();
    assert_send_sync::<ValidationCheck>();
    assert_send_sync::<Context>();
    assert_send_sync::<JsonSchemaCompiler>();
    assert_send_sync::<KeywordIntrospector>();
    assert_send_sync::<DeriveError>();
}
