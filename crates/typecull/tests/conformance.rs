// Property tests for pruning soundness.
//
// A small conformance checker accepts or rejects JSON values against a set
// of declarations, so soundness becomes checkable: every value accepted by
// a pruned schema must be accepted by the schema it was pruned from. The
// checker is test support only. It substitutes generic arguments into
// parameter positions and gives up at a fixed depth, so uninhabitable
// reference cycles reject instead of looping.

use std::collections::HashMap;

use serde_json::{json, Value};
use typecull::{
    Declaration, Field, LiteralValue, PrimitiveKind, Pruned, Query, Schema, SpecialKind, TypeExpr,
};

const MENU: &str = include_str!("menu/comprehensive.ts");

const MAX_DEPTH: usize = 64;

fn menu() -> Schema {
    Schema::load(MENU).expect("menu should load")
}

fn decl_map<'a>(decls: impl Iterator<Item = &'a Declaration>) -> HashMap<&'a str, &'a Declaration> {
    decls.map(|decl| (decl.name.as_str(), decl)).collect()
}

fn pruned_accepts(pruned: &Pruned, value: &Value) -> bool {
    let map = decl_map(pruned.iter());
    let root = map[pruned.root()];
    check(&map, &root.body, value, MAX_DEPTH)
}

fn schema_accepts(schema: &Schema, root: &str, value: &Value) -> bool {
    let map = decl_map(schema.graph().iter());
    let root = map[root];
    check(&map, &root.body, value, MAX_DEPTH)
}

/// Replace references to bound parameters with their argument expressions.
fn substitute(expr: &TypeExpr, env: &HashMap<String, TypeExpr>) -> TypeExpr {
    match expr {
        TypeExpr::Reference { name, args } => match env.get(name) {
            Some(bound) => bound.clone(),
            None => TypeExpr::Reference {
                name: name.clone(),
                args: args.iter().map(|arg| substitute(arg, env)).collect(),
            },
        },
        TypeExpr::Union { members } => TypeExpr::Union {
            members: members.iter().map(|m| substitute(m, env)).collect(),
        },
        TypeExpr::Struct { fields } => TypeExpr::Struct {
            fields: fields
                .iter()
                .map(|field| Field {
                    name: field.name.clone(),
                    optional: field.optional,
                    ty: substitute(&field.ty, env),
                })
                .collect(),
        },
        TypeExpr::Array { element } => TypeExpr::Array {
            element: Box::new(substitute(element, env)),
        },
        other => other.clone(),
    }
}

fn check(map: &HashMap<&str, &Declaration>, expr: &TypeExpr, value: &Value, depth: usize) -> bool {
    if depth == 0 {
        return false;
    }
    match expr {
        TypeExpr::Literal {
            value: LiteralValue::Str(text),
        } => value.as_str() == Some(text.as_str()),
        TypeExpr::Literal {
            value: LiteralValue::Num(spelling),
        } => match (value.as_f64(), spelling.parse::<f64>()) {
            (Some(have), Ok(want)) => have == want,
            _ => false,
        },
        TypeExpr::Template { label, .. } => value.as_str() == Some(label.as_str()),
        TypeExpr::Special(SpecialKind::Any) => true,
        TypeExpr::Special(SpecialKind::Never) => false,
        TypeExpr::Special(SpecialKind::Choose) => value.as_str() == Some("CHOOSE"),
        TypeExpr::Primitive(PrimitiveKind::String) => value.is_string(),
        TypeExpr::Primitive(PrimitiveKind::Number) => value.is_number(),
        TypeExpr::Primitive(PrimitiveKind::Boolean) => value.is_boolean(),
        TypeExpr::Primitive(PrimitiveKind::True) => value == &Value::Bool(true),
        TypeExpr::Primitive(PrimitiveKind::False) => value == &Value::Bool(false),
        TypeExpr::Union { members } => members.iter().any(|m| check(map, m, value, depth - 1)),
        TypeExpr::Struct { fields } => {
            let object = match value.as_object() {
                Some(object) => object,
                None => return false,
            };
            // Structs are closed: an unknown key rejects the value.
            if object.keys().any(|key| fields.iter().all(|f| f.name != *key)) {
                return false;
            }
            fields.iter().all(|field| match object.get(&field.name) {
                Some(inner) => check(map, &field.ty, inner, depth - 1),
                None => field.optional,
            })
        }
        TypeExpr::Array { element } => value
            .as_array()
            .map_or(false, |items| items.iter().all(|v| check(map, element, v, depth - 1))),
        TypeExpr::Reference { name, args } => {
            let decl = match map.get(name.as_str()) {
                Some(decl) => decl,
                None => return false,
            };
            let env: HashMap<String, TypeExpr> = decl
                .params
                .iter()
                .map(|p| p.name.clone())
                .zip(args.iter().cloned())
                .collect();
            let body = substitute(&decl.body, &env);
            check(map, &body, value, depth - 1)
        }
    }
}

#[test]
fn test_pruned_schema_accepts_its_own_values() {
    let pruned = menu()
        .prune(&Query::new("classic meal large coke"))
        .expect("prune should succeed");

    let order = json!({
        "items": [{
            "name": "Classic Meal",
            "size": "Large",
            "sandwich": "CHOOSE",
            "fries": "CHOOSE",
            "drink": "CHOOSE"
        }]
    });
    assert!(pruned_accepts(&pruned, &order));

    // The chicken line was culled, and the fountain drink branch demands a
    // size, so this item fits no surviving member.
    let off_menu = json!({ "items": [{ "name": "Pesto Chicken Sandwich" }] });
    assert!(!pruned_accepts(&pruned, &off_menu));
}

#[test]
fn test_soundness_against_the_full_schema() {
    let schema = menu();
    let cases = [
        (
            "classic meal large coke",
            json!({
                "items": [{
                    "name": "Classic Meal",
                    "size": "Large",
                    "sandwich": "CHOOSE",
                    "fries": "CHOOSE",
                    "drink": "CHOOSE"
                }]
            }),
        ),
        (
            "fries",
            json!({ "items": [{ "name": "French Fries", "size": "CHOOSE" }] }),
        ),
        (
            "",
            json!({ "items": [{ "name": "Smashburger", "type": "CHOOSE" }] }),
        ),
    ];
    for (phrase, value) in &cases {
        let pruned = schema
            .prune(&Query::new(*phrase))
            .expect("prune should succeed");
        assert!(
            pruned_accepts(&pruned, value),
            "pruned schema for {:?} should accept its value",
            phrase
        );
        assert!(
            schema_accepts(&schema, "Cart", value),
            "full schema should accept the value for {:?}",
            phrase
        );
    }
}

#[test]
fn test_pruning_rejects_culled_branches() {
    let schema = menu();
    let shake = json!({ "items": [{ "name": "Chocolate Shake", "size": "Large" }] });

    // Valid against the full menu through Shake<any, any>.
    assert!(schema_accepts(&schema, "Cart", &shake));

    let pruned = schema
        .prune(&Query::new("fries"))
        .expect("prune should succeed");
    assert!(!pruned_accepts(&pruned, &shake));
}

#[test]
fn test_pin_and_choose_invariance() {
    // CHOOSE survives the empty query wherever it appeared.
    let pruned = menu()
        .prune(&Query::new("").with_root("FrySizes"))
        .expect("prune should succeed");
    assert!(pruned_accepts(&pruned, &json!("CHOOSE")));
    assert!(!pruned_accepts(&pruned, &json!("Small")));

    // So does a pinned template, while its unpinned sibling is culled.
    let schema = Schema::load(r#"type Drinks=LITERAL<"Coca-Cola",["coke"],true>|"Sprite";"#)
        .expect("schema should load");
    let pruned = schema.prune(&Query::default()).expect("prune should succeed");
    assert!(pruned_accepts(&pruned, &json!("Coca-Cola")));
    assert!(!pruned_accepts(&pruned, &json!("Sprite")));
}

#[test]
fn test_enlarging_the_query_is_monotonic() {
    let schema = menu();
    let narrow = schema
        .prune(&Query::new("fries"))
        .expect("prune should succeed");
    let wide = schema
        .prune(&Query::new("fries coke"))
        .expect("prune should succeed");

    let wide_names: Vec<&str> = wide.iter().map(|d| d.name.as_str()).collect();
    for decl in narrow.iter() {
        assert!(
            wide_names.contains(&decl.name.as_str()),
            "{} was kept under the smaller query but lost under the larger",
            decl.name
        );
    }

    let basket = json!({ "items": [{ "name": "French Fries", "size": "CHOOSE" }] });
    assert!(pruned_accepts(&narrow, &basket));
    assert!(pruned_accepts(&wide, &basket));
}

#[test]
fn test_recursive_schemas_validate_to_finite_depth() {
    let schema =
        Schema::load("type Tree={label:\"node\",children:Tree[]};").expect("schema should load");
    let pruned = schema
        .prune(&Query::new("node"))
        .expect("prune should succeed");
    let tree = json!({
        "label": "node",
        "children": [{ "label": "node", "children": [] }]
    });
    assert!(pruned_accepts(&pruned, &tree));

    // A pure reference cycle is uninhabitable; the depth cutoff rejects
    // every value instead of recursing forever.
    let schema = Schema::load("type a=b;\ntype b=a;").expect("schema should load");
    let pruned = schema
        .prune(&Query::new("anything"))
        .expect("prune should succeed");
    assert!(!pruned_accepts(&pruned, &json!(1)));
}

#[test]
fn test_wildcard_arguments_survive_untouched() {
    let schema = Schema::load(
        "type Root=Gift<any>|\"card\";\ntype Gift<K>={kind:K,label:\"mug\"|\"shirt\"};",
    )
    .expect("schema should load");
    let pruned = schema
        .prune(&Query::new("mug card"))
        .expect("prune should succeed");

    // The wildcard argument is exactly as written, while the body outside
    // the parameter's scope still narrowed.
    let root = pruned.get("Root").expect("Root should survive");
    match &root.body {
        TypeExpr::Union { members } => {
            assert_eq!(
                members[0],
                TypeExpr::Reference {
                    name: "Gift".to_string(),
                    args: vec![TypeExpr::Special(SpecialKind::Any)],
                }
            );
        }
        other => panic!("expected union, got {:?}", other),
    }

    let mug = json!({ "kind": [1, 2, 3], "label": "mug" });
    assert!(pruned_accepts(&pruned, &mug));
    assert!(schema_accepts(&schema, "Root", &mug));

    let shirt = json!({ "kind": 1, "label": "shirt" });
    assert!(!pruned_accepts(&pruned, &shirt));
    assert!(schema_accepts(&schema, "Root", &shirt));
}
