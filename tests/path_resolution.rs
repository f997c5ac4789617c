use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use typed_optional::datatype::{Array, Indexable, Key, Object, Value};
use typed_optional::path::{Fallback, PathSpec, Segment, resolve, resolve_or};
use typed_optional::settings::PathSettings;

fn doc(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn get(root: &Value, path: &str) -> Value {
    resolve(root, &PathSpec::parse(path))
}

#[derive(Debug)]
struct Registry {
    entries: Vec<(String, Value)>,
    label: &'static str,
}
impl Indexable for Registry {
    fn offset_exists(&self, key: &Key) -> bool {
        let name = key.to_string();
        self.entries.iter().any(|(n, _)| *n == name)
    }
    fn offset_get(&self, key: &Key) -> Option<Value> {
        let name = key.to_string();
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v.clone())
    }
    fn property(&self, name: &str) -> Option<Value> {
        (name == "label").then(|| Value::from(self.label))
    }
}

#[test]
fn nested_keys_resolve_to_the_leaf() {
    let root = doc(json!({"foo": {"bar": "baz"}}));
    assert_eq!(get(&root, "foo.bar"), Value::from("baz"));
    assert_eq!(get(&root, "foo.missing"), Value::Null);
    assert_eq!(get(&root, "foo.bar.deeper"), Value::Null, "scalars cannot be descended into");
}

#[test]
fn empty_path_returns_the_root() {
    let root = doc(json!({"foo": 1}));
    assert!(PathSpec::parse("").is_root());
    assert_eq!(resolve(&root, &PathSpec::root()), root);
    assert_eq!(get(&root, ""), root);
}

#[test]
fn misses_produce_the_fallback() {
    let root = doc(json!({"foo": {"bar": "baz"}}));
    let path = PathSpec::parse("foo.qux");
    assert_eq!(resolve_or(&root, &path, &Fallback::from(Value::from("none"))), Value::from("none"));

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let supplier = Fallback::supplier(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Value::from(0)
    });
    assert_eq!(resolve_or(&root, &PathSpec::parse("foo.bar"), &supplier), Value::from("baz"));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "supplier must stay lazy on a hit");
    assert_eq!(resolve_or(&root, &path, &supplier), Value::from(0));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn wildcard_fans_out_over_elements() {
    let root = doc(json!({"a": [{"x": 1}, {"x": 2}]}));
    assert_eq!(get(&root, "a.*.x"), Value::from(vec![1, 2]));
}

#[test]
fn trailing_wildcard_keeps_per_element_results() {
    let root = doc(json!({"a": [[1], [2, 3]]}));
    let expected = Value::from(vec![Value::from(vec![1]), Value::from(vec![2, 3])]);
    assert_eq!(get(&root, "a.*"), expected);
}

#[test]
fn a_further_wildcard_collapses_one_level() {
    let root = doc(json!({"a": [{"b": [1, 2]}, {"b": [3]}]}));
    assert_eq!(get(&root, "a.*.b.*"), Value::from(vec![1, 2, 3]));
}

#[test]
fn collapse_drops_non_array_results() {
    let root = doc(json!({"a": [{"b": [1]}, {"c": 1}, {"b": "x"}, {"b": [2]}]}));
    assert_eq!(get(&root, "a.*.b.*"), Value::from(vec![1, 2]));
}

#[test]
fn misses_inside_a_fan_out_stay_null() {
    let root = doc(json!({"a": [{"x": 1}, {}]}));
    let fallback = Fallback::from(Value::from(-1));
    let resolved = resolve_or(&root, &PathSpec::parse("a.*.x"), &fallback);
    assert_eq!(resolved, Value::from(vec![Value::Int(1), Value::Null]));
}

#[test]
fn wildcard_over_a_scalar_produces_the_fallback() {
    let root = doc(json!({"a": 1}));
    let fallback = Fallback::from(Value::from("d"));
    assert_eq!(resolve_or(&root, &PathSpec::parse("a.*"), &fallback), Value::from("d"));
    assert_eq!(get(&root, "a.*"), Value::Null);
}

#[test]
fn wildcard_over_object_members_follows_document_order() {
    let root = doc(json!({"users": {"zed": {"age": 3}, "amy": {"age": 5}}}));
    assert_eq!(get(&root, "users.*.age"), Value::from(vec![3, 5]));
}

#[test]
fn a_stop_segment_truncates_resolution() {
    let root = doc(json!({"foo": {"bar": 1}}));
    let path = PathSpec::from(vec![Some("foo"), None, Some("bar")]);
    assert_eq!(path.segments()[1], Segment::Stop);
    assert_eq!(resolve(&root, &path), doc(json!({"bar": 1})));
}

#[test]
fn integer_segments_address_list_positions() {
    let root = doc(json!({"list": ["a", "b"], "named": {"01": "padded"}}));
    assert_eq!(get(&root, "list.1"), Value::from("b"));
    assert_eq!(get(&root, "list.01"), Value::Null);
    assert_eq!(get(&root, "named.01"), Value::from("padded"));
    let explicit = PathSpec::from(vec![Segment::from("list"), Segment::from(0_i64)]);
    assert_eq!(resolve(&root, &explicit), Value::from("a"));
}

#[test]
fn present_keys_holding_null_resolve_to_null() {
    let root = doc(json!({"foo": null}));
    let fallback = Fallback::from(Value::from("unused"));
    assert_eq!(resolve_or(&root, &PathSpec::parse("foo"), &fallback), Value::Null);
}

#[test]
fn indexables_use_the_offset_protocol() {
    let mut map: HashMap<String, Value> = HashMap::new();
    map.insert("foo".into(), Value::from("bar"));
    map.insert("0".into(), Value::from("zero"));
    let root = Value::indexable(map);
    assert_eq!(get(&root, "foo"), Value::from("bar"));
    assert_eq!(get(&root, "0"), Value::from("zero"));
    assert_eq!(get(&root, "baz"), Value::Null);
    // offsets are not iterable, so a wildcard misses
    assert_eq!(get(&root, "*"), Value::Null);
}

#[test]
fn indexables_fall_back_to_properties() {
    let registry = Registry {
        entries: vec![("alpha".into(), doc(json!({"port": 80})))],
        label: "primary",
    };
    let mut outer = Array::new();
    outer.insert("registry", Value::indexable(registry));
    let root = Value::Array(outer);
    assert_eq!(get(&root, "registry.alpha.port"), Value::from(80));
    assert_eq!(get(&root, "registry.label"), Value::from("primary"));
    assert_eq!(get(&root, "registry.beta"), Value::Null);
}

#[test]
fn objects_expose_set_properties() {
    let address = Object::new("Address").with("city", "Oslo").with("zip", Value::Null);
    let person = Object::new("Person").with("name", "Kari").with("address", address);
    let root = Value::from(person);
    assert_eq!(get(&root, "address.city"), Value::from("Oslo"));
    let fallback = Fallback::from(Value::from("unset"));
    assert_eq!(
        resolve_or(&root, &PathSpec::parse("address.zip"), &fallback),
        Value::from("unset"),
        "null properties are not set"
    );
}

#[test]
fn configured_delimiter_and_wildcard() {
    let settings = PathSettings { delimiter: '/', wildcard: String::from("#") };
    let root = doc(json!({"a": [{"x.y": 1}, {"x.y": 2}]}));
    let path = PathSpec::parse_with("a/#/x.y", &settings);
    assert_eq!(path.segments()[1], Segment::Wildcard);
    assert_eq!(resolve(&root, &path), Value::from(vec![1, 2]));
}

#[test]
fn paths_render_back_to_dot_form() {
    assert_eq!(PathSpec::parse("a.*.0.b").to_string(), "a.*.0.b");
    // a stop has no spelling, it reads as an empty segment
    let stopped = PathSpec::from(vec![Some("foo"), None, Some("bar")]);
    assert_eq!(stopped.to_string(), "foo..bar");
    assert_ne!(PathSpec::parse(&stopped.to_string()), stopped);
}

#[test]
fn paths_render_with_the_configured_tokens() {
    let settings = PathSettings { delimiter: '/', wildcard: String::from("#") };
    let path = PathSpec::parse_with("orders/#/x.y", &settings);
    assert_eq!(path.render_with(&settings), "orders/#/x.y");
    assert_eq!(PathSpec::parse_with(&path.render_with(&settings), &settings), path);
    assert_eq!(path.to_string(), "orders.*.x.y");
}
