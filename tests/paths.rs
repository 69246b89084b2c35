use serde_json::json;

use chatflow::paths::{deep_merge, get_path, merged, set_path};

#[test]
fn get_path_walks_nested_mappings() {
    let state = json!({"user": {"profile": {"name": "Alice"}}});
    assert_eq!(get_path(&state, "user.profile.name"), Some(&json!("Alice")));
    assert_eq!(get_path(&state, "user.profile"), Some(&json!({"name": "Alice"})));
    assert_eq!(get_path(&state, ""), Some(&state));
}

#[test]
fn get_path_misses_return_none() {
    let state = json!({"user": {"name": "Alice"}});
    assert_eq!(get_path(&state, "user.age"), None);
    assert_eq!(get_path(&state, "missing.deep.path"), None);
    // Traversal through a non-mapping stops.
    assert_eq!(get_path(&state, "user.name.first"), None);
}

#[test]
fn get_path_does_not_index_sequences() {
    let state = json!({"items": [1, 2, 3]});
    assert_eq!(get_path(&state, "items.0"), None);
    assert_eq!(get_path(&state, "items"), Some(&json!([1, 2, 3])));
}

#[test]
fn set_path_creates_intermediate_mappings() {
    let mut delta = json!({});
    set_path(&mut delta, "temp.book_count", json!(0));
    assert_eq!(delta, json!({"temp": {"book_count": 0}}));

    set_path(&mut delta, "temp.books", json!(["a"]));
    assert_eq!(delta, json!({"temp": {"book_count": 0, "books": ["a"]}}));
}

#[test]
fn set_path_overwrites_existing_leaf() {
    let mut delta = json!({"temp": {"count": 1}});
    set_path(&mut delta, "temp.count", json!(2));
    assert_eq!(delta, json!({"temp": {"count": 2}}));
}

#[test]
fn set_path_replaces_non_mapping_intermediate() {
    let mut delta = json!({"temp": "scalar"});
    set_path(&mut delta, "temp.count", json!(1));
    assert_eq!(delta, json!({"temp": {"count": 1}}));
}

#[test]
fn deep_merge_is_recursive_over_mappings() {
    let mut base = json!({"temp": {"a": 1}, "user": {"name": "Sam"}});
    deep_merge(&mut base, &json!({"temp": {"b": 2}, "context": {"x": true}}));
    assert_eq!(
        base,
        json!({
            "temp": {"a": 1, "b": 2},
            "user": {"name": "Sam"},
            "context": {"x": true}
        })
    );
}

#[test]
fn deep_merge_update_wins_on_leaves_and_sequences() {
    let mut base = json!({"n": 1, "list": [1, 2], "map": {"keep": true, "n": 1}});
    deep_merge(&mut base, &json!({"n": 2, "list": [3], "map": {"n": 2}}));
    assert_eq!(base, json!({"n": 2, "list": [3], "map": {"keep": true, "n": 2}}));
}

#[test]
fn merged_leaves_inputs_untouched() {
    let base = json!({"a": 1});
    let update = json!({"b": 2});
    let out = merged(&base, &update);
    assert_eq!(out, json!({"a": 1, "b": 2}));
    assert_eq!(base, json!({"a": 1}));
    assert_eq!(update, json!({"b": 2}));
}
