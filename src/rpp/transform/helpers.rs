//! Functions registered into the script sandbox
//!
//! Beyond the Rhai language and its core, array, map, math and string packages, these are the
//! only functions a transform script can call. None of them reach outside the values passed in.

use crate::rpp::projection::{CHILDREN, PARAMS, TAG};
use rhai::{Array, Dynamic, Engine, ImmutableString, Map};

/// One registered helper, as listed to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptFunction {
    pub signature: &'static str,
    pub description: &'static str,
}

/// Everything [`register`] adds to an engine.
pub const SCRIPT_FUNCTIONS: &[ScriptFunction] = &[
    ScriptFunction {
        signature: "children(node, tag) -> array",
        description: "Child nodes of `node` whose tag is `tag`, in file order.",
    },
    ScriptFunction {
        signature: "child(node, tag)",
        description: "First child node of `node` whose tag is `tag`, or () when there is none.",
    },
    ScriptFunction {
        signature: "has_tag(node, tag) -> bool",
        description: "Whether `node` is a chunk or line with the given tag.",
    },
    ScriptFunction {
        signature: "is_chunk(node) -> bool",
        description: "Whether `node` is a chunk (has a `children` array).",
    },
    ScriptFunction {
        signature: "chunk(tag[, params]) -> map",
        description: "A new chunk node without children.",
    },
    ScriptFunction {
        signature: "line(tag[, params]) -> map",
        description: "A new parameter line node.",
    },
];

pub fn register(engine: &mut Engine) {
    engine
        .register_fn("children", children)
        .register_fn("child", child)
        .register_fn("has_tag", has_tag)
        .register_fn("is_chunk", is_chunk)
        .register_fn("chunk", |tag: ImmutableString| new_chunk(tag, Array::new()))
        .register_fn("chunk", new_chunk)
        .register_fn("line", |tag: ImmutableString| new_line(tag, Array::new()))
        .register_fn("line", new_line);
}

fn child_nodes(node: &Map) -> Array {
    node.get(CHILDREN)
        .and_then(|children| children.clone().try_cast::<Array>())
        .unwrap_or_default()
}

fn tag_matches(node: &Dynamic, tag: &str) -> bool {
    node.read_lock::<Map>()
        .map_or(false, |map| map_has_tag(&map, tag))
}

fn map_has_tag(map: &Map, tag: &str) -> bool {
    map.get(TAG)
        .and_then(|value| value.read_lock::<ImmutableString>())
        .map_or(false, |value| value.as_str() == tag)
}

fn children(node: Map, tag: ImmutableString) -> Array {
    child_nodes(&node)
        .into_iter()
        .filter(|child| tag_matches(child, &tag))
        .collect()
}

fn child(node: Map, tag: ImmutableString) -> Dynamic {
    child_nodes(&node)
        .into_iter()
        .find(|child| tag_matches(child, &tag))
        .unwrap_or(Dynamic::UNIT)
}

fn has_tag(node: Map, tag: ImmutableString) -> bool {
    map_has_tag(&node, &tag)
}

fn is_chunk(node: Map) -> bool {
    node.get(CHILDREN).map_or(false, Dynamic::is_array)
}

fn new_line(tag: ImmutableString, params: Array) -> Map {
    let mut map = Map::new();
    map.insert(TAG.into(), Dynamic::from(tag));
    map.insert(PARAMS.into(), Dynamic::from_array(params));
    map
}

fn new_chunk(tag: ImmutableString, params: Array) -> Map {
    let mut map = new_line(tag, params);
    map.insert(CHILDREN.into(), Dynamic::from_array(Array::new()));
    map
}
