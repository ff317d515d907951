//! Arena-backed syntax tree consumed by the explorer views.
//!
//! Parsers hand the explorer a JSON document. Every node in it is probed for
//! its child container exactly once, at load time, and stored in an arena so
//! layout code never has to sniff shapes or compare references.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

pub const DEFAULT_NODE_LABEL: &str = "Node";

/// Nesting budget applied while loading JSON.
pub const DEFAULT_MAX_NESTING: usize = 4096;

/// Extra JSON levels allowed below the deepest node for nested attributes.
const ATTRIBUTE_NESTING_SLACK: usize = 64;

#[derive(Debug, Error)]
pub enum AstError {
    #[error("invalid AST JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("AST nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// Index of a node inside its [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeRef(pub usize);

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// User-facing node identifier as emitted by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(Number),
    Text(String),
}

impl NodeId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Text(s.clone())),
            other => {
                log::warn!("non-scalar node id {other}; using its JSON text");
                Some(Self::Text(other.to_string()))
            }
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for NodeId {
    type Err = std::convert::Infallible;

    /// Numeric text becomes a numeric id, anything else a text id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Self::Number(v.into()));
        }
        if let Ok(v) = s.parse::<f64>() {
            // `1e3` should find the node whose JSON id is `1000`.
            if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                return Ok(Self::Number((v as i64).into()));
            }
            if let Some(n) = Number::from_f64(v) {
                return Ok(Self::Number(n));
            }
        }
        Ok(Self::Text(s.to_string()))
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for NodeId {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Where a node keeps its children. Decided once per node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChildShape {
    #[default]
    Leaf,
    Children(Vec<NodeRef>),
    Body(Vec<NodeRef>),
    Binary([NodeRef; 2]),
}

impl ChildShape {
    pub fn children(&self) -> &[NodeRef] {
        match self {
            Self::Leaf => &[],
            Self::Children(kids) | Self::Body(kids) => kids,
            Self::Binary(pair) => pair,
        }
    }

    pub fn container_name(&self) -> Option<&'static str> {
        match self {
            Self::Leaf => None,
            Self::Children(_) => Some("children"),
            Self::Body(_) => Some("body"),
            Self::Binary(_) => Some("left/right"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AstNode {
    pub id: Option<NodeId>,
    pub kind: Option<String>,
    pub shape: ChildShape,
    pub attributes: BTreeMap<String, Value>,
}

impl AstNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn label(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_NODE_LABEL)
    }

    pub fn children(&self) -> &[NodeRef] {
        self.shape.children()
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: Option<NodeRef>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self, AstError> {
        Self::from_json_with_limit(input, DEFAULT_MAX_NESTING)
    }

    pub fn from_json_with_limit(input: &str, max_nesting: usize) -> Result<Self, AstError> {
        let value = parse_json(input, max_nesting)?;
        let ast = Self::from_value_with_limit(&value, max_nesting);
        release_json(value);
        ast
    }

    pub fn from_value(value: &Value) -> Result<Self, AstError> {
        Self::from_value_with_limit(value, DEFAULT_MAX_NESTING)
    }

    /// Loads a JSON tree. Falsy roots (`null`, `false`, `0`, `""`) give an
    /// empty AST; falsy entries inside child containers are skipped.
    pub fn from_value_with_limit(value: &Value, max_nesting: usize) -> Result<Self, AstError> {
        let mut ast = Self::new();
        if !is_truthy(value) {
            return Ok(ast);
        }
        let (node, probe) = load_node(value);
        let root = ast.push(node);
        ast.root = Some(root);

        let mut pending = vec![(root, probe, 0usize)];
        while let Some((slot, probe, depth)) = pending.pop() {
            let Some((container, kids)) = probe else {
                continue;
            };
            if depth >= max_nesting {
                return Err(AstError::TooDeep { limit: max_nesting });
            }
            let mut refs = Vec::with_capacity(kids.len());
            for kid in kids {
                if !is_truthy(kid) {
                    continue;
                }
                let (node, probe) = load_node(kid);
                let child = ast.push(node);
                refs.push(child);
                pending.push((child, probe, depth + 1));
            }
            ast.nodes[slot.0].shape = match container {
                Container::Children => ChildShape::Children(refs),
                Container::Body => ChildShape::Body(refs),
                Container::Binary => match refs.as_slice() {
                    [left, right] => ChildShape::Binary([*left, *right]),
                    _ => ChildShape::Leaf,
                },
            };
        }
        Ok(ast)
    }

    pub fn push(&mut self, node: AstNode) -> NodeRef {
        self.nodes.push(node);
        NodeRef(self.nodes.len() - 1)
    }

    pub fn set_root(&mut self, root: Option<NodeRef>) {
        self.root = root;
    }

    /// Replaces a node's children. Unlike JSON loading this may create shared
    /// subtrees or cycles; layout reports those instead of looping.
    pub fn set_shape(&mut self, node: NodeRef, shape: ChildShape) -> bool {
        match self.nodes.get_mut(node.0) {
            Some(target) => {
                target.shape = shape;
                true
            }
            None => false,
        }
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    pub fn root_node(&self) -> Option<&AstNode> {
        self.root.and_then(|r| self.get(r))
    }

    pub fn get(&self, node: NodeRef) -> Option<&AstNode> {
        self.nodes.get(node.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &AstNode)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeRef(idx), node))
    }

    pub fn find_by_id(&self, id: &NodeId) -> Option<NodeRef> {
        self.iter()
            .find(|(_, node)| node.id.as_ref() == Some(id))
            .map(|(r, _)| r)
    }
}

#[derive(Clone, Copy)]
enum Container {
    Children,
    Body,
    Binary,
}

impl Container {
    fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Children => &["children"],
            Self::Body => &["body"],
            Self::Binary => &["left", "right"],
        }
    }
}

/// `children` array, then `body` array, then a `left`/`right` pair where both
/// sides are present. Anything else is a leaf.
fn probe_children(value: &Value) -> Option<(Container, Vec<&Value>)> {
    let obj = value.as_object()?;
    if let Some(Value::Array(kids)) = obj.get("children") {
        return Some((Container::Children, kids.iter().collect()));
    }
    if let Some(Value::Array(kids)) = obj.get("body") {
        return Some((Container::Body, kids.iter().collect()));
    }
    match (obj.get("left"), obj.get("right")) {
        (Some(left), Some(right)) if is_truthy(left) && is_truthy(right) => {
            Some((Container::Binary, vec![left, right]))
        }
        _ => None,
    }
}

type Probe<'a> = Option<(Container, Vec<&'a Value>)>;

/// Builds the node and probes its children. The consumed container fields
/// move into the arena and are left out of the attributes.
fn load_node(value: &Value) -> (AstNode, Probe<'_>) {
    let Value::Object(obj) = value else {
        return (
            AstNode::default().with_attribute("value", value.clone()),
            None,
        );
    };
    let probe = probe_children(value);
    let consumed = probe.as_ref().map_or(&[][..], |(container, _)| container.fields());
    let node = AstNode {
        id: obj.get("id").and_then(NodeId::from_value),
        kind: obj.get("type").and_then(label_from_value),
        shape: ChildShape::Leaf,
        attributes: attributes_from(obj, consumed),
    };
    (node, probe)
}

fn label_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn attributes_from(obj: &Map<String, Value>, consumed: &[&str]) -> BTreeMap<String, Value> {
    obj.iter()
        .filter(|(key, _)| !matches!(key.as_str(), "id" | "type") && !consumed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Parses JSON text without serde_json's fixed recursion limit. Nesting is
/// bounded by `max_nesting` instead, since every `children` level costs two
/// JSON levels (object and array).
pub fn parse_json(input: &str, max_nesting: usize) -> Result<Value, AstError> {
    let limit = max_nesting
        .saturating_mul(2)
        .saturating_add(ATTRIBUTE_NESTING_SLACK);
    if json_nesting(input) > limit {
        return Err(AstError::TooDeep { limit: max_nesting });
    }
    let mut json = serde_json::Deserializer::from_str(input);
    json.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Drops a parsed document on a grown stack; `Value` drops recursively.
pub fn release_json(value: Value) {
    stacker::maybe_grow(64 * 1024, 16 * 1024 * 1024, move || drop(value));
}

/// Deepest bracket nesting in `input`, ignoring brackets inside strings.
fn json_nesting(input: &str) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for byte in input.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// JavaScript truthiness, which is what parsers targeting the explorer assume.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
