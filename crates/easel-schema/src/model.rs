//! # Document Model
//!
//! Typed representation of a canvas document: a document owns one or more
//! artboards, each artboard owns an ordered tree of nodes. Node kinds form a
//! closed set discriminated by the `type` JSON field: `frame` (container),
//! `text` (leaf), and `component` (instance of an external component).
//!
//! ## Serialization contract
//!
//! Field names are camelCase on the wire. Optional fields are omitted when
//! absent (never serialized as `null`) and `visible` is omitted when true,
//! so two structurally equal documents produce identical canonical bytes.
//!
//! ## Ownership
//!
//! Documents are value types: operations consume a document and return a new
//! one. Nodes are owned by their parent's `children` sequence; moving a node
//! transfers that ownership atomically.

use crate::ident::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The schema version this build reads and writes.
pub const CURRENT_SCHEMA_VERSION: &str = "0.1.0";

/// An axis-aligned rectangle. Coordinates may be negative; dimensions never.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Construct a rectangle.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A gradient color stop. `offset` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

/// A paint fill: a solid color, an optional gradient stop sequence, and an
/// optional opacity in `[0, 1]`. Stop order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Fill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stops: Vec<ColorStop>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Fill {
    /// A plain solid-color fill.
    #[must_use]
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            stops: Vec::new(),
            opacity: None,
        }
    }
}

/// A stroke: color, width, optional opacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// A drop shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: String,
}

/// Visual attributes of a node. Fill and stroke sequences are painted in
/// order; the sequences are treated as opaque wholes by merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<Fill>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strokes: Vec<Stroke>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

/// Typographic attributes for text nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Layout hints carried by frames. The engine performs no layout; these pass
/// through to hosting tools untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LayoutHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
}

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Frame,
    Text,
    Component,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frame => f.write_str("frame"),
            Self::Text => f.write_str("text"),
            Self::Component => f.write_str("component"),
        }
    }
}

/// Kind-specific node payload, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeBody {
    /// A container owning an ordered child sequence.
    Frame {
        #[serde(skip_serializing_if = "Option::is_none")]
        layout: Option<LayoutHints>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },

    /// A text leaf.
    Text {
        text: String,

        #[serde(rename = "textStyle", skip_serializing_if = "Option::is_none")]
        text_style: Option<TextStyle>,
    },

    /// A component instance: a key into an external component library plus
    /// property overrides. Treated as a leaf by traversal and merge.
    Component {
        #[serde(rename = "componentKey")]
        component_key: String,

        #[serde(default, skip_serializing_if = "Map::is_empty")]
        props: Map<String, Value>,
    },
}

/// A node in the document tree.
///
/// Common fields live on the struct; the kind-specific payload is flattened
/// so the wire shape is a single object discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,

    /// Hidden nodes are skipped by hit testing and excluded from painting.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub visible: bool,

    pub frame: Rect,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,

    /// Free-form host data; merged key-wise, otherwise opaque to the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,

    /// Token binding descriptor, opaque to the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Stable merge identity, independent of `id`. Dotted lowercase path
    /// such as `hero.title` or `nav.items[0]`; unique document-wide.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_key: Option<String>,

    #[serde(flatten)]
    pub body: NodeBody,
}

fn default_true() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(value: &bool) -> bool {
    *value
}

impl Node {
    /// A new empty frame with a fresh identifier.
    #[must_use]
    pub fn frame(name: impl Into<String>, frame: Rect) -> Self {
        Self::with_body(
            name,
            frame,
            NodeBody::Frame {
                layout: None,
                children: Vec::new(),
            },
        )
    }

    /// A new text leaf with a fresh identifier.
    #[must_use]
    pub fn text(name: impl Into<String>, frame: Rect, text: impl Into<String>) -> Self {
        Self::with_body(
            name,
            frame,
            NodeBody::Text {
                text: text.into(),
                text_style: None,
            },
        )
    }

    /// A new component instance with a fresh identifier.
    #[must_use]
    pub fn component(name: impl Into<String>, frame: Rect, key: impl Into<String>) -> Self {
        Self::with_body(
            name,
            frame,
            NodeBody::Component {
                component_key: key.into(),
                props: Map::new(),
            },
        )
    }

    fn with_body(name: impl Into<String>, frame: Rect, body: NodeBody) -> Self {
        Self {
            id: NodeId::generate(),
            name: name.into(),
            visible: true,
            frame,
            style: None,
            data: None,
            bind: None,
            semantic_key: None,
            body,
        }
    }

    /// The node's kind tag.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Frame { .. } => NodeKind::Frame,
            NodeBody::Text { .. } => NodeKind::Text,
            NodeBody::Component { .. } => NodeKind::Component,
        }
    }

    /// Whether this node can own children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.body, NodeBody::Frame { .. })
    }

    /// Child sequence, if this node is a container.
    #[must_use]
    pub fn children(&self) -> Option<&[Node]> {
        match &self.body {
            NodeBody::Frame { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Mutable child sequence, if this node is a container.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.body {
            NodeBody::Frame { children, .. } => Some(children),
            _ => None,
        }
    }
}

/// A top-level container in a document: a bounded region holding nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artboard {
    pub id: NodeId,
    pub name: String,
    pub frame: Rect,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Fill>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Artboard {
    /// A new empty artboard with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, frame: Rect) -> Self {
        Self {
            id: NodeId::generate(),
            name: name.into(),
            frame,
            background: None,
            children: Vec::new(),
        }
    }
}

/// A complete canvas document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Always [`CURRENT_SCHEMA_VERSION`] for documents this build produces.
    pub schema_version: String,
    pub id: NodeId,
    pub name: String,

    /// At least one artboard; order is significant.
    pub artboards: Vec<Artboard>,
}

impl Document {
    /// A new document with one default artboard sized to a desktop viewport.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            id: NodeId::generate(),
            name: name.into(),
            artboards: vec![Artboard::new("Artboard 1", Rect::new(0.0, 0.0, 1440.0, 900.0))],
        }
    }
}
