use std::collections::BTreeMap;

/// Element names the reader yields. Everything else at the top level of the
/// document (`osm`, `bounds`, ...) is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"node" => Some(ElementKind::Node),
            b"way" => Some(ElementKind::Way),
            b"relation" => Some(ElementKind::Relation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        }
    }
}

/// A `<tag k=".." v=".."/>` child, values already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub key: String,
    pub value: String,
}

/// One primary element with its direct attributes and its `tag` children,
/// both in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OsmElement {
    pub kind: ElementKind,
    pub attributes: Vec<(String, String)>,
    pub tags: Vec<RawTag>,
    /// Element name -> count of the other children (`nd`, `member`).
    pub children: BTreeMap<String, u64>,
}

impl OsmElement {
    pub fn new(kind: ElementKind) -> Self {
        OsmElement {
            kind,
            attributes: Vec::new(),
            tags: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn id(&self) -> Option<i64> {
        self.attribute("id")?.trim().parse().ok()
    }
}
