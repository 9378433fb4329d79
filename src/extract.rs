//! Turns primary elements into the four record streams.

use std::str::FromStr;

use log::debug;

use crate::clean::{classify, Normalizers};
use crate::config::MissingAttributePolicy;
use crate::data::{ElementKind, NodeRecord, OsmElement, TagRecord, WayRecord};
use crate::errors::{MissingAttribute, Result};
use crate::sink::RecordSink;

/// Outcome of resolving one column of one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill<T> {
    Present(T),
    CarriedForward(T, MissingAttribute),
    Null(MissingAttribute),
}

impl<T> Fill<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Fill::Present(value) | Fill::CarriedForward(value, _) => Some(value),
            Fill::Null(_) => None,
        }
    }
}

/// Last value seen in one column of one stream.
#[derive(Debug, Clone)]
pub struct ForwardFill<T> {
    last: Option<T>,
}

impl<T> Default for ForwardFill<T> {
    fn default() -> Self {
        ForwardFill { last: None }
    }
}

impl<T: Clone> ForwardFill<T> {
    pub fn resolve(
        &mut self,
        value: std::result::Result<T, MissingAttribute>,
        policy: MissingAttributePolicy,
    ) -> Fill<T> {
        match (value, policy) {
            (Ok(value), _) => {
                self.last = Some(value.clone());
                Fill::Present(value)
            }
            (Err(missing), MissingAttributePolicy::ForwardFill) => match &self.last {
                Some(last) => Fill::CarriedForward(last.clone(), missing),
                None => Fill::Null(missing),
            },
            (Err(missing), MissingAttributePolicy::Null) => Fill::Null(missing),
        }
    }
}

fn read_column<T: FromStr>(
    element: &OsmElement,
    attribute: &'static str,
) -> std::result::Result<T, MissingAttribute> {
    match element.attribute(attribute) {
        Some(raw) => raw.parse().map_err(|_| MissingAttribute {
            attribute,
            raw: Some(raw.to_string()),
        }),
        None => Err(MissingAttribute {
            attribute,
            raw: None,
        }),
    }
}

#[derive(Debug, Default)]
struct NodeColumns {
    lat: ForwardFill<f64>,
    lon: ForwardFill<f64>,
    user: ForwardFill<String>,
    uid: ForwardFill<i64>,
    version: ForwardFill<i64>,
    changeset: ForwardFill<i64>,
    timestamp: ForwardFill<String>,
}

#[derive(Debug, Default)]
struct WayColumns {
    user: ForwardFill<String>,
    uid: ForwardFill<i64>,
    version: ForwardFill<i64>,
    changeset: ForwardFill<i64>,
    timestamp: ForwardFill<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub nodes: u64,
    pub ways: u64,
    pub node_tags: u64,
    pub way_tags: u64,
    pub dropped_tags: u64,
    pub carried_forward: u64,
    pub null_attributes: u64,
    pub skipped_elements: u64,
}

impl ExtractSummary {
    fn track<T>(&mut self, kind: ElementKind, id: i64, fill: Fill<T>) -> Option<T> {
        match &fill {
            Fill::Present(_) => (),
            Fill::CarriedForward(_, missing) => {
                self.carried_forward += 1;
                debug!(element = kind.as_str(), id = id, attribute = missing.attribute,
                    raw = missing.raw.as_deref().unwrap_or(""); "Carrying attribute forward");
            }
            Fill::Null(missing) => {
                self.null_attributes += 1;
                debug!(element = kind.as_str(), id = id, attribute = missing.attribute,
                    raw = missing.raw.as_deref().unwrap_or(""); "Leaving attribute null");
            }
        }
        fill.into_option()
    }
}

/// Records built from one primary element.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Node { record: NodeRecord, tags: Vec<TagRecord> },
    Way { record: WayRecord, tags: Vec<TagRecord> },
}

pub struct RecordExtractor {
    normalizers: Normalizers,
    policy: MissingAttributePolicy,
    nodes: NodeColumns,
    ways: WayColumns,
    summary: ExtractSummary,
}

impl RecordExtractor {
    pub fn new(normalizers: Normalizers, policy: MissingAttributePolicy) -> Self {
        RecordExtractor {
            normalizers,
            policy,
            nodes: NodeColumns::default(),
            ways: WayColumns::default(),
            summary: ExtractSummary::default(),
        }
    }

    pub fn summary(&self) -> &ExtractSummary {
        &self.summary
    }

    /// Builds the records of one element. Relations, and elements without a
    /// usable `id`, produce nothing.
    pub fn extract(&mut self, element: &OsmElement) -> Option<Extracted> {
        if element.kind == ElementKind::Relation {
            return None;
        }
        let Some(id) = element.id() else {
            self.summary.skipped_elements += 1;
            debug!(element = element.kind.as_str(), id = element.attribute("id").unwrap_or("");
                "Skipping element without a numeric id");
            return None;
        };

        let tags = self.extract_tags(id, element);
        match element.kind {
            ElementKind::Node => {
                let record = self.node_record(id, element);
                self.summary.nodes += 1;
                self.summary.node_tags += tags.len() as u64;
                Some(Extracted::Node { record, tags })
            }
            ElementKind::Way => {
                let record = self.way_record(id, element);
                self.summary.ways += 1;
                self.summary.way_tags += tags.len() as u64;
                Some(Extracted::Way { record, tags })
            }
            ElementKind::Relation => None,
        }
    }

    /// Streams `elements` into `sink`. Stops at the first reader or sink error.
    pub fn run<I, S>(&mut self, elements: I, sink: &mut S) -> Result<()>
    where
        I: IntoIterator<Item = Result<OsmElement>>,
        S: RecordSink + ?Sized,
    {
        for element in elements {
            if let Some(extracted) = self.extract(&element?) {
                write_extracted(sink, &extracted)?;
            }
        }
        sink.finish()
    }

    /// Lazy form of [`RecordExtractor::run`]: nothing is read until the
    /// returned iterator is pulled.
    pub fn records<I>(self, elements: I) -> Records<I>
    where
        I: Iterator<Item = Result<OsmElement>>,
    {
        Records {
            elements,
            extractor: self,
        }
    }

    fn node_record(&mut self, id: i64, element: &OsmElement) -> NodeRecord {
        let kind = ElementKind::Node;
        let policy = self.policy;
        let columns = &mut self.nodes;
        let summary = &mut self.summary;

        NodeRecord {
            id,
            lat: summary.track(kind, id, columns.lat.resolve(read_column(element, "lat"), policy)),
            lon: summary.track(kind, id, columns.lon.resolve(read_column(element, "lon"), policy)),
            user: summary.track(kind, id, columns.user.resolve(read_column(element, "user"), policy)),
            uid: summary.track(kind, id, columns.uid.resolve(read_column(element, "uid"), policy)),
            version: summary
                .track(kind, id, columns.version.resolve(read_column(element, "version"), policy)),
            changeset: summary
                .track(kind, id, columns.changeset.resolve(read_column(element, "changeset"), policy)),
            timestamp: summary
                .track(kind, id, columns.timestamp.resolve(read_column(element, "timestamp"), policy)),
        }
    }

    fn way_record(&mut self, id: i64, element: &OsmElement) -> WayRecord {
        let kind = ElementKind::Way;
        let policy = self.policy;
        let columns = &mut self.ways;
        let summary = &mut self.summary;

        WayRecord {
            id,
            user: summary.track(kind, id, columns.user.resolve(read_column(element, "user"), policy)),
            uid: summary.track(kind, id, columns.uid.resolve(read_column(element, "uid"), policy)),
            version: summary
                .track(kind, id, columns.version.resolve(read_column(element, "version"), policy)),
            changeset: summary
                .track(kind, id, columns.changeset.resolve(read_column(element, "changeset"), policy)),
            timestamp: summary
                .track(kind, id, columns.timestamp.resolve(read_column(element, "timestamp"), policy)),
        }
    }

    fn extract_tags(&mut self, owner_id: i64, element: &OsmElement) -> Vec<TagRecord> {
        let mut records = Vec::with_capacity(element.tags.len());
        for tag in &element.tags {
            let class = classify(&tag.key);
            if !class.well_formed {
                self.summary.dropped_tags += 1;
                debug!(element = element.kind.as_str(), id = owner_id, key = tag.key.as_str();
                    "Dropping tag with problem characters in its key");
                continue;
            }
            records.push(TagRecord {
                owner_id,
                raw_key: tag.key.clone(),
                namespace: class.namespace,
                local_name: class.local_name,
                value: self.normalizers.normalize_value(&tag.key, &tag.value),
            });
        }
        records
    }
}

pub fn write_extracted<S: RecordSink + ?Sized>(sink: &mut S, extracted: &Extracted) -> Result<()> {
    match extracted {
        Extracted::Node { record, tags } => {
            sink.write_node(record)?;
            for tag in tags {
                sink.write_node_tag(tag)?;
            }
        }
        Extracted::Way { record, tags } => {
            sink.write_way(record)?;
            for tag in tags {
                sink.write_way_tag(tag)?;
            }
        }
    }
    Ok(())
}

/// Iterator over the records of each node and way pulled from `elements`.
pub struct Records<I> {
    elements: I,
    extractor: RecordExtractor,
}

impl<I> Records<I>
where
    I: Iterator<Item = Result<OsmElement>>,
{
    pub fn summary(&self) -> &ExtractSummary {
        self.extractor.summary()
    }

    pub fn write_to<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        for extracted in self.by_ref() {
            write_extracted(sink, &extracted?)?;
        }
        sink.finish()
    }
}

impl<I> Iterator for Records<I>
where
    I: Iterator<Item = Result<OsmElement>>,
{
    type Item = Result<Extracted>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.elements.next()? {
                Ok(element) => {
                    if let Some(extracted) = self.extractor.extract(&element) {
                        return Some(Ok(extracted));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::clean::{LandUse, PostalCode};
    use crate::data::{RawTag, TagValue};
    use crate::sink::MemorySink;

    fn element(kind: ElementKind, attributes: &[(&str, &str)], tags: &[(&str, &str)]) -> OsmElement {
        OsmElement {
            kind,
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            tags: tags
                .iter()
                .map(|(k, v)| RawTag { key: k.to_string(), value: v.to_string() })
                .collect(),
            ..OsmElement::new(kind)
        }
    }

    fn extractor(policy: MissingAttributePolicy) -> RecordExtractor {
        RecordExtractor::new(Normalizers::default(), policy)
    }

    fn tags_of(extracted: Option<Extracted>) -> Vec<TagRecord> {
        match extracted {
            Some(Extracted::Node { tags, .. }) | Some(Extracted::Way { tags, .. }) => tags,
            None => Vec::new(),
        }
    }

    #[test]
    fn normalizes_reserved_keys() {
        let mut extractor = extractor(MissingAttributePolicy::ForwardFill);
        let node = element(
            ElementKind::Node,
            &[("id", "5")],
            &[
                ("addr:postcode", "PA 15213-1234"),
                ("addr:street", "123 Main St."),
                ("building", "dormitory"),
                ("addr:city", "Pittsburgh"),
            ],
        );
        let tags = tags_of(extractor.extract(&node));

        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0].owner_id, 5);
        assert_eq!(tags[0].namespace, "addr");
        assert_eq!(tags[0].local_name, "postcode");
        assert_eq!(tags[0].value, TagValue::PostalCode(PostalCode::Valid(15213)));
        assert_eq!(tags[1].value.to_string(), "123 Main Street");
        assert_eq!(tags[2].namespace, "none");
        assert_eq!(tags[2].local_name, "building");
        assert_eq!(tags[2].value, TagValue::LandUse(LandUse::Residential));
        assert_eq!(tags[3].value, TagValue::Text("Pittsburgh".into()));
    }

    #[test]
    fn drops_tags_with_problem_keys() {
        let mut extractor = extractor(MissingAttributePolicy::ForwardFill);
        let way = element(
            ElementKind::Way,
            &[("id", "9")],
            &[("a,b", "x"), ("name", "Forbes"), ("note.old", "y")],
        );
        let tags = tags_of(extractor.extract(&way));

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].raw_key, "name");
        assert_eq!(extractor.summary().dropped_tags, 2);
        assert_eq!(extractor.summary().way_tags, 1);
    }

    #[test]
    fn forward_fills_missing_node_attributes() {
        let mut extractor = extractor(MissingAttributePolicy::ForwardFill);
        let first = element(ElementKind::Node, &[("id", "1"), ("lat", "40.1")], &[]);
        let second = element(
            ElementKind::Node,
            &[("id", "2"), ("lat", "40.2"), ("changeset", "77")],
            &[],
        );
        let third = element(ElementKind::Node, &[("id", "3"), ("changeset", "abc")], &[]);

        let Some(Extracted::Node { record, .. }) = extractor.extract(&first) else {
            panic!("expected a node");
        };
        assert_eq!(record.changeset, None);
        assert_eq!(record.lat, Some(40.1));

        extractor.extract(&second);

        let Some(Extracted::Node { record, .. }) = extractor.extract(&third) else {
            panic!("expected a node");
        };
        assert_eq!(record.changeset, Some(77));
        assert_eq!(record.lat, Some(40.2));
        assert_eq!(record.user, None);
    }

    #[test]
    fn node_and_way_columns_fill_independently() {
        let mut extractor = extractor(MissingAttributePolicy::ForwardFill);
        extractor.extract(&element(ElementKind::Node, &[("id", "1"), ("uid", "7")], &[]));
        let Some(Extracted::Way { record, .. }) =
            extractor.extract(&element(ElementKind::Way, &[("id", "2")], &[]))
        else {
            panic!("expected a way");
        };
        assert_eq!(record.uid, None);
    }

    #[test]
    fn null_policy_never_carries_values() {
        let mut extractor = extractor(MissingAttributePolicy::Null);
        extractor.extract(&element(ElementKind::Node, &[("id", "1"), ("changeset", "5")], &[]));
        let Some(Extracted::Node { record, .. }) =
            extractor.extract(&element(ElementKind::Node, &[("id", "2")], &[]))
        else {
            panic!("expected a node");
        };
        assert_eq!(record.changeset, None);
        assert_eq!(extractor.summary().carried_forward, 0);
    }

    #[test]
    fn skips_relations_and_elements_without_id() {
        let mut extractor = extractor(MissingAttributePolicy::ForwardFill);
        assert_eq!(
            extractor.extract(&element(ElementKind::Relation, &[("id", "1")], &[("type", "route")])),
            None
        );
        assert_eq!(
            extractor.extract(&element(ElementKind::Node, &[("lat", "1.0")], &[("name", "x")])),
            None
        );
        assert_eq!(extractor.summary().skipped_elements, 1);
    }

    #[test]
    fn routes_records_to_matching_streams() {
        let mut extractor = extractor(MissingAttributePolicy::ForwardFill);
        let elements = vec![
            Ok(element(ElementKind::Node, &[("id", "1")], &[("amenity", "cafe")])),
            Ok(element(ElementKind::Way, &[("id", "2")], &[("building", "house"), ("a b", "c")])),
            Ok(element(ElementKind::Relation, &[("id", "3")], &[("type", "route")])),
        ];
        let mut sink = MemorySink::default();
        extractor.run(elements, &mut sink).unwrap();

        assert_eq!(sink.nodes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(sink.ways.iter().map(|w| w.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(sink.nodes_tags.len(), 1);
        assert_eq!(sink.ways_tags.len(), 1);
        assert_eq!(sink.ways_tags[0].value.to_string(), "residential");
        assert_eq!(
            extractor.summary(),
            &ExtractSummary {
                nodes: 1,
                ways: 1,
                node_tags: 1,
                way_tags: 1,
                dropped_tags: 1,
                carried_forward: 0,
                null_attributes: 12,
                skipped_elements: 0,
            }
        );
    }

    #[test]
    fn records_are_pulled_lazily() {
        let elements = vec![
            Ok(element(ElementKind::Node, &[("id", "1")], &[])),
            Ok(element(ElementKind::Relation, &[("id", "2")], &[])),
            Ok(element(ElementKind::Way, &[("id", "3")], &[("name", "Forbes")])),
        ];
        let mut records = extractor(MissingAttributePolicy::ForwardFill).records(elements.into_iter());

        assert!(matches!(records.next(), Some(Ok(Extracted::Node { .. }))));
        assert_eq!(records.summary().ways, 0);

        let mut sink = MemorySink::default();
        records.write_to(&mut sink).unwrap();
        assert_eq!(sink.ways.len(), 1);
        assert_eq!(sink.ways_tags.len(), 1);
        assert_eq!(records.summary().ways, 1);
    }

    #[test]
    fn run_stops_at_reader_errors() {
        let mut extractor = extractor(MissingAttributePolicy::ForwardFill);
        let elements = vec![
            Ok(element(ElementKind::Node, &[("id", "1")], &[])),
            Err(crate::errors::Error::malformed("broken")),
            Ok(element(ElementKind::Node, &[("id", "2")], &[])),
        ];
        let mut sink = MemorySink::default();
        assert!(extractor.run(elements, &mut sink).is_err());
        assert_eq!(sink.nodes.len(), 1);
    }
}
