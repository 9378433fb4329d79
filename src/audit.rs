//! Read-only data-quality pass over the document.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::clean::{street_type, ZipCodeRange, BUILDING_KEY, POSTCODE_KEY, STREET_KEY};
use crate::config::UserConfig;
use crate::data::{ElementKind, OsmElement};
use crate::errors::Result;

/// Keys whose distinct values are counted by the survey.
pub const SURVEYED_KEYS: [&str; 6] = [
    BUILDING_KEY,
    STREET_KEY,
    POSTCODE_KEY,
    "addr:city",
    "addr:state",
    "addr:county",
];

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AuditTally {
    /// Raw postcode value -> number of occurrences.
    pub invalid_zipcodes: BTreeMap<String, u64>,
    /// Street type token -> street names ending in it.
    pub unexpected_street_suffixes: BTreeMap<String, BTreeSet<String>>,
}

/// Shape of the document: what is in it and who contributed it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSurvey {
    /// Element name -> count: nodes, ways, relations and everything nested in
    /// them (`tag`, `nd`, `member`). The root and `bounds` are not counted.
    pub element_counts: BTreeMap<String, u64>,
    /// uid -> number of nodes, ways and relations carrying it.
    pub contributions: BTreeMap<String, u64>,
    pub node_tag_keys: BTreeMap<String, u64>,
    pub way_tag_keys: BTreeMap<String, u64>,
    /// Surveyed key -> raw value -> count, over nodes and ways.
    pub key_values: BTreeMap<String, BTreeMap<String, u64>>,
}

impl ElementSurvey {
    pub fn contributor_count(&self) -> usize {
        self.contributions.len()
    }

    pub fn top_contributors(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .contributions
            .iter()
            .map(|(uid, count)| (uid.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub tally: AuditTally,
    pub survey: ElementSurvey,
}

pub struct AuditAccumulator {
    zip_codes: ZipCodeRange,
    expected_suffixes: HashSet<String>,
    report: AuditReport,
}

impl AuditAccumulator {
    pub fn new(zip_codes: ZipCodeRange, expected_suffixes: impl IntoIterator<Item = String>) -> Self {
        AuditAccumulator {
            zip_codes,
            expected_suffixes: expected_suffixes.into_iter().collect(),
            report: AuditReport::default(),
        }
    }

    pub fn from_config(config: &UserConfig) -> Self {
        AuditAccumulator::new(config.zip_codes, config.expected_street_suffixes.clone())
    }

    pub fn audit_street(&mut self, street_name: &str) {
        if let Some(suffix) = street_type(street_name) {
            if !self.expected_suffixes.contains(suffix) {
                self.report
                    .tally
                    .unexpected_street_suffixes
                    .entry(suffix.to_string())
                    .or_default()
                    .insert(street_name.to_string());
            }
        }
    }

    pub fn audit_zipcode(&mut self, zipcode: &str) {
        if !self.zip_codes.accepts_raw(zipcode) {
            *self
                .report
                .tally
                .invalid_zipcodes
                .entry(zipcode.to_string())
                .or_default() += 1;
        }
    }

    pub fn observe(&mut self, element: &OsmElement) {
        let survey = &mut self.report.survey;
        *survey
            .element_counts
            .entry(element.kind.as_str().to_string())
            .or_default() += 1;
        *survey.element_counts.entry("tag".to_string()).or_default() += element.tags.len() as u64;
        for (name, count) in &element.children {
            *survey.element_counts.entry(name.clone()).or_default() += count;
        }
        if let Some(uid) = element.attribute("uid") {
            *survey.contributions.entry(uid.to_string()).or_default() += 1;
        }

        let key_counts = match element.kind {
            ElementKind::Node => &mut survey.node_tag_keys,
            ElementKind::Way => &mut survey.way_tag_keys,
            ElementKind::Relation => return,
        };
        for tag in &element.tags {
            *key_counts.entry(tag.key.clone()).or_default() += 1;
            if SURVEYED_KEYS.contains(&tag.key.as_str()) {
                *survey
                    .key_values
                    .entry(tag.key.clone())
                    .or_default()
                    .entry(tag.value.clone())
                    .or_default() += 1;
            }
        }

        for tag in &element.tags {
            match tag.key.as_str() {
                STREET_KEY => self.audit_street(&tag.value),
                POSTCODE_KEY => self.audit_zipcode(&tag.value),
                _ => (),
            }
        }
    }

    pub fn run<I>(mut self, elements: I) -> Result<AuditReport>
    where
        I: IntoIterator<Item = Result<OsmElement>>,
    {
        for element in elements {
            self.observe(&element?);
        }
        Ok(self.report)
    }

    pub fn report(&self) -> &AuditReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::clean::street::default_expected_suffixes;
    use crate::data::RawTag;

    fn accumulator() -> AuditAccumulator {
        AuditAccumulator::new(ZipCodeRange::default(), default_expected_suffixes())
    }

    fn element(kind: ElementKind, uid: &str, tags: &[(&str, &str)]) -> OsmElement {
        OsmElement {
            kind,
            attributes: vec![("id".into(), "1".into()), ("uid".into(), uid.into())],
            tags: tags
                .iter()
                .map(|(k, v)| RawTag { key: k.to_string(), value: v.to_string() })
                .collect(),
            ..OsmElement::new(kind)
        }
    }

    #[test]
    fn records_unexpected_street_suffixes() {
        let mut audit = accumulator();
        audit.audit_street("Forbes Ave");
        audit.audit_street("Penn Ave");
        audit.audit_street("Fifth Avenue");
        audit.audit_street("Liberty Ave.");

        let suffixes = &audit.report().tally.unexpected_street_suffixes;
        assert_eq!(suffixes.len(), 2);
        assert_eq!(
            suffixes["Ave"],
            BTreeSet::from(["Forbes Ave".to_string(), "Penn Ave".to_string()])
        );
        assert!(suffixes.contains_key("Ave."));
    }

    #[test]
    fn counts_invalid_zipcodes() {
        let mut audit = accumulator();
        for zipcode in ["15213", "15213-1234", "PA 15222", "15213-1234", "44101"] {
            audit.audit_zipcode(zipcode);
        }
        let invalid = &audit.report().tally.invalid_zipcodes;
        assert_eq!(invalid.get("15213"), None);
        assert_eq!(invalid["15213-1234"], 2);
        assert_eq!(invalid["PA 15222"], 1);
        assert_eq!(invalid["44101"], 1);
    }

    #[test]
    fn audits_nodes_and_ways_but_not_relations() {
        let mut way = element(ElementKind::Way, "8", &[("addr:postcode", "PA")]);
        way.children.insert("nd".into(), 3);
        let elements = vec![
            Ok(element(ElementKind::Node, "7", &[("addr:street", "Main St"), ("addr:city", "Pittsburgh")])),
            Ok(way),
            Ok(element(ElementKind::Relation, "7", &[("addr:street", "Relation Rd")])),
        ];
        let report = accumulator().run(elements).unwrap();

        assert!(report.tally.unexpected_street_suffixes.contains_key("St"));
        assert!(!report.tally.unexpected_street_suffixes.contains_key("Rd"));
        assert_eq!(report.tally.invalid_zipcodes["PA"], 1);

        assert_eq!(report.survey.element_counts["node"], 1);
        assert_eq!(report.survey.element_counts["relation"], 1);
        assert_eq!(report.survey.element_counts["tag"], 4);
        assert_eq!(report.survey.element_counts["nd"], 3);
        assert_eq!(report.survey.contributor_count(), 2);
        assert_eq!(report.survey.top_contributors(1), vec![("7", 2)]);
        assert_eq!(report.survey.node_tag_keys["addr:street"], 1);
        assert_eq!(report.survey.way_tag_keys["addr:postcode"], 1);

        let key_values = &report.survey.key_values;
        assert_eq!(key_values["addr:street"], BTreeMap::from([("Main St".to_string(), 1)]));
        assert_eq!(key_values["addr:city"]["Pittsburgh"], 1);
        assert_eq!(key_values["addr:postcode"]["PA"], 1);
        assert!(!key_values.contains_key("building"));
    }
}
