use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::data::{NodeRecord, TagRecord, WayRecord};
use crate::errors::Result;

pub const NODES_FILE_NAME: &str = "nodes.csv";
pub const WAYS_FILE_NAME: &str = "ways.csv";
pub const NODES_TAGS_FILE_NAME: &str = "nodes_tags.csv";
pub const WAYS_TAGS_FILE_NAME: &str = "ways_tags.csv";

pub const TABLE_FILE_NAMES: [&str; 4] = [
    NODES_FILE_NAME,
    WAYS_FILE_NAME,
    NODES_TAGS_FILE_NAME,
    WAYS_TAGS_FILE_NAME,
];

/// Receiver of the four record streams produced by the extractor. Records
/// arrive in document order, one element at a time.
pub trait RecordSink {
    fn write_node(&mut self, record: &NodeRecord) -> Result<()>;
    fn write_way(&mut self, record: &WayRecord) -> Result<()>;
    fn write_node_tag(&mut self, record: &TagRecord) -> Result<()>;
    fn write_way_tag(&mut self, record: &TagRecord) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes `nodes.csv`, `ways.csv`, `nodes_tags.csv` and `ways_tags.csv`
/// with a header row each. Null columns are written as empty fields.
pub struct CsvSink {
    nodes: Writer<File>,
    ways: Writer<File>,
    nodes_tags: Writer<File>,
    ways_tags: Writer<File>,
}

impl CsvSink {
    pub fn create(dir: &Path) -> Result<Self> {
        Ok(CsvSink {
            nodes: Writer::from_path(dir.join(NODES_FILE_NAME))?,
            ways: Writer::from_path(dir.join(WAYS_FILE_NAME))?,
            nodes_tags: Writer::from_path(dir.join(NODES_TAGS_FILE_NAME))?,
            ways_tags: Writer::from_path(dir.join(WAYS_TAGS_FILE_NAME))?,
        })
    }

    pub fn table_paths(dir: &Path) -> Vec<PathBuf> {
        TABLE_FILE_NAMES.iter().map(|name| dir.join(name)).collect()
    }
}

impl RecordSink for CsvSink {
    fn write_node(&mut self, record: &NodeRecord) -> Result<()> {
        Ok(self.nodes.serialize(record)?)
    }

    fn write_way(&mut self, record: &WayRecord) -> Result<()> {
        Ok(self.ways.serialize(record)?)
    }

    fn write_node_tag(&mut self, record: &TagRecord) -> Result<()> {
        Ok(self.nodes_tags.serialize(record)?)
    }

    fn write_way_tag(&mut self, record: &TagRecord) -> Result<()> {
        Ok(self.ways_tags.serialize(record)?)
    }

    fn finish(&mut self) -> Result<()> {
        self.nodes.flush()?;
        self.ways.flush()?;
        self.nodes_tags.flush()?;
        self.ways_tags.flush()?;
        Ok(())
    }
}

/// Keeps every record in memory. Only meant for small documents.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemorySink {
    pub nodes: Vec<NodeRecord>,
    pub ways: Vec<WayRecord>,
    pub nodes_tags: Vec<TagRecord>,
    pub ways_tags: Vec<TagRecord>,
}

impl RecordSink for MemorySink {
    fn write_node(&mut self, record: &NodeRecord) -> Result<()> {
        self.nodes.push(record.clone());
        Ok(())
    }

    fn write_way(&mut self, record: &WayRecord) -> Result<()> {
        self.ways.push(record.clone());
        Ok(())
    }

    fn write_node_tag(&mut self, record: &TagRecord) -> Result<()> {
        self.nodes_tags.push(record.clone());
        Ok(())
    }

    fn write_way_tag(&mut self, record: &TagRecord) -> Result<()> {
        self.ways_tags.push(record.clone());
        Ok(())
    }
}
