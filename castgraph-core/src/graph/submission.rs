use std::io;
use std::path::Path;

use crate::core::ChapterId;
use crate::graph::CharacterGraph;
use crate::Result;

/// One manifest row: a chapter and its GraphML document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubmissionRow {
    /// Chapter identifier
    #[serde(rename = "ID")]
    pub id: String,
    /// GraphML document
    pub graphml: String,
}

/// Writes the `ID,graphml` CSV manifest
pub struct SubmissionWriter<W: io::Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl SubmissionWriter<std::fs::File> {
    /// Create the manifest file, truncating any existing one
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_csv(csv::Writer::from_path(path)?))
    }
}

impl<W: io::Write> SubmissionWriter<W> {
    /// Write the manifest into any writer
    pub fn new(writer: W) -> Self {
        Self::from_csv(csv::Writer::from_writer(writer))
    }

    fn from_csv(writer: csv::Writer<W>) -> Self {
        Self { writer, rows: 0 }
    }

    /// Append a chapter graph
    pub fn write_graph(&mut self, id: &ChapterId, graph: &CharacterGraph) -> Result<()> {
        self.write_row(&SubmissionRow {
            id: id.to_string(),
            graphml: graph.to_graphml(),
        })
    }

    /// Append a prepared row
    pub fn write_row(&mut self, row: &SubmissionRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of rows written
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        tracing::info!(rows = self.rows, "submission manifest written");
        Ok(self.rows)
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::CastGraphError::Io(e.into_error()))
    }
}

/// Read a manifest back
pub fn read_submission<P: AsRef<Path>>(path: P) -> Result<Vec<SubmissionRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> CharacterGraph {
        let mut graph = CharacterGraph::new(true);
        graph
            .add_interaction(
                &["Hari".to_string(), "Hari Seldon".to_string()],
                &["Dors".to_string()],
            )
            .unwrap();
        graph
    }

    #[test]
    fn test_manifest_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submission.csv");

        let mut writer = SubmissionWriter::create(&path).unwrap();
        writer
            .write_graph(&ChapterId::from_chapter_number("paf", 1), &sample_graph())
            .unwrap();
        writer
            .write_graph(&ChapterId::from_chapter_number("lca", 18), &CharacterGraph::default())
            .unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let rows = read_submission(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "paf0");
        assert_eq!(rows[1].id, "lca17");
        assert!(rows[0].graphml.contains("Hari;Hari Seldon"));
    }

    #[test]
    fn test_header_is_id_graphml() {
        let mut writer = SubmissionWriter::new(Vec::new());
        writer
            .write_row(&SubmissionRow {
                id: "paf3".to_string(),
                graphml: "<graphml/>".to_string(),
            })
            .unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("ID,graphml\n"));
        assert!(text.contains("paf3,<graphml/>"));
    }
}
