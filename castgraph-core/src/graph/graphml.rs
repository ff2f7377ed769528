use quick_xml::escape::escape;

use crate::graph::CharacterGraph;

const NAMES_KEY: &str = "d0";
const WEIGHT_KEY: &str = "d1";

const HEADER: &str = "<?xml version='1.0' encoding='utf-8'?>\n\
<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
xsi:schemaLocation=\"http://graphml.graphdrawing.org/xmlns \
http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd\">\n";

/// Serialise a character graph as a GraphML document
///
/// Nodes carry a string `names` attribute; edges of a weighted graph carry an
/// integer `weight` attribute.
pub fn to_graphml(graph: &CharacterGraph) -> String {
    let mut out = String::from(HEADER);
    if graph.is_weighted() {
        out.push_str(&format!(
            "  <key id=\"{WEIGHT_KEY}\" for=\"edge\" attr.name=\"weight\" attr.type=\"long\" />\n"
        ));
    }
    out.push_str(&format!(
        "  <key id=\"{NAMES_KEY}\" for=\"node\" attr.name=\"names\" attr.type=\"string\" />\n"
    ));
    out.push_str("  <graph edgedefault=\"undirected\">\n");

    for node in graph.nodes() {
        out.push_str(&format!("    <node id=\"{}\">\n", escape(node.key.as_str())));
        out.push_str(&format!(
            "      <data key=\"{NAMES_KEY}\">{}</data>\n",
            escape(node.names.as_str())
        ));
        out.push_str("    </node>\n");
    }

    for (source, target, weight) in graph.edges() {
        let (source, target) = (escape(source), escape(target));
        if graph.is_weighted() {
            out.push_str(&format!("    <edge source=\"{source}\" target=\"{target}\">\n"));
            out.push_str(&format!("      <data key=\"{WEIGHT_KEY}\">{weight}</data>\n"));
            out.push_str("    </edge>\n");
        } else {
            out.push_str(&format!("    <edge source=\"{source}\" target=\"{target}\" />\n"));
        }
    }

    out.push_str("  </graph>\n</graphml>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(weighted: bool) -> CharacterGraph {
        let mut graph = CharacterGraph::new(weighted);
        let cleon = vec!["CLÉON Ier".to_string(), "l'Empereur".to_string()];
        let demerzel = vec!["Demerzel".to_string()];
        graph.add_interaction(&cleon, &demerzel).unwrap();
        graph.add_interaction(&demerzel, &cleon).unwrap();
        graph
    }

    #[test]
    fn test_weighted_graphml() {
        let xml = to_graphml(&graph(true));
        assert!(xml.contains("attr.name=\"weight\""));
        assert!(xml.contains("<node id=\"CLÉON Ier\">"));
        assert!(xml.contains("<data key=\"d0\">CLÉON Ier;l&apos;Empereur</data>"));
        assert!(xml.contains("<data key=\"d1\">2</data>"));
        assert!(xml.trim_end().ends_with("</graphml>"));
    }

    #[test]
    fn test_unweighted_graphml_has_no_weight_key() {
        let xml = graph(false).to_graphml();
        assert!(!xml.contains("weight"));
        assert_eq!(xml.matches("<edge ").count(), 1);
    }

    #[test]
    fn test_markup_in_names_is_escaped() {
        let mut graph = CharacterGraph::new(false);
        let odd = vec!["R&D <\"Raych\">".to_string()];
        let dors = vec!["Dors".to_string()];
        graph.add_interaction(&odd, &dors).unwrap();

        let xml = graph.to_graphml();
        assert!(xml.contains("<node id=\"R&amp;D &lt;&quot;Raych&quot;&gt;\">"));
        assert!(xml.contains("source=\"R&amp;D &lt;&quot;Raych&quot;&gt;\" target=\"Dors\""));
        assert!(!xml.contains("<\"Raych"));
    }
}
