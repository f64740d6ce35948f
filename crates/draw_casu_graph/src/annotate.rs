//! Attaches fixed layout positions to the nodes of a DOT graph.

use graphviz_rust::dot_structures::{
    Attribute, Edge, EdgeTy, Graph, Id, Node, NodeId, Stmt, Subgraph, Vertex,
};
use specs::ArenaNode;
use std::collections::{BTreeMap, BTreeSet};

/// Plain text of a DOT identifier, without the quotes of escaped strings.
fn id_text(id: &Id) -> &str {
    match id {
        Id::Escaped(s) => s
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(s.as_str()),
        Id::Html(s) | Id::Plain(s) | Id::Anonymous(s) => s.as_str(),
    }
}

/// Topology node names may be qualified (`arena/casu-001`); the arena only
/// knows the second component.
fn arena_key(name: &str) -> &str {
    let mut parts = name.split('/');
    match (parts.next(), parts.next()) {
        (Some(_), Some(node)) => node,
        _ => name,
    }
}

struct Annotator<'a> {
    nodes: &'a BTreeMap<String, ArenaNode>,
    scale: f64,
    declared: BTreeSet<String>,
    referenced: Vec<NodeId>,
    annotated: BTreeSet<String>,
}

impl Annotator<'_> {
    /// The `pos` value for a topology node, if the arena places it.
    fn position(&self, name: &str) -> Option<Id> {
        let pose = self.nodes.get(arena_key(name))?.pose?;
        Some(Id::Escaped(format!(
            "\"{},{}!\"",
            pose.x / self.scale,
            pose.y / self.scale
        )))
    }

    fn visit(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Node(node) => self.visit_node(node),
                Stmt::Subgraph(subgraph) => self.visit(&mut subgraph.stmts),
                Stmt::Edge(edge) => self.visit_edge(edge),
                _ => {}
            }
        }
    }

    fn visit_node(&mut self, node: &mut Node) {
        let name = id_text(&node.id.0).to_owned();
        if let Some(pos) = self.position(&name) {
            set_attribute(&mut node.attributes, "pos", pos);
            self.annotated.insert(name.clone());
        }
        self.declared.insert(name);
    }

    fn visit_edge(&mut self, edge: &mut Edge) {
        match &mut edge.ty {
            EdgeTy::Pair(a, b) => {
                self.visit_vertex(a);
                self.visit_vertex(b);
            }
            EdgeTy::Chain(vertices) => {
                for vertex in vertices {
                    self.visit_vertex(vertex);
                }
            }
        }
    }

    fn visit_vertex(&mut self, vertex: &mut Vertex) {
        match vertex {
            Vertex::N(id) => self.referenced.push(id.clone()),
            Vertex::S(Subgraph { stmts, .. }) => self.visit(stmts),
        }
    }
}

fn set_attribute(attributes: &mut Vec<Attribute>, key: &str, value: Id) {
    match attributes.iter_mut().find(|a| id_text(&a.0) == key) {
        Some(existing) => existing.1 = value,
        None => attributes.push(Attribute(Id::Plain(key.to_owned()), value)),
    }
}

/// Adds a `pos="x,y!"` attribute (arena coordinates divided by `scale`) to every
/// node the arena places, declaring nodes that only appear in edges.
///
/// Returns the names of the annotated nodes.
pub fn annotate(graph: &mut Graph, nodes: &BTreeMap<String, ArenaNode>, scale: f64) -> Vec<String> {
    let stmts = match graph {
        Graph::Graph { stmts, .. } | Graph::DiGraph { stmts, .. } => stmts,
    };

    let mut annotator = Annotator {
        nodes,
        scale,
        declared: BTreeSet::new(),
        referenced: Vec::new(),
        annotated: BTreeSet::new(),
    };
    annotator.visit(stmts);

    for id in std::mem::take(&mut annotator.referenced) {
        let name = id_text(&id.0).to_owned();
        if annotator.declared.contains(&name) {
            continue;
        }
        if let Some(pos) = annotator.position(&name) {
            stmts.push(Stmt::Node(Node {
                id: NodeId(id.0, None),
                attributes: vec![Attribute(Id::Plain("pos".to_owned()), pos)],
            }));
            annotator.annotated.insert(name.clone());
        }
        annotator.declared.insert(name);
    }

    annotator.annotated.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use specs::Arena;

    const TOPOLOGY: &str = r#"
digraph nbg {
    "casu-001" -> "casu-002";
    "casu-002" [label="two", pos="0,0"];
    "arena/casu-003" -> "casu-001";
    subgraph cluster_w { "casu-004"; }
    lonely;
}
"#;

    const ARENA: &str = r#"
north:
  casu-001: {pose: {x: 0, y: 9}}
  casu-002: {pose: {x: 9, y: 9}}
south:
  casu-003: {pose: {x: -9, y: 0}}
  casu-004: {pose: {x: 3, y: -3}}
"#;

    fn find_pos(stmts: &[Stmt], name: &str) -> Option<String> {
        for stmt in stmts {
            match stmt {
                Stmt::Node(node) if id_text(&node.id.0) == name => {
                    return node
                        .attributes
                        .iter()
                        .find(|a| id_text(&a.0) == "pos")
                        .map(|a| id_text(&a.1).to_owned());
                }
                Stmt::Subgraph(subgraph) => {
                    if let Some(pos) = find_pos(&subgraph.stmts, name) {
                        return Some(pos);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn annotated_graph() -> (Graph, Vec<String>) {
        let mut graph = graphviz_rust::parse(TOPOLOGY).unwrap();
        let arena: Arena = arena_fixture(ARENA);
        let names = annotate(&mut graph, &arena.flatten().unwrap(), 3.0);
        (graph, names)
    }

    fn arena_fixture(yaml: &str) -> Arena {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.arena");
        std::fs::write(&path, yaml).unwrap();
        Arena::load(&path).unwrap()
    }

    fn stmts(graph: &Graph) -> &[Stmt] {
        match graph {
            Graph::Graph { stmts, .. } | Graph::DiGraph { stmts, .. } => stmts,
        }
    }

    #[test]
    fn test_arena_key() {
        assert_eq!(arena_key("casu-001"), "casu-001");
        assert_eq!(arena_key("arena/casu-001"), "casu-001");
        assert_eq!(arena_key("a/b/c"), "b");
    }

    #[test]
    fn test_positions_scaled_and_pinned() {
        let (graph, names) = annotated_graph();
        assert_eq!(names, ["arena/casu-003", "casu-001", "casu-002", "casu-004"]);

        let stmts = stmts(&graph);
        assert_eq!(find_pos(stmts, "casu-001").as_deref(), Some("0,3!"));
        assert_eq!(find_pos(stmts, "arena/casu-003").as_deref(), Some("-3,0!"));
        assert_eq!(find_pos(stmts, "casu-004").as_deref(), Some("1,-1!"));
        assert_eq!(find_pos(stmts, "lonely"), None);
    }

    #[test]
    fn test_existing_pos_is_replaced() {
        let (graph, _) = annotated_graph();
        assert_eq!(find_pos(stmts(&graph), "casu-002").as_deref(), Some("3,3!"));
    }

    #[test]
    fn test_output_reparses() {
        use graphviz_rust::printer::{DotPrinter, PrinterContext};

        let (graph, _) = annotated_graph();
        let dot = graph.print(&mut PrinterContext::default());
        let reparsed = graphviz_rust::parse(&dot).unwrap();
        assert_eq!(find_pos(stmts(&reparsed), "casu-001").as_deref(), Some("0,3!"));
    }
}
