//! Genealogy edges and the one-hop query surface.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracelot_core::{BusinessRefs, LotLinkId};

/// Transformation that produced the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotLinkKind {
    Split,
    Merge,
    Produce,
    Consume,
    Rework,
}

/// Directed genealogy edge: parent lot → child lot.
///
/// Immutable once written. Multiple edges between the same pair are allowed
/// (repeated merges over time); no cycle detection is performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotLink {
    pub id: LotLinkId,
    pub at: DateTime<Utc>,
    pub kind: LotLinkKind,
    pub parent_code: String,
    pub child_code: String,
    pub qty: Option<Decimal>,
    pub unit: Option<String>,
    pub refs: BusinessRefs,
    pub actor: String,
    pub note: Option<String>,
}

impl LotLink {
    pub fn new(
        kind: LotLinkKind,
        parent_code: impl Into<String>,
        child_code: impl Into<String>,
        qty: Option<Decimal>,
        unit: Option<String>,
        actor: impl Into<String>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: LotLinkId::new(),
            at: Utc::now(),
            kind,
            parent_code: parent_code.into(),
            child_code: child_code.into(),
            qty,
            unit,
            refs: BusinessRefs::none(),
            actor: actor.into(),
            note,
        }
    }
}

/// Append-only edge list with one-hop queries.
///
/// Multi-hop ancestor/descendant traversal is deliberately out of scope:
/// callers that need full lineage walk the one-hop queries themselves.
#[derive(Debug, Default)]
pub struct GenealogyGraph {
    links: Vec<LotLink>,
}

impl GenealogyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, link: LotLink) {
        self.links.push(link);
    }

    /// Immediate parents: edges where the given lot is the child.
    pub fn upstream<'a>(&'a self, lot_code: &str) -> Vec<&'a LotLink> {
        self.links
            .iter()
            .filter(|l| l.child_code == lot_code)
            .collect()
    }

    /// Immediate children: edges where the given lot is the parent.
    pub fn downstream<'a>(&'a self, lot_code: &str) -> Vec<&'a LotLink> {
        self.links
            .iter()
            .filter(|l| l.parent_code == lot_code)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn split_link(parent: &str, child: &str, qty: Decimal) -> LotLink {
        LotLink::new(
            LotLinkKind::Split,
            parent,
            child,
            Some(qty),
            Some("kg".to_string()),
            "tester",
            None,
        )
    }

    #[test]
    fn upstream_and_downstream_are_one_hop() {
        let mut graph = GenealogyGraph::new();
        graph.add(split_link("A", "B", dec!(10)));
        graph.add(split_link("B", "C", dec!(5)));

        let down_a = graph.downstream("A");
        assert_eq!(down_a.len(), 1);
        assert_eq!(down_a[0].child_code, "B");

        // C is two hops from A; one-hop queries do not see it.
        assert!(graph.downstream("A").iter().all(|l| l.child_code != "C"));

        let up_c = graph.upstream("C");
        assert_eq!(up_c.len(), 1);
        assert_eq!(up_c[0].parent_code, "B");
    }

    #[test]
    fn repeated_edges_between_the_same_pair_are_kept() {
        let mut graph = GenealogyGraph::new();
        graph.add(LotLink::new(
            LotLinkKind::Merge,
            "P",
            "C",
            Some(dec!(5)),
            Some("kg".to_string()),
            "tester",
            None,
        ));
        graph.add(LotLink::new(
            LotLinkKind::Merge,
            "P",
            "C",
            Some(dec!(7)),
            Some("kg".to_string()),
            "tester",
            None,
        ));
        assert_eq!(graph.upstream("C").len(), 2);
    }

    #[test]
    fn queries_do_not_mutate_the_graph() {
        let mut graph = GenealogyGraph::new();
        graph.add(split_link("A", "B", dec!(10)));
        let before = graph.len();
        let _ = graph.upstream("B");
        let _ = graph.downstream("A");
        let _ = graph.upstream("UNKNOWN");
        assert_eq!(graph.len(), before);
    }
}
