//! Relationship line routing
//!
//! Computes world-space anchor points and a cubic bezier path for every
//! relationship from the current table positions and column order. The canvas
//! scale plays no part here; only stroke and marker sizes depend on it.

use schemaboard_core::{
    ColumnId, Position, Positioned, RelationType, RelationshipId, SchemaError, TableId,
};
use schemaboard_graph::{Relationship, SchemaGraph, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Layout Metrics
// ============================================================================

/// Card layout numbers the router depends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Height of the table card header
    pub header_height: f64,
    /// Height of one column row
    pub row_height: f64,
    /// Horizontal distance of bezier control points from their anchors
    pub control_offset: f64,
    /// Half-size of the overflow-menu control placed at the midpoint
    pub menu_anchor_offset: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            header_height: 50.0,
            row_height: 32.0,
            control_offset: 120.0,
            menu_anchor_offset: 12.0,
        }
    }
}

// ============================================================================
// RoutedPath
// ============================================================================

/// A renderable relationship line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedPath {
    pub relationship_id: RelationshipId,
    /// SVG path data
    pub path: String,
    pub start: Position,
    pub end: Position,
    /// Top-left of the overflow-menu anchor
    pub midpoint: Position,
    /// Whether the table-center fallback was used
    pub used_fallback: bool,
}

// ============================================================================
// RelationshipRouter
// ============================================================================

/// Computes relationship paths from table geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelationshipRouter {
    metrics: LayoutMetrics,
}

impl RelationshipRouter {
    pub fn new(metrics: LayoutMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    /// Anchor of a column row on the left or right card edge
    ///
    /// A column missing from the table yields a NaN y.
    pub fn column_anchor(&self, table: &Table, column_id: ColumnId, right_edge: bool) -> Position {
        let y = match table.column_index(column_id) {
            Some(index) => {
                table.y
                    + self.metrics.header_height
                    + index as f64 * self.metrics.row_height
                    + self.metrics.row_height / 2.0
            }
            None => f64::NAN,
        };
        let x = if right_edge {
            table.x + table.width
        } else {
            table.x
        };
        Position::new(x, y)
    }

    /// Route one relationship between its two tables
    pub fn compute_path(
        &self,
        relationship: &Relationship,
        from_table: &Table,
        to_table: &Table,
    ) -> RoutedPath {
        let from_center = from_table.center();
        let to_center = to_table.center();
        let faces_right = from_center.x <= to_center.x;

        let (start, end, mut used_fallback) = match relationship.relation_type {
            RelationType::ManyToMany => (from_center, to_center, false),
            RelationType::OneToOne | RelationType::OneToMany => {
                let start = self.column_anchor(from_table, relationship.from_column_id, faces_right);
                let end = self.column_anchor(to_table, relationship.to_column_id, !faces_right);
                if start.x.is_nan() || start.y.is_nan() || end.x.is_nan() || end.y.is_nan() {
                    let err = SchemaError::InvalidCoordinates(format!(
                        "anchor of relationship {} is not a number",
                        relationship.id
                    ));
                    debug!("falling back to table centers: {}", err);
                    (from_center, to_center, true)
                } else {
                    (start, end, false)
                }
            }
        };

        if !start.is_finite() || !end.is_finite() {
            debug!(relationship = %relationship.id, "replacing non-finite coordinates");
            used_fallback = true;
        }
        let (x1, y1) = (finite(start.x), finite(start.y));
        let (x2, y2) = (finite(end.x), finite(end.y));

        let direction = if faces_right { 1.0 } else { -1.0 };
        let cx1 = finite(x1 + direction * self.metrics.control_offset);
        let cx2 = finite(x2 - direction * self.metrics.control_offset);

        let menu = self.metrics.menu_anchor_offset;
        let midpoint = Position::new(
            finite(x1 / 2.0 + x2 / 2.0 - menu),
            finite(y1 / 2.0 + y2 / 2.0 - menu),
        );

        RoutedPath {
            relationship_id: relationship.id,
            path: format!(
                "M {},{} C {},{} {},{} {},{}",
                x1, y1, cx1, y1, cx2, y2, x2, y2
            ),
            start: Position::new(x1, y1),
            end: Position::new(x2, y2),
            midpoint,
            used_fallback,
        }
    }

    /// Route every relationship of the graph, skipping dangling ones
    pub fn route_all(&self, graph: &SchemaGraph) -> Vec<RoutedPath> {
        graph
            .relationships()
            .filter_map(|rel| self.route_in_graph(graph, rel, None))
            .collect()
    }

    /// Route only the lines touching a table, optionally at a live drag position
    pub fn route_for_table(
        &self,
        graph: &SchemaGraph,
        table_id: TableId,
        drag_position: Option<Position>,
    ) -> Vec<RoutedPath> {
        let moved = drag_position.map(|p| (table_id, p));
        graph
            .relationships_for_table(table_id)
            .into_iter()
            .filter_map(|rel| self.route_in_graph(graph, rel, moved))
            .collect()
    }

    fn route_in_graph(
        &self,
        graph: &SchemaGraph,
        relationship: &Relationship,
        moved: Option<(TableId, Position)>,
    ) -> Option<RoutedPath> {
        let (Some(from), Some(to)) = (
            graph.table(relationship.from_table_id),
            graph.table(relationship.to_table_id),
        ) else {
            let err = SchemaError::dangling("relationship", relationship.id);
            debug!("skipping line: {}", err);
            return None;
        };

        let Some((moved_id, position)) = moved else {
            return Some(self.compute_path(relationship, from, to));
        };

        let place = |table: &Table| {
            let mut table = table.clone();
            if table.id == moved_id {
                table.set_position(position);
            }
            table
        };
        Some(self.compute_path(relationship, &place(from), &place(to)))
    }
}

fn finite(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use schemaboard_graph::{RelationshipOptions, TableColumn};
    use uuid::Uuid;

    fn linked(kind: RelationType) -> (SchemaGraph, Relationship) {
        let mut graph = SchemaGraph::new();
        let user = Table::new("user")
            .at(0.0, 0.0)
            .with_size(200.0, 150.0)
            .with_column(TableColumn::new("email", "TEXT"));
        let order = Table::new("order").at(500.0, 100.0).with_size(200.0, 150.0);
        let (user_id, order_id) = (user.id, order.id);
        graph.add_table(user).unwrap();
        graph.add_table(order).unwrap();
        let rel = graph
            .create_relationship(user_id, order_id, kind, RelationshipOptions::auto_link())
            .unwrap()
            .relationship;
        (graph, rel)
    }

    fn tables<'a>(graph: &'a SchemaGraph, rel: &Relationship) -> (&'a Table, &'a Table) {
        (
            graph.table(rel.from_table_id).unwrap(),
            graph.table(rel.to_table_id).unwrap(),
        )
    }

    #[test]
    fn test_anchors_face_each_other() {
        let (graph, rel) = linked(RelationType::OneToMany);
        let (from, to) = tables(&graph, &rel);
        let routed = RelationshipRouter::default().compute_path(&rel, from, to);

        // pk is row 0 of user, user_id is row 1 of order
        assert_eq!(routed.start, Position::new(200.0, 66.0));
        assert_eq!(routed.end, Position::new(500.0, 198.0));
        assert_eq!(routed.path, "M 200,66 C 320,66 380,198 500,198");
        assert_eq!(routed.midpoint, Position::new(338.0, 120.0));
        assert!(!routed.used_fallback);
    }

    #[test]
    fn test_anchors_flip_when_target_is_left() {
        let (mut graph, rel) = linked(RelationType::OneToOne);
        graph.move_table(rel.to_table_id, -600.0, 0.0).unwrap();
        let (from, to) = tables(&graph, &rel);
        let routed = RelationshipRouter::default().compute_path(&rel, from, to);

        assert_eq!(routed.start.x, 0.0);
        assert_eq!(routed.end.x, -400.0);
        assert_eq!(routed.path, "M 0,66 C -120,66 -280,98 -400,98");
    }

    #[test]
    fn test_many_to_many_uses_centers() {
        let (graph, rel) = linked(RelationType::ManyToMany);
        let (from, to) = tables(&graph, &rel);
        let routed = RelationshipRouter::default().compute_path(&rel, from, to);

        assert_eq!(routed.start, from.center());
        assert_eq!(routed.end, to.center());
        assert_eq!(routed.path, "M 100,75 C 220,75 480,175 600,175");
    }

    #[test]
    fn test_missing_column_falls_back_to_centers() {
        let (graph, mut rel) = linked(RelationType::OneToMany);
        rel.to_column_id = Uuid::new_v4();
        let (from, to) = tables(&graph, &rel);
        let routed = RelationshipRouter::default().compute_path(&rel, from, to);

        assert!(routed.used_fallback);
        assert_eq!(routed.start, from.center());
        assert_eq!(routed.end, to.center());
    }

    #[test]
    fn test_path_never_contains_nan() {
        let (graph, rel) = linked(RelationType::OneToMany);
        let (from, to) = tables(&graph, &rel);
        let router = RelationshipRouter::default();

        let cases = [
            (0.0, 0.0, 0.0, 0.0),
            (f64::NAN, 10.0, 0.0, 0.0),
            (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0.0),
            (1e308, 1e308, 1e308, 1e308),
        ];
        for (x, y, w, h) in cases {
            let mut broken_from = from.clone().at(x, y).with_size(w, h);
            let broken_to = to.clone().with_size(w, h);
            for kind in RelationType::all() {
                let mut r = rel.clone();
                r.relation_type = *kind;
                let routed = router.compute_path(&r, &broken_from, &broken_to);
                assert!(!routed.path.contains("NaN"), "{}", routed.path);
                assert!(!routed.path.contains("inf"), "{}", routed.path);
                assert!(routed.midpoint.is_finite());
            }
            broken_from.columns.clear();
            let routed = router.compute_path(&rel, &broken_from, &broken_to);
            assert!(!routed.path.contains("NaN"));
        }
    }

    #[test]
    fn test_route_all() {
        let (mut graph, rel) = linked(RelationType::OneToMany);
        let router = RelationshipRouter::default();
        let routes = router.route_all(&graph);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].relationship_id, rel.id);

        graph.remove_table(rel.to_table_id).unwrap();
        assert!(router.route_all(&graph).is_empty());
    }

    #[test]
    fn test_route_for_table_uses_drag_position() {
        let (graph, rel) = linked(RelationType::OneToMany);
        let router = RelationshipRouter::default();

        let routes = router.route_for_table(&graph, rel.from_table_id, Some(Position::new(100.0, 300.0)));
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].start, Position::new(300.0, 366.0));

        // the graph itself is untouched
        assert_eq!(graph.table(rel.from_table_id).unwrap().y, 0.0);
        assert!(router.route_for_table(&graph, Uuid::new_v4(), None).is_empty());
    }

    #[test]
    fn test_custom_metrics() {
        let (graph, rel) = linked(RelationType::OneToMany);
        let (from, to) = tables(&graph, &rel);
        let metrics = LayoutMetrics {
            header_height: 40.0,
            row_height: 20.0,
            control_offset: 60.0,
            menu_anchor_offset: 0.0,
        };
        let routed = RelationshipRouter::new(metrics).compute_path(&rel, from, to);
        assert_eq!(routed.path, "M 200,50 C 260,50 440,170 500,170");
    }
}
