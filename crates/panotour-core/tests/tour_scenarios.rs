use std::rc::Rc;

use chrono::{TimeZone, Utc};
use panotour_core::{
    CommandHistory, EdgeType, EntityRef, Graph, MemorySink, NewEdge, NewSpatialGroup,
    NewTemporalGroup, NewVertex, SerializeOptions, TourDocument, VertexType,
};
use serde_json::json;

fn snapshot(graph: &Graph) -> TourDocument {
    graph.to_json(&SerializeOptions {
        persist_landmarks: true,
    })
}

fn trip_with_two_vertices() -> (Graph, CommandHistory, Rc<MemorySink>) {
    let mut graph = Graph::new();
    let sink = Rc::new(MemorySink::new());
    let history = CommandHistory::with_sink(&mut graph, sink.clone());

    graph
        .create_temporal_group(NewTemporalGroup::new("Trip"))
        .unwrap();
    graph
        .create_spatial_group(
            NewSpatialGroup::new("Day1")
                .with_super_group("trip")
                .with_timeslot(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        )
        .unwrap();
    graph
        .create_vertex(NewVertex::new([38.7100, -9.1400]).with_id("A").in_group("day1"))
        .unwrap();
    graph
        .create_vertex(NewVertex::new([38.7105, -9.1410]).with_id("B").in_group("day1"))
        .unwrap();
    history.commit();
    (graph, history, sink)
}

#[test]
fn test_trip_route_edge_undo() {
    let (mut graph, history, sink) = trip_with_two_vertices();

    let id = graph
        .create_edge(NewEdge::new("A", "B").bidirectional())
        .unwrap();
    assert_eq!(graph.get_vertex("A").unwrap().outgoing_edges.len(), 1);
    assert_eq!(graph.get_vertex("B").unwrap().outgoing_edges.len(), 1);
    let edge = graph.get_edge(id.as_str()).unwrap();
    assert_eq!(edge.edge_type, EdgeType::Route);
    let opposite = edge.opposite.clone().unwrap();
    assert_eq!(graph.get_edge(opposite.as_str()).unwrap().edge_type, EdgeType::Route);

    history.commit();
    history.undo(&mut graph).unwrap();

    assert_eq!(graph.edge_count(), 0);
    assert!(graph.get_vertex("A").unwrap().outgoing_edges.is_empty());
    assert!(graph.get_vertex("B").unwrap().outgoing_edges.is_empty());
    assert!(sink.is_empty());

    // And back again, still paired
    history.redo(&mut graph).unwrap();
    let edge = graph.get_edge(id.as_str()).unwrap();
    assert_eq!(edge.opposite.as_ref(), Some(&opposite));
    assert_eq!(
        graph.get_edge(opposite.as_str()).unwrap().opposite.as_ref(),
        Some(&id)
    );
    assert!(graph.is_valid());
}

#[test]
fn test_deleting_vertex_with_landmark_edge() {
    let (mut graph, _history, _) = trip_with_two_vertices();
    graph
        .create_vertex(
            NewVertex::new([38.7139, -9.1334])
                .with_id("L")
                .with_type(VertexType::Landmark),
        )
        .unwrap();
    let id = graph
        .create_edge(NewEdge::new("A", "L").bidirectional())
        .unwrap();
    assert_eq!(graph.get_edge(id.as_str()).unwrap().edge_type, EdgeType::Landmark);

    graph.delete_vertex("A").unwrap();
    assert!(!graph.has_edge(id.as_str()));
    assert!(graph.get_vertex("L").unwrap().outgoing_edges.is_empty());
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_undo_restores_cascading_delete() {
    let (mut graph, history, sink) = trip_with_two_vertices();
    graph
        .create_edge(NewEdge::new("A", "B").bidirectional().with_data("yaw", json!(90)))
        .unwrap();
    history.commit();
    let before = snapshot(&graph);

    graph.delete_spatial_group("day1").unwrap();
    history.commit();
    assert_eq!(graph.vertex_count(), 0);
    let after = snapshot(&graph);

    history.undo(&mut graph).unwrap();
    assert_eq!(snapshot(&graph), before);
    assert!(graph.is_valid());

    history.redo(&mut graph).unwrap();
    assert_eq!(snapshot(&graph), after);

    history.undo(&mut graph).unwrap();
    assert_eq!(snapshot(&graph), before);
    assert!(sink.is_empty(), "{:?}", sink.records());
}

#[test]
fn test_undo_restores_deleted_trip() {
    let (mut graph, history, sink) = trip_with_two_vertices();
    graph
        .create_vertex(
            NewVertex::new([38.7139, -9.1334])
                .with_id("L")
                .with_type(VertexType::Landmark),
        )
        .unwrap();
    graph
        .create_edge(NewEdge::new("A", "B").bidirectional())
        .unwrap();
    graph
        .create_edge(NewEdge::new("B", "L").bidirectional())
        .unwrap();
    history.commit();
    let before = snapshot(&graph);

    graph.delete_temporal_group("trip").unwrap();
    history.commit();
    assert!(!graph.has_vertex("A"));
    assert!(graph.get_vertex("L").unwrap().outgoing_edges.is_empty());

    history.undo(&mut graph).unwrap();
    assert_eq!(snapshot(&graph), before);
    assert!(sink.is_empty(), "{:?}", sink.records());
}

#[test]
fn test_mixed_routine_round_trip() {
    let (mut graph, history, sink) = trip_with_two_vertices();
    let before = snapshot(&graph);

    graph
        .create_spatial_group(NewSpatialGroup::new("Day2").with_super_group("trip"))
        .unwrap();
    graph
        .create_vertex(NewVertex::new([38.72, -9.15]).with_id("C").in_group("day2"))
        .unwrap();
    graph
        .create_edge(NewEdge::new("B", "C").bidirectional())
        .unwrap();
    graph.update_coordinates("A", [38.7101, -9.1401]).unwrap();
    graph
        .add_to(
            &EntityRef::Vertex("B".into()),
            &EntityRef::SpatialGroup("day2".into()),
        )
        .unwrap();
    graph.delete_vertex("A").unwrap();
    history.commit();
    let after = snapshot(&graph);

    history.undo(&mut graph).unwrap();
    assert_eq!(snapshot(&graph), before);
    history.redo(&mut graph).unwrap();
    assert_eq!(snapshot(&graph), after);
    assert!(sink.is_empty(), "{:?}", sink.records());
}

#[test]
fn test_undo_upgrade_keeps_one_way_edge() {
    let (mut graph, history, sink) = trip_with_two_vertices();
    graph.create_edge(NewEdge::new("A", "B")).unwrap();
    history.commit();
    let one_way = snapshot(&graph);

    graph
        .create_edge(NewEdge::new("A", "B").bidirectional())
        .unwrap();
    assert_eq!(graph.edge_count(), 2);
    history.commit();
    history.undo(&mut graph).unwrap();

    let edge = graph.get_edge("A:B:route").unwrap();
    assert!(edge.opposite.is_none());
    assert!(!graph.has_edge("B:A:route"));
    assert_eq!(snapshot(&graph), one_way);
    assert!(graph.is_valid());
    assert!(sink.is_empty());

    history.redo(&mut graph).unwrap();
    assert_eq!(
        graph.get_edge("A:B:route").unwrap().opposite.as_ref().map(|o| o.as_str()),
        Some("B:A:route")
    );
    assert!(graph.is_valid());

    // Undoing the original edge too leaves nothing behind
    history.undo(&mut graph).unwrap();
    history.undo(&mut graph).unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_undo_pairing_with_existing_edge() {
    let (mut graph, history, sink) = trip_with_two_vertices();
    graph.create_edge(NewEdge::new("A", "B")).unwrap();
    history.commit();

    graph
        .create_edge(NewEdge::new("B", "A").with_opposite("A:B:route"))
        .unwrap();
    assert_eq!(
        graph.get_edge("A:B:route").unwrap().opposite.as_ref().map(|o| o.as_str()),
        Some("B:A:route")
    );
    history.commit();
    history.undo(&mut graph).unwrap();

    assert!(graph.has_edge("A:B:route"));
    assert!(graph.get_edge("A:B:route").unwrap().opposite.is_none());
    assert_eq!(graph.get_vertex("A").unwrap().outgoing_edges.len(), 1);
    assert!(graph.get_vertex("B").unwrap().outgoing_edges.is_empty());
    assert!(graph.is_valid());
    assert!(sink.is_empty());
}

#[test]
fn test_undo_restores_outgoing_order() {
    let (mut graph, history, sink) = trip_with_two_vertices();
    for (id, lat) in [("D", 38.7120), ("C", 38.7110)] {
        graph
            .create_vertex(NewVertex::new([lat, -9.1400]).with_id(id).in_group("day1"))
            .unwrap();
    }
    for to in ["D", "B", "C"] {
        graph.create_edge(NewEdge::new("A", to)).unwrap();
    }
    graph.create_edge(NewEdge::new("B", "A")).unwrap();
    history.commit();

    let outgoing = graph.get_vertex("A").unwrap().outgoing_edges.clone();
    let ids: Vec<&str> = outgoing.iter().map(|e| e.as_str()).collect();
    assert_eq!(ids, ["A:B:route", "A:C:route", "A:D:route"]);

    graph.delete_edge("A:C:route").unwrap();
    history.commit();
    history.undo(&mut graph).unwrap();
    assert_eq!(graph.get_vertex("A").unwrap().outgoing_edges, outgoing);

    graph.delete_vertex("A").unwrap();
    history.commit();
    history.undo(&mut graph).unwrap();
    assert_eq!(graph.get_vertex("A").unwrap().outgoing_edges, outgoing);
    assert!(graph.is_valid());
    assert!(sink.is_empty());
}

#[test]
fn test_redo_invalidated_by_new_work() {
    let (mut graph, history, _) = trip_with_two_vertices();
    graph.create_edge(NewEdge::new("A", "B")).unwrap();
    history.commit();
    history.undo(&mut graph).unwrap();
    assert_eq!(history.redo_stack_count(), 1);

    graph.update_coordinates("B", [0.0, 0.0]).unwrap();
    history.commit();
    assert_eq!(history.redo_stack_count(), 0);
    assert!(history.redo(&mut graph).is_err());
}

#[test]
fn test_thousand_undos() {
    let mut graph = Graph::new();
    graph
        .create_spatial_group(NewSpatialGroup::new("Day1"))
        .unwrap();
    let sink = Rc::new(MemorySink::new());
    let history = CommandHistory::with_sink(&mut graph, sink.clone());

    for i in 0..1000 {
        graph
            .create_vertex(
                NewVertex::new([i as f64 / 1000.0, 0.0])
                    .with_id(format!("v{i}"))
                    .in_group("day1"),
            )
            .unwrap();
        history.commit();
    }
    assert_eq!(history.undo_stack_count(), 1000);

    for _ in 0..1000 {
        history.undo(&mut graph).unwrap();
    }
    assert_eq!(graph.vertex_count(), 0);
    assert_eq!(history.redo_stack_count(), 1000);
    assert!(sink.is_empty());
}

#[test]
fn test_load_then_clear_is_clean() {
    let (graph, _, _) = trip_with_two_vertices();
    let document = snapshot(&graph);

    let mut loaded = Graph::new();
    let history = CommandHistory::new(&mut loaded);
    loaded.load_document(&document).unwrap();
    assert!(history.is_dirty());
    history.clear();
    assert!(!history.is_dirty());
    assert!(!history.can_undo());
    assert_eq!(snapshot(&loaded), document);
}
