//! Undo/redo built from graph change events
//!
//! The history subscribes to the graph's hub and turns every CREATE, DELETE
//! and before-update event into the command that reverses it. Commands pile
//! up in a routine until [`CommandHistory::commit`] closes it; one undo
//! replays one routine newest-first. While a routine is replayed the graph
//! emits events again, and the mode decides where their inverses go:
//!
//! | mode      | recorded into  | clears redo |
//! |-----------|----------------|-------------|
//! | `Normal`  | undo routine   | yes         |
//! | `Undoing` | redo routine   | no          |
//! | `Redoing` | undo routine   | no          |

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use tokio::sync::watch;
use tracing::debug;

use crate::edge::NewEdge;
use crate::error::{Error, Result, StackKind};
use crate::event::{Attribute, EntityKind, EntityState, Event, Operation, Topic};
use crate::graph::{EntityRef, Graph};
use crate::hub::SubscriptionId;
use crate::log::{LogRecord, LogSink, TracingSink};
use crate::spatial_group::NewSpatialGroup;
use crate::temporal_group::NewTemporalGroup;
use crate::vertex::NewVertex;

type Apply = Box<dyn FnOnce(&mut Graph) -> Result<()>>;

/// A labelled, one-shot graph mutation
pub struct Command {
    label: String,
    apply: Apply,
}

impl Command {
    pub fn new<F>(label: impl Into<String>, apply: F) -> Self
    where
        F: FnOnce(&mut Graph) -> Result<()> + 'static,
    {
        Self {
            label: label.into(),
            apply: Box::new(apply),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn run(self, graph: &mut Graph) -> Result<()> {
        (self.apply)(graph)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("label", &self.label).finish()
    }
}

type Routine = Vec<Command>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Undoing,
    Redoing,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Undoing => "undoing",
            Self::Redoing => "redoing",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct State {
    mode: Mode,
    undo_stack: Vec<Routine>,
    redo_stack: Vec<Routine>,
    undo_routine: Routine,
    redo_routine: Routine,
    dirty: bool,
    undo_available: watch::Sender<usize>,
    redo_available: watch::Sender<usize>,
}

impl State {
    fn new() -> Self {
        Self {
            mode: Mode::Normal,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            undo_routine: Vec::new(),
            redo_routine: Vec::new(),
            dirty: false,
            undo_available: watch::Sender::new(0),
            redo_available: watch::Sender::new(0),
        }
    }

    fn record(&mut self, command: Command) {
        match self.mode {
            Mode::Normal => {
                self.undo_routine.push(command);
                self.redo_stack.clear();
                self.dirty = true;
            }
            Mode::Undoing => self.redo_routine.push(command),
            Mode::Redoing => self.undo_routine.push(command),
        }
        self.publish();
    }

    fn commit(&mut self) {
        match self.mode {
            Mode::Undoing => {
                if !self.redo_routine.is_empty() {
                    let routine = std::mem::take(&mut self.redo_routine);
                    self.redo_stack.push(routine);
                }
            }
            Mode::Normal | Mode::Redoing => {
                if !self.undo_routine.is_empty() {
                    let routine = std::mem::take(&mut self.undo_routine);
                    self.undo_stack.push(routine);
                }
            }
        }
        self.mode = Mode::Normal;
        self.publish();
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || !self.undo_routine.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn publish(&self) {
        self.undo_available.send_replace(usize::from(self.can_undo()));
        self.redo_available.send_replace(usize::from(self.can_redo()));
    }
}

/// Undo/redo stacks fed by a graph's change events
pub struct CommandHistory {
    state: Rc<RefCell<State>>,
    sink: Rc<dyn LogSink>,
    subscriptions: Vec<SubscriptionId>,
}

impl std::fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("CommandHistory")
            .field("mode", &state.mode)
            .field("undo_stack", &state.undo_stack.len())
            .field("redo_stack", &state.redo_stack.len())
            .field("dirty", &state.dirty)
            .finish()
    }
}

impl CommandHistory {
    /// Start recording `graph`, reporting replay failures through `tracing`
    pub fn new(graph: &mut Graph) -> Self {
        Self::with_sink(graph, Rc::new(TracingSink))
    }

    pub fn with_sink(graph: &mut Graph, sink: Rc<dyn LogSink>) -> Self {
        let state = Rc::new(RefCell::new(State::new()));
        let subscriptions = recorded_topics()
            .into_iter()
            .map(|topic| {
                let state = Rc::clone(&state);
                graph.subscribe(topic, move |event| {
                    if let Some(command) = inverse_of(event) {
                        state.borrow_mut().record(command);
                    }
                })
            })
            .collect();
        Self {
            state,
            sink,
            subscriptions,
        }
    }

    /// Stop recording; stacks are kept
    pub fn detach(&mut self, graph: &mut Graph) {
        for id in self.subscriptions.drain(..) {
            graph.unsubscribe(id);
        }
    }

    /// Record a command produced outside the graph's own events
    pub fn add(&self, command: Command) {
        self.state.borrow_mut().record(command);
    }

    /// Close the pending routine
    pub fn commit(&self) {
        self.state.borrow_mut().commit();
    }

    pub fn undo(&self, graph: &mut Graph) -> Result<()> {
        let routine = self.begin(Mode::Undoing)?;
        self.replay(graph, routine, Mode::Undoing);
        self.commit();
        Ok(())
    }

    pub fn redo(&self, graph: &mut Graph) -> Result<()> {
        let routine = self.begin(Mode::Redoing)?;
        self.replay(graph, routine, Mode::Redoing);
        self.commit();
        Ok(())
    }

    /// Forget everything, e.g. right after loading a document
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.mode = Mode::Normal;
        state.undo_stack.clear();
        state.redo_stack.clear();
        state.undo_routine.clear();
        state.redo_routine.clear();
        state.dirty = false;
        state.publish();
    }

    pub fn is_dirty(&self) -> bool {
        self.state.borrow().dirty
    }

    pub fn mark_saved(&self) {
        self.state.borrow_mut().dirty = false;
    }

    pub fn mode(&self) -> Mode {
        self.state.borrow().mode
    }

    pub fn can_undo(&self) -> bool {
        self.state.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.borrow().can_redo()
    }

    /// Committed routines on the undo stack
    pub fn undo_stack_count(&self) -> usize {
        self.state.borrow().undo_stack.len()
    }

    pub fn redo_stack_count(&self) -> usize {
        self.state.borrow().redo_stack.len()
    }

    /// 1 while something can be undone, else 0
    pub fn watch_undo_count(&self) -> watch::Receiver<usize> {
        self.state.borrow().undo_available.subscribe()
    }

    /// 1 while something can be redone, else 0
    pub fn watch_redo_count(&self) -> watch::Receiver<usize> {
        self.state.borrow().redo_available.subscribe()
    }

    /// Commit pending work and pop the routine to replay
    fn begin(&self, mode: Mode) -> Result<Routine> {
        let mut state = self.state.borrow_mut();
        state.commit();
        let routine = match mode {
            Mode::Redoing => state.redo_stack.pop(),
            _ => state.undo_stack.pop(),
        };
        let Some(routine) = routine else {
            return Err(Error::EmptyStack(match mode {
                Mode::Redoing => StackKind::Redo,
                _ => StackKind::Undo,
            }));
        };
        state.mode = mode;
        state.dirty = true;
        state.publish();
        Ok(routine)
    }

    /// Run a routine newest-first; failures are logged and skipped
    fn replay(&self, graph: &mut Graph, routine: Routine, mode: Mode) {
        debug!(commands = routine.len(), %mode, "replaying routine");
        for command in routine.into_iter().rev() {
            let label = command.label.clone();
            if let Err(err) = command.run(graph) {
                let failure = Error::ReplayFailure {
                    command: label.clone(),
                    source: Box::new(err),
                };
                self.sink.log(
                    LogRecord::error(failure.kind(), failure.to_string())
                        .with_context(json!({ "command": label, "mode": mode.as_str() })),
                );
            }
        }
    }
}

fn recorded_topics() -> Vec<Topic> {
    let kinds = [
        EntityKind::TemporalGroup,
        EntityKind::SpatialGroup,
        EntityKind::Vertex,
        EntityKind::Edge,
    ];
    let mut topics: Vec<Topic> = kinds
        .iter()
        .flat_map(|&kind| {
            [
                Topic::new(kind, Operation::Create),
                Topic::new(kind, Operation::Delete),
            ]
        })
        .collect();
    topics.extend([
        Topic::before_update(EntityKind::Vertex, Attribute::Coordinates),
        Topic::before_update(EntityKind::Vertex, Attribute::Data),
        Topic::before_update(EntityKind::Edge, Attribute::Data),
        Topic::before_update(EntityKind::Vertex, Attribute::Timeslot),
        Topic::before_update(EntityKind::SpatialGroup, Attribute::Timeslot),
        Topic::before_update(EntityKind::SpatialGroup, Attribute::Background),
        Topic::before_update(EntityKind::TemporalGroup, Attribute::Parent),
        Topic::before_update(EntityKind::SpatialGroup, Attribute::Parent),
        Topic::before_update(EntityKind::Vertex, Attribute::Parent),
    ]);
    topics
}

/// The command that undoes what `event` announces
fn inverse_of(event: &Event) -> Option<Command> {
    let entity = &event.entity;
    let target = entity.entity_ref();
    match event.operation() {
        Operation::Create => Some(Command::new(format!("delete {target}"), move |graph| {
            // A cascade replayed earlier may already have taken it
            if !graph.contains(&target) {
                return Ok(());
            }
            match &target {
                // Each created half has its own CREATE; an older partner stays
                EntityRef::Edge(id) => graph.delete_single_edge(id.as_str()),
                _ => graph.delete_entity(&target),
            }
        })),
        Operation::Delete => Some(restore(entity)),
        Operation::BeforeUpdate(attribute) => revert(entity, target, attribute),
        _ => None,
    }
}

/// Recreate a deleted entity from its snapshot
fn restore(entity: &EntityState) -> Command {
    let label = format!("restore {}", entity.entity_ref());
    match entity {
        EntityState::TemporalGroup(group) => {
            let new = NewTemporalGroup::from(group);
            Command::new(label, move |graph| graph.create_temporal_group(new).map(|_| ()))
        }
        EntityState::SpatialGroup(group) => {
            let new = NewSpatialGroup::from(group);
            Command::new(label, move |graph| graph.create_spatial_group(new).map(|_| ()))
        }
        EntityState::Vertex(vertex) => {
            let new = NewVertex::from(vertex);
            Command::new(label, move |graph| graph.create_vertex(new).map(|_| ()))
        }
        EntityState::Edge(edge) => {
            let new = NewEdge::from(edge);
            Command::new(label, move |graph| graph.create_edge(new).map(|_| ()))
        }
    }
}

/// Put an attribute back to the value captured before it changed
fn revert(entity: &EntityState, target: EntityRef, attribute: Attribute) -> Option<Command> {
    let label = format!("revert {attribute:?} of {target}");
    let command = match (attribute, entity) {
        (Attribute::Coordinates, EntityState::Vertex(vertex)) => {
            let coordinates = vertex.coordinates;
            Command::new(label, move |graph| {
                graph.update_coordinates(target.id(), coordinates)
            })
        }
        (Attribute::Data, EntityState::Vertex(vertex)) => {
            let data = vertex.data.clone();
            Command::new(label, move |graph| graph.update_data(&target, data, true))
        }
        (Attribute::Data, EntityState::Edge(edge)) => {
            let data = edge.data.clone();
            Command::new(label, move |graph| graph.update_data(&target, data, true))
        }
        (Attribute::Timeslot, EntityState::Vertex(vertex)) => {
            let timeslot = vertex.timeslot;
            Command::new(label, move |graph| graph.update_timeslot(&target, timeslot))
        }
        (Attribute::Timeslot, EntityState::SpatialGroup(group)) => {
            let timeslot = group.timeslot;
            Command::new(label, move |graph| graph.update_timeslot(&target, timeslot))
        }
        (Attribute::Background, EntityState::SpatialGroup(group)) => {
            let background = group.background.clone();
            Command::new(label, move |graph| {
                graph.update_background(target.id(), background)
            })
        }
        (Attribute::Parent, EntityState::TemporalGroup(group)) => {
            let parent = group.super_group.clone().map(EntityRef::TemporalGroup);
            Command::new(label, move |graph| reparent(graph, &target, parent))
        }
        (Attribute::Parent, EntityState::SpatialGroup(group)) => {
            let parent = group.super_group.clone().map(EntityRef::TemporalGroup);
            Command::new(label, move |graph| reparent(graph, &target, parent))
        }
        (Attribute::Parent, EntityState::Vertex(vertex)) => {
            let parent = EntityRef::SpatialGroup(vertex.spatial_group.clone());
            Command::new(label, move |graph| graph.add_to(&target, &parent))
        }
        _ => return None,
    };
    Some(command)
}

/// Move a group back under `parent`, or detach it when it had none
fn reparent(graph: &mut Graph, group: &EntityRef, parent: Option<EntityRef>) -> Result<()> {
    if let Some(parent) = parent {
        return graph.add_to(group, &parent);
    }
    let current = match group {
        EntityRef::TemporalGroup(id) => graph.get_temporal_group(id.as_str())?.super_group.clone(),
        EntityRef::SpatialGroup(id) => graph.get_spatial_group(id.as_str())?.super_group.clone(),
        _ => None,
    };
    match current {
        Some(current) => graph.remove_from(group, &EntityRef::TemporalGroup(current)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SerializeOptions;
    use crate::log::MemorySink;
    use crate::spatial_group::Background;
    use crate::vertex::Data;
    use serde_json::json;

    fn setup() -> (Graph, CommandHistory, Rc<MemorySink>) {
        let mut graph = Graph::new();
        let sink = Rc::new(MemorySink::new());
        let history = CommandHistory::with_sink(&mut graph, sink.clone());
        graph
            .create_temporal_group(NewTemporalGroup::new("Trip"))
            .unwrap();
        graph
            .create_spatial_group(NewSpatialGroup::new("Day1").with_super_group("trip"))
            .unwrap();
        history.clear();
        (graph, history, sink)
    }

    fn snapshot(graph: &Graph) -> String {
        graph
            .to_json(&SerializeOptions {
                persist_landmarks: true,
            })
            .to_json_pretty()
            .unwrap()
    }

    #[test]
    fn test_empty_stacks() {
        let (mut graph, history, _) = setup();
        assert!(matches!(
            history.undo(&mut graph),
            Err(Error::EmptyStack(StackKind::Undo))
        ));
        assert!(matches!(
            history.redo(&mut graph),
            Err(Error::EmptyStack(StackKind::Redo))
        ));
        assert!(!history.is_dirty());
    }

    #[test]
    fn test_empty_commit_pushes_nothing() {
        let (_, history, _) = setup();
        history.commit();
        history.commit();
        assert_eq!(history.undo_stack_count(), 0);
        assert_eq!(history.mode(), Mode::Normal);
    }

    #[test]
    fn test_undo_redo_vertex_creation() {
        let (mut graph, history, sink) = setup();
        let before = snapshot(&graph);
        graph
            .create_vertex(NewVertex::new([1.0, 1.0]).with_id("A").in_group("day1"))
            .unwrap();
        history.commit();
        let after = snapshot(&graph);
        assert!(history.is_dirty());

        history.undo(&mut graph).unwrap();
        assert!(!graph.has_vertex("A"));
        assert_eq!(snapshot(&graph), before);
        assert_eq!(history.redo_stack_count(), 1);

        history.redo(&mut graph).unwrap();
        assert_eq!(snapshot(&graph), after);
        assert_eq!(history.undo_stack_count(), 1);
        assert_eq!(history.redo_stack_count(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_new_mutation_invalidates_redo() {
        let (mut graph, history, _) = setup();
        graph
            .create_vertex(NewVertex::new([1.0, 1.0]).with_id("A").in_group("day1"))
            .unwrap();
        history.commit();
        history.undo(&mut graph).unwrap();
        assert!(history.can_redo());

        graph
            .create_vertex(NewVertex::new([2.0, 2.0]).with_id("B").in_group("day1"))
            .unwrap();
        assert!(!history.can_redo());
        assert!(matches!(
            history.redo(&mut graph),
            Err(Error::EmptyStack(StackKind::Redo))
        ));
    }

    #[test]
    fn test_undo_attribute_updates() {
        let (mut graph, history, _) = setup();
        graph
            .create_vertex(NewVertex::new([1.0, 1.0]).with_id("A").in_group("day1"))
            .unwrap();
        history.commit();
        let created = snapshot(&graph);

        graph.update_coordinates("A", [5.0, 5.0]).unwrap();
        let mut data = Data::new();
        data.insert("yaw".into(), json!(45));
        graph
            .update_data(&EntityRef::Vertex("A".into()), data, false)
            .unwrap();
        graph
            .update_background("day1", Some(Background::new("plan.png")))
            .unwrap();
        history.commit();
        let updated = snapshot(&graph);

        history.undo(&mut graph).unwrap();
        assert_eq!(snapshot(&graph), created);
        history.redo(&mut graph).unwrap();
        assert_eq!(snapshot(&graph), updated);
    }

    #[test]
    fn test_undo_reparenting() {
        let (mut graph, history, _) = setup();
        graph
            .create_temporal_group(NewTemporalGroup::new("Archive"))
            .unwrap();
        history.commit();
        let before = snapshot(&graph);

        let day1 = EntityRef::SpatialGroup("day1".into());
        graph
            .add_to(&day1, &EntityRef::TemporalGroup("archive".into()))
            .unwrap();
        graph
            .remove_from(&day1, &EntityRef::TemporalGroup("archive".into()))
            .unwrap();
        history.commit();
        assert!(graph.get_spatial_group("day1").unwrap().super_group.is_none());

        history.undo(&mut graph).unwrap();
        assert_eq!(snapshot(&graph), before);
    }

    #[test]
    fn test_replay_failures_are_logged_not_raised() {
        let (mut graph, history, sink) = setup();
        graph
            .create_vertex(NewVertex::new([1.0, 1.0]).with_id("A").in_group("day1"))
            .unwrap();
        history.add(Command::new("unlink file", |_| {
            Err(Error::invalid("file already gone"))
        }));
        history.commit();

        history.undo(&mut graph).unwrap();
        assert!(!graph.has_vertex("A"));
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "ReplayFailure");
        assert_eq!(records[0].context["command"], json!("unlink file"));
        assert_eq!(records[0].context["mode"], json!("undoing"));
        assert_eq!(history.mode(), Mode::Normal);
    }

    #[test]
    fn test_dirty_tracking() {
        let (mut graph, history, _) = setup();
        assert!(!history.is_dirty());
        graph
            .create_vertex(NewVertex::new([1.0, 1.0]).with_id("A").in_group("day1"))
            .unwrap();
        assert!(history.is_dirty());
        history.mark_saved();
        assert!(!history.is_dirty());
        history.undo(&mut graph).unwrap();
        assert!(history.is_dirty());
    }

    #[test]
    fn test_availability_counters() {
        let (mut graph, history, _) = setup();
        let undo = history.watch_undo_count();
        let redo = history.watch_redo_count();
        assert_eq!(*undo.borrow(), 0);

        for (id, lat) in [("A", 1.0), ("B", 2.0)] {
            graph
                .create_vertex(NewVertex::new([lat, 1.0]).with_id(id).in_group("day1"))
                .unwrap();
            history.commit();
        }
        assert_eq!(*undo.borrow(), 1);
        assert_eq!(history.undo_stack_count(), 2);

        history.undo(&mut graph).unwrap();
        assert_eq!(*undo.borrow(), 1);
        assert_eq!(*redo.borrow(), 1);
        history.undo(&mut graph).unwrap();
        assert_eq!(*undo.borrow(), 0);

        history.clear();
        assert_eq!(*redo.borrow(), 0);
    }

    #[test]
    fn test_detach_stops_recording() {
        let (mut graph, mut history, _) = setup();
        let subscribers = graph.events().subscriber_count();
        history.detach(&mut graph);
        assert!(graph.events().subscriber_count() < subscribers);

        graph
            .create_vertex(NewVertex::new([1.0, 1.0]).with_id("A").in_group("day1"))
            .unwrap();
        assert!(!history.can_undo());
    }
}
