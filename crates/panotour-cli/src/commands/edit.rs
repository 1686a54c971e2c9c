//! Editing commands
//!
//! Each command loads the tour under a fresh history, applies one routine and
//! writes the tour back only if the routine changed something.

use clap::{Args, Subcommand, ValueEnum};

use crate::{AppContext, Cli};
use panotour_core::{
    CommandHistory, EdgeType, EntityRef, Graph, NewEdge, SerializeOptions, SpatialGroupId,
    TemporalGroupId,
};
use panotour_storage::DocumentStore;

/// Edge type override for `connect`
#[derive(Clone, Copy, ValueEnum)]
pub enum EdgeKind {
    Route,
    Temp,
    Spatial,
    Landmark,
    Temporal,
    Placeholder,
}

impl From<EdgeKind> for EdgeType {
    fn from(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Route => EdgeType::Route,
            EdgeKind::Temp => EdgeType::Temp,
            EdgeKind::Spatial => EdgeType::Spatial,
            EdgeKind::Landmark => EdgeType::Landmark,
            EdgeKind::Temporal => EdgeType::Temporal,
            EdgeKind::Placeholder => EdgeType::Placeholder,
        }
    }
}

#[derive(Args)]
pub struct ConnectArgs {
    /// Tour name
    pub tour: String,
    /// Source vertex id
    pub from: String,
    /// Target vertex id
    pub to: String,
    /// Also create the reverse edge
    #[arg(short, long)]
    pub bidirectional: bool,
    /// Edge type (derived from the endpoints if omitted)
    #[arg(short = 't', long = "type")]
    pub edge_type: Option<EdgeKind>,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[command(subcommand)]
    pub command: DeleteCommands,
}

#[derive(Subcommand)]
pub enum DeleteCommands {
    /// Delete a vertex and every edge touching it
    Vertex {
        /// Tour name
        tour: String,
        /// Vertex id
        id: String,
    },
    /// Delete an edge (and its opposite)
    Edge {
        /// Tour name
        tour: String,
        /// Edge id
        id: String,
    },
    /// Delete a temporal or spatial group with everything inside it
    Group {
        /// Tour name
        tour: String,
        /// Group id
        id: String,
    },
}

/// A tour opened for editing
struct Session {
    name: String,
    graph: Graph,
    history: CommandHistory,
}

impl Session {
    async fn open(ctx: &AppContext, name: &str) -> anyhow::Result<Self> {
        let document = ctx.store.load(name).await?;
        let mut graph = Graph::new();
        let history = CommandHistory::new(&mut graph);
        graph.load_document(&document)?;
        // Loading is not an edit
        history.clear();
        Ok(Self {
            name: name.to_string(),
            graph,
            history,
        })
    }

    /// Commit the routine and save if it recorded anything
    async fn close(self, ctx: &AppContext) -> anyhow::Result<bool> {
        self.history.commit();
        if !self.history.is_dirty() {
            tracing::debug!("Tour '{}' unchanged, not saving", self.name);
            return Ok(false);
        }
        let document = self.graph.to_json(&SerializeOptions {
            persist_landmarks: true,
        });
        ctx.store.save(&self.name, &document).await?;
        self.history.mark_saved();
        Ok(true)
    }
}

pub async fn run_connect(args: &ConnectArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let mut session = Session::open(ctx, &args.tour).await?;

    let mut new = NewEdge::new(args.from.as_str(), args.to.as_str());
    if let Some(kind) = args.edge_type {
        new = new.with_type(kind.into());
    }
    if args.bidirectional {
        new = new.bidirectional();
    }
    let id = session.graph.create_edge(new)?;
    let edge = session.graph.get_edge(id.as_str())?;
    tracing::info!("Created edge {} ({})", id, edge.edge_type);

    let message = match &edge.opposite {
        Some(opposite) => format!(
            "Connected {} <-> {}: {} and {} ({})",
            args.from, args.to, id, opposite, edge.edge_type
        ),
        None => format!("Connected {} -> {}: {} ({})", args.from, args.to, id, edge.edge_type),
    };

    if !session.close(ctx).await? {
        println!("Edge {} already exists", id);
        return Ok(());
    }
    println!("{}", message);
    Ok(())
}

pub async fn run_delete(args: &DeleteArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (tour, id) = match &args.command {
        DeleteCommands::Vertex { tour, id }
        | DeleteCommands::Edge { tour, id }
        | DeleteCommands::Group { tour, id } => (tour, id),
    };
    let mut session = Session::open(ctx, tour).await?;

    let target = match &args.command {
        DeleteCommands::Vertex { .. } => EntityRef::Vertex(id.as_str().into()),
        DeleteCommands::Edge { .. } => EntityRef::Edge(id.as_str().into()),
        DeleteCommands::Group { .. } if session.graph.has_temporal_group(id) => {
            EntityRef::TemporalGroup(TemporalGroupId::new(id.as_str()))
        }
        DeleteCommands::Group { .. } => EntityRef::SpatialGroup(SpatialGroupId::new(id.as_str())),
    };
    session.graph.delete_entity(&target)?;
    tracing::info!("Deleted {} from '{}'", target, tour);

    session.close(ctx).await?;
    println!("Deleted {}", target);
    Ok(())
}
