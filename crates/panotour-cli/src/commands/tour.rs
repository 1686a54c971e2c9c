//! Read-only tour commands

use clap::Args;
use serde::Serialize;

use crate::output::{format_json, format_table, OutputFormat};
use crate::{AppContext, Cli};
use panotour_core::{Graph, GroupRef, TemporalGroup};
use panotour_storage::DocumentStore;

#[derive(Args)]
pub struct InspectArgs {
    /// Tour name
    pub tour: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Tour name
    pub tour: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TourCounts {
    name: String,
    temporal_groups: usize,
    spatial_groups: usize,
    vertices: usize,
    edges: usize,
}

impl TourCounts {
    fn of(name: &str, graph: &Graph) -> Self {
        Self {
            name: name.to_string(),
            temporal_groups: graph.temporal_group_count(),
            spatial_groups: graph.spatial_group_count(),
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
        }
    }
}

/// One node of the group tree shown by `inspect`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupNode {
    id: String,
    name: String,
    #[serde(rename = "type")]
    group_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    vertices: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<GroupNode>,
}

#[derive(Serialize)]
struct Inspection {
    #[serde(flatten)]
    counts: TourCounts,
    groups: Vec<GroupNode>,
}

async fn load_graph(ctx: &AppContext, name: &str) -> anyhow::Result<Graph> {
    let document = ctx.store.load(name).await?;
    Ok(Graph::from_document(&document)?)
}

pub async fn run_list(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let names = ctx.store.list().await?;
    tracing::info!("Found {} tours", names.len());

    let mut tours = Vec::with_capacity(names.len());
    for name in &names {
        match load_graph(ctx, name).await {
            Ok(graph) => tours.push(TourCounts::of(name, &graph)),
            Err(e) => tracing::warn!("Skipping tour '{}': {}", name, e),
        }
    }

    match cli.output_format() {
        OutputFormat::Json => println!("{}", format_json(&tours)?),
        OutputFormat::Table => {
            if tours.is_empty() {
                println!("No tours found. Import one with 'panotour import <file>'");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = tours
                .iter()
                .map(|t| {
                    vec![
                        t.name.clone(),
                        (t.temporal_groups + t.spatial_groups).to_string(),
                        t.vertices.to_string(),
                        t.edges.to_string(),
                    ]
                })
                .collect();
            println!("{}", format_table(&["TOUR", "GROUPS", "VERTICES", "EDGES"], &rows));
        }
    }
    Ok(())
}

pub async fn run_inspect(args: &InspectArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let graph = load_graph(ctx, &args.tour).await?;

    let mut groups: Vec<GroupNode> = graph.root_groups().map(|g| temporal_node(&graph, g)).collect();
    // Spatial groups that were saved detached from any temporal group
    groups.extend(
        graph
            .spatial_groups()
            .filter(|g| g.super_group.is_none())
            .filter_map(|g| spatial_node(&graph, g.id.as_str())),
    );
    let inspection = Inspection {
        counts: TourCounts::of(&args.tour, &graph),
        groups,
    };

    match cli.output_format() {
        OutputFormat::Json => println!("{}", format_json(&inspection)?),
        OutputFormat::Table => {
            let counts = &inspection.counts;
            println!("Tour: {}", counts.name);
            println!(
                "  {} temporal groups, {} spatial groups, {} vertices, {} edges",
                counts.temporal_groups, counts.spatial_groups, counts.vertices, counts.edges
            );
            println!();
            for node in &inspection.groups {
                print_node(node, 0);
            }
        }
    }
    Ok(())
}

pub async fn run_validate(args: &ValidateArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let graph = load_graph(ctx, &args.tour).await?;
    let violations = graph.validate();
    tracing::info!("Tour '{}' has {} violations", args.tour, violations.len());

    match cli.output_format() {
        OutputFormat::Json => {
            let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
            println!("{}", format_json(&messages)?);
        }
        OutputFormat::Table => {
            for violation in &violations {
                println!("  {}", violation);
            }
        }
    }

    if !violations.is_empty() {
        anyhow::bail!("Tour '{}' has {} integrity problems", args.tour, violations.len());
    }
    if cli.output_format() == OutputFormat::Table {
        println!("Tour '{}' is valid", args.tour);
    }
    Ok(())
}

fn temporal_node(graph: &Graph, group: &TemporalGroup) -> GroupNode {
    let children = group
        .sub_groups
        .iter()
        .filter_map(|child| match child {
            GroupRef::Temporal(id) => graph
                .get_temporal_group(id.as_str())
                .ok()
                .map(|g| temporal_node(graph, g)),
            GroupRef::Spatial(id) => spatial_node(graph, id.as_str()),
        })
        .collect();
    GroupNode {
        id: group.id.to_string(),
        name: group.name.clone(),
        group_type: group.group_type.as_str().to_string(),
        vertices: None,
        children,
    }
}

fn spatial_node(graph: &Graph, id: &str) -> Option<GroupNode> {
    let group = graph.get_spatial_group(id).ok()?;
    Some(GroupNode {
        id: group.id.to_string(),
        name: group.name.clone(),
        group_type: group.group_type.as_str().to_string(),
        vertices: Some(group.vertices.len()),
        children: Vec::new(),
    })
}

fn print_node(node: &GroupNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node.vertices {
        Some(count) => println!(
            "{}{} ({}) [{}, {} vertices]",
            indent, node.name, node.id, node.group_type, count
        ),
        None => println!("{}{} ({}) [{}]", indent, node.name, node.id, node.group_type),
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
