//! Import/Export commands

use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use clap::{Args, ValueEnum};

use crate::{AppContext, Cli};
use panotour_core::{Graph, SerializeOptions, TourDocument};
use panotour_storage::DocumentStore;

/// Export format
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    /// One row per vertex
    Csv,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Input file (tour document JSON)
    pub file: PathBuf,

    /// Tour name (default: the file name without extension)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Replace an existing tour of the same name
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Tour name
    pub tour: String,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include landmark groups (default from config)
    #[arg(long)]
    pub persist_landmarks: bool,

    /// Export format
    #[arg(long = "as", default_value = "json")]
    pub export_format: ExportFormat,
}

pub async fn run_import(args: &ImportArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Importing from {:?}", args.file);

    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Cannot derive a tour name from {:?}", args.file))?,
    };
    if ctx.store.exists(&name).await? && !args.force {
        anyhow::bail!("Tour '{}' already exists. Use --force to replace it.", name);
    }

    let content = std::fs::read_to_string(&args.file)?;
    let mut document = TourDocument::from_json_str(&content)?;
    if let Some(radius) = ctx.config.default_colocated_radius {
        for group in document
            .temporal_groups
            .iter_mut()
            .filter(|g| g.super_group.is_none() && g.colocated_radius.is_none())
        {
            group.colocated_radius = Some(radius);
        }
    }

    // Rebuilding the graph checks references and normalizes the document
    let graph = Graph::from_document(&document)?;
    let violations = graph.validate();
    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  {}", violation);
        }
        anyhow::bail!("Document has {} integrity problems", violations.len());
    }
    let normalized = graph.to_json(&SerializeOptions {
        persist_landmarks: true,
    });
    ctx.store.save(&name, &normalized).await?;

    println!(
        "Imported tour '{}': {} groups, {} vertices, {} edges",
        name,
        graph.temporal_group_count() + graph.spatial_group_count(),
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(())
}

pub async fn run_export(args: &ExportArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Exporting tour '{}'", args.tour);

    let graph = Graph::from_document(&ctx.store.load(&args.tour).await?)?;
    let options = SerializeOptions {
        persist_landmarks: args.persist_landmarks || ctx.config.persist_landmarks,
    };
    let document = graph.to_json(&options);
    tracing::debug!(
        "Exporting {} spatial groups, {} vertices",
        document.spatial_groups.len(),
        document.vertex_count()
    );

    let content = match args.export_format {
        ExportFormat::Json => document.to_json_pretty()?,
        ExportFormat::Csv => export_to_csv(&document),
    };

    if let Some(ref path) = args.output {
        // Write with secure permissions (0o600 = owner read/write only)
        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            file.write_all(content.as_bytes())?;
        }
        #[cfg(not(unix))]
        {
            std::fs::write(path, &content)?;
        }
        println!("Exported to {:?}", path);
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn export_to_csv(document: &TourDocument) -> String {
    let mut output = String::from("spatial_group,vertex,type,name,latitude,longitude,timeslot,edges\n");
    for group in &document.spatial_groups {
        for vertex in &group.vertices {
            let edges: Vec<&str> = vertex.outgoing_edges.iter().map(|e| e.to.as_str()).collect();
            output.push_str(&format!(
                "{},{},{},{},{},{},{},\"{}\"\n",
                csv_escape(group.id.as_str()),
                csv_escape(vertex.id.as_str()),
                vertex.vertex_type.as_str(),
                csv_escape(vertex.name.as_deref().unwrap_or("")),
                vertex.coordinates[0],
                vertex.coordinates[1],
                vertex.timeslot.to_rfc3339(),
                csv_escape(&edges.join("; "))
            ));
        }
    }
    output
}

/// Escape a string for CSV output with formula injection protection
fn csv_escape(s: &str) -> String {
    let s = if s.starts_with(['=', '+', '-', '@']) {
        format!("'{}", s)
    } else {
        s.to_string()
    };
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
