//! contentgen - CMS export to static site content generator
//!
//! A CLI tool that turns a hierarchical CMS export (sections, pages, press
//! releases) into collections of documents with nested permalinks,
//! breadcrumbs and layout defaults, ready for a static site renderer.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]

mod cli;
mod date;
mod defaults;
mod export;
mod generator;
mod manifest;
mod pipeline;
mod record;
mod redirects;
mod site;
mod site_config;
mod slug;
mod walker;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

use crate::site::{CollectionId, Site, ORPHANS, PRESS_RELEASES, SECTIONS};

/// Main entry point for the contentgen CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            export,
            output,
            verbose,
        } => {
            init_logging(verbose);
            handle_generate_command(&input, export.as_deref(), &output, verbose)?;
        }

        Commands::Validate {
            input,
            export,
            verbose,
        } => {
            init_logging(verbose);
            handle_validate_command(&input, export.as_deref(), verbose)?;
        }

        Commands::Tree { input, export } => {
            init_logging(false);
            handle_tree_command(&input, export.as_deref())?;
        }
    }

    Ok(())
}

/// Initialize logging from `RUST_LOG`, raised to info when verbose
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

/// Handle the generate command
fn handle_generate_command(
    input: &Path,
    export: Option<&Path>,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    println!("Generating site content...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    // Stage 1: Load configuration and export
    println!("\n[Stage 1/3] Loading export...");
    let sources = pipeline::load_sources(input, export)
        .with_context(|| format!("Failed to load sources from {}", input.display()))?;

    println!(
        "✓ Loaded {} sections, {} pages, {} press releases from {}",
        sources.export.sections.len(),
        sources.export.pages.len(),
        sources.export.press_releases.len(),
        sources.export_path.display()
    );

    // Stage 2: Build the section tree
    println!("\n[Stage 2/3] Materializing collections...");
    let materialized =
        pipeline::materialize(&sources).with_context(|| "Failed to materialize site content")?;

    println!("✓ Materialized {} sections", materialized.report.sections);
    if verbose {
        println!("  - {} pages", materialized.report.pages);
        println!("  - {} press releases", materialized.report.press_releases);
        println!(
            "  - {} of {} custom templates used",
            materialized.report.templates_used, materialized.templates
        );
        println!("  - {} records merged into existing pages", materialized.report.merged);
    }

    // Stage 3: Write the manifest
    println!("\n[Stage 3/3] Writing manifest...");
    let manifest = pipeline::export_manifest(&materialized);
    manifest
        .write(output)
        .with_context(|| format!("Failed to write manifest to {}", output.display()))?;
    println!(
        "✓ Wrote {} documents and {} redirects to {}",
        manifest.document_count(),
        manifest.redirects.len(),
        output.display()
    );

    println!("\n✓ Generation completed successfully!");

    Ok(())
}

/// Handle the validate command
fn handle_validate_command(input: &Path, export: Option<&Path>, verbose: bool) -> Result<()> {
    println!("Validating export...");
    println!("Input: {}", input.display());

    let sources = pipeline::load_sources(input, export)
        .with_context(|| format!("Failed to load sources from {}", input.display()))?;
    if verbose {
        println!("Export: {}", sources.export_path.display());
        println!("✓ All records have an id, slug and title");
    }

    let (errors, warnings): (Vec<_>, Vec<_>) = sources
        .export
        .check_references()
        .into_iter()
        .partition(|problem| problem.is_fatal());
    for warning in &warnings {
        println!("  ⚠ {}", warning);
    }
    if !errors.is_empty() {
        for error in &errors {
            println!("  ✗ {}", error);
        }
        anyhow::bail!("Found {} reference problems", errors.len());
    }
    if verbose {
        println!("✓ All section references resolve");
    }

    // Catches label collisions and empty slugs that only show up while building
    let materialized =
        pipeline::materialize(&sources).with_context(|| "Export does not materialize")?;

    println!(
        "\n✓ Export is valid ({} sections, {} documents)",
        materialized.report.sections,
        materialized.site.document_count()
    );

    Ok(())
}

/// Handle the tree command
fn handle_tree_command(input: &Path, export: Option<&Path>) -> Result<()> {
    let sources = pipeline::load_sources(input, export)
        .with_context(|| format!("Failed to load sources from {}", input.display()))?;
    let materialized =
        pipeline::materialize(&sources).with_context(|| "Failed to materialize site content")?;
    let site = &materialized.site;

    for label in [SECTIONS, ORPHANS, PRESS_RELEASES] {
        if let Some(id) = site.lookup(label) {
            println!("{} ({})", label, site.collection(id).permalink);
            print_collection_tree(site, id, 1);
        }
    }

    Ok(())
}

/// Print the documents of a collection, descending into section pages
fn print_collection_tree(site: &Site, collection: CollectionId, depth: usize) {
    for (_, doc) in site.documents_in(collection) {
        println!(
            "{}{} {}",
            "  ".repeat(depth),
            doc.title.as_deref().unwrap_or("(untitled)"),
            doc.url
        );
        if let Some(children) = doc.children {
            print_collection_tree(site, children, depth + 1);
        }
    }
}
