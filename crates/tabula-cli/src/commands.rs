use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tabula_core::{Browser, MutationOutcome};
use tabula_model::{FieldValue, RecordId, SortSpec, ViewKind};
use tabula_report::{ExportOptions, export_view, write_artifact};
use tracing::{Instrument, debug, info, info_span, warn};

use tabula_cli::config::Config;
use tabula_cli::files::{JsonFileSource, JsonFileUpdater};
use tabula_cli::logging::redact_value;

use crate::cli::{BrowseArgs, ExportArgs, QueryArgs, SetFieldArgs};
use crate::summary::apply_table_style;
use crate::types::{ExportResult, SetFieldResult};

pub fn run_views() {
    let mut table = Table::new();
    table.set_header(vec!["View", "Columns", "Search", "Filters", "Export"]);
    apply_table_style(&mut table);
    for kind in ViewKind::ALL {
        let preset = kind.preset();
        let columns: Vec<&str> = preset
            .columns
            .iter()
            .map(|column| column.label.as_str())
            .collect();
        table.add_row(vec![
            kind.to_string(),
            columns.join(", "),
            preset.search_fields.join(", "),
            preset.filter_fields.join(", "),
            preset.export.base_name.clone(),
        ]);
    }
    println!("{table}");
}

pub async fn run_browse(args: &BrowseArgs, config: &Config) -> Result<Browser> {
    let mut browser = load_browser(&args.query, config, args.page_size).await?;
    browser.go_to_page(args.page);
    if browser.pager().current_page() != args.page {
        debug!(
            requested = args.page,
            shown = browser.pager().current_page(),
            "Requested page clamped"
        );
    }
    Ok(browser)
}

pub async fn run_export(args: &ExportArgs, config: &Config) -> Result<ExportResult> {
    let span = info_span!("export", view = %args.query.view);
    export(args, config).instrument(span).await
}

pub async fn run_set_field(args: &SetFieldArgs) -> Result<SetFieldResult> {
    let span = info_span!("set_field", view = %args.view, id = %args.id, field = %args.field);
    set_field(args).instrument(span).await
}

async fn export(args: &ExportArgs, config: &Config) -> Result<ExportResult> {
    let browser = load_browser(&args.query, config, None).await?;
    let options = ExportOptions {
        rows_per_page: args
            .rows_per_page
            .unwrap_or(config.export.rows_per_page),
    };
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.export.output_dir.clone());

    let view = browser.view();
    let mut files: Vec<PathBuf> = Vec::new();
    for format in args.format.formats() {
        let artifact = export_view(&view, browser.preset(), format, &options)
            .with_context(|| format!("encode {format} export"))?;
        let path = write_artifact(&output_dir, &artifact)?;
        files.push(path);
    }
    info!(rows = view.len(), files = files.len(), "Export finished");

    Ok(ExportResult {
        view: args.query.view,
        rows: view.len(),
        files,
    })
}

async fn set_field(args: &SetFieldArgs) -> Result<SetFieldResult> {
    let preset = args.view.preset();
    let id_field = preset.schema.id_field.clone();
    if let Some(allowed) = preset.schema.status_values(&args.field)
        && !allowed.iter().any(|value| value == &args.value)
    {
        bail!(
            "{:?} is not a valid {} (expected one of: {})",
            args.value,
            args.field,
            allowed.join(", ")
        );
    }

    let mut browser = Browser::new(preset);
    let source = JsonFileSource::new(&args.source);
    browser
        .load(&source)
        .await
        .with_context(|| format!("load {}", args.source.display()))?;

    let id = RecordId::new(args.id.as_str())?;
    let value = browser.coerce(&args.field, &args.value);
    if let FieldValue::Malformed(raw) = &value {
        bail!("{raw:?} is not a valid value for {}", args.field);
    }
    debug!(value = redact_value(&args.value), "Updating field");

    let updater = JsonFileUpdater::new(&args.source, id_field);
    let outcome = browser
        .update_field(&updater, &id, &args.field, value.clone())
        .await?;
    if let MutationOutcome::RolledBack { error } = &outcome {
        warn!(%error, "Update was rolled back");
    }
    let current = browser
        .store()
        .get(&id)
        .map(|record| record.get(&args.field).display_text().into_owned())
        .unwrap_or_default();

    Ok(SetFieldResult {
        id,
        field: args.field.clone(),
        requested: value.display_text().into_owned(),
        current,
        outcome,
    })
}

async fn load_browser(
    query: &QueryArgs,
    config: &Config,
    page_size: Option<NonZeroUsize>,
) -> Result<Browser> {
    let mut browser = Browser::new(query.view.preset())
        .with_page_size(page_size.unwrap_or(config.browser.page_size))
        .with_page_window(config.browser.page_window);
    let source = JsonFileSource::new(&query.source);
    let report = browser
        .load(&source)
        .await
        .with_context(|| format!("load {}", source.path().display()))?;
    if !report.is_clean() {
        warn!(
            received = report.received,
            skipped = report.skipped(),
            degraded = report.degraded_fields(),
            "Collection loaded with issues"
        );
    }

    if let Some(term) = &query.search {
        debug!(term = redact_value(term), "Applying search");
        browser.set_search(term.clone());
    }
    if !query.filters.is_empty() {
        browser.set_filters(query.filters.iter().cloned().collect());
    }
    if let Some(name) = &query.sort {
        let field = browser.preset().resolve_field(name)?;
        let sort = if query.descending {
            SortSpec::descending(field)
        } else {
            SortSpec::ascending(field)
        };
        browser.set_sort(Some(sort));
    }
    Ok(browser)
}
