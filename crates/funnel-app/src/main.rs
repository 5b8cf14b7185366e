//! Funnel chart viewer
//!
//! Usage: `funnel [data.csv] [settings.json]`. Without a CSV file a built-in
//! sample funnel is shown.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use eframe::egui;
use tracing::{info, warn};

use funnel_core::{
    CategoricalData, CategoryColumn, CellValue, DataView, FunnelSource, SelectionHost, SharedSelection, ValueColumn,
};
use funnel_data::{CsvSource, FunnelSettings, StaticSource};
use funnel_views::FunnelView;

/// Main application state
struct FunnelApp {
    view: FunnelView,
    selection: SharedSelection,
    source_name: String,
    row_count: usize,
}

impl FunnelApp {
    fn new(view: FunnelView, selection: SharedSelection, source_name: String, row_count: usize) -> Self {
        Self {
            view,
            selection,
            source_name,
            row_count,
        }
    }
}

impl eframe::App for FunnelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(&self.source_name);
                ui.weak(format!("{} rows", self.row_count));
                ui.separator();
                let has_selection = !self.selection.is_empty();
                if ui
                    .add_enabled(has_selection, egui::Button::new("Clear selection"))
                    .clicked()
                {
                    self.selection.clear();
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.view.ui(ui);
        });
    }
}

/// Built-in funnel shown when no file is given
fn sample_view() -> DataView {
    let stages = ["Visit", "Visit", "Signup", "Signup", "Trial", "Trial", "Purchase", "Purchase"];
    let regions = ["US", "EU", "US", "EU", "US", "EU", "US", "EU"];
    let users = [6000.0, 4000.0, 2400.0, 1800.0, 900.0, 700.0, 300.0, 180.0];

    DataView::Categorical(CategoricalData {
        categories: vec![
            CategoryColumn {
                name: "Stage".to_string(),
                values: stages.iter().map(|s| CellValue::from(*s)).collect(),
            },
            CategoryColumn {
                name: "Region".to_string(),
                values: regions.iter().map(|s| CellValue::from(*s)).collect(),
            },
        ],
        values: vec![ValueColumn {
            name: "Users".to_string(),
            values: users.iter().map(|v| CellValue::Number(*v)).collect(),
        }],
    })
}

async fn load_source(path: Option<PathBuf>) -> Result<Box<dyn FunnelSource>> {
    match path {
        Some(path) => {
            let source = CsvSource::new(path.clone())
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?;
            Ok(Box::new(source))
        }
        None => Ok(Box::new(StaticSource::new("Sample funnel", sample_view()))),
    }
}

fn load_settings(path: Option<PathBuf>) -> Result<FunnelSettings> {
    let Some(path) = path else {
        return Ok(FunnelSettings::default());
    };
    let json = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let settings = FunnelSettings::from_json(&json)?;
    info!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let data_path = args.next();
    let settings_path = args.next();
    if args.next().is_some() {
        warn!("Ignoring extra command line arguments");
    }

    let settings = load_settings(settings_path)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let (source_name, row_count, data) = runtime.block_on(async {
        let source = load_source(data_path).await?;
        let data = source.data_view().await?;
        let rows = source.row_count().await?;
        Ok::<_, anyhow::Error>((source.source_name().to_string(), rows, data))
    })?;
    info!("Loaded '{}' with {} rows", source_name, row_count);

    let selection = SharedSelection::new();
    let mut view = FunnelView::new("funnel", settings, selection.clone());
    view.set_data(data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Funnel",
        options,
        Box::new(move |_cc| Box::new(FunnelApp::new(view, selection, source_name, row_count))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
