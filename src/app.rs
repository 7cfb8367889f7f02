use eframe::egui;
use crate::data::loader::{self, Dataset, LoadError};
use crate::processing::report::{StatsTable, WineReport};
use crate::state::app_state::{AppState, VERSION};
use crate::ui::summary_table;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Pending async dataset load.
struct PendingLoad {
    path: PathBuf,
    result: Arc<Mutex<Option<Result<Dataset, LoadError>>>>,
}

/// A loaded dataset together with the tables computed from it.
struct LoadedReport {
    source: String,
    record_count: usize,
    report: WineReport,
    tables: [StatsTable; 2],
}

impl LoadedReport {
    fn new(dataset: Dataset) -> Self {
        let report = WineReport::compute(&dataset.records);
        let tables = report.tables();
        Self {
            source: dataset.source,
            record_count: dataset.records.len(),
            report,
            tables,
        }
    }
}

/// The main winestat window.
pub struct WinestatApp {
    pub state: AppState,
    settings_path: PathBuf,
    current: LoadedReport,
    /// An error message shown in a closable window.
    pub error_message: Option<String>,
    pub show_about: bool,
    pending_load: Option<PendingLoad>,
}

impl WinestatApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        state: AppState,
        settings_path: PathBuf,
        dataset: Dataset,
    ) -> Self {
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::proportional(15.0),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::proportional(22.0),
        );
        style.text_styles.insert(
            egui::TextStyle::Monospace,
            egui::FontId::monospace(14.0),
        );
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.window_margin = egui::Margin::same(12);
        ctx.set_style(style);
        ctx.set_visuals(state.theme.visuals());

        Self {
            state,
            settings_path,
            current: LoadedReport::new(dataset),
            error_message: None,
            show_about: false,
            pending_load: None,
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.state.save(&self.settings_path) {
            tracing::error!("Failed to save settings to {:?}: {e}", self.settings_path);
        }
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Datasets", &["json", "csv", "xls", "xlsx"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_file(&path);
        }
    }

    /// Parse a dataset on a worker thread so the UI stays responsive.
    fn load_file(&mut self, path: &Path) {
        let path_buf = path.to_path_buf();
        let result: Arc<Mutex<Option<Result<Dataset, LoadError>>>> = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);

        std::thread::spawn(move || {
            let loaded = loader::load_dataset(&path_buf);
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(loaded);
            }
        });

        self.pending_load = Some(PendingLoad {
            path: path.to_path_buf(),
            result,
        });
    }

    /// Install a finished load, if the worker has delivered one.
    fn poll_pending_load(&mut self) {
        let Some(pending) = self.pending_load.as_ref() else {
            return;
        };
        let finished = pending
            .result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(result) = finished else {
            return;
        };

        let path = pending.path.clone();
        self.pending_load = None;
        match result {
            Ok(dataset) => {
                self.current = LoadedReport::new(dataset);
                self.state.last_dataset = Some(path);
                self.save_settings();
            }
            Err(e) => {
                tracing::error!("Failed to load dataset: {e}");
                self.error_message = Some(format!("Failed to load dataset: {e}"));
            }
        }
    }

    /// Write both tables to a CSV file chosen via a save dialog.
    fn export_csv(&mut self) {
        let stem = Path::new(&self.current.source)
            .file_stem()
            .map(|s| s.to_string_lossy().replace(' ', "_"))
            .unwrap_or_else(|| "wine".to_string());
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("{stem}_statistics.csv"))
            .add_filter("CSV Files", &["csv"])
            .save_file()
        else {
            return;
        };

        let written = std::fs::File::create(&path)
            .map_err(csv::Error::from)
            .and_then(|file| self.current.report.write_csv(file, self.state.show_counts));
        match written {
            Ok(()) => tracing::info!("Exported statistics to {:?}", path),
            Err(e) => {
                tracing::error!("Failed to export statistics: {e}");
                self.error_message = Some(format!("Failed to export statistics: {e}"));
            }
        }
    }

    fn copy_as_text(&mut self) {
        let text = self.current.report.to_text(self.state.show_counts);
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
            Ok(()) => tracing::info!("Copied statistics to clipboard"),
            Err(e) => {
                tracing::error!("Clipboard error: {e}");
                self.error_message = Some(format!("Clipboard error: {e}"));
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open dataset\u{2026}").clicked() {
                        ui.close_menu();
                        self.open_file_dialog();
                    }
                    if ui.button("Use bundled sample").clicked() {
                        ui.close_menu();
                        self.current = LoadedReport::new(Dataset::bundled());
                        self.state.last_dataset = None;
                        self.save_settings();
                    }
                    ui.separator();
                    if ui.button("Export CSV\u{2026}").clicked() {
                        ui.close_menu();
                        self.export_csv();
                    }
                    if ui.button("Copy as text").clicked() {
                        ui.close_menu();
                        self.copy_as_text();
                    }
                });
                ui.menu_button("View", |ui| {
                    let next = self.state.theme.toggle();
                    if ui.button(format!("{} theme", next.label())).clicked() {
                        ui.close_menu();
                        self.state.theme = next;
                        self.save_settings();
                    }
                    if ui.checkbox(&mut self.state.show_counts, "Show value counts").changed() {
                        self.save_settings();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        ui.close_menu();
                        self.show_about = true;
                    }
                });
            });
        });
    }
}

impl eframe::App for WinestatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.state.theme.visuals());

        // ------------------------------------------------------------------
        // 1. Dropped files
        // ------------------------------------------------------------------
        let dropped: Option<PathBuf> =
            ctx.input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.load_file(&path);
        }

        // ------------------------------------------------------------------
        // 2. Poll async load
        // ------------------------------------------------------------------
        self.poll_pending_load();

        self.menu_bar(ctx);

        // ------------------------------------------------------------------
        // 3. Tables
        // ------------------------------------------------------------------
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Wine Statistics");
            ui.label(
                egui::RichText::new(format!(
                    "{} \u{2022} {} records, grouped by {}",
                    self.current.source,
                    self.current.record_count,
                    WineReport::CLASS_FIELD.column_name(),
                ))
                .weak(),
            );
            ui.add_space(12.0);

            egui::ScrollArea::both().show(ui, |ui| {
                for table in &self.current.tables {
                    summary_table::show_stats_table(
                        ui,
                        table,
                        self.state.theme,
                        self.state.show_counts,
                    );
                    ui.add_space(20.0);
                }
            });
        });

        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading dataset...");
                    });
                });
            ctx.request_repaint();
        }

        // ------------------------------------------------------------------
        // 4. Error and About windows
        // ------------------------------------------------------------------
        let mut dismiss_error = false;
        if let Some(message) = &self.error_message {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        dismiss_error = true;
                    }
                });
        }
        if dismiss_error {
            self.error_message = None;
        }

        if self.show_about {
            egui::Window::new("About winestat")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.heading("winestat");
                    ui.label(format!("Version: {VERSION}"));
                    ui.add_space(4.0);
                    ui.label("Mean, median and mode of Flavanoids and Gamma per alcohol class.");
                    ui.add_space(6.0);
                    ui.label("Gamma = Ash \u{00d7} Hue / Magnesium, with missing operands taken as 1.");
                    ui.label("Mode is shown only when every value in a class is identical.");
                });
        }
    }
}
