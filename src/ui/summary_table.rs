use eframe::egui;

use crate::processing::report::{StatsTable, UNAVAILABLE};
use crate::state::theme::Theme;

/// Draw one statistics table: a heading, then `Measure | Class ...` columns
/// with mean, median and mode rows.
pub fn show_stats_table(ui: &mut egui::Ui, table: &StatsTable, theme: Theme, show_counts: bool) {
    use egui_extras::{Column, TableBuilder};

    ui.heading(&table.title);
    ui.add_space(4.0);

    if table.headers.is_empty() {
        ui.label(egui::RichText::new("No records in dataset.").weak());
        return;
    }

    let faded = theme.unavailable_color();

    ui.push_id(&table.title, |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(150.0))
            .columns(Column::auto().at_least(90.0), table.headers.len())
            .vscroll(false)
            .header(22.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Measure");
                });
                for label in &table.headers {
                    header.col(|ui| {
                        ui.strong(label);
                    });
                }
            })
            .body(|mut body| {
                for (label, cells) in &table.rows {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.label(label);
                        });
                        for cell in cells {
                            row.col(|ui| {
                                if cell == UNAVAILABLE {
                                    ui.label(egui::RichText::new(cell).color(faded));
                                } else {
                                    ui.monospace(cell);
                                }
                            });
                        }
                    });
                }
                if show_counts {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.label(egui::RichText::new("Values").weak());
                        });
                        for count in &table.counts {
                            row.col(|ui| {
                                ui.label(egui::RichText::new(count.to_string()).weak());
                            });
                        }
                    });
                }
            });
    });
}
