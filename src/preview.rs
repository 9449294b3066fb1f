//! Creates the preview GUI

use std::{io, path::PathBuf};

use eframe::{App, Frame};
use egui::{Align, Button, Color32, Layout, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use log::{error, info, warn};
use thiserror::Error;

use crate::{parsers::inference::InferenceError, session::Session};

/// Height of each row in the table
pub const ROW_HEIGHT: f32 = 20.0;
/// Title of the file picker
const DIALOG_TITLE: &str = "Select a file";
const END_OF_FILE_MESSAGE: &str = "End of file";

/// Errors that can occur when previewing a file
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Represents a row in the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<String>,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// Message shown below the table
#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Info(String),
    Error(String),
}

/// Preview GUI app
pub struct PreviewApp {
    /// Currently opened file, if any
    session: Option<Session>,
    /// Rows fetched per "Next page"
    page_size: usize,
    status: Option<Status>,
    /// Whether another page may be requested
    paging_enabled: bool,
    /// Set when a new file is opened so the table starts at the top left again
    scroll_to_top: bool,
}

impl PreviewApp {
    pub fn new(page_size: usize) -> Self {
        Self {
            session: None,
            page_size,
            status: None,
            paging_enabled: false,
            scroll_to_top: false,
        }
    }

    /// Replaces the current session with one for `path` and shows its first page
    pub fn open_file(&mut self, path: PathBuf) {
        // dropping the previous session closes its file
        self.session = None;
        self.paging_enabled = false;
        self.status = None;
        self.scroll_to_top = true;

        match Session::open(&path, self.page_size) {
            Ok(session) => {
                self.session = Some(session);
                self.paging_enabled = true;
                self.next_page();
            }
            Err(PreviewError::Inference(e)) => {
                warn!("{}: {}", path.display(), e);
                self.status = Some(Status::Info(e.to_string()));
            }
            Err(e) => {
                error!("Failed to open {}: {}", path.display(), e);
                self.status = Some(Status::Error(format!(
                    "Failed to open {}: {}",
                    path.display(),
                    e
                )));
            }
        }
    }

    /// Appends the next page of rows to the table
    fn next_page(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.load_next_page() {
            Ok(n_rows) => {
                if n_rows == 0 || session.at_end() {
                    info!("Reached end of {}", session.path().display());
                    self.paging_enabled = false;
                    self.status = Some(Status::Info(END_OF_FILE_MESSAGE.to_string()));
                }
            }
            Err(e) => {
                error!("Failed to read {}: {}", session.path().display(), e);
                self.paging_enabled = false;
                self.status = Some(Status::Error(format!("Failed to read file: {}", e)));
            }
        }
    }

    fn pick_file(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title(DIALOG_TITLE)
            .add_filter("CSV files", &["csv"])
            .add_filter("All files", &["*"])
            .pick_file();
        if let Some(path) = picked {
            self.open_file(path);
        }
    }

    fn copy_to_clipboard(&mut self, ui: &Ui) {
        let Some(session) = &self.session else {
            return;
        };
        match session.displayed_text() {
            Ok(text) => ui.ctx().copy_text(text),
            Err(e) => {
                error!("Failed to copy {}: {}", session.path().display(), e);
                self.status = Some(Status::Error(format!("Failed to copy rows: {}", e)));
            }
        }
    }

    fn has_rows(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.rows().is_empty())
    }

    fn render_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open file").clicked() {
                self.pick_file();
            }
            if ui
                .add_enabled(self.paging_enabled, Button::new("Next page"))
                .clicked()
            {
                self.next_page();
            }
            if ui
                .add_enabled(self.has_rows(), Button::new("Copy to clipboard"))
                .clicked()
            {
                self.copy_to_clipboard(ui);
            }
            if let Some(session) = &self.session {
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(format!(
                        "{} rows, {} delimited",
                        session.cursor(),
                        session.delimiter()
                    ));
                });
            }
        });
    }

    fn render_status(&self, ui: &mut Ui) {
        match &self.status {
            Some(Status::Info(message)) => {
                ui.label(message);
            }
            Some(Status::Error(message)) => {
                ui.colored_label(Color32::RED, format!("Error: {}", message));
            }
            None => {}
        }
    }

    fn render_table(&mut self, ui: &mut Ui) {
        let scroll_to_top = std::mem::take(&mut self.scroll_to_top);
        let Some(session) = &self.session else {
            ui.heading("No file selected");
            return;
        };
        let rows = session.rows();
        if rows.is_empty() {
            return;
        }

        let mut scroll_area = ScrollArea::horizontal();
        if scroll_to_top {
            scroll_area = scroll_area.horizontal_scroll_offset(0.0);
        }
        scroll_area.show(ui, |ui| {
            let mut table = TableBuilder::new(ui)
                .striped(true)
                .cell_layout(Layout::left_to_right(Align::Min))
                .columns(Column::auto().resizable(true), session.n_cols());
            if scroll_to_top {
                table = table.vertical_scroll_offset(0.0);
            }
            table.body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row_ui| {
                    let row = &rows[row_ui.index()];
                    for cell in row.cells() {
                        row_ui.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
        });
    }
}

impl App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.render_controls(ui);
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.render_status(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_table(ui);
        });
    }
}
