//! The message board: lists the messages and location summaries plotted on
//! the globe.
//!
//! This side only talks to the globe through messages. It plots the records
//! on startup, frames the camera when an entry is clicked, highlights the
//! entry for a clicked marker, and fills in draft coordinates when the bare
//! globe is clicked.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

use crate::launch_params::LaunchParams;
use crate::messages::{FrameOnCoordinate, MarkerSelected, PlotPoints, SurfaceSelected};
use crate::points::{self, BoardRecord, RecordKind};

/// Plugin for the message board panel.
pub struct MessageBoardPlugin;

impl Plugin for MessageBoardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MessageBoard>()
            .add_systems(Startup, load_board)
            .add_systems(Update, track_selections)
            .add_systems(EguiPrimaryContextPass, board_ui_system);
    }
}

/// Records on the board and what is currently selected.
#[derive(Resource, Debug, Default)]
pub struct MessageBoard {
    records: Vec<BoardRecord>,
    highlighted: Option<u64>,
    draft: Option<SurfaceSelected>,
}

impl MessageBoard {
    pub fn new(records: Vec<BoardRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[BoardRecord] {
        &self.records
    }

    /// Records of one kind, in file order.
    pub fn records_of(&self, kind: RecordKind) -> impl Iterator<Item = &BoardRecord> {
        self.records
            .iter()
            .filter(move |record| record.kind() == kind)
    }

    pub fn highlighted(&self) -> Option<&BoardRecord> {
        let id = self.highlighted?;
        self.records.iter().find(|record| record.id() == id)
    }

    /// Highlight the entry with `id`. Returns false and leaves the current
    /// highlight alone if no such entry exists.
    pub fn highlight(&mut self, id: u64) -> bool {
        if self.records.iter().any(|record| record.id() == id) {
            self.highlighted = Some(id);
            true
        } else {
            false
        }
    }

    /// Coordinate of the last bare-globe click.
    pub fn draft(&self) -> Option<&SurfaceSelected> {
        self.draft.as_ref()
    }

    pub fn set_draft(&mut self, selected: SurfaceSelected) {
        self.draft = Some(selected);
    }
}

/// Read the records, plot them, and frame the launch coordinate if one was
/// given.
#[allow(clippy::needless_pass_by_value)]
fn load_board(
    params: Res<LaunchParams>,
    mut board: ResMut<MessageBoard>,
    mut plot: MessageWriter<PlotPoints>,
    mut frame: MessageWriter<FrameOnCoordinate>,
) {
    let records = match &params.points {
        Some(path) => match points::load_records(path) {
            Ok(records) => {
                let summaries = records
                    .iter()
                    .filter(|record| record.kind() == RecordKind::Summary)
                    .count();
                tracing::info!(
                    "Loaded {} messages and {summaries} summaries from {}",
                    records.len() - summaries,
                    path.display()
                );
                records
            }
            Err(e) => {
                tracing::error!("Failed to load points file, using sample records: {e}");
                points::sample_records()
            }
        },
        None => points::sample_records(),
    };

    plot.write(PlotPoints(
        records.iter().map(BoardRecord::to_geo_point).collect(),
    ));
    *board = MessageBoard::new(records);

    if let Some(focus) = params.focus {
        frame.write(focus.into());
    }
}

/// Follow picks made on the globe.
fn track_selections(
    mut markers: MessageReader<MarkerSelected>,
    mut surfaces: MessageReader<SurfaceSelected>,
    mut board: ResMut<MessageBoard>,
) {
    for selected in markers.read() {
        if !board.highlight(selected.id) {
            tracing::warn!("Selected marker {} is not on the board", selected.id);
        }
    }
    if let Some(selected) = surfaces.read().last() {
        board.set_draft(*selected);
    }
}

/// One selectable list entry. Returns the record's id when clicked.
fn record_entry(ui: &mut egui::Ui, record: &BoardRecord, selected: bool) -> Option<u64> {
    let response = ui.selectable_label(selected, record.title());
    if let BoardRecord::Summary(summary) = record {
        ui.label(summary.summary.as_str());
    }
    if let Some(posted_at) = record.posted_at() {
        ui.small(posted_at);
    }
    response.clicked().then(|| record.id())
}

/// Render the message and summary lists and the draft coordinate.
#[allow(clippy::needless_pass_by_value)]
fn board_ui_system(
    mut contexts: EguiContexts,
    mut board: ResMut<MessageBoard>,
    mut frame: MessageWriter<FrameOnCoordinate>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let mut clicked = None;
    egui::SidePanel::right("message_board")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Messages");
            ui.separator();

            egui::ScrollArea::vertical()
                .max_height(ui.available_height() - 90.0)
                .show(ui, |ui| {
                    for record in board.records_of(RecordKind::Message) {
                        let selected = board.highlighted == Some(record.id());
                        clicked = record_entry(ui, record, selected).or(clicked);
                    }

                    if board.records_of(RecordKind::Summary).next().is_some() {
                        ui.add_space(8.0);
                        ui.heading("Summaries");
                        ui.separator();
                    }
                    for record in board.records_of(RecordKind::Summary) {
                        let selected = board.highlighted == Some(record.id());
                        clicked = record_entry(ui, record, selected).or(clicked);
                    }
                });

            ui.separator();
            ui.label("New message at:");
            match board.draft() {
                Some(draft) => {
                    ui.label(format!("Latitude: {}", draft.latitude()));
                    ui.label(format!("Longitude: {}", draft.longitude()));
                }
                None => {
                    ui.weak("Click the globe to pick a location");
                }
            }
        });

    if let Some(id) = clicked
        && board.highlight(id)
        && let Some(record) = board.highlighted()
    {
        let (lat, lng) = record.coordinate();
        frame.write(FrameOnCoordinate { lat, lng });
    }

    Ok(())
}
