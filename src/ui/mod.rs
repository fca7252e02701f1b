//! User interface components and rendering logic for the flow builder.
//!
//! This module contains all the UI-related code including the main
//! application struct, canvas rendering, the palette and details panels,
//! and user interaction handling.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main FlowBuilderApp
//! - `canvas` - Canvas geometry, hit testing, and the gesture state machine
//! - `rendering` - Drawing nodes, connections, and the connection preview
//! - `details` - The details panel for the selected node
//! - `store_ops` - Async save/list/delete against the flow store

mod canvas;
mod details;
mod rendering;
mod state;
mod store_ops;

#[cfg(test)]
mod tests;

pub use state::{FlowBuilderApp, Selection};

use crate::constants::STATUS_MESSAGE_SECS;
use crate::palette;
use eframe::egui;

impl eframe::App for FlowBuilderApp {
    /// Main update function called by egui for each frame.
    ///
    /// Handles the overall UI layout: the toolbar, the palette panel on the
    /// left, the details panel on the right, and the canvas in the center.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        // Handle completed and pending store operations
        self.handle_pending_operations(ctx);

        // Handle delete key for removing the selected node or connection
        self.handle_delete_key(ctx);

        // Expire the transient status message
        if let Some(status) = &self.status {
            if status.shown_at.elapsed().as_secs_f64() > STATUS_MESSAGE_SECS {
                self.status = None;
            }
        }

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::SidePanel::left("palette_panel")
            .default_width(160.0)
            .show(ctx, |ui| {
                self.draw_palette_panel(ui);
            });

        if self.interaction.details_node.is_some() {
            egui::SidePanel::right("details_panel")
                .resizable(true)
                .default_width(260.0)
                .show(ctx, |ui| {
                    self.draw_details_panel(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        if self.store.show_flows_window {
            self.draw_flows_window(ctx);
        }
    }
}

impl FlowBuilderApp {
    /// Handles delete key presses to remove the selected node or
    /// connection.
    pub fn handle_delete_key(&mut self, ctx: &egui::Context) {
        // Don't handle delete while a text edit widget has keyboard focus
        if ctx.wants_keyboard_input() {
            return;
        }
        if !ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            return;
        }

        match self.interaction.selection.take() {
            Some(Selection::Node(node_id)) => {
                self.graph.remove_node(node_id);
                if self.interaction.details_node == Some(node_id) {
                    self.interaction.details_node = None;
                }
                if self.interaction.temp_fields_node == Some(node_id) {
                    self.interaction.temp_fields_node = None;
                    self.interaction.temp_field_edits.clear();
                }
            }
            Some(Selection::Edge(edge_id)) => {
                self.graph.remove_edge(edge_id);
            }
            None => {}
        }
    }

    /// Renders the toolbar with flow operations and the status area.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                self.new_flow();
            }
            if ui.button("Flows…").clicked() {
                self.store.show_flows_window = true;
                self.refresh_flows();
            }
            if ui.button("Save").clicked() {
                self.save_flow();
            }

            ui.separator();

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                match &self.store.flow_id {
                    Some(_) => ui.label(self.graph.derived_name()),
                    None => ui.label(format!("{}*", self.graph.derived_name())),
                };
                if let Some(status) = &self.status {
                    let color = if status.is_warning {
                        egui::Color32::from_rgb(240, 180, 80)
                    } else {
                        egui::Color32::GRAY
                    };
                    ui.colored_label(color, &status.text);
                }
            });
        });
    }

    /// Renders the palette: one draggable entry per block definition.
    fn draw_palette_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Blocks");
        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for def in palette::builtin_blocks() {
                    let button = egui::Button::new(&def.label)
                        .min_size(egui::vec2(ui.available_width(), 24.0));
                    let response = ui.add(button).interact(egui::Sense::drag());
                    if response.drag_started() {
                        self.interaction.palette_drag = Some(def.code_id.clone());
                    }
                    if !def.doc.is_empty() {
                        response.on_hover_text(&def.doc);
                    }
                }
            });
    }

    /// Renders the saved-flows picker window.
    fn draw_flows_window(&mut self, ctx: &egui::Context) {
        let mut open = self.store.show_flows_window;
        let mut to_open = None;
        let mut to_delete = None;

        egui::Window::new("Flows")
            .open(&mut open)
            .resizable(true)
            .show(ctx, |ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh_flows();
                }
                ui.separator();
                if self.store.flows.is_empty() {
                    ui.label("No saved flows");
                }
                for flow in &self.store.flows {
                    ui.horizontal(|ui| {
                        ui.label(&flow.name);
                        if ui.button("Open").clicked() {
                            to_open = Some(flow.clone());
                        }
                        if ui.button("Delete").clicked() {
                            to_delete = flow.flow_id.clone();
                        }
                    });
                }
            });

        self.store.show_flows_window = open;
        if let Some(flow) = to_open {
            self.open_flow(&flow);
        }
        if let Some(flow_id) = to_delete {
            self.delete_flow(flow_id);
        }
    }
}
