//! The details panel shown when a node is selected.
//!
//! Entry nodes expose command metadata; every other node lists its inputs,
//! showing either the wired source or an editable constant, and its
//! outputs.

use super::state::FlowBuilderApp;
use crate::palette;
use crate::types::*;
use eframe::egui;
use serde_json::Value;

impl FlowBuilderApp {
    /// Renders the details panel for the currently opened node.
    pub fn draw_details_panel(&mut self, ui: &mut egui::Ui) {
        let Some(node_id) = self.interaction.details_node else {
            return;
        };
        let Some(node) = self.graph.nodes.get(&node_id).cloned() else {
            self.interaction.details_node = None;
            return;
        };

        self.sync_field_buffers(&node);

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.heading(&node.label);
                ui.label(egui::RichText::new(node.id.to_string()).small().weak());
                if let Some(def) = palette::find_block(&node.code_id) {
                    if !def.doc.is_empty() {
                        ui.label(egui::RichText::new(&def.doc).small());
                    }
                }
                ui.separator();

                if node.is_entry() {
                    self.draw_entry_fields(ui, node_id);
                    ui.separator();
                }

                if !node.inputs.is_empty() {
                    ui.label("Inputs:");
                    for input in &node.inputs {
                        self.draw_input_row(ui, &node, input);
                    }
                    ui.separator();
                }

                let outputs: Vec<&Port> = node.visible_outputs().collect();
                if !outputs.is_empty() {
                    ui.label("Outputs:");
                    for output in outputs {
                        ui.label(format!("  {} ({})", output.name, output.ty));
                    }
                    ui.separator();
                }

                ui.colored_label(egui::Color32::GRAY, "Press Delete to remove");
            });
    }

    /// Reloads the staging buffers when the panel switches to another node.
    fn sync_field_buffers(&mut self, node: &Node) {
        if self.interaction.temp_fields_node == Some(node.id) {
            return;
        }
        self.interaction.temp_fields_node = Some(node.id);
        self.interaction.temp_field_edits.clear();

        for name in ["command", "description"] {
            let value = node.field_str(name).unwrap_or_default().to_string();
            self.interaction.temp_field_edits.insert(name.into(), value);
        }
        for input in &node.inputs {
            let value = node.field_str(&input.name).unwrap_or_default().to_string();
            self.interaction
                .temp_field_edits
                .insert(input.name.clone(), value);
        }
    }

    /// Command metadata for the entry node: name, description, and option
    /// names.
    fn draw_entry_fields(&mut self, ui: &mut egui::Ui, node_id: NodeId) {
        ui.label("Command:");
        if self.edit_buffer(ui, "command") {
            let text = self.interaction.temp_field_edits["command"].clone();
            self.graph.set_field(node_id, "command", Value::String(text));
        }

        ui.label("Description:");
        if self.edit_buffer(ui, "description") {
            let text = self.interaction.temp_field_edits["description"].clone();
            self.graph
                .set_field(node_id, "description", Value::String(text));
        }

        self.draw_entry_options(ui, node_id);
    }

    /// The entry node's option list: one editable row per option name,
    /// with per-row removal and an add button.
    fn draw_entry_options(&mut self, ui: &mut egui::Ui, node_id: NodeId) {
        let Some(node) = self.graph.nodes.get(&node_id) else {
            return;
        };
        let mut options = entry_options(node);
        let mut changed = false;
        let mut removed = None;

        ui.label("Options:");
        for (row, option) in options.iter_mut().enumerate() {
            ui.horizontal(|ui| {
                if ui.text_edit_singleline(option).changed() {
                    changed = true;
                }
                if ui.small_button("✖").clicked() {
                    removed = Some(row);
                }
            });
        }
        if let Some(row) = removed {
            options.remove(row);
            changed = true;
        }
        if ui.button("Add option").clicked() {
            options.push(String::new());
            changed = true;
        }

        if changed {
            let items = options.into_iter().map(Value::String).collect();
            self.graph.set_field(node_id, "options", Value::Array(items));
        }
    }

    /// One input row: the wired source when connected, an editable
    /// constant otherwise.
    fn draw_input_row(&mut self, ui: &mut egui::Ui, node: &Node, input: &Port) {
        ui.horizontal(|ui| {
            ui.label(format!("{} ({})", input.name, input.ty));
            let wired = self.graph.incoming_edge(node.id, &input.name).map(|edge| {
                let source = self
                    .graph
                    .nodes
                    .get(&edge.source_id)
                    .map(|n| n.label.clone())
                    .unwrap_or_else(|| "?".to_string());
                format!("⇐ {}.{}", source, edge.source_port)
            });
            if let Some(text) = wired {
                ui.label(text);
            } else if self.edit_buffer(ui, &input.name) {
                let text = self.interaction.temp_field_edits[&input.name].clone();
                self.graph
                    .set_field(node.id, &input.name, Value::String(text));
            }
        });
        if !input.desc.is_empty() {
            ui.label(egui::RichText::new(format!("  {}", input.desc)).small().weak());
        }
    }

    /// Single-line editor bound to a staging buffer. Returns `true` when
    /// the text changed this frame.
    fn edit_buffer(&mut self, ui: &mut egui::Ui, name: &str) -> bool {
        let buffer = self
            .interaction
            .temp_field_edits
            .entry(name.to_string())
            .or_default();
        ui.text_edit_singleline(buffer).changed()
    }
}

/// Option names stored on the entry node, in declaration order.
pub(super) fn entry_options(node: &Node) -> Vec<String> {
    match node.field("options") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
