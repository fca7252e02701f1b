//! Drawing the canvas: nodes, connections, and the connection preview.

use super::canvas::sample_edge_curve;
use super::state::{FlowBuilderApp, Gesture, Selection};
use crate::constants::*;
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;

const CANVAS_FILL: egui::Color32 = egui::Color32::from_rgb(24, 26, 30);
const NODE_FILL: egui::Color32 = egui::Color32::from_rgb(45, 48, 56);
const NODE_HEADER_FILL: egui::Color32 = egui::Color32::from_rgb(60, 64, 74);
const NODE_OUTLINE: egui::Color32 = egui::Color32::from_rgb(90, 94, 104);
const SELECTED_OUTLINE: egui::Color32 = egui::Color32::from_rgb(100, 150, 255);
const PORT_FILL: egui::Color32 = egui::Color32::from_rgb(160, 200, 120);
const EDGE_COLOR: egui::Color32 = egui::Color32::DARK_GRAY;
const PREVIEW_COLOR: egui::Color32 = egui::Color32::from_rgb(140, 140, 160);
const LABEL_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 220, 220);
const PORT_LABEL_COLOR: egui::Color32 = egui::Color32::from_rgb(170, 170, 180);

impl FlowBuilderApp {
    /// Renders the canvas area and drives its interaction for one frame.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        // Capture the origin before any hit testing so pointer translation
        // matches this frame's layout.
        self.canvas_origin = response.rect.min;

        self.handle_palette_drop(ui, &response);
        self.handle_canvas_input(ui, &response);
        self.render_graph(&painter, response.rect);
    }

    /// Finishes a palette drag when the pointer is released over the
    /// canvas, and draws the drag ghost while it is in flight.
    fn handle_palette_drop(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let Some(code_id) = self.interaction.palette_drag.clone() else {
            return;
        };
        let pointer = ui.input(|i| i.pointer.latest_pos());
        if let Some(pos) = pointer {
            if response.rect.contains(pos) {
                ui.painter().text(
                    pos + egui::vec2(12.0, 0.0),
                    egui::Align2::LEFT_CENTER,
                    &code_id,
                    egui::FontId::proportional(12.0),
                    PREVIEW_COLOR,
                );
            }
        }
        if ui.input(|i| i.pointer.any_released()) {
            self.interaction.palette_drag = None;
            if let Some(pos) = pointer {
                if response.rect.contains(pos) {
                    let canvas_pos = self.to_canvas(pos);
                    self.drop_palette_block(&code_id, canvas_pos);
                }
            }
        }
    }

    /// Paints every layer: connections first, then the preview, then node
    /// bodies on top.
    pub fn render_graph(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        painter.rect_filled(canvas_rect, 0.0, CANVAS_FILL);

        for edge in &self.graph.edges {
            // An edge whose endpoint node is gone is skipped, not drawn
            // from a fallback position.
            let Some((start, end)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let selected = self.interaction.selection == Some(Selection::Edge(edge.id));
            self.draw_edge_curve(
                painter,
                egui::pos2(start.0, start.1),
                egui::pos2(end.0, end.1),
                if selected { SELECTED_OUTLINE } else { EDGE_COLOR },
                if selected { 3.0 } else { 2.0 },
            );
        }

        if let Gesture::DrawingConnection(line) = &self.interaction.gesture {
            if let Some(node) = self.graph.nodes.get(&line.origin_id) {
                let start = egui::pos2(
                    node.x + line.origin_offset_x,
                    node.y + line.origin_offset_y,
                );
                self.draw_edge_curve(
                    painter,
                    start,
                    egui::pos2(line.end_x, line.end_y),
                    PREVIEW_COLOR,
                    2.0,
                );
            }
        }

        for node in self.graph.nodes.values() {
            let selected = self.interaction.selection == Some(Selection::Node(node.id));
            self.draw_node(painter, node, selected);
        }
    }

    fn draw_edge_curve(
        &self,
        painter: &egui::Painter,
        start: egui::Pos2,
        end: egui::Pos2,
        color: egui::Color32,
        width: f32,
    ) {
        let points: Vec<egui::Pos2> = sample_edge_curve(start, end)
            .into_iter()
            .map(|p| self.to_screen(p))
            .collect();
        painter.add(egui::Shape::line(points, egui::Stroke::new(width, color)));
    }

    /// Draws one node: header with the label, body, and port sockets.
    pub fn draw_node(&self, painter: &egui::Painter, node: &Node, selected: bool) {
        let rect = self.node_rect(node).translate(self.canvas_origin.to_vec2());
        let header = egui::Rect::from_min_size(
            rect.min,
            egui::vec2(rect.width(), NODE_HEADER_HEIGHT),
        );

        let outline = if selected { SELECTED_OUTLINE } else { NODE_OUTLINE };
        painter.rect_filled(rect, 4.0, NODE_FILL);
        painter.rect_filled(header, 4.0, NODE_HEADER_FILL);
        painter.rect_stroke(
            rect,
            4.0,
            egui::Stroke::new(if selected { 2.0 } else { 1.0 }, outline),
            StrokeKind::Outside,
        );

        painter.text(
            header.center(),
            egui::Align2::CENTER_CENTER,
            &node.label,
            egui::FontId::proportional(12.0),
            LABEL_COLOR,
        );

        for (row, port) in node.inputs.iter().enumerate() {
            let pos = self.to_screen(self.input_port_pos(node, row));
            painter.circle_filled(pos, PORT_RADIUS, PORT_FILL);
            painter.text(
                pos + egui::vec2(PORT_MARGIN, 0.0),
                egui::Align2::LEFT_CENTER,
                &port.name,
                egui::FontId::proportional(10.0),
                PORT_LABEL_COLOR,
            );
        }
        for (row, port) in node.visible_outputs().enumerate() {
            let pos = self.to_screen(self.output_port_pos(node, row));
            painter.circle_filled(pos, PORT_RADIUS, PORT_FILL);
            painter.text(
                pos - egui::vec2(PORT_MARGIN, 0.0),
                egui::Align2::RIGHT_CENTER,
                &port.name,
                egui::FontId::proportional(10.0),
                PORT_LABEL_COLOR,
            );
        }
    }
}
