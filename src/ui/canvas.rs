//! Canvas geometry, hit testing, and pointer interaction.
//!
//! All node and edge coordinates live in canvas space: the pointer position
//! minus the canvas rect's top-left corner, recomputed from the current
//! layout on every event. There is no pan or zoom, so the translation is a
//! plain offset.

use super::state::{FlowBuilderApp, Gesture, Selection};
use crate::constants::*;
use crate::palette;
use crate::types::*;
use eframe::egui;

impl FlowBuilderApp {
    /// Translates a screen position into canvas space.
    pub fn to_canvas(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        screen_pos - self.canvas_origin.to_vec2()
    }

    /// Translates a canvas position into screen space for painting.
    pub fn to_screen(&self, canvas_pos: egui::Pos2) -> egui::Pos2 {
        canvas_pos + self.canvas_origin.to_vec2()
    }

    /// The canvas-space rectangle of a node. The node's `(x, y)` anchor is
    /// its center; height grows with the number of port rows.
    pub fn node_rect(&self, node: &Node) -> egui::Rect {
        let height = NODE_HEADER_HEIGHT
            + node.port_rows() as f32 * PORT_ROW_HEIGHT
            + 2.0 * NODE_BODY_PADDING;
        egui::Rect::from_center_size(
            egui::pos2(node.x, node.y),
            egui::vec2(NODE_MIN_WIDTH, height),
        )
    }

    fn port_row_y(rect: &egui::Rect, row: usize) -> f32 {
        rect.top() + NODE_HEADER_HEIGHT + NODE_BODY_PADDING + (row as f32 + 0.5) * PORT_ROW_HEIGHT
    }

    /// Canvas position of an input socket, on the node's left edge.
    pub fn input_port_pos(&self, node: &Node, row: usize) -> egui::Pos2 {
        let rect = self.node_rect(node);
        egui::pos2(rect.left(), Self::port_row_y(&rect, row))
    }

    /// Canvas position of an output socket, on the node's right edge.
    pub fn output_port_pos(&self, node: &Node, row: usize) -> egui::Pos2 {
        let rect = self.node_rect(node);
        egui::pos2(rect.right(), Self::port_row_y(&rect, row))
    }

    /// Finds the port socket under the given canvas position, if any.
    ///
    /// Ports are checked before node bodies so a press near a socket starts
    /// a connection rather than a drag.
    pub fn find_port_at(&self, pos: egui::Pos2) -> Option<(NodeId, String, PortKind)> {
        for node in self.graph.nodes.values() {
            for (row, port) in node.inputs.iter().enumerate() {
                if self.input_port_pos(node, row).distance(pos) <= PORT_HIT_RADIUS {
                    return Some((node.id, port.name.clone(), PortKind::Input));
                }
            }
            for (row, port) in node.visible_outputs().enumerate() {
                if self.output_port_pos(node, row).distance(pos) <= PORT_HIT_RADIUS {
                    return Some((node.id, port.name.clone(), PortKind::Output));
                }
            }
        }
        None
    }

    /// Finds the node whose body contains the given canvas position.
    pub fn find_node_at(&self, pos: egui::Pos2) -> Option<NodeId> {
        self.graph
            .nodes
            .values()
            .find(|node| self.node_rect(node).contains(pos))
            .map(|node| node.id)
    }

    /// Finds the edge whose curve passes near the given canvas position.
    ///
    /// The cubic curve is sampled into short segments and the position is
    /// tested against each. Dangling edges are never hit.
    pub fn find_edge_at(&self, pos: egui::Pos2) -> Option<EdgeId> {
        for edge in &self.graph.edges {
            let Some((start, end)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let points = sample_edge_curve(
                egui::pos2(start.0, start.1),
                egui::pos2(end.0, end.1),
            );
            for pair in points.windows(2) {
                if point_to_segment_distance(pos, pair[0], pair[1]) <= EDGE_CLICK_THRESHOLD {
                    return Some(edge.id);
                }
            }
        }
        None
    }

    /// Drives the gesture state machine from this frame's pointer input.
    pub fn handle_canvas_input(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if ui.input(|i| i.pointer.primary_down()) {
            let Some(pointer) = response.interact_pointer_pos() else {
                return;
            };
            let pos = self.to_canvas(pointer);

            match self.interaction.gesture.clone() {
                Gesture::Idle => {
                    if ui.input(|i| i.pointer.primary_pressed()) {
                        self.begin_gesture(pos);
                    }
                }
                Gesture::DraggingNode(node_id) => {
                    // The node anchor follows the pointer directly.
                    self.graph.move_node(node_id, pos.x, pos.y);
                }
                Gesture::DrawingConnection(_) => {
                    if let Gesture::DrawingConnection(line) = &mut self.interaction.gesture {
                        line.follow(pos.x, pos.y);
                    }
                }
            }
        } else {
            // Mouse released: the gesture always ends this frame.
            let gesture = std::mem::take(&mut self.interaction.gesture);
            if let Gesture::DrawingConnection(line) = gesture {
                if let Some(pointer) = response
                    .interact_pointer_pos()
                    .or_else(|| ui.input(|i| i.pointer.latest_pos()))
                {
                    let pos = self.to_canvas(pointer);
                    self.finish_connection(&line, pos);
                }
            }
        }
    }

    /// Resolves what a fresh primary press lands on and starts the
    /// matching gesture or selection.
    fn begin_gesture(&mut self, pos: egui::Pos2) {
        if let Some((node_id, port, kind)) = self.find_port_at(pos) {
            if let Some(line) = self
                .graph
                .begin_connection(node_id, &port, kind, pos.x, pos.y)
            {
                self.interaction.gesture = Gesture::DrawingConnection(line);
            }
        } else if let Some(node_id) = self.find_node_at(pos) {
            self.interaction.selection = Some(Selection::Node(node_id));
            self.interaction.details_node = Some(node_id);
            self.interaction.gesture = Gesture::DraggingNode(node_id);
        } else if let Some(edge_id) = self.find_edge_at(pos) {
            self.interaction.selection = Some(Selection::Edge(edge_id));
            self.interaction.details_node = None;
        } else {
            self.interaction.selection = None;
            self.interaction.details_node = None;
        }
    }

    /// Finalizes a connection gesture at the release position.
    ///
    /// Releasing anywhere but over a compatible port silently discards the
    /// preview; structural rejections surface as a toolbar warning.
    fn finish_connection(&mut self, line: &TempLine, pos: egui::Pos2) {
        let Some((node_id, port, kind)) = self.find_port_at(pos) else {
            return;
        };
        if let Err(err) = self
            .graph
            .commit_connection(line, node_id, &port, kind, pos.x, pos.y)
        {
            self.set_warning(err.to_string());
        }
    }

    /// Completes a palette drag by placing a new node where the pointer
    /// was released.
    pub fn drop_palette_block(&mut self, code_id: &str, pos: egui::Pos2) {
        let Some(def) = palette::find_block(code_id) else {
            return;
        };
        match self.graph.add_node(def, pos.x, pos.y) {
            Ok(node_id) => {
                self.interaction.selection = Some(Selection::Node(node_id));
                self.interaction.details_node = Some(node_id);
            }
            Err(err) => self.set_warning(err.to_string()),
        }
    }
}

/// Samples the edge cubic into a polyline for hit testing.
pub fn sample_edge_curve(start: egui::Pos2, end: egui::Pos2) -> Vec<egui::Pos2> {
    let c1 = start + egui::vec2(EDGE_CURVE_OFFSET, 0.0);
    let c2 = end - egui::vec2(EDGE_CURVE_OFFSET, 0.0);
    (0..=EDGE_HIT_SEGMENTS)
        .map(|i| {
            let t = i as f32 / EDGE_HIT_SEGMENTS as f32;
            cubic_point(start, c1, c2, end, t)
        })
        .collect()
}

fn cubic_point(
    p0: egui::Pos2,
    p1: egui::Pos2,
    p2: egui::Pos2,
    p3: egui::Pos2,
    t: f32,
) -> egui::Pos2 {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * u * u * t;
    let w2 = 3.0 * u * t * t;
    let w3 = t * t * t;
    egui::pos2(
        w0 * p0.x + w1 * p1.x + w2 * p2.x + w3 * p3.x,
        w0 * p0.y + w1 * p1.y + w2 * p2.y + w3 * p3.y,
    )
}

/// Distance from a point to a line segment, clamping the projection to the
/// segment's ends.
fn point_to_segment_distance(point: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
