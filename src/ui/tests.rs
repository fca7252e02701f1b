use super::state::Gesture;
use super::*;
use crate::palette;
use crate::types::PortKind;
use eframe::egui;

/// Drive one headless frame of the canvas with the provided input events.
///
/// The central panel uses a zero frame so canvas space coincides with
/// screen space and event positions are deterministic.
fn run_canvas_frame(ctx: &egui::Context, app: &mut FlowBuilderApp, events: Vec<egui::Event>) {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.events = events;
    let _ = ctx.run(raw, |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                app.draw_canvas(ui);
            });
    });
}

fn press_at(pos: egui::Pos2) -> Vec<egui::Event> {
    vec![
        egui::Event::PointerMoved(pos),
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        },
    ]
}

fn release_at(pos: egui::Pos2) -> Vec<egui::Event> {
    vec![
        egui::Event::PointerMoved(pos),
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        },
    ]
}

/// App with an entry node and a Send Message node at known positions.
fn two_node_app() -> (FlowBuilderApp, crate::types::NodeId, crate::types::NodeId) {
    let mut app = FlowBuilderApp::default();
    let entry = app
        .graph
        .add_node(palette::entry_def(), 100.0, 100.0)
        .unwrap();
    let send = app
        .graph
        .add_node(
            palette::find_block("send_message").unwrap(),
            400.0,
            100.0,
        )
        .unwrap();
    (app, entry, send)
}

#[test]
fn clicking_node_body_selects_it_and_starts_a_drag() {
    let (mut app, entry, _send) = two_node_app();
    let ctx = egui::Context::default();

    // Establish hover first, then press on the node center.
    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(100.0, 100.0))]);
    run_canvas_frame(&ctx, &mut app, press_at(egui::pos2(100.0, 100.0)));

    assert_eq!(app.interaction.selection, Some(Selection::Node(entry)));
    assert_eq!(app.interaction.details_node, Some(entry));
    assert_eq!(app.interaction.gesture, Gesture::DraggingNode(entry));
}

#[test]
fn dragging_moves_the_node_anchor_to_the_pointer() {
    let (mut app, entry, _send) = two_node_app();
    let ctx = egui::Context::default();

    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(100.0, 100.0))]);
    run_canvas_frame(&ctx, &mut app, press_at(egui::pos2(100.0, 100.0)));
    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(250.0, 180.0))]);

    let node = &app.graph.nodes[&entry];
    assert_eq!((node.x, node.y), (250.0, 180.0));

    run_canvas_frame(&ctx, &mut app, release_at(egui::pos2(250.0, 180.0)));
    assert_eq!(app.interaction.gesture, Gesture::Idle);
    // The node stays where the drag left it.
    let node = &app.graph.nodes[&entry];
    assert_eq!((node.x, node.y), (250.0, 180.0));
}

#[test]
fn port_press_draws_a_preview_and_release_on_an_input_commits() {
    let (mut app, entry, send) = two_node_app();
    let ctx = egui::Context::default();

    let entry_node = app.graph.nodes[&entry].clone();
    let send_node = app.graph.nodes[&send].clone();
    let output_pos = app.output_port_pos(&entry_node, 0);
    let input_pos = app.input_port_pos(&send_node, 0);

    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(output_pos)]);
    run_canvas_frame(&ctx, &mut app, press_at(output_pos));
    match &app.interaction.gesture {
        Gesture::DrawingConnection(line) => {
            assert_eq!(line.origin_id, entry);
            assert_eq!(line.origin_kind, PortKind::Output);
        }
        other => panic!("expected connection preview, got {other:?}"),
    }

    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(300.0, 150.0))]);
    run_canvas_frame(&ctx, &mut app, release_at(input_pos));

    assert_eq!(app.interaction.gesture, Gesture::Idle);
    assert_eq!(app.graph.edges.len(), 1);
    let edge = &app.graph.edges[0];
    assert_eq!(edge.source_id, entry);
    assert_eq!(edge.target_id, send);
    assert_eq!(edge.target_port, "ctx");
}

#[test]
fn releasing_a_preview_over_empty_space_discards_it() {
    let (mut app, entry, _send) = two_node_app();
    let ctx = egui::Context::default();

    let entry_node = app.graph.nodes[&entry].clone();
    let output_pos = app.output_port_pos(&entry_node, 0);

    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(output_pos)]);
    run_canvas_frame(&ctx, &mut app, press_at(output_pos));
    run_canvas_frame(&ctx, &mut app, release_at(egui::pos2(600.0, 500.0)));

    assert_eq!(app.interaction.gesture, Gesture::Idle);
    assert!(app.graph.edges.is_empty());
}

#[test]
fn clicking_empty_canvas_clears_the_selection() {
    let (mut app, entry, _send) = two_node_app();
    app.interaction.selection = Some(Selection::Node(entry));
    app.interaction.details_node = Some(entry);
    let ctx = egui::Context::default();

    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(700.0, 600.0))]);
    run_canvas_frame(&ctx, &mut app, press_at(egui::pos2(700.0, 600.0)));

    assert_eq!(app.interaction.selection, None);
    assert_eq!(app.interaction.details_node, None);
}

#[test]
fn clicking_a_connection_selects_it() {
    let (mut app, entry, send) = two_node_app();
    let ctx = egui::Context::default();

    // Wire the two nodes with endpoints level with each other so the
    // curve's midpoint is easy to predict.
    let line = app
        .graph
        .begin_connection(entry, "ctx", PortKind::Output, 180.0, 100.0)
        .unwrap();
    let edge_id = app
        .graph
        .commit_connection(&line, send, "ctx", PortKind::Input, 320.0, 100.0)
        .unwrap();

    let midpoint = egui::pos2(250.0, 100.0);
    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(midpoint)]);
    run_canvas_frame(&ctx, &mut app, press_at(midpoint));

    assert_eq!(app.interaction.selection, Some(Selection::Edge(edge_id)));
}

#[test]
fn delete_key_removes_the_selected_node_and_its_connections() {
    let (mut app, entry, send) = two_node_app();
    let line = app
        .graph
        .begin_connection(entry, "ctx", PortKind::Output, 180.0, 100.0)
        .unwrap();
    app.graph
        .commit_connection(&line, send, "ctx", PortKind::Input, 320.0, 100.0)
        .unwrap();
    app.interaction.selection = Some(Selection::Node(entry));
    app.interaction.details_node = Some(entry);

    let ctx = egui::Context::default();
    let mut raw = egui::RawInput::default();
    raw.events = vec![egui::Event::Key {
        key: egui::Key::Delete,
        physical_key: Some(egui::Key::Delete),
        pressed: true,
        repeat: false,
        modifiers: egui::Modifiers::NONE,
    }];
    let _ = ctx.run(raw, |ctx| {
        // The app normally calls this from update(); we call it directly
        // for unit testing.
        app.handle_delete_key(ctx);
    });

    assert!(!app.graph.nodes.contains_key(&entry));
    assert!(app.graph.edges.is_empty());
    assert_eq!(app.interaction.selection, None);
    assert_eq!(app.interaction.details_node, None);
}

#[test]
fn delete_key_removes_a_selected_connection_only() {
    let (mut app, entry, send) = two_node_app();
    let line = app
        .graph
        .begin_connection(entry, "ctx", PortKind::Output, 180.0, 100.0)
        .unwrap();
    let edge_id = app
        .graph
        .commit_connection(&line, send, "ctx", PortKind::Input, 320.0, 100.0)
        .unwrap();
    app.interaction.selection = Some(Selection::Edge(edge_id));

    let ctx = egui::Context::default();
    let mut raw = egui::RawInput::default();
    raw.events = vec![egui::Event::Key {
        key: egui::Key::Delete,
        physical_key: Some(egui::Key::Delete),
        pressed: true,
        repeat: false,
        modifiers: egui::Modifiers::NONE,
    }];
    let _ = ctx.run(raw, |ctx| {
        app.handle_delete_key(ctx);
    });

    assert!(app.graph.edges.is_empty());
    assert_eq!(app.graph.nodes.len(), 2);
}

#[test]
fn entry_options_round_trip_through_the_node_field() {
    use serde_json::Value;

    let mut app = FlowBuilderApp::default();
    let entry = app
        .graph
        .add_node(palette::entry_def(), 0.0, 0.0)
        .unwrap();
    assert!(super::details::entry_options(&app.graph.nodes[&entry]).is_empty());

    let items = vec![
        Value::String("target".to_string()),
        Value::String("count".to_string()),
    ];
    app.graph.set_field(entry, "options", Value::Array(items));
    let mut options = super::details::entry_options(&app.graph.nodes[&entry]);
    assert_eq!(options, ["target", "count"]);

    // Remove the first option and append a new one, as the editor rows do.
    options.remove(0);
    options.push("reason".to_string());
    let items = options.into_iter().map(Value::String).collect();
    app.graph.set_field(entry, "options", Value::Array(items));
    assert_eq!(
        super::details::entry_options(&app.graph.nodes[&entry]),
        ["count", "reason"]
    );
}

#[test]
fn dropping_a_second_entry_block_is_rejected_with_a_warning() {
    let mut app = FlowBuilderApp::default();
    app.drop_palette_block("start_command", egui::pos2(100.0, 100.0));
    assert_eq!(app.graph.nodes.len(), 1);

    app.drop_palette_block("start_command", egui::pos2(300.0, 300.0));

    assert_eq!(app.graph.nodes.len(), 1);
    let status = app.status.as_ref().expect("warning should be shown");
    assert!(status.is_warning);
}
