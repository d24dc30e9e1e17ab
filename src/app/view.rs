use eframe::egui::{self, Align, Color32, Context, Layout, Sense, Stroke, Ui};
use graph_spotlight::backend::InteractiveBackend;

use super::render::{draw_background, draw_card, draw_edge, draw_edge_labels, with_opacity};
use super::{Mode, ViewModel};

impl<B: InteractiveBackend> ViewModel<B> {
    pub(super) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui, reload_requested, is_loading));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    fn draw_top_bar(&mut self, ui: &mut Ui, reload_requested: &mut bool, is_loading: bool) {
        ui.horizontal(|ui| {
            ui.heading("graph-spotlight");
            ui.separator();
            ui.label(self.mode.label());
            ui.label(format!("source: {}", self.source));
            ui.label(format!("nodes: {}", self.engine.graph().node_count()));
            ui.label(format!("edges: {}", self.engine.graph().edge_count()));
            ui.label(format!(
                "hovered: {}",
                self.engine.hover().hovered().unwrap_or("none")
            ));

            if ui.button("Fit view").clicked() {
                self.engine.backend_mut().fit_view();
            }
            let pause_label = if self.paused {
                "Resume layout"
            } else {
                "Pause layout"
            };
            if ui
                .add_enabled(self.mode == Mode::Live, egui::Button::new(pause_label))
                .clicked()
            {
                self.toggle_paused();
            }
            let can_remove = self.engine.hover().hovered().is_some();
            if ui
                .add_enabled(can_remove, egui::Button::new("Remove hovered"))
                .clicked()
            {
                self.remove_hovered();
            }
            if ui
                .add_enabled(!is_loading, egui::Button::new("Reload"))
                .clicked()
            {
                *reload_requested = true;
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if let Some(fps_text) = self.fps_display_text() {
                    ui.label(fps_text);
                }
            });
        });
    }

    fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.engine.backend_mut().set_viewport(rect);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.handle_graph_drag(ui, &response);
        self.handle_graph_keys(ui, &response);

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer));
        self.engine.backend_mut().pointer_moved(pointer);

        self.engine.update();

        let transform = self.engine.overlay().transform();
        draw_background(&painter, rect, &transform);

        let graph = self.engine.graph();
        let frame = self.engine.frame();
        let base_card = self.engine.overlay().config().card_size();

        for edge in &frame.edges {
            draw_edge(&painter, edge);
        }
        for edge in &frame.edges {
            if let Some(record) = graph.edge(&edge.id) {
                draw_edge_labels(&painter, edge, record);
            }
        }

        for node in &frame.nodes {
            let Some(record) = graph.node(&node.id) else {
                continue;
            };
            let texture = self
                .cards
                .get(ui.ctx(), node.anchor.size(), node.style.blur_radius);
            let text_scale = if base_card.x > f32::EPSILON {
                node.anchor.width() / base_card.x
            } else {
                1.0
            };
            draw_card(&painter, node, record, texture.as_ref(), text_scale);
        }

        if let Some(source) = self.connecting.as_deref().and_then(|id| frame.node(id)) {
            if let Some(pointer) = pointer {
                painter.line_segment(
                    [source.center, pointer],
                    Stroke::new(2.0, with_opacity(Color32::from_rgb(229, 72, 77), 0.8)),
                );
            }
        }

        if self.engine.wants_frame()
            || self.engine.backend().dragging().is_some()
            || self.connecting.is_some()
        {
            ui.ctx().request_repaint();
        }
    }
}
