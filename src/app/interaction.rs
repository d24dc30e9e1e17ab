use eframe::egui::{self, Key, PointerButton, Rect, Ui};
use graph_spotlight::backend::InteractiveBackend;

use super::ViewModel;

impl<B: InteractiveBackend> ViewModel<B> {
    pub(super) fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.engine.backend_mut().zoom_about(pointer, zoom_factor);
    }

    pub(super) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.engine.backend_mut().pan_by(response.drag_delta());
        }
    }

    /// Primary drag moves a card; with shift held it draws a new edge instead.
    pub(super) fn handle_graph_drag(&mut self, ui: &Ui, response: &egui::Response) {
        let pointer = response.interact_pointer_pos();

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(pointer) = pointer {
                if ui.input(|input| input.modifiers.shift) {
                    self.connecting = self
                        .engine
                        .frame()
                        .node_at(pointer)
                        .map(|node| node.id.clone());
                } else if let Some(id) = self.engine.backend_mut().begin_drag(pointer) {
                    log::debug!("dragging {id}");
                }
            }
        } else if response.dragged_by(PointerButton::Primary) && self.connecting.is_none() {
            if let Some(pointer) = pointer {
                self.engine.backend_mut().drag_to(pointer);
            }
        }

        if response.drag_stopped() {
            self.engine.backend_mut().end_drag();
            if let Some(source) = self.connecting.take() {
                let target = ui
                    .input(|input| input.pointer.interact_pos())
                    .and_then(|pointer| self.engine.frame().node_at(pointer))
                    .map(|node| node.id.clone());
                if let Some(target) = target.filter(|target| *target != source) {
                    match self.engine.connect(&source, &target) {
                        Ok(id) => log::info!("connected {source} to {target} as {id}"),
                        Err(error) => log::warn!("could not connect {source} to {target}: {error}"),
                    }
                }
            }
        }
    }

    pub(super) fn handle_graph_keys(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }
        if ui.input(|input| input.key_pressed(Key::Delete) || input.key_pressed(Key::Backspace)) {
            self.remove_hovered();
        }
    }

    pub(super) fn remove_hovered(&mut self) {
        let Some(id) = self.engine.hover().hovered().map(str::to_owned) else {
            return;
        };
        match self.engine.remove_node(&id) {
            Ok(node) => log::info!("removed node {} ({})", node.id, node.title),
            Err(error) => log::warn!("could not remove {id}: {error}"),
        }
    }

    pub(super) fn toggle_paused(&mut self) {
        self.paused = !self.paused;
        let backend = self.engine.backend_mut();
        if self.paused {
            backend.cancel();
        } else {
            backend.resume();
        }
    }
}
