#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Enter(String),
    Leave(String),
}

impl PointerEvent {
    pub fn node_id(&self) -> &str {
        match self {
            Self::Enter(id) | Self::Leave(id) => id,
        }
    }
}

/// At most one hovered node per render session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    hovered: Option<String>,
}

impl HoverState {
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn is_hovering(&self) -> bool {
        self.hovered.is_some()
    }

    /// Returns `true` when the hovered node changed.
    pub fn apply(&mut self, event: &PointerEvent) -> bool {
        match event {
            PointerEvent::Enter(id) => self.enter(id),
            PointerEvent::Leave(id) => self.leave(id),
        }
    }

    pub fn enter(&mut self, id: &str) -> bool {
        if self.hovered.as_deref() == Some(id) {
            return false;
        }
        self.hovered = Some(id.to_owned());
        true
    }

    /// A leave for a node other than the hovered one is a late event and is ignored.
    pub fn leave(&mut self, id: &str) -> bool {
        if self.hovered.as_deref() != Some(id) {
            return false;
        }
        self.hovered = None;
        true
    }

    pub fn clear(&mut self) -> bool {
        self.hovered.take().is_some()
    }
}
