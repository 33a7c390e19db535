use std::collections::VecDeque;

use log::debug;

use crate::{
    core::Simulation,
    types::{FillMode, LayoutMode},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEvent {
    Layout(LayoutMode),
    Fill(FillMode),
    ToggleFill,
}

/// Owns the selected layout and fill. Events queue up and are only applied
/// between ticks, so a tick always sees one consistent force pair.
#[derive(Debug)]
pub struct LayoutController {
    layout: LayoutMode,
    fill: FillMode,
    pending: VecDeque<ModeEvent>,
}

impl LayoutController {
    pub fn new(layout: LayoutMode, fill: FillMode) -> Self {
        Self {
            layout,
            fill,
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: ModeEvent) {
        self.pending.push_back(event);
    }

    /// Returns true when any layout event was applied.
    pub fn apply_pending(&mut self, sim: &mut Simulation) -> bool {
        let mut relayout = false;
        while let Some(event) = self.pending.pop_front() {
            match event {
                ModeEvent::Layout(mode) => {
                    sim.activate(mode);
                    self.layout = mode;
                    relayout = true;
                }
                ModeEvent::Fill(fill) => self.set_fill(fill),
                ModeEvent::ToggleFill => self.set_fill(self.fill.toggled()),
            }
        }
        relayout
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn fill(&self) -> FillMode {
        self.fill
    }

    fn set_fill(&mut self, fill: FillMode) {
        if fill != self.fill {
            debug!("fill mode {:?} -> {:?}", self.fill, fill);
        }
        self.fill = fill;
    }
}
