//! Recording view surface.

use std::collections::{BTreeSet, HashMap};

use keepsake_core::view::{Element, Region, StepId, ViewSurface};

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Show(StepId),
    Hide(StepId),
    SetActive(StepId, bool),
    FlushLayout(StepId),
    WriteText(Region, String),
    Reveal(Element),
    Conceal(Element),
    PresentOptions(StepId, Vec<String>),
    RenderPoints(usize),
    SetPointActive(usize, bool),
    DisplayMoment { caption: String, image: String },
    ClearBubbles,
    AppendBubble(String),
    CollapseEnvelope,
    Acknowledge(String),
    Reset,
}

/// A view surface that records every call and keeps the resulting state.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    texts: HashMap<Region, String>,
    shown: BTreeSet<StepId>,
    active_steps: BTreeSet<StepId>,
    visible: BTreeSet<Element>,
    points: usize,
    active_points: BTreeSet<usize>,
    moment: Option<(String, String)>,
    bubbles: Vec<String>,
}

impl RecordingSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Number of recorded calls equal to `call`.
    #[must_use]
    pub fn count(&self, call: &SurfaceCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Text currently written into `region`.
    #[must_use]
    pub fn text(&self, region: Region) -> Option<&str> {
        self.texts.get(&region).map(String::as_str)
    }

    /// Whether the step's view is displayed.
    #[must_use]
    pub fn is_shown(&self, step: StepId) -> bool {
        self.shown.contains(&step)
    }

    /// Whether the step's view is marked active.
    #[must_use]
    pub fn is_active(&self, step: StepId) -> bool {
        self.active_steps.contains(&step)
    }

    /// Whether `element` is currently revealed.
    #[must_use]
    pub fn is_visible(&self, element: Element) -> bool {
        self.visible.contains(&element)
    }

    /// Number of rendered timeline points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points
    }

    /// Indices of the timeline points marked active.
    #[must_use]
    pub fn active_points(&self) -> Vec<usize> {
        self.active_points.iter().copied().collect()
    }

    /// Caption and image of the displayed moment.
    #[must_use]
    pub fn moment(&self) -> Option<(&str, &str)> {
        self.moment
            .as_ref()
            .map(|(caption, image)| (caption.as_str(), image.as_str()))
    }

    /// Chat bubbles currently in the log.
    #[must_use]
    pub fn bubbles(&self) -> &[String] {
        &self.bubbles
    }
}

impl ViewSurface for RecordingSurface {
    fn show(&mut self, step: StepId) {
        self.shown.insert(step);
        self.calls.push(SurfaceCall::Show(step));
    }

    fn hide(&mut self, step: StepId) {
        self.shown.remove(&step);
        self.calls.push(SurfaceCall::Hide(step));
    }

    fn set_active(&mut self, step: StepId, active: bool) {
        if active {
            self.active_steps.insert(step);
        } else {
            self.active_steps.remove(&step);
        }
        self.calls.push(SurfaceCall::SetActive(step, active));
    }

    fn flush_layout(&mut self, step: StepId) {
        self.calls.push(SurfaceCall::FlushLayout(step));
    }

    fn write_text(&mut self, region: Region, text: &str) {
        self.texts.insert(region, text.to_owned());
        self.calls.push(SurfaceCall::WriteText(region, text.to_owned()));
    }

    fn reveal(&mut self, element: Element) {
        self.visible.insert(element);
        self.calls.push(SurfaceCall::Reveal(element));
    }

    fn conceal(&mut self, element: Element) {
        self.visible.remove(&element);
        self.calls.push(SurfaceCall::Conceal(element));
    }

    fn present_options(&mut self, step: StepId, _prompt: &str, options: &[String]) {
        self.calls
            .push(SurfaceCall::PresentOptions(step, options.to_vec()));
    }

    fn render_points(&mut self, count: usize) {
        self.points = count;
        self.active_points.clear();
        self.calls.push(SurfaceCall::RenderPoints(count));
    }

    fn set_point_active(&mut self, index: usize, active: bool) {
        if active {
            self.active_points.insert(index);
        } else {
            self.active_points.remove(&index);
        }
        self.calls.push(SurfaceCall::SetPointActive(index, active));
    }

    fn display_moment(&mut self, caption: &str, image: &str) {
        self.moment = Some((caption.to_owned(), image.to_owned()));
        self.calls.push(SurfaceCall::DisplayMoment {
            caption: caption.to_owned(),
            image: image.to_owned(),
        });
    }

    fn clear_bubbles(&mut self) {
        self.bubbles.clear();
        self.calls.push(SurfaceCall::ClearBubbles);
    }

    fn append_bubble(&mut self, text: &str) {
        self.bubbles.push(text.to_owned());
        self.calls.push(SurfaceCall::AppendBubble(text.to_owned()));
    }

    fn collapse_envelope(&mut self) {
        self.calls.push(SurfaceCall::CollapseEnvelope);
    }

    fn acknowledge(&mut self, message: &str) {
        self.calls.push(SurfaceCall::Acknowledge(message.to_owned()));
    }

    fn reset(&mut self) {
        let calls = std::mem::take(&mut self.calls);
        *self = Self {
            calls,
            ..Self::default()
        };
        self.calls.push(SurfaceCall::Reset);
    }
}
