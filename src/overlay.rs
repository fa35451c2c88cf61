use crate::cue::Cue;
use crate::session::PlaybackSession;

/// Where the overlay sits on the video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    BottomCenter,
}

/// A subtitle block drawn over the video.
///
/// Overlays never take pointer input, so clicks reach the controls below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub text: String,
    pub placement: Placement,
}

impl Overlay {
    pub fn interactive(&self) -> bool {
        false
    }

    /// HTML for the overlay. The text is escaped and line breaks become `<br>`.
    pub fn to_markup(&self) -> String {
        let lines: Vec<String> = self.text.lines().map(escape_html).collect();
        let position = match self.placement {
            Placement::BottomCenter => "position:absolute;bottom:2.5rem;width:100%;text-align:center",
        };
        format!(
            "<div class=\"subtitle-overlay\" style=\"{};pointer-events:none\">\
             <span class=\"subtitle-text\">{}</span></div>",
            position,
            lines.join("<br>")
        )
    }
}

/// Produces the overlay for `cue`, or nothing when subtitles are hidden or no
/// cue is active.
pub fn render(cue: Option<&Cue>, visible: bool) -> Option<Overlay> {
    if !visible {
        return None;
    }
    cue.map(|cue| Overlay {
        text: cue.text.clone(),
        placement: Placement::BottomCenter,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenderKey {
    generation: u64,
    cue: Option<usize>,
    visible: bool,
}

/// Re-renders the overlay from a session, skipping the work when neither the
/// active cue nor the visibility changed since the last call.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    key: Option<RenderKey>,
    output: Option<Overlay>,
    renders: usize,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, session: &PlaybackSession) -> Option<&Overlay> {
        let index = session.active_cue_index();
        let key = RenderKey {
            generation: session.generation(),
            cue: index,
            visible: session.subtitles_visible(),
        };
        if self.key != Some(key) {
            self.output = render(index.map(|idx| &session.cues()[idx]), key.visible);
            self.key = Some(key);
            self.renders += 1;
        }
        self.output.as_ref()
    }

    pub fn current(&self) -> Option<&Overlay> {
        self.output.as_ref()
    }

    /// How many times the overlay was actually rebuilt.
    pub fn render_count(&self) -> usize {
        self.renders
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
