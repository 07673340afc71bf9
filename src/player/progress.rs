//! Elapsed/total time as the timeline shows it.

/// Progress of the current track, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Played share of the track, in `[0, 1]`.
    pub fraction: f64,
    pub elapsed: String,
    pub total: String,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            elapsed: format_clock(0.0),
            total: format_clock(0.0),
        }
    }
}

fn usable_total(total: Option<f64>) -> Option<f64> {
    total.filter(|t| t.is_finite() && *t > 0.0)
}

/// Format seconds as `MM:SS`. Minutes grow past two digits for long tracks.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let secs = seconds.floor() as u64;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Turn device-reported times into a timeline report.
///
/// An unknown or non-finite total reports zero progress rather than garbage.
pub fn report_time(current: f64, total: Option<f64>) -> Progress {
    let Some(total) = usable_total(total) else {
        return Progress::default();
    };
    let current = if current.is_finite() { current } else { 0.0 };

    Progress {
        fraction: (current / total).clamp(0.0, 1.0),
        elapsed: format_clock(current),
        total: format_clock(total),
    }
}

/// Map a click on the timeline to a position in the track.
pub fn seek_from_pointer(pointer_offset: f64, track_width: f64, total: Option<f64>) -> Option<f64> {
    let total = usable_total(total)?;
    if !(track_width.is_finite() && track_width > 0.0) {
        return None;
    }
    let offset = pointer_offset.clamp(0.0, track_width);
    Some(offset / track_width * total)
}
