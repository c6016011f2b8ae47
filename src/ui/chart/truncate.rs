//! Label truncation by live text measurement
//!
//! Labels are shortened one character at a time and re-measured until the
//! text plus an ellipsis fits the label column. Measuring instead of
//! estimating keeps this correct for any font the surface uses.

use alloc::string::String;

use log::{debug, warn};

use crate::ui::core::TextMeasure;

/// Result of fitting a label into the label column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedLabel {
    pub text: String,
    pub truncated: bool,
}

impl FittedLabel {
    fn untouched(name: &str) -> Self {
        Self {
            text: String::from(name),
            truncated: false,
        }
    }
}

/// Fits `name` into `max_width` pixels as measured by `measure`.
///
/// A label that already fits is returned unchanged, which also makes the
/// operation idempotent on its own output. If the surface cannot measure
/// text the label is left as is. The loop removes one character per
/// iteration, so it runs at most `name.chars().count()` times.
pub fn fit_label<M: TextMeasure + ?Sized>(name: &str, max_width: u32, measure: &M) -> FittedLabel {
    let Some(full_width) = measure.text_width(name) else {
        warn!("Cannot measure label {name:?}, leaving it untruncated");
        return FittedLabel::untouched(name);
    };

    if full_width <= max_width {
        return FittedLabel::untouched(name);
    }

    let ellipsis = measure.ellipsis();
    let Some(ellipsis_width) = measure.text_width(ellipsis) else {
        warn!("Cannot measure ellipsis, leaving {name:?} untruncated");
        return FittedLabel::untouched(name);
    };

    let mut text = String::from(name);
    while text.pop().is_some() {
        match measure.text_width(&text) {
            Some(width) if width + ellipsis_width <= max_width => break,
            Some(_) => {}
            None => {
                warn!("Lost text measurement while truncating {name:?}");
                return FittedLabel::untouched(name);
            }
        }
    }

    text.push_str(ellipsis);
    debug!("Truncated label {name:?} to {text:?}");

    FittedLabel {
        text,
        truncated: true,
    }
}
