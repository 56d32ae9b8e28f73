//! Acquiring the profile and cross-section curves from the user.

use solid_kernel::{CurveHandle, Kernel, ObjectId};
use tracing::debug;

use crate::types::{CurvePair, OpError};

pub const PROFILE_PROMPT: &str = "Pick the profile curve";
pub const CROSS_SECTION_PROMPT: &str = "Pick the cross-section curve";

/// An object that was selected when the generator started.
#[derive(Debug)]
pub enum SelectedObject {
    Curve(CurveHandle),
    Other(ObjectId),
}

/// Interactive curve selection.
pub trait CurvePicker {
    /// Objects selected before the command ran. Clears the selection.
    fn take_selection(&mut self) -> Vec<SelectedObject>;

    /// Ask the user to pick one curve; `None` on cancel.
    fn pick_curve(&mut self, prompt: &str) -> Option<CurveHandle>;
}

/// Use the pre-selection when it is exactly two curves of which exactly one
/// is closed (that one is the cross-section); otherwise prompt for the
/// profile and then the cross-section. Cancelling either prompt yields
/// `Ok(None)`.
pub fn acquire_curves(
    kernel: &dyn Kernel,
    picker: &mut dyn CurvePicker,
) -> Result<Option<CurvePair>, OpError> {
    let mut selection = picker.take_selection();
    if selection.len() == 2 {
        if let (Some(SelectedObject::Curve(second)), Some(SelectedObject::Curve(first))) =
            (selection.pop(), selection.pop())
        {
            match (kernel.is_curve_closed(&first)?, kernel.is_curve_closed(&second)?) {
                (false, true) => {
                    debug!("using pre-selected curves");
                    return Ok(Some(CurvePair {
                        profile: first,
                        cross_section: second,
                    }));
                }
                (true, false) => {
                    debug!("using pre-selected curves");
                    return Ok(Some(CurvePair {
                        profile: second,
                        cross_section: first,
                    }));
                }
                _ => debug!("pre-selected curves are ambiguous, prompting"),
            }
        }
    }

    let Some(profile) = picker.pick_curve(PROFILE_PROMPT) else {
        return Ok(None);
    };
    let Some(cross_section) = picker.pick_curve(CROSS_SECTION_PROMPT) else {
        return Ok(None);
    };
    Ok(Some(CurvePair {
        profile,
        cross_section,
    }))
}
