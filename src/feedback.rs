// User feedback prompt. No feedback service ships with this build, so every
// operation fails with `AdbError::NotSupported`.
use crate::adb::{AdbError, AdbResult};
use serde::{Deserialize, Serialize};

const FEATURE: &str = "User feedback";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPrompt {
    pub pre_submit_heading: String,
    pub post_submit_heading: String,
    pub comment_placeholder: String,
    pub body_text: String,
    pub predefined_comments: Vec<String>,
    pub should_popup: bool,
}

pub async fn submit_rating(_rating: u8) -> AdbResult<()> {
    Err(AdbError::NotSupported { feature: FEATURE })
}

pub async fn submit_comment(
    _rating: u8,
    _comment: &str,
    _selected_predefined_comments: &[String],
    _allow_user_info_sharing: bool,
) -> AdbResult<()> {
    Err(AdbError::NotSupported { feature: FEATURE })
}

pub async fn dismiss() -> AdbResult<()> {
    Err(AdbError::NotSupported { feature: FEATURE })
}

pub async fn get_prompt() -> AdbResult<FeedbackPrompt> {
    Err(AdbError::NotSupported { feature: FEATURE })
}
