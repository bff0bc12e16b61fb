//! AI reply suggestions awaiting review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest reply YouTube accepts from the dashboard
pub const MAX_REPLY_LEN: usize = 320;

/// Server-side lifecycle status of a reply, as its numeric code.
///
/// Only the first two codes (pulled, suggested) are still up for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyStatus(pub i32);

impl ReplyStatus {
    /// Whether a reply in this status is shown for approval.
    pub fn is_reviewable(self) -> bool {
        matches!(self.0, 0 | 1)
    }
}

/// A comment with its suggested reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
    #[serde(default)]
    pub comment_text: Option<String>,
    #[serde(default)]
    pub suggested_text: Option<String>,
    #[serde(default)]
    pub final_text: Option<String>,
    #[serde(default)]
    pub pulled_at: Option<DateTime<Utc>>,
    pub status: ReplyStatus,
}

impl Reply {
    /// Text to pre-fill for approval: the final text if set, else the
    /// suggestion, trimmed and clamped.
    pub fn draft_text(&self) -> String {
        let text = self
            .final_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.suggested_text.as_deref())
            .unwrap_or_default();
        clamp_reply_text(text)
    }
}

/// One approved reply sent to `POST /api/replies/approve`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftDecisionDto {
    pub comment_id: Option<String>,
    pub approved_text: String,
}

/// Outcome of a batch approval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRepliesResult {
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub failed: u32,
}

/// Trim and cut to [`MAX_REPLY_LEN`] characters.
pub fn clamp_reply_text(text: &str) -> String {
    text.trim().chars().take(MAX_REPLY_LEN).collect()
}

/// Replies still up for review.
pub fn reviewable(replies: Vec<Reply>) -> Vec<Reply> {
    replies
        .into_iter()
        .filter(|r| r.status.is_reviewable())
        .collect()
}

/// Build approval decisions from `(comment id, edited text)` rows.
///
/// Rows whose text is blank after trimming are dropped.
pub fn decisions_for<'a, I>(rows: I) -> Vec<DraftDecisionDto>
where
    I: IntoIterator<Item = (Option<&'a str>, &'a str)>,
{
    rows.into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(comment_id, text)| DraftDecisionDto {
            comment_id: comment_id.map(str::to_string),
            approved_text: clamp_reply_text(text),
        })
        .collect()
}
