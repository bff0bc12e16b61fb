//! Video listing and template copy types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Listing
// ============================================================================

/// One video in the channel listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListItemDto {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// A page of videos
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    #[serde(default)]
    pub items: Vec<VideoListItemDto>,
    /// Token for the next page, absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Query for `GET /api/videos`
///
/// Empty values are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListVideosParams {
    /// Server-side title filter
    pub title: Option<String>,
    /// Page to fetch
    pub page_token: Option<String>,
}

impl ListVideosParams {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(title) = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            pairs.push(("title", title));
        }
        if let Some(token) = self.page_token.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("pageToken", token));
        }
        pairs
    }
}

// ============================================================================
// Template Copy
// ============================================================================

/// AI generation options for a template copy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestionOptions {
    pub prompt_enrichment: Option<String>,
    pub generate_title: bool,
    pub generate_description: bool,
    pub generate_tags: bool,
}

/// Body of `POST /api/videos/copy-template`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyVideoTemplateRequest {
    pub source_url: Option<String>,
    pub target_url: Option<String>,
    pub copy_tags: bool,
    pub copy_location: bool,
    pub copy_playlists: bool,
    pub copy_category: bool,
    pub copy_default_languages: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_suggestion_options: Option<AiSuggestionOptions>,
}

/// State of the template copy form.
///
/// Setters keep the form consistent the way the page does: turning AI on
/// pre-checks every AI option, turning it off clears them, and copying tags
/// excludes generating them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTemplateForm {
    pub source_url: String,
    pub target_url: String,
    copy_tags: bool,
    pub copy_location: bool,
    pub copy_playlists: bool,
    pub copy_category: bool,
    pub copy_default_languages: bool,
    use_ai: bool,
    pub prompt_enrichment: String,
    pub generate_title: bool,
    pub generate_description: bool,
    generate_tags: bool,
}

impl Default for CopyTemplateForm {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            target_url: String::new(),
            copy_tags: true,
            copy_location: false,
            copy_playlists: false,
            copy_category: true,
            copy_default_languages: true,
            use_ai: false,
            prompt_enrichment: String::new(),
            generate_title: false,
            generate_description: false,
            generate_tags: false,
        }
    }
}

impl CopyTemplateForm {
    pub fn copy_tags(&self) -> bool {
        self.copy_tags
    }

    /// Toggle copying tags. Copying wins over generating.
    pub fn set_copy_tags(&mut self, enabled: bool) {
        self.copy_tags = enabled;
        if enabled {
            self.generate_tags = false;
        }
    }

    pub fn use_ai(&self) -> bool {
        self.use_ai
    }

    pub fn generate_tags(&self) -> bool {
        self.generate_tags
    }

    /// Toggle AI suggestions.
    pub fn set_use_ai(&mut self, enabled: bool) {
        self.use_ai = enabled;
        if enabled {
            self.generate_title = true;
            self.generate_description = true;
            self.set_generate_tags(true);
        } else {
            self.prompt_enrichment.clear();
            self.generate_title = false;
            self.generate_description = false;
            self.generate_tags = false;
        }
    }

    /// Toggle AI tag generation. Ignored while tags are being copied.
    pub fn set_generate_tags(&mut self, enabled: bool) {
        self.generate_tags = enabled && !self.copy_tags;
    }

    /// Whether the form has enough to submit: both URLs and at least one action.
    pub fn can_submit(&self) -> bool {
        if self.source_url.is_empty() || self.target_url.is_empty() {
            return false;
        }

        let copies_something = self.copy_tags
            || self.copy_location
            || self.copy_playlists
            || self.copy_category
            || self.copy_default_languages;

        let generates_something = self.use_ai
            && (!self.prompt_enrichment.trim().is_empty()
                || self.generate_title
                || self.generate_description
                || self.generate_tags);

        copies_something || generates_something
    }

    /// Build the API request from the form.
    pub fn to_request(&self) -> CopyVideoTemplateRequest {
        let ai_suggestion_options = self.use_ai.then(|| AiSuggestionOptions {
            prompt_enrichment: non_empty(self.prompt_enrichment.trim()),
            generate_title: self.generate_title,
            generate_description: self.generate_description,
            generate_tags: self.generate_tags,
        });

        CopyVideoTemplateRequest {
            source_url: non_empty(&self.source_url),
            target_url: non_empty(&self.target_url),
            copy_tags: self.copy_tags && !self.generate_tags,
            copy_location: self.copy_location,
            copy_playlists: self.copy_playlists,
            copy_category: self.copy_category,
            copy_default_languages: self.copy_default_languages,
            ai_suggestion_options,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> CopyTemplateForm {
        CopyTemplateForm {
            source_url: "https://www.youtube.com/watch?v=abc".to_string(),
            target_url: "https://www.youtube.com/watch?v=def".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_params_skip_empty_values() {
        assert!(ListVideosParams::default().query_pairs().is_empty());
        assert!(ListVideosParams::default()
            .title("   ")
            .page_token("")
            .query_pairs()
            .is_empty());

        let params = ListVideosParams::default().title(" cats ").page_token("CAUQAA");
        assert_eq!(
            params.query_pairs(),
            vec![("title", "cats"), ("pageToken", "CAUQAA")]
        );
    }

    #[test]
    fn test_video_page_deserialization() {
        let page: VideoPage = serde_json::from_str(
            r#"{"items":[{"videoId":"abc","title":"Hello"}],"nextPageToken":null}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].video_id, "abc");
        assert_eq!(page.next_page_token, None);
    }

    #[test]
    fn test_form_defaults() {
        let form = CopyTemplateForm::default();
        assert!(form.copy_tags() && form.copy_category && form.copy_default_languages);
        assert!(!form.copy_location && !form.copy_playlists);
        assert!(!form.use_ai());
        assert!(!form.can_submit());
    }

    #[test]
    fn test_enabling_ai_prechecks_options() {
        let mut form = filled_form();
        form.set_copy_tags(false);
        form.set_use_ai(true);

        assert!(form.generate_title);
        assert!(form.generate_description);
        assert!(form.generate_tags());
    }

    #[test]
    fn test_generate_tags_excluded_by_copy_tags() {
        let mut form = filled_form();
        assert!(form.copy_tags());
        form.set_use_ai(true);

        assert!(form.generate_title);
        assert!(!form.generate_tags());
    }

    #[test]
    fn test_copy_tags_clears_generate_tags() {
        let mut form = filled_form();
        form.set_copy_tags(false);
        form.set_use_ai(true);
        assert!(form.generate_tags());

        form.set_copy_tags(true);
        assert!(form.copy_tags());
        assert!(!form.generate_tags());
        assert!(form.to_request().copy_tags);
    }

    #[test]
    fn test_disabling_ai_clears_options() {
        let mut form = filled_form();
        form.set_copy_tags(false);
        form.set_use_ai(true);
        form.prompt_enrichment = "focus on tutorials".to_string();

        form.set_use_ai(false);

        assert!(form.prompt_enrichment.is_empty());
        assert!(!form.generate_title && !form.generate_description && !form.generate_tags());
    }

    #[test]
    fn test_can_submit_requires_urls_and_action() {
        let mut form = filled_form();
        assert!(form.can_submit());

        form.set_copy_tags(false);
        form.copy_category = false;
        form.copy_default_languages = false;
        assert!(!form.can_submit());

        form.set_use_ai(true);
        assert!(form.can_submit());

        form.target_url.clear();
        assert!(!form.can_submit());
    }

    #[test]
    fn test_can_submit_with_prompt_only() {
        let mut form = filled_form();
        form.set_copy_tags(false);
        form.copy_category = false;
        form.copy_default_languages = false;
        form.set_use_ai(true);
        form.generate_title = false;
        form.generate_description = false;
        form.set_generate_tags(false);
        assert!(!form.can_submit());

        form.prompt_enrichment = "  short-form tutorials ".to_string();
        assert!(form.can_submit());
    }

    #[test]
    fn test_to_request_without_ai() {
        let request = filled_form().to_request();
        assert_eq!(request.source_url.as_deref(), Some("https://www.youtube.com/watch?v=abc"));
        assert!(request.copy_tags);
        assert!(request.ai_suggestion_options.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("aiSuggestionOptions").is_none());
        assert_eq!(json["copyDefaultLanguages"], true);
    }

    #[test]
    fn test_to_request_with_ai() {
        let mut form = filled_form();
        form.set_copy_tags(false);
        form.set_use_ai(true);
        form.prompt_enrichment = "   ".to_string();

        let request = form.to_request();
        let ai = request.ai_suggestion_options.unwrap();
        assert_eq!(ai.prompt_enrichment, None);
        assert!(ai.generate_tags);
        assert!(!request.copy_tags);
    }

    #[test]
    fn test_to_request_empty_urls_become_none() {
        let request = CopyTemplateForm::default().to_request();
        assert_eq!(request.source_url, None);
        assert_eq!(request.target_url, None);
    }
}
