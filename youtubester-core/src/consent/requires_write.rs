// AUTO-GENERATED by youtubester-codegen. Do not edit.
// Format: "METHOD /path"

/// Endpoints the server flags as requiring YouTube write access.
pub(crate) const REQUIRES_WRITE: &[&str] = &[
    "DELETE /api/replies/{id}",
    "POST /api/replies/approve",
    "POST /api/videos/copy-template",
];
