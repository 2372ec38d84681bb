use uuid::Uuid;

/// Random hyphenated UUID text, used to keep staged file names unique.
pub(crate) fn generate_uuid() -> String {
    Uuid::new_v4().hyphenated().to_string()
}
