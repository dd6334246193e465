/// Domain-level errors produced while validating a generation request.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The logical model name is not in the registry.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// A field the selected model requires was not supplied.
    #[error("{field} is required for {model} model")]
    MissingRequiredField {
        /// Name of the missing input field (e.g. `image_url`).
        field: &'static str,
        /// Logical model name the field is required for.
        model: String,
    },
}

impl CoreError {
    /// Convenience constructor for a missing required input field.
    pub fn missing_field(field: &'static str, model: &str) -> Self {
        Self::MissingRequiredField {
            field,
            model: model.to_string(),
        }
    }
}
