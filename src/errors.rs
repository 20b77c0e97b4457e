#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    #[error("Malformed consent cookie: {0}")]
    MalformedConsent(String),

    #[error("Unknown cookie category: {0}")]
    UnknownCategory(String),

    #[error("Incomplete cookie selection: {answered} of {required} choices made")]
    IncompleteSelection { answered: usize, required: usize },
}
