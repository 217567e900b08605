/// Bearer token together with the refresh generation that produced it.
///
/// Generation 0 is the empty placeholder held before the first login.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub generation: u64,
}

impl Token {
    pub fn new(value: String, generation: u64) -> Self {
        Self { value, generation }
    }

    pub fn empty() -> Self {
        Self::new(String::new(), 0)
    }

    pub fn is_present(&self) -> bool {
        self.generation > 0 && !self.value.is_empty()
    }
}

// keep the secret out of logs
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"***")
            .field("generation", &self.generation)
            .finish()
    }
}
