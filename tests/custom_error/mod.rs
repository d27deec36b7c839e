use std::error::Error;

#[derive(Debug)]
pub struct CustomError {
    pub code: u16,
}

impl std::fmt::Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "custom error {}", self.code)
    }
}

impl Error for CustomError {}
