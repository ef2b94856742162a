use serde::{Deserialize, Serialize};
use thiserror::Error;

mod merge;
pub use merge::*;
mod steps;
pub use steps::*;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),
}

/// Pixel dimensions parsed from a `WxH` string such as `1024x1024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::str::FromStr for Resolution {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (w, h) = lower
            .split_once('x')
            .ok_or_else(|| PromptError::InvalidResolution(s.to_string()))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| PromptError::InvalidResolution(s.to_string()))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| PromptError::InvalidResolution(s.to_string()))?;
        if width == 0 || height == 0 {
            return Err(PromptError::InvalidResolution(s.to_string()));
        }
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_parse() {
        let res: Resolution = "1024x1024".parse().unwrap();
        assert_eq!(res, Resolution::new(1024, 1024));
        assert_eq!(res.to_string(), "1024x1024");
    }

    #[test]
    fn test_resolution_parse_mixed_case_and_spaces() {
        let res: Resolution = " 784X1168 ".parse().unwrap();
        assert_eq!(res, Resolution::new(784, 1168));
    }

    #[test]
    fn test_resolution_rejects_garbage() {
        assert!("1024".parse::<Resolution>().is_err());
        assert!("0x512".parse::<Resolution>().is_err());
        assert!("wide x tall".parse::<Resolution>().is_err());
    }
}
