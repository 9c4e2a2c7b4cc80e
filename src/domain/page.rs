use serde::{Deserialize, Serialize};

use crate::domain::error::AppError;

/// Which view the presentation layer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// File selection / chat screen
    #[default]
    Input,
    Dashboard,
    Table,
}

impl Page {
    pub fn selector(self) -> u8 {
        match self {
            Page::Input => 0,
            Page::Dashboard => 1,
            Page::Table => 2,
        }
    }
}

impl TryFrom<u8> for Page {
    type Error = AppError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(Page::Input),
            1 => Ok(Page::Dashboard),
            2 => Ok(Page::Table),
            other => Err(AppError::ValidationError(format!(
                "unknown page selector {}",
                other
            ))),
        }
    }
}
