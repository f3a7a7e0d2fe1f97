use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot message a client may show once after an action.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Success envelope carrying an optional payload and flash annotation.
#[derive(Debug, Serialize)]
pub struct Flashed<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

impl<T> Flashed<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            flash: None,
        }
    }

    pub fn with_flash(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            flash: Some(Flash::success(message)),
        }
    }
}

impl Flashed<()> {
    pub fn flash_only(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            flash: Some(Flash::success(message)),
        }
    }
}
