use crate::core::{DesktopId, WindowRef};

pub type Result<T> = std::result::Result<T, DesktopError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DesktopError {
    /// No versioned adapter matches the running build.
    #[error("unsupported platform build {build}.{revision}")]
    UnsupportedPlatform { build: u32, revision: u32 },

    /// A native method reported failure.
    #[error("{call} failed: {message}")]
    NativeCallFailed { call: &'static str, message: String },

    #[error("desktop {0} was already removed")]
    AlreadyRemoved(DesktopId),

    #[error("window {0} not found")]
    WindowNotFound(WindowRef),

    /// The user dismissed the prompt, or it was superseded.
    #[error("prompt cancelled")]
    PromptCancelled,

    #[error("{capability} is not supported on {generation}")]
    UnsupportedOnThisVersion {
        capability: &'static str,
        generation: &'static str,
    },

    #[error("desktop name must not be empty")]
    EmptyName,
}

impl DesktopError {
    pub fn native(call: &'static str, message: impl Into<String>) -> Self {
        DesktopError::NativeCallFailed {
            call,
            message: message.into(),
        }
    }

    /// Races and dismissals that end an operation without being a failure.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            DesktopError::AlreadyRemoved(_)
                | DesktopError::WindowNotFound(_)
                | DesktopError::PromptCancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_errors() {
        let id = DesktopId::from_u128(1);
        assert!(DesktopError::AlreadyRemoved(id).is_benign());
        assert!(DesktopError::PromptCancelled.is_benign());
        assert!(!DesktopError::EmptyName.is_benign());
        assert!(!DesktopError::native("SwitchDesktop", "E_FAIL").is_benign());
    }

    #[test]
    fn test_error_messages() {
        let err = DesktopError::UnsupportedOnThisVersion {
            capability: "move-desktop",
            generation: "windows-10",
        };
        assert_eq!(err.to_string(), "move-desktop is not supported on windows-10");

        let err = DesktopError::UnsupportedPlatform {
            build: 22631,
            revision: 3085,
        };
        assert_eq!(err.to_string(), "unsupported platform build 22631.3085");
    }
}
