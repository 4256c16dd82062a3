use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(DocumentStatus {
    Uploaded => "uploaded",
    Processing => "processing",
    Ready => "ready",
    Failed => "failed",
});

str_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
});

str_enum!(ExportFormat {
    Csv => "csv",
    Quickbooks => "quickbooks",
    Excel => "excel",
});

impl DocumentStatus {
    /// Terminal statuses only leave the machine via document deletion.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// Legal status moves: uploaded → processing → ready, with failed
    /// reachable from any non-terminal state. There is no path back to
    /// uploaded, and nothing transitions out of ready or failed.
    pub fn can_transition(&self, to: &DocumentStatus) -> bool {
        matches!(
            (self, to),
            (Self::Uploaded, Self::Processing)
                | (Self::Uploaded, Self::Failed)
                | (Self::Processing, Self::Ready)
                | (Self::Processing, Self::Failed)
        )
    }
}
