use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Overdue is never stored: it is derived from `Upcoming` + a past due date.
str_enum!(ScheduleStatus {
    Upcoming => "upcoming",
    Completed => "completed",
});

str_enum!(VaccineCategory {
    NationalProgram => "national_program",
    Recommended => "recommended",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn schedule_status_round_trip() {
        for (variant, s) in [
            (ScheduleStatus::Upcoming, "upcoming"),
            (ScheduleStatus::Completed, "completed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ScheduleStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn overdue_is_not_a_stored_status() {
        let err = ScheduleStatus::from_str("overdue").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn serde_matches_as_str() {
        let json = serde_json::to_string(&VaccineCategory::NationalProgram).unwrap();
        assert_eq!(json, "\"national_program\"");
        let parsed: ScheduleStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, ScheduleStatus::Completed);
    }
}
