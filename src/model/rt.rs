use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Neighborhood sub-unit codes. The kampung has six RTs and the codes are
/// zero-padded everywhere (database, JWT claims, URL paths).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum Rt {
    #[serde(rename = "01")]
    #[sqlx(rename = "01")]
    #[strum(serialize = "01")]
    Rt01,
    #[serde(rename = "02")]
    #[sqlx(rename = "02")]
    #[strum(serialize = "02")]
    Rt02,
    #[serde(rename = "03")]
    #[sqlx(rename = "03")]
    #[strum(serialize = "03")]
    Rt03,
    #[serde(rename = "04")]
    #[sqlx(rename = "04")]
    #[strum(serialize = "04")]
    Rt04,
    #[serde(rename = "05")]
    #[sqlx(rename = "05")]
    #[strum(serialize = "05")]
    Rt05,
    #[serde(rename = "06")]
    #[sqlx(rename = "06")]
    #[strum(serialize = "06")]
    Rt06,
}

impl Rt {
    /// Accepts both padded ("04") and bare ("4") forms, which the mobile
    /// client has historically sent interchangeably.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if let Ok(rt) = trimmed.parse::<Rt>() {
            return Some(rt);
        }
        let padded = format!("{:0>2}", trimmed);
        padded.parse::<Rt>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_and_bare_codes() {
        assert_eq!(Rt::parse_lenient("04"), Some(Rt::Rt04));
        assert_eq!(Rt::parse_lenient("4"), Some(Rt::Rt04));
        assert_eq!(Rt::parse_lenient(" 6 "), Some(Rt::Rt06));
        assert_eq!(Rt::parse_lenient("07"), None);
        assert_eq!(Rt::parse_lenient(""), None);
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(Rt::Rt01.to_string(), "01");
        assert_eq!(Rt::Rt06.to_string(), "06");
    }
}
