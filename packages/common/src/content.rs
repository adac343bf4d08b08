#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Answer format of a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Multiple choice; answered by picking an option id.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "mcq"))]
    Mcq,
    /// Free text compared against accepted answers.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "fill_in_blank"))]
    FillInBlank,
}

impl QuestionType {
    pub const ALL: &'static [QuestionType] = &[Self::Mcq, Self::FillInBlank];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::FillInBlank => "fill_in_blank",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                ParseEnumError::new("question type", s, Self::ALL.iter().map(|v| v.as_str()))
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "easy"))]
    Easy,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "medium"))]
    Medium,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "hard"))]
    Hard,
}

impl Difficulty {
    pub const ALL: &'static [Difficulty] = &[Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    /// Case-insensitive, since external providers disagree on casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == lowered)
            .ok_or_else(|| {
                ParseEnumError::new("difficulty", s, Self::ALL.iter().map(|v| v.as_str()))
            })
    }
}

/// Account role. Admins bypass the voucher gate and may verify content.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "user"))]
    User,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "admin"))]
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(ParseEnumError::new("role", other, ["user", "admin"])),
        }
    }
}
