#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Direction of a single vote.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "upvote"))]
    Upvote,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "downvote"))]
    Downvote,
}

impl VoteType {
    pub const ALL: &'static [VoteType] = &[Self::Upvote, Self::Downvote];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("vote type", s, Self::ALL.iter().map(|v| v.as_str())))
    }
}

/// The kind of content a vote points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum VoteTarget {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "question"))]
    Question,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "comment"))]
    Comment,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "problemset"))]
    #[serde(rename = "problemset")]
    ProblemSet,
}

impl VoteTarget {
    pub const ALL: &'static [VoteTarget] = &[Self::Question, Self::Comment, Self::ProblemSet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Comment => "comment",
            Self::ProblemSet => "problemset",
        }
    }

    /// Human-readable label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Question => "Question",
            Self::Comment => "Comment",
            Self::ProblemSet => "Problem set",
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteTarget {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                ParseEnumError::new("vote target", s, Self::ALL.iter().map(|v| v.as_str()))
            })
    }
}
