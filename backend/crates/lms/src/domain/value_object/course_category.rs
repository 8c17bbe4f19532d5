use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LmsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseCategory {
    Programming,
    Design,
    Business,
    Language,
}

impl CourseCategory {
    pub const fn code(&self) -> &'static str {
        match self {
            CourseCategory::Programming => "programming",
            CourseCategory::Design => "design",
            CourseCategory::Business => "business",
            CourseCategory::Language => "language",
        }
    }
}

impl FromStr for CourseCategory {
    type Err = LmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "programming" => Ok(CourseCategory::Programming),
            "design" => Ok(CourseCategory::Design),
            "business" => Ok(CourseCategory::Business),
            "language" => Ok(CourseCategory::Language),
            _ => Err(LmsError::validation("category", "Invalid category")),
        }
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
