//! Keyword classifier mapping free-form department names onto a fixed set of
//! categories, plus the search hints used when looking for contacts.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepartmentCategory {
    ItSystemsDx,
    Sales,
    Marketing,
    Hr,
    Finance,
    Other,
}

impl DepartmentCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DepartmentCategory::ItSystemsDx => "IT_SYSTEMS_DX",
            DepartmentCategory::Sales => "SALES",
            DepartmentCategory::Marketing => "MARKETING",
            DepartmentCategory::Hr => "HR",
            DepartmentCategory::Finance => "FINANCE",
            DepartmentCategory::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for DepartmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DepartmentCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IT_SYSTEMS_DX" => Ok(DepartmentCategory::ItSystemsDx),
            "SALES" => Ok(DepartmentCategory::Sales),
            "MARKETING" => Ok(DepartmentCategory::Marketing),
            "HR" => Ok(DepartmentCategory::Hr),
            "FINANCE" => Ok(DepartmentCategory::Finance),
            "OTHER" => Ok(DepartmentCategory::Other),
            other => Err(ValidationError::UnknownVariant {
                kind: "department category",
                value: other.to_string(),
            }),
        }
    }
}

static IT_SYSTEMS_DX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"情報システム|情シス|社内it|it基盤|インフラ|it企画|it推進|dx推進|デジタル推進|it戦略|デジタル戦略|テクノロジー本部|テクノロジー部|informationsystems|itdepartment|digitaltransformation",
    )
    .expect("valid regex")
});

static SALES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"営業|セールス|sales|アカウントマネージャ|アカウントマネジャ|インサイドセールス|フィールドセールス|法人営業|ソリューション営業|businessdevelopment",
    )
    .expect("valid regex")
});

static MARKETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"マーケティング|マーケ|marketing|プロモーション|宣伝|広報|pr|ブランド|brand")
        .expect("valid regex")
});

static HR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"人事|hr|タレントマネジメント|組織開発|人材開発|採用|リクルート|humanresources|recruit")
        .expect("valid regex")
});

static FINANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"財務|経理|ファイナンス|finance|経営管理|管理会計|経営企画財務|accounting")
        .expect("valid regex")
});

fn normalize(department: &str) -> String {
    department
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Classify a department name. First matching category wins, in the order
/// IT/DX, sales, marketing, HR, finance; anything else is `Other`.
#[must_use]
pub fn classify_department(department: &str) -> DepartmentCategory {
    let normalized = normalize(department);
    if normalized.is_empty() {
        return DepartmentCategory::Other;
    }

    let table: [(&Regex, DepartmentCategory); 5] = [
        (&IT_SYSTEMS_DX_RE, DepartmentCategory::ItSystemsDx),
        (&SALES_RE, DepartmentCategory::Sales),
        (&MARKETING_RE, DepartmentCategory::Marketing),
        (&HR_RE, DepartmentCategory::Hr),
        (&FINANCE_RE, DepartmentCategory::Finance),
    ];

    table
        .into_iter()
        .find(|(re, _)| re.is_match(&normalized))
        .map_or(DepartmentCategory::Other, |(_, category)| category)
}

/// Related search keywords for the category `department` falls into.
///
/// For unclassified departments the trimmed input is the only keyword.
#[must_use]
pub fn department_search_keywords(department: &str) -> Vec<String> {
    let keywords: &[&str] = match classify_department(department) {
        DepartmentCategory::ItSystemsDx => &[
            "情報システム部",
            "情シス",
            "社内IT",
            "IT基盤",
            "インフラ",
            "DX推進",
            "デジタル推進",
            "IT戦略",
        ],
        DepartmentCategory::Sales => &[
            "営業部",
            "営業本部",
            "セールス",
            "インサイドセールス",
            "フィールドセールス",
            "法人営業",
        ],
        DepartmentCategory::Marketing => &[
            "マーケティング部",
            "マーケティング本部",
            "広報",
            "宣伝",
            "プロモーション",
            "ブランド",
        ],
        DepartmentCategory::Hr => &["人事部", "人事本部", "採用", "人材開発", "組織開発"],
        DepartmentCategory::Finance => &["財務部", "経理部", "経営管理", "管理会計", "ファイナンス"],
        DepartmentCategory::Other => {
            let trimmed = department.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }
    };

    keywords.iter().map(|k| (*k).to_string()).collect()
}
