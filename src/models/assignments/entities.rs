use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 作业状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum AssignmentState {
    Draft,     // 草稿
    Submitted, // 已提交
    Graded,    // 已评分
}

impl AssignmentState {
    pub const DRAFT: &'static str = "DRAFT";
    pub const SUBMITTED: &'static str = "SUBMITTED";
    pub const GRADED: &'static str = "GRADED";

    /// 状态机唯一的前进方向：DRAFT -> SUBMITTED -> GRADED，GRADED 为终态
    pub fn next(self) -> Option<AssignmentState> {
        match self {
            AssignmentState::Draft => Some(AssignmentState::Submitted),
            AssignmentState::Submitted => Some(AssignmentState::Graded),
            AssignmentState::Graded => None,
        }
    }

    /// 是否允许从当前状态迁移到 `target`（草稿编辑视为 DRAFT -> DRAFT）
    pub fn can_transition_to(self, target: AssignmentState) -> bool {
        match (self, target) {
            (AssignmentState::Draft, AssignmentState::Draft) => true,
            (from, to) => from.next() == Some(to),
        }
    }

    pub fn is_editable(self) -> bool {
        matches!(self, AssignmentState::Draft)
    }
}

impl<'de> Deserialize<'de> for AssignmentState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的作业状态: '{s}'. 支持的状态: DRAFT, SUBMITTED, GRADED"
            ))
        })
    }
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentState::Draft => write!(f, "{}", AssignmentState::DRAFT),
            AssignmentState::Submitted => write!(f, "{}", AssignmentState::SUBMITTED),
            AssignmentState::Graded => write!(f, "{}", AssignmentState::GRADED),
        }
    }
}

impl std::str::FromStr for AssignmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AssignmentState::DRAFT => Ok(AssignmentState::Draft),
            AssignmentState::SUBMITTED => Ok(AssignmentState::Submitted),
            AssignmentState::GRADED => Ok(AssignmentState::Graded),
            _ => Err(format!("Invalid assignment state: {s}")),
        }
    }
}

// 作业评分
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!("无效的评分: '{s}'. 支持的评分: A, B, C, D"))
        })
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            _ => Err(format!("Invalid grade: {s}")),
        }
    }
}

// 作业实体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    // 作业所属学生，创建后不可变
    pub student_id: i64,
    // 提交时指定的评分教师
    pub teacher_id: Option<i64>,
    pub content: Option<String>,
    pub grade: Option<Grade>,
    pub state: AssignmentState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// 待插入的新作业（id 与时间戳由存储层生成）
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub student_id: i64,
    pub content: Option<String>,
}
