//! 业务断言
//!
//! 把布尔检查和存在性检查转换为 `HWSystemError`，
//! 生命周期中的每一步校验都通过这里失败，保证错误分类一致。

use crate::errors::{HWSystemError, Result};

/// 值不存在时返回 `NotFound`
pub fn assert_found<T>(value: Option<T>, message: &str) -> Result<T> {
    value.ok_or_else(|| HWSystemError::not_found(message))
}

/// 条件不满足时返回 `InvalidState`
pub fn assert_valid(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(HWSystemError::invalid_state(message))
    }
}

/// 归属不匹配时返回 `InvalidOwner`
pub fn assert_owner(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(HWSystemError::invalid_owner(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_found() {
        assert_eq!(assert_found(Some(3), "missing"), Ok(3));
        assert_eq!(
            assert_found::<i64>(None, "missing"),
            Err(HWSystemError::not_found("missing"))
        );
    }

    #[test]
    fn test_assert_valid_and_owner_use_distinct_kinds() {
        assert!(assert_valid(true, "x").is_ok());
        assert!(matches!(
            assert_valid(false, "x"),
            Err(HWSystemError::InvalidState(_))
        ));
        assert!(matches!(
            assert_owner(false, "x"),
            Err(HWSystemError::InvalidOwner(_))
        ));
    }
}
