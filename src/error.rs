//! 计划统计引擎的错误类型

use thiserror::Error;

/// 计划统计错误
///
/// 引擎唯一的运行期错误是取消。收到该错误后，调用方必须丢弃半构建的实例，
/// 其中的累加值不再可信。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("操作已取消")]
    OperationCancelled,
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;
