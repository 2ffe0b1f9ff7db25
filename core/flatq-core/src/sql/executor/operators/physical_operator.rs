//! Physical Operator Trait: Volcano Execution Model

use crate::error::FlatqResult;
use crate::storage::Row;

/// 행 배치: 연산자 사이를 흐르는 단위
pub type Batch = Vec<Row>;

/// 물리 연산자 트레이트: Volcano 실행 모델 (Pull 기반)
pub trait PhysicalOperator: Send {
    /// 다음 배치 반환 (None이면 끝)
    fn next(&mut self) -> FlatqResult<Option<Batch>>;

    /// 연산자 상태 초기화 (재실행용)
    fn reset(&mut self) -> FlatqResult<()>;
}
