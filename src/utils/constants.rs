// 밀리초 <-> 초 변환
pub const MILLIS_PER_SECOND: f64 = 1000.0;

// 결과 CSV의 bct/duration은 마이크로초 단위
pub const MICROS_PER_MILLI: f64 = 1000.0;

// 파일 읽기 버퍼 크기
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 16;

// 라이브 화면 갱신 주기 및 재생 모드의 한 틱
pub const DEFAULT_TICK_MS: u64 = 500;

// BCT 히스토그램 최대 버킷 수 (초과분은 overflow로 집계)
pub const MAX_HIST_BUCKETS: usize = 1000;

// 트레이스 생성기 기본값 (필드가 없을 때)
pub const DEFAULT_BLOCK_SIZE: u64 = 1350;
pub const DEFAULT_BLOCK_GAP: f64 = 0.001;
pub const DEFAULT_BLOCK_PRIO: u64 = 0;
pub const DEFAULT_BLOCK_DDL: u64 = 200;
pub const MAX_BLOCK_SIZE: u64 = 10_000_000;

// QoE 가중치: 0.9 * (3 - prio) / 2 + 0.1
pub const QOE_PRIORITY_WEIGHT: f64 = 0.9;
pub const QOE_BASE: f64 = 0.1;
pub const QOE_PRIORITY_LEVELS: f64 = 3.0;
