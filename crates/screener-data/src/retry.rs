//! 지수 백오프 재시도.
//!
//! 실패할 때마다 `min(cap, base × 2^(attempt−1)) + jitter` 만큼 대기한 뒤 다시 시도합니다.
//! 마지막 시도 후에는 대기하지 않습니다. 에러(`Err`)만 재시도 대상이며,
//! `Ok`로 돌아온 제외 판정은 그대로 반환됩니다.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

/// 재시도 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간
    pub base_delay: Duration,
    /// 대기 시간 상한 (지터 제외)
    pub max_delay: Duration,
    /// 추가 무작위 대기 상한
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// 최대 시도 횟수를 설정합니다 (최소 1회).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// 지터 없는 백오프 대기 시간.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }

    /// 지터를 더한 실제 대기 시간.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff(attempt) + self.sample_jitter()
    }

    fn sample_jitter(&self) -> Duration {
        let max = self.jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max))
    }
}

/// 모든 시도가 실패했을 때의 결과.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryExhausted<E> {}

/// 작업을 정책에 따라 재시도합니다. 모든 오류를 재시도 대상으로 봅니다.
///
/// `op`은 1부터 시작하는 시도 번호를 받습니다.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    retry_if(policy, label, |_: &E| true, op).await
}

/// `should_retry`가 `true`인 오류만 재시도합니다.
///
/// 재시도 대상이 아닌 오류는 그 시도에서 바로 `RetryExhausted`로 끝납니다.
pub async fn retry_if<T, E, P, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    should_retry: P,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    P: Fn(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && should_retry(&e) => {
                let delay = policy.delay(attempt);
                debug!(
                    label = label,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "재시도 예정"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(
                    label = label,
                    attempts = attempt,
                    error = %e,
                    "재시도 한도 초과"
                );
                return Err(RetryExhausted {
                    attempts: attempt,
                    last_error: e,
                });
            }
        }
    }
}

/// 재시도 후에도 실패하면 `None`을 돌려줍니다.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, op: F) -> Option<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    retry(policy, label, op).await.ok()
}
