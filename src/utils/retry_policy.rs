// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含首次请求）
    pub max_attempts: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
    /// 是否启用抖动
    pub enable_jitter: bool,
}

impl RetryPolicy {
    /// 学术接口超时重试策略（3 次尝试）
    pub fn for_timeouts() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            enable_jitter: true,
        }
    }

    /// 计算第 `attempt` 次重试前的退避时间（从 1 开始）
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let backoff_secs = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped_backoff = backoff_secs.min(self.max_backoff.as_secs_f64());

        let final_backoff = if self.enable_jitter && capped_backoff > 0.0 {
            let jitter_range = capped_backoff * self.jitter_factor;
            let jitter = rand::random_range(-jitter_range..=jitter_range);
            (capped_backoff + jitter).max(0.0)
        } else {
            capped_backoff
        };

        Duration::from_secs_f64(final_backoff)
    }

    /// 已完成 `attempt` 次尝试后是否还能继续
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// 执行异步操作，对 `retryable` 判定为可重试的错误按策略重试
    pub async fn run<T, E, F, Fut>(&self, mut operation: F, retryable: impl Fn(&E) -> bool) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(attempt) && retryable(&err) => {
                    let backoff = self.calculate_backoff(attempt);
                    debug!("Attempt {} failed: {}, retrying in {:?}", attempt, err, backoff);
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn without_jitter() -> RetryPolicy {
        RetryPolicy {
            enable_jitter: false,
            ..RetryPolicy::for_timeouts()
        }
    }

    #[test]
    fn test_calculate_backoff_exponential() {
        let policy = without_jitter();

        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(500));
        assert_eq!(policy.calculate_backoff(2), Duration::from_secs(1));
        assert_eq!(policy.calculate_backoff(3), Duration::from_secs(2));
    }

    #[test]
    fn test_calculate_backoff_with_jitter() {
        let policy = RetryPolicy::for_timeouts();

        let backoff = policy.calculate_backoff(2);
        assert!(backoff >= Duration::from_millis(900));
        assert!(backoff <= Duration::from_millis(1100));
    }

    #[test]
    fn test_calculate_backoff_max_limit() {
        let policy = without_jitter();

        assert_eq!(policy.calculate_backoff(10), Duration::from_secs(5));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::for_timeouts();

        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_retries_until_attempts_exhausted() {
        let policy = RetryPolicy::for_timeouts();
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("request timeout".to_string()) }
                },
                |e: &String| e.contains("timeout"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_permanent_error() {
        let policy = RetryPolicy::for_timeouts();
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("400 bad request".to_string()) }
                },
                |e: &String| e.contains("timeout"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
