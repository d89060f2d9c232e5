use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failure detected, failing fast
    HalfOpen, // One trial call in flight
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    consecutive_failures: usize,
    opened_at: Option<Instant>,
}

/// Guards calls to an external dependency.
///
/// After `failure_threshold` consecutive failures the circuit opens and
/// callers are refused until `reset_timeout` has passed. Then one caller at
/// a time is let through as a trial call; its outcome closes or reopens the circuit.
pub struct CircuitBreaker {
    pub name: String,
    failure_threshold: usize,
    reset_timeout: Duration,
    circuit: Mutex<Circuit>,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            failure_threshold: threshold.max(1),
            reset_timeout: timeout,
            circuit: Mutex::new(Circuit {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.circuit.lock().await.state
    }

    /// Whether this caller may go through. While Half-Open only the caller
    /// that flipped the state gets a `true`; a trial call that never reports back
    /// is replaced after another `reset_timeout`.
    pub async fn check(&self) -> bool {
        let mut circuit = self.circuit.lock().await;
        if circuit.state == CircuitState::Closed {
            return true;
        }

        let cooled_down = circuit
            .opened_at
            .map_or(true, |at| at.elapsed() >= self.reset_timeout);
        if cooled_down {
            if circuit.state == CircuitState::Open {
                tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
            }
            circuit.state = CircuitState::HalfOpen;
            circuit.opened_at = Some(Instant::now());
        }
        cooled_down
    }

    pub async fn record_success(&self) {
        let mut circuit = self.circuit.lock().await;
        if circuit.state != CircuitState::Closed {
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        circuit.state = CircuitState::Closed;
        circuit.consecutive_failures = 0;
        circuit.opened_at = None;
    }

    pub async fn record_failure(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.consecutive_failures += 1;

        let trip = circuit.state == CircuitState::HalfOpen
            || circuit.consecutive_failures >= self.failure_threshold;
        if trip {
            circuit.state = CircuitState::Open;
            circuit.opened_at = Some(Instant::now());
            tracing::error!(
                "Circuit Breaker [{}] TRIPPED to Open. Failures: {}",
                self.name,
                circuit.consecutive_failures
            );
        }
    }
}
