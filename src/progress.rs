use crate::Method;

/// Hooks around the lifecycle of each client call.
///
/// `on_start` fires once when the call is dispatched and `on_finish` once
/// when it settles, after any retries. `status` is the final HTTP status if a
/// response was received.
pub trait ProgressObserver: Send + Sync {
    fn on_start(&self, method: Method, url: &str);

    fn on_finish(&self, method: Method, url: &str, status: Option<u16>);
}
